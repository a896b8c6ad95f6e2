// font-depot/src/tables/mod.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Readers and writers for the individual OpenType tables this crate needs to understand.
//!
//! Everything else in a font is carried around as opaque bytes.

use std::fmt::{self, Debug, Display, Formatter};

pub mod cmap;
pub mod glyf;
pub mod head;
pub mod hmtx;
pub mod loca;
pub mod maxp;
pub mod name;
pub mod os2;
pub mod post;

/// A four-byte OpenType table tag, such as `glyf` or `OS/2`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const CFF: Tag = Tag(*b"CFF ");
    pub const CFF2: Tag = Tag(*b"CFF2");
    pub const CMAP: Tag = Tag(*b"cmap");
    pub const CVT: Tag = Tag(*b"cvt ");
    pub const FPGM: Tag = Tag(*b"fpgm");
    pub const GASP: Tag = Tag(*b"gasp");
    pub const GLYF: Tag = Tag(*b"glyf");
    pub const HEAD: Tag = Tag(*b"head");
    pub const HHEA: Tag = Tag(*b"hhea");
    pub const HMTX: Tag = Tag(*b"hmtx");
    pub const LOCA: Tag = Tag(*b"loca");
    pub const MAXP: Tag = Tag(*b"maxp");
    pub const NAME: Tag = Tag(*b"name");
    pub const OS2: Tag = Tag(*b"OS/2");
    pub const POST: Tag = Tag(*b"post");
    pub const PREP: Tag = Tag(*b"prep");

    /// Creates a tag from its big-endian `u32` representation.
    #[inline]
    pub fn from_u32(value: u32) -> Tag {
        Tag(value.to_be_bytes())
    }

    /// Returns the big-endian `u32` representation of this tag.
    #[inline]
    pub fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for &byte in &self.0 {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{:02x}", byte)?;
            }
        }
        Ok(())
    }
}

impl Debug for Tag {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}

#[cfg(test)]
mod test {
    use super::Tag;

    #[test]
    fn tag_round_trips_through_u32() {
        assert_eq!(Tag::GLYF.to_u32(), 0x676c_7966);
        assert_eq!(Tag::from_u32(0x6865_6164), Tag::HEAD);
        assert_eq!(Tag::OS2.to_string(), "OS/2");
        assert_eq!(Tag([0, b'a', b'b', b'c']).to_string(), "\\x00abc");
    }
}
