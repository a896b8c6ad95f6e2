// font-depot/src/tables/post.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The PostScript table.

use byteorder::{BigEndian, ByteOrder};

const HEADER_LENGTH: usize = 32;
const VERSION_3: u32 = 0x0003_0000;

/// Builds a version 3.0 `post` table, which carries no glyph names.
///
/// The italic angle, underline metrics, fixed-pitch flag and memory hints are kept from
/// `original` when it is long enough.
pub fn without_glyph_names(original: Option<&[u8]>) -> Vec<u8> {
    let mut post = vec![0; HEADER_LENGTH];
    if let Some(original) = original {
        if original.len() >= HEADER_LENGTH {
            post.copy_from_slice(&original[..HEADER_LENGTH]);
        }
    }
    BigEndian::write_u32(&mut post[0..4], VERSION_3);
    post
}

#[cfg(test)]
mod test {
    use byteorder::{BigEndian, ByteOrder};

    #[test]
    fn keeps_header_fields_but_drops_names() {
        let mut original = vec![0; 40];
        BigEndian::write_u32(&mut original[0..4], 0x0002_0000);
        BigEndian::write_i16(&mut original[8..10], -100);
        let post = super::without_glyph_names(Some(&original));
        assert_eq!(post.len(), 32);
        assert_eq!(BigEndian::read_u32(&post[0..4]), 0x0003_0000);
        assert_eq!(BigEndian::read_i16(&post[8..10]), -100);

        assert_eq!(super::without_glyph_names(None)[..4], [0, 3, 0, 0]);
    }
}
