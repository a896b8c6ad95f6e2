// font-depot/src/file_type.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The container type of a font file, as announced by its leading signature.

use byteorder::{BigEndian, ByteOrder};

pub(crate) const SFNT_VERSION_TRUETYPE: u32 = 0x0001_0000;
pub(crate) const SFNT_VERSION_OPENTYPE: u32 = 0x4f54_544f; // 'OTTO'
pub(crate) const SFNT_VERSION_APPLE: u32 = 0x7472_7565; // 'true'
pub(crate) const WOFF_SIGNATURE: u32 = 0x774f_4646; // 'wOFF'
pub(crate) const WOFF2_SIGNATURE: u32 = 0x774f_4632; // 'wOF2'
pub(crate) const COLLECTION_SIGNATURE: u32 = 0x7474_6366; // 'ttcf'

/// The container type of a font file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileType {
    /// A plain sfnt with TrueType outlines (`.ttf`).
    TrueType,
    /// A plain sfnt with PostScript outlines (`.otf`).
    OpenType,
    /// A WOFF 1.0 wrapper around an sfnt.
    Woff,
    /// A WOFF 2.0 wrapper around an sfnt.
    Woff2,
    /// A collection of fonts (`.ttc`, `.otc`), with the number of fonts it declares.
    Collection(u32),
}

impl FileType {
    /// Classifies font data by its first four bytes.
    ///
    /// Returns `None` for data too short to hold a signature or with an unknown signature.
    pub fn detect(data: &[u8]) -> Option<FileType> {
        if data.len() < 4 {
            return None;
        }
        match BigEndian::read_u32(data) {
            SFNT_VERSION_TRUETYPE | SFNT_VERSION_APPLE => Some(FileType::TrueType),
            SFNT_VERSION_OPENTYPE => Some(FileType::OpenType),
            WOFF_SIGNATURE => Some(FileType::Woff),
            WOFF2_SIGNATURE => Some(FileType::Woff2),
            COLLECTION_SIGNATURE => {
                let count = if data.len() >= 12 {
                    BigEndian::read_u32(&data[8..])
                } else {
                    0
                };
                Some(FileType::Collection(count))
            }
            _ => None,
        }
    }

    /// Returns true if the data is wrapped in one of the web font containers.
    #[inline]
    pub fn is_web_font(self) -> bool {
        match self {
            FileType::Woff | FileType::Woff2 => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::FileType;

    #[test]
    fn signatures() {
        assert_eq!(FileType::detect(&[0, 1, 0, 0]), Some(FileType::TrueType));
        assert_eq!(FileType::detect(b"true"), Some(FileType::TrueType));
        assert_eq!(FileType::detect(b"OTTO"), Some(FileType::OpenType));
        assert_eq!(FileType::detect(b"wOFF"), Some(FileType::Woff));
        assert_eq!(FileType::detect(b"wOF2"), Some(FileType::Woff2));
        assert_eq!(
            FileType::detect(b"ttcf\x00\x01\x00\x00\x00\x00\x00\x03"),
            Some(FileType::Collection(3))
        );
        assert_eq!(FileType::detect(b"GIF8"), None);
        assert_eq!(FileType::detect(b"OT"), None);
    }

    #[test]
    fn web_fonts() {
        assert!(FileType::Woff.is_web_font());
        assert!(FileType::Woff2.is_web_font());
        assert!(!FileType::OpenType.is_web_font());
    }
}
