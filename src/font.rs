// font-depot/src/font.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A decoded font: the sfnt tables of an upload, independent of the container it came in.

use std::collections::BTreeMap;

use crate::codecs::{sfnt, woff, woff2};
use crate::error::DecodeError;
use crate::file_type::{
    FileType, SFNT_VERSION_APPLE, SFNT_VERSION_OPENTYPE, SFNT_VERSION_TRUETYPE,
};
use crate::tables::name::NameTable;
use crate::tables::{head, maxp, os2, Tag};

/// A decoded font.
///
/// Table payloads are kept as opaque bytes keyed by tag. The `name` table is decoded eagerly
/// because identity resolution needs it.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    sfnt_version: u32,
    file_type: FileType,
    tables: BTreeMap<Tag, Vec<u8>>,
    names: NameTable,
}

impl Font {
    /// Decodes a plain sfnt, WOFF or WOFF 2.0 font.
    ///
    /// Collections and unknown formats are rejected, as are containers whose table directory is
    /// inconsistent or that lack a valid `head` table.
    pub fn from_bytes(data: &[u8]) -> Result<Font, DecodeError> {
        if data.is_empty() {
            return Err(DecodeError::Empty);
        }
        let file_type = FileType::detect(data).ok_or(DecodeError::UnknownFormat)?;
        let (sfnt_version, tables) = match file_type {
            FileType::TrueType | FileType::OpenType => sfnt::decode(data)?,
            FileType::Woff => woff::decode(data)?,
            FileType::Woff2 => woff2::decode(data)?,
            FileType::Collection(font_count) => return Err(DecodeError::Collection(font_count)),
        };
        Font::from_tables(sfnt_version, file_type, tables)
    }

    /// Assembles a font from already decoded tables, validating them the same way `from_bytes`
    /// does.
    pub(crate) fn from_tables(
        sfnt_version: u32,
        file_type: FileType,
        tables: BTreeMap<Tag, Vec<u8>>,
    ) -> Result<Font, DecodeError> {
        match sfnt_version {
            SFNT_VERSION_TRUETYPE | SFNT_VERSION_OPENTYPE | SFNT_VERSION_APPLE => {}
            _ => return Err(DecodeError::Malformed("unknown sfnt version")),
        }
        match tables.get(&Tag::HEAD) {
            None => return Err(DecodeError::MissingTable(Tag::HEAD)),
            Some(head_table) if !head::is_valid(head_table) => {
                return Err(DecodeError::MalformedTable(Tag::HEAD))
            }
            Some(_) => {}
        }
        let names = match tables.get(&Tag::NAME) {
            Some(name_table) => NameTable::parse(name_table)?,
            None => NameTable::default(),
        };
        Ok(Font {
            sfnt_version,
            file_type,
            tables,
            names,
        })
    }

    /// The sfnt version: `0x00010000` or `true` for TrueType outlines, `OTTO` for CFF outlines.
    #[inline]
    pub fn sfnt_version(&self) -> u32 {
        self.sfnt_version
    }

    /// The container the font was decoded from.
    #[inline]
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    #[inline]
    pub fn tables(&self) -> &BTreeMap<Tag, Vec<u8>> {
        &self.tables
    }

    #[inline]
    pub fn table(&self, tag: Tag) -> Option<&[u8]> {
        self.tables.get(&tag).map(|table| &**table)
    }

    /// The decodable records of the `name` table, in table order.
    #[inline]
    pub fn names(&self) -> &NameTable {
        &self.names
    }

    /// The raw `OS/2.usWeightClass`, if the font has an `OS/2` table.
    #[inline]
    pub fn weight_class(&self) -> Option<u16> {
        self.table(Tag::OS2).and_then(os2::weight_class)
    }

    /// `maxp.numGlyphs`, if the font has a `maxp` table.
    #[inline]
    pub fn num_glyphs(&self) -> Option<u16> {
        self.table(Tag::MAXP).and_then(maxp::num_glyphs)
    }

    /// Returns true if the outlines are PostScript (`CFF ` or `CFF2`) rather than TrueType.
    pub fn has_cff_outlines(&self) -> bool {
        self.tables.contains_key(&Tag::CFF) || self.tables.contains_key(&Tag::CFF2)
    }
}

#[cfg(test)]
mod test {
    use super::Font;
    use crate::error::DecodeError;
    use crate::file_type::FileType;
    use crate::fixture::FontBuilder;
    use crate::tables::Tag;

    #[test]
    fn decoding_is_deterministic() {
        let data = FontBuilder::new().family("Same").weight(700).build();
        let first = Font::from_bytes(&data).unwrap();
        let second = Font::from_bytes(&data).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.file_type(), FileType::TrueType);
        assert_eq!(first.weight_class(), Some(700));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(Font::from_bytes(&[]), Err(DecodeError::Empty)));
        assert!(matches!(
            Font::from_bytes(b"not a font at all"),
            Err(DecodeError::UnknownFormat)
        ));
        assert!(matches!(
            Font::from_bytes(b"ttcf\x00\x01\x00\x00\x00\x00\x00\x02"),
            Err(DecodeError::Collection(2))
        ));
    }

    #[test]
    fn head_is_required() {
        let data = FontBuilder::new().without_table(Tag::HEAD).build();
        assert!(matches!(
            Font::from_bytes(&data),
            Err(DecodeError::MissingTable(Tag::HEAD))
        ));
    }

    #[test]
    fn cff_outlines_are_detected() {
        let data = FontBuilder::new().cff().build();
        let font = Font::from_bytes(&data).unwrap();
        assert!(font.has_cff_outlines());
        assert_eq!(font.file_type(), FileType::OpenType);
    }
}
