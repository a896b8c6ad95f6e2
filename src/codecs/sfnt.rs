// font-depot/src/codecs/sfnt.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Plain sfnt containers: the `.ttf` and `.otf` formats.

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use log::debug;
use std::collections::BTreeMap;

use crate::codecs::{ArtifactKind, Encoder};
use crate::error::{ConversionError, DecodeError};
use crate::font::Font;
use crate::tables::{head, Tag};
use crate::utils::{self, checksum};

pub(crate) const HEADER_LENGTH: usize = 12;
pub(crate) const TABLE_RECORD_LENGTH: usize = 16;

/// Reads the table directory of a plain sfnt and copies out every table.
///
/// Returns the sfnt version and the tables. Checksum mismatches are logged but accepted.
pub(crate) fn decode(data: &[u8]) -> Result<(u32, BTreeMap<Tag, Vec<u8>>), DecodeError> {
    let mut reader = data;
    let sfnt_version = reader.read_u32::<BigEndian>()?;
    let num_tables = reader.read_u16::<BigEndian>()?;
    if num_tables == 0 {
        return Err(DecodeError::Malformed("the table directory is empty"));
    }
    let records = utils::slice(
        data,
        HEADER_LENGTH,
        usize::from(num_tables) * TABLE_RECORD_LENGTH,
    )
    .ok_or(DecodeError::Truncated)?;

    let mut tables = BTreeMap::new();
    for record in records.chunks(TABLE_RECORD_LENGTH) {
        let tag = Tag::from_u32(BigEndian::read_u32(record));
        let expected_checksum = BigEndian::read_u32(&record[4..]);
        let offset = BigEndian::read_u32(&record[8..]) as usize;
        let length = BigEndian::read_u32(&record[12..]) as usize;

        let table = utils::slice(data, offset, length).ok_or(DecodeError::TableOutOfBounds(tag))?;
        if tables.contains_key(&tag) {
            return Err(DecodeError::DuplicateTable(tag));
        }
        if table_checksum(tag, table) != expected_checksum {
            debug!("checksum mismatch in table `{}`", tag);
        }
        tables.insert(tag, table.to_vec());
    }
    Ok((sfnt_version, tables))
}

/// Computes a table checksum, treating `head.checkSumAdjustment` as zero.
pub(crate) fn table_checksum(tag: Tag, table: &[u8]) -> u32 {
    if tag == Tag::HEAD && table.len() >= head::CHECKSUM_ADJUSTMENT_OFFSET + 4 {
        let adjustment = BigEndian::read_u32(&table[head::CHECKSUM_ADJUSTMENT_OFFSET..]);
        checksum(table).wrapping_sub(adjustment)
    } else {
        checksum(table)
    }
}

/// Serializes tables into a plain sfnt.
///
/// The directory is sorted by tag, every table starts on a four-byte boundary, table checksums
/// are recomputed and `head.checkSumAdjustment` is set so the whole file sums to the magic
/// value.
pub fn write(sfnt_version: u32, tables: &BTreeMap<Tag, Vec<u8>>) -> Vec<u8> {
    let num_tables = tables.len() as u16;
    let (search_range, entry_selector, range_shift) =
        utils::search_params(num_tables, TABLE_RECORD_LENGTH as u16);

    let directory_length = HEADER_LENGTH + tables.len() * TABLE_RECORD_LENGTH;
    let data_length: usize = tables.values().map(|table| utils::align4(table.len())).sum();
    let mut font = Vec::with_capacity(directory_length + data_length);
    font.extend_from_slice(&sfnt_version.to_be_bytes());
    font.extend_from_slice(&num_tables.to_be_bytes());
    font.extend_from_slice(&search_range.to_be_bytes());
    font.extend_from_slice(&entry_selector.to_be_bytes());
    font.extend_from_slice(&range_shift.to_be_bytes());

    let mut offset = directory_length;
    let mut head_offset = None;
    for (&tag, table) in tables {
        if tag == Tag::HEAD {
            head_offset = Some(offset);
        }
        font.extend_from_slice(&tag.0);
        font.extend_from_slice(&table_checksum(tag, table).to_be_bytes());
        font.extend_from_slice(&(offset as u32).to_be_bytes());
        font.extend_from_slice(&(table.len() as u32).to_be_bytes());
        offset += utils::align4(table.len());
    }

    for (&tag, table) in tables {
        let start = font.len();
        font.extend_from_slice(table);
        if tag == Tag::HEAD && table.len() >= head::CHECKSUM_ADJUSTMENT_OFFSET + 4 {
            head::clear_checksum_adjustment(&mut font[start..]);
        }
        utils::pad4(&mut font);
    }

    if let Some(head_offset) = head_offset {
        if tables[&Tag::HEAD].len() >= head::CHECKSUM_ADJUSTMENT_OFFSET + 4 {
            let adjustment = head::CHECKSUM_MAGIC.wrapping_sub(checksum(&font));
            BigEndian::write_u32(
                &mut font[head_offset + head::CHECKSUM_ADJUSTMENT_OFFSET..],
                adjustment,
            );
        }
    }
    font
}

/// Writes fonts as plain sfnt files.
///
/// The `.ttf` and `.otf` delivery formats share this encoder; they only differ in their file
/// name. The outline flavor of the source is kept either way.
#[derive(Clone, Copy, Debug)]
pub struct SfntEncoder {
    kind: ArtifactKind,
}

impl SfntEncoder {
    #[inline]
    pub fn new(kind: ArtifactKind) -> SfntEncoder {
        SfntEncoder { kind }
    }
}

impl Encoder for SfntEncoder {
    #[inline]
    fn kind(&self) -> ArtifactKind {
        self.kind
    }

    fn encode(&self, font: &Font) -> Result<Vec<u8>, ConversionError> {
        if font.tables().len() > usize::from(u16::MAX) {
            return Err(ConversionError::Encoding {
                format: self.kind,
                reason: "too many tables for an sfnt directory".to_owned(),
            });
        }
        Ok(write(font.sfnt_version(), font.tables()))
    }
}

#[cfg(test)]
mod test {
    use byteorder::{BigEndian, ByteOrder};
    use std::collections::BTreeMap;

    use super::{decode, write};
    use crate::error::DecodeError;
    use crate::tables::{head, Tag};
    use crate::utils::checksum;

    fn tables() -> BTreeMap<Tag, Vec<u8>> {
        let mut head = vec![0; head::MIN_LENGTH];
        BigEndian::write_u32(&mut head[12..], 0x5f0f_3cf5);
        BigEndian::write_u32(&mut head[8..], 0xdead_beef);
        let mut tables = BTreeMap::new();
        tables.insert(Tag::HEAD, head);
        tables.insert(Tag::NAME, vec![1, 2, 3]);
        tables.insert(Tag::CMAP, vec![4; 9]);
        tables
    }

    #[test]
    fn written_fonts_sum_to_the_magic_value() {
        let font = write(0x0001_0000, &tables());
        assert_eq!(font.len() % 4, 0);
        assert_eq!(checksum(&font), head::CHECKSUM_MAGIC);

        let (version, decoded) = decode(&font).unwrap();
        assert_eq!(version, 0x0001_0000);
        assert_eq!(decoded.keys().collect::<Vec<_>>(), tables().keys().collect::<Vec<_>>());
        assert_eq!(decoded[&Tag::NAME], vec![1, 2, 3]);
        assert_eq!(decoded[&Tag::CMAP].len(), 9);
    }

    #[test]
    fn directory_is_sorted_by_tag() {
        let font = write(0x0001_0000, &tables());
        let tags: Vec<&[u8]> = (0..3).map(|index| &font[12 + index * 16..][..4]).collect();
        assert_eq!(tags, vec![&b"cmap"[..], &b"head"[..], &b"name"[..]]);
    }

    #[test]
    fn structural_damage_is_rejected() {
        let font = write(0x0001_0000, &tables());
        assert!(matches!(decode(&font[..20]), Err(DecodeError::Truncated)));
        assert!(matches!(
            decode(&font[..font.len() - 8]),
            Err(DecodeError::TableOutOfBounds(_))
        ));

        let mut duplicated = font.clone();
        duplicated.copy_within(12..16, 28);
        assert!(matches!(
            decode(&duplicated),
            Err(DecodeError::DuplicateTable(_))
        ));
    }
}
