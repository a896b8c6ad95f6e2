// font-depot/src/tables/name.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The naming table.

use byteorder::{BigEndian, ByteOrder};
use lazy_static::lazy_static;
use log::{debug, warn};

use crate::error::DecodeError;
use crate::tables::Tag;

/// Well-known name identifiers.
pub struct NameId;

impl NameId {
    pub const COPYRIGHT: u16 = 0;
    /// The legacy family name, limited to four styles per family.
    pub const FAMILY: u16 = 1;
    /// The legacy subfamily name.
    pub const SUBFAMILY: u16 = 2;
    pub const UNIQUE_ID: u16 = 3;
    pub const FULL_NAME: u16 = 4;
    pub const VERSION: u16 = 5;
    pub const POSTSCRIPT_NAME: u16 = 6;
    /// The typographic ("preferred") family name.
    pub const TYPOGRAPHIC_FAMILY: u16 = 16;
    /// The typographic ("preferred") subfamily name.
    pub const TYPOGRAPHIC_SUBFAMILY: u16 = 17;
}

const PLATFORM_UNICODE: u16 = 0;
const PLATFORM_MACINTOSH: u16 = 1;
const PLATFORM_WINDOWS: u16 = 3;

const MAC_ENCODING_ROMAN: u16 = 0;
const WINDOWS_ENCODING_SYMBOL: u16 = 0;
const WINDOWS_ENCODING_UNICODE_BMP: u16 = 1;
const WINDOWS_ENCODING_UNICODE_FULL: u16 = 10;

const HEADER_LENGTH: usize = 6;
const RECORD_LENGTH: usize = 12;

lazy_static! {
    /// Mac OS Roman code points 0x80 to 0xff.
    static ref MAC_ROMAN_HIGH: Vec<char> = "ÄÅÇÉÑÖÜáàâäãåçéèêëíìîïñóòôöõúùûü\
        †°¢£§•¶ß®©™´¨≠ÆØ∞±≤≥¥µ∂∑∏π∫ªºΩæø\
        ¿¡¬√ƒ≈∆«»…\u{a0}ÀÃÕŒœ–—“”‘’÷◊ÿŸ⁄€‹›ﬁﬂ\
        ‡·‚„‰ÂÊÁËÈÍÎÏÌÓÔ\u{f8ff}ÒÚÛÙıˆ˜¯˘˙˚¸˝˛ˇ"
        .chars()
        .collect();
}

/// A decoded name record.
#[derive(Clone, Debug, PartialEq)]
pub struct NameRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: u16,
    pub value: String,
}

impl NameRecord {
    /// A Windows Unicode BMP record in US English.
    pub fn windows(name_id: u16, value: &str) -> NameRecord {
        NameRecord {
            platform_id: PLATFORM_WINDOWS,
            encoding_id: WINDOWS_ENCODING_UNICODE_BMP,
            language_id: 0x0409,
            name_id,
            value: value.to_owned(),
        }
    }

    /// A Macintosh Roman record in English.
    pub fn macintosh(name_id: u16, value: &str) -> NameRecord {
        NameRecord {
            platform_id: PLATFORM_MACINTOSH,
            encoding_id: MAC_ENCODING_ROMAN,
            language_id: 0,
            name_id,
            value: value.to_owned(),
        }
    }
}

/// The records of a `name` table whose strings could be decoded.
///
/// Records in encodings this crate doesn't understand are dropped during parsing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NameTable {
    records: Vec<NameRecord>,
}

impl NameTable {
    /// Parses a `name` table.
    ///
    /// The header and record array must be intact. Individual strings that fall outside the
    /// table or fail to decode are skipped.
    pub fn parse(data: &[u8]) -> Result<NameTable, DecodeError> {
        if data.len() < HEADER_LENGTH {
            return Err(DecodeError::MalformedTable(Tag::NAME));
        }
        let count = usize::from(BigEndian::read_u16(&data[2..]));
        let storage_offset = usize::from(BigEndian::read_u16(&data[4..]));
        if data.len() < HEADER_LENGTH + count * RECORD_LENGTH {
            return Err(DecodeError::MalformedTable(Tag::NAME));
        }

        let mut records = Vec::with_capacity(count);
        for index in 0..count {
            let record = &data[HEADER_LENGTH + index * RECORD_LENGTH..];
            let platform_id = BigEndian::read_u16(record);
            let encoding_id = BigEndian::read_u16(&record[2..]);
            let language_id = BigEndian::read_u16(&record[4..]);
            let name_id = BigEndian::read_u16(&record[6..]);
            let length = usize::from(BigEndian::read_u16(&record[8..]));
            let offset = usize::from(BigEndian::read_u16(&record[10..]));

            let start = storage_offset + offset;
            let bytes = match data.get(start..start + length) {
                Some(bytes) => bytes,
                None => {
                    debug!("name record {} points outside the table, skipping", name_id);
                    continue;
                }
            };
            if let Some(value) = decode_string(platform_id, encoding_id, name_id, bytes) {
                records.push(NameRecord {
                    platform_id,
                    encoding_id,
                    language_id,
                    name_id,
                    value,
                });
            }
        }
        Ok(NameTable { records })
    }

    #[inline]
    pub fn from_records(records: Vec<NameRecord>) -> NameTable {
        NameTable { records }
    }

    #[inline]
    pub fn records(&self) -> &[NameRecord] {
        &self.records
    }

    /// Returns the value of the last non-empty record with the given name ID.
    ///
    /// Only the empty string counts as missing. A value of spaces is returned as is.
    pub fn get(&self, name_id: u16) -> Option<&str> {
        self.records
            .iter()
            .rev()
            .find(|record| record.name_id == name_id && !record.value.is_empty())
            .map(|record| &*record.value)
    }

    /// Serializes the records, encoding Unicode and Windows strings as UTF-16BE and Macintosh
    /// strings as Mac Roman.
    ///
    /// Characters that Mac Roman can't represent become `?`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut storage = vec![];
        let mut data = Vec::with_capacity(HEADER_LENGTH + self.records.len() * RECORD_LENGTH);
        data.extend_from_slice(&0u16.to_be_bytes());
        data.extend_from_slice(&(self.records.len() as u16).to_be_bytes());
        data.extend_from_slice(
            &((HEADER_LENGTH + self.records.len() * RECORD_LENGTH) as u16).to_be_bytes(),
        );
        for record in &self.records {
            let encoded = if record.platform_id == PLATFORM_MACINTOSH {
                record.value.chars().map(encode_mac_roman).collect::<Vec<_>>()
            } else {
                record
                    .value
                    .encode_utf16()
                    .flat_map(|unit| unit.to_be_bytes().to_vec())
                    .collect()
            };
            for value in &[
                record.platform_id,
                record.encoding_id,
                record.language_id,
                record.name_id,
                encoded.len() as u16,
                storage.len() as u16,
            ] {
                data.extend_from_slice(&value.to_be_bytes());
            }
            storage.extend_from_slice(&encoded);
        }
        data.extend_from_slice(&storage);
        data
    }
}

fn decode_string(platform_id: u16, encoding_id: u16, name_id: u16, bytes: &[u8]) -> Option<String> {
    match (platform_id, encoding_id) {
        (PLATFORM_UNICODE, _)
        | (PLATFORM_WINDOWS, WINDOWS_ENCODING_SYMBOL)
        | (PLATFORM_WINDOWS, WINDOWS_ENCODING_UNICODE_BMP)
        | (PLATFORM_WINDOWS, WINDOWS_ENCODING_UNICODE_FULL) => {
            if bytes.len() % 2 != 0 {
                warn!("name record {} has an odd UTF-16 length, skipping", name_id);
                return None;
            }
            let units: Vec<u16> = bytes.chunks(2).map(BigEndian::read_u16).collect();
            match String::from_utf16(&units) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("name record {} is not valid UTF-16, skipping", name_id);
                    None
                }
            }
        }
        (PLATFORM_MACINTOSH, MAC_ENCODING_ROMAN) => {
            Some(bytes.iter().map(|&byte| decode_mac_roman(byte)).collect())
        }
        _ => {
            debug!(
                "unsupported name record encoding: platform {} encoding {}",
                platform_id, encoding_id
            );
            None
        }
    }
}

fn decode_mac_roman(byte: u8) -> char {
    if byte < 0x80 {
        char::from(byte)
    } else {
        MAC_ROMAN_HIGH[usize::from(byte - 0x80)]
    }
}

fn encode_mac_roman(character: char) -> u8 {
    if character.is_ascii() {
        return character as u8;
    }
    match MAC_ROMAN_HIGH.iter().position(|&high| high == character) {
        Some(index) => 0x80 + index as u8,
        None => b'?',
    }
}

#[cfg(test)]
mod test {
    use super::{NameId, NameRecord, NameTable, MAC_ROMAN_HIGH};

    #[test]
    fn mac_roman_covers_the_high_half() {
        assert_eq!(MAC_ROMAN_HIGH.len(), 128);
        assert_eq!(MAC_ROMAN_HIGH[0x8e - 0x80], 'é');
        assert_eq!(MAC_ROMAN_HIGH[0xff - 0x80], 'ˇ');
    }

    #[test]
    fn records_survive_serialization() {
        let table = NameTable::from_records(vec![
            NameRecord::macintosh(NameId::FAMILY, "Café Sans"),
            NameRecord::windows(NameId::FAMILY, "Café Sans"),
            NameRecord::windows(NameId::SUBFAMILY, "Bold"),
        ]);
        let parsed = NameTable::parse(&table.to_bytes()).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn last_non_empty_record_wins() {
        let table = NameTable::from_records(vec![
            NameRecord::macintosh(NameId::FAMILY, "Old"),
            NameRecord::windows(NameId::FAMILY, "New"),
            NameRecord::windows(NameId::FAMILY, ""),
        ]);
        assert_eq!(table.get(NameId::FAMILY), Some("New"));
        assert_eq!(table.get(NameId::SUBFAMILY), None);
    }

    #[test]
    fn blank_values_are_not_empty() {
        let table = NameTable::from_records(vec![
            NameRecord::windows(NameId::SUBFAMILY, "Bold"),
            NameRecord::windows(NameId::SUBFAMILY, " "),
            NameRecord::windows(NameId::SUBFAMILY, ""),
        ]);
        assert_eq!(table.get(NameId::SUBFAMILY), Some(" "));
    }

    #[test]
    fn unsupported_encodings_are_skipped() {
        let mut record = NameRecord::windows(NameId::FAMILY, "Shift");
        record.encoding_id = 2;
        let table = NameTable::from_records(vec![record]);
        assert!(NameTable::parse(&table.to_bytes()).unwrap().records().is_empty());
    }

    #[test]
    fn truncated_record_arrays_are_rejected() {
        let data = [0, 0, 0, 2, 0, 30, 0, 3];
        assert!(NameTable::parse(&data).is_err());
    }
}
