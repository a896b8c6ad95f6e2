// font-depot/src/codecs/woff.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! WOFF 1.0: an sfnt whose tables are individually zlib-compressed.

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::collections::BTreeMap;
use std::io::{Read, Write};

use crate::codecs::{sfnt, ArtifactKind, Encoder, MAX_SFNT_SIZE};
use crate::error::{ConversionError, DecodeError};
use crate::file_type::WOFF_SIGNATURE;
use crate::font::Font;
use crate::tables::Tag;
use crate::utils::{self, checksum};

const HEADER_LENGTH: usize = 44;
const TABLE_RECORD_LENGTH: usize = 20;

struct TableRecord {
    tag: Tag,
    offset: usize,
    compressed_length: usize,
    original_length: usize,
}

/// Unwraps a WOFF 1.0 file into its sfnt version and tables.
pub(crate) fn decode(data: &[u8]) -> Result<(u32, BTreeMap<Tag, Vec<u8>>), DecodeError> {
    let mut reader = data;
    if reader.read_u32::<BigEndian>()? != WOFF_SIGNATURE {
        return Err(DecodeError::UnknownFormat);
    }
    let flavor = reader.read_u32::<BigEndian>()?;
    let length = reader.read_u32::<BigEndian>()? as usize;
    let num_tables = reader.read_u16::<BigEndian>()?;
    let reserved = reader.read_u16::<BigEndian>()?;
    let total_sfnt_size = u64::from(reader.read_u32::<BigEndian>()?);
    if data.len() < HEADER_LENGTH {
        return Err(DecodeError::Truncated);
    }
    if length > data.len() {
        return Err(DecodeError::Truncated);
    }
    if reserved != 0 {
        return Err(DecodeError::Malformed("nonzero reserved field in WOFF header"));
    }
    if num_tables == 0 {
        return Err(DecodeError::Malformed("the table directory is empty"));
    }

    let directory = utils::slice(
        data,
        HEADER_LENGTH,
        usize::from(num_tables) * TABLE_RECORD_LENGTH,
    )
    .ok_or(DecodeError::Truncated)?;
    let mut records: Vec<TableRecord> = directory
        .chunks(TABLE_RECORD_LENGTH)
        .map(|record| TableRecord {
            tag: Tag::from_u32(BigEndian::read_u32(record)),
            offset: BigEndian::read_u32(&record[4..]) as usize,
            compressed_length: BigEndian::read_u32(&record[8..]) as usize,
            original_length: BigEndian::read_u32(&record[12..]) as usize,
        })
        .collect();

    let original_length: u64 = records
        .iter()
        .map(|record| record.original_length as u64)
        .sum();
    if total_sfnt_size > MAX_SFNT_SIZE {
        return Err(DecodeError::Malformed("WOFF font is too large"));
    }
    if original_length > total_sfnt_size {
        return Err(DecodeError::Malformed(
            "WOFF tables are longer than the declared sfnt size",
        ));
    }

    records.sort_by_key(|record| record.offset);
    let data_start = HEADER_LENGTH + directory.len();
    let mut previous_end = data_start;
    for record in &records {
        if record.offset < previous_end {
            return Err(DecodeError::Malformed("overlapping WOFF table data"));
        }
        previous_end = record.offset + record.compressed_length;
    }

    let mut tables = BTreeMap::new();
    for record in records {
        let stored = utils::slice(data, record.offset, record.compressed_length)
            .ok_or(DecodeError::TableOutOfBounds(record.tag))?;
        if record.compressed_length > record.original_length {
            return Err(DecodeError::Malformed(
                "WOFF table is longer compressed than uncompressed",
            ));
        }
        let table = if record.compressed_length == record.original_length {
            stored.to_vec()
        } else {
            inflate(stored, record.original_length)?
        };
        if tables.insert(record.tag, table).is_some() {
            return Err(DecodeError::DuplicateTable(record.tag));
        }
    }
    Ok((flavor, tables))
}

fn inflate(stored: &[u8], original_length: usize) -> Result<Vec<u8>, DecodeError> {
    let mut table = vec![];
    ZlibDecoder::new(stored)
        .take(original_length as u64 + 1)
        .read_to_end(&mut table)
        .map_err(|error| DecodeError::Decompression(error.to_string()))?;
    if table.len() != original_length {
        return Err(DecodeError::Decompression(format!(
            "expected {} bytes, inflated {}",
            original_length,
            table.len()
        )));
    }
    Ok(table)
}

/// Writes fonts as WOFF 1.0.
///
/// Each table is compressed at the best zlib level and stored compressed only when that is
/// actually smaller.
#[derive(Clone, Copy, Debug, Default)]
pub struct WoffEncoder;

impl WoffEncoder {
    #[inline]
    pub fn new() -> WoffEncoder {
        WoffEncoder
    }
}

impl Encoder for WoffEncoder {
    #[inline]
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Woff
    }

    fn encode(&self, font: &Font) -> Result<Vec<u8>, ConversionError> {
        let encoding_error = |reason: String| ConversionError::Encoding {
            format: ArtifactKind::Woff,
            reason,
        };

        // Round-trip through the sfnt writer so `head` carries the final checksum adjustment.
        let sfnt_data = sfnt::write(font.sfnt_version(), font.tables());
        let (_, tables) =
            sfnt::decode(&sfnt_data).map_err(|error| encoding_error(error.to_string()))?;

        let mut stored_tables = Vec::with_capacity(tables.len());
        for (&tag, table) in &tables {
            let mut encoder = ZlibEncoder::new(vec![], Compression::best());
            encoder
                .write_all(table)
                .map_err(|error| encoding_error(error.to_string()))?;
            let compressed = encoder
                .finish()
                .map_err(|error| encoding_error(error.to_string()))?;
            let stored = if compressed.len() < table.len() {
                compressed
            } else {
                table.clone()
            };
            stored_tables.push((tag, table, stored));
        }

        let directory_length = HEADER_LENGTH + stored_tables.len() * TABLE_RECORD_LENGTH;
        let data_length: usize = stored_tables
            .iter()
            .map(|(_, _, stored)| utils::align4(stored.len()))
            .sum();
        let total_sfnt_size = sfnt::HEADER_LENGTH
            + tables.len() * sfnt::TABLE_RECORD_LENGTH
            + tables.values().map(|table| utils::align4(table.len())).sum::<usize>();
        // The final table isn't padded.
        let last_padding = stored_tables.last().map_or(0, |(_, _, stored)| {
            utils::align4(stored.len()) - stored.len()
        });
        let length = directory_length + data_length - last_padding;

        let mut woff = Vec::with_capacity(length);
        woff.extend_from_slice(&WOFF_SIGNATURE.to_be_bytes());
        woff.extend_from_slice(&font.sfnt_version().to_be_bytes());
        woff.extend_from_slice(&(length as u32).to_be_bytes());
        woff.extend_from_slice(&(stored_tables.len() as u16).to_be_bytes());
        woff.extend_from_slice(&0u16.to_be_bytes());
        woff.extend_from_slice(&(total_sfnt_size as u32).to_be_bytes());
        woff.extend_from_slice(&1u16.to_be_bytes());
        woff.extend_from_slice(&0u16.to_be_bytes());
        // No extended metadata or private data block.
        woff.extend_from_slice(&[0; 20]);

        let mut offset = directory_length;
        for (tag, table, stored) in &stored_tables {
            woff.extend_from_slice(&tag.0);
            woff.extend_from_slice(&(offset as u32).to_be_bytes());
            woff.extend_from_slice(&(stored.len() as u32).to_be_bytes());
            woff.extend_from_slice(&(table.len() as u32).to_be_bytes());
            woff.extend_from_slice(&checksum(table).to_be_bytes());
            offset += utils::align4(stored.len());
        }
        for (_, _, stored) in &stored_tables {
            woff.extend_from_slice(stored);
            utils::pad4(&mut woff);
        }
        woff.truncate(length);
        Ok(woff)
    }
}

#[cfg(test)]
mod test {
    use byteorder::{BigEndian, ByteOrder};

    use super::{decode, WoffEncoder};
    use crate::codecs::Encoder;
    use crate::error::DecodeError;
    use crate::fixture::FontBuilder;
    use crate::font::Font;

    #[test]
    fn encoded_fonts_decode_to_the_same_tables() {
        let font = Font::from_bytes(&FontBuilder::new().family("Zlib Sans").build()).unwrap();
        let woff = WoffEncoder::new().encode(&font).unwrap();
        assert_eq!(&woff[..4], b"wOFF");
        assert_eq!(BigEndian::read_u32(&woff[8..]) as usize, woff.len());

        let (flavor, tables) = decode(&woff).unwrap();
        assert_eq!(flavor, font.sfnt_version());
        assert_eq!(tables.len(), font.tables().len());
        for (tag, table) in &tables {
            if *tag != crate::tables::Tag::HEAD {
                assert_eq!(table, &font.tables()[tag]);
            }
        }
    }

    #[test]
    fn corrupt_streams_are_rejected() {
        let font = Font::from_bytes(&FontBuilder::new().glyphs(40).build()).unwrap();
        let mut woff = WoffEncoder::new().encode(&font).unwrap();
        assert!(decode(&woff[..30]).is_err());

        // Find a compressed table and scribble over its zlib header.
        let count = usize::from(BigEndian::read_u16(&woff[12..]));
        let record = (0..count)
            .map(|index| 44 + index * 20)
            .find(|&record| {
                BigEndian::read_u32(&woff[record + 8..]) < BigEndian::read_u32(&woff[record + 12..])
            })
            .expect("a compressible table");
        let offset = BigEndian::read_u32(&woff[record + 4..]) as usize;
        woff[offset] = 0xff;
        woff[offset + 1] = 0xff;
        assert!(matches!(decode(&woff), Err(DecodeError::Decompression(_))));
    }

    #[test]
    fn oversized_declared_lengths_are_rejected() {
        for &total_sfnt_size in &[0xffff_ffffu32, 4096] {
            let mut woff = vec![];
            woff.extend_from_slice(b"wOFF");
            woff.extend_from_slice(&0x0001_0000u32.to_be_bytes());
            woff.extend_from_slice(&72u32.to_be_bytes());
            woff.extend_from_slice(&1u16.to_be_bytes());
            woff.extend_from_slice(&0u16.to_be_bytes());
            woff.extend_from_slice(&total_sfnt_size.to_be_bytes());
            woff.extend_from_slice(&1u16.to_be_bytes());
            woff.extend_from_slice(&0u16.to_be_bytes());
            woff.extend_from_slice(&[0; 20]);
            // One table that claims to inflate from 8 bytes to nearly 4 GiB.
            woff.extend_from_slice(b"ZZZZ");
            woff.extend_from_slice(&64u32.to_be_bytes());
            woff.extend_from_slice(&8u32.to_be_bytes());
            woff.extend_from_slice(&0xffff_fff0u32.to_be_bytes());
            woff.extend_from_slice(&0u32.to_be_bytes());
            woff.extend_from_slice(&[0x78, 0x9c, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01]);
            assert_eq!(woff.len(), 72);

            assert!(matches!(decode(&woff), Err(DecodeError::Malformed(_))));
            assert!(Font::from_bytes(&woff).is_err());
        }
    }
}
