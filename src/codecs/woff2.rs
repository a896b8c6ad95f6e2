// font-depot/src/codecs/woff2.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! WOFF 2.0: an sfnt whose tables share one brotli stream.
//!
//! Brotli support is behind the `woff2` feature. Without it, WOFF 2.0 uploads fail to decode
//! and the WOFF 2.0 encoders report a missing codec.

use byteorder::{BigEndian, ReadBytesExt};
use log::debug;
use std::collections::BTreeMap;

use crate::codecs::woff2_transform;
use crate::codecs::{ArtifactKind, Encoder, MAX_SFNT_SIZE};
use crate::error::{ConversionError, DecodeError};
use crate::file_type::{COLLECTION_SIGNATURE, WOFF2_SIGNATURE};
use crate::font::Font;
use crate::tables::{head, hmtx, maxp, Tag};
use crate::utils::{self, read_uint_base128};

const HEADER_LENGTH: usize = 48;

/// The codec name reported when brotli isn't compiled in.
pub const CODEC_NAME: &str = "brotli";

/// Tags that the table directory encodes as a 6-bit index.
const KNOWN_TAGS: [&[u8; 4]; 63] = [
    b"cmap", b"head", b"hhea", b"hmtx", b"maxp", b"name", b"OS/2", b"post", b"cvt ", b"fpgm",
    b"glyf", b"loca", b"prep", b"CFF ", b"VORG", b"EBDT", b"EBLC", b"gasp", b"hdmx", b"kern",
    b"LTSH", b"PCLT", b"VDMX", b"vhea", b"vmtx", b"BASE", b"GDEF", b"GPOS", b"GSUB", b"EBSC",
    b"JSTF", b"MATH", b"CBDT", b"CBLC", b"COLR", b"CPAL", b"SVG ", b"sbix", b"acnt", b"avar",
    b"bdat", b"bloc", b"bsln", b"cvar", b"fdsc", b"feat", b"fmtx", b"fvar", b"gvar", b"hsty",
    b"just", b"lcar", b"mort", b"morx", b"opbd", b"prop", b"trak", b"Zapf", b"Silf", b"Glat",
    b"Gloc", b"Feat", b"Sill",
];

const ARBITRARY_TAG_INDEX: u8 = 63;
const NULL_TRANSFORM_GLYF_LOCA: u8 = 3;
const TRANSFORM_HMTX: u8 = 1;

#[derive(Clone, Copy, Debug)]
struct DirectoryEntry {
    tag: Tag,
    original_length: u32,
    /// The number of bytes the table occupies in the decompressed stream.
    stream_length: u32,
    transformed: bool,
}

fn read_directory_entry(reader: &mut &[u8]) -> Result<DirectoryEntry, DecodeError> {
    let flags = reader.read_u8()?;
    let tag_index = flags & 0x3f;
    let transform_version = flags >> 6;
    let tag = if tag_index == ARBITRARY_TAG_INDEX {
        Tag::from_u32(reader.read_u32::<BigEndian>()?)
    } else {
        Tag(*KNOWN_TAGS[usize::from(tag_index)])
    };
    let original_length = read_uint_base128(reader)?;

    let transformed = if tag == Tag::GLYF || tag == Tag::LOCA {
        match transform_version {
            0 => true,
            NULL_TRANSFORM_GLYF_LOCA => false,
            _ => return Err(DecodeError::MalformedTable(tag)),
        }
    } else {
        match transform_version {
            0 => false,
            TRANSFORM_HMTX if tag == Tag::HMTX => true,
            _ => return Err(DecodeError::MalformedTable(tag)),
        }
    };
    let stream_length = if transformed {
        let transform_length = read_uint_base128(reader)?;
        if tag == Tag::LOCA && transform_length != 0 {
            return Err(DecodeError::MalformedTable(tag));
        }
        transform_length
    } else {
        original_length
    };
    Ok(DirectoryEntry {
        tag,
        original_length,
        stream_length,
        transformed,
    })
}

/// Unwraps a WOFF 2.0 file into its sfnt version and tables, undoing table transforms.
pub(crate) fn decode(data: &[u8]) -> Result<(u32, BTreeMap<Tag, Vec<u8>>), DecodeError> {
    let mut reader = data;
    if reader.read_u32::<BigEndian>()? != WOFF2_SIGNATURE {
        return Err(DecodeError::UnknownFormat);
    }
    let flavor = reader.read_u32::<BigEndian>()?;
    let length = reader.read_u32::<BigEndian>()? as usize;
    let num_tables = reader.read_u16::<BigEndian>()?;
    let reserved = reader.read_u16::<BigEndian>()?;
    let total_sfnt_size = u64::from(reader.read_u32::<BigEndian>()?);
    let total_compressed_size = reader.read_u32::<BigEndian>()? as usize;
    if data.len() < HEADER_LENGTH || length > data.len() {
        return Err(DecodeError::Truncated);
    }
    if reserved != 0 {
        return Err(DecodeError::Malformed("nonzero reserved field in WOFF2 header"));
    }
    if flavor == COLLECTION_SIGNATURE {
        return Err(DecodeError::Collection(0));
    }
    if num_tables == 0 {
        return Err(DecodeError::Malformed("the table directory is empty"));
    }

    let mut directory = &data[HEADER_LENGTH..];
    let mut entries = Vec::with_capacity(usize::from(num_tables));
    for _ in 0..num_tables {
        entries.push(read_directory_entry(&mut directory)?);
    }
    let directory_end = data.len() - directory.len();
    let compressed = utils::slice(data, directory_end, total_compressed_size)
        .ok_or(DecodeError::Truncated)?;

    let expected_length: u64 = entries
        .iter()
        .map(|entry| u64::from(entry.stream_length))
        .sum();
    if total_sfnt_size > MAX_SFNT_SIZE {
        return Err(DecodeError::Malformed("WOFF2 font is too large"));
    }
    if expected_length > total_sfnt_size {
        return Err(DecodeError::Malformed(
            "WOFF2 tables are longer than the declared sfnt size",
        ));
    }
    let stream = decompress(compressed, expected_length)?;
    if stream.len() as u64 != expected_length {
        return Err(DecodeError::Decompression(format!(
            "expected {} bytes, decompressed {}",
            expected_length,
            stream.len()
        )));
    }

    let mut tables = BTreeMap::new();
    let mut transformed_glyf = None;
    let mut transformed_hmtx = None;
    let mut has_loca = false;
    let mut offset = 0;
    for entry in &entries {
        let table = &stream[offset..offset + entry.stream_length as usize];
        offset += entry.stream_length as usize;
        if tables.contains_key(&entry.tag)
            || (entry.tag == Tag::LOCA && has_loca)
            || (entry.tag == Tag::GLYF && transformed_glyf.is_some())
        {
            return Err(DecodeError::DuplicateTable(entry.tag));
        }
        match (entry.tag, entry.transformed) {
            (Tag::GLYF, true) => transformed_glyf = Some(table),
            (Tag::LOCA, true) => has_loca = true,
            (Tag::HMTX, true) => transformed_hmtx = Some(table),
            (tag, _) => {
                if tag == Tag::LOCA {
                    has_loca = true;
                }
                tables.insert(tag, table.to_vec());
            }
        }
    }

    let mut rebuilt_x_mins = None;
    if let Some(glyf_data) = transformed_glyf {
        if !has_loca || tables.contains_key(&Tag::LOCA) {
            return Err(DecodeError::Malformed(
                "a transformed glyf table needs a transformed loca table",
            ));
        }
        let rebuilt = woff2_transform::reconstruct_glyf(glyf_data)?;
        let loca_entry = entries.iter().find(|entry| entry.tag == Tag::LOCA);
        if let Some(loca_entry) = loca_entry {
            if loca_entry.original_length as usize != rebuilt.loca.len() {
                debug!(
                    "loca length {} differs from the declared {}",
                    rebuilt.loca.len(),
                    loca_entry.original_length
                );
            }
        }
        match tables.get_mut(&Tag::HEAD) {
            Some(head_table) if head::is_valid(head_table) => {
                head::set_long_loca(head_table, rebuilt.long_loca)
            }
            _ => return Err(DecodeError::MissingTable(Tag::HEAD)),
        }
        tables.insert(Tag::GLYF, rebuilt.glyf);
        tables.insert(Tag::LOCA, rebuilt.loca);
        rebuilt_x_mins = Some(rebuilt.x_mins);
    } else if has_loca && !tables.contains_key(&Tag::LOCA) {
        return Err(DecodeError::Malformed(
            "a transformed loca table needs a transformed glyf table",
        ));
    }

    if let Some(hmtx_data) = transformed_hmtx {
        let num_glyphs = tables
            .get(&Tag::MAXP)
            .and_then(|table| maxp::num_glyphs(table))
            .ok_or(DecodeError::MissingTable(Tag::MAXP))?;
        let number_of_h_metrics = tables
            .get(&Tag::HHEA)
            .and_then(|table| hmtx::number_of_h_metrics(table))
            .ok_or(DecodeError::MissingTable(Tag::HHEA))?;
        let x_mins = match rebuilt_x_mins {
            Some(x_mins) => x_mins,
            None => {
                let glyf_table = tables
                    .get(&Tag::GLYF)
                    .ok_or(DecodeError::MissingTable(Tag::GLYF))?;
                let loca_table = tables
                    .get(&Tag::LOCA)
                    .ok_or(DecodeError::MissingTable(Tag::LOCA))?;
                let head_table = tables
                    .get(&Tag::HEAD)
                    .filter(|table| head::is_valid(table))
                    .ok_or(DecodeError::MissingTable(Tag::HEAD))?;
                woff2_transform::x_mins(
                    glyf_table,
                    loca_table,
                    head::uses_long_loca(head_table),
                    num_glyphs,
                )?
            }
        };
        let rebuilt =
            woff2_transform::reconstruct_hmtx(hmtx_data, num_glyphs, number_of_h_metrics, &x_mins)?;
        tables.insert(Tag::HMTX, rebuilt);
    }

    Ok((flavor, tables))
}

#[cfg(feature = "woff2")]
fn decompress(compressed: &[u8], expected_length: u64) -> Result<Vec<u8>, DecodeError> {
    use std::io::Read;

    let mut stream = vec![];
    brotli::Decompressor::new(compressed, 4096)
        .take(expected_length + 1)
        .read_to_end(&mut stream)
        .map_err(|error| DecodeError::Decompression(error.to_string()))?;
    Ok(stream)
}

#[cfg(not(feature = "woff2"))]
fn decompress(_: &[u8], _: u64) -> Result<Vec<u8>, DecodeError> {
    Err(DecodeError::MissingCodec(CODEC_NAME))
}

#[cfg(feature = "woff2")]
fn compress(stream: &[u8], size_hint: usize) -> std::io::Result<Vec<u8>> {
    use brotli::enc::backward_references::BrotliEncoderMode;
    use brotli::enc::BrotliEncoderParams;

    let mut params = BrotliEncoderParams::default();
    params.mode = BrotliEncoderMode::BROTLI_MODE_FONT;
    params.quality = 11;
    params.lgwin = 22;
    params.size_hint = size_hint;

    let mut compressed = vec![];
    let mut reader = stream;
    brotli::enc::BrotliCompress(&mut reader, &mut compressed, &params)?;
    Ok(compressed)
}

/// The order of tables in a WOFF 2.0 directory: sorted by tag, except that `loca` directly
/// follows `glyf`.
fn directory_order(tables: &BTreeMap<Tag, Vec<u8>>) -> Vec<Tag> {
    let mut order = vec![];
    for &tag in tables.keys() {
        if tag == Tag::LOCA && tables.contains_key(&Tag::GLYF) {
            continue;
        }
        order.push(tag);
        if tag == Tag::GLYF && tables.contains_key(&Tag::LOCA) {
            order.push(Tag::LOCA);
        }
    }
    order
}

/// Writes fonts as WOFF 2.0.
///
/// Tables are stored untransformed (`glyf` and `loca` use the null transform) and compressed
/// as one brotli stream in font mode at the highest quality.
#[derive(Clone, Copy, Debug)]
pub struct Woff2Encoder {
    kind: ArtifactKind,
}

impl Woff2Encoder {
    /// An encoder for the full-font `.woff2` artifact.
    #[inline]
    pub fn new() -> Woff2Encoder {
        Woff2Encoder::for_kind(ArtifactKind::Woff2)
    }

    /// An encoder that reports its results and failures as `kind`.
    #[inline]
    pub fn for_kind(kind: ArtifactKind) -> Woff2Encoder {
        Woff2Encoder { kind }
    }

    /// Returns true if this build can produce WOFF 2.0 at all.
    #[inline]
    pub fn is_available() -> bool {
        cfg!(feature = "woff2")
    }
}

impl Default for Woff2Encoder {
    fn default() -> Woff2Encoder {
        Woff2Encoder::new()
    }
}

impl Encoder for Woff2Encoder {
    #[inline]
    fn kind(&self) -> ArtifactKind {
        self.kind
    }

    #[cfg(not(feature = "woff2"))]
    fn encode(&self, _: &Font) -> Result<Vec<u8>, ConversionError> {
        Err(ConversionError::MissingCodecDependency {
            format: self.kind,
            codec: CODEC_NAME,
        })
    }

    #[cfg(feature = "woff2")]
    fn encode(&self, font: &Font) -> Result<Vec<u8>, ConversionError> {
        use crate::codecs::sfnt;
        use crate::utils::write_uint_base128;

        let encoding_error = |reason: String| ConversionError::Encoding {
            format: self.kind,
            reason,
        };

        let sfnt_data = sfnt::write(font.sfnt_version(), font.tables());
        let (_, tables) =
            sfnt::decode(&sfnt_data).map_err(|error| encoding_error(error.to_string()))?;

        let order = directory_order(&tables);
        let mut directory = vec![];
        let mut stream = vec![];
        for tag in &order {
            let table = &tables[tag];
            let mut flags = KNOWN_TAGS
                .iter()
                .position(|known| **known == tag.0)
                .map_or(ARBITRARY_TAG_INDEX, |index| index as u8);
            if *tag == Tag::GLYF || *tag == Tag::LOCA {
                flags |= NULL_TRANSFORM_GLYF_LOCA << 6;
            }
            directory.push(flags);
            if flags & 0x3f == ARBITRARY_TAG_INDEX {
                directory.extend_from_slice(&tag.0);
            }
            write_uint_base128(&mut directory, table.len() as u32);
            stream.extend_from_slice(table);
        }

        let compressed =
            compress(&stream, sfnt_data.len()).map_err(|error| encoding_error(error.to_string()))?;

        let mut woff2 = Vec::with_capacity(HEADER_LENGTH + directory.len() + compressed.len() + 3);
        woff2.extend_from_slice(&WOFF2_SIGNATURE.to_be_bytes());
        woff2.extend_from_slice(&font.sfnt_version().to_be_bytes());
        let length_offset = woff2.len();
        woff2.extend_from_slice(&0u32.to_be_bytes());
        woff2.extend_from_slice(&(order.len() as u16).to_be_bytes());
        woff2.extend_from_slice(&0u16.to_be_bytes());
        woff2.extend_from_slice(&(sfnt_data.len() as u32).to_be_bytes());
        woff2.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
        woff2.extend_from_slice(&1u16.to_be_bytes());
        woff2.extend_from_slice(&0u16.to_be_bytes());
        // No extended metadata or private data block.
        woff2.extend_from_slice(&[0; 20]);
        woff2.extend_from_slice(&directory);
        woff2.extend_from_slice(&compressed);
        utils::pad4(&mut woff2);

        let length = (woff2.len() as u32).to_be_bytes();
        woff2[length_offset..length_offset + 4].copy_from_slice(&length);
        Ok(woff2)
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use super::{decode, directory_order, read_directory_entry};
    use crate::error::DecodeError;
    use crate::font::Font;
    use crate::tables::Tag;
    use crate::utils::write_uint_base128;

    #[test]
    fn loca_follows_glyf() {
        let mut tables = BTreeMap::new();
        for tag in &[Tag::CMAP, Tag::GLYF, Tag::HEAD, Tag::HMTX, Tag::LOCA, Tag::MAXP] {
            tables.insert(*tag, vec![]);
        }
        assert_eq!(
            directory_order(&tables),
            vec![Tag::CMAP, Tag::GLYF, Tag::LOCA, Tag::HEAD, Tag::HMTX, Tag::MAXP]
        );
    }

    #[test]
    fn directory_entries() {
        // Known `glyf` with the null transform.
        let mut reader: &[u8] = &[0xca, 0x81, 0x00];
        let entry = read_directory_entry(&mut reader).unwrap();
        assert_eq!(entry.tag, Tag::GLYF);
        assert!(!entry.transformed);
        assert_eq!(entry.stream_length, 128);

        // Arbitrary tag.
        let mut reader: &[u8] = &[0x3f, b'Z', b'Z', b'Z', b'Z', 0x05];
        let entry = read_directory_entry(&mut reader).unwrap();
        assert_eq!(entry.tag, Tag(*b"ZZZZ"));
        assert_eq!(entry.original_length, 5);

        // Transformed `hmtx` carries a transform length.
        let mut reader: &[u8] = &[0x43, 0x10, 0x08];
        let entry = read_directory_entry(&mut reader).unwrap();
        assert!(entry.transformed);
        assert_eq!(entry.stream_length, 8);

        // Transform version 2 is reserved for `glyf`.
        let mut reader: &[u8] = &[0x8a, 0x01];
        assert!(read_directory_entry(&mut reader).is_err());
    }

    /// Eight arbitrary-tag tables of 4 GiB each in front of four bytes of "compressed" data.
    fn oversized_woff2(total_sfnt_size: u32) -> Vec<u8> {
        let mut woff2 = vec![];
        woff2.extend_from_slice(b"wOF2");
        woff2.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        woff2.extend_from_slice(&132u32.to_be_bytes());
        woff2.extend_from_slice(&8u16.to_be_bytes());
        woff2.extend_from_slice(&0u16.to_be_bytes());
        woff2.extend_from_slice(&total_sfnt_size.to_be_bytes());
        woff2.extend_from_slice(&4u32.to_be_bytes());
        woff2.extend_from_slice(&1u16.to_be_bytes());
        woff2.extend_from_slice(&0u16.to_be_bytes());
        woff2.extend_from_slice(&[0; 20]);
        for index in 0..8 {
            woff2.push(0x3f);
            woff2.extend_from_slice(&[b'Z', b'Z', b'Z', b'0' + index]);
            write_uint_base128(&mut woff2, 0xffff_ffff);
        }
        woff2.extend_from_slice(&[0x1b, 0x03, 0x00, 0x00]);
        assert_eq!(woff2.len(), 132);
        woff2
    }

    #[test]
    fn oversized_declared_lengths_are_rejected() {
        for &total_sfnt_size in &[0xffff_ffff, 4096] {
            let woff2 = oversized_woff2(total_sfnt_size);
            assert!(matches!(decode(&woff2), Err(DecodeError::Malformed(_))));
            assert!(Font::from_bytes(&woff2).is_err());
        }
    }

    #[cfg(feature = "woff2")]
    #[test]
    fn encoded_fonts_decode_to_the_same_tables() {
        use crate::codecs::{Encoder, Woff2Encoder};
        use crate::fixture::FontBuilder;
        use crate::font::Font;

        let font = Font::from_bytes(&FontBuilder::new().glyphs(12).build()).unwrap();
        let woff2 = Woff2Encoder::new().encode(&font).unwrap();
        assert_eq!(&woff2[..4], b"wOF2");
        assert_eq!(woff2.len() % 4, 0);

        let (flavor, tables) = super::decode(&woff2).unwrap();
        assert_eq!(flavor, font.sfnt_version());
        assert_eq!(&tables, font.tables());
    }

    #[cfg(not(feature = "woff2"))]
    #[test]
    fn missing_brotli_is_reported() {
        use crate::codecs::{Encoder, Woff2Encoder};
        use crate::error::ConversionError;
        use crate::fixture::FontBuilder;
        use crate::font::Font;

        let font = Font::from_bytes(&FontBuilder::new().build()).unwrap();
        assert!(matches!(
            Woff2Encoder::new().encode(&font),
            Err(ConversionError::MissingCodecDependency { .. })
        ));
    }
}
