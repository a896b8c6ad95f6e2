// font-depot/src/tables/cmap.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The character to glyph index mapping table.

use byteorder::{BigEndian, ByteOrder};

use crate::utils::search_params;

/// A Unicode subtable of a `cmap` table, borrowed from the font data.
#[derive(Clone, Copy, Debug)]
pub struct CharMap<'a> {
    format: u16,
    data: &'a [u8],
}

impl<'a> CharMap<'a> {
    /// Picks the most capable Unicode subtable of a `cmap` table.
    ///
    /// Full-repertoire format 12 subtables win over BMP format 4 subtables, which win over the
    /// byte-oriented formats 0 and 6. Returns `None` if no supported Unicode subtable exists.
    pub fn parse(cmap: &'a [u8]) -> Option<CharMap<'a>> {
        if cmap.len() < 4 {
            return None;
        }
        let num_tables = usize::from(BigEndian::read_u16(&cmap[2..]));
        let mut best: Option<(u8, CharMap<'a>)> = None;
        for index in 0..num_tables {
            let record = cmap.get(4 + index * 8..4 + index * 8 + 8)?;
            let platform_id = BigEndian::read_u16(record);
            let encoding_id = BigEndian::read_u16(&record[2..]);
            let offset = BigEndian::read_u32(&record[4..]) as usize;
            let unicode = match (platform_id, encoding_id) {
                (0, _) | (3, 1) | (3, 10) => true,
                (1, 0) => false,
                _ => continue,
            };
            let subtable = match cmap.get(offset..) {
                Some(subtable) if subtable.len() >= 4 => subtable,
                _ => continue,
            };
            let format = BigEndian::read_u16(subtable);
            let rank = match format {
                12 if unicode => 4,
                4 if unicode => 3,
                6 => 2,
                0 => 1,
                _ => continue,
            };
            if best.map_or(true, |(best_rank, _)| rank > best_rank) {
                best = Some((rank, CharMap { format, data: subtable }));
            }
        }
        best.map(|(_, map)| map)
    }

    #[inline]
    pub fn format(&self) -> u16 {
        self.format
    }

    /// Returns the glyph mapped to `character`, or `None` if it maps to `.notdef` or the
    /// subtable is malformed around it.
    pub fn glyph_id(&self, character: char) -> Option<u16> {
        let code = character as u32;
        let glyph_id = match self.format {
            0 => self.lookup_format_0(code),
            4 => self.lookup_format_4(code),
            6 => self.lookup_format_6(code),
            12 => self.lookup_format_12(code),
            _ => None,
        }?;
        if glyph_id == 0 {
            None
        } else {
            Some(glyph_id)
        }
    }

    fn lookup_format_0(&self, code: u32) -> Option<u16> {
        if code > 0xff {
            return None;
        }
        self.data.get(6 + code as usize).map(|&glyph_id| u16::from(glyph_id))
    }

    fn lookup_format_4(&self, code: u32) -> Option<u16> {
        if code > 0xffff || self.data.len() < 14 {
            return None;
        }
        let seg_count_x2 = usize::from(BigEndian::read_u16(&self.data[6..]));
        let end_codes = 14;
        let start_codes = end_codes + seg_count_x2 + 2;
        let id_deltas = start_codes + seg_count_x2;
        let id_range_offsets = id_deltas + seg_count_x2;
        if self.data.len() < id_range_offsets + seg_count_x2 {
            return None;
        }

        let read = |offset: usize| BigEndian::read_u16(&self.data[offset..]);
        let mut segment = 0;
        while segment < seg_count_x2 {
            if u32::from(read(end_codes + segment)) >= code {
                break;
            }
            segment += 2;
        }
        if segment == seg_count_x2 {
            return None;
        }
        let start_code = u32::from(read(start_codes + segment));
        if start_code > code {
            return None;
        }

        let id_delta = read(id_deltas + segment);
        let id_range_offset = usize::from(read(id_range_offsets + segment));
        if id_range_offset == 0 {
            return Some((code as u16).wrapping_add(id_delta));
        }
        let address =
            id_range_offsets + segment + id_range_offset + 2 * (code - start_code) as usize;
        let glyph_id = BigEndian::read_u16(self.data.get(address..address + 2)?);
        if glyph_id == 0 {
            Some(0)
        } else {
            Some(glyph_id.wrapping_add(id_delta))
        }
    }

    fn lookup_format_6(&self, code: u32) -> Option<u16> {
        if self.data.len() < 10 {
            return None;
        }
        let first_code = u32::from(BigEndian::read_u16(&self.data[6..]));
        let entry_count = u32::from(BigEndian::read_u16(&self.data[8..]));
        if code < first_code || code - first_code >= entry_count {
            return None;
        }
        let offset = 10 + 2 * (code - first_code) as usize;
        self.data.get(offset..offset + 2).map(BigEndian::read_u16)
    }

    fn lookup_format_12(&self, code: u32) -> Option<u16> {
        if self.data.len() < 16 {
            return None;
        }
        let num_groups = BigEndian::read_u32(&self.data[12..]) as usize;
        let groups = self.data.get(16..16 + num_groups.checked_mul(12)?)?;
        for group in groups.chunks(12) {
            let start = BigEndian::read_u32(group);
            let end = BigEndian::read_u32(&group[4..]);
            if (start..=end).contains(&code) {
                let glyph_id = BigEndian::read_u32(&group[8..]) + (code - start);
                return if glyph_id > u32::from(u16::MAX) {
                    None
                } else {
                    Some(glyph_id as u16)
                };
            }
        }
        None
    }
}

/// Builds a `cmap` table from `(character, glyph)` pairs sorted by character.
///
/// A Windows BMP format 4 subtable is always written. A format 12 subtable covering every
/// mapping follows when any character lies outside the BMP.
pub fn build(mappings: &[(char, u16)]) -> Vec<u8> {
    let bmp: Vec<(u32, u16)> = mappings
        .iter()
        .map(|&(character, glyph_id)| (character as u32, glyph_id))
        .filter(|&(code, _)| code <= 0xffff)
        .collect();
    let has_supplementary = bmp.len() < mappings.len();

    let mut subtables = vec![((3u16, 1u16), build_format_4(&bmp))];
    if has_supplementary {
        let all: Vec<(u32, u16)> = mappings
            .iter()
            .map(|&(character, glyph_id)| (character as u32, glyph_id))
            .collect();
        subtables.push(((3, 10), build_format_12(&all)));
    }

    let mut cmap = vec![];
    cmap.extend_from_slice(&0u16.to_be_bytes());
    cmap.extend_from_slice(&(subtables.len() as u16).to_be_bytes());
    let mut offset = 4 + subtables.len() * 8;
    for &((platform_id, encoding_id), ref subtable) in &subtables {
        cmap.extend_from_slice(&platform_id.to_be_bytes());
        cmap.extend_from_slice(&encoding_id.to_be_bytes());
        cmap.extend_from_slice(&(offset as u32).to_be_bytes());
        offset += subtable.len();
    }
    for (_, subtable) in subtables {
        cmap.extend_from_slice(&subtable);
    }
    cmap
}

/// Splits sorted mappings into runs where both the code and the glyph advance by one.
fn runs(mappings: &[(u32, u16)]) -> Vec<(u32, u32, u16)> {
    let mut runs: Vec<(u32, u32, u16)> = vec![];
    for &(code, glyph_id) in mappings {
        if let Some(last) = runs.last_mut() {
            let (start, end, start_glyph) = *last;
            if code == end + 1 && u32::from(glyph_id) == u32::from(start_glyph) + (code - start) {
                last.1 = code;
                continue;
            }
        }
        runs.push((code, code, glyph_id));
    }
    runs
}

fn build_format_4(mappings: &[(u32, u16)]) -> Vec<u8> {
    let mut segments: Vec<(u16, u16, u16)> = runs(mappings)
        .into_iter()
        .map(|(start, end, glyph_id)| {
            (start as u16, end as u16, glyph_id.wrapping_sub(start as u16))
        })
        .collect();
    if segments.last().map_or(true, |&(_, end, _)| end != 0xffff) {
        segments.push((0xffff, 0xffff, 1));
    }

    let seg_count = segments.len() as u16;
    let (search_range, entry_selector, range_shift) = search_params(seg_count, 2);
    let length = 16 + segments.len() * 8;

    let mut data = Vec::with_capacity(length);
    for value in &[
        4,
        length as u16,
        0,
        seg_count * 2,
        search_range,
        entry_selector,
        range_shift,
    ] {
        data.extend_from_slice(&value.to_be_bytes());
    }
    for &(_, end, _) in &segments {
        data.extend_from_slice(&end.to_be_bytes());
    }
    data.extend_from_slice(&0u16.to_be_bytes());
    for &(start, _, _) in &segments {
        data.extend_from_slice(&start.to_be_bytes());
    }
    for &(_, _, delta) in &segments {
        data.extend_from_slice(&delta.to_be_bytes());
    }
    for _ in &segments {
        data.extend_from_slice(&0u16.to_be_bytes());
    }
    data
}

fn build_format_12(mappings: &[(u32, u16)]) -> Vec<u8> {
    let groups = runs(mappings);
    let length = 16 + groups.len() * 12;
    let mut data = Vec::with_capacity(length);
    data.extend_from_slice(&12u16.to_be_bytes());
    data.extend_from_slice(&0u16.to_be_bytes());
    data.extend_from_slice(&(length as u32).to_be_bytes());
    data.extend_from_slice(&0u32.to_be_bytes());
    data.extend_from_slice(&(groups.len() as u32).to_be_bytes());
    for (start, end, glyph_id) in groups {
        data.extend_from_slice(&start.to_be_bytes());
        data.extend_from_slice(&end.to_be_bytes());
        data.extend_from_slice(&u32::from(glyph_id).to_be_bytes());
    }
    data
}
