// font-depot/src/fixture.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Synthetic fonts for tests and demos.
//!
//! Builds small but structurally complete TrueType fonts: a `.notdef` box, a run of simple
//! triangle glyphs mapped to letters and digits, and optional composite glyphs.

use byteorder::{BigEndian, ByteOrder};
use std::collections::BTreeMap;
use std::convert::TryFrom;

use crate::codecs::sfnt;
use crate::file_type::{SFNT_VERSION_OPENTYPE, SFNT_VERSION_TRUETYPE};
use crate::tables::glyf::{self, ComponentFlags, Point, SimpleGlyph};
use crate::tables::hmtx::{self, Metric};
use crate::tables::name::{NameId, NameRecord, NameTable};
use crate::tables::{cmap, head, loca, post, Tag};

const DEFAULT_CHARACTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Builds a synthetic font file.
///
/// Simple glyph `n` (counting from 1) is mapped to the `n`th character of `A-Za-z0-9`.
/// Composite glyphs follow the simple ones.
#[derive(Clone, Debug)]
pub struct FontBuilder {
    names: Vec<NameRecord>,
    weight_class: u16,
    simple_glyphs: u16,
    composites: Vec<(char, Vec<u16>)>,
    extra_mappings: Vec<(char, u16)>,
    cff: bool,
    omitted: Vec<Tag>,
    extra_tables: BTreeMap<Tag, Vec<u8>>,
}

impl Default for FontBuilder {
    fn default() -> FontBuilder {
        FontBuilder::new()
    }
}

impl FontBuilder {
    /// A regular-weight "Fixture Sans Regular" with four simple glyphs mapped to `A–D`.
    pub fn new() -> FontBuilder {
        FontBuilder {
            names: vec![
                NameRecord::windows(NameId::FAMILY, "Fixture Sans"),
                NameRecord::windows(NameId::SUBFAMILY, "Regular"),
            ],
            weight_class: 400,
            simple_glyphs: 4,
            composites: vec![],
            extra_mappings: vec![],
            cff: false,
            omitted: vec![],
            extra_tables: BTreeMap::new(),
        }
    }

    /// Replaces the legacy family name.
    pub fn family(mut self, family: &str) -> FontBuilder {
        self.names.retain(|record| record.name_id != NameId::FAMILY);
        self.names.push(NameRecord::windows(NameId::FAMILY, family));
        self
    }

    /// Replaces the legacy subfamily name.
    pub fn subfamily(mut self, subfamily: &str) -> FontBuilder {
        self.names.retain(|record| record.name_id != NameId::SUBFAMILY);
        self.names.push(NameRecord::windows(NameId::SUBFAMILY, subfamily));
        self
    }

    /// Appends a name record.
    pub fn name(mut self, record: NameRecord) -> FontBuilder {
        self.names.push(record);
        self
    }

    /// Removes every name record. The `name` table is still written, empty.
    pub fn no_names(mut self) -> FontBuilder {
        self.names.clear();
        self
    }

    pub fn weight(mut self, weight_class: u16) -> FontBuilder {
        self.weight_class = weight_class;
        self
    }

    /// Sets the number of simple glyphs after `.notdef`.
    pub fn glyphs(mut self, count: u16) -> FontBuilder {
        self.simple_glyphs = count;
        self
    }

    /// Adds a composite glyph built from `components` and maps `character` to it.
    pub fn composite(mut self, character: char, components: &[u16]) -> FontBuilder {
        self.composites.push((character, components.to_vec()));
        self
    }

    /// Maps an extra character to an existing glyph.
    pub fn map(mut self, character: char, glyph_id: u16) -> FontBuilder {
        self.extra_mappings.push((character, glyph_id));
        self
    }

    /// Builds a PostScript-flavored font: `OTTO` version and a `CFF ` table instead of
    /// `glyf` and `loca`.
    pub fn cff(mut self) -> FontBuilder {
        self.cff = true;
        self
    }

    /// Leaves a table out of the font.
    pub fn without_table(mut self, tag: Tag) -> FontBuilder {
        self.omitted.push(tag);
        self
    }

    /// Adds an arbitrary table.
    pub fn table(mut self, tag: Tag, data: Vec<u8>) -> FontBuilder {
        self.extra_tables.insert(tag, data);
        self
    }

    /// The total number of glyphs, including `.notdef`.
    pub fn num_glyphs(&self) -> u16 {
        1 + self.simple_glyphs + self.composites.len() as u16
    }

    /// The character-to-glyph mapping the font will carry.
    pub fn mappings(&self) -> Vec<(char, u16)> {
        let mut mappings: BTreeMap<char, u16> = DEFAULT_CHARACTERS
            .chars()
            .zip(1..=self.simple_glyphs)
            .collect();
        for (index, (character, _)) in self.composites.iter().enumerate() {
            mappings.insert(*character, 1 + self.simple_glyphs + index as u16);
        }
        for &(character, glyph_id) in &self.extra_mappings {
            mappings.insert(character, glyph_id);
        }
        mappings.into_iter().collect()
    }

    fn glyph_data(&self) -> Vec<Vec<u8>> {
        let notdef_points = [(50, 0), (50, 700), (450, 700), (450, 0)];
        let mut glyphs = vec![simple_glyph(&notdef_points)];
        for index in 1..=i16::try_from(self.simple_glyphs).unwrap_or(i16::MAX) {
            let x = (index % 50) * 10;
            glyphs.push(simple_glyph(&[(x, 0), (x + 100, 700), (x + 200, 0)]));
        }
        for (_, components) in &self.composites {
            glyphs.push(composite_glyph(components));
        }
        glyphs
    }

    pub fn build(&self) -> Vec<u8> {
        let num_glyphs = self.num_glyphs();
        let glyphs = self.glyph_data();
        let mut tables = BTreeMap::new();

        let mut head_table = vec![0; head::MIN_LENGTH];
        BigEndian::write_u32(&mut head_table[0..], 0x0001_0000);
        BigEndian::write_u32(&mut head_table[4..], 0x0001_0000);
        BigEndian::write_u32(&mut head_table[12..], 0x5f0f_3cf5);
        BigEndian::write_u16(&mut head_table[18..], 1000);
        BigEndian::write_i16(&mut head_table[36..], 0);
        BigEndian::write_i16(&mut head_table[38..], 0);
        BigEndian::write_i16(&mut head_table[40..], 1000);
        BigEndian::write_i16(&mut head_table[42..], 700);
        BigEndian::write_i16(&mut head_table[48..], 2);

        let metrics: Vec<Metric> = glyphs
            .iter()
            .enumerate()
            .map(|(glyph_id, glyph)| Metric {
                advance_width: 500 + (glyph_id as u16 % 3) * 100,
                lsb: glyf::x_min(glyph),
            })
            .collect();
        let (hmtx_table, number_of_h_metrics) = hmtx::build(&metrics);
        let mut hhea_table = vec![0; 36];
        BigEndian::write_u32(&mut hhea_table[0..], 0x0001_0000);
        BigEndian::write_i16(&mut hhea_table[4..], 800);
        BigEndian::write_i16(&mut hhea_table[6..], -200);
        BigEndian::write_u16(&mut hhea_table[10..], 700);
        hmtx::set_number_of_h_metrics(&mut hhea_table, number_of_h_metrics);

        let mut maxp_table = vec![0; 32];
        BigEndian::write_u32(&mut maxp_table[0..], 0x0001_0000);
        BigEndian::write_u16(&mut maxp_table[4..], num_glyphs);

        let mut os2_table = vec![0; 96];
        BigEndian::write_u16(&mut os2_table[0..], 4);
        BigEndian::write_u16(&mut os2_table[4..], self.weight_class);
        BigEndian::write_u16(&mut os2_table[6..], 5);

        let sfnt_version = if self.cff {
            maxp_table = maxp_table[..6].to_vec();
            BigEndian::write_u32(&mut maxp_table[0..], 0x0000_5000);
            tables.insert(Tag::CFF, vec![1, 0, 4, 2]);
            SFNT_VERSION_OPENTYPE
        } else {
            let mut glyf_table = vec![];
            let mut offsets = vec![];
            for glyph in &glyphs {
                offsets.push(glyf_table.len() as u32);
                glyf_table.extend_from_slice(glyph);
                if glyf_table.len() % 2 != 0 {
                    glyf_table.push(0);
                }
            }
            offsets.push(glyf_table.len() as u32);
            let (loca_table, long_loca) = loca::build(&offsets);
            head::set_long_loca(&mut head_table, long_loca);
            tables.insert(Tag::GLYF, glyf_table);
            tables.insert(Tag::LOCA, loca_table);
            SFNT_VERSION_TRUETYPE
        };

        tables.insert(Tag::HEAD, head_table);
        tables.insert(Tag::HHEA, hhea_table);
        tables.insert(Tag::HMTX, hmtx_table);
        tables.insert(Tag::MAXP, maxp_table);
        tables.insert(Tag::OS2, os2_table);
        tables.insert(Tag::NAME, NameTable::from_records(self.names.clone()).to_bytes());
        tables.insert(Tag::CMAP, cmap::build(&self.mappings()));
        tables.insert(Tag::POST, post::without_glyph_names(None));
        for (&tag, table) in &self.extra_tables {
            tables.insert(tag, table.clone());
        }
        for tag in &self.omitted {
            tables.remove(tag);
        }
        sfnt::write(sfnt_version, &tables)
    }
}

fn simple_glyph(points: &[(i16, i16)]) -> Vec<u8> {
    let points: Vec<Point> = points
        .iter()
        .map(|&(x, y)| Point { x, y, on_curve: true })
        .collect();
    SimpleGlyph {
        end_points: vec![points.len() as u16 - 1],
        bbox: SimpleGlyph::compute_bbox(&points),
        points,
        instructions: vec![],
        overlap: false,
    }
    .to_bytes()
}

fn composite_glyph(components: &[u16]) -> Vec<u8> {
    let mut glyph = vec![];
    glyph.extend_from_slice(&(-1i16).to_be_bytes());
    for value in &[0i16, 0, 600, 700] {
        glyph.extend_from_slice(&value.to_be_bytes());
    }
    for (index, &glyph_id) in components.iter().enumerate() {
        let mut flags = ComponentFlags::ARG_1_AND_2_ARE_WORDS | ComponentFlags::ARGS_ARE_XY_VALUES;
        if index + 1 < components.len() {
            flags |= ComponentFlags::MORE_COMPONENTS;
        }
        glyph.extend_from_slice(&flags.bits().to_be_bytes());
        glyph.extend_from_slice(&glyph_id.to_be_bytes());
        glyph.extend_from_slice(&(index as i16 * 100).to_be_bytes());
        glyph.extend_from_slice(&0i16.to_be_bytes());
    }
    glyph
}
