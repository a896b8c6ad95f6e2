// font-depot/src/subset.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reduces a font to the glyphs needed for a small set of characters.
//!
//! Only TrueType outlines are supported. The subset keeps `.notdef`, every glyph mapped from a
//! requested character and, transitively, the components of composite glyphs. Glyphs are
//! renumbered densely in their original order and every table that indexes glyphs is rebuilt or
//! dropped.

use log::debug;
use std::collections::{BTreeMap, BTreeSet};

use crate::binary::FontBinary;
use crate::codecs::{ArtifactKind, Encoder, Woff2Encoder};
use crate::error::SubsetError;
use crate::file_type::FileType;
use crate::font::Font;
use crate::tables::cmap::{self, CharMap};
use crate::tables::{glyf, head, hmtx, loca, maxp, os2, post, Tag};
use crate::utils;

/// Tables copied into the subset unchanged. None of them refer to glyph indices.
const PASSTHROUGH_TABLES: [Tag; 6] = [
    Tag::NAME,
    Tag::OS2,
    Tag::CVT,
    Tag::FPGM,
    Tag::PREP,
    Tag::GASP,
];

/// Produces WOFF 2.0 previews that cover a fixed character set.
pub struct Subsetter {
    characters: Vec<char>,
    encoder: Woff2Encoder,
}

impl Subsetter {
    pub fn new(characters: &[char]) -> Subsetter {
        let mut characters = characters.to_vec();
        characters.sort_unstable();
        characters.dedup();
        Subsetter {
            characters,
            encoder: Woff2Encoder::for_kind(ArtifactKind::Woff2Preview),
        }
    }

    /// The characters the preview covers, sorted and without duplicates.
    #[inline]
    pub fn characters(&self) -> &[char] {
        &self.characters
    }

    /// Decodes the binary afresh, subsets it and encodes the result as WOFF 2.0.
    pub fn subset(&self, binary: &FontBinary) -> Result<Vec<u8>, SubsetError> {
        let font = binary.load().map_err(SubsetError::Reparse)?;
        let subset = subset_font(&font, &self.characters)?;
        let data = self.encoder.encode(&subset).map_err(SubsetError::Encoding)?;
        debug!(
            "subset {} to {} glyphs ({} bytes)",
            binary.filename(),
            subset.num_glyphs().unwrap_or(0),
            data.len()
        );
        Ok(data)
    }
}

fn table(font: &Font, tag: Tag) -> Result<&[u8], SubsetError> {
    font.table(tag).ok_or(SubsetError::MissingTable(tag))
}

/// Reduces a TrueType-flavored font to the glyphs needed for `characters`.
pub fn subset_font(font: &Font, characters: &[char]) -> Result<Font, SubsetError> {
    if font.table(Tag::CFF).is_some() {
        return Err(SubsetError::UnsupportedOutlines(Tag::CFF));
    }
    if font.table(Tag::CFF2).is_some() {
        return Err(SubsetError::UnsupportedOutlines(Tag::CFF2));
    }

    let head_table = table(font, Tag::HEAD)?;
    let hhea_table = table(font, Tag::HHEA)?;
    let num_glyphs = table(font, Tag::MAXP)
        .map(maxp::num_glyphs)?
        .ok_or(SubsetError::MalformedTable(Tag::MAXP))?;
    let glyf_table = table(font, Tag::GLYF)?;
    let offsets = loca::parse(
        table(font, Tag::LOCA)?,
        head::uses_long_loca(head_table),
        num_glyphs,
    )
    .ok_or(SubsetError::MalformedTable(Tag::LOCA))?;
    let number_of_h_metrics =
        hmtx::number_of_h_metrics(hhea_table).ok_or(SubsetError::MalformedTable(Tag::HHEA))?;
    let metrics = hmtx::parse(table(font, Tag::HMTX)?, number_of_h_metrics, num_glyphs)
        .ok_or(SubsetError::MalformedTable(Tag::HMTX))?;
    let char_map =
        CharMap::parse(table(font, Tag::CMAP)?).ok_or(SubsetError::MalformedTable(Tag::CMAP))?;

    let mut mappings: Vec<(char, u16)> = characters
        .iter()
        .filter_map(|&character| {
            char_map
                .glyph_id(character)
                .filter(|&glyph_id| glyph_id < num_glyphs)
                .map(|glyph_id| (character, glyph_id))
        })
        .collect();
    if mappings.is_empty() {
        return Err(SubsetError::NoGlyphs);
    }
    mappings.sort_unstable();
    mappings.dedup_by_key(|&mut (character, _)| character);

    // Close the glyph set over composite components.
    let mut kept = BTreeSet::new();
    let mut pending: Vec<u16> = vec![0];
    pending.extend(mappings.iter().map(|&(_, glyph_id)| glyph_id));
    while let Some(glyph_id) = pending.pop() {
        if !kept.insert(glyph_id) {
            continue;
        }
        let glyph = glyf::glyph(glyf_table, &offsets, glyph_id)
            .ok_or(SubsetError::MalformedTable(Tag::GLYF))?;
        for component in glyf::components(glyph).ok_or(SubsetError::MalformedTable(Tag::GLYF))? {
            if component.glyph_id >= num_glyphs {
                return Err(SubsetError::MalformedTable(Tag::GLYF));
            }
            pending.push(component.glyph_id);
        }
    }

    let renumbered: BTreeMap<u16, u16> = kept
        .iter()
        .enumerate()
        .map(|(new_id, &old_id)| (old_id, new_id as u16))
        .collect();

    let mut new_glyf = vec![];
    let mut new_offsets = Vec::with_capacity(kept.len() + 1);
    let mut new_metrics = Vec::with_capacity(kept.len());
    for &old_id in &kept {
        new_offsets.push(new_glyf.len() as u32);
        let mut glyph = glyf::glyph(glyf_table, &offsets, old_id)
            .ok_or(SubsetError::MalformedTable(Tag::GLYF))?
            .to_vec();
        if glyf::number_of_contours(&glyph) < 0
            && !glyf::remap_components(&mut glyph, |component| {
                renumbered.get(&component).copied()
            })
        {
            return Err(SubsetError::MalformedTable(Tag::GLYF));
        }
        new_glyf.extend_from_slice(&glyph);
        utils::pad4(&mut new_glyf);
        new_metrics.push(metrics[usize::from(old_id)]);
    }
    new_offsets.push(new_glyf.len() as u32);

    let (new_loca, long_loca) = loca::build(&new_offsets);
    let mut new_head = head_table.to_vec();
    head::set_long_loca(&mut new_head, long_loca);

    let (new_hmtx, new_number_of_h_metrics) = hmtx::build(&new_metrics);
    let mut new_hhea = hhea_table.to_vec();
    hmtx::set_number_of_h_metrics(&mut new_hhea, new_number_of_h_metrics);

    let mut new_maxp = table(font, Tag::MAXP)?.to_vec();
    maxp::set_num_glyphs(&mut new_maxp, kept.len() as u16);

    let new_mappings: Vec<(char, u16)> = mappings
        .iter()
        .map(|&(character, glyph_id)| (character, renumbered[&glyph_id]))
        .collect();

    let mut tables = BTreeMap::new();
    for &tag in &PASSTHROUGH_TABLES {
        if let Some(data) = font.table(tag) {
            tables.insert(tag, data.to_vec());
        }
    }
    if let Some(os2_table) = tables.get_mut(&Tag::OS2) {
        if let (Some(&(first, _)), Some(&(last, _))) = (new_mappings.first(), new_mappings.last()) {
            os2::set_char_range(os2_table, first, last);
        }
    }
    tables.insert(Tag::CMAP, cmap::build(&new_mappings));
    tables.insert(Tag::GLYF, new_glyf);
    tables.insert(Tag::HEAD, new_head);
    tables.insert(Tag::HHEA, new_hhea);
    tables.insert(Tag::HMTX, new_hmtx);
    tables.insert(Tag::LOCA, new_loca);
    tables.insert(Tag::MAXP, new_maxp);
    tables.insert(Tag::POST, post::without_glyph_names(font.table(Tag::POST)));

    Font::from_tables(font.sfnt_version(), FileType::TrueType, tables).map_err(SubsetError::Reparse)
}
