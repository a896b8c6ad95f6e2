// font-depot/src/codecs/woff2_transform.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reverses the WOFF 2.0 table transforms.
//!
//! The `glyf` transform splits glyph data into seven parallel streams and encodes point
//! coordinates as variable-length triplets; `loca` is dropped and must be regenerated. The
//! `hmtx` transform drops left side bearings that equal the glyph's `xMin`.

use byteorder::{BigEndian, ReadBytesExt};
use std::io;

use crate::error::DecodeError;
use crate::tables::glyf::{self, Point, SimpleGlyph};
use crate::tables::{loca, Tag};
use crate::utils::{self, read_255_uint16};

const GLYF_HEADER_LENGTH: usize = 36;
const OPTION_OVERLAP_SIMPLE_BITMAP: u16 = 0x0001;

const HMTX_PROPORTIONAL_LSBS_OMITTED: u8 = 0x01;
const HMTX_MONOSPACE_LSBS_OMITTED: u8 = 0x02;

/// The `glyf` and `loca` tables rebuilt from a transformed `glyf` stream.
pub(crate) struct ReconstructedGlyf {
    pub glyf: Vec<u8>,
    pub loca: Vec<u8>,
    /// Whether `loca` uses 32-bit offsets, to be mirrored in `head.indexToLocFormat`.
    pub long_loca: bool,
    /// `xMin` of every glyph, needed to undo the `hmtx` transform.
    pub x_mins: Vec<i16>,
}

struct Streams<'a> {
    n_contours: &'a [u8],
    n_points: &'a [u8],
    flags: &'a [u8],
    glyphs: &'a [u8],
    composites: &'a [u8],
    bbox_bitmap: &'a [u8],
    bboxes: &'a [u8],
    instructions: &'a [u8],
    overlap_bitmap: Option<&'a [u8]>,
}

fn malformed_glyf(_: io::Error) -> DecodeError {
    DecodeError::MalformedTable(Tag::GLYF)
}

fn take<'a>(stream: &mut &'a [u8], length: usize) -> Result<&'a [u8], DecodeError> {
    if stream.len() < length {
        return Err(DecodeError::MalformedTable(Tag::GLYF));
    }
    let (head, tail) = stream.split_at(length);
    *stream = tail;
    Ok(head)
}

#[inline]
fn bit_is_set(bitmap: &[u8], index: usize) -> bool {
    bitmap
        .get(index / 8)
        .map_or(false, |byte| byte & (0x80 >> (index % 8)) != 0)
}

/// Rebuilds `glyf` and `loca` from the transformed `glyf` table.
pub(crate) fn reconstruct_glyf(data: &[u8]) -> Result<ReconstructedGlyf, DecodeError> {
    let mut header = data;
    let _reserved = header.read_u16::<BigEndian>().map_err(malformed_glyf)?;
    let option_flags = header.read_u16::<BigEndian>().map_err(malformed_glyf)?;
    let num_glyphs = header.read_u16::<BigEndian>().map_err(malformed_glyf)?;
    let index_format = header.read_u16::<BigEndian>().map_err(malformed_glyf)?;
    let mut sizes = [0usize; 7];
    for size in &mut sizes {
        *size = header.read_u32::<BigEndian>().map_err(malformed_glyf)? as usize;
    }

    let mut rest = &data[GLYF_HEADER_LENGTH..];
    let n_contours = take(&mut rest, sizes[0])?;
    let n_points = take(&mut rest, sizes[1])?;
    let flags = take(&mut rest, sizes[2])?;
    let glyphs = take(&mut rest, sizes[3])?;
    let composites = take(&mut rest, sizes[4])?;
    let mut bbox_stream = take(&mut rest, sizes[5])?;
    let instructions = take(&mut rest, sizes[6])?;
    let bbox_bitmap = take(&mut bbox_stream, 4 * ((usize::from(num_glyphs) + 31) / 32))?;
    let overlap_bitmap = if option_flags & OPTION_OVERLAP_SIMPLE_BITMAP != 0 {
        Some(take(&mut rest, (usize::from(num_glyphs) + 7) / 8)?)
    } else {
        None
    };

    let mut streams = Streams {
        n_contours,
        n_points,
        flags,
        glyphs,
        composites,
        bbox_bitmap,
        bboxes: bbox_stream,
        instructions,
        overlap_bitmap,
    };

    let mut glyf_table = vec![];
    let mut offsets = Vec::with_capacity(usize::from(num_glyphs) + 1);
    let mut x_mins = Vec::with_capacity(usize::from(num_glyphs));
    for glyph_id in 0..usize::from(num_glyphs) {
        offsets.push(glyf_table.len() as u32);
        let glyph = streams.next_glyph(glyph_id)?;
        x_mins.push(glyf::x_min(&glyph));
        glyf_table.extend_from_slice(&glyph);
        utils::pad4(&mut glyf_table);
    }
    offsets.push(glyf_table.len() as u32);

    let long_loca = index_format != 0;
    if !long_loca && glyf_table.len() / 2 > usize::from(u16::MAX) {
        return Err(DecodeError::MalformedTable(Tag::LOCA));
    }
    let mut loca_table = Vec::with_capacity(offsets.len() * if long_loca { 4 } else { 2 });
    for offset in offsets {
        if long_loca {
            loca_table.extend_from_slice(&offset.to_be_bytes());
        } else {
            loca_table.extend_from_slice(&((offset / 2) as u16).to_be_bytes());
        }
    }

    Ok(ReconstructedGlyf {
        glyf: glyf_table,
        loca: loca_table,
        long_loca,
        x_mins,
    })
}

impl<'a> Streams<'a> {
    fn next_glyph(&mut self, glyph_id: usize) -> Result<Vec<u8>, DecodeError> {
        let n_contours = self
            .n_contours
            .read_i16::<BigEndian>()
            .map_err(malformed_glyf)?;
        let has_bbox = bit_is_set(self.bbox_bitmap, glyph_id);
        match n_contours {
            0 => {
                if has_bbox {
                    return Err(DecodeError::MalformedTable(Tag::GLYF));
                }
                Ok(vec![])
            }
            -1 => {
                if !has_bbox {
                    return Err(DecodeError::MalformedTable(Tag::GLYF));
                }
                self.composite_glyph()
            }
            n_contours if n_contours > 0 => {
                let overlap = self
                    .overlap_bitmap
                    .map_or(false, |bitmap| bit_is_set(bitmap, glyph_id));
                self.simple_glyph(n_contours as usize, has_bbox, overlap)
            }
            _ => Err(DecodeError::MalformedTable(Tag::GLYF)),
        }
    }

    fn read_bbox(&mut self) -> Result<[i16; 4], DecodeError> {
        let mut bbox = [0; 4];
        for value in &mut bbox {
            *value = self.bboxes.read_i16::<BigEndian>().map_err(malformed_glyf)?;
        }
        Ok(bbox)
    }

    fn read_instructions(&mut self) -> Result<&'a [u8], DecodeError> {
        let length = read_255_uint16(&mut self.glyphs).map_err(malformed_glyf)?;
        take(&mut self.instructions, usize::from(length))
    }

    fn composite_glyph(&mut self) -> Result<Vec<u8>, DecodeError> {
        let bbox = self.read_bbox()?;
        let records = glyf::scan_components(self.composites)
            .ok_or(DecodeError::MalformedTable(Tag::GLYF))?;
        let record_data = take(&mut self.composites, records.length)?;

        let mut glyph = Vec::with_capacity(glyf::HEADER_LENGTH + record_data.len());
        glyph.extend_from_slice(&(-1i16).to_be_bytes());
        for value in &bbox {
            glyph.extend_from_slice(&value.to_be_bytes());
        }
        glyph.extend_from_slice(record_data);
        if records.has_instructions {
            let instructions = self.read_instructions()?;
            glyph.extend_from_slice(&(instructions.len() as u16).to_be_bytes());
            glyph.extend_from_slice(instructions);
        }
        Ok(glyph)
    }

    fn simple_glyph(
        &mut self,
        n_contours: usize,
        has_bbox: bool,
        overlap: bool,
    ) -> Result<Vec<u8>, DecodeError> {
        let mut end_points = Vec::with_capacity(n_contours);
        let mut point_count = 0u32;
        for _ in 0..n_contours {
            let count = read_255_uint16(&mut self.n_points).map_err(malformed_glyf)?;
            point_count += u32::from(count);
            if point_count == 0 || point_count > u32::from(u16::MAX) + 1 {
                return Err(DecodeError::MalformedTable(Tag::GLYF));
            }
            end_points.push((point_count - 1) as u16);
        }

        let mut points = Vec::with_capacity(point_count as usize);
        let (mut x, mut y) = (0i32, 0i32);
        for _ in 0..point_count {
            let flag = self.flags.read_u8().map_err(malformed_glyf)?;
            let (dx, dy, on_curve) = decode_triplet(flag, &mut self.glyphs)?;
            x += dx;
            y += dy;
            points.push(Point {
                x: to_coordinate(x)?,
                y: to_coordinate(y)?,
                on_curve,
            });
        }

        let instructions = self.read_instructions()?.to_vec();
        let bbox = if has_bbox {
            self.read_bbox()?
        } else {
            SimpleGlyph::compute_bbox(&points)
        };
        Ok(SimpleGlyph {
            end_points,
            points,
            instructions,
            bbox,
            overlap,
        }
        .to_bytes())
    }
}

fn to_coordinate(value: i32) -> Result<i16, DecodeError> {
    if value < i32::from(i16::MIN) || value > i32::from(i16::MAX) {
        Err(DecodeError::MalformedTable(Tag::GLYF))
    } else {
        Ok(value as i16)
    }
}

#[inline]
fn with_sign(flag: u8, magnitude: i32) -> i32 {
    if flag & 1 != 0 {
        magnitude
    } else {
        -magnitude
    }
}

/// Decodes one coordinate triplet, returning `(dx, dy, on_curve)`.
fn decode_triplet(flag: u8, glyphs: &mut &[u8]) -> Result<(i32, i32, bool), DecodeError> {
    let on_curve = flag >> 7 == 0;
    let flag = flag & 0x7f;
    let byte_count = if flag < 84 {
        1
    } else if flag < 120 {
        2
    } else if flag < 124 {
        3
    } else {
        4
    };
    let bytes = take(glyphs, byte_count)?;
    let data: Vec<i32> = bytes.iter().map(|&byte| i32::from(byte)).collect();
    let flag32 = i32::from(flag);

    let (dx, dy) = if flag < 10 {
        (0, with_sign(flag, ((flag32 & 14) << 7) + data[0]))
    } else if flag < 20 {
        (with_sign(flag, (((flag32 - 10) & 14) << 7) + data[0]), 0)
    } else if flag < 84 {
        let b0 = flag32 - 20;
        let b1 = data[0];
        (
            with_sign(flag, 1 + (b0 & 0x30) + (b1 >> 4)),
            with_sign(flag >> 1, 1 + ((b0 & 0x0c) << 2) + (b1 & 0x0f)),
        )
    } else if flag < 120 {
        let b0 = flag32 - 84;
        (
            with_sign(flag, 1 + ((b0 / 12) << 8) + data[0]),
            with_sign(flag >> 1, 1 + (((b0 % 12) >> 2) << 8) + data[1]),
        )
    } else if flag < 124 {
        (
            with_sign(flag, (data[0] << 4) + (data[1] >> 4)),
            with_sign(flag >> 1, ((data[1] & 0x0f) << 8) + data[2]),
        )
    } else {
        (
            with_sign(flag, (data[0] << 8) + data[1]),
            with_sign(flag >> 1, (data[2] << 8) + data[3]),
        )
    };
    Ok((dx, dy, on_curve))
}

/// Returns the `xMin` of every glyph in untransformed `glyf` and `loca` tables.
pub(crate) fn x_mins(
    glyf_table: &[u8],
    loca_table: &[u8],
    long_loca: bool,
    num_glyphs: u16,
) -> Result<Vec<i16>, DecodeError> {
    let offsets = loca::parse(loca_table, long_loca, num_glyphs)
        .ok_or(DecodeError::MalformedTable(Tag::LOCA))?;
    (0..num_glyphs)
        .map(|glyph_id| {
            glyf::glyph(glyf_table, &offsets, glyph_id)
                .map(glyf::x_min)
                .ok_or(DecodeError::MalformedTable(Tag::GLYF))
        })
        .collect()
}

/// Rebuilds `hmtx` from its transformed form.
pub(crate) fn reconstruct_hmtx(
    data: &[u8],
    num_glyphs: u16,
    number_of_h_metrics: u16,
    x_mins: &[i16],
) -> Result<Vec<u8>, DecodeError> {
    let malformed = |_| DecodeError::MalformedTable(Tag::HMTX);
    let mut reader = data;
    let flags = reader.read_u8().map_err(malformed)?;
    if flags & !(HMTX_PROPORTIONAL_LSBS_OMITTED | HMTX_MONOSPACE_LSBS_OMITTED) != 0
        || flags == 0
        || number_of_h_metrics == 0
        || number_of_h_metrics > num_glyphs
        || x_mins.len() != usize::from(num_glyphs)
    {
        return Err(DecodeError::MalformedTable(Tag::HMTX));
    }

    let long_count = usize::from(number_of_h_metrics);
    let mut advances = Vec::with_capacity(long_count);
    for _ in 0..long_count {
        advances.push(reader.read_u16::<BigEndian>().map_err(malformed)?);
    }

    let mut lsbs = Vec::with_capacity(usize::from(num_glyphs));
    for (glyph_id, &x_min) in x_mins.iter().enumerate() {
        let omitted = if glyph_id < long_count {
            flags & HMTX_PROPORTIONAL_LSBS_OMITTED != 0
        } else {
            flags & HMTX_MONOSPACE_LSBS_OMITTED != 0
        };
        lsbs.push(if omitted {
            x_min
        } else {
            reader.read_i16::<BigEndian>().map_err(malformed)?
        });
    }

    let mut hmtx = Vec::with_capacity(long_count * 4 + (lsbs.len() - long_count) * 2);
    for (advance, lsb) in advances.iter().zip(&lsbs) {
        hmtx.extend_from_slice(&advance.to_be_bytes());
        hmtx.extend_from_slice(&lsb.to_be_bytes());
    }
    for lsb in &lsbs[long_count..] {
        hmtx.extend_from_slice(&lsb.to_be_bytes());
    }
    Ok(hmtx)
}

#[cfg(test)]
mod test {
    use byteorder::{BigEndian, ByteOrder};

    use super::{decode_triplet, reconstruct_glyf, reconstruct_hmtx};
    use crate::tables::{glyf, loca};

    #[test]
    fn triplets() {
        // One byte, y only, positive.
        let mut stream: &[u8] = &[5];
        assert_eq!(decode_triplet(1, &mut stream).unwrap(), (0, 5, true));
        // One byte, x only, negative, off curve.
        let mut stream: &[u8] = &[7];
        assert_eq!(decode_triplet(0x80 | 10, &mut stream).unwrap(), (-7, 0, false));
        // Two nibbles.
        let mut stream: &[u8] = &[0x23];
        assert_eq!(decode_triplet(23, &mut stream).unwrap(), (3, 4, true));
        // Two 16-bit values.
        let mut stream: &[u8] = &[0x01, 0x00, 0x02, 0x00];
        assert_eq!(decode_triplet(124, &mut stream).unwrap(), (-256, -512, true));
        assert!(stream.is_empty());

        let mut short: &[u8] = &[0x01];
        assert!(decode_triplet(125, &mut short).is_err());
    }

    /// Two glyphs: an empty `.notdef` and a triangle with explicit 16-bit triplets.
    fn transformed_glyf() -> Vec<u8> {
        let n_contours = [0x00, 0x00, 0x00, 0x01];
        let n_points = [3];
        let flags = [127, 127, 124];
        let glyphs = [
            0x00, 0x64, 0x00, 0x00, // +100, +0
            0x00, 0x64, 0x01, 0x2c, // +100, +300
            0x00, 0x96, 0x01, 0x2c, // -150, -300
            0x01, // instruction length
        ];
        let bbox = [0, 0, 0, 0];
        let instructions = [0xb0];

        let mut data = vec![0, 0, 0, 0, 0, 2, 0, 0];
        for size in &[
            n_contours.len(),
            n_points.len(),
            flags.len(),
            glyphs.len(),
            0,
            bbox.len(),
            instructions.len(),
        ] {
            data.extend_from_slice(&(*size as u32).to_be_bytes());
        }
        data.extend_from_slice(&n_contours);
        data.extend_from_slice(&n_points);
        data.extend_from_slice(&flags);
        data.extend_from_slice(&glyphs);
        data.extend_from_slice(&bbox);
        data.extend_from_slice(&instructions);
        data
    }

    #[test]
    fn simple_glyphs_are_rebuilt() {
        let rebuilt = reconstruct_glyf(&transformed_glyf()).unwrap();
        assert!(!rebuilt.long_loca);
        let offsets = loca::parse(&rebuilt.loca, false, 2).unwrap();
        assert_eq!(offsets[0], offsets[1]);

        let triangle = glyf::glyph(&rebuilt.glyf, &offsets, 1).unwrap();
        assert_eq!(glyf::number_of_contours(triangle), 1);
        let bbox: Vec<i16> = (0..4)
            .map(|index| BigEndian::read_i16(&triangle[2 + index * 2..]))
            .collect();
        assert_eq!(bbox, vec![50, 0, 200, 300]);
        // End point of the only contour, then one byte of instructions.
        assert_eq!(BigEndian::read_u16(&triangle[10..]), 2);
        assert_eq!(BigEndian::read_u16(&triangle[12..]), 1);
        assert_eq!(triangle[14], 0xb0);
        assert_eq!(rebuilt.x_mins, vec![0, 50]);
    }

    #[test]
    fn truncated_streams_are_rejected() {
        let data = transformed_glyf();
        assert!(reconstruct_glyf(&data[..data.len() - 1]).is_err());
        assert!(reconstruct_glyf(&data[..20]).is_err());
    }

    #[test]
    fn omitted_side_bearings_come_from_x_min() {
        // Two long metrics with omitted lsbs, one monospaced glyph with an explicit lsb.
        let data = [0x01, 0x01, 0xf4, 0x02, 0x58, 0xff, 0xf6];
        let hmtx = reconstruct_hmtx(&data, 3, 2, &[0, 50, 7]).unwrap();
        assert_eq!(
            hmtx,
            vec![0x01, 0xf4, 0x00, 0x00, 0x02, 0x58, 0x00, 0x32, 0xff, 0xf6]
        );

        assert!(reconstruct_hmtx(&[0x00, 0, 1], 1, 1, &[0]).is_err());
    }
}
