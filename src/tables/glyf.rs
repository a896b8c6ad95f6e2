// font-depot/src/tables/glyf.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! TrueType glyph data.
//!
//! Glyphs are mostly treated as opaque byte strings. The only structure this crate looks into is
//! the header, the component records of composite glyphs, and enough of simple glyphs to write
//! them back out after WOFF2 decoding.

use bitflags::bitflags;
use byteorder::{BigEndian, ByteOrder};

/// Size of the glyph header: `numberOfContours` plus the bounding box.
pub const HEADER_LENGTH: usize = 10;

bitflags! {
    /// Flags of one component record in a composite glyph.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ComponentFlags: u16 {
        /// The offsets are 16-bit rather than 8-bit.
        const ARG_1_AND_2_ARE_WORDS = 0x0001;
        const ARGS_ARE_XY_VALUES = 0x0002;
        const ROUND_XY_TO_GRID = 0x0004;
        /// A single F2Dot14 scale follows the offsets.
        const WE_HAVE_A_SCALE = 0x0008;
        /// Another component record follows this one.
        const MORE_COMPONENTS = 0x0020;
        /// Separate x and y F2Dot14 scales follow the offsets.
        const WE_HAVE_AN_X_AND_Y_SCALE = 0x0040;
        /// A 2x2 F2Dot14 transform follows the offsets.
        const WE_HAVE_A_TWO_BY_TWO = 0x0080;
        /// Instructions follow the last component record.
        const WE_HAVE_INSTRUCTIONS = 0x0100;
        const USE_MY_METRICS = 0x0200;
        const OVERLAP_COMPOUND = 0x0400;
        const SCALED_COMPONENT_OFFSET = 0x0800;
        const UNSCALED_COMPONENT_OFFSET = 0x1000;
    }
}

impl ComponentFlags {
    /// The number of bytes that follow the flags and glyph index in this record.
    fn argument_length(self) -> usize {
        let offsets = if self.contains(ComponentFlags::ARG_1_AND_2_ARE_WORDS) {
            4
        } else {
            2
        };
        let transform = if self.contains(ComponentFlags::WE_HAVE_A_SCALE) {
            2
        } else if self.contains(ComponentFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            4
        } else if self.contains(ComponentFlags::WE_HAVE_A_TWO_BY_TWO) {
            8
        } else {
            0
        };
        offsets + transform
    }
}

/// One component reference inside a run of composite glyph records.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Component {
    /// Offset of the component's glyph index, relative to the start of the records.
    pub glyph_id_offset: usize,
    /// The referenced glyph.
    pub glyph_id: u16,
    pub flags: ComponentFlags,
}

/// The result of scanning a run of component records.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentRecords {
    pub components: Vec<Component>,
    /// The number of bytes the records occupy.
    pub length: usize,
    /// Whether any record announced trailing instructions.
    pub has_instructions: bool,
}

/// Walks the component records starting at the beginning of `records`.
///
/// Returns `None` if the records run past the end of the data.
pub fn scan_components(records: &[u8]) -> Option<ComponentRecords> {
    let mut components = vec![];
    let mut has_instructions = false;
    let mut offset = 0;
    loop {
        if offset + 4 > records.len() {
            return None;
        }
        let flags = ComponentFlags::from_bits_retain(BigEndian::read_u16(&records[offset..]));
        components.push(Component {
            glyph_id_offset: offset + 2,
            glyph_id: BigEndian::read_u16(&records[offset + 2..]),
            flags,
        });
        has_instructions |= flags.contains(ComponentFlags::WE_HAVE_INSTRUCTIONS);
        offset += 4 + flags.argument_length();
        if offset > records.len() {
            return None;
        }
        if !flags.contains(ComponentFlags::MORE_COMPONENTS) {
            break;
        }
    }
    Some(ComponentRecords {
        components,
        length: offset,
        has_instructions,
    })
}

/// Returns the data of glyph `glyph_id`, which is empty for glyphs without outlines.
///
/// Returns `None` if the glyph's `loca` range lies outside `glyf`.
pub fn glyph<'a>(glyf: &'a [u8], offsets: &[u32], glyph_id: u16) -> Option<&'a [u8]> {
    let index = usize::from(glyph_id);
    let start = *offsets.get(index)? as usize;
    let end = *offsets.get(index + 1)? as usize;
    glyf.get(start..end)
}

/// Returns `numberOfContours`; negative values mark composite glyphs.
pub fn number_of_contours(glyph: &[u8]) -> i16 {
    if glyph.len() < HEADER_LENGTH {
        0
    } else {
        BigEndian::read_i16(glyph)
    }
}

/// Returns the glyph's `xMin`, or zero for an empty glyph.
pub fn x_min(glyph: &[u8]) -> i16 {
    if glyph.len() < HEADER_LENGTH {
        0
    } else {
        BigEndian::read_i16(&glyph[2..])
    }
}

/// Returns the components of a composite glyph, or an empty list for simple and empty glyphs.
pub fn components(glyph: &[u8]) -> Option<Vec<Component>> {
    if number_of_contours(glyph) >= 0 {
        return Some(vec![]);
    }
    let records = scan_components(&glyph[HEADER_LENGTH..])?;
    Some(
        records
            .components
            .into_iter()
            .map(|component| Component {
                glyph_id_offset: component.glyph_id_offset + HEADER_LENGTH,
                ..component
            })
            .collect(),
    )
}

/// Rewrites the component glyph indices of a composite glyph in place.
///
/// Returns `false` if the glyph is malformed or `remap` has no entry for a component.
pub fn remap_components<F>(glyph: &mut [u8], mut remap: F) -> bool
where
    F: FnMut(u16) -> Option<u16>,
{
    let components = match components(glyph) {
        Some(components) => components,
        None => return false,
    };
    for component in components {
        match remap(component.glyph_id) {
            Some(glyph_id) => {
                BigEndian::write_u16(&mut glyph[component.glyph_id_offset..], glyph_id)
            }
            None => return false,
        }
    }
    true
}

/// A point of a simple glyph, in absolute font units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: i16,
    pub y: i16,
    pub on_curve: bool,
}

const ON_CURVE_POINT: u8 = 0x01;
const X_SHORT_VECTOR: u8 = 0x02;
const Y_SHORT_VECTOR: u8 = 0x04;
const REPEAT_FLAG: u8 = 0x08;
const X_IS_SAME_OR_POSITIVE: u8 = 0x10;
const Y_IS_SAME_OR_POSITIVE: u8 = 0x20;
const OVERLAP_SIMPLE: u8 = 0x40;

/// The outline and instructions of a simple glyph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimpleGlyph {
    /// Index of the last point of each contour.
    pub end_points: Vec<u16>,
    pub points: Vec<Point>,
    pub instructions: Vec<u8>,
    /// `xMin`, `yMin`, `xMax`, `yMax`.
    pub bbox: [i16; 4],
    /// Sets `OVERLAP_SIMPLE` on the first point.
    pub overlap: bool,
}

impl SimpleGlyph {
    /// Computes the bounding box from the points.
    pub fn compute_bbox(points: &[Point]) -> [i16; 4] {
        let mut points = points.iter();
        let first = match points.next() {
            Some(first) => first,
            None => return [0; 4],
        };
        points.fold([first.x, first.y, first.x, first.y], |bbox, point| {
            [
                bbox[0].min(point.x),
                bbox[1].min(point.y),
                bbox[2].max(point.x),
                bbox[3].max(point.y),
            ]
        })
    }

    /// Serializes the glyph with run-length compressed flags and short coordinates where
    /// possible.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(HEADER_LENGTH + self.points.len() * 5);
        data.extend_from_slice(&(self.end_points.len() as i16).to_be_bytes());
        for value in &self.bbox {
            data.extend_from_slice(&value.to_be_bytes());
        }
        for end_point in &self.end_points {
            data.extend_from_slice(&end_point.to_be_bytes());
        }
        data.extend_from_slice(&(self.instructions.len() as u16).to_be_bytes());
        data.extend_from_slice(&self.instructions);

        let mut flags = Vec::with_capacity(self.points.len());
        let mut xs = vec![];
        let mut ys = vec![];
        let (mut last_x, mut last_y) = (0i32, 0i32);
        for (index, point) in self.points.iter().enumerate() {
            let mut flag = if point.on_curve { ON_CURVE_POINT } else { 0 };
            if index == 0 && self.overlap {
                flag |= OVERLAP_SIMPLE;
            }
            let dx = i32::from(point.x) - last_x;
            let dy = i32::from(point.y) - last_y;
            flag |= encode_delta(dx, X_SHORT_VECTOR, X_IS_SAME_OR_POSITIVE, &mut xs);
            flag |= encode_delta(dy, Y_SHORT_VECTOR, Y_IS_SAME_OR_POSITIVE, &mut ys);
            last_x = i32::from(point.x);
            last_y = i32::from(point.y);
            flags.push(flag);
        }

        let mut index = 0;
        while index < flags.len() {
            let flag = flags[index];
            let mut repeat = 0;
            while repeat < 255
                && index + repeat + 1 < flags.len()
                && flags[index + repeat + 1] == flag
            {
                repeat += 1;
            }
            if repeat > 0 {
                data.push(flag | REPEAT_FLAG);
                data.push(repeat as u8);
            } else {
                data.push(flag);
            }
            index += repeat + 1;
        }
        data.extend_from_slice(&xs);
        data.extend_from_slice(&ys);
        data
    }
}

fn encode_delta(delta: i32, short: u8, same_or_positive: u8, out: &mut Vec<u8>) -> u8 {
    if delta == 0 {
        same_or_positive
    } else if delta.abs() <= 255 {
        out.push(delta.abs() as u8);
        if delta > 0 {
            short | same_or_positive
        } else {
            short
        }
    } else {
        out.extend_from_slice(&(delta as i16).to_be_bytes());
        0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn composite(components: &[(u16, u16)]) -> Vec<u8> {
        let mut glyph = vec![0xff, 0xff, 0, 0, 0, 0, 0, 10, 0, 10];
        for (index, &(flags, glyph_id)) in components.iter().enumerate() {
            let mut flags = flags;
            if index + 1 < components.len() {
                flags |= ComponentFlags::MORE_COMPONENTS.bits();
            }
            glyph.extend_from_slice(&flags.to_be_bytes());
            glyph.extend_from_slice(&glyph_id.to_be_bytes());
            let flags = ComponentFlags::from_bits_retain(flags);
            glyph.extend(std::iter::repeat(0).take(flags.argument_length()));
        }
        glyph
    }

    #[test]
    fn composite_components_are_found_and_remapped() {
        let mut glyph = composite(&[(0x0001, 7), (0x0008, 9)]);
        let found = components(&glyph).unwrap();
        assert_eq!(
            found.iter().map(|c| c.glyph_id).collect::<Vec<_>>(),
            vec![7, 9]
        );

        assert!(remap_components(&mut glyph, |glyph_id| Some(glyph_id - 5)));
        let found = components(&glyph).unwrap();
        assert_eq!(
            found.iter().map(|c| c.glyph_id).collect::<Vec<_>>(),
            vec![2, 4]
        );
        assert!(!remap_components(&mut glyph, |_| None));
    }

    #[test]
    fn truncated_composites_are_rejected() {
        let mut glyph = composite(&[(0x0001, 7)]);
        glyph.truncate(glyph.len() - 1);
        assert!(components(&glyph).is_none());
    }

    #[test]
    fn simple_glyph_encoding() {
        let points = [
            Point { x: 0, y: 0, on_curve: true },
            Point { x: 0, y: 700, on_curve: true },
            Point { x: 200, y: 700, on_curve: false },
        ];
        let glyph = SimpleGlyph {
            end_points: vec![2],
            points: points.to_vec(),
            instructions: vec![],
            bbox: SimpleGlyph::compute_bbox(&points),
            overlap: false,
        };
        assert_eq!(glyph.bbox, [0, 0, 200, 700]);
        let data = glyph.to_bytes();
        assert_eq!(number_of_contours(&data), 1);
        assert_eq!(x_min(&data), 0);
        // Header, one end point, instruction length, three flags, one x byte, one y word.
        assert_eq!(data.len(), 10 + 2 + 2 + 3 + 1 + 2);
        assert_eq!(&data[14..17], &[0x31, 0x11, 0x32]);
        assert_eq!(&data[17..], &[200, 0x02, 0xbc]);
    }
}
