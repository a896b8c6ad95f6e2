// font-depot/src/tables/loca.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The index-to-location table.

use byteorder::{BigEndian, ByteOrder};

/// Reads the `num_glyphs + 1` glyph offsets into `glyf`.
///
/// Returns `None` if the table is too short or the offsets are not monotonic.
pub fn parse(loca: &[u8], long: bool, num_glyphs: u16) -> Option<Vec<u32>> {
    let count = usize::from(num_glyphs) + 1;
    let entry_size = if long { 4 } else { 2 };
    if loca.len() < count * entry_size {
        return None;
    }

    let offsets: Vec<u32> = (0..count)
        .map(|index| {
            if long {
                BigEndian::read_u32(&loca[index * 4..])
            } else {
                u32::from(BigEndian::read_u16(&loca[index * 2..])) * 2
            }
        })
        .collect();

    if offsets.windows(2).any(|pair| pair[0] > pair[1]) {
        return None;
    }
    Some(offsets)
}

/// Serializes glyph offsets, choosing the short format whenever every offset allows it.
///
/// Returns the table and whether it uses the long format.
pub fn build(offsets: &[u32]) -> (Vec<u8>, bool) {
    let long = offsets
        .iter()
        .any(|&offset| offset % 2 != 0 || offset / 2 > u32::from(u16::MAX));
    let mut loca = Vec::with_capacity(offsets.len() * if long { 4 } else { 2 });
    for &offset in offsets {
        if long {
            loca.extend_from_slice(&offset.to_be_bytes());
        } else {
            loca.extend_from_slice(&((offset / 2) as u16).to_be_bytes());
        }
    }
    (loca, long)
}

#[cfg(test)]
mod test {
    use super::{build, parse};

    #[test]
    fn short_offsets_are_halved() {
        let (loca, long) = build(&[0, 100, 200, 300]);
        assert!(!long);
        assert_eq!(loca, vec![0, 0, 0, 50, 0, 100, 0, 150]);
        assert_eq!(parse(&loca, false, 3).unwrap(), vec![0, 100, 200, 300]);
    }

    #[test]
    fn large_or_odd_offsets_force_the_long_format() {
        let (loca, long) = build(&[0, 0x2_0000]);
        assert!(long);
        assert_eq!(parse(&loca, true, 1).unwrap(), vec![0, 0x2_0000]);

        assert!(build(&[0, 3]).1);
    }

    #[test]
    fn decreasing_offsets_are_rejected() {
        assert!(parse(&[0, 4, 0, 2], false, 1).is_none());
    }
}
