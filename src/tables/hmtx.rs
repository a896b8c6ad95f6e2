// font-depot/src/tables/hmtx.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The horizontal header and horizontal metrics tables.

use byteorder::{BigEndian, ByteOrder};

const NUMBER_OF_H_METRICS_OFFSET: usize = 34;

/// Returns `hhea.numberOfHMetrics`, or `None` if the table is too short.
pub fn number_of_h_metrics(hhea: &[u8]) -> Option<u16> {
    if hhea.len() < NUMBER_OF_H_METRICS_OFFSET + 2 {
        return None;
    }
    Some(BigEndian::read_u16(&hhea[NUMBER_OF_H_METRICS_OFFSET..]))
}

/// Overwrites `hhea.numberOfHMetrics`. The table must hold at least 36 bytes.
pub fn set_number_of_h_metrics(hhea: &mut [u8], count: u16) {
    BigEndian::write_u16(&mut hhea[NUMBER_OF_H_METRICS_OFFSET..], count);
}

/// The advance width and left side bearing of one glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Metric {
    pub advance_width: u16,
    pub lsb: i16,
}

/// Expands `hmtx` into one metric per glyph.
///
/// Glyphs past `number_of_h_metrics` repeat the last advance width, as the format prescribes.
/// Returns `None` if the table is shorter than the counts require.
pub fn parse(hmtx: &[u8], number_of_h_metrics: u16, num_glyphs: u16) -> Option<Vec<Metric>> {
    let long_count = usize::from(number_of_h_metrics.min(num_glyphs));
    if long_count == 0 && num_glyphs > 0 {
        return None;
    }
    let short_count = usize::from(num_glyphs) - long_count;
    if hmtx.len() < long_count * 4 + short_count * 2 {
        return None;
    }

    let mut metrics = Vec::with_capacity(usize::from(num_glyphs));
    for index in 0..long_count {
        let record = &hmtx[index * 4..];
        metrics.push(Metric {
            advance_width: BigEndian::read_u16(record),
            lsb: BigEndian::read_i16(&record[2..]),
        });
    }
    let last_advance = metrics.last().map_or(0, |metric| metric.advance_width);
    for index in 0..short_count {
        metrics.push(Metric {
            advance_width: last_advance,
            lsb: BigEndian::read_i16(&hmtx[long_count * 4 + index * 2..]),
        });
    }
    Some(metrics)
}

/// Serializes metrics, folding trailing runs of equal advance widths into the short form.
///
/// Returns the table and the matching `numberOfHMetrics`.
pub fn build(metrics: &[Metric]) -> (Vec<u8>, u16) {
    let mut long_count = metrics.len();
    while long_count > 1
        && metrics[long_count - 2].advance_width == metrics[long_count - 1].advance_width
    {
        long_count -= 1;
    }

    let mut hmtx = Vec::with_capacity(long_count * 4 + (metrics.len() - long_count) * 2);
    for metric in &metrics[..long_count] {
        hmtx.extend_from_slice(&metric.advance_width.to_be_bytes());
        hmtx.extend_from_slice(&metric.lsb.to_be_bytes());
    }
    for metric in &metrics[long_count..] {
        hmtx.extend_from_slice(&metric.lsb.to_be_bytes());
    }
    (hmtx, long_count as u16)
}

#[cfg(test)]
mod test {
    use super::{build, parse, Metric};

    #[test]
    fn short_metrics_repeat_the_last_advance() {
        let hmtx = [0x01, 0xf4, 0x00, 0x0a, 0x00, 0x14, 0xff, 0xfe];
        let metrics = parse(&hmtx, 1, 3).unwrap();
        assert_eq!(
            metrics,
            vec![
                Metric { advance_width: 500, lsb: 10 },
                Metric { advance_width: 500, lsb: 20 },
                Metric { advance_width: 500, lsb: -2 },
            ]
        );

        let (rebuilt, count) = build(&metrics);
        assert_eq!(count, 1);
        assert_eq!(&rebuilt[..], &hmtx[..]);
    }

    #[test]
    fn truncated_tables_are_rejected() {
        assert!(parse(&[0, 1, 0], 1, 1).is_none());
        assert!(parse(&[], 0, 1).is_none());
    }
}
