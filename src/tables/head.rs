// font-depot/src/tables/head.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The font header table.

use byteorder::{BigEndian, ByteOrder};

/// The smallest valid `head` table.
pub const MIN_LENGTH: usize = 54;

/// Offset of `checkSumAdjustment`.
pub const CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;

const MAGIC_NUMBER_OFFSET: usize = 12;
const MAGIC_NUMBER: u32 = 0x5f0f_3cf5;
const INDEX_TO_LOC_FORMAT_OFFSET: usize = 50;

/// The whole-font checksum that `checkSumAdjustment` makes the font add up to.
pub const CHECKSUM_MAGIC: u32 = 0xb1b0_afba;

/// Returns true if `head` is long enough and carries the magic number.
pub fn is_valid(head: &[u8]) -> bool {
    head.len() >= MIN_LENGTH
        && BigEndian::read_u32(&head[MAGIC_NUMBER_OFFSET..]) == MAGIC_NUMBER
}

/// Returns true if `loca` uses 32-bit offsets.
///
/// The table must already have been validated with `is_valid`.
pub fn uses_long_loca(head: &[u8]) -> bool {
    BigEndian::read_i16(&head[INDEX_TO_LOC_FORMAT_OFFSET..]) != 0
}

/// Sets `indexToLocFormat`.
pub fn set_long_loca(head: &mut [u8], long: bool) {
    BigEndian::write_i16(&mut head[INDEX_TO_LOC_FORMAT_OFFSET..], long as i16);
}

/// Zeroes `checkSumAdjustment`, which must be done before table checksums are computed.
pub fn clear_checksum_adjustment(head: &mut [u8]) {
    BigEndian::write_u32(&mut head[CHECKSUM_ADJUSTMENT_OFFSET..], 0);
}
