// font-depot/src/tables/maxp.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The maximum profile table.

use byteorder::{BigEndian, ByteOrder};

const NUM_GLYPHS_OFFSET: usize = 4;

/// Returns `numGlyphs`, or `None` if the table is too short.
pub fn num_glyphs(maxp: &[u8]) -> Option<u16> {
    if maxp.len() < NUM_GLYPHS_OFFSET + 2 {
        return None;
    }
    Some(BigEndian::read_u16(&maxp[NUM_GLYPHS_OFFSET..]))
}

/// Overwrites `numGlyphs`. The table must hold at least six bytes.
pub fn set_num_glyphs(maxp: &mut [u8], num_glyphs: u16) {
    BigEndian::write_u16(&mut maxp[NUM_GLYPHS_OFFSET..], num_glyphs);
}
