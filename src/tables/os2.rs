// font-depot/src/tables/os2.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The OS/2 and Windows metrics table.

use byteorder::{BigEndian, ByteOrder};

const US_WEIGHT_CLASS_OFFSET: usize = 4;

/// Returns `usWeightClass`, or `None` if the table is too short to contain it.
pub fn weight_class(os2: &[u8]) -> Option<u16> {
    if os2.len() < US_WEIGHT_CLASS_OFFSET + 2 {
        return None;
    }
    Some(BigEndian::read_u16(&os2[US_WEIGHT_CLASS_OFFSET..]))
}

const US_FIRST_CHAR_INDEX_OFFSET: usize = 64;

/// Overwrites `usFirstCharIndex` and `usLastCharIndex`, which both saturate at U+FFFF.
///
/// Tables too short to hold the fields are left alone.
pub fn set_char_range(os2: &mut [u8], first: char, last: char) {
    if os2.len() < US_FIRST_CHAR_INDEX_OFFSET + 4 {
        return;
    }
    let clamp = |character: char| (character as u32).min(0xffff) as u16;
    BigEndian::write_u16(&mut os2[US_FIRST_CHAR_INDEX_OFFSET..], clamp(first));
    BigEndian::write_u16(&mut os2[US_FIRST_CHAR_INDEX_OFFSET + 2..], clamp(last));
}

#[cfg(test)]
mod test {
    use super::{set_char_range, weight_class};

    #[test]
    fn fields() {
        let mut os2 = vec![0; 78];
        os2[4] = 0x02;
        os2[5] = 0xbc;
        assert_eq!(weight_class(&os2), Some(700));
        assert_eq!(weight_class(&os2[..5]), None);

        set_char_range(&mut os2, ' ', '😀');
        assert_eq!(&os2[64..68], &[0x00, 0x20, 0xff, 0xff]);
    }
}
