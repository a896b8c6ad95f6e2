// font-depot/src/utils.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Miscellaneous utilities for use in this crate.

use byteorder::{BigEndian, ReadBytesExt};
use std::io;

/// Rounds `length` up to the next multiple of four.
#[inline]
pub(crate) fn align4(length: usize) -> usize {
    (length + 3) & !3
}

/// Appends zero bytes until the buffer length is a multiple of four.
pub(crate) fn pad4(buffer: &mut Vec<u8>) {
    let padded = align4(buffer.len());
    buffer.resize(padded, 0);
}

/// The OpenType table checksum: the wrapping sum of the data as big-endian `u32`s, with the
/// final word zero-padded.
pub fn checksum(data: &[u8]) -> u32 {
    let mut sum = 0u32;
    let mut words = data.chunks_exact(4);
    for word in &mut words {
        sum = sum.wrapping_add(u32::from_be_bytes([word[0], word[1], word[2], word[3]]));
    }
    let remainder = words.remainder();
    if !remainder.is_empty() {
        let mut last = [0; 4];
        last[..remainder.len()].copy_from_slice(remainder);
        sum = sum.wrapping_add(u32::from_be_bytes(last));
    }
    sum
}

/// Returns `data[offset..offset + length]`, or `None` if that range is out of bounds.
#[inline]
pub(crate) fn slice(data: &[u8], offset: usize, length: usize) -> Option<&[u8]> {
    let end = offset.checked_add(length)?;
    data.get(offset..end)
}

/// Computes the `searchRange`, `entrySelector` and `rangeShift` binary search header fields for
/// `count` records of `record_size` bytes each.
pub(crate) fn search_params(count: u16, record_size: u16) -> (u16, u16, u16) {
    let (count, record_size) = (u32::from(count), u32::from(record_size));
    let mut entry_selector = 0u32;
    while count >> (entry_selector + 1) != 0 {
        entry_selector += 1;
    }
    let search_range = if count == 0 {
        0
    } else {
        (1u32 << entry_selector) * record_size
    };
    let range_shift = (count * record_size).saturating_sub(search_range);
    (search_range as u16, entry_selector as u16, range_shift as u16)
}

/// Reads a WOFF2 `UIntBase128` value.
pub(crate) fn read_uint_base128(reader: &mut &[u8]) -> io::Result<u32> {
    let mut accumulator = 0u32;
    for index in 0..5 {
        let byte = reader.read_u8()?;
        // Leading zeros are not allowed.
        if index == 0 && byte == 0x80 {
            return Err(invalid_data("UIntBase128 with leading zeros"));
        }
        if accumulator & 0xfe00_0000 != 0 {
            return Err(invalid_data("UIntBase128 overflow"));
        }
        accumulator = (accumulator << 7) | u32::from(byte & 0x7f);
        if byte & 0x80 == 0 {
            return Ok(accumulator);
        }
    }
    Err(invalid_data("UIntBase128 longer than five bytes"))
}

/// Appends `value` as a WOFF2 `UIntBase128`.
pub(crate) fn write_uint_base128(buffer: &mut Vec<u8>, value: u32) {
    let mut size = 1;
    while size < 5 && value >> (7 * size) != 0 {
        size += 1;
    }
    for index in (0..size).rev() {
        let mut byte = ((value >> (7 * index)) & 0x7f) as u8;
        if index != 0 {
            byte |= 0x80;
        }
        buffer.push(byte);
    }
}

/// Reads a WOFF2 `255UInt16` value.
pub(crate) fn read_255_uint16(reader: &mut &[u8]) -> io::Result<u16> {
    const WORD_CODE: u8 = 253;
    const ONE_MORE_BYTE_CODE_2: u8 = 254;
    const ONE_MORE_BYTE_CODE_1: u8 = 255;
    const LOWEST_U_CODE: u16 = 253;

    match reader.read_u8()? {
        WORD_CODE => reader.read_u16::<BigEndian>(),
        ONE_MORE_BYTE_CODE_1 => Ok(u16::from(reader.read_u8()?) + LOWEST_U_CODE),
        ONE_MORE_BYTE_CODE_2 => Ok(u16::from(reader.read_u8()?) + LOWEST_U_CODE * 2),
        code => Ok(u16::from(code)),
    }
}

pub(crate) fn invalid_data(message: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}
