// font-depot/src/properties.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Numeric properties of a stored face.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// The degree of blackness or stroke thickness of a face, as declared by `OS/2.usWeightClass`.
///
/// Values range from 1 to 1000, with 400 as normal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightClass(pub u16);

impl Default for WeightClass {
    #[inline]
    fn default() -> WeightClass {
        WeightClass::NORMAL
    }
}

impl WeightClass {
    /// Thin weight (100), the thinnest named value.
    pub const THIN: WeightClass = WeightClass(100);
    /// Extra light weight (200).
    pub const EXTRA_LIGHT: WeightClass = WeightClass(200);
    /// Light weight (300).
    pub const LIGHT: WeightClass = WeightClass(300);
    /// Normal (400).
    pub const NORMAL: WeightClass = WeightClass(400);
    /// Medium weight (500, higher than normal).
    pub const MEDIUM: WeightClass = WeightClass(500);
    /// Semibold weight (600).
    pub const SEMIBOLD: WeightClass = WeightClass(600);
    /// Bold weight (700).
    pub const BOLD: WeightClass = WeightClass(700);
    /// Extra-bold weight (800).
    pub const EXTRA_BOLD: WeightClass = WeightClass(800);
    /// Black weight (900), the thickest named value.
    pub const BLACK: WeightClass = WeightClass(900);

    /// The largest weight class the format allows.
    pub const MAX: WeightClass = WeightClass(1000);

    /// Normalizes a raw `usWeightClass`.
    ///
    /// A missing table or a zero value means normal; values above 1000 are clamped.
    pub fn from_raw(raw: Option<u16>) -> WeightClass {
        match raw {
            None | Some(0) => WeightClass::NORMAL,
            Some(value) => WeightClass(value.min(WeightClass::MAX.0)),
        }
    }
}

impl Display for WeightClass {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}
