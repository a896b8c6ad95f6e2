// font-depot/src/identity.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Determines where in the store a font belongs: its family, subfamily and weight class.

use crate::font::Font;
use crate::properties::WeightClass;
use crate::tables::name::NameId;

/// The subfamily of fonts that don't declare one.
pub const DEFAULT_SUBFAMILY: &str = "Regular";

/// Makes a name safe to use as a single directory name.
///
/// Every character that is not alphanumeric, `-` or a space becomes `_`. Applying this twice
/// gives the same result as applying it once.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// The canonical identity of a font: sanitized family and subfamily names plus weight class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontIdentity {
    family: String,
    subfamily: String,
    declared_subfamily: String,
    weight_class: WeightClass,
}

impl FontIdentity {
    /// Creates an identity from unsanitized names.
    pub fn new(family: &str, subfamily: &str, weight_class: WeightClass) -> FontIdentity {
        FontIdentity {
            family: sanitize(family),
            subfamily: sanitize(subfamily),
            declared_subfamily: subfamily.to_owned(),
            weight_class,
        }
    }

    /// Derives the identity of a decoded font.
    ///
    /// The typographic family and subfamily names win over the legacy ones; within each kind
    /// the last record in table order wins. `fallback_family` (normally the upload's file name
    /// without extension) stands in for a missing family name, and `Regular` for a missing
    /// subfamily name.
    pub fn resolve(font: &Font, fallback_family: &str) -> FontIdentity {
        let names = font.names();
        let family = names
            .get(NameId::TYPOGRAPHIC_FAMILY)
            .or_else(|| names.get(NameId::FAMILY))
            .unwrap_or(fallback_family);
        let subfamily = names
            .get(NameId::TYPOGRAPHIC_SUBFAMILY)
            .or_else(|| names.get(NameId::SUBFAMILY))
            .unwrap_or(DEFAULT_SUBFAMILY);
        FontIdentity::new(family, subfamily, WeightClass::from_raw(font.weight_class()))
    }

    /// The sanitized family name, used as the family directory.
    #[inline]
    pub fn family(&self) -> &str {
        &self.family
    }

    /// The sanitized subfamily name, used as the subfamily directory.
    #[inline]
    pub fn subfamily(&self) -> &str {
        &self.subfamily
    }

    /// The subfamily name as the font declares it, for messages.
    #[inline]
    pub fn declared_subfamily(&self) -> &str {
        &self.declared_subfamily
    }

    #[inline]
    pub fn weight_class(&self) -> WeightClass {
        self.weight_class
    }
}

#[cfg(test)]
mod test {
    use super::{sanitize, FontIdentity};
    use crate::fixture::FontBuilder;
    use crate::font::Font;
    use crate::properties::WeightClass;
    use crate::tables::name::{NameId, NameRecord};
    use crate::tables::Tag;

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize("Source Sans/Pro: Bold"), "Source Sans_Pro_ Bold");
        assert_eq!(sanitize("Noto-Sans 日本"), "Noto-Sans 日本");
        assert_eq!(sanitize("../etc"), "___etc");
    }

    #[test]
    fn sanitize_is_idempotent() {
        for name in &["a/b\\c", "Ünïcödé Sans", "x.y.z", "  ", "tab\there", "😀 Emoji"] {
            let once = sanitize(name);
            assert_eq!(sanitize(&once), once);
        }
    }

    #[test]
    fn missing_names_fall_back() {
        let data = FontBuilder::new()
            .no_names()
            .without_table(Tag::OS2)
            .build();
        let font = Font::from_bytes(&data).unwrap();
        let identity = FontIdentity::resolve(&font, "MyFont");
        assert_eq!(identity.family(), "MyFont");
        assert_eq!(identity.subfamily(), "Regular");
        assert_eq!(identity.weight_class(), WeightClass::NORMAL);
    }

    #[test]
    fn typographic_names_win() {
        let data = FontBuilder::new()
            .no_names()
            .name(NameRecord::windows(NameId::TYPOGRAPHIC_FAMILY, "Inter"))
            .name(NameRecord::windows(NameId::TYPOGRAPHIC_SUBFAMILY, "Semi Bold"))
            .name(NameRecord::windows(NameId::FAMILY, "Inter SemiBold"))
            .name(NameRecord::windows(NameId::SUBFAMILY, "Regular"))
            .weight(600)
            .build();
        let identity = FontIdentity::resolve(&Font::from_bytes(&data).unwrap(), "ignored");
        assert_eq!(identity.family(), "Inter");
        assert_eq!(identity.subfamily(), "Semi Bold");
        assert_eq!(identity.weight_class(), WeightClass::SEMIBOLD);
    }

    #[test]
    fn later_records_override_earlier_ones() {
        let data = FontBuilder::new()
            .no_names()
            .name(NameRecord::macintosh(NameId::FAMILY, "Old Name"))
            .name(NameRecord::windows(NameId::FAMILY, "New/Name"))
            .name(NameRecord::windows(NameId::SUBFAMILY, ""))
            .build();
        let identity = FontIdentity::resolve(&Font::from_bytes(&data).unwrap(), "ignored");
        assert_eq!(identity.family(), "New_Name");
        assert_eq!(identity.subfamily(), "Regular");
    }

    #[test]
    fn out_of_range_weights_are_normalized() {
        let zero = FontBuilder::new().weight(0).build();
        let heavy = FontBuilder::new().weight(1200).build();
        let resolve = |data: &[u8]| FontIdentity::resolve(&Font::from_bytes(data).unwrap(), "x");
        assert_eq!(resolve(&zero).weight_class(), WeightClass::NORMAL);
        assert_eq!(resolve(&heavy).weight_class(), WeightClass::MAX);
    }

    #[test]
    fn declared_subfamily_is_kept_for_messages() {
        let identity = FontIdentity::new("A/B", "Bold: Italic", WeightClass::BOLD);
        assert_eq!(identity.family(), "A_B");
        assert_eq!(identity.subfamily(), "Bold_ Italic");
        assert_eq!(identity.declared_subfamily(), "Bold: Italic");
    }
}
