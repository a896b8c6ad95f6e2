// font-depot/src/convert.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Re-encodes an upload into each delivery format.

use log::debug;
use std::collections::BTreeMap;

use crate::binary::FontBinary;
use crate::codecs::{self, ArtifactKind, Encoder};
use crate::config::Formats;
use crate::error::ConversionError;

/// Produces the full-font delivery formats of an upload.
///
/// Every format starts from its own fresh decode of the original bytes, so a failure in one
/// encoder never affects another.
pub struct Converter {
    encoders: Vec<Box<dyn Encoder>>,
}

impl Converter {
    /// A converter for every full-font format.
    #[inline]
    pub fn new() -> Converter {
        Converter::from_encoders(codecs::default_encoders())
    }

    /// A converter for the full-font formats in `formats`.
    pub fn for_formats(formats: Formats) -> Converter {
        Converter::from_encoders(
            codecs::default_encoders()
                .into_iter()
                .filter(|encoder| formats.contains_kind(encoder.kind()))
                .collect(),
        )
    }

    /// A converter that runs the given encoders, in order.
    #[inline]
    pub fn from_encoders(encoders: Vec<Box<dyn Encoder>>) -> Converter {
        Converter { encoders }
    }

    /// The formats this converter produces, in the order it produces them.
    pub fn kinds(&self) -> Vec<ArtifactKind> {
        self.encoders.iter().map(|encoder| encoder.kind()).collect()
    }

    /// Encodes the binary into every format, one at a time.
    pub fn convert(
        &self,
        binary: &FontBinary,
    ) -> BTreeMap<ArtifactKind, Result<Vec<u8>, ConversionError>> {
        self.encoders
            .iter()
            .map(|encoder| (encoder.kind(), convert_one(&**encoder, binary)))
            .collect()
    }
}

impl Default for Converter {
    fn default() -> Converter {
        Converter::new()
    }
}

/// Decodes the binary afresh and encodes it with a single encoder.
pub fn convert_one(encoder: &dyn Encoder, binary: &FontBinary) -> Result<Vec<u8>, ConversionError> {
    let format = encoder.kind();
    let font = binary
        .load()
        .map_err(|source| ConversionError::Reparse { format, source })?;
    let data = encoder.encode(&font)?;
    debug!("encoded {} as {} ({} bytes)", binary.filename(), format, data.len());
    Ok(data)
}

#[cfg(test)]
mod test {
    use super::Converter;
    use crate::binary::FontBinary;
    use crate::codecs::ArtifactKind;
    use crate::config::Formats;
    use crate::error::ConversionError;
    use crate::fixture::FontBuilder;
    use crate::font::Font;

    #[test]
    fn every_format_decodes_back() {
        let data = FontBuilder::new().glyphs(10).build();
        let original = Font::from_bytes(&data).unwrap();
        let results = Converter::new().convert(&FontBinary::new("Fixture.ttf", data));
        assert_eq!(
            results.keys().copied().collect::<Vec<_>>(),
            vec![
                ArtifactKind::Ttf,
                ArtifactKind::Otf,
                ArtifactKind::Woff,
                ArtifactKind::Woff2
            ]
        );
        for (kind, result) in results {
            match result {
                Ok(encoded) => {
                    let decoded = Font::from_bytes(&encoded).unwrap();
                    assert_eq!(decoded.tables(), original.tables(), "{}", kind);
                }
                Err(ConversionError::MissingCodecDependency { .. }) => {
                    assert_eq!(kind, ArtifactKind::Woff2)
                }
                Err(error) => panic!("{}: {}", kind, error),
            }
        }
    }

    #[test]
    fn undecodable_input_fails_every_format() {
        let results = Converter::new().convert(&FontBinary::new("bad.ttf", vec![0, 1, 0, 0]));
        assert_eq!(results.len(), 4);
        for (kind, result) in results {
            match result {
                Err(ConversionError::Reparse { format, .. }) => assert_eq!(format, kind),
                other => panic!("unexpected result for {}: {:?}", kind, other.map(|d| d.len())),
            }
        }
    }

    #[test]
    fn formats_can_be_selected() {
        let converter = Converter::for_formats(Formats::WOFF | Formats::WOFF2_PREVIEW);
        assert_eq!(converter.kinds(), vec![ArtifactKind::Woff]);
    }
}
