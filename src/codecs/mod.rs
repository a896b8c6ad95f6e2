// font-depot/src/codecs/mod.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Container codecs: decoders for every accepted upload format and encoders for every delivery
//! format.

use serde::Serialize;
use std::fmt::{self, Display, Formatter};

use crate::error::ConversionError;
use crate::font::Font;

pub mod sfnt;
pub mod woff;
pub mod woff2;
mod woff2_transform;

pub use crate::codecs::sfnt::SfntEncoder;
pub use crate::codecs::woff::WoffEncoder;
pub use crate::codecs::woff2::Woff2Encoder;

/// The largest sfnt a compressed container may expand to. Declared sizes above this are
/// rejected before anything is inflated.
pub const MAX_SFNT_SIZE: u64 = 256 * 1024 * 1024;

/// One of the delivery formats stored next to an upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Plain sfnt, the canonical outline format (`.ttf`).
    Ttf,
    /// Plain sfnt without any web flavor (`.otf`).
    Otf,
    /// WOFF 1.0 (`.woff`).
    Woff,
    /// WOFF 2.0 (`.woff2`).
    Woff2,
    /// WOFF 2.0 of a character subset, for previews (`_preview.woff2`).
    Woff2Preview,
}

const PREVIEW_SUFFIX: &str = "_preview";

impl ArtifactKind {
    /// Every delivery format, in the order they are produced.
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Ttf,
        ArtifactKind::Otf,
        ArtifactKind::Woff,
        ArtifactKind::Woff2,
        ArtifactKind::Woff2Preview,
    ];

    /// The file extension, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Ttf => "ttf",
            ArtifactKind::Otf => "otf",
            ArtifactKind::Woff => "woff",
            ArtifactKind::Woff2 | ArtifactKind::Woff2Preview => "woff2",
        }
    }

    #[inline]
    pub fn is_preview(self) -> bool {
        self == ArtifactKind::Woff2Preview
    }

    /// The name of this artifact for an upload whose file name without extension is `stem`.
    pub fn file_name(self, stem: &str) -> String {
        if self.is_preview() {
            format!("{}{}.{}", stem, PREVIEW_SUFFIX, self.extension())
        } else {
            format!("{}.{}", stem, self.extension())
        }
    }

    /// Classifies a file found in a storage slot by its name.
    ///
    /// Extensions match case-insensitively. Returns `None` for anything that is not a
    /// recognized artifact, such as `metadata.json`.
    pub fn from_file_name(file_name: &str) -> Option<ArtifactKind> {
        let (stem, extension) = match file_name.rfind('.') {
            Some(index) => (&file_name[..index], &file_name[index + 1..]),
            None => return None,
        };
        match &*extension.to_ascii_lowercase() {
            "ttf" => Some(ArtifactKind::Ttf),
            "otf" => Some(ArtifactKind::Otf),
            "woff" => Some(ArtifactKind::Woff),
            "woff2" if stem.contains(PREVIEW_SUFFIX) => Some(ArtifactKind::Woff2Preview),
            "woff2" => Some(ArtifactKind::Woff2),
            _ => None,
        }
    }
}

impl Display for ArtifactKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            ArtifactKind::Woff2Preview => f.write_str("woff2 preview"),
            kind => f.write_str(kind.extension()),
        }
    }
}

/// Serializes a decoded font into one delivery format.
///
/// Encoders never see the original bytes, only a freshly decoded `Font`, so one encoder's
/// failure cannot leak into another format.
pub trait Encoder: Send + Sync {
    /// The format this encoder produces.
    fn kind(&self) -> ArtifactKind;

    /// Encodes the font.
    fn encode(&self, font: &Font) -> Result<Vec<u8>, ConversionError>;
}

/// The encoders for the full-font delivery formats, canonical format first.
pub fn default_encoders() -> Vec<Box<dyn Encoder>> {
    vec![
        Box::new(SfntEncoder::new(ArtifactKind::Ttf)),
        Box::new(SfntEncoder::new(ArtifactKind::Otf)),
        Box::new(WoffEncoder::new()),
        Box::new(Woff2Encoder::new()),
    ]
}
