// font-depot/src/config.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Settings for an ingestion pipeline: where the store lives and what gets produced.

use bitflags::bitflags;
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};

use crate::codecs::ArtifactKind;

lazy_static! {
    /// The characters kept in preview subsets: basic Latin letters and digits, the German
    /// umlauts and eszett, and a little punctuation.
    pub static ref DEFAULT_PREVIEW_CHARACTERS: Vec<char> =
        "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789öäüß.,-_"
            .chars()
            .collect();
}

bitflags! {
    /// A set of delivery formats.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Formats: u8 {
        const TTF = 0x01;
        const OTF = 0x02;
        const WOFF = 0x04;
        const WOFF2 = 0x08;
        /// The subset preview. Only produced when `WOFF2` succeeds.
        const WOFF2_PREVIEW = 0x10;
    }
}

impl Formats {
    /// The flag for a single delivery format.
    pub fn from_kind(kind: ArtifactKind) -> Formats {
        match kind {
            ArtifactKind::Ttf => Formats::TTF,
            ArtifactKind::Otf => Formats::OTF,
            ArtifactKind::Woff => Formats::WOFF,
            ArtifactKind::Woff2 => Formats::WOFF2,
            ArtifactKind::Woff2Preview => Formats::WOFF2_PREVIEW,
        }
    }

    #[inline]
    pub fn contains_kind(self, kind: ArtifactKind) -> bool {
        self.contains(Formats::from_kind(kind))
    }
}

impl Default for Formats {
    #[inline]
    fn default() -> Formats {
        Formats::all()
    }
}

/// Settings for an ingestion pipeline.
///
/// This object supports a method chaining style for initialization; e.g.
///
///     # use font_depot::config::{Config, Formats};
///     let mut config = Config::new("/srv/fonts");
///     config.formats(Formats::WOFF2 | Formats::WOFF2_PREVIEW);
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The directory that holds one subdirectory per family.
    pub root: PathBuf,
    /// The delivery formats to produce.
    pub formats: Formats,
    /// The characters kept in the preview subset.
    pub preview_characters: Vec<char>,
}

impl Config {
    /// A configuration that produces every format into the store at `root`.
    pub fn new<P>(root: P) -> Config
    where
        P: Into<PathBuf>,
    {
        Config {
            root: root.into(),
            formats: Formats::default(),
            preview_characters: DEFAULT_PREVIEW_CHARACTERS.clone(),
        }
    }

    /// Sets the store root and returns this configuration for method chaining.
    #[inline]
    pub fn root<P>(&mut self, root: P) -> &mut Config
    where
        P: AsRef<Path>,
    {
        self.root = root.as_ref().to_owned();
        self
    }

    /// Sets the delivery formats and returns this configuration for method chaining.
    #[inline]
    pub fn formats(&mut self, formats: Formats) -> &mut Config {
        self.formats = formats;
        self
    }

    /// Sets the preview character set and returns this configuration for method chaining.
    #[inline]
    pub fn preview_characters(&mut self, characters: &str) -> &mut Config {
        self.preview_characters = characters.chars().collect();
        self
    }
}

#[cfg(test)]
mod test {
    use super::{Config, Formats, DEFAULT_PREVIEW_CHARACTERS};
    use crate::codecs::ArtifactKind;

    #[test]
    fn defaults_produce_everything() {
        let config = Config::new("/tmp/fonts");
        for &kind in &ArtifactKind::ALL {
            assert!(config.formats.contains_kind(kind));
        }
        assert_eq!(config.preview_characters.len(), 62 + 4 + 4);
        assert!(DEFAULT_PREVIEW_CHARACTERS.contains(&'ß'));
    }

    #[test]
    fn setters_chain() {
        let mut config = Config::new("/tmp/fonts");
        config
            .formats(Formats::TTF | Formats::WOFF2)
            .preview_characters("abc")
            .root("/srv/fonts");
        assert!(!config.formats.contains_kind(ArtifactKind::Woff));
        assert_eq!(config.preview_characters, vec!['a', 'b', 'c']);
        assert_eq!(config.root.to_str(), Some("/srv/fonts"));
    }
}
