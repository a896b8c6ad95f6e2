// font-depot/src/binary.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The raw bytes of one upload, together with the name it was uploaded under.
//!
//! A binary is never modified. Every stage of the pipeline that needs a decoded font decodes
//! its own copy from the binary.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use crate::error::DecodeError;
use crate::font::Font;

/// The raw bytes of one upload, together with its base file name.
#[derive(Clone, Debug)]
pub struct FontBinary {
    filename: String,
    bytes: Arc<[u8]>,
}

impl FontBinary {
    /// Wraps uploaded bytes. `filename` should already be a base name; see `base_name`.
    #[inline]
    pub fn new<S, B>(filename: S, bytes: B) -> FontBinary
    where
        S: Into<String>,
        B: Into<Arc<[u8]>>,
    {
        FontBinary {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a font file from disk, naming the binary after the file.
    pub fn from_path<P>(path: P) -> io::Result<FontBinary>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
        Ok(FontBinary::new(filename, fs::read(path)?))
    }

    /// The file name the binary was uploaded under.
    #[inline]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The file name with its last extension removed.
    ///
    /// This names the converted artifacts and serves as the family name of fonts that don't
    /// declare one.
    pub fn stem(&self) -> &str {
        Path::new(&self.filename)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.filename)
    }

    /// Decodes a fresh `Font` from the bytes.
    #[inline]
    pub fn load(&self) -> Result<Font, DecodeError> {
        Font::from_bytes(&self.bytes)
    }
}

/// Reduces a client-supplied file name to its last path component.
///
/// Both `/` and `\` count as separators. Returns `None` when nothing usable remains.
pub fn base_name(filename: &str) -> Option<&str> {
    let name = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename)
        .trim();
    match name {
        "" | "." | ".." => None,
        name => Some(name),
    }
}
