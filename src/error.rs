// font-depot/src/error.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Various types of errors that `font-depot` can return.

use std::convert::From;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::codecs::ArtifactKind;
use crate::tables::Tag;

/// Reasons why a blob of bytes could not be decoded into a font.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// There were no bytes at all.
    #[error("empty font data")]
    Empty,

    /// The data was of a format the decoder didn't recognize.
    #[error("unknown format")]
    UnknownFormat,

    /// The data is a TrueType or OpenType collection, which cannot be stored as a single face.
    #[error("font collections are not supported ({0} fonts in collection)")]
    Collection(u32),

    /// The data ended before a structure that it declares.
    #[error("unexpected end of font data")]
    Truncated,

    /// The table directory or container header is inconsistent.
    #[error("malformed container: {0}")]
    Malformed(&'static str),

    /// A table record points outside of the font data.
    #[error("table `{0}` lies outside of the font data")]
    TableOutOfBounds(Tag),

    /// The same table appears twice in the table directory.
    #[error("duplicate table `{0}`")]
    DuplicateTable(Tag),

    /// A table that every font must have is missing.
    #[error("missing required table `{0}`")]
    MissingTable(Tag),

    /// A table is present but its contents do not parse.
    #[error("malformed `{0}` table")]
    MalformedTable(Tag),

    /// A compressed table or stream could not be inflated.
    #[error("decompression failed: {0}")]
    Decompression(String),

    /// The container needs a codec that was not compiled into this build.
    #[error("the `{0}` codec is not available in this build")]
    MissingCodec(&'static str),
}

impl From<io::Error> for DecodeError {
    fn from(_: io::Error) -> DecodeError {
        // Reads only ever happen on in-memory slices, where the sole failure is running out of
        // bytes.
        DecodeError::Truncated
    }
}

/// Reasons why a single delivery format could not be produced.
///
/// These are never fatal for an upload: the artifact is simply left out of the slot.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The compression codec required by this format is unavailable.
    #[error("{format}: the `{codec}` codec is not available in this build")]
    MissingCodecDependency {
        /// The format that could not be produced.
        format: ArtifactKind,
        /// The missing codec.
        codec: &'static str,
    },

    /// The original bytes could not be decoded again for this format.
    #[error("{format}: failed to decode the source font")]
    Reparse {
        /// The format that could not be produced.
        format: ArtifactKind,
        /// Why decoding failed.
        #[source]
        source: DecodeError,
    },

    /// The encoder rejected the font.
    #[error("{format}: {reason}")]
    Encoding {
        /// The format that could not be produced.
        format: ArtifactKind,
        /// A human-readable explanation.
        reason: String,
    },

    /// The encoded artifact could not be written to the slot.
    #[error("{format}: failed to write artifact")]
    Io {
        /// The format that could not be written.
        format: ArtifactKind,
        /// The underlying failure.
        #[source]
        source: StoreError,
    },
}

impl ConversionError {
    /// Returns the delivery format this failure belongs to.
    pub fn format(&self) -> ArtifactKind {
        match *self {
            ConversionError::MissingCodecDependency { format, .. }
            | ConversionError::Reparse { format, .. }
            | ConversionError::Encoding { format, .. }
            | ConversionError::Io { format, .. } => format,
        }
    }
}

/// Reasons why the character-subsetted preview could not be produced.
#[derive(Debug, Error)]
pub enum SubsetError {
    /// The original bytes could not be decoded again.
    #[error("failed to decode the source font")]
    Reparse(#[source] DecodeError),

    /// The font has PostScript (CFF) outlines, which the subsetter does not rewrite.
    #[error("subsetting `{0}` outlines is not supported")]
    UnsupportedOutlines(Tag),

    /// A table the subsetter needs is missing.
    #[error("missing required table `{0}`")]
    MissingTable(Tag),

    /// A table the subsetter needs does not parse.
    #[error("malformed `{0}` table")]
    MalformedTable(Tag),

    /// None of the requested characters are mapped by the font.
    #[error("the font maps none of the requested characters")]
    NoGlyphs,

    /// The subset font could not be encoded.
    #[error("failed to encode the subset font")]
    Encoding(#[source] ConversionError),
}

/// Reasons why the font store could not be read or written.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A disk or similar I/O error occurred.
    #[error("I/O error at `{}`", .path.display())]
    Io {
        /// The path that was being accessed.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },

    /// A slot's `metadata.json` could not be serialized or parsed.
    #[error("invalid slot metadata at `{}`", .path.display())]
    Metadata {
        /// The metadata file.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: serde_json::Error,
    },

    /// Walking the store directory failed.
    #[error("failed to walk the font store")]
    Walk(#[from] walkdir::Error),
}

impl StoreError {
    pub(crate) fn io<P>(path: P) -> impl FnOnce(io::Error) -> StoreError
    where
        P: Into<PathBuf>,
    {
        let path = path.into();
        move |source| StoreError::Io { path, source }
    }
}

/// Reasons why an upload was rejected.
///
/// A duplicate upload is not an error; see `IngestOutcome::Ignored`.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The upload has no usable file name.
    #[error("Invalid file name: {0:?}")]
    InvalidFilename(String),

    /// The uploaded bytes are not a well-formed font.
    #[error("Invalid font file format: {filename}")]
    InvalidFont {
        /// The upload's file name.
        filename: String,
        /// Why decoding failed.
        #[source]
        source: DecodeError,
    },

    /// Something unexpected went wrong while storing the upload.
    #[error("{source}")]
    Internal {
        /// The upload's file name.
        filename: String,
        /// The underlying failure.
        #[source]
        source: StoreError,
    },
}

impl IngestError {
    /// The HTTP status code a server collaborator should answer with.
    pub fn status_code(&self) -> u16 {
        match *self {
            IngestError::InvalidFilename(_) | IngestError::InvalidFont { .. } => 400,
            IngestError::Internal { .. } => 500,
        }
    }
}
