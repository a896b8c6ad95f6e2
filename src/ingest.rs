// font-depot/src/ingest.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The upload pipeline: decode, identify, allocate a slot, store, convert and preview.

use log::{debug, info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::binary::{self, FontBinary};
use crate::codecs::ArtifactKind;
use crate::config::{Config, Formats};
use crate::convert::Converter;
use crate::error::{ConversionError, IngestError, StoreError};
use crate::family::FamilyEntry;
use crate::identity::FontIdentity;
use crate::store::{Allocation, FontStore, SlotMetadata, StorageSlot};
use crate::subset::Subsetter;

/// Ingests uploads into the store described by a `Config`.
///
/// An `Ingestor` holds no mutable state; uploads may be ingested from several threads at once.
pub struct Ingestor {
    root: PathBuf,
    formats: Formats,
    converter: Converter,
    subsetter: Subsetter,
}

impl Ingestor {
    pub fn new(config: &Config) -> Ingestor {
        Ingestor::with_converter(config, Converter::for_formats(config.formats))
    }

    /// Creates an ingestor that produces the full-font formats with `converter`.
    ///
    /// The preview is still governed by `config.formats`, and only produced when the converter
    /// yields a WOFF 2.0 artifact.
    pub fn with_converter(config: &Config, converter: Converter) -> Ingestor {
        Ingestor {
            root: config.root.clone(),
            formats: config.formats,
            converter,
            subsetter: Subsetter::new(&config.preview_characters),
        }
    }

    /// Opens the store this ingestor writes into.
    #[inline]
    pub fn store(&self) -> Result<FontStore, StoreError> {
        FontStore::open(&self.root)
    }

    /// Lists the families in the store.
    pub fn list_fonts(&self) -> Result<Vec<FamilyEntry>, StoreError> {
        self.store()?.list_fonts()
    }

    /// Ingests a single upload.
    ///
    /// The file name is reduced to its last path component. Failures of individual delivery
    /// formats are logged and leave the upload successful.
    pub fn ingest<B>(&self, filename: &str, bytes: B) -> Result<IngestOutcome, IngestError>
    where
        B: Into<Arc<[u8]>>,
    {
        let name = binary::base_name(filename)
            .ok_or_else(|| IngestError::InvalidFilename(filename.to_owned()))?;
        self.ingest_binary(&FontBinary::new(name, bytes))
    }

    /// Ingests an upload whose file name is already a base name.
    pub fn ingest_binary(&self, binary: &FontBinary) -> Result<IngestOutcome, IngestError> {
        let filename = binary.filename().to_owned();
        let font = binary.load().map_err(|source| IngestError::InvalidFont {
            filename: filename.clone(),
            source,
        })?;
        let identity = FontIdentity::resolve(&font, binary.stem());
        drop(font);

        let internal = |source| IngestError::Internal {
            filename: filename.clone(),
            source,
        };
        let store = self.store().map_err(internal)?;
        let slot = match store.allocate(&identity).map_err(internal)? {
            Allocation::Fresh(slot) => slot,
            Allocation::AlreadyExists(slot) => {
                info!(
                    "{}/{} already holds fonts; ignoring {}",
                    slot.family(),
                    slot.subfamily(),
                    filename
                );
                return Ok(IngestOutcome::Ignored {
                    filename,
                    subfamily: identity.declared_subfamily().to_owned(),
                });
            }
        };

        slot.write_original(binary).map_err(internal)?;
        slot.write_metadata(&SlotMetadata {
            weight_class: identity.weight_class(),
        })
        .map_err(internal)?;

        let artifacts = self.write_artifacts(binary, &slot);
        info!(
            "stored {} as {}/{} ({} artifacts)",
            filename,
            slot.family(),
            slot.subfamily(),
            artifacts.len()
        );
        Ok(IngestOutcome::Stored(StoredFont {
            filename,
            identity,
            slot,
            artifacts,
        }))
    }

    /// Converts the upload into every configured format and writes what succeeds.
    fn write_artifacts(&self, binary: &FontBinary, slot: &StorageSlot) -> Vec<ArtifactKind> {
        let mut artifacts = vec![];
        for (kind, result) in self.converter.convert(binary) {
            let data = match result {
                Ok(data) => data,
                Err(error) => {
                    warn!("error converting {} to {}: {}", binary.filename(), kind, error);
                    continue;
                }
            };
            if kind.file_name(binary.stem()).eq_ignore_ascii_case(binary.filename()) {
                debug!("keeping the uploaded {} as the {} artifact", binary.filename(), kind);
                artifacts.push(kind);
                continue;
            }
            match slot.write_artifact(kind, binary.stem(), &data) {
                Ok(_) => artifacts.push(kind),
                Err(source) => {
                    let error = ConversionError::Io { format: kind, source };
                    warn!("error storing {}: {}", binary.filename(), error)
                }
            }
        }

        if artifacts.contains(&ArtifactKind::Woff2)
            && self.formats.contains(Formats::WOFF2_PREVIEW)
        {
            let preview = ArtifactKind::Woff2Preview;
            let written = self
                .subsetter
                .subset(binary)
                .map_err(|error| error.to_string())
                .and_then(|data| {
                    slot.write_artifact(preview, binary.stem(), &data)
                        .map_err(|error| error.to_string())
                });
            match written {
                Ok(_) => artifacts.push(preview),
                Err(error) => {
                    warn!("error creating {} for {}: {}", preview, binary.filename(), error)
                }
            }
        }
        artifacts
    }

    /// Ingests every upload independently. One entry is returned per upload, in order.
    pub fn ingest_batch<I, S, B>(&self, uploads: I) -> Vec<BatchEntry>
    where
        I: IntoIterator<Item = (S, B)>,
        S: AsRef<str>,
        B: Into<Arc<[u8]>>,
    {
        uploads
            .into_iter()
            .map(|(filename, bytes)| {
                let filename = filename.as_ref();
                match self.ingest(filename, bytes) {
                    Ok(outcome) => BatchEntry {
                        filename: filename.to_owned(),
                        success: true,
                        message: outcome.message(),
                    },
                    Err(error) => {
                        warn!("rejected {}: {}", filename, error);
                        BatchEntry {
                            filename: filename.to_owned(),
                            success: false,
                            message: error.to_string(),
                        }
                    }
                }
            })
            .collect()
    }
}

/// A successfully stored upload.
#[derive(Clone, Debug)]
pub struct StoredFont {
    pub filename: String,
    pub identity: FontIdentity,
    pub slot: StorageSlot,
    /// The delivery formats now present in the slot, in the order they were produced.
    pub artifacts: Vec<ArtifactKind>,
}

/// What happened to an accepted upload.
#[derive(Clone, Debug)]
pub enum IngestOutcome {
    /// The upload was stored in a fresh slot.
    Stored(StoredFont),
    /// The slot for the upload's identity already holds fonts. Nothing was written.
    Ignored {
        filename: String,
        /// The subfamily name as the font declares it.
        subfamily: String,
    },
}

impl IngestOutcome {
    /// The message reported to the uploader.
    pub fn message(&self) -> String {
        match *self {
            IngestOutcome::Stored(ref stored) => {
                format!("Font {} uploaded successfully", stored.filename)
            }
            IngestOutcome::Ignored {
                ref filename,
                ref subfamily,
            } => format!(
                "Subfamily '{}' already exists. File '{}' ignored.",
                subfamily, filename
            ),
        }
    }

    #[inline]
    pub fn is_stored(&self) -> bool {
        matches!(*self, IngestOutcome::Stored(_))
    }
}

/// The result of one upload in a batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    pub filename: String,
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod test {
    use super::{IngestOutcome, Ingestor};
    use crate::codecs::ArtifactKind;
    use crate::config::{Config, Formats};
    use crate::error::IngestError;
    use crate::fixture::FontBuilder;
    use std::fs;

    #[test]
    fn invalid_uploads_are_rejected_before_touching_the_store() {
        let root = tempfile::tempdir().unwrap();
        let ingestor = Ingestor::new(&Config::new(root.path().join("store")));

        let error = ingestor.ingest("uploads/", vec![0, 1, 0, 0]).unwrap_err();
        assert!(matches!(error, IngestError::InvalidFilename(_)));
        assert_eq!(error.status_code(), 400);

        let error = ingestor.ingest("notes.ttf", b"not a font".to_vec()).unwrap_err();
        assert_eq!(error.to_string(), "Invalid font file format: notes.ttf");
        assert_eq!(error.status_code(), 400);

        assert!(!root.path().join("store").exists());
    }

    #[test]
    fn ttf_uploads_are_not_duplicated() {
        let root = tempfile::tempdir().unwrap();
        let mut config = Config::new(root.path());
        config.formats(Formats::TTF | Formats::OTF);
        let ingestor = Ingestor::new(&config);

        let data = FontBuilder::new().build();
        let outcome = ingestor.ingest("Fixture.ttf", data.clone()).unwrap();
        let stored = match outcome {
            IngestOutcome::Stored(ref stored) => stored,
            ref other => panic!("unexpected {:?}", other),
        };
        assert_eq!(stored.artifacts, vec![ArtifactKind::Ttf, ArtifactKind::Otf]);
        assert_eq!(outcome.message(), "Font Fixture.ttf uploaded successfully");

        let slot = stored.slot.path();
        assert_eq!(fs::read(slot.join("Fixture.ttf")).unwrap(), data);
        assert!(slot.join("Fixture.otf").is_file());
        assert!(!slot.join("Fixture.woff").exists());
        assert!(!slot.join("Fixture_preview.woff2").exists());
    }

    #[test]
    fn duplicates_report_the_declared_subfamily() {
        let root = tempfile::tempdir().unwrap();
        let mut config = Config::new(root.path());
        config.formats(Formats::OTF);
        let ingestor = Ingestor::new(&config);

        let data = FontBuilder::new().subfamily("Bold: Italic").build();
        assert!(ingestor.ingest("A.ttf", data.clone()).unwrap().is_stored());
        let outcome = ingestor.ingest("B.ttf", data).unwrap();
        assert!(!outcome.is_stored());
        assert_eq!(
            outcome.message(),
            "Subfamily 'Bold: Italic' already exists. File 'B.ttf' ignored."
        );
    }
}
