// font-depot/src/store.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A font store on disk: one directory per family, one subdirectory per subfamily.
//!
//! This store uses the WalkDir abstraction from the `walkdir` crate to enumerate slots.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::binary::FontBinary;
use crate::codecs::ArtifactKind;
use crate::error::StoreError;
use crate::family::{FamilyEntry, FileEntry, SubfamilyEntry};
use crate::identity::FontIdentity;
use crate::properties::WeightClass;

/// The name of the per-slot metadata file.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// The contents of a slot's `metadata.json`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotMetadata {
    #[serde(default)]
    pub weight_class: WeightClass,
}

/// The result of claiming a slot for an identity.
#[derive(Clone, Debug, PartialEq)]
pub enum Allocation {
    /// The slot holds no artifacts yet and may be written.
    Fresh(StorageSlot),
    /// The slot already holds at least one artifact. Nothing was written.
    AlreadyExists(StorageSlot),
}

impl Allocation {
    #[inline]
    pub fn slot(&self) -> &StorageSlot {
        match *self {
            Allocation::Fresh(ref slot) | Allocation::AlreadyExists(ref slot) => slot,
        }
    }
}

/// A directory tree of stored fonts.
#[derive(Clone, Debug)]
pub struct FontStore {
    root: PathBuf,
}

impl FontStore {
    /// Opens the store at `root`, creating the directory if needed.
    pub fn open<P>(root: P) -> Result<FontStore, StoreError>
    where
        P: Into<PathBuf>,
    {
        let root = root.into();
        fs::create_dir_all(&root).map_err(StoreError::io(&root))?;
        Ok(FontStore { root })
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the slot an identity maps to, without touching the disk.
    pub fn slot(&self, identity: &FontIdentity) -> StorageSlot {
        StorageSlot::new(&self.root, identity.family(), identity.subfamily())
    }

    /// Claims the slot for `identity`.
    ///
    /// The family directory is created if absent. A subfamily directory that already holds a
    /// recognized artifact is reported as `AlreadyExists` and left untouched; otherwise it is
    /// created or reused.
    ///
    /// The check and the directory creation are separate steps, so two concurrent uploads of the
    /// same identity may both receive a fresh slot.
    pub fn allocate(&self, identity: &FontIdentity) -> Result<Allocation, StoreError> {
        let slot = self.slot(identity);
        let family_path = self.root.join(slot.family());
        fs::create_dir_all(&family_path).map_err(StoreError::io(&family_path))?;

        if slot.path.is_dir() && slot.has_artifacts()? {
            return Ok(Allocation::AlreadyExists(slot));
        }
        fs::create_dir_all(&slot.path).map_err(StoreError::io(&slot.path))?;
        Ok(Allocation::Fresh(slot))
    }

    /// Lists every family with at least one subfamily holding at least one artifact.
    ///
    /// Families and subfamilies are sorted by name. A subfamily whose metadata is missing or
    /// unreadable is listed with normal weight.
    pub fn list_fonts(&self) -> Result<Vec<FamilyEntry>, StoreError> {
        let mut families = vec![];
        for family in subdirectories(&self.root)? {
            let mut subfamilies = vec![];
            for subfamily in subdirectories(&self.root.join(&family))? {
                let slot = StorageSlot::new(&self.root, &family, &subfamily);
                let files: Vec<FileEntry> = slot
                    .file_names()?
                    .iter()
                    .filter_map(|file_name| FileEntry::new(&family, &subfamily, file_name))
                    .collect();
                if files.is_empty() {
                    continue;
                }
                let weight_class = match slot.read_metadata() {
                    Ok(Some(metadata)) => metadata.weight_class,
                    Ok(None) => WeightClass::NORMAL,
                    Err(error) => {
                        warn!("error reading metadata for {}/{}: {}", family, subfamily, error);
                        WeightClass::NORMAL
                    }
                };
                subfamilies.push(SubfamilyEntry {
                    name: subfamily,
                    weight_class,
                    files,
                });
            }
            families.extend(FamilyEntry::new(family, subfamilies));
        }
        Ok(families)
    }
}

/// The names of the directories directly inside `path`, sorted.
fn subdirectories(path: &Path) -> Result<Vec<String>, StoreError> {
    entry_names(path, |entry| entry.file_type().is_dir())
}

fn entry_names<F>(path: &Path, mut filter: F) -> Result<Vec<String>, StoreError>
where
    F: FnMut(&walkdir::DirEntry) -> bool,
{
    let mut names = vec![];
    for entry in WalkDir::new(path).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !filter(&entry) {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) => names.push(name.to_owned()),
            None => debug!("skipping non-UTF-8 entry {}", entry.path().display()),
        }
    }
    names.sort();
    Ok(names)
}

/// The directory that holds one subfamily's original upload, artifacts and metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageSlot {
    family: String,
    subfamily: String,
    path: PathBuf,
}

impl StorageSlot {
    fn new(root: &Path, family: &str, subfamily: &str) -> StorageSlot {
        StorageSlot {
            family: family.to_owned(),
            subfamily: subfamily.to_owned(),
            path: root.join(family).join(subfamily),
        }
    }

    #[inline]
    pub fn family(&self) -> &str {
        &self.family
    }

    #[inline]
    pub fn subfamily(&self) -> &str {
        &self.subfamily
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The names of the regular files in the slot, sorted.
    pub fn file_names(&self) -> Result<Vec<String>, StoreError> {
        entry_names(&self.path, |entry| entry.file_type().is_file())
    }

    /// The recognized artifacts in the slot, by file name.
    pub fn artifacts(&self) -> Result<Vec<(String, ArtifactKind)>, StoreError> {
        Ok(self
            .file_names()?
            .into_iter()
            .filter_map(|name| ArtifactKind::from_file_name(&name).map(|kind| (name, kind)))
            .collect())
    }

    /// Returns true if the slot holds at least one recognized artifact.
    #[inline]
    pub fn has_artifacts(&self) -> Result<bool, StoreError> {
        Ok(!self.artifacts()?.is_empty())
    }

    fn write(&self, file_name: &str, data: &[u8]) -> Result<PathBuf, StoreError> {
        let path = self.path.join(file_name);
        fs::write(&path, data).map_err(StoreError::io(&path))?;
        debug!("wrote {} ({} bytes)", path.display(), data.len());
        Ok(path)
    }

    /// Stores the uploaded bytes under the upload's file name.
    pub fn write_original(&self, binary: &FontBinary) -> Result<PathBuf, StoreError> {
        self.write(binary.filename(), binary.bytes())
    }

    /// Stores a converted artifact as `<stem>.<ext>` or `<stem>_preview.woff2`.
    pub fn write_artifact(
        &self,
        kind: ArtifactKind,
        stem: &str,
        data: &[u8],
    ) -> Result<PathBuf, StoreError> {
        self.write(&kind.file_name(stem), data)
    }

    pub fn write_metadata(&self, metadata: &SlotMetadata) -> Result<PathBuf, StoreError> {
        let path = self.path.join(METADATA_FILE_NAME);
        let json = serde_json::to_vec(metadata).map_err(|source| StoreError::Metadata {
            path: path.clone(),
            source,
        })?;
        self.write(METADATA_FILE_NAME, &json)
    }

    /// Reads `metadata.json`, returning `None` if the slot has none.
    pub fn read_metadata(&self) -> Result<Option<SlotMetadata>, StoreError> {
        let path = self.path.join(METADATA_FILE_NAME);
        let json = match fs::read(&path) {
            Ok(json) => json,
            Err(ref error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(StoreError::Io { path, source: error }),
        };
        serde_json::from_slice(&json)
            .map(Some)
            .map_err(|source| StoreError::Metadata { path, source })
    }
}

#[cfg(test)]
mod test {
    use super::{Allocation, FontStore, SlotMetadata, METADATA_FILE_NAME};
    use crate::binary::FontBinary;
    use crate::codecs::ArtifactKind;
    use crate::identity::FontIdentity;
    use crate::properties::WeightClass;
    use std::fs;

    fn identity(family: &str, subfamily: &str) -> FontIdentity {
        FontIdentity::new(family, subfamily, WeightClass::BOLD)
    }

    #[test]
    fn allocation_rejects_slots_with_artifacts() {
        let root = tempfile::tempdir().unwrap();
        let store = FontStore::open(root.path()).unwrap();
        let slot = match store.allocate(&identity("Inter", "Bold")).unwrap() {
            Allocation::Fresh(slot) => slot,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(slot.path(), root.path().join("Inter").join("Bold"));

        // Metadata alone does not occupy a slot.
        slot.write_metadata(&SlotMetadata {
            weight_class: WeightClass::BOLD,
        })
        .unwrap();
        assert!(matches!(
            store.allocate(&identity("Inter", "Bold")).unwrap(),
            Allocation::Fresh(_)
        ));

        slot.write_original(&FontBinary::new("Inter-Bold.TTF", vec![1, 2, 3]))
            .unwrap();
        assert!(matches!(
            store.allocate(&identity("Inter", "Bold")).unwrap(),
            Allocation::AlreadyExists(_)
        ));
        assert!(matches!(
            store.allocate(&identity("Inter", "Regular")).unwrap(),
            Allocation::Fresh(_)
        ));
    }

    #[test]
    fn metadata_round_trips() {
        let root = tempfile::tempdir().unwrap();
        let store = FontStore::open(root.path()).unwrap();
        let allocation = store.allocate(&identity("Inter", "Bold")).unwrap();
        let slot = allocation.slot();
        assert_eq!(slot.read_metadata().unwrap(), None);

        let metadata = SlotMetadata {
            weight_class: WeightClass::BOLD,
        };
        slot.write_metadata(&metadata).unwrap();
        assert_eq!(slot.read_metadata().unwrap(), Some(metadata));
        assert_eq!(
            fs::read_to_string(slot.path().join(METADATA_FILE_NAME)).unwrap(),
            r#"{"weight_class":700}"#
        );
    }

    #[test]
    fn listing_skips_empty_slots_and_bad_metadata() {
        let root = tempfile::tempdir().unwrap();
        let store = FontStore::open(root.path()).unwrap();

        let bold = store.allocate(&identity("Inter", "Bold")).unwrap();
        bold.slot()
            .write_artifact(ArtifactKind::Woff2, "Inter-Bold", b"wOF2")
            .unwrap();
        bold.slot()
            .write_artifact(ArtifactKind::Woff2Preview, "Inter-Bold", b"wOF2")
            .unwrap();
        fs::write(bold.slot().path().join(METADATA_FILE_NAME), b"{not json").unwrap();

        // A slot without artifacts and a family without slots are not listed.
        store.allocate(&identity("Inter", "Thin")).unwrap();
        store.allocate(&identity("Empty", "Regular")).unwrap();
        fs::remove_dir(root.path().join("Empty").join("Regular")).unwrap();

        let families = store.list_fonts().unwrap();
        assert_eq!(families.len(), 1);
        let inter = &families[0];
        assert_eq!(inter.name, "Inter");
        assert_eq!(inter.default_subfamily.name, "Bold");
        assert_eq!(inter.subfamilies.len(), 1);
        let subfamily = &inter.subfamilies[0];
        assert_eq!(subfamily.weight_class, WeightClass::NORMAL);
        let paths: Vec<&str> = subfamily.files.iter().map(|file| &*file.path).collect();
        assert_eq!(
            paths,
            vec!["Inter/Bold/Inter-Bold.woff2", "Inter/Bold/Inter-Bold_preview.woff2"]
        );
    }

    #[test]
    fn metadata_without_weight_means_normal() {
        let metadata: SlotMetadata = serde_json::from_str("{}").unwrap();
        assert_eq!(metadata.weight_class, WeightClass::NORMAL);
    }
}
