// font-depot/src/family.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The listing of a font store: families, the subfamilies that vary in weight or slope, and the
//! files stored for each.

use serde::Serialize;

use crate::codecs::ArtifactKind;
use crate::identity::DEFAULT_SUBFAMILY;
use crate::properties::WeightClass;

/// One stored file of a subfamily.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FileEntry {
    /// `<family>/<subfamily>/<file>`, relative to the store root.
    pub path: String,
    /// The file extension, lowercased.
    #[serde(rename = "type")]
    pub file_type: String,
    pub is_preview: bool,
    #[serde(skip)]
    pub kind: ArtifactKind,
}

impl FileEntry {
    /// Describes a file named `file_name` in the slot at `family/subfamily`.
    ///
    /// Returns `None` unless the file is a recognized artifact.
    pub fn new(family: &str, subfamily: &str, file_name: &str) -> Option<FileEntry> {
        let kind = ArtifactKind::from_file_name(file_name)?;
        Some(FileEntry {
            path: format!("{}/{}/{}", family, subfamily, file_name),
            file_type: kind.extension().to_owned(),
            is_preview: file_name.contains("_preview"),
            kind,
        })
    }
}

/// A subfamily directory and its stored files.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubfamilyEntry {
    pub name: String,
    pub weight_class: WeightClass,
    pub files: Vec<FileEntry>,
}

/// A family directory with at least one listed subfamily.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FamilyEntry {
    pub name: String,
    pub subfamilies: Vec<SubfamilyEntry>,
    /// The subfamily a client should show first, repeated in full.
    pub default_subfamily: SubfamilyEntry,
}

impl FamilyEntry {
    /// Groups subfamilies into a family.
    ///
    /// Returns `None` if there are no subfamilies, since an empty family is not listed.
    pub fn new(name: String, subfamilies: Vec<SubfamilyEntry>) -> Option<FamilyEntry> {
        let default_subfamily = default_subfamily(&subfamilies)?.clone();
        Some(FamilyEntry {
            name,
            subfamilies,
            default_subfamily,
        })
    }

    /// Returns the subfamily with the given name.
    pub fn subfamily(&self, name: &str) -> Option<&SubfamilyEntry> {
        self.subfamilies
            .iter()
            .find(|subfamily| subfamily.name == name)
    }
}

/// The subfamily named `Regular` in any letter case, otherwise the first one.
fn default_subfamily(subfamilies: &[SubfamilyEntry]) -> Option<&SubfamilyEntry> {
    subfamilies
        .iter()
        .find(|subfamily| subfamily.name.eq_ignore_ascii_case(DEFAULT_SUBFAMILY))
        .or_else(|| subfamilies.first())
}

#[cfg(test)]
mod test {
    use super::{FamilyEntry, FileEntry, SubfamilyEntry};
    use crate::codecs::ArtifactKind;
    use crate::properties::WeightClass;

    fn subfamily(name: &str) -> SubfamilyEntry {
        SubfamilyEntry {
            name: name.to_owned(),
            weight_class: WeightClass::NORMAL,
            files: vec![FileEntry::new("Inter", name, "Inter.woff2").unwrap()],
        }
    }

    #[test]
    fn regular_is_the_default_subfamily() {
        let family = FamilyEntry::new(
            "Inter".to_owned(),
            vec![subfamily("Bold"), subfamily("regular"), subfamily("Thin")],
        )
        .unwrap();
        assert_eq!(family.default_subfamily.name, "regular");
        assert_eq!(Some(&family.default_subfamily), family.subfamily("regular"));
    }

    #[test]
    fn first_subfamily_is_the_fallback_default() {
        let family =
            FamilyEntry::new("Inter".to_owned(), vec![subfamily("Bold"), subfamily("Thin")])
                .unwrap();
        assert_eq!(family.default_subfamily.name, "Bold");
        assert!(family.subfamily("Thin").is_some());
        assert!(FamilyEntry::new("Empty".to_owned(), vec![]).is_none());
    }

    #[test]
    fn files_are_classified_by_name() {
        let preview = FileEntry::new("Inter", "Bold", "Inter-Bold_preview.woff2").unwrap();
        assert_eq!(preview.path, "Inter/Bold/Inter-Bold_preview.woff2");
        assert_eq!(preview.file_type, "woff2");
        assert_eq!(preview.kind, ArtifactKind::Woff2Preview);
        assert!(preview.is_preview);

        let upper = FileEntry::new("Inter", "Bold", "INTER.TTF").unwrap();
        assert_eq!(upper.file_type, "ttf");
        assert!(!upper.is_preview);

        assert!(FileEntry::new("Inter", "Bold", "metadata.json").is_none());
    }

    #[test]
    fn entries_serialize_to_the_listing_shape() {
        let family = FamilyEntry::new("Inter".to_owned(), vec![subfamily("Regular")]).unwrap();
        let json = serde_json::to_value(&family).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Inter",
                "subfamilies": [{
                    "name": "Regular",
                    "weight_class": 400,
                    "files": [{
                        "path": "Inter/Regular/Inter.woff2",
                        "type": "woff2",
                        "is_preview": false,
                    }],
                }],
                "default_subfamily": {
                    "name": "Regular",
                    "weight_class": 400,
                    "files": [{
                        "path": "Inter/Regular/Inter.woff2",
                        "type": "woff2",
                        "is_preview": false,
                    }],
                },
            })
        );
    }
}
