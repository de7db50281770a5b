//! Package manifest model
//!
//! The manifest is read as loosely-typed [`RecordSpec`]s so that one bad
//! record (say, an unknown manager name) is reported on its own instead of
//! failing the whole parse. [`RecordSpec::validate`] turns a spec into a
//! typed [`PackageRecord`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use boot_fs::{FileOperation, StructuredFormat};
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, RecordError, Result};

/// Supported package manager backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagerKind {
    /// Bucket-based installer
    Scoop,
    /// Direct installer
    Winget,
    /// Removal of Windows app packages
    Appx,
}

impl ManagerKind {
    pub const ALL: [ManagerKind; 3] = [Self::Scoop, Self::Winget, Self::Appx];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scoop => "scoop",
            Self::Winget => "winget",
            Self::Appx => "appx",
        }
    }
}

impl fmt::Display for ManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManagerKind {
    type Err = RecordError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RecordError::UnknownManager { name: s.to_string() })
    }
}

/// Named machine profile a record applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Workspace {
    Work,
    Home,
    /// Matches every requested workspace
    Global,
}

impl Workspace {
    pub const ALL: [Workspace; 3] = [Self::Work, Self::Home, Self::Global];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Home => "home",
            Self::Global => "global",
        }
    }

    /// Whether a record scoped to `self` runs when `requested` is selected.
    pub fn applies_to(self, requested: Workspace) -> bool {
        self == Self::Global || self == requested
    }
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Workspace {
    type Err = RecordError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ws| ws.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RecordError::UnknownWorkspace { name: s.to_string() })
    }
}

/// The `manager` object of a record, as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
}

/// One manifest entry, as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSpec {
    pub package: String,
    pub manager: ManagerSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileOperation>>,
}

impl RecordSpec {
    /// Workspace as written, `global` when omitted.
    pub fn workspace_name(&self) -> &str {
        self.workspace.as_deref().unwrap_or("global")
    }

    pub fn file_operations(&self) -> &[FileOperation] {
        self.files.as_deref().unwrap_or_default()
    }

    /// Check the record and convert it into its typed form.
    pub fn validate(&self) -> std::result::Result<PackageRecord, RecordError> {
        let package = self.package.trim();
        if package.is_empty() {
            return Err(RecordError::EmptyPackage);
        }

        let workspace: Workspace = self.workspace_name().parse()?;
        let manager = match self.manager.name.parse::<ManagerKind>()? {
            ManagerKind::Scoop => {
                let bucket = self
                    .manager
                    .bucket
                    .as_deref()
                    .map(str::trim)
                    .filter(|b| !b.is_empty())
                    .ok_or_else(|| RecordError::MissingBucket {
                        package: package.to_string(),
                    })?;
                Manager::Scoop {
                    bucket: bucket.to_string(),
                }
            }
            ManagerKind::Winget => Manager::Winget,
            ManagerKind::Appx => Manager::Appx,
        };

        Ok(PackageRecord {
            package: package.to_string(),
            manager,
            workspace,
        })
    }
}

/// Manager with its backend-specific arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Manager {
    Scoop { bucket: String },
    Winget,
    Appx,
}

impl Manager {
    pub fn kind(&self) -> ManagerKind {
        match self {
            Self::Scoop { .. } => ManagerKind::Scoop,
            Self::Winget => ManagerKind::Winget,
            Self::Appx => ManagerKind::Appx,
        }
    }
}

/// A validated manifest record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub package: String,
    pub manager: Manager,
    pub workspace: Workspace,
}

/// An ordered, immutable list of records loaded from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    source: Option<PathBuf>,
    records: Vec<RecordSpec>,
}

impl Manifest {
    pub fn from_records(records: Vec<RecordSpec>) -> Self {
        Self {
            source: None,
            records,
        }
    }

    /// Load a manifest; the format is detected from the extension.
    ///
    /// Accepts either a top-level list of records or a table with a
    /// `packages` list.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use boot_core::Manifest;
    ///
    /// let manifest = Manifest::load("packages.json".as_ref()).unwrap();
    /// println!("{} records", manifest.records().len());
    /// ```
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ManifestNotFound {
                path: path.to_path_buf(),
            });
        }

        let document: ManifestDocument =
            boot_fs::load_structured(path).map_err(Error::InvalidManifest)?;
        debug!(path = %path.display(), records = document.0.len(), "Loaded manifest");

        Ok(Self {
            source: Some(path.to_path_buf()),
            records: document.0,
        })
    }

    /// Parse manifest content in a given format.
    pub fn parse(content: &str, format: StructuredFormat) -> Result<Self> {
        let document: ManifestDocument = format
            .parse(content, Path::new("<inline>"))
            .map_err(Error::InvalidManifest)?;
        Ok(Self::from_records(document.0))
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn records(&self) -> &[RecordSpec] {
        &self.records
    }
}

/// Top-level manifest shape: a list, or `{ packages: [...] }`.
struct ManifestDocument(Vec<RecordSpec>);

impl<'de> Deserialize<'de> for ManifestDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = Vec<RecordSpec>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of package records or a table with a `packages` list")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
                let mut records = Vec::new();
                while let Some(record) = seq.next_element()? {
                    records.push(record);
                }
                Ok(records)
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let mut records = None;
                while let Some(key) = map.next_key::<String>()? {
                    if key == "packages" {
                        if records.is_some() {
                            return Err(de::Error::duplicate_field("packages"));
                        }
                        records = Some(map.next_value()?);
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                records.ok_or_else(|| de::Error::missing_field("packages"))
            }
        }

        deserializer.deserialize_any(DocumentVisitor).map(ManifestDocument)
    }
}
