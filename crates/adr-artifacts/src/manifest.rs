//! Optional `manifest.toml` pinning the artifact set.
//!
//! ```toml
//! [manifest]
//! schema = "adr-causality.artifact-manifest"
//! schema_version = 1
//!
//! [model]
//! name = "final_ml_model"
//! alias = "champion"
//!
//! [[files]]
//! path = "model/classifier.json"
//! sha256 = "…"
//! role = "classifier"
//! ```

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigurationError, Result};
use crate::hash::{is_sha256_hex, read_with_digest};

pub const MANIFEST_FILE: &str = "manifest.toml";
pub const MANIFEST_SCHEMA: &str = "adr-causality.artifact-manifest";

/// Artifact role and its default location relative to the artifact directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ArtifactRole {
    ColumnMetadata,
    OneHotEncoder,
    OrdinalEncoder,
    Scaler,
    Classifier,
    Metrics,
    Params,
}

impl ArtifactRole {
    pub const ALL: &'static [ArtifactRole] = &[
        ArtifactRole::ColumnMetadata,
        ArtifactRole::OneHotEncoder,
        ArtifactRole::OrdinalEncoder,
        ArtifactRole::Scaler,
        ArtifactRole::Classifier,
        ArtifactRole::Metrics,
        ArtifactRole::Params,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactRole::ColumnMetadata => "column_metadata",
            ArtifactRole::OneHotEncoder => "one_hot_encoder",
            ArtifactRole::OrdinalEncoder => "ordinal_encoder",
            ArtifactRole::Scaler => "scaler",
            ArtifactRole::Classifier => "classifier",
            ArtifactRole::Metrics => "metrics",
            ArtifactRole::Params => "params",
        }
    }

    pub fn default_path(&self) -> &'static str {
        match self {
            ArtifactRole::ColumnMetadata => "metadata/model_columns.json",
            ArtifactRole::OneHotEncoder => "encoders/one_hot_encoder.json",
            ArtifactRole::OrdinalEncoder => "encoders/ordinal_encoder.json",
            ArtifactRole::Scaler => "scalers/minmax_scaler.json",
            ArtifactRole::Classifier => "model/classifier.json",
            ArtifactRole::Metrics => "model_metadata/metrics.json",
            ArtifactRole::Params => "model_metadata/params.json",
        }
    }

    /// Metrics and params are informational and may be absent.
    pub fn is_required(&self) -> bool {
        !matches!(self, ArtifactRole::Metrics | ArtifactRole::Params)
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|role| role.as_str() == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub manifest: ManifestHeader,
    #[serde(default)]
    pub model: Option<ModelPin>,
    pub files: Vec<ManifestFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestHeader {
    pub schema: String,
    pub schema_version: u32,
}

/// Registered model name and alias, rendered as `name@alias`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPin {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
}

impl ModelPin {
    pub fn model_id(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{}@{}", self.name, alias),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestFile {
    pub path: String,
    pub sha256: String,
    pub role: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Manifest {
    /// Loads `manifest.toml` from `dir`, returning `None` when it is absent.
    pub fn load_optional(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&path).map_err(|e| ConfigurationError::io(&path, e))?;
        let manifest: Manifest =
            toml::from_str(&contents).map_err(|e| ConfigurationError::Toml {
                path: path.clone(),
                source: e,
            })?;
        manifest.validate()?;
        Ok(Some(manifest))
    }

    fn validate(&self) -> Result<()> {
        if self.manifest.schema != MANIFEST_SCHEMA {
            return Err(ConfigurationError::InvalidManifest {
                message: format!("unsupported schema: {}", self.manifest.schema),
            });
        }
        if self.manifest.schema_version != 1 {
            return Err(ConfigurationError::InvalidManifest {
                message: format!(
                    "unsupported schema_version: {}",
                    self.manifest.schema_version
                ),
            });
        }

        let mut roles = BTreeSet::new();
        for file in &self.files {
            let role = ArtifactRole::from_name(&file.role).ok_or_else(|| {
                ConfigurationError::InvalidManifest {
                    message: format!("unknown role '{}' for {}", file.role, file.path),
                }
            })?;
            if !roles.insert(role) {
                return Err(ConfigurationError::DuplicateRole {
                    role: file.role.clone(),
                });
            }
            if !is_sha256_hex(&file.sha256) {
                return Err(ConfigurationError::InvalidSha256 {
                    path: PathBuf::from(&file.path),
                    message: "sha256 must be 64 hex characters".to_string(),
                });
            }
            validate_path(&file.path)?;
        }

        for role in ArtifactRole::ALL.iter().filter(|role| role.is_required()) {
            if !roles.contains(role) {
                return Err(ConfigurationError::MissingRole {
                    role: role.as_str().to_string(),
                });
            }
        }
        Ok(())
    }

    fn entry(&self, role: ArtifactRole) -> Option<&ManifestFile> {
        self.files.iter().find(|file| file.role == role.as_str())
    }
}

/// Resolves artifact locations and reads them, verifying digests when a
/// manifest pins the set.
#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    root: PathBuf,
    manifest: Option<Manifest>,
}

impl ArtifactLocator {
    pub fn new(root: &Path) -> Result<Self> {
        let manifest = Manifest::load_optional(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            manifest,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    pub fn path(&self, role: ArtifactRole) -> PathBuf {
        match self.manifest.as_ref().and_then(|m| m.entry(role)) {
            Some(file) => self.root.join(&file.path),
            None => self.root.join(role.default_path()),
        }
    }

    /// Reads the artifact for `role`. Optional roles that are absent yield
    /// `None`; required roles that are absent are an error.
    pub fn read(&self, role: ArtifactRole) -> Result<Option<Vec<u8>>> {
        let path = self.path(role);
        if !role.is_required() && !path.is_file() {
            if let Some(manifest) = &self.manifest
                && manifest.entry(role).is_some()
            {
                return Err(ConfigurationError::MissingFile { path });
            }
            return Ok(None);
        }

        let (bytes, actual) = read_with_digest(&path)?;
        if let Some(file) = self.manifest.as_ref().and_then(|m| m.entry(role)) {
            let expected = file.sha256.to_ascii_lowercase();
            if actual != expected {
                return Err(ConfigurationError::Sha256Mismatch {
                    path,
                    expected,
                    actual,
                });
            }
            debug!(role = role.as_str(), path = %path.display(), "artifact digest verified");
        }
        Ok(Some(bytes))
    }

    /// Reads a required artifact.
    pub fn read_required(&self, role: ArtifactRole) -> Result<Vec<u8>> {
        self.read(role)?
            .ok_or_else(|| ConfigurationError::MissingFile {
                path: self.path(role),
            })
    }
}

fn validate_path(path: &str) -> Result<()> {
    if path.contains('\\') {
        return Err(ConfigurationError::InvalidPath {
            path: PathBuf::from(path),
            message: "manifest path must use '/' separators".to_string(),
        });
    }
    let p = Path::new(path);
    if p.is_absolute() {
        return Err(ConfigurationError::InvalidPath {
            path: p.to_path_buf(),
            message: "manifest path must be relative".to_string(),
        });
    }
    if p.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(ConfigurationError::InvalidPath {
            path: p.to_path_buf(),
            message: "manifest path must not traverse out of the artifact directory".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_id_joins_name_and_alias() {
        let pin = ModelPin {
            name: "final_ml_model".into(),
            alias: Some("champion".into()),
        };
        assert_eq!(pin.model_id(), "final_ml_model@champion");
    }

    #[test]
    fn rejects_traversal() {
        assert!(validate_path("../model.json").is_err());
        assert!(validate_path("model\\classifier.json").is_err());
        assert!(validate_path("model/classifier.json").is_ok());
    }

    #[test]
    fn default_paths_follow_training_layout() {
        assert_eq!(
            ArtifactRole::Scaler.default_path(),
            "scalers/minmax_scaler.json"
        );
        assert!(!ArtifactRole::Metrics.is_required());
    }
}
