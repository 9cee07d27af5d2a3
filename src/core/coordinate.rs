//! Project coordinates - WHICH project (group + artifact + version).
//!
//! The registry identifies projects by [`ArtifactKey`] (group and artifact
//! only). Versions are resolved separately because a workspace may hold a
//! module whose version still carries placeholders.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default artifact type when none is requested.
pub const DEFAULT_TYPE: &str = "jar";

/// Artifact type of a project descriptor.
pub const POM_TYPE: &str = "pom";

/// Version-independent identity of a project: `groupId:artifactId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactKey {
    group_id: String,
    artifact_id: String,
}

impl ArtifactKey {
    /// Create a GA key.
    pub fn ga(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        ArtifactKey {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }

    /// Get the group id.
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Get the artifact id.
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// A full project coordinate (GAV).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    key: ArtifactKey,
    version: String,
}

impl Coordinate {
    /// Create a coordinate.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Coordinate {
            key: ArtifactKey::ga(group_id, artifact_id),
            version: version.into(),
        }
    }

    /// Create a coordinate from a GA key and a version.
    pub fn from_key(key: ArtifactKey, version: impl Into<String>) -> Self {
        Coordinate {
            key,
            version: version.into(),
        }
    }

    /// Get the GA key.
    pub fn key(&self) -> &ArtifactKey {
        &self.key
    }

    /// Get the group id.
    pub fn group_id(&self) -> &str {
        self.key.group_id()
    }

    /// Get the artifact id.
    pub fn artifact_id(&self) -> &str {
        self.key.artifact_id()
    }

    /// Get the version (may still carry placeholders).
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.version)
    }
}

/// Coordinates of one artifact file a caller wants resolved from the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactCoords {
    key: ArtifactKey,
    classifier: String,
    kind: String,
    version: String,
}

impl ArtifactCoords {
    /// Create coordinates for the main artifact of the given type.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        kind: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        ArtifactCoords {
            key: ArtifactKey::ga(group_id, artifact_id),
            classifier: String::new(),
            kind: kind.into(),
            version: version.into(),
        }
    }

    /// Coordinates of a project descriptor.
    pub fn pom(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new(group_id, artifact_id, POM_TYPE, version)
    }

    /// Coordinates of a jar.
    pub fn jar(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new(group_id, artifact_id, DEFAULT_TYPE, version)
    }

    /// Set a classifier.
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = classifier.into();
        self
    }

    /// Get the GA key.
    pub fn key(&self) -> &ArtifactKey {
        &self.key
    }

    /// Get the classifier (empty for the main artifact).
    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    /// Get the artifact type, which doubles as the file extension.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Get the requested version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// File name of this artifact for a concrete version, e.g. `app-1.0-tests.jar`.
    pub fn file_name(&self, version: &str) -> String {
        let mut name = format!("{}-{}", self.key.artifact_id(), version);
        if !self.classifier.is_empty() {
            name.push('-');
            name.push_str(&self.classifier);
        }
        name.push('.');
        name.push_str(&self.kind);
        name
    }
}

impl fmt::Display for ArtifactCoords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.key)?;
        if !self.classifier.is_empty() {
            write!(f, "{}:", self.classifier)?;
        }
        write!(f, "{}:{}", self.kind, self.version)
    }
}
