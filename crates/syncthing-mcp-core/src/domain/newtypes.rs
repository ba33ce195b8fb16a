//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for the identifiers that flow through tool calls.
//! Each newtype ensures data validity at construction time: surrounding
//! whitespace is stripped and empty values are rejected, so a blank
//! identifier never reaches the daemon client or the classifier.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Number of leading characters kept when a device ID is shortened.
///
/// Syncthing device IDs are eight dash-separated blocks of seven characters;
/// the first block is enough to tell devices apart at a glance.
pub const SHORT_ID_LEN: usize = 7;

/// Marker appended to shortened identifiers.
pub const ELLIPSIS: char = '\u{2026}';

/// Shortens an opaque identifier to [`SHORT_ID_LEN`] characters plus an
/// ellipsis marker. Identifiers that already fit are returned unchanged.
pub fn shorten_id(id: &str) -> String {
    if id.chars().count() <= SHORT_ID_LEN {
        return id.to_string();
    }
    let mut short: String = id.chars().take(SHORT_ID_LEN).collect();
    short.push(ELLIPSIS);
    short
}

// ============================================================================
// InstanceName
// ============================================================================

/// Name of a configured Syncthing instance (e.g. `"default"`, `"nas"`)
///
/// Allowed characters are ASCII alphanumerics plus `-`, `_` and `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceName(String);

impl InstanceName {
    /// Name used when a single instance is configured from plain env vars
    pub const DEFAULT: &'static str = "default";

    /// Create a new InstanceName
    ///
    /// # Errors
    /// Returns error if the name is empty or contains unsupported characters
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::InvalidInstanceName(
                "Instance name cannot be empty".to_string(),
            ));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(DomainError::InvalidInstanceName(format!(
                "Instance name contains invalid characters: {name}"
            )));
        }
        Ok(Self(name))
    }

    /// The name used for the implicit single instance
    #[must_use]
    pub fn default_instance() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    /// Returns true if this is the implicit `default` instance
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for InstanceName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InstanceName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for InstanceName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<InstanceName> for String {
    fn from(name: InstanceName) -> Self {
        name.0
    }
}

// ============================================================================
// FolderId
// ============================================================================

/// Syncthing folder ID (e.g. `"abcd-1234"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FolderId(String);

impl FolderId {
    /// Create a new FolderId
    ///
    /// # Errors
    /// Returns error if the ID is empty after trimming
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(DomainError::InvalidFolderId(
                "Folder ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FolderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FolderId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for FolderId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<FolderId> for String {
    fn from(id: FolderId) -> Self {
        id.0
    }
}

// ============================================================================
// DeviceId
// ============================================================================

/// Syncthing device ID (long alphanumeric string with dashes)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a new DeviceId
    ///
    /// # Errors
    /// Returns error if the ID is empty after trimming
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(DomainError::InvalidDeviceId(
                "Device ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form used by compact projections (`"BBBBBBB…"`)
    #[must_use]
    pub fn short(&self) -> String {
        shorten_id(&self.0)
    }
}

impl Display for DeviceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DeviceId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DeviceId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> Self {
        id.0
    }
}
