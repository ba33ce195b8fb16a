//! Typed tool inputs
//!
//! Every struct rejects unknown fields. Folder and device identifiers
//! deserialize straight into the validated domain newtypes, which trim and
//! refuse blank values.

use serde::Deserialize;

use syncthing_mcp_core::domain::{DeviceId, FolderId};
use syncthing_mcp_core::ports::Page;

use super::ToolError;

/// Largest page size the need endpoints accept
pub const MAX_PER_PAGE: u32 = 500;

fn default_concise() -> bool {
    true
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    50
}

/// Trims an optional string, treating blank as absent
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ============================================================================
// Base inputs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadParams {
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default = "default_concise")]
    pub concise: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WriteParams {
    #[serde(default)]
    pub instance: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FolderReadParams {
    pub folder_id: FolderId,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default = "default_concise")]
    pub concise: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FolderWriteParams {
    pub folder_id: FolderId,
    #[serde(default)]
    pub instance: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceReadParams {
    pub device_id: DeviceId,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default = "default_concise")]
    pub concise: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceWriteParams {
    pub device_id: DeviceId,
    #[serde(default)]
    pub instance: Option<String>,
}

// ============================================================================
// File-level queries
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrowseParams {
    pub folder_id: FolderId,
    #[serde(default)]
    pub prefix: Option<String>,
    /// Directory depth; negative values fail to deserialize
    #[serde(default)]
    pub levels: Option<u32>,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default = "default_concise")]
    pub concise: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileInfoParams {
    pub folder_id: FolderId,
    pub file_path: String,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default = "default_concise")]
    pub concise: bool,
}

impl FileInfoParams {
    /// Trimmed file path
    ///
    /// # Errors
    /// Returns [`ToolError::InvalidInput`] when the path is blank
    pub fn file_path(&self) -> Result<&str, ToolError> {
        let path = self.file_path.trim();
        if path.is_empty() {
            return Err(ToolError::InvalidInput(
                "file_path cannot be empty".to_string(),
            ));
        }
        Ok(path)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NeedParams {
    pub folder_id: FolderId,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default = "default_concise")]
    pub concise: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteNeedParams {
    pub folder_id: FolderId,
    pub device_id: DeviceId,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default = "default_concise")]
    pub concise: bool,
}

/// Checks pagination bounds: `page >= 1`, `1 <= per_page <= 500`
///
/// # Errors
/// Returns [`ToolError::InvalidInput`] naming the offending field
pub fn page(page: u32, per_page: u32) -> Result<Page, ToolError> {
    if page < 1 {
        return Err(ToolError::InvalidInput(format!(
            "page must be at least 1 (got {page})"
        )));
    }
    if !(1..=MAX_PER_PAGE).contains(&per_page) {
        return Err(ToolError::InvalidInput(format!(
            "per_page must be between 1 and {MAX_PER_PAGE} (got {per_page})"
        )));
    }
    Ok(Page { page, per_page })
}

impl NeedParams {
    pub fn page(&self) -> Result<Page, ToolError> {
        page(self.page, self.per_page)
    }
}

impl RemoteNeedParams {
    pub fn page(&self) -> Result<Page, ToolError> {
        page(self.page, self.per_page)
    }
}

// ============================================================================
// Pending requests and ignores
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AcceptDeviceParams {
    pub device_id: DeviceId,
    /// Friendly name; the pending request's name is used when omitted
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub instance: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AcceptFolderParams {
    pub folder_id: FolderId,
    /// Local path; the daemon's default folder path is used when omitted
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub instance: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RejectFolderParams {
    pub folder_id: FolderId,
    /// Offering device; every offer is dismissed when omitted
    #[serde(default)]
    pub device_id: Option<DeviceId>,
    #[serde(default)]
    pub instance: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetIgnoresParams {
    pub folder_id: FolderId,
    pub patterns: Vec<String>,
    #[serde(default)]
    pub instance: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetDefaultIgnoresParams {
    pub lines: Vec<String>,
    #[serde(default)]
    pub instance: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_params_defaults() {
        let p: ReadParams = serde_json::from_value(json!({})).unwrap();
        assert!(p.concise);
        assert!(p.instance.is_none());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = serde_json::from_value::<FolderWriteParams>(json!({
            "folder_id": "docs",
            "force": true
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn test_identifiers_trimmed_and_required() {
        let p: FolderReadParams =
            serde_json::from_value(json!({ "folder_id": "  docs " })).unwrap();
        assert_eq!(p.folder_id.as_str(), "docs");

        assert!(serde_json::from_value::<FolderReadParams>(json!({ "folder_id": "  " })).is_err());
        assert!(serde_json::from_value::<DeviceWriteParams>(json!({})).is_err());
    }

    #[test]
    fn test_negative_levels_rejected() {
        assert!(serde_json::from_value::<BrowseParams>(json!({
            "folder_id": "docs",
            "levels": -1
        }))
        .is_err());
    }

    #[test]
    fn test_page_bounds() {
        assert_eq!(page(1, 50).unwrap(), Page::default());
        assert!(page(0, 50).is_err());
        assert!(page(1, 0).is_err());
        assert!(page(1, 501).is_err());
        assert!(page(3, 500).is_ok());
    }

    #[test]
    fn test_blank_file_path_rejected() {
        let p: FileInfoParams = serde_json::from_value(json!({
            "folder_id": "docs",
            "file_path": "   "
        }))
        .unwrap();
        assert!(matches!(p.file_path(), Err(ToolError::InvalidInput(_))));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(&Some("  x ".into())), Some("x"));
        assert_eq!(non_blank(&Some("   ".into())), None);
        assert_eq!(non_blank(&None), None);
    }
}
