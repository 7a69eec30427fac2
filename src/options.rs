//! Boundary types for validator construction and per-call upload metadata.
//!
//! The validator accepts several input shapes for its allow-list (a single
//! string, a comma-separated string, or an ordered sequence). These are
//! resolved here into one canonical form before any validation logic runs.

use serde::Deserialize;
use std::path::PathBuf;

/// Allow-list input: a single (possibly comma-separated) string or an
/// ordered sequence of entries.
///
/// A single string is split on commas with surrounding whitespace trimmed;
/// a sequence is used verbatim. Empty entries are dropped in both shapes,
/// order is preserved, duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MimeTypeList {
    /// One string, optionally comma-separated into multiple entries
    Single(String),
    /// Ordered sequence, used verbatim
    Many(Vec<String>),
}

impl MimeTypeList {
    /// Resolve into the canonical ordered entry list.
    pub fn into_entries(self) -> Vec<String> {
        match self {
            MimeTypeList::Single(s) => s
                .split(',')
                .map(str::trim)
                .filter(|piece| !piece.is_empty())
                .map(str::to_string)
                .collect(),
            MimeTypeList::Many(items) => {
                items.into_iter().filter(|item| !item.is_empty()).collect()
            }
        }
    }
}

impl From<&str> for MimeTypeList {
    fn from(value: &str) -> Self {
        MimeTypeList::Single(value.to_string())
    }
}

impl From<String> for MimeTypeList {
    fn from(value: String) -> Self {
        MimeTypeList::Single(value)
    }
}

impl From<Vec<String>> for MimeTypeList {
    fn from(value: Vec<String>) -> Self {
        MimeTypeList::Many(value)
    }
}

impl From<Vec<&str>> for MimeTypeList {
    fn from(value: Vec<&str>) -> Self {
        MimeTypeList::Many(value.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for MimeTypeList {
    fn from(value: &[&str]) -> Self {
        MimeTypeList::Many(value.iter().map(|s| (*s).to_string()).collect())
    }
}

/// The `magicFile` option: either an explicit path to a signature database
/// or `false` to disable content detection outright.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MagicFileOption {
    /// `false` disables magic-file detection; `true` keeps the default
    Enabled(bool),
    /// Path to a signature database file
    Path(PathBuf),
}

/// Canonical construction options, deserializable from a configuration
/// mapping. Unrecognized keys are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MimeTypeOptions {
    /// Allowed MIME types / type families / subtype tokens (required)
    pub mime_type: MimeTypeList,
    /// Optional magic-file override, or `false` to disable detection
    #[serde(default)]
    pub magic_file: Option<MagicFileOption>,
    /// Whether the upload's declared Content-Type must also pass
    #[serde(default, alias = "headerCheck")]
    pub enable_header_check: bool,
}

impl MimeTypeOptions {
    /// Create options with the given allow-list and defaults otherwise.
    pub fn new(mime_type: impl Into<MimeTypeList>) -> Self {
        Self {
            mime_type: mime_type.into(),
            magic_file: None,
            enable_header_check: false,
        }
    }

    /// Set the magic-file option.
    #[must_use]
    pub fn magic_file(mut self, magic_file: MagicFileOption) -> Self {
        self.magic_file = Some(magic_file);
        self
    }

    /// Enable or disable the declared-header cross-check.
    #[must_use]
    pub fn enable_header_check(mut self, enable: bool) -> Self {
        self.enable_header_check = enable;
        self
    }
}

/// Metadata describing an uploaded file, in the shape web frameworks hand
/// over for a multipart upload (`name`, declared `type`, temporary path,
/// size, transport error code).
///
/// Validation reads `name`, `type` and `tmp_name` only; the remaining fields
/// are carried untouched for callers that want them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadMetadata {
    /// Client-supplied file name, used for display in messages
    #[serde(default)]
    pub name: Option<String>,
    /// Declared Content-Type from the upload's own headers
    #[serde(default, rename = "type")]
    pub content_type: Option<String>,
    /// Server-side temporary path holding the uploaded bytes
    #[serde(default)]
    pub tmp_name: Option<PathBuf>,
    /// Size in bytes as reported by the transport
    #[serde(default)]
    pub size: Option<u64>,
    /// Transport-level error code
    #[serde(default)]
    pub error: Option<u32>,
}

impl UploadMetadata {
    /// Create empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display file name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the declared Content-Type.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the temporary path holding the uploaded bytes.
    #[must_use]
    pub fn tmp_name(mut self, tmp_name: impl Into<PathBuf>) -> Self {
        self.tmp_name = Some(tmp_name.into());
        self
    }

    /// Set the reported size in bytes.
    #[must_use]
    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_string_splits_on_commas() {
        let list = MimeTypeList::from("image/gif, image/jpg, image/jpeg");
        assert_eq!(
            list.into_entries(),
            vec!["image/gif", "image/jpg", "image/jpeg"]
        );
    }

    #[test]
    fn test_sequence_used_verbatim() {
        let list = MimeTypeList::from(vec!["image/jpg", "image/jpeg", "gif"]);
        assert_eq!(list.into_entries(), vec!["image/jpg", "image/jpeg", "gif"]);
    }

    #[test]
    fn test_empty_entries_dropped() {
        assert!(MimeTypeList::from("").into_entries().is_empty());
        assert_eq!(MimeTypeList::from("image/gif,,").into_entries(), vec!["image/gif"]);
        assert_eq!(
            MimeTypeList::from(vec!["image/gif", ""]).into_entries(),
            vec!["image/gif"]
        );
    }

    #[test]
    fn test_duplicates_and_order_preserved() {
        let list = MimeTypeList::from(vec!["b", "a", "b"]);
        assert_eq!(list.into_entries(), vec!["b", "a", "b"]);
    }

    #[test]
    fn test_options_from_json_mapping() {
        let options: MimeTypeOptions = serde_json::from_value(serde_json::json!({
            "mimeType": ["image/gif", "image/jpg"],
            "enableHeaderCheck": true,
            "unknownKey": "ignored",
        }))
        .unwrap();
        assert!(options.enable_header_check);
        assert_eq!(
            options.mime_type.into_entries(),
            vec!["image/gif", "image/jpg"]
        );
    }

    #[test]
    fn test_options_header_check_alias() {
        let options: MimeTypeOptions = serde_json::from_value(serde_json::json!({
            "mimeType": "image/gif",
            "headerCheck": true,
        }))
        .unwrap();
        assert!(options.enable_header_check);
    }

    #[test]
    fn test_options_magic_file_false() {
        let options: MimeTypeOptions = serde_json::from_value(serde_json::json!({
            "mimeType": "image/gif",
            "magicFile": false,
        }))
        .unwrap();
        assert_eq!(options.magic_file, Some(MagicFileOption::Enabled(false)));
    }

    #[test]
    fn test_upload_metadata_from_files_mapping() {
        let meta: UploadMetadata = serde_json::from_value(serde_json::json!({
            "name": "picture.jpg",
            "type": "image/jpg",
            "size": 200,
            "tmp_name": "/tmp/phpA3xs",
            "error": 0,
        }))
        .unwrap();
        assert_eq!(meta.name.as_deref(), Some("picture.jpg"));
        assert_eq!(meta.content_type.as_deref(), Some("image/jpg"));
        assert_eq!(meta.tmp_name.as_deref(), Some(std::path::Path::new("/tmp/phpA3xs")));
        assert_eq!(meta.size, Some(200));
    }
}
