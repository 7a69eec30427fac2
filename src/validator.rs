//! The MIME-type validator: allow-list policy over content detection and
//! declared upload headers.

use crate::detector::{InferDetector, MimeDetector};
use crate::error::{MimeTypeError, Result};
use crate::magic::{MagicDatabase, MagicFileIssue};
use crate::options::{MagicFileOption, MimeTypeList, MimeTypeOptions, UploadMetadata};

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncReadExt;

/// Default cap on bytes read for magic-signature detection.
/// 8KB covers every signature in the compiled-in matcher set.
pub const DEFAULT_MAX_DETECTION_BYTES: usize = 8192;

/// Reason code attached to a failed validation. `as_str()` yields the wire
/// identifier callers key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// Target file missing or not readable (`fileMimeTypeNotReadable`)
    NotReadable,
    /// Detected or declared type not in the allow-list (`fileMimeTypeFalse`)
    FalseType,
    /// No MIME type could be determined at all (`fileMimeTypeNotDetected`)
    NotDetected,
}

impl MessageKey {
    /// The stable string identifier for this reason code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MessageKey::NotReadable => "fileMimeTypeNotReadable",
            MessageKey::FalseType => "fileMimeTypeFalse",
            MessageKey::NotDetected => "fileMimeTypeNotDetected",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the magic-signature database comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MagicFileSource {
    /// Use the detector's compiled-in signatures
    #[default]
    Default,
    /// Content detection explicitly disabled (the `magicFile => false` shape)
    Disabled,
    /// Explicit database path, loaded and validated when configured
    Path(PathBuf),
}

/// Validates that a file's MIME type is within a configured allow-list.
///
/// The type is determined by magic-signature content detection (via an
/// injected [`MimeDetector`], by default [`InferDetector`]) and optionally
/// cross-checked against the Content-Type the upload itself declared. When
/// both sources are available, both must independently pass.
///
/// A validator holds no resources between calls and is cheap to reuse for
/// sequential validations; reconfiguration requires `&mut self` and so
/// cannot race an in-flight [`is_valid`](Self::is_valid).
#[derive(Debug, Clone)]
pub struct MimeTypeValidator {
    mime_types: Vec<String>,
    magic_file: MagicFileSource,
    magic_db: Option<MagicDatabase>,
    magic_file_disabled: bool,
    header_check: bool,
    max_detection_bytes: usize,
    detector: Arc<dyn MimeDetector>,
    messages: HashMap<MessageKey, String>,
}

impl MimeTypeValidator {
    /// Create a validator for the given allow-list with default settings:
    /// compiled-in detection signatures, header check off.
    pub fn new(mime_types: impl Into<MimeTypeList>) -> Self {
        Self {
            mime_types: mime_types.into().into_entries(),
            magic_file: MagicFileSource::Default,
            magic_db: None,
            magic_file_disabled: false,
            header_check: false,
            max_detection_bytes: DEFAULT_MAX_DETECTION_BYTES,
            detector: Arc::new(InferDetector::new()),
            messages: HashMap::new(),
        }
    }

    /// Create a validator from an options mapping.
    ///
    /// # Errors
    /// Returns [`MimeTypeError::InvalidMagicMimeFile`] when the mapping names
    /// a magic file the detection backend cannot use, and
    /// [`MimeTypeError::InvalidOptions`] when the allow-list resolves empty.
    pub fn from_options(options: MimeTypeOptions) -> Result<Self> {
        let mut builder = Self::builder()
            .mime_types(options.mime_type)
            .header_check(options.enable_header_check);

        match options.magic_file {
            Some(MagicFileOption::Path(path)) => builder = builder.magic_file(path),
            Some(MagicFileOption::Enabled(false)) => builder = builder.without_magic_file(),
            Some(MagicFileOption::Enabled(true)) | None => {}
        }

        let validator = builder.build()?;
        if validator.mime_types.is_empty() {
            return Err(MimeTypeError::InvalidOptions {
                message: "mimeType resolved to an empty allow-list".to_string(),
            });
        }
        Ok(validator)
    }

    /// Create a builder for full control over construction.
    #[must_use]
    pub fn builder() -> MimeTypeValidatorBuilder {
        MimeTypeValidatorBuilder::new()
    }

    /// Replace the allow-list. Accepts the same shapes as construction;
    /// comma-separated strings are split, empty entries dropped.
    pub fn set_mime_type(&mut self, mime_types: impl Into<MimeTypeList>) -> &mut Self {
        self.mime_types = mime_types.into().into_entries();
        self
    }

    /// Append to the allow-list. An empty string/entry is a no-op.
    pub fn add_mime_type(&mut self, mime_types: impl Into<MimeTypeList>) -> &mut Self {
        self.mime_types.extend(mime_types.into().into_entries());
        self
    }

    /// The allow-list in stored order, duplicates preserved.
    #[must_use]
    pub fn mime_types(&self) -> &[String] {
        &self.mime_types
    }

    /// The allow-list joined with commas for display.
    #[must_use]
    pub fn mime_types_string(&self) -> String {
        self.mime_types.join(",")
    }

    /// Configure an explicit magic-signature database.
    ///
    /// The file is loaded and validated immediately; on failure the
    /// previously configured source and database are left untouched.
    ///
    /// # Errors
    /// Returns [`MimeTypeError::InvalidArgument`] when the path does not
    /// exist or cannot be read, and [`MimeTypeError::InvalidMagicMimeFile`]
    /// when its contents are rejected by the detection backend.
    pub fn set_magic_file(&mut self, path: impl Into<PathBuf>) -> Result<&mut Self> {
        let path = path.into();
        let db = match MagicDatabase::load(&path) {
            Ok(db) => db,
            Err(MagicFileIssue::Unreadable(source)) => {
                return Err(MimeTypeError::InvalidArgument {
                    path,
                    reason: source.to_string(),
                });
            }
            Err(issue @ MagicFileIssue::Malformed { .. }) => {
                return Err(MimeTypeError::InvalidMagicMimeFile {
                    path,
                    reason: issue.to_string(),
                });
            }
        };

        tracing::debug!("Loaded magic database from {:?} ({} entries)", path, db.len());
        self.magic_db = Some(db);
        self.magic_file = MagicFileSource::Path(path);
        Ok(self)
    }

    /// The configured magic-file source. Still reports a configured path
    /// while detection is disabled via [`disable_magic_file`](Self::disable_magic_file).
    #[must_use]
    pub fn magic_file(&self) -> &MagicFileSource {
        &self.magic_file
    }

    /// Force content detection off (or back on) regardless of the
    /// configured magic-file source.
    pub fn disable_magic_file(&mut self, disable: bool) -> &mut Self {
        self.magic_file_disabled = disable;
        self
    }

    /// Whether content detection is off, either via
    /// [`disable_magic_file`](Self::disable_magic_file) or a
    /// [`MagicFileSource::Disabled`] configuration.
    #[must_use]
    pub fn is_magic_file_disabled(&self) -> bool {
        self.magic_file_disabled || self.magic_file == MagicFileSource::Disabled
    }

    /// Require the upload's declared Content-Type to also pass the
    /// allow-list.
    pub fn enable_header_check(&mut self, enable: bool) -> &mut Self {
        self.header_check = enable;
        self
    }

    /// Whether the declared-header cross-check is on.
    #[must_use]
    pub fn header_check(&self) -> bool {
        self.header_check
    }

    /// Reason code and rendered message from the last validation; empty
    /// after a successful call. At most one entry is recorded per failure.
    #[must_use]
    pub fn messages(&self) -> &HashMap<MessageKey, String> {
        &self.messages
    }

    /// Allow-list membership test for a `type/subtype` candidate.
    ///
    /// An entry matches when it equals the full candidate, its type
    /// component, or its subtype component. `"image"` therefore admits any
    /// `image/*`, and the bare token `"gif"` admits `image/gif` as well as a
    /// hypothetical `gif/anything`. Comparison is case-sensitive and exact
    /// per component; there is no glob syntax.
    #[must_use]
    pub fn allows(&self, candidate: &str) -> bool {
        self.mime_types.iter().any(|entry| {
            entry == candidate || candidate.split('/').any(|component| component == entry)
        })
    }

    /// Validate a file against the configured policy.
    ///
    /// The candidate path is `upload.tmp_name` when supplied, otherwise
    /// `value`; the display name used in messages is `upload.name`,
    /// otherwise `value`'s file name. Returns `false` with exactly one
    /// reason in [`messages`](Self::messages) when the file is unreadable,
    /// its type is not allowed, or no type could be determined.
    pub async fn is_valid<P: AsRef<Path>>(
        &mut self,
        value: P,
        upload: Option<&UploadMetadata>,
    ) -> bool {
        self.messages.clear();

        let value = value.as_ref();
        let file_path = upload
            .and_then(|meta| meta.tmp_name.as_deref())
            .unwrap_or(value);
        let display_name = upload
            .and_then(|meta| meta.name.clone())
            .or_else(|| {
                value
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| value.display().to_string());

        match fs::metadata(file_path).await {
            Ok(metadata) if metadata.is_file() => {}
            _ => {
                tracing::debug!("File {:?} missing or not a regular file", file_path);
                self.record(
                    MessageKey::NotReadable,
                    format!("File '{display_name}' is not readable or does not exist"),
                );
                return false;
            }
        }

        // Readability is gated by an actual open, so an existing file the
        // process cannot read fails here even when detection is skipped.
        let mut file = match fs::File::open(file_path).await {
            Ok(file) => file,
            Err(error) => {
                tracing::debug!("Failed to open {:?}: {}", file_path, error);
                self.record(
                    MessageKey::NotReadable,
                    format!("File '{display_name}' is not readable or does not exist"),
                );
                return false;
            }
        };

        let detection_enabled = !self.is_magic_file_disabled() && self.detector.is_available();
        let detected_type = if detection_enabled {
            match self.read_leading_bytes(&mut file).await {
                Ok(content) => self.detector.detect(&content, self.magic_db.as_ref()),
                Err(error) => {
                    tracing::debug!("Failed to read {:?} for detection: {}", file_path, error);
                    self.record(
                        MessageKey::NotReadable,
                        format!("File '{display_name}' is not readable or does not exist"),
                    );
                    return false;
                }
            }
        } else {
            tracing::trace!("Content detection skipped for {:?}", file_path);
            None
        };
        drop(file);

        let declared_type = if self.header_check {
            upload.and_then(|meta| meta.content_type.as_deref())
        } else {
            None
        };

        let detected_match = detected_type.as_deref().map(|ty| self.allows(ty));
        let declared_match = declared_type.map(|ty| self.allows(ty));

        match (detected_match, declared_match) {
            (Some(true), Some(true)) | (Some(true), None) | (None, Some(true)) => {
                tracing::debug!(
                    "File {:?} accepted (detected: {:?}, declared: {:?})",
                    file_path,
                    detected_type,
                    declared_type
                );
                true
            }
            (Some(false), _) => {
                // Detection ran and the result is outside the allow-list;
                // per policy this fails even if the declared header matches.
                let ty = detected_type.as_deref().unwrap_or_default();
                self.record(
                    MessageKey::FalseType,
                    format!("File '{display_name}' has an incorrect MIME type of '{ty}'"),
                );
                false
            }
            (_, Some(false)) => {
                let ty = declared_type.unwrap_or_default();
                self.record(
                    MessageKey::FalseType,
                    format!("File '{display_name}' has an incorrect MIME type of '{ty}'"),
                );
                false
            }
            (None, None) => {
                self.record(
                    MessageKey::NotDetected,
                    format!("The MIME type of file '{display_name}' could not be detected"),
                );
                false
            }
        }
    }

    async fn read_leading_bytes(&self, file: &mut fs::File) -> std::io::Result<Vec<u8>> {
        let mut buffer = vec![0u8; self.max_detection_bytes];
        let bytes_read = file.read(&mut buffer).await?;
        buffer.truncate(bytes_read);
        Ok(buffer)
    }

    fn record(&mut self, key: MessageKey, message: String) {
        tracing::debug!("Validation failed [{}]: {}", key, message);
        self.messages.insert(key, message);
    }
}

/// Builder for [`MimeTypeValidator`].
pub struct MimeTypeValidatorBuilder {
    mime_types: Vec<String>,
    magic_file: MagicFileSource,
    magic_file_disabled: bool,
    header_check: bool,
    max_detection_bytes: usize,
    detector: Option<Arc<dyn MimeDetector>>,
}

impl MimeTypeValidatorBuilder {
    /// Create a builder with an empty allow-list and default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mime_types: Vec::new(),
            magic_file: MagicFileSource::Default,
            magic_file_disabled: false,
            header_check: false,
            max_detection_bytes: DEFAULT_MAX_DETECTION_BYTES,
            detector: None,
        }
    }

    /// Replace the allow-list.
    #[must_use]
    pub fn mime_types(mut self, mime_types: impl Into<MimeTypeList>) -> Self {
        self.mime_types = mime_types.into().into_entries();
        self
    }

    /// Append a single allowed type, family, or subtype token.
    #[must_use]
    pub fn allow_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        if !mime_type.is_empty() {
            self.mime_types.push(mime_type);
        }
        self
    }

    /// Use an explicit magic-signature database, validated during
    /// [`build`](Self::build).
    #[must_use]
    pub fn magic_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.magic_file = MagicFileSource::Path(path.into());
        self
    }

    /// Configure the `magicFile => false` shape: no database, content
    /// detection off.
    #[must_use]
    pub fn without_magic_file(mut self) -> Self {
        self.magic_file = MagicFileSource::Disabled;
        self
    }

    /// Force content detection off regardless of the configured source.
    #[must_use]
    pub fn disable_magic_file(mut self, disable: bool) -> Self {
        self.magic_file_disabled = disable;
        self
    }

    /// Require the declared Content-Type to also pass.
    #[must_use]
    pub fn header_check(mut self, enable: bool) -> Self {
        self.header_check = enable;
        self
    }

    /// Cap the bytes read for signature detection.
    #[must_use]
    pub fn max_detection_bytes(mut self, bytes: usize) -> Self {
        self.max_detection_bytes = bytes;
        self
    }

    /// Inject a detection backend. Defaults to [`InferDetector`].
    #[must_use]
    pub fn detector(mut self, detector: Arc<dyn MimeDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Build the validator, loading and validating any configured magic
    /// file.
    ///
    /// # Errors
    /// Returns [`MimeTypeError::InvalidMagicMimeFile`] when the configured
    /// magic file is missing, unreadable, or rejected by the backend.
    pub fn build(self) -> Result<MimeTypeValidator> {
        let magic_db = match &self.magic_file {
            MagicFileSource::Path(path) => Some(MagicDatabase::load(path).map_err(|issue| {
                MimeTypeError::InvalidMagicMimeFile {
                    path: path.clone(),
                    reason: issue.to_string(),
                }
            })?),
            MagicFileSource::Default | MagicFileSource::Disabled => None,
        };

        Ok(MimeTypeValidator {
            mime_types: self.mime_types,
            magic_file: self.magic_file,
            magic_db,
            magic_file_disabled: self.magic_file_disabled,
            header_check: self.header_check,
            max_detection_bytes: self.max_detection_bytes,
            detector: self
                .detector
                .unwrap_or_else(|| Arc::new(InferDetector::new())),
            messages: HashMap::new(),
        })
    }
}

impl Default for MimeTypeValidatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
