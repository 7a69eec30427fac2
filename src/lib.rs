//! # MIME Type Validator
//!
//! Allow-list validation of uploaded files' MIME types, combining
//! magic-signature content detection with an optional cross-check of the
//! Content-Type the upload itself declared.
//!
//! ## Features
//!
//! - **Magic-Signature Detection**: File types determined from content, not
//!   extensions (via the `infer` crate)
//! - **Flexible Allow-Lists**: Full types (`image/jpeg`), type families
//!   (`image`), and bare subtype tokens (`gif`)
//! - **Header Cross-Check**: Optionally require the declared Content-Type to
//!   independently pass the same policy
//! - **External Magic Files**: Load additional content signatures from a
//!   database file, validated eagerly at configuration time
//! - **Injected Detection Backend**: Detection is a trait; a runtime without
//!   a backend skips detection instead of failing
//! - **Structured Failure Reasons**: Exactly one reason code plus a rendered
//!   message per failed validation
//!
//! ## Basic Usage
//!
//! ```rust
//! use mime_type_validator::MimeTypeValidator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut validator = MimeTypeValidator::new("image/gif, image/jpeg");
//!
//! if !validator.is_valid("photos/upload.jpg", None).await {
//!     for (key, message) in validator.messages() {
//!         eprintln!("{key}: {message}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Validating an Upload with Metadata
//!
//! ```rust
//! use mime_type_validator::{MimeTypeValidator, UploadMetadata};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut validator = MimeTypeValidator::builder()
//!     .mime_types(vec!["image/jpeg", "image/png"])
//!     .header_check(true)
//!     .build()?;
//!
//! let upload = UploadMetadata::new()
//!     .name("picture.jpg")
//!     .content_type("image/jpeg")
//!     .tmp_name("/tmp/upload-a8f3");
//!
//! let accepted = validator.is_valid("/tmp/upload-a8f3", Some(&upload)).await;
//! # let _ = accepted;
//! # Ok(())
//! # }
//! ```
//!
//! ## Construction from a Configuration Mapping
//!
//! ```rust
//! use mime_type_validator::{MimeTypeOptions, MimeTypeValidator};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options: MimeTypeOptions = serde_json::from_str(
//!     r#"{ "mimeType": ["image/gif", "image/jpg"], "enableHeaderCheck": true }"#,
//! )?;
//! let validator = MimeTypeValidator::from_options(options)?;
//! assert_eq!(validator.mime_types_string(), "image/gif,image/jpg");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Error Model
//!
//! Configuration mistakes (an unusable magic file, a bad options mapping)
//! are hard [`MimeTypeError`]s raised at the point the value is supplied.
//! Validation outcomes are not errors: [`MimeTypeValidator::is_valid`]
//! returns `false` and records one [`MessageKey`] reason: an unreadable
//! target file, a type outside the allow-list, or no determinable type at
//! all.

pub mod detector;
pub mod error;
pub mod magic;
pub mod options;
pub mod validator;

pub use detector::{InferDetector, MimeDetector, UnavailableDetector};
pub use error::{MimeTypeError, Result};
pub use magic::{MagicDatabase, MagicEntry, MagicFileIssue};
pub use options::{MagicFileOption, MimeTypeList, MimeTypeOptions, UploadMetadata};
pub use validator::{
    MagicFileSource, MessageKey, MimeTypeValidator, MimeTypeValidatorBuilder,
    DEFAULT_MAX_DETECTION_BYTES,
};
