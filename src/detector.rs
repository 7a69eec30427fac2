//! MIME detection backends.
//!
//! Detection is an injected capability: the validator depends on the
//! [`MimeDetector`] trait and never probes the runtime for what is
//! installed. [`InferDetector`] is the default backend;
//! [`UnavailableDetector`] stands in when no backend exists, making the
//! validator skip content detection instead of failing.

use crate::magic::MagicDatabase;
use infer::Infer;
use std::fmt;

/// Content-based MIME detection capability.
pub trait MimeDetector: Send + Sync + fmt::Debug {
    /// Whether a detection backend is present at all. When false the
    /// validator treats content detection as skipped, not failed.
    fn is_available(&self) -> bool {
        true
    }

    /// Attempt to classify the given leading file bytes, consulting the
    /// optional magic database before any compiled-in signatures. `None`
    /// means the content could not be classified.
    fn detect(&self, content: &[u8], magic: Option<&MagicDatabase>) -> Option<String>;
}

/// Default backend: magic-number detection via the `infer` crate, with an
/// optional external magic database taking precedence over the compiled-in
/// matchers.
pub struct InferDetector {
    infer: Infer,
}

impl InferDetector {
    /// Create a detector with the standard matcher set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            infer: Infer::new(),
        }
    }

    /// Create a detector with additional custom matchers registered on the
    /// underlying `infer` instance.
    #[must_use]
    pub fn with_custom_matchers<F>(setup: F) -> Self
    where
        F: FnOnce(&mut Infer),
    {
        let mut infer = Infer::new();
        setup(&mut infer);
        Self { infer }
    }
}

impl Default for InferDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InferDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferDetector").finish_non_exhaustive()
    }
}

impl MimeDetector for InferDetector {
    fn detect(&self, content: &[u8], magic: Option<&MagicDatabase>) -> Option<String> {
        if let Some(entry) = magic.and_then(|db| db.lookup(content)) {
            tracing::trace!(
                "Magic database matched {} ({})",
                entry.mime_type,
                entry.extension
            );
            return Some(entry.mime_type.clone());
        }

        self.infer
            .get(content)
            .map(|kind| kind.mime_type().to_string())
    }
}

/// Backend stand-in for a runtime without any detection facility.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableDetector;

impl MimeDetector for UnavailableDetector {
    fn is_available(&self) -> bool {
        false
    }

    fn detect(&self, _content: &[u8], _magic: Option<&MagicDatabase>) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_detects_jpeg() {
        let detector = InferDetector::new();
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        assert_eq!(detector.detect(&jpeg, None).as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn test_infer_unknown_content() {
        let detector = InferDetector::new();
        assert_eq!(detector.detect(&[0x00, 0x01, 0x02, 0x03], None), None);
    }

    #[test]
    fn test_magic_database_takes_precedence() {
        let detector = InferDetector::new();
        // Claims JPEG's signature for a bespoke type; the database must win
        // over infer's compiled-in matcher.
        let db = MagicDatabase::parse("application/x-custom cst FFD8FF").unwrap();
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(
            detector.detect(&jpeg, Some(&db)).as_deref(),
            Some("application/x-custom")
        );
    }

    #[test]
    fn test_custom_matchers() {
        let detector = InferDetector::with_custom_matchers(|infer| {
            infer.add("text/custom", "custom", |buf| buf.starts_with(b"CUSTOM"));
        });
        assert_eq!(
            detector.detect(b"CUSTOM payload", None).as_deref(),
            Some("text/custom")
        );
    }

    #[test]
    fn test_unavailable_detector() {
        let detector = UnavailableDetector;
        assert!(!detector.is_available());
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(detector.detect(&jpeg, None), None);
    }
}
