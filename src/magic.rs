//! External magic-file support: a parsed database of content signatures.
//!
//! The database is a plain text file with one entry per line:
//!
//! ```text
//! # mime-type      extension  hex-signature      [byte-offset]
//! image/png        png        89504E470D0A1A0A
//! image/jpeg       jpg        FFD8FF
//! application/zip  zip        504B0304
//! video/mp4        mp4        66747970           4
//! ```
//!
//! Blank lines and `#` comments are skipped. Entries are matched in order
//! against the leading bytes of a file; the first matching signature wins.
//! Configured signatures take precedence over the detector's compiled-in
//! defaults.

use std::path::Path;

/// A problem encountered while loading a magic file.
///
/// The two variants map onto the validator's two configuration error
/// classes: an unreadable path versus a database the backend cannot use.
#[derive(Debug, thiserror::Error)]
pub enum MagicFileIssue {
    /// Path missing or not readable
    #[error("not readable: {0}")]
    Unreadable(#[from] std::io::Error),

    /// Contents are not a parseable signature database
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// One signature entry: a byte prefix at a fixed offset mapping to a MIME
/// type and a recommended extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicEntry {
    pub mime_type: String,
    pub extension: String,
    pub signature: Vec<u8>,
    pub offset: usize,
}

impl MagicEntry {
    fn matches(&self, content: &[u8]) -> bool {
        content
            .get(self.offset..)
            .is_some_and(|rest| rest.starts_with(&self.signature))
    }
}

/// A parsed magic-file database.
#[derive(Debug, Clone, Default)]
pub struct MagicDatabase {
    entries: Vec<MagicEntry>,
}

impl MagicDatabase {
    /// Load and parse a magic file from disk.
    ///
    /// # Errors
    /// Returns [`MagicFileIssue::Unreadable`] when the path cannot be read
    /// and [`MagicFileIssue::Malformed`] when the contents do not parse.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MagicFileIssue> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    /// Parse database text.
    ///
    /// # Errors
    /// Returns [`MagicFileIssue::Malformed`] naming the first offending line.
    pub fn parse(text: &str) -> Result<Self, MagicFileIssue> {
        let mut entries = Vec::new();

        for (index, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let (Some(mime_type), Some(extension), Some(signature_hex)) =
                (fields.next(), fields.next(), fields.next())
            else {
                return Err(MagicFileIssue::Malformed {
                    line: index + 1,
                    reason: "expected `mime-type extension hex-signature [offset]`".to_string(),
                });
            };

            if !mime_type.contains('/') {
                return Err(MagicFileIssue::Malformed {
                    line: index + 1,
                    reason: format!("`{mime_type}` is not a type/subtype MIME type"),
                });
            }

            let signature = decode_hex(signature_hex).map_err(|reason| {
                MagicFileIssue::Malformed {
                    line: index + 1,
                    reason,
                }
            })?;

            let offset = match fields.next() {
                Some(field) => {
                    field
                        .parse::<usize>()
                        .map_err(|_| MagicFileIssue::Malformed {
                            line: index + 1,
                            reason: format!("invalid byte offset `{field}`"),
                        })?
                }
                None => 0,
            };

            if fields.next().is_some() {
                return Err(MagicFileIssue::Malformed {
                    line: index + 1,
                    reason: "trailing fields after offset".to_string(),
                });
            }

            entries.push(MagicEntry {
                mime_type: mime_type.to_string(),
                extension: extension.to_string(),
                signature,
                offset,
            });
        }

        if entries.is_empty() {
            return Err(MagicFileIssue::Malformed {
                line: 0,
                reason: "no signature entries found".to_string(),
            });
        }

        Ok(Self { entries })
    }

    /// Look up the MIME type for the given content, first match wins.
    #[must_use]
    pub fn lookup(&self, content: &[u8]) -> Option<&MagicEntry> {
        self.entries.iter().find(|entry| entry.matches(content))
    }

    /// Number of signature entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the database holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn decode_hex(hex: &str) -> Result<Vec<u8>, String> {
    if hex.is_empty() || hex.len() % 2 != 0 || !hex.is_ascii() {
        return Err(format!("invalid hex signature `{hex}`"));
    }
    hex.as_bytes()
        .chunks(2)
        .map(|pair| {
            let high = hex_value(pair[0])?;
            let low = hex_value(pair[1])?;
            Ok(high << 4 | low)
        })
        .collect::<Result<Vec<u8>, ()>>()
        .map_err(|()| format!("invalid hex signature `{hex}`"))
}

fn hex_value(byte: u8) -> Result<u8, ()> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        _ => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
# test signatures
image/png   png  89504E470D0A1A0A
image/jpeg  jpg  FFD8FF

video/mp4   mp4  66747970  4
";

    #[test]
    fn test_parse_sample_database() {
        let db = MagicDatabase::parse(SAMPLE).unwrap();
        assert_eq!(db.len(), 3);
    }

    #[test]
    fn test_lookup_prefix_signature() {
        let db = MagicDatabase::parse(SAMPLE).unwrap();
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
        let entry = db.lookup(&png).unwrap();
        assert_eq!(entry.mime_type, "image/png");
        assert_eq!(entry.extension, "png");
    }

    #[test]
    fn test_lookup_offset_signature() {
        let db = MagicDatabase::parse(SAMPLE).unwrap();
        let mp4 = [0x00, 0x00, 0x00, 0x18, 0x66, 0x74, 0x79, 0x70, 0x69];
        assert_eq!(db.lookup(&mp4).unwrap().mime_type, "video/mp4");
    }

    #[test]
    fn test_lookup_no_match() {
        let db = MagicDatabase::parse(SAMPLE).unwrap();
        assert!(db.lookup(&[0x00, 0x01, 0x02, 0x03]).is_none());
    }

    #[test]
    fn test_malformed_mime_type_rejected() {
        let err = MagicDatabase::parse("notamime png 89504E47").unwrap_err();
        assert!(matches!(err, MagicFileIssue::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_malformed_hex_rejected() {
        let err = MagicDatabase::parse("image/png png XYZ").unwrap_err();
        assert!(matches!(err, MagicFileIssue::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_multibyte_hex_rejected() {
        // Even byte length but not ASCII hex; must report the line, not panic.
        let err = MagicDatabase::parse("image/png png aa\u{20AC}b").unwrap_err();
        assert!(matches!(err, MagicFileIssue::Malformed { line: 1, .. }));

        let err = MagicDatabase::parse("image/png png a\u{00E9}").unwrap_err();
        assert!(matches!(err, MagicFileIssue::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_empty_database_rejected() {
        let err = MagicDatabase::parse("# only comments\n").unwrap_err();
        assert!(matches!(err, MagicFileIssue::Malformed { .. }));
    }

    #[test]
    fn test_load_missing_path_is_unreadable() {
        let err = MagicDatabase::load("/nonexistent/magic.db").unwrap_err();
        assert!(matches!(err, MagicFileIssue::Unreadable(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let db = MagicDatabase::load(file.path()).unwrap();
        assert_eq!(db.len(), 3);
    }
}
