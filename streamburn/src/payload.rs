//! Firmware payload handling.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

/// An immutable firmware payload of known length.
///
/// The payload is owned by the caller for the duration of one transfer; the
/// connection never takes ownership of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    data: Vec<u8>,
}

impl Payload {
    /// Create a payload from raw bytes.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    /// Load a payload from a local file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            return Err(Error::InvalidPayload(format!(
                "{} is a directory",
                path.display()
            )));
        }
        let data = fs::read(path)?;
        Ok(Self { data })
    }

    /// Total length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for Payload {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<&[u8]> for Payload {
    fn from(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }
}

/// Where a payload comes from: a local file or a fetched URL.
///
/// Parsing rejects URL-like sources with unsupported schemes; the actual
/// HTTP fetch is the embedding application's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    /// Local filesystem path.
    File(PathBuf),
    /// http:// or https:// URL.
    Url(String),
}

impl FromStr for PayloadSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidPayload("empty payload source".into()));
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            return Ok(Self::Url(s.to_string()));
        }
        // Reject other URL-ish schemes rather than treating them as weird
        // relative paths. Windows drive letters ("C:\...") are not schemes.
        if let Some((scheme, _rest)) = s.split_once("://") {
            return Err(Error::InvalidPayload(format!(
                "unsupported URL scheme: {scheme}"
            )));
        }
        Ok(Self::File(PathBuf::from(s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_payload_from_bytes() {
        let p = Payload::from_bytes(vec![1, 2, 3]);
        assert_eq!(p.len(), 3);
        assert!(!p.is_empty());
        assert_eq!(p.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_payload_empty() {
        let p = Payload::from_bytes(Vec::new());
        assert_eq!(p.len(), 0);
        assert!(p.is_empty());
    }

    #[test]
    fn test_payload_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"firmware bytes").unwrap();

        let p = Payload::from_file(file.path()).unwrap();
        assert_eq!(p.as_bytes(), b"firmware bytes");
    }

    #[test]
    fn test_payload_from_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Payload::from_file(dir.path().join("missing.bin"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_payload_from_directory_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let result = Payload::from_file(dir.path());
        assert!(matches!(result, Err(Error::InvalidPayload(_))));
    }

    #[test]
    fn test_source_parses_paths_and_urls() {
        assert_eq!(
            "firmware.bin".parse::<PayloadSource>().unwrap(),
            PayloadSource::File(PathBuf::from("firmware.bin"))
        );
        assert_eq!(
            "https://example.com/fw.bin".parse::<PayloadSource>().unwrap(),
            PayloadSource::Url("https://example.com/fw.bin".to_string())
        );
        assert_eq!(
            "http://10.0.0.1/fw.bin".parse::<PayloadSource>().unwrap(),
            PayloadSource::Url("http://10.0.0.1/fw.bin".to_string())
        );
    }

    #[test]
    fn test_source_rejects_unsupported_schemes() {
        assert!(matches!(
            "ftp://example.com/fw.bin".parse::<PayloadSource>(),
            Err(Error::InvalidPayload(_))
        ));
        assert!(matches!(
            "".parse::<PayloadSource>(),
            Err(Error::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_source_accepts_windows_drive_paths() {
        assert_eq!(
            r"C:\firmware\fw.bin".parse::<PayloadSource>().unwrap(),
            PayloadSource::File(PathBuf::from(r"C:\firmware\fw.bin"))
        );
    }
}
