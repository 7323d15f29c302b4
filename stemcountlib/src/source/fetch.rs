//! Fetch dictionary text from disk or over HTTP.

use std::path::Path;

use tracing::debug;

use crate::error::StemcountError;
use crate::Result;

use super::DictionarySource;

/// Read the full text of a dictionary.
///
/// URLs are fetched with a blocking GET; a non-success status is reported as
/// [`StemcountError::Http`]. Bytes that are not valid UTF-8 are replaced.
pub fn fetch(source: &DictionarySource) -> Result<String> {
    match source {
        DictionarySource::Path(path) => read_file(path),
        DictionarySource::Url(url) => fetch_url(url),
    }
}

fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(StemcountError::PathNotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|source| StemcountError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());

    Ok(decode_text(bytes))
}

fn fetch_url(url: &str) -> Result<String> {
    let response = reqwest::blocking::get(url).map_err(|e| StemcountError::Fetch {
        uri: url.to_string(),
        message: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(StemcountError::Http {
            uri: url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes().map_err(|e| StemcountError::Fetch {
        uri: url.to_string(),
        message: e.to_string(),
    })?;
    debug!("Fetched {} bytes from {}", bytes.len(), url);

    Ok(decode_text(bytes.to_vec()))
}

/// Decode bytes as UTF-8, replacing invalid sequences.
pub fn decode_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_fetch_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("x.lexc");
        fs::write(&path, "LEXICON Root\n").unwrap();

        let text = fetch(&DictionarySource::Path(path)).unwrap();
        assert_eq!(text, "LEXICON Root\n");
    }

    #[test]
    fn test_fetch_missing_file() {
        let source = DictionarySource::Path(PathBuf::from("/nonexistent/x.lexc"));
        assert!(matches!(fetch(&source), Err(StemcountError::PathNotFound(_))));
    }

    #[test]
    fn test_fetch_unreachable_url() {
        // port 9 (discard) on localhost is not expected to serve HTTP
        let source = DictionarySource::Url("http://127.0.0.1:9/x.lexc".to_string());
        assert!(fetch(&source).is_err());
    }

    #[test]
    fn test_decode_lossy() {
        assert_eq!(decode_text(b"caf\xc3\xa9".to_vec()), "café");
        assert_eq!(decode_text(vec![b'a', 0xff, b'b']), "a\u{fffd}b");
    }
}
