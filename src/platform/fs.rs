// ChatEvidence - platform/fs.rs
//
// Filesystem reads for chat exports and user dictionaries.
// The core layer receives bytes or strings from here and never opens files.

use crate::util::constants;
use crate::util::error::{DictionaryError, ParseError};
use std::io;
use std::path::Path;

/// Read a chat export as raw bytes. Decoding happens in the core layer.
pub fn read_evidence_file(path: &Path) -> Result<Vec<u8>, ParseError> {
    match std::fs::read(path) {
        Ok(bytes) => {
            tracing::debug!(path = %path.display(), bytes = bytes.len(), "Read chat export");
            Ok(bytes)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ParseError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(ParseError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Read a user dictionary file, refusing anything over the size limit.
pub fn read_dictionary_file(path: &Path) -> Result<String, DictionaryError> {
    let io_err = |e: io::Error| DictionaryError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    let size = std::fs::metadata(path).map_err(io_err)?.len();
    if size > constants::MAX_DICTIONARY_FILE_SIZE {
        return Err(DictionaryError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            max_size: constants::MAX_DICTIONARY_FILE_SIZE,
        });
    }
    std::fs::read_to_string(path).map_err(io_err)
}
