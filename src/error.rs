use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Error preparing directory {}: {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error listing {}: {source}", .path.display())]
    Listing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Slug {0:?} cannot be used as a file name")]
    UnsafeSlug(String),

    #[error("{0} was already published by another file of this run")]
    Collision(String),

    #[error("Error writing {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error writing manifest {}: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl IngestError {
    /// Errors that stop the whole run, as opposed to failing a single file.
    pub fn is_environment(&self) -> bool {
        matches!(self, IngestError::Directory { .. } | IngestError::Listing { .. } | IngestError::Manifest { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = IngestError::Read {
            path: PathBuf::from("inbox/post.md"),
            source: io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8"),
        };
        assert_eq!(err.to_string(), "Error reading inbox/post.md: stream did not contain valid UTF-8");
        assert!(!err.is_environment());

        let err = IngestError::UnsafeSlug("../x".to_string());
        assert_eq!(err.to_string(), "Slug \"../x\" cannot be used as a file name");

        let err = IngestError::Listing {
            path: PathBuf::from("inbox"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.is_environment());
    }
}
