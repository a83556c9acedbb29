//! Error types for the signature updater.

use std::fmt;

/// Top-level error type for locating, decoding, and patching signatures.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    /// A caller-supplied argument was unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No version folder, or the named signature is absent from the manifest.
    #[error("not found: {0}")]
    NotFound(String),

    /// I/O error (working directory, backing file access).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Quitting or activating the mail application failed.
    #[error("app control error: {0}")]
    AppControl(String),

    /// The signature manifest could not be copied or decoded.
    #[error("manifest error: {0}")]
    Manifest(String),

    /// Copying a file through the automation tool failed.
    #[error("copy error: {0}")]
    Copy(String),

    /// The manifest property list could not be parsed.
    #[error("decode error: {0}")]
    Decode(String),

    /// Setting or clearing the user-immutable flag failed.
    #[error("flag error: {0}")]
    Flag(String),

    /// Patching one signature's backing file failed.
    #[error("patch {unique_id} failed: {source}")]
    Patch {
        /// Unique identifier of the signature being patched.
        unique_id: String,
        /// Step that failed.
        #[source]
        source: Box<SignatureError>,
    },

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// One or more non-fatal failures collected during an update run.
    #[error(transparent)]
    Update(#[from] UpdateErrors),
}

impl SignatureError {
    /// Wrap an I/O error with a short description of what was being done.
    pub(crate) fn io(context: impl fmt::Display, err: std::io::Error) -> Self {
        SignatureError::Io(std::io::Error::new(err.kind(), format!("{context}: {err}")))
    }

    pub(crate) fn patch(unique_id: &str, source: SignatureError) -> Self {
        SignatureError::Patch {
            unique_id: unique_id.to_owned(),
            source: Box::new(source),
        }
    }
}

/// Ordered collection of non-fatal failures from one update run.
#[derive(Debug, Default)]
pub struct UpdateErrors {
    errors: Vec<SignatureError>,
}

impl UpdateErrors {
    /// Create an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a failure, keeping insertion order.
    pub fn push(&mut self, err: SignatureError) {
        self.errors.push(err);
    }

    /// Whether no failure was collected.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of collected failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over collected failures in the order they occurred.
    pub fn iter(&self) -> std::slice::Iter<'_, SignatureError> {
        self.errors.iter()
    }

    /// Consume the aggregate and return the underlying list.
    pub fn into_inner(self) -> Vec<SignatureError> {
        self.errors
    }
}

impl fmt::Display for UpdateErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.len() {
            0 => write!(f, "no errors occurred"),
            1 => write!(f, "1 error occurred: {}", self.errors[0]),
            n => {
                write!(f, "{n} errors occurred:")?;
                for err in &self.errors {
                    write!(f, "\n\t* {err}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for UpdateErrors {}

impl<'a> IntoIterator for &'a UpdateErrors {
    type Item = &'a SignatureError;
    type IntoIter = std::slice::Iter<'a, SignatureError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, SignatureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_error_names_signature_and_cause() {
        let err = SignatureError::patch("abc", SignatureError::Copy("finder refused".to_owned()));
        let msg = err.to_string();
        assert!(msg.contains("abc"));
        assert!(msg.contains("finder refused"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn io_context_is_prefixed() {
        let err = SignatureError::io(
            "create workdir /tmp/x",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        match err {
            SignatureError::Io(inner) => {
                assert_eq!(inner.kind(), std::io::ErrorKind::PermissionDenied);
                assert!(inner.to_string().starts_with("create workdir /tmp/x"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn aggregate_keeps_order() {
        let mut errors = UpdateErrors::new();
        assert!(errors.is_empty());
        errors.push(SignatureError::Copy("first".to_owned()));
        errors.push(SignatureError::AppControl("second".to_owned()));
        assert_eq!(errors.len(), 2);

        let msg = errors.to_string();
        let first = msg.find("first").unwrap_or(usize::MAX);
        let second = msg.find("second").unwrap_or(0);
        assert!(first < second);
        assert!(msg.starts_with("2 errors occurred"));
    }

    #[test]
    fn single_aggregate_reads_naturally() {
        let mut errors = UpdateErrors::new();
        errors.push(SignatureError::Flag("chflags exited 1".to_owned()));
        assert_eq!(
            SignatureError::from(errors).to_string(),
            "1 error occurred: flag error: chflags exited 1"
        );
    }
}
