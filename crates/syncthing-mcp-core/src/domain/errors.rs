//! Domain error types
//!
//! Errors raised while constructing validated domain values such as
//! instance names, folder IDs and device IDs.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Instance name is empty or contains unsupported characters
    #[error("Invalid instance name: {0}")]
    InvalidInstanceName(String),

    /// Folder ID is empty after trimming
    #[error("Invalid folder ID: {0}")]
    InvalidFolderId(String),

    /// Device ID is empty after trimming
    #[error("Invalid device ID: {0}")]
    InvalidDeviceId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidInstanceName("bad name".to_string());
        assert_eq!(err.to_string(), "Invalid instance name: bad name");

        let err = DomainError::InvalidFolderId("must not be empty".to_string());
        assert_eq!(err.to_string(), "Invalid folder ID: must not be empty");

        let err = DomainError::InvalidDeviceId("must not be empty".to_string());
        assert_eq!(err.to_string(), "Invalid device ID: must not be empty");
    }

    #[test]
    fn test_error_equality() {
        let err1 = DomainError::InvalidDeviceId("x".to_string());
        let err2 = DomainError::InvalidDeviceId("x".to_string());
        let err3 = DomainError::InvalidDeviceId("y".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
