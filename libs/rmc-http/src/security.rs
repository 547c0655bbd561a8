//! HTTP security limits.

/// Maximum body preview kept in [`HttpError::HttpStatus`](crate::HttpError::HttpStatus) (8 KiB).
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;
