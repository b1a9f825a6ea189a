//! Unique error codes for cross-binding error identification.

/// A trait for errors that have a unique, stable error code.
///
/// Binding layers surface the code instead of the display string so that
/// callers can branch on the failure kind.
pub trait ErrorCode: std::error::Error {
    /// Returns the unique error code for this error.
    fn error_code(&self) -> &'static str;
}

impl<E: ErrorCode> ErrorCode for Box<E> {
    fn error_code(&self) -> &'static str {
        (**self).error_code()
    }
}
