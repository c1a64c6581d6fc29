use crate::common::error::AutoverError;

/// Result alias used across the crate
///
/// # Examples
///
/// ```
/// use autover::common::result::AutoverResult;
/// use autover::common::error::AutoverError;
///
/// fn example_function() -> AutoverResult<String> {
///     Ok("success".to_string())
/// }
///
/// fn example_with_error() -> AutoverResult<()> {
///     Err(AutoverError::validation_error("remote", "must not be empty", None))
/// }
/// ```
pub type AutoverResult<T> = Result<T, AutoverError>;

/// Error conversion helpers for foreign `Result` types
pub trait ResultExt<T, E> {
    /// Convert the error with a custom mapping
    fn map_autover_err<F>(self, f: F) -> AutoverResult<T>
    where
        F: FnOnce(E) -> AutoverError;

    /// Convert an IO-like error into a file system error for `path`
    ///
    /// ```
    /// use autover::common::result::{AutoverResult, ResultExt};
    /// use std::path::PathBuf;
    ///
    /// let result: Result<(), std::io::Error> = Err(std::io::Error::new(
    ///     std::io::ErrorKind::NotFound, "file not found"
    /// ));
    /// let converted: AutoverResult<()> =
    ///     result.with_filesystem_error("read failed", Some(PathBuf::from("/tmp/x")));
    /// assert!(converted.is_err());
    /// ```
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> AutoverResult<T>
    where
        E: Into<std::io::Error>;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn map_autover_err<F>(self, f: F) -> AutoverResult<T>
    where
        F: FnOnce(E) -> AutoverError,
    {
        self.map_err(f)
    }

    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> AutoverResult<T>
    where
        E: Into<std::io::Error>,
    {
        self.map_err(|e| AutoverError::filesystem_error_with_source(message, path, e.into()))
    }
}
