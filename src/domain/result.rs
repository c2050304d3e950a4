//! Result type alias for sierra-export

use super::errors::SierraExportError;

/// Result type alias for sierra-export operations
///
/// # Examples
///
/// ```
/// use sierra_export::domain::result::Result;
/// use sierra_export::domain::errors::SierraExportError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(SierraExportError::InvalidRange("end before start".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SierraExportError>;
