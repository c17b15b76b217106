//! Result type alias for Trellis
//!
//! This module provides a convenient Result type alias that uses TrellisError
//! as the error type.

use super::errors::TrellisError;

/// Result type alias for Trellis operations
///
/// This is a convenience type alias that uses `TrellisError` as the error type.
/// Use this throughout the codebase for fallible operations.
///
/// # Examples
///
/// ```
/// use trellis::domain::result::Result;
/// use trellis::domain::errors::TrellisError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(TrellisError::Configuration("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, TrellisError>;
