//! Result type alias for kobo-transfer

use super::errors::TransferError;

/// Result type alias for transfer operations
///
/// # Examples
///
/// ```
/// use kobo_transfer::domain::result::Result;
/// use kobo_transfer::domain::errors::TransferError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(TransferError::Staging("Staging directory unwritable".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, TransferError>;
