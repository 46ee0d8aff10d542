//! Result type alias for Vitalport
//!
//! This module provides a convenient Result type alias that uses
//! [`VitalportError`] as the error type.

use super::errors::VitalportError;

/// Result type alias for Vitalport operations
///
/// # Examples
///
/// ```
/// use vitalport::domain::result::Result;
/// use vitalport::domain::errors::VitalportError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(VitalportError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, VitalportError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::VitalportError;

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(VitalportError::Validation("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
