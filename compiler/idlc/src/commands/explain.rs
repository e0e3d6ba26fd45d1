use idl_diagnostic::ErrorCode;

use super::CommandError;

/// Describe an error code such as `E1001`.
pub fn explain_error(code: &str) -> Result<String, CommandError> {
    let parsed =
        ErrorCode::parse(code).ok_or_else(|| CommandError::UnknownErrorCode(code.to_owned()))?;
    let kind = if parsed.is_warning() { "warning" } else { "error" };
    Ok(format!("{} ({kind}): {}", parsed.as_str(), parsed.description()))
}
