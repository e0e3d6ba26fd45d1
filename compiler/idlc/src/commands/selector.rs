use idl_sema::is_valid_selector;

use super::CommandError;

/// Check a `@selector` value and say which form it takes.
pub fn check_selector(selector: &str) -> Result<String, CommandError> {
    if !is_valid_selector(selector) {
        return Err(CommandError::InvalidSelector(selector.to_owned()));
    }
    let form = if selector.contains('/') {
        "fully qualified"
    } else {
        "method name"
    };
    Ok(format!("{selector}: valid {form} selector\n"))
}
