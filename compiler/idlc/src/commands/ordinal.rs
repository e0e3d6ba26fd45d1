use idl_ir::{is_valid_identifier, is_valid_library_component, Span};
use idl_sema::{generated_ordinal64, is_valid_selector};
use tracing::debug;

use super::CommandError;

/// Compute the ordinal of `method` on `library/protocol`, optionally
/// through a `@selector` override.
pub fn method_ordinal(
    library: &str,
    protocol: &str,
    method: &str,
    selector: Option<&str>,
) -> Result<String, CommandError> {
    let components: Vec<&str> = library.split('.').collect();
    if !components.iter().all(|part| is_valid_library_component(part)) {
        return Err(CommandError::InvalidLibraryName(library.to_owned()));
    }
    for name in [protocol, method] {
        if !is_valid_identifier(name) {
            return Err(CommandError::InvalidIdentifier(name.to_owned()));
        }
    }
    if let Some(selector) = selector {
        if !is_valid_selector(selector) {
            return Err(CommandError::InvalidSelector(selector.to_owned()));
        }
    }

    let selector = selector.unwrap_or(method);
    debug!(library, protocol, selector, "hashing selector");
    let ordinal = generated_ordinal64(&components, protocol, selector, Span::DUMMY).value();
    Ok(format!("{library}/{protocol}.{method}: {ordinal:#018x} ({ordinal})\n"))
}
