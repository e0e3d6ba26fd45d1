use idl_ir::{canonicalize, is_valid_identifier};

use super::CommandError;

/// Print the canonical form of each identifier, one per line.
pub fn canonical_names<S: AsRef<str>>(identifiers: &[S]) -> Result<String, CommandError> {
    if identifiers.is_empty() {
        return Err(CommandError::MissingArgument("identifier"));
    }
    let mut out = String::new();
    for identifier in identifiers {
        let identifier = identifier.as_ref();
        if !is_valid_identifier(identifier) {
            return Err(CommandError::InvalidIdentifier(identifier.to_owned()));
        }
        out.push_str(identifier);
        out.push_str(" -> ");
        out.push_str(&canonicalize(identifier));
        out.push('\n');
    }
    Ok(out)
}
