//! Error codes for all compiler diagnostics.
//!
//! Format: E#### where the first digit names the area:
//! - E1xxx: Name resolution
//! - E2xxx: Constants
//! - E3xxx: Attributes
//! - E4xxx: Types and layouts
//! - E5xxx: Protocols and ordinals
//! - E9xxx: Internal
//!
//! Warnings use the same numbering with a `W` prefix.

use std::fmt;

macro_rules! define_error_codes {
    ($( $(#[$doc:meta])* $code:ident => $description:literal, )*) => {
        /// Error codes for all compiler diagnostics.
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
        pub enum ErrorCode {
            $( $(#[$doc])* $code, )*
        }

        impl ErrorCode {
            /// Every defined code, in declaration order.
            pub const ALL: &'static [ErrorCode] = &[$( ErrorCode::$code, )*];

            /// Get the code as a string (e.g., "E1001").
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( ErrorCode::$code => stringify!($code), )*
                }
            }

            /// One-line description used by `idlc explain`.
            pub fn description(&self) -> &'static str {
                match self {
                    $( ErrorCode::$code => $description, )*
                }
            }
        }
    };
}

define_error_codes! {
    // Name resolution (E1xxx)
    /// Name does not denote any declaration
    E1001 => "the name does not match any declaration in the referenced library",
    /// Declaration has no member with that name
    E1002 => "the declaration exists but has no member with that name",
    /// Library prefix names a library that is not a declared dependency
    E1003 => "the name refers to a library that was not imported with `using`",
    /// Several imported libraries match the same prefix
    E1004 => "more than one imported library matches the name prefix",
    /// Contextual name not found in its context
    E1005 => "the bare name is neither a member of the expected type nor a declaration",
    /// Contextual name matches both a member and a declaration
    E1006 => "the bare name matches both a member of the expected type and a declaration",
    /// Two declarations share a canonical name
    E1007 => "two declarations in one library have the same canonical name",
    /// Declarations depend on each other in a cycle
    E1008 => "declarations depend on each other in a cycle",

    // Constants (E2xxx)
    /// Literal value does not fit its type
    E2001 => "the constant value does not fit in the target type",
    /// Constant cannot be converted to the expected type
    E2002 => "the constant's type cannot be converted to the expected type",
    /// Type cannot be used for a constant
    E2003 => "constants may only have boolean, numeric or string types",
    /// Bitwise or on incompatible operands
    E2004 => "the `|` operator needs two operands of the same integral type",
    /// Identifier does not denote a constant
    E2005 => "the identifier does not refer to a const declaration or a bits/enum member",
    /// Member of one bits/enum assigned to a different type
    E2006 => "a bits or enum member was assigned to a constant of a different type",
    /// Bits/enum underlying type is not (unsigned) integral
    E2007 => "enums need an integral underlying type and bits an unsigned one",
    /// Two members share a value
    E2008 => "two members of the same bits or enum have the same value",
    /// Bits member is not a power of two
    E2009 => "bits members must be powers of two",
    /// Numeric literal text is malformed
    E2010 => "the numeric literal could not be parsed",

    // Attributes (E3xxx)
    /// Attribute given twice
    E3001 => "an attribute with this canonical name was already given",
    /// Attribute argument given twice
    E3002 => "an argument with this canonical name was already given",
    /// Multiple arguments must all be named
    E3003 => "attributes with more than one argument must name every argument",
    /// Argument not in the attribute's schema
    E3004 => "the attribute does not accept an argument with this name",
    /// Required argument missing
    E3005 => "the attribute requires an argument that was not given",
    /// Attribute placed on the wrong element
    E3006 => "the attribute cannot be placed on this kind of element",

    // Types (E4xxx)
    /// Wrong number of layout parameters
    E4001 => "the layout was given the wrong number of parameters",
    /// Too many constraints
    E4002 => "the layout was given more constraints than it accepts",
    /// Layout cannot be optional
    E4003 => "this layout cannot be made optional",
    /// Constraint not accepted by the layout
    E4004 => "the constraint does not apply to this layout",
    /// Expected a type
    E4005 => "a type was expected here",
    /// Expected a value parameter
    E4006 => "a constant value was expected as this layout parameter",
    /// Boxed type is not a struct
    E4007 => "only structs can be boxed",
    /// Protocol constraint missing
    E4008 => "client_end and server_end need a protocol constraint",
    /// Constraint is not a protocol
    E4009 => "the constraint must name a protocol",
    /// Size bounded twice
    E4010 => "the type is already bounded and cannot be bounded again",
    /// Optional given twice
    E4011 => "the type is already optional",

    // Protocols and ordinals (E5xxx)
    /// Two methods share an ordinal
    E5001 => "two methods of a protocol hash to the same ordinal",
    /// Generated ordinal is zero
    E5002 => "the generated ordinal is zero; choose a different selector",
    /// Malformed selector
    E5003 => "the selector must be an identifier or `library.path/Protocol.Method`",
    /// Composed declaration is not a protocol
    E5004 => "only protocols can be composed into a protocol",

    // Internal (E9xxx)
    /// Too many errors
    E9002 => "compilation stopped after reaching the error limit",

    // Warnings
    /// Unknown attribute
    W3001 => "the attribute is not an official attribute and is passed through unchecked",
}

impl ErrorCode {
    /// Look up a code by its textual form (case-insensitive).
    pub fn parse(code: &str) -> Option<ErrorCode> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(code))
    }

    /// Check if this is a name resolution error (E1xxx).
    pub fn is_resolve_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Check if this is a constant error (E2xxx).
    pub fn is_constant_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    /// Check if this is an attribute error (E3xxx).
    pub fn is_attribute_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }

    /// Check if this is a type error (E4xxx).
    pub fn is_type_error(&self) -> bool {
        self.as_str().starts_with("E4")
    }

    /// Check if this is a protocol or ordinal error (E5xxx).
    pub fn is_protocol_error(&self) -> bool {
        self.as_str().starts_with("E5")
    }

    /// Check if this is a warning code (Wxxxx).
    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
