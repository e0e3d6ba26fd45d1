//! Schemas of the attributes the compiler itself understands.

use crate::element::ElementKind;

use super::DEFAULT_ARG_NAME;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ArgType {
    String,
    Bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ArgSchema {
    pub name: &'static str,
    pub ty: ArgType,
    pub optional: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Placement {
    Anywhere,
    Only(&'static [ElementKind]),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct AttributeSchema {
    pub name: &'static str,
    pub placement: Placement,
    pub args: &'static [ArgSchema],
}

impl AttributeSchema {
    pub fn allows(&self, kind: ElementKind) -> bool {
        match self.placement {
            Placement::Anywhere => true,
            Placement::Only(kinds) => kinds.contains(&kind),
        }
    }

    /// Schema of the argument with canonical name `name`.
    pub fn arg(&self, name: &str) -> Option<&'static ArgSchema> {
        self.args.iter().find(|arg| arg.name == name)
    }

    /// Name given to a lone anonymous argument.
    pub fn anonymous_arg_name(&self) -> &'static str {
        match self.args {
            [only] => only.name,
            _ => DEFAULT_ARG_NAME,
        }
    }
}

const REQUIRED_STRING: ArgSchema = ArgSchema {
    name: DEFAULT_ARG_NAME,
    ty: ArgType::String,
    optional: false,
};

const OPTIONAL_STRING: ArgSchema = ArgSchema {
    name: DEFAULT_ARG_NAME,
    ty: ArgType::String,
    optional: true,
};

pub static OFFICIAL: [AttributeSchema; 5] = [
    AttributeSchema {
        name: "doc",
        placement: Placement::Anywhere,
        args: &[REQUIRED_STRING],
    },
    AttributeSchema {
        name: "selector",
        placement: Placement::Only(&[ElementKind::ProtocolMethod]),
        args: &[REQUIRED_STRING],
    },
    AttributeSchema {
        name: "transitional",
        placement: Placement::Only(&[
            ElementKind::ProtocolMethod,
            ElementKind::TableMember,
            ElementKind::UnionMember,
        ]),
        args: &[OPTIONAL_STRING],
    },
    AttributeSchema {
        name: "discoverable",
        placement: Placement::Only(&[ElementKind::Protocol]),
        args: &[ArgSchema {
            name: "name",
            ty: ArgType::String,
            optional: true,
        }],
    },
    AttributeSchema {
        name: "no_doc",
        placement: Placement::Only(&[
            ElementKind::Library,
            ElementKind::Alias,
            ElementKind::Bits,
            ElementKind::Const,
            ElementKind::Enum,
            ElementKind::NewType,
            ElementKind::Protocol,
            ElementKind::Resource,
            ElementKind::Service,
            ElementKind::Struct,
            ElementKind::Table,
            ElementKind::Union,
        ]),
        args: &[],
    },
];

/// The schema of an official attribute, by canonical name.
pub fn official_schema(canonical_name: &str) -> Option<&'static AttributeSchema> {
    OFFICIAL.iter().find(|schema| schema.name == canonical_name)
}
