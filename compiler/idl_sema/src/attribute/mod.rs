//! Attributes: `@name(args)` and doc comments attached to elements.
//!
//! Names are matched after canonicalization, so `@no_doc` and `@NoDoc` are
//! the same attribute.

pub mod schema;

use idl_ir::{
    canonicalize, AttributeProvenance, Identifier, Name, RawAttribute, RawAttributeArg, Span,
    StringInterner,
};

use crate::constant::Constant;

#[cfg(test)]
mod tests;

/// Name given to a lone anonymous argument when the attribute's schema does
/// not say otherwise.
pub const DEFAULT_ARG_NAME: &str = "value";

/// One argument of an attribute.
#[derive(Debug)]
pub struct AttributeArg {
    pub name: Option<Identifier>,
    pub value: Constant,
    pub span: Span,
    canonical_name: Option<String>,
}

impl AttributeArg {
    pub fn new(
        name: Option<Identifier>,
        value: Constant,
        span: Span,
        interner: &StringInterner,
    ) -> Self {
        AttributeArg {
            canonical_name: name.map(|n| canonicalize(interner.lookup(n.name))),
            name,
            value,
            span,
        }
    }

    pub fn from_raw(raw: &RawAttributeArg, interner: &StringInterner) -> Self {
        AttributeArg::new(raw.name, Constant::from_raw(&raw.value), raw.span, interner)
    }

    /// Canonical name, written or inferred.
    pub fn canonical_name(&self) -> Option<&str> {
        self.canonical_name.as_deref()
    }

    /// True if the argument was written without a name.
    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }

    pub(crate) fn set_inferred_name(&mut self, name: &str) {
        debug_assert!(self.is_anonymous());
        self.canonical_name = Some(canonicalize(name));
    }
}

/// Cloning yields an uncompiled copy; an inferred name is dropped.
impl Clone for AttributeArg {
    fn clone(&self) -> Self {
        AttributeArg {
            name: self.name,
            value: self.value.clone(),
            span: self.span,
            canonical_name: self.name.and(self.canonical_name.clone()),
        }
    }
}

/// An attribute attached to an element.
#[derive(Debug)]
pub struct Attribute {
    pub name: Name,
    /// Absent for attributes synthesized from doc comments.
    pub name_span: Option<Span>,
    pub args: Vec<AttributeArg>,
    pub provenance: AttributeProvenance,
    pub span: Span,
    canonical_name: String,
    compiled: bool,
}

impl Attribute {
    pub fn new(
        name: Identifier,
        args: Vec<AttributeArg>,
        span: Span,
        interner: &StringInterner,
    ) -> Self {
        Attribute {
            canonical_name: canonicalize(interner.lookup(name.name)),
            name: name.name,
            name_span: Some(name.span),
            args,
            provenance: AttributeProvenance::Default,
            span,
            compiled: false,
        }
    }

    pub fn from_raw(raw: &RawAttribute, interner: &StringInterner) -> Self {
        let args = raw
            .args
            .iter()
            .map(|arg| AttributeArg::from_raw(arg, interner))
            .collect();
        let name = match raw.name {
            Some(name) => name,
            None => Identifier::new(interner.intern("doc"), raw.span),
        };
        Attribute {
            name_span: raw.name.map(|n| n.span),
            provenance: raw.provenance,
            ..Attribute::new(name, args, raw.span, interner)
        }
    }

    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    pub(crate) fn mark_compiled(&mut self) {
        self.compiled = true;
    }

    /// The argument named `name`, compared canonically.
    pub fn get_arg(&self, name: &str) -> Option<&AttributeArg> {
        let wanted = canonicalize(name);
        self.args
            .iter()
            .find(|arg| arg.canonical_name() == Some(wanted.as_str()))
    }

    /// The only argument, if there is exactly one and it has no name.
    ///
    /// # Panics
    /// Panics once the attribute is compiled: compilation names every
    /// anonymous argument, so the question no longer has an answer.
    pub fn standalone_anonymous_arg(&self) -> Option<&AttributeArg> {
        assert!(
            !self.compiled,
            "standalone_anonymous_arg called on compiled attribute `{}`",
            self.canonical_name
        );
        match self.args.as_slice() {
            [arg] if arg.is_anonymous() => Some(arg),
            _ => None,
        }
    }
}

/// Cloning yields an uncompiled copy.
impl Clone for Attribute {
    fn clone(&self) -> Self {
        Attribute {
            name: self.name,
            name_span: self.name_span,
            args: self.args.clone(),
            provenance: self.provenance,
            span: self.span,
            canonical_name: self.canonical_name.clone(),
            compiled: false,
        }
    }
}

/// The attributes of one element. Always present, possibly empty.
#[derive(Clone, Debug, Default)]
pub struct AttributeList {
    attributes: Vec<Attribute>,
}

impl AttributeList {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        AttributeList { attributes }
    }

    pub fn from_raw(raw: &[RawAttribute], interner: &StringInterner) -> Self {
        AttributeList::new(
            raw.iter()
                .map(|attribute| Attribute::from_raw(attribute, interner))
                .collect(),
        )
    }

    /// The first attribute named `name`, compared canonically.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        let wanted = canonicalize(name);
        self.attributes
            .iter()
            .find(|attribute| attribute.canonical_name == wanted)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.attributes.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Attribute> {
        self.attributes.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl<'a> IntoIterator for &'a AttributeList {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
