//! Checking attributes against their schemas.

use rustc_hash::FxHashMap;

use idl_ir::Span;

use super::CompileStep;
use crate::attribute::schema::{official_schema, ArgType, AttributeSchema};
use crate::attribute::{Attribute, AttributeList, DEFAULT_ARG_NAME};
use crate::element::ElementKind;
use crate::problem::SemanticProblem;
use crate::typespace::TypeId;

impl CompileStep<'_> {
    /// Compile every attribute of an element placed at `placement`.
    ///
    /// Attributes compiled by an earlier visit are skipped, duplicate check
    /// included, so revisiting a list reports nothing new.
    pub(super) fn compile_attributes(&mut self, list: &mut AttributeList, placement: ElementKind) {
        let mut seen: FxHashMap<String, Span> = FxHashMap::default();
        for attribute in list.iter_mut() {
            if attribute.is_compiled() {
                seen.entry(attribute.canonical_name().to_owned())
                    .or_insert(attribute.span);
                continue;
            }
            if let Some(&previous_span) = seen.get(attribute.canonical_name()) {
                self.reporter.error(SemanticProblem::DuplicateAttribute {
                    span: attribute.span,
                    name: self.interner.lookup(attribute.name).to_owned(),
                    previous_span,
                });
            } else {
                seen.insert(attribute.canonical_name().to_owned(), attribute.span);
            }
            self.compile_attribute(attribute, placement);
        }
    }

    fn compile_attribute(&mut self, attribute: &mut Attribute, placement: ElementKind) {
        let name = self.interner.lookup(attribute.name);
        let schema = official_schema(attribute.canonical_name());

        if attribute.args.len() > 1 && attribute.args.iter().any(|arg| arg.is_anonymous()) {
            self.reporter.error(SemanticProblem::AttributeArgsMustAllBeNamed {
                span: attribute.span,
                attribute: name.to_owned(),
            });
        }
        if let [only] = attribute.args.as_mut_slice() {
            if only.is_anonymous() {
                let inferred = schema.map_or(DEFAULT_ARG_NAME, AttributeSchema::anonymous_arg_name);
                only.set_inferred_name(inferred);
            }
        }

        let mut seen_args: FxHashMap<String, Span> = FxHashMap::default();
        for arg in &attribute.args {
            let Some(arg_name) = arg.canonical_name() else {
                continue;
            };
            if let Some(&previous_span) = seen_args.get(arg_name) {
                self.reporter.error(SemanticProblem::DuplicateAttributeArg {
                    span: arg.span,
                    attribute: name.to_owned(),
                    arg: arg_name.to_owned(),
                    previous_span,
                });
            } else {
                seen_args.insert(arg_name.to_owned(), arg.span);
            }
        }

        match schema {
            Some(schema) => self.check_official(attribute, schema, placement),
            None => {
                if !self.allow_unknown_attributes {
                    self.reporter.warn(SemanticProblem::UnknownAttribute {
                        span: attribute.name_span.unwrap_or(attribute.span),
                        name: name.to_owned(),
                    });
                }
                for arg in &mut attribute.args {
                    self.resolve_constant(&mut arg.value, None);
                }
            }
        }
        attribute.mark_compiled();
    }

    fn check_official(
        &mut self,
        attribute: &mut Attribute,
        schema: &'static AttributeSchema,
        placement: ElementKind,
    ) {
        let name = self.interner.lookup(attribute.name);
        if !schema.allows(placement) {
            self.reporter.error(SemanticProblem::InvalidAttributePlacement {
                span: attribute.span,
                attribute: name.to_owned(),
                placement,
            });
        }

        for arg in &mut attribute.args {
            let arg_schema = arg.canonical_name().and_then(|arg_name| schema.arg(arg_name));
            let Some(arg_schema) = arg_schema else {
                self.reporter.error(SemanticProblem::UnknownAttributeArg {
                    span: arg.span,
                    attribute: name.to_owned(),
                    arg: arg.canonical_name().unwrap_or(DEFAULT_ARG_NAME).to_owned(),
                });
                continue;
            };
            let expected = match arg_schema.ty {
                ArgType::String => TypeId::UNBOUNDED_STRING,
                ArgType::Bool => TypeId::BOOL,
            };
            self.resolve_constant(&mut arg.value, Some(expected));
        }

        for arg_schema in schema.args.iter().filter(|arg| !arg.optional) {
            let present = attribute
                .args
                .iter()
                .any(|arg| arg.canonical_name() == Some(arg_schema.name));
            if !present {
                self.reporter.error(SemanticProblem::MissingRequiredAttributeArg {
                    span: attribute.span,
                    attribute: name.to_owned(),
                    arg: arg_schema.name.to_owned(),
                });
            }
        }
    }
}
