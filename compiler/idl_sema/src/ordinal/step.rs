//! The ordinal step: assign every protocol method its ordinal, then check
//! ordinals are unique within each protocol, composed methods included.

use rustc_hash::{FxHashMap, FxHashSet};

use idl_ir::{Span, StringInterner};

use super::{generated_ordinal64, is_valid_selector, selector};
use crate::element::{DeclId, DeclKind, Libraries, LibraryId, MemberBody, MemberId};
use crate::lookup::Lookup;
use crate::problem::SemanticProblem;
use crate::reference::Target;
use crate::reporter::Reporter;

pub struct OrdinalStep<'a> {
    lookup: &'a Lookup,
    interner: &'a StringInterner,
    reporter: &'a mut Reporter,
}

impl<'a> OrdinalStep<'a> {
    pub fn new(lookup: &'a Lookup, interner: &'a StringInterner, reporter: &'a mut Reporter) -> Self {
        OrdinalStep {
            lookup,
            interner,
            reporter,
        }
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self, libraries: &mut Libraries) {
        let protocols: Vec<DeclId> = libraries
            .decl_ids()
            .into_iter()
            .filter(|id| id.library != LibraryId::ROOT)
            .filter(|&id| libraries.decl(id).kind == DeclKind::Protocol)
            .collect();
        for &protocol in &protocols {
            self.assign(libraries, protocol);
        }
        for &protocol in &protocols {
            self.check_unique(libraries, protocol);
        }
        tracing::debug!(protocols = protocols.len(), "ordinals assigned");
    }

    fn assign(&mut self, libraries: &mut Libraries, protocol: DeclId) {
        let interner = self.interner;
        let library: Vec<&str> = libraries
            .library(protocol.library)
            .name
            .iter()
            .map(|&component| interner.lookup(component))
            .collect();
        let decl = libraries.decl_mut(protocol);
        let protocol_name = interner.lookup(decl.name);
        let decl_span = decl.span.unwrap_or(Span::DUMMY);

        for member in &mut decl.members {
            let MemberBody::Method(method) = &mut member.body else {
                continue;
            };
            let method_name = interner.lookup(member.name);
            let span = member.span.unwrap_or(decl_span);

            let written = member
                .attributes
                .get("selector")
                .and_then(|attribute| attribute.get_arg("value"))
                .and_then(|arg| Some((arg.value.value()?.as_str()?, arg.span)));
            if let Some((written, arg_span)) = written {
                if !is_valid_selector(written) {
                    self.reporter.error(SemanticProblem::InvalidSelectorValue {
                        span: arg_span,
                        selector: written.to_owned(),
                    });
                    continue;
                }
            }

            let selector = selector(&member.attributes, method_name);
            let ordinal = generated_ordinal64(&library, protocol_name, selector, span);
            if ordinal.value() == 0 {
                self.reporter.error(SemanticProblem::GeneratedZeroValueOrdinal {
                    span,
                    method: method_name.to_owned(),
                });
                continue;
            }
            tracing::trace!(method = method_name, ordinal = ordinal.value(), "ordinal");
            method.ordinal = Some(ordinal);
        }
    }

    fn check_unique(&mut self, libraries: &Libraries, protocol: DeclId) {
        let mut visited = FxHashSet::default();
        let mut methods = Vec::new();
        collect_methods(libraries, protocol, &mut visited, &mut methods);

        let mut seen: FxHashMap<u64, MemberId> = FxHashMap::default();
        for method_id in methods {
            let member = libraries.member(method_id);
            let Some(ordinal) = member.method().and_then(|method| method.ordinal) else {
                continue;
            };
            let Some(&previous) = seen.get(&ordinal.value()) else {
                seen.insert(ordinal.value(), method_id);
                continue;
            };
            // A clash inside one composed protocol is reported for that
            // protocol itself.
            if previous.decl == method_id.decl && method_id.decl != protocol {
                continue;
            }
            self.reporter.error(SemanticProblem::DuplicateMethodOrdinal {
                span: ordinal.span(),
                method: self.lookup.member_display(method_id, self.interner),
                previous_method: self.lookup.member_display(previous, self.interner),
                previous_span: libraries.member(previous).span,
                ordinal: ordinal.value(),
            });
        }
    }
}

/// Methods of `protocol` followed by those of everything it composes,
/// transitively. Each protocol is visited once.
fn collect_methods(
    libraries: &Libraries,
    protocol: DeclId,
    visited: &mut FxHashSet<DeclId>,
    methods: &mut Vec<MemberId>,
) {
    if !visited.insert(protocol) {
        return;
    }
    let decl = libraries.decl(protocol);
    let mut composed = Vec::new();
    for (index, member) in decl.members.iter().enumerate() {
        match &member.body {
            MemberBody::Method(_) => methods.push(MemberId::new(protocol, index as u32)),
            MemberBody::Compose(reference) => {
                if let Some(Target::Decl(other)) = reference.target() {
                    if libraries.decl(other).kind == DeclKind::Protocol {
                        composed.push(other);
                    }
                }
            }
            MemberBody::Value(_) | MemberBody::Typed(_) => {}
        }
    }
    for other in composed {
        collect_methods(libraries, other, visited, methods);
    }
}
