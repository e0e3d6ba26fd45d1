//! The resolve step.
//!
//! Runs in two passes over every reference of every user library:
//!
//! 1. **Parse**: split written identifiers into keys, mark bare names in
//!    constraint position contextual, and key synthetic references from
//!    their targets.
//! 2. **Resolve**: look every key up.
//!
//! Contextual references stay contextual; they are resolved during
//! compilation, once the layout that gives them meaning is known.

use idl_ir::StringInterner;

use crate::element::{Libraries, LibraryId};
use crate::lookup::Lookup;
use crate::reference::Reference;
use crate::reporter::Reporter;
use crate::visit::{self, RefSite};


pub struct ResolveStep<'a> {
    lookup: &'a Lookup,
    interner: &'a StringInterner,
    reporter: &'a mut Reporter,
}

impl<'a> ResolveStep<'a> {
    pub fn new(lookup: &'a Lookup, interner: &'a StringInterner, reporter: &'a mut Reporter) -> Self {
        ResolveStep {
            lookup,
            interner,
            reporter,
        }
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self, libraries: &mut Libraries) {
        let user_libraries: Vec<LibraryId> = libraries
            .library_ids()
            .filter(|&id| id != LibraryId::ROOT)
            .collect();

        for &library_id in &user_libraries {
            let library = libraries.library_mut(library_id);
            let mut parse = |reference: &mut Reference, site: RefSite| {
                self.parse_reference(library_id, reference, site);
            };
            visit::library_attributes(library, &mut parse);
            for decl in &mut library.decls {
                visit::decl(decl, &mut parse);
            }
        }

        for &library_id in &user_libraries {
            let library = libraries.library_mut(library_id);
            let mut resolve = |reference: &mut Reference, site: RefSite| {
                self.resolve_reference(reference, site);
            };
            visit::library_attributes(library, &mut resolve);
            for decl in &mut library.decls {
                visit::decl(decl, &mut resolve);
            }
        }
        tracing::debug!(errors = self.reporter.error_count(), "references resolved");
    }

    fn parse_reference(&mut self, current: LibraryId, reference: &mut Reference, site: RefSite) {
        if let Some(target) = reference.synthetic_target() {
            reference.set_key(self.lookup.key_of(target));
            return;
        }
        if !reference.is_raw() {
            return;
        }
        let identifier = reference.identifier();
        if site.allow_contextual && identifier.len() == 1 {
            reference.mark_contextual();
            return;
        }
        match self.lookup.parse_key(current, identifier, self.interner) {
            Ok(key) => reference.set_key(key),
            Err(problem) => {
                self.reporter.error(problem);
                reference.mark_failed();
            }
        }
    }

    fn resolve_reference(&mut self, reference: &mut Reference, site: RefSite) {
        let Some(key) = reference.key() else {
            return;
        };
        let span = reference.source_span().unwrap_or(site.anchor);
        match self.lookup.resolve_key(key, span, self.interner) {
            Ok(target) => reference.resolve_to(target),
            Err(problem) => {
                self.reporter.error(problem);
                reference.mark_failed();
            }
        }
    }
}
