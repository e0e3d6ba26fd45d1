//! Name tables built once before resolution.
//!
//! The lookup owns copies of every name it needs, so the resolve and
//! compile passes can consult it while holding the library arena mutably.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use idl_ir::{canonicalize, CompoundIdentifier, Name, Span, StringInterner};

use crate::element::{join_components, DeclId, Libraries, LibraryId, Member, MemberId};
use crate::problem::SemanticProblem;
use crate::reference::{Key, Target};
use crate::reporter::Reporter;


/// One library visible from another, possibly under an alias.
#[derive(Copy, Clone, Debug)]
struct Visible {
    library: LibraryId,
    alias: Option<Name>,
}

#[derive(Debug, Default)]
pub struct Lookup {
    library_names: Vec<SmallVec<[Name; 4]>>,
    /// Per library: itself, its dependencies and the root library.
    visible: Vec<Vec<Visible>>,
    decls: FxHashMap<(LibraryId, Name), DeclId>,
    members: FxHashMap<(DeclId, Name), MemberId>,
    decl_names: FxHashMap<DeclId, Name>,
    member_names: FxHashMap<MemberId, Name>,
}

impl Lookup {
    /// Index every library, reporting declarations and members whose
    /// canonical names collide. Only the first of a colliding group is
    /// registered.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build(libraries: &Libraries, interner: &StringInterner, reporter: &mut Reporter) -> Self {
        let mut lookup = Lookup::default();
        for library_id in libraries.library_ids() {
            let library = libraries.library(library_id);
            lookup.library_names.push(library.name.clone());

            let mut visible = vec![Visible {
                library: library_id,
                alias: None,
            }];
            visible.extend(library.dependencies.iter().map(|dep| Visible {
                library: dep.library,
                alias: dep.alias,
            }));
            if library_id != LibraryId::ROOT {
                visible.push(Visible {
                    library: LibraryId::ROOT,
                    alias: None,
                });
            }
            lookup.visible.push(visible);

            let mut seen: FxHashMap<String, (Name, Option<Span>)> = FxHashMap::default();
            for (index, decl) in library.decls.iter().enumerate() {
                let id = DeclId::new(library_id, index as u32);
                lookup.decl_names.insert(id, decl.name);
                let canonical = canonicalize(interner.lookup(decl.name));
                if let Some(&(previous, previous_span)) = seen.get(&canonical) {
                    reporter.error(SemanticProblem::NameCollision {
                        span: decl.span.unwrap_or(Span::DUMMY),
                        name: interner.lookup(decl.name).to_owned(),
                        previous_name: interner.lookup(previous).to_owned(),
                        previous_span,
                    });
                    continue;
                }
                seen.insert(canonical, (decl.name, decl.span));
                lookup.decls.insert((library_id, decl.name), id);
                lookup.index_members(id, &decl.members, interner, reporter);
            }
        }
        tracing::debug!(decls = lookup.decls.len(), members = lookup.members.len(), "lookup built");
        lookup
    }

    fn index_members(
        &mut self,
        decl: DeclId,
        members: &[Member],
        interner: &StringInterner,
        reporter: &mut Reporter,
    ) {
        let mut seen: FxHashMap<String, (Name, Option<Span>)> = FxHashMap::default();
        for (index, member) in members.iter().enumerate() {
            let id = MemberId::new(decl, index as u32);
            self.member_names.insert(id, member.name);
            let canonical = canonicalize(interner.lookup(member.name));
            if let Some(&(previous, previous_span)) = seen.get(&canonical) {
                reporter.error(SemanticProblem::NameCollision {
                    span: member.span.unwrap_or(Span::DUMMY),
                    name: interner.lookup(member.name).to_owned(),
                    previous_name: interner.lookup(previous).to_owned(),
                    previous_span,
                });
                continue;
            }
            seen.insert(canonical, (member.name, member.span));
            self.members.insert((decl, member.name), id);
        }
    }

    pub fn decl(&self, library: LibraryId, name: Name) -> Option<DeclId> {
        self.decls.get(&(library, name)).copied()
    }

    pub fn member(&self, decl: DeclId, name: Name) -> Option<MemberId> {
        self.members.get(&(decl, name)).copied()
    }

    /// A declaration in `library`, falling back to the root library.
    pub fn decl_or_builtin(&self, library: LibraryId, name: Name) -> Option<DeclId> {
        self.decl(library, name)
            .or_else(|| self.decl(LibraryId::ROOT, name))
    }

    /// The key a reference to `target` would have.
    ///
    /// # Panics
    /// Panics if `target` is not an element of the indexed libraries.
    pub fn key_of(&self, target: Target) -> Key {
        let decl = target.element_or_parent_decl();
        let key = Key::new(decl.library, self.decl_names[&decl]);
        match target.member() {
            Some(member) => key.member(self.member_names[&member]),
            None => key,
        }
    }

    /// Libraries visible from `current` whose name (or alias) is `prefix`.
    fn libraries_matching(&self, current: LibraryId, prefix: &[Name]) -> SmallVec<[LibraryId; 2]> {
        let mut found: SmallVec<[LibraryId; 2]> = SmallVec::new();
        for visible in &self.visible[current.raw() as usize] {
            let by_name = self.library_names[visible.library.raw() as usize].as_slice() == prefix;
            let by_alias = matches!(prefix, [only] if visible.alias == Some(*only));
            if (by_name || by_alias) && !found.contains(&visible.library) {
                found.push(visible.library);
            }
        }
        found
    }

    /// Any library at all, imported or not, named `prefix`.
    fn any_library_named(&self, prefix: &[Name]) -> bool {
        self.library_names.iter().any(|name| name.as_slice() == prefix)
    }

    /// Split a written identifier into a key.
    ///
    /// The longest prefix naming a visible library wins; the rest must be a
    /// declaration name, optionally followed by a member name. With no
    /// library prefix the name is local, or a builtin.
    pub fn parse_key(
        &self,
        current: LibraryId,
        identifier: &CompoundIdentifier,
        interner: &StringInterner,
    ) -> Result<Key, SemanticProblem> {
        let names: SmallVec<[Name; 4]> = identifier.names().collect();
        let n = names.len();

        for split in (n.saturating_sub(2).max(1)..n).rev() {
            let prefix = &names[..split];
            let matches = self.libraries_matching(current, prefix);
            match matches.as_slice() {
                [] => continue,
                [library] => {
                    let key = Key::new(*library, names[split]);
                    return Ok(match names.get(split + 1) {
                        Some(&member) => key.member(member),
                        None => key,
                    });
                }
                candidates => {
                    return Err(SemanticProblem::AmbiguousLibraryPrefix {
                        span: identifier.span,
                        prefix: join_components(prefix, interner),
                        candidates: candidates
                            .iter()
                            .map(|id| self.library_display(*id, interner))
                            .collect(),
                    })
                }
            }
        }

        let local = self.decl(current, names[0]).is_some();
        match names.as_slice() {
            [name] => {
                let library = if local || self.decl(LibraryId::ROOT, *name).is_none() {
                    current
                } else {
                    LibraryId::ROOT
                };
                Ok(Key::new(library, *name))
            }
            [decl, member] if local || !self.any_library_named(&names[..1]) => {
                Ok(Key::new(current, *decl).member(*member))
            }
            _ => {
                let unimported = (1..n).rev().find(|&split| self.any_library_named(&names[..split]));
                Err(match unimported {
                    Some(split) => SemanticProblem::LibraryNotImported {
                        span: identifier.span,
                        library: join_components(&names[..split], interner),
                    },
                    None => SemanticProblem::NameNotFound {
                        span: identifier.span,
                        name: join_components(&names, interner),
                        library: self.library_display(current, interner),
                    },
                })
            }
        }
    }

    /// Look a key up.
    pub fn resolve_key(
        &self,
        key: Key,
        span: Span,
        interner: &StringInterner,
    ) -> Result<Target, SemanticProblem> {
        let Some(decl) = self.decl(key.library, key.decl_name) else {
            return Err(SemanticProblem::NameNotFound {
                span,
                name: interner.lookup(key.decl_name).to_owned(),
                library: self.library_display(key.library, interner),
            });
        };
        let Some(member_name) = key.member_name else {
            return Ok(Target::Decl(decl));
        };
        match self.member(decl, member_name) {
            Some(member) => Ok(Target::Member(member)),
            None => Err(SemanticProblem::MemberNotFound {
                span,
                member: interner.lookup(member_name).to_owned(),
                decl: self.decl_display(decl, interner),
            }),
        }
    }

    /// `fuchsia.io`
    pub fn library_display(&self, library: LibraryId, interner: &StringInterner) -> String {
        join_components(&self.library_names[library.raw() as usize], interner)
    }

    /// `fuchsia.io/Node`
    pub fn decl_display(&self, decl: DeclId, interner: &StringInterner) -> String {
        format!(
            "{}/{}",
            self.library_display(decl.library, interner),
            interner.lookup(self.decl_names[&decl])
        )
    }

    /// `fuchsia.io/Node.Open`
    pub fn member_display(&self, member: MemberId, interner: &StringInterner) -> String {
        format!(
            "{}.{}",
            self.decl_display(member.decl, interner),
            interner.lookup(self.member_names[&member])
        )
    }

    pub fn target_display(&self, target: Target, interner: &StringInterner) -> String {
        match target {
            Target::Decl(decl) => self.decl_display(decl, interner),
            Target::Member(member) => self.member_display(member, interner),
        }
    }
}
