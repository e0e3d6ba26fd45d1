//! References to declarations and members.
//!
//! A reference moves through a fixed set of states:
//!
//! ```text
//! RawSourced ──┬─> Key ──┬─> Resolved
//! RawSynthetic ┘         └─> Failed
//! RawSourced ───> Contextual ─┬─> Resolved
//!                             └─> Failed
//! RawSourced ───> Failed
//! ```
//!
//! Each state is its own type, and the transition functions on those types
//! are the only way to build the next state. [`Reference`] wraps whichever
//! state is current; asking it for a transition the current state does not
//! have is a compiler bug and panics.

use std::fmt;
use std::mem;

use idl_ir::{CompoundIdentifier, Identifier, Name, Span};

use crate::element::{DeclId, Element, LibraryId, MemberId};


/// What a resolved reference points at.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Target {
    Decl(DeclId),
    /// A member; its owning declaration is `MemberId::decl`.
    Member(MemberId),
}

impl Target {
    pub fn element(self) -> Element {
        match self {
            Target::Decl(decl) => Element::Decl(decl),
            Target::Member(member) => Element::Member(member),
        }
    }

    /// The target itself if it is a declaration, else its owner.
    pub fn element_or_parent_decl(self) -> DeclId {
        match self {
            Target::Decl(decl) => decl,
            Target::Member(member) => member.decl,
        }
    }

    pub fn member(self) -> Option<MemberId> {
        match self {
            Target::Decl(_) => None,
            Target::Member(member) => Some(member),
        }
    }
}

/// Library plus declaration name, and optionally a member name.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Key {
    pub library: LibraryId,
    pub decl_name: Name,
    pub member_name: Option<Name>,
}

impl Key {
    pub const fn new(library: LibraryId, decl_name: Name) -> Self {
        Key {
            library,
            decl_name,
            member_name: None,
        }
    }

    /// Same declaration, narrowed to one of its members.
    #[must_use]
    pub const fn member(self, member_name: Name) -> Self {
        Key {
            member_name: Some(member_name),
            ..self
        }
    }

    /// The key of the declaration alone.
    #[must_use]
    pub const fn decl_key(self) -> Self {
        Key {
            member_name: None,
            ..self
        }
    }
}

/// Written in source, not yet looked at.
#[derive(Debug)]
pub struct RawSourced(());

/// Made by the compiler, already pointing at its target.
#[derive(Debug)]
pub struct RawSynthetic(Target);

/// Split into library and names, not yet looked up.
#[derive(Debug)]
pub struct Keyed(Key);

/// A single name whose meaning depends on where it is used.
#[derive(Debug)]
pub struct Contextual(Identifier);

/// Looked up successfully.
#[derive(Debug)]
pub struct Resolved(Target);

/// Looked up and failed; the failure has been reported.
#[derive(Debug)]
pub struct Failed(());

impl RawSourced {
    pub fn set_key(self, key: Key) -> Keyed {
        Keyed(key)
    }

    pub fn mark_contextual(self, name: Identifier) -> Contextual {
        Contextual(name)
    }

    pub fn mark_failed(self) -> Failed {
        Failed(())
    }
}

impl RawSynthetic {
    pub fn set_key(self, key: Key) -> Keyed {
        Keyed(key)
    }
}

impl Keyed {
    pub fn resolve_to(self, target: Target) -> Resolved {
        Resolved(target)
    }

    pub fn mark_failed(self) -> Failed {
        Failed(())
    }
}

impl Contextual {
    pub fn resolve_to(self, target: Target) -> Resolved {
        Resolved(target)
    }

    pub fn mark_failed(self) -> Failed {
        Failed(())
    }
}

/// Current state of a [`Reference`].
#[derive(Debug)]
pub enum RefState {
    RawSourced(RawSourced),
    RawSynthetic(RawSynthetic),
    Key(Keyed),
    Contextual(Contextual),
    Resolved(Resolved),
    Failed(Failed),
}

impl RefState {
    fn name(&self) -> &'static str {
        match self {
            RefState::RawSourced(_) => "RawSourced",
            RefState::RawSynthetic(_) => "RawSynthetic",
            RefState::Key(_) => "Key",
            RefState::Contextual(_) => "Contextual",
            RefState::Resolved(_) => "Resolved",
            RefState::Failed(_) => "Failed",
        }
    }
}

/// Where a reference came from. Never changes.
#[derive(Clone, Debug)]
enum Origin {
    Sourced(CompoundIdentifier),
    Synthetic(Target),
}

/// A reference to a declaration or member, plus its resolution state.
pub struct Reference {
    origin: Origin,
    state: RefState,
}

impl Reference {
    /// A reference written in source.
    pub fn sourced(identifier: CompoundIdentifier) -> Self {
        Reference {
            origin: Origin::Sourced(identifier),
            state: RefState::RawSourced(RawSourced(())),
        }
    }

    /// A reference made by the compiler, e.g. the implicit `uint32` subtype
    /// of an enum.
    pub fn synthetic(target: Target) -> Self {
        Reference {
            origin: Origin::Synthetic(target),
            state: RefState::RawSynthetic(RawSynthetic(target)),
        }
    }

    pub fn state(&self) -> &RefState {
        &self.state
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self.origin, Origin::Synthetic(_))
    }

    /// The identifier as written.
    ///
    /// # Panics
    /// Panics on a synthetic reference, which has no source text.
    pub fn identifier(&self) -> &CompoundIdentifier {
        match &self.origin {
            Origin::Sourced(identifier) => identifier,
            Origin::Synthetic(_) => panic!("synthetic reference has no identifier"),
        }
    }

    /// Source location of the reference.
    ///
    /// # Panics
    /// Panics on a synthetic reference; diagnostics about those anchor to the
    /// enclosing construct instead.
    pub fn span(&self) -> Span {
        self.identifier().span
    }

    /// The span if the reference was written in source.
    pub fn source_span(&self) -> Option<Span> {
        match &self.origin {
            Origin::Sourced(identifier) => Some(identifier.span),
            Origin::Synthetic(_) => None,
        }
    }

    /// The target a synthetic reference was made for.
    pub fn synthetic_target(&self) -> Option<Target> {
        match (&self.origin, &self.state) {
            (Origin::Synthetic(_), RefState::RawSynthetic(RawSynthetic(target))) => Some(*target),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<Key> {
        match &self.state {
            RefState::Key(Keyed(key)) => Some(*key),
            _ => None,
        }
    }

    /// The single name of a contextual reference.
    pub fn contextual_name(&self) -> Option<Identifier> {
        match &self.state {
            RefState::Contextual(Contextual(name)) => Some(*name),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<Target> {
        match &self.state {
            RefState::Resolved(Resolved(target)) => Some(*target),
            _ => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self.state, RefState::RawSourced(_) | RefState::RawSynthetic(_))
    }

    pub fn is_contextual(&self) -> bool {
        matches!(self.state, RefState::Contextual(_))
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, RefState::Resolved(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, RefState::Failed(_))
    }

    fn take_state(&mut self) -> RefState {
        mem::replace(&mut self.state, RefState::Failed(Failed(())))
    }

    /// `RawSourced | RawSynthetic -> Key`
    ///
    /// # Panics
    /// Panics from any other state.
    pub fn set_key(&mut self, key: Key) {
        self.state = match self.take_state() {
            RefState::RawSourced(raw) => RefState::Key(raw.set_key(key)),
            RefState::RawSynthetic(raw) => RefState::Key(raw.set_key(key)),
            other => illegal_transition("set_key", &other),
        };
    }

    /// `RawSourced -> Contextual`
    ///
    /// # Panics
    /// Panics from any other state, or if the identifier has more than one
    /// component.
    pub fn mark_contextual(&mut self) {
        let identifier = self.identifier();
        assert!(
            identifier.len() == 1,
            "only single-component references can be contextual"
        );
        let name = identifier.components[0];
        self.state = match self.take_state() {
            RefState::RawSourced(raw) => RefState::Contextual(raw.mark_contextual(name)),
            other => illegal_transition("mark_contextual", &other),
        };
    }

    /// `Key | Contextual -> Resolved`
    ///
    /// # Panics
    /// Panics from any other state.
    pub fn resolve_to(&mut self, target: Target) {
        self.state = match self.take_state() {
            RefState::Key(keyed) => RefState::Resolved(keyed.resolve_to(target)),
            RefState::Contextual(contextual) => RefState::Resolved(contextual.resolve_to(target)),
            other => illegal_transition("resolve_to", &other),
        };
    }

    /// `RawSourced | Key | Contextual -> Failed`
    ///
    /// # Panics
    /// Panics from any other state.
    pub fn mark_failed(&mut self) {
        self.state = match self.take_state() {
            RefState::RawSourced(raw) => RefState::Failed(raw.mark_failed()),
            RefState::Key(keyed) => RefState::Failed(keyed.mark_failed()),
            RefState::Contextual(contextual) => RefState::Failed(contextual.mark_failed()),
            other => illegal_transition("mark_failed", &other),
        };
    }
}

fn illegal_transition(transition: &str, from: &RefState) -> ! {
    panic!(
        "illegal reference transition `{transition}` from state {}",
        from.name()
    )
}

/// Cloning yields a fresh, unresolved reference with the same origin.
impl Clone for Reference {
    fn clone(&self) -> Self {
        match &self.origin {
            Origin::Sourced(identifier) => Reference::sourced(identifier.clone()),
            Origin::Synthetic(target) => Reference::synthetic(*target),
        }
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            Origin::Sourced(identifier) => write!(f, "Reference({:?}, ", identifier.span)?,
            Origin::Synthetic(target) => write!(f, "Reference(synthetic {target:?}, ")?,
        }
        match &self.state {
            RefState::Key(Keyed(key)) => write!(f, "{key:?})"),
            RefState::Resolved(Resolved(target)) => write!(f, "{target:?})"),
            other => write!(f, "{})", other.name()),
        }
    }
}
