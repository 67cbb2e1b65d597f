//! Descriptor Emulation Runtime model.
//!
//! The emitted JavaScript routes every private-member read, write, and call
//! through a small fixed helper library (see [`crate::transforms::helpers`]).
//! This module is the Rust model of that library's contract: the behavior
//! here is authoritative for what every emitted call site relies on, and the
//! tests against it are the tests of the emitted program's runtime semantics.
//!
//! One [`BackingStore`] exists per private name. Entries are keyed by
//! receiver identity. The emitted code uses a `WeakMap`, which never keeps
//! receivers alive; this model uses integer receiver handles stamped at
//! construction (an arena of receivers), trading automatic reclamation for
//! explicit lifecycle management. Nothing here ever removes an entry — in the
//! emitted program only receiver garbage collection does.
//!
//! The routines are pure with respect to everything except the one store
//! passed in, which is what makes stores safe to reuse across classes without
//! cross-contamination.

use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Receiver identity: an integer handle stamped onto each receiver at
/// construction time.
pub type ReceiverId = u32;

/// A getter callable, bound to no particular receiver. The receiver is
/// supplied at call time.
pub type Getter<V> = Rc<dyn Fn(ReceiverId) -> V>;

/// A setter callable, receiver supplied at call time.
pub type Setter<V> = Rc<dyn Fn(ReceiverId, V)>;

/// The operation attempted when an access check fails, carried in
/// [`PrivateRuntimeError::InvalidAccess`] for diagnostic clarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessAction {
    Get,
    /// Reported for every write that routes through the composite set
    /// helper; the emitted `_classPrivateFieldSet` extracts with `"set"`
    /// for plain fields and accessors alike, so `Set` subsumes `Write`
    /// there.
    Set,
    /// Reserved for direct update helpers an embedder may add. Nothing this
    /// pass emits produces it: compound writes expand into the get-then-set
    /// sequence, which reports `Get` or `Set`.
    Write,
    Call,
}

impl AccessAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessAction::Get => "get",
            AccessAction::Set => "set",
            AccessAction::Write => "write",
            AccessAction::Call => "call",
        }
    }
}

impl fmt::Display for AccessAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime errors of the emitted program. The transform performs no recovery
/// for these; they are specified behaviors mirroring the native
/// private-member feature, and they propagate to the embedding program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrivateRuntimeError {
    /// The same receiver was initialized twice for the same private name.
    #[error("Cannot initialize the same private elements twice on an object")]
    Redeclaration,

    /// A private name was accessed on a receiver never initialized for it.
    #[error("attempted to {action} private field on non-instance")]
    InvalidAccess { action: AccessAction },

    /// A write went through a read-only accessor-only descriptor.
    #[error("attempted to set read only private field")]
    MissingSetter,
}

/// The per-receiver record emulating native property semantics: either a raw
/// value, or an accessor pair. The tagged representation makes the get/set
/// dispatch exhaustive.
pub enum Descriptor<V> {
    /// A plain stored value (fields, and the shared callable of a private
    /// method).
    Value(V),
    /// An accessor pair; either half may be absent.
    Accessor {
        get: Option<Getter<V>>,
        set: Option<Setter<V>>,
    },
}

impl<V> Descriptor<V> {
    /// Descriptor for an accessor with only a getter.
    pub fn getter(get: Getter<V>) -> Self {
        Descriptor::Accessor {
            get: Some(get),
            set: None,
        }
    }
}

impl<V: Clone> Clone for Descriptor<V> {
    fn clone(&self) -> Self {
        match self {
            Descriptor::Value(v) => Descriptor::Value(v.clone()),
            Descriptor::Accessor { get, set } => Descriptor::Accessor {
                get: get.clone(),
                set: set.clone(),
            },
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Descriptor<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Descriptor::Accessor { get, set } => f
                .debug_struct("Accessor")
                .field("get", &get.is_some())
                .field("set", &set.is_some())
                .finish(),
        }
    }
}

/// Apply a descriptor read: invoke the getter bound to `receiver`, or return
/// the raw value. A setter-only accessor has no raw value and reads as
/// absent (`undefined` in the emitted program), not as an access error.
/// Mirrors the emitted `_classApplyDescriptorGet`.
pub fn apply_get<V: Clone>(receiver: ReceiverId, descriptor: &Descriptor<V>) -> Option<V> {
    match descriptor {
        Descriptor::Value(v) => Some(v.clone()),
        Descriptor::Accessor { get: Some(get), .. } => Some(get(receiver)),
        Descriptor::Accessor { get: None, .. } => None,
    }
}

/// Apply a descriptor write: invoke the setter bound to `receiver`, assign
/// the raw value for plain fields, or fail for an accessor with no setter.
/// Mirrors the emitted `_classApplyDescriptorSet`.
pub fn apply_set<V>(
    receiver: ReceiverId,
    descriptor: &mut Descriptor<V>,
    value: V,
) -> Result<(), PrivateRuntimeError> {
    match descriptor {
        Descriptor::Value(slot) => {
            *slot = value;
            Ok(())
        }
        Descriptor::Accessor { set: Some(set), .. } => {
            set(receiver, value);
            Ok(())
        }
        Descriptor::Accessor { set: None, .. } => Err(PrivateRuntimeError::MissingSetter),
    }
}

/// The weak-keyed associative container for one private name: receiver
/// identity to stored descriptor. Exactly one store exists per
/// [`crate::transforms::private_registry::PrivateName`].
pub struct BackingStore<V> {
    entries: FxHashMap<ReceiverId, Descriptor<V>>,
}

impl<V> Default for BackingStore<V> {
    fn default() -> Self {
        BackingStore {
            entries: FxHashMap::default(),
        }
    }
}

impl<V> BackingStore<V> {
    pub fn new() -> Self {
        BackingStore::default()
    }

    /// Fails if the store already has an entry for `receiver`; otherwise a
    /// no-op. Mirrors the emitted `_checkPrivateRedeclaration`.
    pub fn check_redeclaration(&self, receiver: ReceiverId) -> Result<(), PrivateRuntimeError> {
        if self.entries.contains_key(&receiver) {
            Err(PrivateRuntimeError::Redeclaration)
        } else {
            Ok(())
        }
    }

    /// Initialize the entry for `receiver`: redeclaration check, then
    /// insert. Mirrors the emitted `_classPrivateFieldInit`.
    pub fn init(
        &mut self,
        receiver: ReceiverId,
        descriptor: Descriptor<V>,
    ) -> Result<(), PrivateRuntimeError> {
        self.check_redeclaration(receiver)?;
        self.entries.insert(receiver, descriptor);
        Ok(())
    }

    /// Fetch the descriptor for `receiver`, failing with the attempted
    /// `action` for diagnostics if no entry exists. Mirrors the emitted
    /// `_classExtractFieldDescriptor`.
    pub fn extract(
        &self,
        receiver: ReceiverId,
        action: AccessAction,
    ) -> Result<&Descriptor<V>, PrivateRuntimeError> {
        self.entries
            .get(&receiver)
            .ok_or(PrivateRuntimeError::InvalidAccess { action })
    }

    fn extract_mut(
        &mut self,
        receiver: ReceiverId,
        action: AccessAction,
    ) -> Result<&mut Descriptor<V>, PrivateRuntimeError> {
        self.entries
            .get_mut(&receiver)
            .ok_or(PrivateRuntimeError::InvalidAccess { action })
    }

    pub fn has(&self, receiver: ReceiverId) -> bool {
        self.entries.contains_key(&receiver)
    }
}

impl<V: Clone> BackingStore<V> {
    /// Read through the store: extract then apply. `Ok(None)` is a
    /// successful read of an absent value (a setter-only accessor); only a
    /// failed access check is an error. Mirrors the emitted
    /// `_classPrivateFieldGet`.
    pub fn get(&self, receiver: ReceiverId) -> Result<Option<V>, PrivateRuntimeError> {
        let descriptor = self.extract(receiver, AccessAction::Get)?;
        Ok(apply_get(receiver, descriptor))
    }

    /// Read for an invocation site; the access check reports `call` as the
    /// attempted operation.
    pub fn get_for_call(&self, receiver: ReceiverId) -> Result<Option<V>, PrivateRuntimeError> {
        let descriptor = self.extract(receiver, AccessAction::Call)?;
        Ok(apply_get(receiver, descriptor))
    }
}

impl<V> BackingStore<V> {
    /// Write through the store: extract then apply. Mirrors the emitted
    /// `_classPrivateFieldSet`.
    pub fn set(&mut self, receiver: ReceiverId, value: V) -> Result<(), PrivateRuntimeError> {
        let descriptor = self.extract_mut(receiver, AccessAction::Set)?;
        apply_set(receiver, descriptor, value)
    }
}
