//! Private Name Registry.
//!
//! Per-class bookkeeping that maps each declared private name to a unique
//! backing-store identifier and declaration kind. One registry exists per
//! class lowering; its lifetime is bounded to that class's transform and it
//! is passed by explicit reference into the rewriter's recursion, never held
//! as ambient state.
//!
//! Backing-store identifiers follow the `_{Class}_{name}` scheme and are
//! uniquified through a unit-scoped [`StoreNameAllocator`], so an identifier
//! is never reused across classes even when class names collide.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use thiserror::Error;

/// Stable handle to a declared private name within one registry.
pub type PrivateNameId = u32;

/// The same private name was declared twice in one class body. This is a
/// static error, fatal to that class's lowering — distinct from the runtime
/// redeclaration check, which guards per-instance initialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate private name '#{name}' in class '{class}'")]
pub struct DuplicateDeclaration {
    pub name: String,
    pub class: String,
}

/// Declaration form as it appears in the member list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Field,
    Method,
    Getter,
    Setter,
}

/// Resolved kind of a private name. The get and set halves of one accessor
/// pair merge into a single `Accessor` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivateKind {
    Field,
    Method,
    Accessor {
        has_getter: bool,
        has_setter: bool,
    },
}

/// A declared private name. Immutable once both accessor halves (where
/// applicable) have been seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateName {
    pub name: String,
    pub kind: PrivateKind,
    /// Emitted backing-store variable name, unique per compilation unit.
    pub store_id: String,
    pub is_static: bool,
}

/// Unit-scoped allocator for emitted identifiers. Keeps backing-store and
/// hoisted-callable names unique across every class in one compilation unit.
#[derive(Debug, Default)]
pub struct StoreNameAllocator {
    used: FxHashSet<String>,
}

impl StoreNameAllocator {
    pub fn new() -> Self {
        StoreNameAllocator::default()
    }

    /// Allocate `base`, or `base_1`, `base_2`, ... on collision.
    pub fn allocate(&mut self, base: &str) -> String {
        if self.used.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 1u32;
        loop {
            let candidate = format!("{base}_{n}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Per-class private name bookkeeping.
#[derive(Debug)]
pub struct PrivateNameRegistry {
    class_name: String,
    names: IndexMap<String, PrivateName>,
}

impl PrivateNameRegistry {
    pub fn new(class_name: impl Into<String>) -> Self {
        PrivateNameRegistry {
            class_name: class_name.into(),
            names: IndexMap::new(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Declare a private name, allocating its backing-store identifier on
    /// first sight.
    ///
    /// Declaring both halves of one accessor pair is one declaration, not
    /// two; everything else seen twice — including the same accessor half,
    /// or halves that disagree on staticness — is a
    /// [`DuplicateDeclaration`].
    pub fn declare(
        &mut self,
        name: &str,
        kind: DeclKind,
        is_static: bool,
        allocator: &mut StoreNameAllocator,
    ) -> Result<PrivateNameId, DuplicateDeclaration> {
        if let Some(index) = self.names.get_index_of(name) {
            let existing = &mut self.names[index];
            let merged = match (existing.kind, kind) {
                (
                    PrivateKind::Accessor {
                        has_getter: false,
                        has_setter,
                    },
                    DeclKind::Getter,
                ) if existing.is_static == is_static => PrivateKind::Accessor {
                    has_getter: true,
                    has_setter,
                },
                (
                    PrivateKind::Accessor {
                        has_getter,
                        has_setter: false,
                    },
                    DeclKind::Setter,
                ) if existing.is_static == is_static => PrivateKind::Accessor {
                    has_getter,
                    has_setter: true,
                },
                _ => {
                    return Err(DuplicateDeclaration {
                        name: name.to_string(),
                        class: self.class_name.clone(),
                    });
                }
            };
            existing.kind = merged;
            return Ok(index as PrivateNameId);
        }

        let kind = match kind {
            DeclKind::Field => PrivateKind::Field,
            DeclKind::Method => PrivateKind::Method,
            DeclKind::Getter => PrivateKind::Accessor {
                has_getter: true,
                has_setter: false,
            },
            DeclKind::Setter => PrivateKind::Accessor {
                has_getter: false,
                has_setter: true,
            },
        };

        let store_id = allocator.allocate(&format!("_{}_{}", self.class_name, name));
        let (index, _) = self.names.insert_full(
            name.to_string(),
            PrivateName {
                name: name.to_string(),
                kind,
                store_id,
                is_static,
            },
        );
        Ok(index as PrivateNameId)
    }

    pub fn lookup(&self, name: &str) -> Option<PrivateNameId> {
        self.names.get_index_of(name).map(|i| i as PrivateNameId)
    }

    /// Resolve a private name to its record.
    pub fn resolve(&self, name: &str) -> Option<&PrivateName> {
        self.names.get(name)
    }

    pub fn get(&self, id: PrivateNameId) -> &PrivateName {
        &self.names[id as usize]
    }

    /// Declared private names in declaration order. The order affects
    /// emitted source (one backing-store declaration per name at the top of
    /// the lowering scope) but not runtime behavior; it must be
    /// deterministic for reproducible output.
    pub fn store_declarations(&self) -> impl Iterator<Item = &PrivateName> {
        self.names.values()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}
