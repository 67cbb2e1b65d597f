//! The emitted helper library.
//!
//! Every rewritten reference site calls into a small fixed set of helper
//! routines. Helper names and signatures are stable and documented here
//! because downstream tests compare emitted text verbatim; the authoritative
//! behavioral contract is modeled in [`crate::runtime`].
//!
//! Two emission profiles exist:
//!
//! - [`HelperEmitMode::Inline`]: helper bodies are emitted once at the top of
//!   the compilation unit, deduplicated when multiple classes need them.
//! - [`HelperEmitMode::Import`]: one import statement references a shared
//!   runtime package, for pipelines with a common runtime.

use bitflags::bitflags;
use once_cell::sync::Lazy;

/// `_classPrivateFieldGet(receiver, privateMap)` — read through a store.
pub const HELPER_PRIVATE_FIELD_GET: &str = "_classPrivateFieldGet";
/// `_classPrivateFieldSet(receiver, privateMap, value)` — write through a store.
pub const HELPER_PRIVATE_FIELD_SET: &str = "_classPrivateFieldSet";
/// `_classPrivateFieldInit(obj, privateMap, value)` — initialize an entry.
pub const HELPER_PRIVATE_FIELD_INIT: &str = "_classPrivateFieldInit";
/// `_checkPrivateRedeclaration(obj, privateCollection)` — initialize-once guard.
pub const HELPER_CHECK_REDECLARATION: &str = "_checkPrivateRedeclaration";
/// `_classExtractFieldDescriptor(receiver, privateMap, action)` — access check.
pub const HELPER_EXTRACT_DESCRIPTOR: &str = "_classExtractFieldDescriptor";
/// `_classApplyDescriptorGet(receiver, descriptor)` — descriptor read dispatch.
pub const HELPER_APPLY_GET: &str = "_classApplyDescriptorGet";
/// `_classApplyDescriptorSet(receiver, descriptor, value)` — descriptor write dispatch.
pub const HELPER_APPLY_SET: &str = "_classApplyDescriptorSet";

bitflags! {
    /// Which helpers a compilation unit requires.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct HelpersNeeded: u32 {
        const CHECK_REDECLARATION = 1 << 0;
        const EXTRACT_DESCRIPTOR  = 1 << 1;
        const APPLY_GET           = 1 << 2;
        const APPLY_SET           = 1 << 3;
        const PRIVATE_FIELD_GET   = 1 << 4;
        const PRIVATE_FIELD_SET   = 1 << 5;
        const PRIVATE_FIELD_INIT  = 1 << 6;
    }
}

impl HelpersNeeded {
    /// Close the set over helper-to-helper calls: the composite helpers call
    /// the leaf ones, so requesting a composite pulls its dependencies in.
    pub fn with_dependencies(self) -> Self {
        let mut needed = self;
        if needed.contains(HelpersNeeded::PRIVATE_FIELD_GET) {
            needed |= HelpersNeeded::EXTRACT_DESCRIPTOR | HelpersNeeded::APPLY_GET;
        }
        if needed.contains(HelpersNeeded::PRIVATE_FIELD_SET) {
            needed |= HelpersNeeded::EXTRACT_DESCRIPTOR | HelpersNeeded::APPLY_SET;
        }
        if needed.contains(HelpersNeeded::PRIVATE_FIELD_INIT) {
            needed |= HelpersNeeded::CHECK_REDECLARATION;
        }
        needed
    }
}

/// How the helper library reaches the emitted unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelperEmitMode {
    /// Emit helper bodies inline once at the top of the unit.
    Inline,
    /// Emit a single import from a shared runtime package.
    Import { module: String },
}

/// One helper routine: flag, exported name, and source text.
struct HelperSource {
    flag: HelpersNeeded,
    name: &'static str,
    source: &'static str,
}

/// Helper sources in emission order (leaves before the composites that call
/// them, matching the reference output).
static HELPER_SOURCES: Lazy<Vec<HelperSource>> = Lazy::new(|| {
    vec![
        HelperSource {
            flag: HelpersNeeded::CHECK_REDECLARATION,
            name: HELPER_CHECK_REDECLARATION,
            source: r#"function _checkPrivateRedeclaration(obj, privateCollection) {
    if (privateCollection.has(obj)) {
        throw new TypeError("Cannot initialize the same private elements twice on an object");
    }
}
"#,
        },
        HelperSource {
            flag: HelpersNeeded::APPLY_GET,
            name: HELPER_APPLY_GET,
            source: r#"function _classApplyDescriptorGet(receiver, descriptor) {
    if (descriptor.get) {
        return descriptor.get.call(receiver);
    }
    return descriptor.value;
}
"#,
        },
        HelperSource {
            flag: HelpersNeeded::APPLY_SET,
            name: HELPER_APPLY_SET,
            source: r#"function _classApplyDescriptorSet(receiver, descriptor, value) {
    if (descriptor.set) {
        descriptor.set.call(receiver, value);
    } else if (descriptor.get) {
        throw new TypeError("attempted to set read only private field");
    } else {
        descriptor.value = value;
    }
}
"#,
        },
        HelperSource {
            flag: HelpersNeeded::EXTRACT_DESCRIPTOR,
            name: HELPER_EXTRACT_DESCRIPTOR,
            source: r#"function _classExtractFieldDescriptor(receiver, privateMap, action) {
    if (!privateMap.has(receiver)) {
        throw new TypeError("attempted to " + action + " private field on non-instance");
    }
    return privateMap.get(receiver);
}
"#,
        },
        HelperSource {
            flag: HelpersNeeded::PRIVATE_FIELD_GET,
            name: HELPER_PRIVATE_FIELD_GET,
            source: r#"function _classPrivateFieldGet(receiver, privateMap) {
    var descriptor = _classExtractFieldDescriptor(receiver, privateMap, "get");
    return _classApplyDescriptorGet(receiver, descriptor);
}
"#,
        },
        HelperSource {
            flag: HelpersNeeded::PRIVATE_FIELD_SET,
            name: HELPER_PRIVATE_FIELD_SET,
            source: r#"function _classPrivateFieldSet(receiver, privateMap, value) {
    var descriptor = _classExtractFieldDescriptor(receiver, privateMap, "set");
    _classApplyDescriptorSet(receiver, descriptor, value);
    return value;
}
"#,
        },
        HelperSource {
            flag: HelpersNeeded::PRIVATE_FIELD_INIT,
            name: HELPER_PRIVATE_FIELD_INIT,
            source: r#"function _classPrivateFieldInit(obj, privateMap, value) {
    _checkPrivateRedeclaration(obj, privateMap);
    privateMap.set(obj, value);
}
"#,
        },
    ]
});

/// Emit the helper prelude for a unit.
///
/// Returns an empty string when no helpers are needed. In inline mode each
/// helper body appears exactly once regardless of how many classes in the
/// unit use it.
pub fn emit_prelude(needed: HelpersNeeded, mode: &HelperEmitMode) -> String {
    let needed = needed.with_dependencies();
    if needed.is_empty() {
        return String::new();
    }

    match mode {
        HelperEmitMode::Inline => {
            let mut out = String::new();
            for helper in HELPER_SOURCES.iter() {
                if needed.contains(helper.flag) {
                    out.push_str(helper.source);
                }
            }
            out
        }
        HelperEmitMode::Import { module } => {
            let names: Vec<&str> = HELPER_SOURCES
                .iter()
                .filter(|h| needed.contains(h.flag))
                .map(|h| h.name)
                .collect();
            format!("import {{ {} }} from \"{}\";\n", names.join(", "), module)
        }
    }
}
