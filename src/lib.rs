//! Downlevel transform for class private members.
//!
//! Rewrites class declarations that use native private-member syntax
//! (`#x` fields, private methods, private accessor pairs) into code that is
//! valid on runtimes without that feature, while preserving exact runtime
//! semantics: access control, initialize-once guarantees, and correct `this`
//! binding at every call site.
//!
//! # Architecture
//!
//! The pass follows a two-phase approach:
//!
//! 1. **Transform phase**: [`PrivateMemberLowering`] walks an already-parsed
//!    tree ([`ast`]) and produces a rewritten tree with no private-name syntax
//!    remaining. Private members become entries in weak-keyed backing stores,
//!    and every reference site becomes a call into a small fixed helper
//!    library.
//!
//! 2. **Print phase**: [`printer`] walks the rewritten tree and emits
//!    JavaScript text. Helper names and formatting are stable because
//!    downstream tests compare emitted text verbatim.
//!
//! Parsing, type checking, and sibling downlevel transforms (arrow binding,
//! destructuring, generators) are external collaborators; this crate consumes
//! an already-built class declaration and hands back a rewritten tree.
//!
//! # Example
//!
//! ```ignore
//! use esdown::{PrivateMemberLowering, HelperEmitMode, printer};
//!
//! let lowering = PrivateMemberLowering::new(HelperEmitMode::Inline);
//! let output = lowering.transform_module(module);
//! let js = printer::print_module(&output.module);
//! ```
//!
//! The [`runtime`] module is a Rust model of the helper contract the emitted
//! code relies on; its behavior is authoritative for what the emitted helpers
//! must do, and the runtime error taxonomy
//! ([`runtime::PrivateRuntimeError`]) mirrors the errors the emitted program
//! raises.

pub mod ast;
pub mod diagnostics;
pub mod printer;
pub mod runtime;
pub mod span;
pub mod tracing_config;
pub mod transforms;

pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticSeverity};
pub use transforms::helpers::{HelperEmitMode, HelpersNeeded};
pub use transforms::private_members::{PrivateMemberLowering, TransformOutput};
pub use transforms::private_registry::{
    DuplicateDeclaration, PrivateKind, PrivateName, PrivateNameRegistry,
};
