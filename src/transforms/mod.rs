//! Private member downlevel transform.
//!
//! The transform follows a two-phase approach:
//!
//! 1. **Transform Phase**: [`private_members::PrivateMemberLowering`] walks
//!    the input tree and produces a rewritten tree with no private-name
//!    syntax remaining: backing-store declarations, constructor-time
//!    initialization, and helper calls at every reference site.
//!
//! 2. **Print Phase**: [`crate::printer`] walks the rewritten tree and emits
//!    JavaScript text.
//!
//! Submodules, leaves first:
//!
//! - [`helpers`] — the fixed emitted helper library and its two emission
//!   profiles (inline prelude or shared import)
//! - [`private_registry`] — per-class private name bookkeeping
//! - [`private_rewriter`] — expression-level rewriting of every
//!   private-name reference, preserving evaluation order and receiver
//!   identity
//! - [`private_members`] — the class lowering engine and unit-level driver

pub mod helpers;
pub mod private_members;
pub mod private_registry;
pub mod private_rewriter;

pub use private_members::PrivateMemberLowering;

#[cfg(test)]
mod helpers_tests;

#[cfg(test)]
mod private_members_tests;
