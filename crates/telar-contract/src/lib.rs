//! Contracts between form sessions and the components around them.
//!
//! `telar-contract` defines the seams of the telar stack and no behavior of
//! its own:
//!
//! - **FieldHandle**: the capability set an input component exposes to a
//!   session — identity, async value access, mutation, and the optional
//!   validate/reset/disable behaviors as defaulted trait methods
//! - **CheckMode**: passive (bookkeeping) vs committing (may surface
//!   visible error state) validity checks
//! - **SubmitHandler** / **SessionHooks**: the outward-facing callbacks a
//!   session invokes with the assembled value, invalid-field lists, and
//!   per-field changes
//!
//! The rendering layer, keyboard wiring, and component lifecycles live
//! entirely behind these traits.

mod field;
mod hooks;

#[cfg(feature = "test-support")]
pub mod testing;

pub use field::{CheckMode, FieldCapabilities, FieldHandle};
pub use hooks::{NoopHooks, SessionHooks, SubmitError, SubmitHandler};
