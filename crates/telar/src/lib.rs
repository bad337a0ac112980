//! Form-state coordination for interactive user interfaces.
//!
//! telar collects distributed input-field components into one session,
//! tracks each field's value and validity, assembles a structured
//! submission payload from dotted field identifiers, and gates submission
//! on overall validity. Rendering, keyboard wiring, and component
//! lifecycles stay on the caller's side of the [`FieldHandle`] contract.
//!
//! The crate is a facade over the three layers:
//!
//! - [`telar_state`]: dotted paths and the nested-value codec
//! - [`telar_contract`]: the field handle and callback contracts
//! - [`telar_session`]: registry, aggregation, and the session controller
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use telar::{SessionController, SubmitOutcome};
//!
//! # async fn demo(field: Arc<dyn telar::FieldHandle>) -> Result<(), telar::SessionError> {
//! let session = SessionController::builder()
//!     .value(json!({"name": ""}))
//!     .build();
//!
//! session.subscribe(field).await;
//! session.set_values(json!({"name": "Al"})).await;
//!
//! if !session.submit_disabled().await {
//!     match session.submit().await? {
//!         SubmitOutcome::Completed { accepted, .. } => println!("accepted: {accepted}"),
//!         SubmitOutcome::Rejected { invalid } => println!("invalid: {invalid:?}"),
//!         SubmitOutcome::Skipped => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub use telar_contract::{
    CheckMode, FieldCapabilities, FieldHandle, NoopHooks, SessionHooks, SubmitError, SubmitHandler,
};
pub use telar_session::{
    aggregate, collect_raw, AggregationResult, SessionController, SessionControllerBuilder,
    SessionError, SessionRegistry, SessionResult, SubmitOutcome, ValidityLedger,
};
pub use telar_state::{flatten, resolve, write, FieldPath};

#[cfg(feature = "test-support")]
pub use telar_contract::testing;
