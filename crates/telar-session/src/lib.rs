//! Form-state coordination: registry, aggregation, and submit lifecycle.
//!
//! `telar-session` is the core of the telar stack. Distributed input
//! fields subscribe to a [`SessionController`]; the controller tracks each
//! field's last-known validity in a ledger, propagates bulk values into
//! fields with change detection, aggregates per-field values into one
//! structured submission payload, and gates submission on overall
//! validity.
//!
//! # Core concepts
//!
//! - **SessionRegistry**: insertion-ordered map of field path to handle
//! - **ValidityLedger**: last-known validity per field; authoritative for
//!   submit gating
//! - **aggregate / collect_raw**: the validated and raw assembly walks
//! - **SessionController**: the lifecycle orchestrator the caller owns
//!
//! # Concurrency
//!
//! One async mutex confines all mutation; per-field awaits run
//! sequentially against snapshots, never fanned out, and post-await ledger
//! writes are guarded by registry membership. The controller handle clones
//! cheaply, but a single session is still one logical actor: two
//! overlapping `submit` calls serialize at the mutex, not in parallel.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use telar_session::{SessionController, SubmitOutcome};
//!
//! # async fn demo(
//! #     name_field: Arc<dyn telar_contract::FieldHandle>,
//! #     handler: Arc<dyn telar_contract::SubmitHandler>,
//! # ) -> Result<(), telar_session::SessionError> {
//! let session = SessionController::builder()
//!     .value(json!({}))
//!     .submit_handler(handler)
//!     .build();
//!
//! session.subscribe(name_field).await;
//! session.set_values(json!({"name": "Al"})).await;
//!
//! match session.submit().await? {
//!     SubmitOutcome::Completed { accepted, .. } => println!("submitted: {accepted}"),
//!     SubmitOutcome::Rejected { invalid } => println!("invalid: {invalid:?}"),
//!     SubmitOutcome::Skipped => {}
//! }
//! # Ok(())
//! # }
//! ```

mod aggregate;
mod controller;
mod error;
mod registry;

pub use aggregate::{aggregate, collect_raw, AggregationResult};
pub use controller::{SessionController, SessionControllerBuilder, SubmitOutcome};
pub use error::{SessionError, SessionResult};
pub use registry::{SessionRegistry, ValidityLedger};
