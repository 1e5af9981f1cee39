//! # Late-Fee Submission Pipeline
//!
//! The orchestrator that turns delinquency data into submitted
//! charges: fetch → reconcile → compute → widen-retry → submit. One
//! invocation, one fresh set of indexes, one structured result — no
//! state survives between runs.
//!
//! ## Contract
//!
//! [`run_pipeline`] always returns a [`result::PipelineResult`]; every
//! failure mode is folded into the result's status, warnings, and
//! error fields. Partial failure of the tenant-data fetches degrades
//! resolution quality (with a warning) instead of failing the run.

pub mod preview;
pub mod result;
pub mod run;
pub mod source;

pub use preview::{run_preview, PreviewReport};
pub use result::{PipelineResult, PipelineStatus};
pub use run::{run_pipeline, PipelineConfig};
pub use source::{ChargeSource, HttpChargeSource};
