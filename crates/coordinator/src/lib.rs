//! Pipeline coordinator for conversation-starter.
//!
//! The coordinator is the manager of the crew:
//! 1. Validates the task graph against the agent roster
//! 2. Runs tasks in dependency order, handing each one its upstream results
//! 3. Drives the bounded critique loop, forwarding rejection feedback
//! 4. Returns the final report with a record of every execution
//!
//! # Architecture
//!
//! ```text
//!            PipelineRequest
//!                  │
//!                  ▼
//!          ┌───────────────┐
//!          │  Coordinator  │  ◄── TaskGraph (validated DAG)
//!          └───────┬───────┘
//!                  │
//!    ┌─────────────┼──────────────┬──────────────┐
//!    ▼             ▼              ▼              ▼
//! [context]  [CritiqueLoop]   [output]      reports/*.md
//!            research ─► filter ─► critique
//! ```

pub mod config;
pub mod critique;
pub mod graph;
pub mod pipeline;
pub mod report;

pub use config::{CredentialReport, LoopConfig, PipelineConfig};
pub use critique::{Critique, CritiqueLoop, CritiqueState, CritiqueStatus, CycleOutcome, CycleSteps};
pub use graph::{CritiqueCycle, TaskGraph};
pub use pipeline::{Coordinator, PipelineOutcome, PipelineRequest, TaskRecord};
pub use report::{EXHAUSTED_NOTE, finalize_report, report_filename, report_slug, save_report};
