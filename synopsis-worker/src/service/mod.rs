//! Service layer
//!
//! Services contain the business logic of the worker. The summarization
//! service runs one triggering event end to end using the repositories and
//! the scheduler.

mod outcome;
mod summarize;

pub use outcome::RunOutcome;
pub use summarize::{RunReport, SummarizationService};
