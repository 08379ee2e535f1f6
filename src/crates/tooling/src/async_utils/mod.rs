//! Async helpers: monotonic deadlines and cooperative cancellation.

pub mod cancel;
pub mod deadline;

pub use cancel::CancelToken;
pub use deadline::{Deadline, DeadlineError};
