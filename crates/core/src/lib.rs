//! Shared building blocks for the scanning pipeline.
//!
//! This crate contains **pure** primitives (no IO): identifiers, the clock
//! abstraction, the session phase and the domain error model.

pub mod clock;
pub mod error;
pub mod id;
pub mod state;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{DomainError, DomainResult};
pub use id::LineId;
pub use state::SessionState;
