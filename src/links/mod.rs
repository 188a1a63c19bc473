//! Rate-limited verification of external resources.

pub mod checker;
pub mod pacing;

pub use checker::{ExternalCheckOutcome, HttpProbe, LinkChecker, LinkProbe, LinkReport, LinkStatus};
pub use pacing::PacingGate;
