//! Quarry Alerts
//!
//! Decides whether a scored record deserves a notification and suppresses
//! repeats of the same alert inside a cooldown.
//!
//! ## Evaluation
//!
//! ```text
//! Idle -> Evaluating -> Suppressed | Emitted
//! ```
//!
//! 1. Classify urgency from the record's scores and an optional external
//!    yes/no judgment
//! 2. Fingerprint the normalized query text with the classification tag
//! 3. Emit unless the same fingerprint was emitted within the cooldown
//!
//! Emitted fingerprints go into a bounded [`RecentAlerts`] window owned by
//! the caller; the evaluator itself is stateless.

#![warn(missing_docs)]

mod config;
mod evaluator;
mod recent;

pub use config::AlertConfig;
pub use evaluator::AlertEvaluator;
pub use recent::RecentAlerts;
