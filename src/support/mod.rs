//! Support window engine
//!
//! - [`track`]: eligibility tracks (mainline vs. build variant)
//! - [`window`]: the support decision for one library and one track

pub mod track;
pub mod window;

pub use track::Track;
pub use window::{SupportDecision, SupportMark, SupportPolicy, apply_decision, mark_supported};
