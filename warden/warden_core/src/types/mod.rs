//! Data types shared across the Warden system.

pub mod decision;
pub mod identity;
pub mod member;

pub use decision::{Checkpoint, Decision, DecisionFact};
pub use identity::Identity;
pub use member::MemberId;
