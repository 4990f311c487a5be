//! Authorization decisions.
//!
//! A `Decision` is the classified outcome of evaluating a member's policy
//! at a checkpoint: granted, denied, or not-applicable when no policy
//! governs the member. Evaluation faults are not decisions; they surface
//! as errors so that bugs are never mistaken for denials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::types::MemberId;

/// The point in a call's lifecycle where a policy is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Checkpoint {
    /// Before the call executes
    Before,

    /// After the call executes, with the return value visible
    After,
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => write!(f, "pre-call"),
            Self::After => write!(f, "post-call"),
        }
    }
}

/// The outcome of evaluating a compiled policy.
///
/// The justification is whatever value the expression produced: a plain
/// boolean for boolean expressions, or a richer decision object when the
/// expression language yields one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decision {
    /// The policy grants access
    Granted {
        /// The granting expression value
        justification: Value,
    },

    /// The policy denies access
    Denied {
        /// The denying expression value
        justification: Value,
    },

    /// No policy governs this member at this checkpoint; callers must
    /// treat this as "no restriction"
    NotApplicable,
}

impl Decision {
    /// A granted decision with the given justification.
    pub fn granted(justification: impl Into<Value>) -> Self {
        Self::Granted {
            justification: justification.into(),
        }
    }

    /// A denied decision with the given justification.
    pub fn denied(justification: impl Into<Value>) -> Self {
        Self::Denied {
            justification: justification.into(),
        }
    }

    /// Whether access was granted.
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    /// Whether access was denied.
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied { .. })
    }

    /// Whether a policy applied at all.
    pub fn is_applicable(&self) -> bool {
        !matches!(self, Self::NotApplicable)
    }

    /// The expression value behind this decision, when one exists.
    pub fn justification(&self) -> Option<&Value> {
        match self {
            Self::Granted { justification } | Self::Denied { justification } => {
                Some(justification)
            }
            Self::NotApplicable => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted { .. } => write!(f, "granted"),
            Self::Denied { .. } => write!(f, "denied"),
            Self::NotApplicable => write!(f, "not applicable"),
        }
    }
}

/// A structured record of a resolved decision, handed to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionFact {
    /// The member the decision was made for
    pub member: MemberId,

    /// The checkpoint the policy was evaluated at
    pub checkpoint: Checkpoint,

    /// Whether access was granted
    pub granted: bool,

    /// The expression value behind the decision
    pub justification: Value,

    /// When the decision was made
    pub timestamp: DateTime<Utc>,
}

impl DecisionFact {
    /// Capture a fact from a resolved decision.
    ///
    /// Returns `None` for `NotApplicable`: observers are only told about
    /// members that a policy actually governs.
    pub fn capture(member: &MemberId, checkpoint: Checkpoint, decision: &Decision) -> Option<Self> {
        let justification = decision.justification()?.clone();
        Some(Self {
            member: member.clone(),
            checkpoint,
            granted: decision.is_granted(),
            justification,
            timestamp: Utc::now(),
        })
    }
}
