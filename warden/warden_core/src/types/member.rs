//! Callable-member identity.
//!
//! A member is identified by the pair of its declaring type and its method
//! signature. This pair is the sole cache key for compiled policies:
//! identical signatures on an override chain resolve to the same policy as
//! the most specific declaring type that carries one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The identity of a callable member: declaring type plus method signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId {
    /// Fully qualified name of the type that declares the member
    pub declaring_type: String,

    /// Method signature, including parameter names
    pub signature: String,
}

impl MemberId {
    /// Create a new member identity.
    pub fn new(declaring_type: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            signature: signature.into(),
        }
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring_type, self.signature)
    }
}
