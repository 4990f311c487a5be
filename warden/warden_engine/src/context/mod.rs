//! Per-call evaluation context.
//!
//! The context is the typed view a compiled policy evaluates against: the
//! lazily-supplied caller identity, the call arguments by position and
//! name, the call target, and (for post-call evaluation only) the return
//! value. It is ephemeral, owned by the call frame that creates it, and
//! never shared across calls.

pub mod identity;

pub use identity::{IdentitySource, IdentitySupplier};

use serde_json::Value;
use warden_core::types::MemberId;

/// What the interception layer hands the engine for one call.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// The member being invoked
    pub member: MemberId,

    /// The runtime type the call arrived on; may be a proxy or interface
    /// view of the concrete target
    pub runtime_type: String,

    /// The call target, when one exists
    pub target: Option<Value>,

    /// The call arguments in declaration order
    pub args: Vec<Value>,

    /// Argument names, parallel to `args`
    pub arg_names: Vec<String>,
}

impl Invocation {
    /// Describe a call on the given member and runtime type.
    pub fn new(member: MemberId, runtime_type: impl Into<String>) -> Self {
        Self {
            member,
            runtime_type: runtime_type.into(),
            target: None,
            args: Vec::new(),
            arg_names: Vec::new(),
        }
    }

    /// Attach the call target, builder style.
    pub fn with_target(mut self, target: impl Into<Value>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Attach the argument list, builder style.
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// Attach argument names, builder style.
    pub fn with_arg_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arg_names = names.into_iter().map(Into::into).collect();
        self
    }
}

/// The typed context a compiled policy evaluates against.
pub struct EvaluationContext {
    member: MemberId,
    target: Option<Value>,
    args: Vec<Value>,
    arg_names: Vec<String>,
    identity: IdentitySupplier,
    return_value: Option<Value>,
}

impl EvaluationContext {
    /// Start building a context for the given member.
    pub fn builder(member: MemberId) -> EvaluationContextBuilder {
        EvaluationContextBuilder {
            member,
            target: None,
            args: Vec::new(),
            arg_names: Vec::new(),
            identity: None,
            return_value: None,
        }
    }

    /// The member under evaluation.
    pub fn member(&self) -> &MemberId {
        &self.member
    }

    /// The call target, when one exists.
    pub fn target(&self) -> Option<&Value> {
        self.target.as_ref()
    }

    /// All call arguments in declaration order.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// A call argument by position.
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// A call argument by name.
    pub fn named_arg(&self, name: &str) -> Option<&Value> {
        let index = self.arg_names.iter().position(|n| n == name)?;
        self.args.get(index)
    }

    /// The caller identity, forcing the supplier if necessary.
    pub fn identity(&self) -> &warden_core::types::Identity {
        self.identity.get()
    }

    /// The caller identity, cooperative discipline.
    pub async fn identity_async(&self) -> &warden_core::types::Identity {
        self.identity.get_async().await
    }

    /// The un-forced identity supplier.
    pub fn identity_supplier(&self) -> &IdentitySupplier {
        &self.identity
    }

    /// The call's return value. Present only for post-call evaluation.
    pub fn return_value(&self) -> Option<&Value> {
        self.return_value.as_ref()
    }
}

/// Builder for [`EvaluationContext`].
///
/// The builder never forces the identity supplier; it only stores it.
pub struct EvaluationContextBuilder {
    member: MemberId,
    target: Option<Value>,
    args: Vec<Value>,
    arg_names: Vec<String>,
    identity: Option<IdentitySupplier>,
    return_value: Option<Value>,
}

impl EvaluationContextBuilder {
    /// Set the call target.
    pub fn target(mut self, target: impl Into<Value>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the call arguments.
    pub fn args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// Set the argument names, parallel to the arguments.
    pub fn arg_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arg_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the identity supplier, un-forced.
    pub fn identity(mut self, identity: IdentitySupplier) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Set the return value for post-call evaluation.
    pub fn return_value(mut self, value: impl Into<Value>) -> Self {
        self.return_value = Some(value.into());
        self
    }

    /// Build the context. Calls with no identity supplier evaluate as
    /// anonymous.
    pub fn build(self) -> EvaluationContext {
        EvaluationContext {
            member: self.member,
            target: self.target,
            args: self.args,
            arg_names: self.arg_names,
            identity: self.identity.unwrap_or_else(IdentitySupplier::anonymous),
            return_value: self.return_value,
        }
    }
}

impl EvaluationContext {
    /// Build a context for an intercepted invocation.
    ///
    /// The return value is attached only at the post-call checkpoint.
    pub fn for_invocation(
        invocation: &Invocation,
        identity: IdentitySupplier,
        return_value: Option<Value>,
    ) -> Self {
        let mut builder = Self::builder(invocation.member.clone())
            .args(invocation.args.clone())
            .arg_names(invocation.arg_names.clone())
            .identity(identity);
        if let Some(target) = &invocation.target {
            builder = builder.target(target.clone());
        }
        if let Some(value) = return_value {
            builder = builder.return_value(value);
        }
        builder.build()
    }
}
