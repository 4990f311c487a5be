//! Shared test fixtures: a small scripted expression language and a pair
//! of denial handlers.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use warden_core::error::{EvalError, ParseError};
use warden_engine::context::EvaluationContext;
use warden_engine::denial::DeniedHandler;
use warden_engine::expr::{CompiledExpression, ExpressionLanguage};
use warden_engine::Invocation;
use warden_core::types::Decision;
use warden_core::error::Result as AuthResult;

/// The expression forms the scripted language understands.
enum Script {
    PermitAll,
    DenyAll,
    HasRole(String),
    /// Same check, but resolves identity through the cooperative path
    /// when evaluated asynchronously.
    HasRoleAsync(String),
    ReturnObjectNotNull,
    ArgEquals { name: String, literal: String },
    TargetFieldEquals { field: String, literal: String },
    ExplainDenial,
    Boom,
}

pub struct ScriptedExpression(Script);

#[async_trait]
impl CompiledExpression for ScriptedExpression {
    fn evaluate(&self, ctx: &EvaluationContext) -> Result<Value, EvalError> {
        match &self.0 {
            Script::PermitAll => Ok(Value::Bool(true)),
            Script::DenyAll => Ok(Value::Bool(false)),
            Script::HasRole(role) | Script::HasRoleAsync(role) => {
                Ok(Value::Bool(ctx.identity().has_role(role)))
            }
            Script::ReturnObjectNotNull => {
                Ok(Value::Bool(ctx.return_value().is_some_and(|v| !v.is_null())))
            }
            Script::ArgEquals { name, literal } => match ctx.named_arg(name) {
                Some(value) => Ok(Value::Bool(value == &json!(literal))),
                None => Err(EvalError::new(format!("no argument named '{name}'"))),
            },
            Script::TargetFieldEquals { field, literal } => match ctx.target() {
                Some(target) => match target.get(field) {
                    Some(value) => Ok(Value::Bool(value == &json!(literal))),
                    None => Err(EvalError::new(format!("target has no field '{field}'"))),
                },
                None => Err(EvalError::new("call has no target")),
            },
            Script::ExplainDenial => Ok(json!({
                "granted": false,
                "reason": "outside business hours",
            })),
            Script::Boom => Err(EvalError::new("target has no such field")),
        }
    }

    async fn evaluate_async(&self, ctx: &EvaluationContext) -> Result<Value, EvalError> {
        match &self.0 {
            Script::HasRoleAsync(role) => {
                // Suspend instead of blocking the carrier thread
                tokio::task::yield_now().await;
                let identity = ctx.identity_async().await;
                Ok(Value::Bool(identity.has_role(role)))
            }
            _ => self.evaluate(ctx),
        }
    }
}

/// A scripted expression language that counts compilations.
pub struct ScriptedLanguage {
    compiles: AtomicUsize,
}

impl ScriptedLanguage {
    pub fn new() -> Self {
        Self {
            compiles: AtomicUsize::new(0),
        }
    }

    pub fn compile_count(&self) -> usize {
        self.compiles.load(Ordering::SeqCst)
    }
}

impl ExpressionLanguage for ScriptedLanguage {
    fn compile(&self, text: &str) -> Result<Box<dyn CompiledExpression>, ParseError> {
        self.compiles.fetch_add(1, Ordering::SeqCst);

        let script = if text == "permitAll" {
            Script::PermitAll
        } else if text == "denyAll" {
            Script::DenyAll
        } else if text == "returnObject != null" {
            Script::ReturnObjectNotNull
        } else if text == "explainDenial" {
            Script::ExplainDenial
        } else if text == "boom" {
            Script::Boom
        } else if let Some(role) = unquote(text, "hasRole('", "')") {
            Script::HasRole(role)
        } else if let Some(role) = unquote(text, "hasRoleAsync('", "')") {
            Script::HasRoleAsync(role)
        } else if let Some(rest) = text.strip_prefix("target.") {
            // target.field == 'literal'
            let (field, literal) = rest
                .split_once(" == '")
                .and_then(|(field, tail)| Some((field, tail.strip_suffix('\'')?)))
                .ok_or_else(|| ParseError::new(format!("unexpected token in '{text}'")))?;
            Script::TargetFieldEquals {
                field: field.to_string(),
                literal: literal.to_string(),
            }
        } else if let Some(rest) = text.strip_prefix('#') {
            // #name == 'literal'
            let (name, literal) = rest
                .split_once(" == '")
                .and_then(|(name, tail)| Some((name, tail.strip_suffix('\'')?)))
                .ok_or_else(|| ParseError::new(format!("unexpected token in '{text}'")))?;
            Script::ArgEquals {
                name: name.to_string(),
                literal: literal.to_string(),
            }
        } else {
            return Err(ParseError::new(format!("unexpected token in '{text}'")));
        };

        Ok(Box::new(ScriptedExpression(script)))
    }
}

fn unquote(text: &str, prefix: &str, suffix: &str) -> Option<String> {
    text.strip_prefix(prefix)?
        .strip_suffix(suffix)
        .map(str::to_string)
}

/// A denial handler that substitutes a redacted value.
pub struct MaskingHandler;

impl DeniedHandler for MaskingHandler {
    fn handle(&self, _invocation: &Invocation, _decision: &Decision) -> AuthResult<Value> {
        Ok(json!("***"))
    }
}

/// A denial handler that inspects the decision and re-signals.
pub struct AuditingRethrowHandler {
    pub invocations: Arc<AtomicUsize>,
}

impl DeniedHandler for AuditingRethrowHandler {
    fn handle(&self, invocation: &Invocation, decision: &Decision) -> AuthResult<Value> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        warden_engine::ThrowingDeniedHandler.handle(invocation, decision)
    }
}
