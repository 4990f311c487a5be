//! Dual execution discipline: the blocking and cooperative paths share
//! all locator and cache state and produce identical decisions.

mod common;

use serde_json::{json, Value};
use std::sync::Arc;

use common::ScriptedLanguage;
use warden_core::types::{Decision, Identity, MemberId};
use warden_engine::{
    CompiledPolicyCache, DecisionEngine, HandlerRegistry, HierarchyIndex, IdentitySupplier,
    Invocation, PolicyDeclaration, PolicyLocator, TypeMeta,
};

fn member(signature: &str) -> MemberId {
    MemberId::new("acme.Billing", signature)
}

fn engine_with(
    register: impl FnOnce(&HierarchyIndex),
) -> (Arc<DecisionEngine>, Arc<ScriptedLanguage>) {
    let index = HierarchyIndex::new();
    register(&index);
    let language = Arc::new(ScriptedLanguage::new());
    let engine = DecisionEngine::new(Arc::new(CompiledPolicyCache::new(
        PolicyLocator::new(Arc::new(index)),
        language.clone(),
        Arc::new(HandlerRegistry::new()),
    )));
    (Arc::new(engine), language)
}

#[tokio::test]
async fn both_disciplines_produce_identical_decisions() {
    let (engine, language) = engine_with(|index| {
        index.register(
            TypeMeta::new("acme.Billing")
                .before_policy("invoice(id)", PolicyDeclaration::new("hasRole('ADMIN')"))
                .after_policy("invoice(id)", PolicyDeclaration::new("returnObject != null")),
        );
    });
    let call = Invocation::new(member("invoice(id)"), "acme.Billing");

    for identity in [Identity::new("alice", ["ADMIN"]), Identity::new("bob", ["USER"])] {
        let blocking = engine
            .check_before(&call, IdentitySupplier::of(identity.clone()))
            .unwrap();
        let cooperative = engine
            .check_before_async(&call, IdentitySupplier::of(identity))
            .await
            .unwrap();
        assert_eq!(blocking, cooperative);
    }

    for return_value in [Value::Null, json!({ "total": 12 })] {
        let blocking = engine
            .check_after(
                &call,
                IdentitySupplier::anonymous(),
                return_value.clone(),
            )
            .unwrap();
        let cooperative = engine
            .check_after_async(&call, IdentitySupplier::anonymous(), return_value)
            .await
            .unwrap();
        assert_eq!(blocking, cooperative);
    }

    // Both paths resolved through the same cache entries
    assert_eq!(language.compile_count(), 2);
}

#[tokio::test]
async fn suspending_expression_matches_the_blocking_path() {
    let (engine, _) = engine_with(|index| {
        index.register(
            TypeMeta::new("acme.Billing").before_policy(
                "invoice(id)",
                PolicyDeclaration::new("hasRoleAsync('ADMIN')"),
            ),
        );
    });
    let call = Invocation::new(member("invoice(id)"), "acme.Billing");

    let blocking = engine
        .check_before(&call, IdentitySupplier::of(Identity::new("alice", ["ADMIN"])))
        .unwrap();
    let cooperative = engine
        .check_before_async(&call, IdentitySupplier::of(Identity::new("alice", ["ADMIN"])))
        .await
        .unwrap();

    assert_eq!(blocking, Decision::granted(true));
    assert_eq!(blocking, cooperative);
}

#[tokio::test]
async fn concurrent_cooperative_first_use_compiles_once() {
    let (engine, language) = engine_with(|index| {
        index.register(
            TypeMeta::new("acme.Billing")
                .before_policy("invoice(id)", PolicyDeclaration::new("permitAll")),
        );
    });

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let engine = engine.clone();
        tasks.push(tokio::spawn(async move {
            let call = Invocation::new(member("invoice(id)"), "acme.Billing");
            engine
                .check_before_async(&call, IdentitySupplier::anonymous())
                .await
                .unwrap()
        }));
    }

    for task in tasks {
        assert_eq!(task.await.unwrap(), Decision::granted(true));
    }
    assert_eq!(language.compile_count(), 1);
}

#[test]
fn identity_free_policy_never_forces_the_supplier() {
    let (engine, _) = engine_with(|index| {
        index.register(
            TypeMeta::new("acme.Billing")
                .before_policy("invoice(id)", PolicyDeclaration::new("permitAll")),
        );
    });
    let call = Invocation::new(member("invoice(id)"), "acme.Billing");

    let decision = engine
        .check_before(
            &call,
            IdentitySupplier::from_fn(|| panic!("identity must not be forced")),
        )
        .unwrap();
    assert_eq!(decision, Decision::granted(true));
}

#[tokio::test]
async fn identity_free_policy_never_forces_the_supplier_cooperatively() {
    let (engine, _) = engine_with(|index| {
        index.register(
            TypeMeta::new("acme.Billing")
                .before_policy("invoice(id)", PolicyDeclaration::new("permitAll")),
        );
    });
    let call = Invocation::new(member("invoice(id)"), "acme.Billing");

    let decision = engine
        .check_before_async(
            &call,
            IdentitySupplier::from_fn(|| panic!("identity must not be forced")),
        )
        .await
        .unwrap();
    assert_eq!(decision, Decision::granted(true));
}

#[test]
fn unauthenticated_force_yields_anonymous_not_an_error() {
    let (engine, _) = engine_with(|index| {
        index.register(
            TypeMeta::new("acme.Billing")
                .before_policy("invoice(id)", PolicyDeclaration::new("hasRole('ADMIN')")),
        );
    });
    let call = Invocation::new(member("invoice(id)"), "acme.Billing");

    // No identity established yet: the policy still evaluates, against
    // the anonymous identity, and denies.
    let decision = engine
        .check_before(&call, IdentitySupplier::anonymous())
        .unwrap();
    assert_eq!(decision, Decision::denied(false));
}

#[test]
fn parallel_blocking_callers_share_one_compilation() {
    let (engine, language) = engine_with(|index| {
        index.register(
            TypeMeta::new("acme.Billing")
                .before_policy("invoice(id)", PolicyDeclaration::new("hasRole('ADMIN')")),
        );
    });

    let mut handles = Vec::new();
    for i in 0..16 {
        let engine = engine.clone();
        handles.push(std::thread::spawn(move || {
            let call = Invocation::new(member("invoice(id)"), "acme.Billing");
            let identity = if i % 2 == 0 {
                Identity::new("alice", ["ADMIN"])
            } else {
                Identity::new("bob", ["USER"])
            };
            (
                i % 2 == 0,
                engine
                    .check_before(&call, IdentitySupplier::of(identity))
                    .unwrap(),
            )
        }));
    }

    for handle in handles {
        let (admin, decision) = handle.join().unwrap();
        if admin {
            assert_eq!(decision, Decision::granted(true));
        } else {
            assert_eq!(decision, Decision::denied(false));
        }
    }
    assert_eq!(language.compile_count(), 1);
}
