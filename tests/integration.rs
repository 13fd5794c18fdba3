//! Integration tests for taskscope.
//!
//! These tests verify the guarantees that matter across module boundaries:
//! isolation between concurrently running contexts, snapshot inheritance into
//! child scopes and spawned tasks, and token semantics under interleaving.

use std::sync::Arc;

use taskscope::{scope, AnyInstance, ContextError, ContextInstance};
use tokio::sync::{oneshot, Barrier};

#[derive(Debug, PartialEq)]
struct Session {
    id: u32,
}

impl ContextInstance for Session {}

#[derive(Debug)]
struct Config {
    name: &'static str,
}

impl ContextInstance for Config {}

/// Two concurrently running contexts never observe each other's writes, even
/// when both mutate the same slot before either reads it.
#[tokio::test]
async fn test_sibling_contexts_are_isolated() {
    let barrier = Arc::new(Barrier::new(2));

    let mut handles = Vec::new();
    for id in [1u32, 2] {
        let barrier = barrier.clone();
        handles.push(scope::spawn(async move {
            Session::set_current(Session { id });
            // Hold until both siblings have written.
            barrier.wait().await;
            Session::current().unwrap().id
        }));
    }

    assert_eq!(handles.remove(0).await.unwrap(), 1);
    assert_eq!(handles.remove(0).await.unwrap(), 2);
}

/// A child scope starts from the parent's value, and divergence flows in
/// neither direction afterwards.
#[tokio::test]
async fn test_child_scope_inherits_then_diverges() {
    scope::isolated(async {
        Session::set_current(Session { id: 7 });

        scope::scope(async {
            assert_eq!(Session::current().unwrap().id, 7);
            Session::set_current(Session { id: 8 });
            assert_eq!(Session::current().unwrap().id, 8);
        })
        .await;

        assert_eq!(Session::current().unwrap().id, 7);
    })
    .await;
}

/// The inheritance snapshot is taken at the spawn call: a write the parent
/// makes afterwards is invisible to the already-spawned child.
#[tokio::test]
async fn test_spawn_snapshot_taken_at_spawn_time() {
    scope::isolated(async {
        Session::set_current(Session { id: 1 });

        let (release, gate) = oneshot::channel();
        let child = scope::spawn(async move {
            gate.await.unwrap();
            Session::current().unwrap().id
        });

        // Mutate after the spawn, then let the child read.
        Session::set_current(Session { id: 2 });
        release.send(()).unwrap();

        assert_eq!(child.await.unwrap(), 1);
        assert_eq!(Session::current().unwrap().id, 2);
    })
    .await;
}

/// Slots of distinct types are independent within one context.
#[tokio::test]
async fn test_distinct_types_do_not_interfere() {
    scope::isolated(async {
        Session::set_current(Session { id: 10 });
        assert!(Config::get_current().is_none());

        Config::set_current(Config { name: "primary" });
        assert_eq!(Session::current().unwrap().id, 10);
        assert_eq!(Config::current().unwrap().name, "primary");
    })
    .await;
}

/// A slot value set before a suspension point is still there after it, no
/// matter what other contexts did in between.
#[tokio::test]
async fn test_value_persists_across_interleaved_suspension() {
    scope::isolated(async {
        Session::set_current(Session { id: 21 });

        // Another context interleaves and writes the same slot while we wait.
        scope::spawn(async {
            Session::set_current(Session { id: 99 });
        })
        .await
        .unwrap();

        assert_eq!(Session::current().unwrap().id, 21);
    })
    .await;
}

/// `reset` restores the exact captured instance, and tokens stay valid out of
/// LIFO order.
#[tokio::test]
async fn test_token_restores_exact_instance() {
    scope::isolated(async {
        let first = Arc::new(Session { id: 1 });
        let t1 = Session::set_current(first.clone());
        let t2 = Session::set_current(Session { id: 2 });
        Session::set_current(Session { id: 3 });

        // t2 captured `first`, regardless of the set that followed it.
        Session::reset_current(t2);
        assert!(Arc::ptr_eq(&Session::current().unwrap(), &first));

        // t1 captured the empty slot.
        Session::reset_current(t1);
        assert!(Session::get_current().is_none());
    })
    .await;
}

/// Strict and non-strict reads disagree only in how they report absence.
#[tokio::test]
async fn test_strict_read_reports_unset() {
    scope::isolated(async {
        assert!(Session::get_current().is_none());

        let err = Session::current().unwrap_err();
        match err {
            ContextError::Unset { type_name } => assert!(type_name.contains("Session")),
            other => panic!("unexpected error: {other}"),
        }
    })
    .await;
}

/// A failed erased write names both types and leaves the slot untouched.
#[tokio::test]
async fn test_erased_write_failure_is_all_or_nothing() {
    scope::isolated(async {
        let original = Arc::new(Config { name: "kept" });
        Config::set_current(original.clone());

        let err = Config::slot()
            .set_erased(AnyInstance::new(Session { id: 1 }))
            .unwrap_err();
        match err {
            ContextError::InvalidInstanceType { expected, actual } => {
                assert!(expected.contains("Config"));
                assert!(actual.contains("Session"));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(Arc::ptr_eq(&Config::current().unwrap(), &original));
    })
    .await;
}

/// Outside any scope, plain OS threads act as contexts of their own.
#[test]
fn test_plain_threads_are_contexts() {
    let ids: Vec<u32> = [1u32, 2]
        .map(|id| {
            std::thread::spawn(move || {
                Session::set_current(Session { id });
                Session::current().unwrap().id
            })
        })
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(ids, [1, 2]);
    // This thread never set anything.
    assert!(Session::get_current().is_none());
}
