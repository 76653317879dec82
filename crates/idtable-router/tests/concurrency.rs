//! Concurrent invocation against a shared router.

use std::sync::Barrier;
use std::thread;

use idtable_core::config::RouterConfig;
use idtable_router::{ErrorKind, Router};
use idtable_state::StateTable;

fn test_router() -> Router {
    let router = Router::new(StateTable::open_in_memory().unwrap(), RouterConfig::default());
    router.init().unwrap();
    router
}

#[test]
fn concurrent_create_race_has_one_winner() {
    let router = test_router();
    let callers = 16;
    let barrier = Barrier::new(callers);
    let (router, barrier) = (&router, &barrier);

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..callers)
            .map(|_| {
                s.spawn(move || {
                    barrier.wait();
                    router.invoke("create", &["alice"])
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let wins = results.iter().filter(|r| r.is_ok()).count();
    let dups = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.kind() == ErrorKind::AlreadyExists))
        .count();
    assert_eq!(wins, 1);
    assert_eq!(dups, callers - 1);

    let value = router.query("query", &["alice"]).unwrap();
    assert_eq!(value, b"true");
}

#[test]
fn concurrent_updates_leave_one_serial_result() {
    let router = test_router();
    router.invoke("create", &["bob"]).unwrap();
    let writers = 8;
    let barrier = Barrier::new(writers);

    thread::scope(|s| {
        for i in 0..writers {
            let router = &router;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                router.invoke("update", &["bob", format!("s{i}").as_str()]).unwrap();
            });
        }
    });

    let value = String::from_utf8(router.query("query", &["bob"]).unwrap()).unwrap();
    let expected: Vec<String> = (0..writers).map(|i| format!("s{i}")).collect();
    assert!(expected.contains(&value), "unexpected final status {value}");
}

#[test]
fn readers_never_see_a_missing_record_during_updates() {
    let router = test_router();
    router.invoke("create", &["carol"]).unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..200 {
                router
                    .invoke("update", &["carol", format!("v{i}").as_str()])
                    .unwrap();
            }
        });
        s.spawn(|| {
            for _ in 0..200 {
                // A replace is a single transaction, so the key is never absent.
                router.query("query", &["carol"]).unwrap();
            }
        });
    });
}
