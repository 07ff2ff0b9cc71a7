// tests/load_balancer_tests.rs
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_server_selector::pool::ServerPool;
use rust_server_selector::{SelectionEngine, SelectionError};
use std::collections::HashMap;
use std::sync::Arc;

fn build_engine(servers: &[(&str, f64)], seed: u64) -> SelectionEngine {
    let mut pool = ServerPool::new();
    for (name, rate) in servers {
        pool.add(name, *rate).unwrap();
    }
    SelectionEngine::new(pool).with_rng(StdRng::seed_from_u64(seed))
}

fn rank_key(engine: &SelectionEngine, name: &str) -> (bool, f64) {
    let server = engine.get_server(name).unwrap();
    (server.is_busy(), server.request_count())
}

#[test]
fn test_two_idle_servers_end_to_end() {
    let engine = build_engine(&[("A", 1.0), ("B", 1.0)], 1).with_randomize_ties(false);

    let first = engine.select_next().unwrap();
    assert_eq!((first.server.as_str(), first.request_count), ("A", 1.0));

    let second = engine.select_next().unwrap();
    assert_eq!((second.server.as_str(), second.request_count), ("B", 1.0));
}

#[test]
fn test_idle_priority_over_busy_servers() {
    let engine = build_engine(&[("A", 1.0), ("B", 1.0), ("C", 1.0)], 3).with_randomize_ties(false);

    for _ in 0..9 {
        engine.select_next().unwrap();
    }
    engine.complete("B");
    engine.complete("B");
    assert_eq!(rank_key(&engine, "B"), (true, 1.0));
    assert_eq!(rank_key(&engine, "A"), (true, 3.0));

    engine.add_server("Idle", 0.5).unwrap();
    for randomize in [false, true] {
        engine.set_randomize_ties(randomize);
        let selection = engine.select_next().unwrap();
        assert_eq!(selection.server, "Idle");
        assert_eq!(selection.tie_set_size, 1);
        engine.complete("Idle");
    }

    // with no idle server left, the lightest busy one wins
    engine.remove_server("Idle");
    assert_eq!(engine.select_next().unwrap().server, "B");
}

#[test]
fn test_tie_break_is_roughly_uniform() {
    let names = ["A", "B", "C", "D"];
    let servers: Vec<(&str, f64)> = names.iter().map(|n| (*n, 1.0)).collect();
    let engine = build_engine(&servers, 42);

    let rounds = 4000;
    let mut counts: HashMap<String, usize> = HashMap::new();
    for _ in 0..rounds {
        engine.reset_loads();
        *counts.entry(engine.select_next().unwrap().server).or_default() += 1;
    }

    let expected = rounds / names.len();
    for name in names {
        let seen = counts.get(name).copied().unwrap_or(0);
        assert!(
            seen.abs_diff(expected) < expected / 5,
            "{} chosen {} times, expected about {}",
            name,
            seen,
            expected
        );
    }
}

#[test]
fn test_duplicate_add_keeps_one_server() {
    let engine = build_engine(&[], 0);
    engine.add_server("X", 1.0).unwrap();
    engine.add_server("X", 2.0).unwrap();

    let matching: Vec<_> = engine
        .snapshot()
        .into_iter()
        .filter(|s| s.name() == "X")
        .collect();
    assert_eq!(matching.len(), 1);
}

#[test]
fn test_add_existing_name_with_bad_rate_is_noop() {
    let engine = SelectionEngine::default();
    let before = engine.snapshot();

    assert_eq!(engine.add_server("ServerI", 0.0), Ok(false));
    assert_eq!(engine.add_server("ServerI", -1.0), Ok(false));
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn test_remove_unknown_leaves_pool_unchanged() {
    let engine = build_engine(&[("A", 1.0), ("B", 2.0)], 0);
    engine.select_next().unwrap();
    let before = engine.snapshot();

    assert_eq!(engine.remove_server("Nope"), 0);
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn test_rate_validation() {
    let engine = build_engine(&[], 0);
    assert!(matches!(
        engine.add_server("X", 0.0),
        Err(SelectionError::InvalidParameter { .. })
    ));
    assert!(matches!(
        engine.add_server("X", -1.0),
        Err(SelectionError::InvalidParameter { .. })
    ));
    assert_eq!(engine.pool_size(), 0);
    assert_eq!(engine.add_server("X", 0.5), Ok(true));
}

#[test]
fn test_empty_pool_after_removing_everything() {
    let engine = SelectionEngine::default();
    for server in engine.snapshot() {
        engine.remove_server(server.name());
    }
    assert_eq!(engine.select_next(), Err(SelectionError::NoServersAvailable));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_selects_spread_over_idle_servers() {
    let names: Vec<String> = (0..16).map(|i| format!("S{}", i)).collect();
    let mut pool = ServerPool::new();
    for name in &names {
        pool.add(name, 1.0).unwrap();
    }
    let engine = Arc::new(SelectionEngine::new(pool));

    let tasks: Vec<_> = (0..names.len())
        .map(|_| {
            let engine = engine.clone();
            tokio::task::spawn_blocking(move || engine.select_next().unwrap())
        })
        .collect();

    let mut chosen = Vec::new();
    for selection in futures::future::join_all(tasks).await {
        chosen.push(selection.unwrap().server);
    }
    chosen.sort();
    chosen.dedup();

    // every caller got its own idle server
    assert_eq!(chosen.len(), names.len());
    for server in engine.snapshot() {
        assert_eq!(server.request_count(), 1.0);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mutation_and_selection() {
    let engine = Arc::new(build_engine(&[("Base", 1.0)], 9));
    let per_task = 200;

    let selectors: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            tokio::task::spawn_blocking(move || {
                for _ in 0..per_task {
                    engine.select_next().unwrap();
                }
            })
        })
        .collect();

    let mutator = {
        let engine = engine.clone();
        tokio::task::spawn_blocking(move || {
            for i in 0..per_task {
                let name = format!("Temp{}", i % 5);
                engine.add_server(&name, 1.0).unwrap();
                engine.remove_server(&name);
            }
        })
    };

    for task in selectors {
        task.await.unwrap();
    }
    mutator.await.unwrap();

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.len(), 1);
    for server in &snapshot {
        assert_eq!(server.is_busy(), server.request_count() > 0.0);
    }
}

#[derive(Debug, Clone)]
enum Op {
    Select,
    Complete(usize),
    Add(usize, u8),
    Remove(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Select),
        2 => (0usize..8).prop_map(Op::Complete),
        1 => (0usize..8, 1u8..6).prop_map(|(i, r)| Op::Add(i, r)),
        1 => (0usize..8).prop_map(Op::Remove),
    ]
}

proptest! {
    #[test]
    fn prop_selection_never_ranks_above_another_server(
        ops in prop::collection::vec(op_strategy(), 0..60),
        randomize in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let engine = build_engine(&[("S0", 1.0)], seed).with_randomize_ties(randomize);
        let name = |i: usize| format!("S{}", i);

        for op in ops {
            match op {
                Op::Select => {
                    let _ = engine.select_next();
                }
                Op::Complete(i) => {
                    engine.complete(&name(i));
                }
                Op::Add(i, rate) => {
                    engine.add_server(&name(i), rate as f64 / 2.0).unwrap();
                }
                Op::Remove(i) => {
                    engine.remove_server(&name(i));
                }
            }
        }
        // keep at least one candidate
        engine.add_server("Tail", 1.0).unwrap();

        let before: Vec<(String, (bool, f64))> = engine
            .snapshot()
            .iter()
            .map(|s| (s.name().to_string(), rank_key(&engine, s.name())))
            .collect();
        let selection = engine.select_next().unwrap();
        let chosen = before.iter().find(|(n, _)| *n == selection.server).unwrap().1;

        for (_, key) in &before {
            prop_assert!(chosen <= *key);
        }
        prop_assert_eq!(
            selection.tie_set_size,
            before.iter().filter(|(_, key)| *key == chosen).count()
        );
        for server in engine.snapshot() {
            prop_assert_eq!(server.is_busy(), server.request_count() > 0.0);
        }
    }
}
