use friendgraph_core::{EdgeStore, FriendshipEdge, FriendshipStatus, User, UserId};
use friendgraph_graph::{
    all_friends, friend_profile, DegreeCounter, FriendQueryEngine, GraphFixture,
    InMemoryEdgeStore, MutualCounter,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn user(id: u64) -> User {
    User::new(UserId(id), format!("User {}", id), format!("555-{:04}", id))
}

/// Users 1..=6; 1-2, 1-3, 2-3 and 2-4 are accepted, 5 and 6 have no rows.
fn example_store() -> InMemoryEdgeStore {
    let store = InMemoryEdgeStore::new();
    for id in 1..=6 {
        store.insert_user(user(id));
    }
    for (a, b) in [(1, 2), (1, 3), (2, 3), (2, 4)] {
        store.accept_friendship(UserId(a), UserId(b)).unwrap();
    }
    store
}

/// A reproducible random graph with some pending and declined noise. Noise is
/// written in both directions so accepted rows stay symmetric.
fn random_store(users: u64, pairs: usize, seed: u64) -> InMemoryEdgeStore {
    let mut rng = fastrand::Rng::with_seed(seed);
    let store = InMemoryEdgeStore::new();
    for id in 1..=users {
        store.insert_user(user(id));
    }
    for _ in 0..pairs {
        let a = UserId(rng.u64(1..=users));
        let b = UserId(rng.u64(1..=users));
        if a == b {
            continue;
        }
        let status = match rng.u8(0..10) {
            0 => FriendshipStatus::Pending,
            1 => FriendshipStatus::Declined,
            _ => FriendshipStatus::Accepted,
        };
        store.upsert_edge(FriendshipEdge::new(a, b, status));
        store.upsert_edge(FriendshipEdge::new(b, a, status));
    }
    store
}

#[tokio::test]
async fn test_example_scenario() {
    let engine = FriendQueryEngine::new(Arc::new(example_store()));

    let profile = engine.get_friend_profile(UserId(1), UserId(2)).await.unwrap();
    assert_eq!(profile.total_friend_count, 3);
    assert_eq!(profile.mutual_friend_count, 1);

    let list = engine.get_all_friends(UserId(1)).await.unwrap();
    let ids: HashSet<UserId> = list.friend_ids().into_iter().collect();
    assert_eq!(ids, HashSet::from([UserId(2), UserId(3)]));
    for item in &list.friends {
        let expected = match item.entry.friend_user_id.get() {
            2 => 3,
            3 => 2,
            other => panic!("unexpected friend {}", other),
        };
        assert_eq!(item.total_friend_count, expected);
    }
}

#[tokio::test]
async fn test_users_without_edges() {
    let engine = FriendQueryEngine::new(Arc::new(example_store()));

    let mutual = engine
        .mutual_friend_counts(UserId(5), &[UserId(6)])
        .await
        .unwrap();
    assert_eq!(mutual[&UserId(6)], 0);

    let err = engine
        .get_friend_profile(UserId(5), UserId(6))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let list = engine.get_all_friends(UserId(5)).await.unwrap();
    assert!(list.friends.is_empty());
}

#[tokio::test]
async fn test_not_found_even_when_target_user_exists() {
    let engine = FriendQueryEngine::new(Arc::new(example_store()));
    // 1 and 4 both exist but are not friends.
    let err = engine
        .get_friend_profile(UserId(1), UserId(4))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    // Target does not exist at all.
    let err = engine
        .get_friend_profile(UserId(1), UserId(1000))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_symmetry_on_random_graph() {
    let store = random_store(40, 300, 7);
    let snap = store.snapshot().await.unwrap();
    let degrees = DegreeCounter::new(&snap);

    for a in 1..=40 {
        let neighbors = degrees.neighbor_set(UserId(a)).await.unwrap();
        assert_eq!(
            degrees.total_friend_count(UserId(a)).await.unwrap(),
            neighbors.len() as u64
        );
        for b in neighbors {
            let back = degrees.neighbor_set(b).await.unwrap();
            assert!(back.contains(&UserId(a)), "{} -> {} has no transpose", a, b);
        }
    }
}

#[tokio::test]
async fn test_mutual_properties_on_random_graph() {
    let store = random_store(30, 200, 11);
    let snap = store.snapshot().await.unwrap();
    let degrees = DegreeCounter::new(&snap);
    let mutual = MutualCounter::new(&snap);

    for a in 1..=30 {
        let fa = degrees.neighbor_set(UserId(a)).await.unwrap();
        for b in 1..=30 {
            let fb = degrees.neighbor_set(UserId(b)).await.unwrap();
            let expected = fa
                .intersection(&fb)
                .filter(|x| **x != UserId(a) && **x != UserId(b))
                .count() as u64;

            let ab = mutual.mutual_friend_count(UserId(a), UserId(b)).await.unwrap();
            let ba = mutual.mutual_friend_count(UserId(b), UserId(a)).await.unwrap();
            assert_eq!(ab, expected);
            assert_eq!(ab, ba);
        }
    }
}

#[tokio::test]
async fn test_duplicate_rows_never_inflate_counts() {
    let store = example_store();
    // Re-insert the 1-3 and 2-3 rows several times, plus self-loops on both ends.
    for _ in 0..3 {
        store.insert_edge(FriendshipEdge::accepted(UserId(1), UserId(3)));
        store.insert_edge(FriendshipEdge::accepted(UserId(2), UserId(3)));
        store.insert_edge(FriendshipEdge::accepted(UserId(3), UserId(1)));
    }
    store.insert_edge(FriendshipEdge::accepted(UserId(1), UserId(1)));
    store.insert_edge(FriendshipEdge::accepted(UserId(2), UserId(2)));

    let engine = FriendQueryEngine::new(Arc::new(store));
    let profile = engine.get_friend_profile(UserId(1), UserId(2)).await.unwrap();
    assert_eq!(profile.total_friend_count, 3);
    assert_eq!(profile.mutual_friend_count, 1);

    let list = engine.get_all_friends(UserId(1)).await.unwrap();
    assert_eq!(list.friends.len(), 2);
}

/// Flips the 2-4 and 1-4 friendships, all four rows in one write.
fn set_user_4_friendships(store: &InMemoryEdgeStore, status: FriendshipStatus) {
    let rows = [(2, 4), (4, 2), (1, 4), (4, 1)]
        .into_iter()
        .map(|(a, b)| FriendshipEdge::new(UserId(a), UserId(b), status))
        .collect();
    store.bulk_load(Vec::new(), rows, true);
}

#[tokio::test]
async fn test_snapshot_answers_from_its_own_version() {
    let store = Arc::new(example_store());
    let engine = FriendQueryEngine::new(Arc::clone(&store));

    let before = store.snapshot().await.unwrap();
    set_user_4_friendships(&store, FriendshipStatus::Accepted);

    let old = friend_profile(&before, UserId(1), UserId(2)).await.unwrap();
    assert_eq!((old.total_friend_count, old.mutual_friend_count), (3, 1));

    let new = engine.get_friend_profile(UserId(1), UserId(2)).await.unwrap();
    assert_eq!((new.total_friend_count, new.mutual_friend_count), (3, 2));

    set_user_4_friendships(&store, FriendshipStatus::Declined);
    let old_list = all_friends(&before, UserId(1)).await.unwrap();
    assert_eq!(old_list.friends.len(), 2);
    let new = engine.get_friend_profile(UserId(1), UserId(2)).await.unwrap();
    assert_eq!((new.total_friend_count, new.mutual_friend_count), (2, 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reads_during_writes_stay_consistent() {
    let store = Arc::new(example_store());
    let engine = FriendQueryEngine::new(Arc::clone(&store));
    let start_version = store.version();
    let stop = Arc::new(AtomicBool::new(false));

    let writer = {
        let store = Arc::clone(&store);
        let stop = Arc::clone(&stop);
        std::thread::spawn(move || {
            let mut round = 0u64;
            loop {
                let status = if round % 2 == 0 {
                    FriendshipStatus::Accepted
                } else {
                    FriendshipStatus::Declined
                };
                set_user_4_friendships(&store, status);
                round += 1;
                if stop.load(Ordering::Acquire) {
                    return round;
                }
            }
        })
    };

    // Readers start only once the writer is running.
    while store.version() == start_version {
        tokio::task::yield_now().await;
    }

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move {
                let mut seen = HashSet::new();
                for _ in 0..500 {
                    let p = engine.get_friend_profile(UserId(1), UserId(2)).await.unwrap();
                    let counts = (p.total_friend_count, p.mutual_friend_count);
                    // 2-4 and 1-4 change together, so 4 is either both a friend of 2
                    // and a mutual friend, or neither.
                    assert!(counts == (3, 2) || counts == (2, 1), "torn read {:?}", counts);
                    seen.insert(counts);
                    tokio::task::yield_now().await;
                }
                seen
            })
        })
        .collect();

    let results = futures::future::join_all(readers).await;
    let during_reads = store.version();
    stop.store(true, Ordering::Release);
    let rounds = writer.join().unwrap();

    for seen in results {
        assert!(!seen.unwrap().is_empty());
    }
    assert!(during_reads > start_version + 1);
    assert!(rounds >= 1);
}

#[test]
fn test_fixture_driven_engine_blocking() {
    let fixture = GraphFixture::from_json(
        r#"{
            "users": [
                {"id": 1, "fullName": "Ada", "phoneNumber": "555-0001"},
                {"id": 2, "fullName": "Bob", "phoneNumber": "555-0002"},
                {"id": 3, "fullName": "Cy", "phoneNumber": "555-0003"}
            ],
            "friendships": [
                {"userId": 1, "friendUserId": 2, "status": "accepted"},
                {"userId": 1, "friendUserId": 3, "status": "accepted"},
                {"userId": 3, "friendUserId": 2, "status": "requested"}
            ]
        }"#,
    )
    .unwrap();
    let engine = FriendQueryEngine::new(Arc::new(fixture.into_store(true)));

    let profile = tokio_test::block_on(engine.get_friend_profile(UserId(1), UserId(3))).unwrap();
    assert_eq!(profile.total_friend_count, 1);
    assert_eq!(profile.mutual_friend_count, 0);
}
