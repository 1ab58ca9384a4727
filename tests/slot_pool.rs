use netq_handoff::Slots::MAX_POOL_CAPACITY;
use netq_handoff::{ConfigError, PoolError, SlotPool};
use serial_test::serial;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn capacity_rules() {
    assert_eq!(SlotPool::new(0).unwrap_err(), ConfigError::ZeroCapacity);
    assert_eq!(SlotPool::new(12).unwrap_err(), ConfigError::NotPowerOfTwo(12));
    assert_eq!(
        SlotPool::new(512).unwrap_err(),
        ConfigError::AboveMaximum {
            capacity: 512,
            max: MAX_POOL_CAPACITY
        }
    );
    assert_eq!(SlotPool::new(1).unwrap().capacity(), 1);
    assert_eq!(SlotPool::new(256).unwrap().capacity(), 256);
}

#[test]
fn new_pool_is_empty_until_prefilled() {
    let mut pool = SlotPool::new(8).unwrap();
    assert!(pool.is_empty());
    assert_eq!(pool.try_acquire(), Err(PoolError::Empty));

    pool.prefill(3).unwrap();
    assert_eq!(pool.len(), 3);
    // prefill hands ids out in order
    assert_eq!(pool.try_acquire(), Ok(0));
    assert_eq!(pool.try_acquire(), Ok(1));
    assert_eq!(pool.try_acquire(), Ok(2));
    assert_eq!(pool.try_acquire(), Err(PoolError::Empty));
}

#[test]
fn prefill_beyond_free_room_fails() {
    let mut pool = SlotPool::new(4).unwrap();
    assert_eq!(
        pool.prefill(5),
        Err(ConfigError::PrefillOutOfRange { count: 5, room: 4 })
    );
    assert!(pool.is_empty());

    pool.prefill(3).unwrap();
    assert_eq!(
        pool.prefill(2),
        Err(ConfigError::PrefillOutOfRange { count: 2, room: 1 })
    );
    assert_eq!(pool.len(), 3);
}

#[test]
fn acquires_every_id_exactly_once() {
    for capacity in [1usize, 2, 16, 256] {
        let pool = SlotPool::with_ids(capacity).unwrap();

        let ids: HashSet<u8> = (0..capacity).map(|_| pool.try_acquire().unwrap()).collect();
        assert_eq!(ids.len(), capacity);
        assert_eq!(ids, (0..capacity).map(|i| i as u8).collect());

        assert_eq!(pool.try_acquire(), Err(PoolError::Empty));
    }
}

#[test]
fn released_id_is_handed_out_again() {
    let pool = SlotPool::with_ids(4).unwrap();
    let held: Vec<u8> = (0..4).map(|_| pool.try_acquire().unwrap()).collect();

    pool.try_release(held[2]).unwrap();
    assert_eq!(pool.try_acquire(), Ok(held[2]));
    assert_eq!(pool.try_acquire(), Err(PoolError::Empty));
}

#[test]
fn release_into_saturated_pool_is_full() {
    let pool = SlotPool::with_ids(4).unwrap();
    // double release: nothing was acquired
    assert_eq!(pool.try_release(0), Err(PoolError::Full));

    let id = pool.try_acquire().unwrap();
    pool.try_release(id).unwrap();
    assert_eq!(pool.try_release(id), Err(PoolError::Full));
    assert_eq!(pool.len(), 4);
}

#[test]
fn release_rejects_ids_beyond_capacity() {
    let pool = SlotPool::new(4).unwrap();
    assert_eq!(
        pool.try_release(200),
        Err(PoolError::OutOfRange { id: 200, capacity: 4 })
    );
    assert_eq!(
        pool.try_release(4),
        Err(PoolError::OutOfRange { id: 4, capacity: 4 })
    );
    assert!(pool.is_empty());

    pool.try_release(3).unwrap();
    assert_eq!(pool.try_acquire(), Ok(3));
}

#[test]
fn cycles_through_many_laps() {
    let pool = SlotPool::with_ids(2).unwrap();
    for _ in 0..10_000 {
        let a = pool.try_acquire().unwrap();
        let b = pool.try_acquire().unwrap();
        assert_ne!(a, b);
        pool.try_release(b).unwrap();
        pool.try_release(a).unwrap();
    }
    assert_eq!(pool.len(), 2);
}

#[test]
fn debug_output() {
    let pool = SlotPool::with_ids(8).unwrap();
    pool.try_acquire().unwrap();
    let rendered = format!("{pool:?}");
    assert_eq!(rendered, "SlotPool { capacity: 8, available: 7 }");
}

#[test]
#[serial]
fn concurrent_acquire_release_never_shares_an_id() {
    let capacity = 16;
    let threads = 8;
    let rounds = 5_000;
    let pool = Arc::new(SlotPool::with_ids(capacity).unwrap());
    let held: Arc<Vec<AtomicBool>> = Arc::new((0..capacity).map(|_| AtomicBool::new(false)).collect());
    let empties = Arc::new(AtomicU64::new(0));

    let mut handles = vec![];
    for _ in 0..threads {
        let pool = Arc::clone(&pool);
        let held = Arc::clone(&held);
        let empties = Arc::clone(&empties);
        handles.push(thread::spawn(move || {
            for _ in 0..rounds {
                match pool.try_acquire() {
                    Ok(id) => {
                        let was_held = held[id as usize].swap(true, Ordering::AcqRel);
                        assert!(!was_held, "id {id} handed to two owners");
                        if fastrand::bool() {
                            thread::yield_now();
                        }
                        held[id as usize].store(false, Ordering::Release);
                        pool.try_release(id).unwrap();
                    }
                    Err(PoolError::Empty) => {
                        empties.fetch_add(1, Ordering::Relaxed);
                        thread::yield_now();
                    }
                    Err(e) => panic!("acquire reported {e}"),
                }
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    // every id made it back
    assert_eq!(pool.len(), capacity);
    let ids: HashSet<u8> = (0..capacity).map(|_| pool.try_acquire().unwrap()).collect();
    assert_eq!(ids.len(), capacity);
}
