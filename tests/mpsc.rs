use netq_handoff::{BackoffPolicy, EnqueueError, QueueBuilder, RingQueue};
use serial_test::serial;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
#[serial]
fn three_producers_tight_consumer_no_full() {
    // capacity 4, 3 producers x 10 items, consumer draining in a tight loop
    let queue = Arc::new(RingQueue::new(4).unwrap());
    let full_errors = Arc::new(AtomicU64::new(0));
    let producers_done = Arc::new(AtomicBool::new(false));

    let consumer = {
        let queue = Arc::clone(&queue);
        let producers_done = Arc::clone(&producers_done);
        thread::spawn(move || {
            let mut drained = 0usize;
            loop {
                drained += unsafe { queue.drain(|_: (usize, usize)| {}) };
                if producers_done.load(Ordering::Acquire) && queue.is_empty() {
                    drained += unsafe { queue.drain(|_| {}) };
                    return drained;
                }
                std::hint::spin_loop();
            }
        })
    };

    let mut handles = vec![];
    for p in 0..3 {
        let queue = Arc::clone(&queue);
        let full_errors = Arc::clone(&full_errors);
        handles.push(thread::spawn(move || {
            for i in 0..10 {
                match queue.enqueue((p, i)) {
                    Ok(()) => {}
                    Err(EnqueueError::Full(_)) => {
                        full_errors.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(EnqueueError::Closed(_)) => panic!("queue closed unexpectedly"),
                }
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }
    producers_done.store(true, Ordering::Release);

    assert_eq!(consumer.join().unwrap(), 30);
    assert_eq!(full_errors.load(Ordering::Relaxed), 0);
}

#[test]
#[serial]
fn many_producers_no_loss_no_duplication_in_order() {
    let producers = 6;
    let per_producer = 5_000u32;
    let (producer, mut consumer) = QueueBuilder::new()
        .with_capacity(64)
        .with_backoff(BackoffPolicy::impatient())
        .build::<(usize, u32)>()
        .unwrap();

    let mut handles = vec![];
    for p_id in 0..producers {
        let producer = producer.clone();
        handles.push(thread::spawn(move || {
            for i in 0..per_producer {
                let mut value = (p_id, i);
                // retry on backpressure
                loop {
                    match producer.send(value) {
                        Ok(()) => break,
                        Err(EnqueueError::Full(v)) => {
                            value = v;
                            thread::yield_now();
                        }
                        Err(EnqueueError::Closed(_)) => panic!("queue closed unexpectedly"),
                    }
                }
                if fastrand::u8(..) == 0 {
                    thread::yield_now();
                }
            }
        }));
    }

    let total = producers * per_producer as usize;
    let mut last_seen: HashMap<usize, u32> = HashMap::new();
    let mut received = 0usize;
    while received < total {
        let n = consumer.drain(|(p_id, i)| {
            // per-producer FIFO: each producer's tickets are assigned in order
            if let Some(prev) = last_seen.insert(p_id, i) {
                assert_eq!(i, prev + 1, "producer {p_id} out of order");
            } else {
                assert_eq!(i, 0, "producer {p_id} lost its first item");
            }
        });
        received += n;
        if n == 0 {
            thread::yield_now();
        }
    }

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(received, total);
    assert!(consumer.try_receive().is_none());
    for p_id in 0..producers {
        assert_eq!(last_seen[&p_id], per_producer - 1);
    }
}

#[test]
#[serial]
fn random_payloads_arrive_intact() {
    let producers = 4;
    let per_producer = 2_000usize;
    let queue = Arc::new(RingQueue::with_backoff(32, BackoffPolicy::patient()).unwrap());
    let sent_sum = Arc::new(AtomicU64::new(0));

    let mut handles = vec![];
    for _ in 0..producers {
        let queue = Arc::clone(&queue);
        let sent_sum = Arc::clone(&sent_sum);
        handles.push(thread::spawn(move || {
            for _ in 0..per_producer {
                let payload: [u8; 48] = std::array::from_fn(|_| fastrand::u8(..));
                let sum: u64 = payload.iter().map(|&b| b as u64).sum();
                let mut value = (sum, payload);
                loop {
                    match queue.enqueue(value) {
                        Ok(()) => break,
                        Err(e) => {
                            assert!(e.is_full());
                            value = e.into_inner();
                            thread::yield_now();
                        }
                    }
                }
                sent_sum.fetch_add(sum, Ordering::Relaxed);
            }
        }));
    }

    let mut received = 0usize;
    let mut received_sum = 0u64;
    while received < producers * per_producer {
        match unsafe { queue.try_dequeue() } {
            Some((sum, payload)) => {
                let actual: u64 = payload.iter().map(|&b| b as u64).sum();
                assert_eq!(sum, actual, "payload corrupted in transit");
                received_sum += sum;
                received += 1;
            }
            None => std::hint::spin_loop(),
        }
    }

    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(received_sum, sent_sum.load(Ordering::Relaxed));
    assert!(queue.is_empty());
}

#[test]
#[serial]
fn close_while_producers_run() {
    let (producer, mut consumer) = QueueBuilder::new()
        .with_capacity(16)
        .with_backoff(BackoffPolicy::impatient())
        .build::<u64>()
        .unwrap();
    let accepted = Arc::new(AtomicU64::new(0));

    let mut handles = vec![];
    for _ in 0..4 {
        let producer = producer.clone();
        let accepted = Arc::clone(&accepted);
        handles.push(thread::spawn(move || loop {
            match producer.send(1) {
                Ok(()) => {
                    accepted.fetch_add(1, Ordering::Relaxed);
                }
                Err(EnqueueError::Full(_)) => thread::yield_now(),
                Err(EnqueueError::Closed(_)) => return,
            }
        }));
    }

    let mut drained = 0u64;
    for _ in 0..200 {
        drained += consumer.drain(|v| assert_eq!(v, 1)) as u64;
        thread::yield_now();
    }

    producer.close();
    for h in handles {
        h.join().unwrap();
    }
    drained += consumer.finish(|_| {}) as u64;

    assert_eq!(drained, accepted.load(Ordering::Relaxed));
    assert!(producer.send(1).unwrap_err().is_closed());
}
