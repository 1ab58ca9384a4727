// Emulates the embedding host: connection handlers push datagrams into the
// handoff context and a periodic tick drains them.
use netq_handoff::Core::trace::init_tracing;
use netq_handoff::{EnqueueError, HandoffConfig, HandoffContext};
use std::env;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_millis(16);

#[derive(Debug)]
struct Datagram {
    connection: u8,
    sequence: u32,
    payload: [u8; 32],
}

#[derive(Debug, Default)]
struct Session {
    sent: u64,
}

fn fold(checksum: u64, datagram: &Datagram) -> u64 {
    let body: u64 = datagram.payload.iter().map(|&b| b as u64).sum();
    checksum
        .rotate_left(5)
        .wrapping_add(datagram.sequence as u64 ^ datagram.connection as u64)
        .wrapping_add(body)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let producers: usize = match args.get(1) {
        Some(raw) => raw.parse()?,
        None => 4,
    };
    let max_ticks: Option<u64> = args.get(2).map(|raw| raw.parse()).transpose()?;

    let config = HandoffConfig::from_env()?;
    println!(
        "tick_host: queue {} slots, table {} slots, {} producers",
        config.queue_capacity, config.table_capacity, producers
    );

    let (context, mut tick) = HandoffContext::<Datagram, Session>::build(config)?;

    let running = Arc::new(AtomicBool::new(true));
    let running_for_handler = Arc::clone(&running);
    ctrlc::set_handler(move || {
        running_for_handler.store(false, Ordering::SeqCst);
    })?;

    let dropped = Arc::new(AtomicU64::new(0));
    let mut handles = Vec::with_capacity(producers);

    for _ in 0..producers {
        let context = context.clone();
        let running = Arc::clone(&running);
        let dropped = Arc::clone(&dropped);

        handles.push(thread::spawn(move || {
            let connection = match context.connections().acquire() {
                Ok(id) => id,
                Err(e) => {
                    eprintln!("producer: no connection slot: {e}");
                    return;
                }
            };

            let mut sequence = 0u32;
            while running.load(Ordering::Relaxed) {
                let datagram = Datagram {
                    connection,
                    sequence,
                    payload: [connection; 32],
                };
                match context.push(datagram) {
                    Ok(()) => sequence = sequence.wrapping_add(1),
                    Err(EnqueueError::Full(_)) => {
                        dropped.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(EnqueueError::Closed(_)) => break,
                }
                thread::sleep(Duration::from_micros(200));
            }

            let session = Session {
                sent: sequence as u64,
            };
            if let Err(e) = context.connections().replace(connection, session) {
                eprintln!("producer: could not record session: {e}");
            }
            match context.connections().release(connection) {
                Ok(session) => println!("connection {connection}: sent {}", session.sent),
                Err(e) => eprintln!("producer: release failed: {e}"),
            }
        }));
    }

    let start = Instant::now();
    let mut ticks = 0u64;
    let mut received = 0u64;
    let mut checksum = 0u64;

    while running.load(Ordering::SeqCst) {
        let next = Instant::now() + TICK;
        received += tick.run(|datagram| checksum = fold(checksum, &datagram)) as u64;
        ticks += 1;

        if ticks % 60 == 0 {
            println!(
                "tick {ticks}: received {received}, dropped {}, pending {}, connections {}",
                dropped.load(Ordering::Relaxed),
                tick.pending(),
                context.connections().in_use_count(),
            );
        }
        if max_ticks.is_some_and(|max| ticks >= max) {
            running.store(false, Ordering::SeqCst);
            break;
        }
        thread::sleep(next.saturating_duration_since(Instant::now()));
    }

    println!("tick_host: shutting down");
    context.shutdown();
    for handle in handles {
        if handle.join().is_err() {
            eprintln!("tick_host: a producer thread panicked");
        }
    }
    received += tick.finish(|datagram| checksum = fold(checksum, &datagram)) as u64;

    let elapsed = start.elapsed();
    println!(
        "tick_host: {ticks} ticks in {elapsed:.2?}, received {received}, dropped {}, checksum {checksum:x}",
        dropped.load(Ordering::Relaxed)
    );
    println!(
        "Average: {:.2} datagrams/second",
        received as f64 / elapsed.as_secs_f64()
    );

    Ok(())
}
