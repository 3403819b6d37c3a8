//! Multi threaded insert and lookup throughput.
//!
//! cargo run --release --example stress -- [threads] [count]

#[macro_use]
extern crate lazy_static;

use crossbeam_channel::unbounded;
use skipdb::{Options, Random, RandomGenerator, SkipList};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

lazy_static! {
    static ref LIST: SkipList<u32, String> = SkipList::new(Options::with_max_level(18));
}

/// Runs `op` `count` times spread over `threads`, returns the wall time and
/// how many calls succeeded.
fn run<F>(threads: u32, count: u32, op: F) -> (Duration, usize)
where
    F: Fn(&Random) -> bool + Send + Sync + Copy + 'static,
{
    let (tx, rx) = unbounded();
    let start = Instant::now();
    let handles: Vec<_> = (0..threads)
        .map(|tid| {
            let tx = tx.clone();
            thread::spawn(move || {
                let rnd = Random::new(tid + 1);
                let begin = Instant::now();
                let hits = (0..count / threads).filter(|_| op(&rnd)).count();
                tx.send((tid, hits, begin.elapsed())).unwrap();
            })
        })
        .collect();
    drop(tx);
    let mut total = 0;
    for (tid, hits, elapsed) in rx.iter() {
        println!("  thread {} finished in {:?}, {} hits", tid, elapsed, hits);
        total += hits;
    }
    for h in handles {
        h.join().unwrap();
    }
    (start.elapsed(), total)
}

fn main() {
    let mut args = env::args().skip(1);
    let threads: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1).max(1);
    let count: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(100_000).max(1);

    println!("insert {} elements with {} threads", count, threads);
    let (elapsed, inserted) = run(threads, count, move |rnd| {
        let k = rnd.uniform(count);
        match LIST.insert(k, "a".to_string()) {
            Ok(()) => true,
            Err(e) if e.is_duplicate() => false,
            Err(e) => panic!("insert {}: {}", k, e),
        }
    });
    println!(
        "insert elapsed: {:?}, inserted {}, size {}",
        elapsed,
        inserted,
        LIST.len()
    );

    println!("search {} elements with {} threads", count, threads);
    let (elapsed, found) = run(threads, count, move |rnd| LIST.contains_key(&rnd.uniform(count)));
    println!("search elapsed: {:?}, found {}", elapsed, found);
}
