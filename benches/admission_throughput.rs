/// Benchmark for admission throughput under a single pool lock
///
/// Measures grant/release round trips sequentially and from several threads,
/// and how reconfiguration traffic affects admission.
use qmemgov::{LimitConfig, MemoryPool, NodeMemoryProfile, QueryId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

const CAPACITY: u64 = 1 << 30;
const ITERATIONS: usize = 200_000;

fn main() {
    println!("=== Admission Throughput Benchmark ===\n");

    let profile = NodeMemoryProfile::with_capacity(CAPACITY);
    let pool = MemoryPool::new(profile, LimitConfig::new(true, 64 << 20, 16 << 20))
        .expect("Failed to create pool");

    // Benchmark: acquire then drop
    println!("📊 Sequential Acquire/Release:");
    let start = Instant::now();
    for i in 0..ITERATIONS {
        let lease = pool
            .acquire(QueryId(i as u64), 4096)
            .expect("Sequential admission refused");
        drop(lease);
    }
    let duration = start.elapsed();
    println!("  Iterations: {}", ITERATIONS);
    println!("  Time: {:?}", duration);
    println!(
        "  Throughput: {:.0} admissions/sec",
        ITERATIONS as f64 / duration.as_secs_f64()
    );
    println!();

    // Benchmark: concurrent admission
    for threads in [2usize, 4, 8] {
        println!("📊 Concurrent Acquire/Release ({} threads):", threads);
        let per_thread = ITERATIONS / threads;
        let start = Instant::now();
        thread::scope(|s| {
            for t in 0..threads {
                let pool = &pool;
                s.spawn(move || {
                    for i in 0..per_thread {
                        let query_id = QueryId((t * per_thread + i) as u64);
                        if let Ok(lease) = pool.acquire(query_id, 4096) {
                            lease.release();
                        }
                    }
                });
            }
        });
        let duration = start.elapsed();
        let total = per_thread * threads;
        println!("  Admissions: {}", total);
        println!("  Time: {:?}", duration);
        println!(
            "  Throughput: {:.0} admissions/sec",
            total as f64 / duration.as_secs_f64()
        );
        println!();
    }

    // Benchmark: admission while limits keep changing
    println!("📊 Admission During Reconfiguration:");
    let stop = AtomicBool::new(false);
    let mut reconfigurations = 0u64;
    let start = Instant::now();
    thread::scope(|s| {
        let admitter = s.spawn(|| {
            let mut granted = 0usize;
            for i in 0..ITERATIONS {
                if let Ok(lease) = pool.acquire(QueryId(i as u64), 4096) {
                    granted += 1;
                    drop(lease);
                }
            }
            stop.store(true, Ordering::Relaxed);
            granted
        });

        let mut flip = false;
        while !stop.load(Ordering::Relaxed) {
            let single = if flip { 16 << 20 } else { 8 << 20 };
            if pool
                .reconfigure(LimitConfig::new(true, 64 << 20, single))
                .is_ok()
            {
                reconfigurations += 1;
            }
            flip = !flip;
        }

        let granted = admitter.join().expect("Admitter thread panicked");
        println!("  Granted: {}", granted);
    });
    let duration = start.elapsed();
    println!("  Reconfigurations: {}", reconfigurations);
    println!("  Time: {:?}", duration);
    println!();

    let stats = pool.stats();
    println!("=== Final Pool State ===");
    println!("{}", stats.format_human_readable());
    assert_eq!(stats.allocated_bytes, 0);
    assert_eq!(stats.accounting_violations, 0);
}
