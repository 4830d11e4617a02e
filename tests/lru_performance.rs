// ==============================================
// LRU PERFORMANCE TESTS (integration)
// ==============================================
//
// Coarse latency checks. Bounds are loose enough for unoptimized builds; they
// catch accidental O(n) paths in add/get/eviction, not micro-regressions.

use std::time::{Duration, Instant};

use lrukit::policy::lru::LruCache;

/// Helper function to measure execution time of a closure
fn measure_time<F, R>(operation: F) -> (R, Duration)
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let result = operation();
    let duration = start.elapsed();
    (result, duration)
}

fn filled(capacity: usize) -> LruCache<usize, usize> {
    let cache = LruCache::new(capacity).unwrap();
    for i in 0..capacity {
        cache.add(i, i * 10);
    }
    cache
}

mod latency {
    use super::*;

    #[test]
    fn get_latency() {
        let cache = filled(10_000);
        let iterations = 100_000u32;
        let (_, duration) = measure_time(|| {
            for i in 0..iterations as usize {
                std::hint::black_box(cache.get(&(i % 10_000)));
            }
        });

        let avg_latency = duration / iterations;
        println!("Average get latency: {:?}", avg_latency);
        assert!(
            avg_latency < Duration::from_micros(50),
            "get too slow: {:?}",
            avg_latency
        );
    }

    #[test]
    fn evicting_add_latency() {
        let cache = filled(10_000);
        let iterations = 100_000u32;
        let (_, duration) = measure_time(|| {
            for i in 0..iterations as usize {
                cache.add(20_000 + i, i);
            }
        });

        let avg_latency = duration / iterations;
        println!("Average evicting add latency: {:?}", avg_latency);
        assert!(
            avg_latency < Duration::from_micros(50),
            "add with eviction too slow: {:?}",
            avg_latency
        );
        assert_eq!(cache.len(), 10_000);
    }
}

mod scaling {
    use super::*;

    fn time_gets(cache: &LruCache<usize, usize>, capacity: usize, iterations: usize) -> Duration {
        let (_, duration) = measure_time(|| {
            for i in 0..iterations {
                std::hint::black_box(cache.get(&((i * 7919) % capacity)));
            }
        });
        duration
    }

    #[test]
    fn get_cost_does_not_grow_with_size() {
        let small = filled(1_000);
        let large = filled(100_000);

        let small_time = time_gets(&small, 1_000, 50_000);
        let large_time = time_gets(&large, 100_000, 50_000);
        println!("1k: {:?}, 100k: {:?}", small_time, large_time);

        // A linear scan would be ~100x slower; allow for cache-miss effects.
        assert!(
            large_time < small_time * 20 + Duration::from_millis(50),
            "get appears to scale with cache size: {:?} vs {:?}",
            small_time,
            large_time
        );
    }
}
