#![no_main]

use libfuzzer_sys::fuzz_target;
use lrukit::policy::lru::LruCache;

// Fuzz arbitrary add/get/purge sequences on LruCache
//
// The first byte picks the capacity; the rest are (op, key) pairs. After each
// step the index/list pairing and the capacity bound are checked, and a hit
// must leave its key at the front.
fuzz_target!(|data: &[u8]| {
    let Some((&cap_byte, rest)) = data.split_first() else {
        return;
    };
    let capacity = usize::from(cap_byte % 16) + 1;
    let cache: LruCache<u8, u16> = LruCache::new(capacity).unwrap();

    for chunk in rest.chunks_exact(2) {
        let key = chunk[1] % 32;
        match chunk[0] % 8 {
            0..=3 => {
                cache.add(key, u16::from(key) * 3);
                assert_eq!(cache.keys().first(), Some(&key));
            }
            4..=6 => {
                if let Some(value) = cache.get(&key) {
                    assert_eq!(value, u16::from(key) * 3);
                    assert_eq!(cache.keys().first(), Some(&key));
                }
            }
            _ => {
                cache.purge();
                assert!(cache.is_empty());
            }
        }

        assert!(cache.len() <= capacity);
        cache.check_invariants().unwrap();
    }
});
