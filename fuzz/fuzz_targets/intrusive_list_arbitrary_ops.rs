#![no_main]

use libfuzzer_sys::fuzz_target;
use lrukit::ds::{IntrusiveList, NodeRef};

// Fuzz arbitrary operation sequences on IntrusiveList
//
// Drives push_front, push_back, remove, move_to_front, move_to_back, next,
// prev and init over a pool of handles that includes removed, detached and
// foreign nodes. The ring is validated after every step.
fuzz_target!(|data: &[u8]| {
    let mut list: IntrusiveList<u32> = IntrusiveList::new();
    let mut other: IntrusiveList<u32> = IntrusiveList::new();
    let mut handles: Vec<NodeRef<u32>> = vec![NodeRef::detached(u32::MAX)];

    for chunk in data.chunks_exact(2) {
        let op = chunk[0] % 9;
        let value = u32::from(chunk[1]);
        let pick = (chunk[1] as usize) % handles.len();

        match op {
            0 => {
                let node = list.push_front(value);
                assert_eq!(list.front().as_ref(), Some(&node));
                handles.push(node);
            }
            1 => {
                let node = list.push_back(value);
                assert_eq!(list.back().as_ref(), Some(&node));
                handles.push(node);
            }
            2 => {
                let node = &handles[pick];
                let was_member = list.contains(node);
                let old_len = list.len();
                let payload = list.remove(node);
                assert_eq!(*payload, *node.value());
                assert!(!list.contains(node));
                if was_member {
                    assert_eq!(list.len(), old_len - 1);
                } else {
                    assert_eq!(list.len(), old_len);
                }
            }
            3 => {
                let node = &handles[pick];
                if list.move_to_front(node) {
                    assert_eq!(list.front().as_ref(), Some(node));
                }
            }
            4 => {
                let node = &handles[pick];
                if list.move_to_back(node) {
                    assert_eq!(list.back().as_ref(), Some(node));
                }
            }
            5 => {
                let node = &handles[pick];
                if let Some(next) = list.next(node) {
                    assert_eq!(list.prev(&next).as_ref(), Some(node));
                }
                if !list.contains(node) {
                    assert!(list.next(node).is_none());
                    assert!(list.prev(node).is_none());
                }
            }
            6 => {
                handles.push(other.push_back(value));
            }
            7 => {
                handles.push(NodeRef::detached(value));
            }
            _ => {
                if value % 16 == 0 {
                    list.init();
                    assert!(list.is_empty());
                }
            }
        }

        list.check_invariants().unwrap();
        assert_eq!(list.iter().count(), list.len());
    }
});
