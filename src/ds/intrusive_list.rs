//! Intrusive doubly linked ring backed by `SlotArena`.
//!
//! Nodes live in a `SlotArena` and are linked by `SlotId`. A sentinel link
//! record (`root`) closes the list into a ring: `root.next` is the front,
//! `root.prev` is the back, and the list is empty iff `root.next` is the
//! root itself.
//!
//! ## Architecture
//!
//! ```text
//!   arena (SlotArena<Node<T>>)
//!   ┌────────┬──────────────────────────────────────────────┐
//!   │ SlotId │ Node { value, prev, next }                   │
//!   ├────────┼──────────────────────────────────────────────┤
//!   │ id_1   │ { value: A, prev: Root,     next: Node(2) }  │
//!   │ id_2   │ { value: B, prev: Node(1),  next: Node(3) }  │
//!   │ id_3   │ { value: C, prev: Node(2),  next: Root }     │
//!   └────────┴──────────────────────────────────────────────┘
//!
//!   ┌──► root ──► [id_1] ◄──► [id_2] ◄──► [id_3] ──┐
//!   └──────────────────────────────────────────────┘
//! ```
//!
//! ## Handles and membership
//!
//! Insertions return a [`NodeRef`]: the owning list's [`ListId`], the node's
//! generational `SlotId`, and a shared pointer to the payload. A handle is a
//! member of a list only while all three agree: same list id, slot still
//! occupied, same generation. Removal frees the slot and [`IntrusiveList::init`]
//! gives the list a fresh id, so stale, foreign and never-inserted handles all
//! fail the check and every operation on them is a silent no-op.
//!
//! ## Performance
//! - `push_front` / `push_back`: O(1)
//! - `remove`: O(1)
//! - `move_to_front` / `move_to_back`: O(1)
//! - `front` / `back` / `next` / `prev`: O(1)
//! - `iter`: O(n)
//!
//! Not synchronized. Shared use goes through the owner's lock.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;

static NEXT_LIST_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one list instance (and one initialization of it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListId(u64);

impl ListId {
    fn next() -> Self {
        Self(NEXT_LIST_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Root,
    Node(SlotId),
}

#[derive(Debug, Clone, Copy)]
struct Links {
    prev: Link,
    next: Link,
}

impl Links {
    const EMPTY: Links = Links {
        prev: Link::Root,
        next: Link::Root,
    };
}

#[derive(Debug)]
struct Node<T> {
    value: Arc<T>,
    links: Links,
}

/// Handle to a node, as returned by list insertions and traversal.
///
/// Cloning a handle never copies the payload. Two handles compare equal when
/// they name the same node.
pub struct NodeRef<T> {
    membership: Option<(ListId, SlotId)>,
    value: Arc<T>,
}

impl<T> NodeRef<T> {
    /// Creates a handle that was never inserted into any list.
    pub fn detached(value: T) -> Self {
        Self {
            membership: None,
            value: Arc::new(value),
        }
    }

    /// Returns the payload, whether or not the node is still in a list.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Returns the shared payload pointer.
    pub fn value_arc(&self) -> &Arc<T> {
        &self.value
    }
}

impl<T> Clone for NodeRef<T> {
    fn clone(&self) -> Self {
        Self {
            membership: self.membership,
            value: Arc::clone(&self.value),
        }
    }
}

impl<T> PartialEq for NodeRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.membership == other.membership && Arc::ptr_eq(&self.value, &other.value)
    }
}

impl<T> Eq for NodeRef<T> {}

impl<T: fmt::Debug> fmt::Debug for NodeRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("membership", &self.membership)
            .field("value", &self.value)
            .finish()
    }
}

/// Doubly linked ring whose nodes are stored in a `SlotArena`.
pub struct IntrusiveList<T> {
    id: ListId,
    arena: SlotArena<Node<T>>,
    root: Links,
}

impl<T> IntrusiveList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            id: ListId::next(),
            arena: SlotArena::new(),
            root: Links::EMPTY,
        }
    }

    /// Creates an empty list with reserved node capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id: ListId::next(),
            arena: SlotArena::with_capacity(capacity),
            root: Links::EMPTY,
        }
    }

    /// Resets the list to the empty ring.
    ///
    /// Every handle issued before the call is detached afterwards.
    pub fn init(&mut self) -> &mut Self {
        self.arena.clear();
        self.root = Links::EMPTY;
        self.id = ListId::next();
        self
    }

    /// Same as [`init`](Self::init).
    pub fn clear(&mut self) {
        self.init();
    }

    /// Returns this list's current identity.
    pub fn id(&self) -> ListId {
        self.id
    }

    /// Returns the number of nodes in the list. The sentinel is not counted.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.root.next == Link::Root
    }

    /// Returns `true` if `node` is currently a member of this list.
    pub fn contains(&self, node: &NodeRef<T>) -> bool {
        self.slot_of(node).is_some()
    }

    /// Returns the front node, or `None` if the list is empty.
    pub fn front(&self) -> Option<NodeRef<T>> {
        self.handle_at(self.root.next)
    }

    /// Returns the back node, or `None` if the list is empty.
    pub fn back(&self) -> Option<NodeRef<T>> {
        self.handle_at(self.root.prev)
    }

    /// Returns the node after `node`.
    ///
    /// `None` at the back of the list, and for nodes that are not members.
    pub fn next(&self, node: &NodeRef<T>) -> Option<NodeRef<T>> {
        let slot = self.slot_of(node)?;
        let links = self.arena.get(slot)?.links;
        self.handle_at(links.next)
    }

    /// Returns the node before `node`.
    ///
    /// `None` at the front of the list, and for nodes that are not members.
    pub fn prev(&self, node: &NodeRef<T>) -> Option<NodeRef<T>> {
        let slot = self.slot_of(node)?;
        let links = self.arena.get(slot)?.links;
        self.handle_at(links.prev)
    }

    /// Inserts a new node at the front and returns its handle.
    pub fn push_front(&mut self, value: T) -> NodeRef<T> {
        self.insert_after(value, Link::Root)
    }

    /// Inserts a new node at the back and returns its handle.
    pub fn push_back(&mut self, value: T) -> NodeRef<T> {
        let at = self.root.prev;
        self.insert_after(value, at)
    }

    /// Removes `node` from the list and returns its payload.
    ///
    /// If `node` is not a member of this list the list is left untouched and
    /// the payload is returned all the same. A returned value therefore does
    /// not mean a removal took place; use [`contains`](Self::contains) first
    /// when that matters.
    pub fn remove(&mut self, node: &NodeRef<T>) -> Arc<T> {
        if let Some(slot) = self.slot_of(node) {
            self.unlink(slot);
            self.arena.remove(slot);
        }
        Arc::clone(&node.value)
    }

    /// Moves `node` to the front.
    ///
    /// Returns `false` without touching the list if `node` is not a member.
    pub fn move_to_front(&mut self, node: &NodeRef<T>) -> bool {
        let Some(slot) = self.slot_of(node) else {
            return false;
        };
        if self.root.next == Link::Node(slot) {
            return true;
        }
        self.unlink(slot);
        self.link_after(slot, Link::Root);
        true
    }

    /// Moves `node` to the back.
    ///
    /// Returns `false` without touching the list if `node` is not a member.
    pub fn move_to_back(&mut self, node: &NodeRef<T>) -> bool {
        let Some(slot) = self.slot_of(node) else {
            return false;
        };
        if self.root.prev == Link::Node(slot) {
            return true;
        }
        self.unlink(slot);
        let at = self.root.prev;
        self.link_after(slot, at);
        true
    }

    /// Returns an iterator over payloads from front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            current: self.root.next,
        }
    }

    /// Walks the ring and verifies link symmetry and the length counter.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut prev = Link::Root;
        let mut current = self.root.next;
        let mut count = 0usize;

        while let Link::Node(slot) = current {
            let node = self.arena.get(slot).ok_or_else(|| {
                InvariantError::new(format!("ring links to freed slot {}", slot.index()))
            })?;
            if node.links.prev != prev {
                return Err(InvariantError::new(format!(
                    "slot {} prev link does not point back at its predecessor",
                    slot.index()
                )));
            }
            count += 1;
            if count > self.len() {
                return Err(InvariantError::new(format!(
                    "ring holds more than {} nodes",
                    self.len()
                )));
            }
            prev = current;
            current = node.links.next;
        }

        if self.root.prev != prev {
            return Err(InvariantError::new(
                "root prev link does not point at the last node",
            ));
        }
        if count != self.len() {
            return Err(InvariantError::new(format!(
                "ring holds {} nodes but length is {}",
                count,
                self.len()
            )));
        }
        Ok(())
    }

    fn slot_of(&self, node: &NodeRef<T>) -> Option<SlotId> {
        match node.membership {
            Some((list, slot)) if list == self.id && self.arena.contains(slot) => Some(slot),
            _ => None,
        }
    }

    fn handle_at(&self, link: Link) -> Option<NodeRef<T>> {
        let Link::Node(slot) = link else {
            return None;
        };
        self.arena.get(slot).map(|node| NodeRef {
            membership: Some((self.id, slot)),
            value: Arc::clone(&node.value),
        })
    }

    fn links(&self, link: Link) -> Option<Links> {
        match link {
            Link::Root => Some(self.root),
            Link::Node(slot) => self.arena.get(slot).map(|node| node.links),
        }
    }

    fn links_mut(&mut self, link: Link) -> Option<&mut Links> {
        match link {
            Link::Root => Some(&mut self.root),
            Link::Node(slot) => self.arena.get_mut(slot).map(|node| &mut node.links),
        }
    }

    fn set_next(&mut self, link: Link, next: Link) {
        if let Some(links) = self.links_mut(link) {
            links.next = next;
        }
    }

    fn set_prev(&mut self, link: Link, prev: Link) {
        if let Some(links) = self.links_mut(link) {
            links.prev = prev;
        }
    }

    fn insert_after(&mut self, value: T, at: Link) -> NodeRef<T> {
        let next = self.links(at).map_or(Link::Root, |links| links.next);
        let value = Arc::new(value);
        let slot = self.arena.insert(Node {
            value: Arc::clone(&value),
            links: Links { prev: at, next },
        });
        self.set_next(at, Link::Node(slot));
        self.set_prev(next, Link::Node(slot));
        NodeRef {
            membership: Some((self.id, slot)),
            value,
        }
    }

    /// Splices the neighbours of `slot` together. The node's own links are
    /// left stale; callers relink or free it.
    fn unlink(&mut self, slot: SlotId) {
        let Some(links) = self.links(Link::Node(slot)) else {
            return;
        };
        self.set_next(links.prev, links.next);
        self.set_prev(links.next, links.prev);
    }

    fn link_after(&mut self, slot: SlotId, at: Link) {
        let next = self.links(at).map_or(Link::Root, |links| links.next);
        if let Some(links) = self.links_mut(Link::Node(slot)) {
            *links = Links { prev: at, next };
        }
        self.set_next(at, Link::Node(slot));
        self.set_prev(next, Link::Node(slot));
    }
}

impl<T> Default for IntrusiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for IntrusiveList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntrusiveList")
            .field("id", &self.id)
            .field("len", &self.len())
            .field("values", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// Iterator over payloads from front to back.
pub struct Iter<'a, T> {
    list: &'a IntrusiveList<T>,
    current: Link,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let Link::Node(slot) = self.current else {
            return None;
        };
        let node = self.list.arena.get(slot)?;
        self.current = node.links.next;
        Some(node.value.as_ref())
    }
}

impl<'a, T> IntoIterator for &'a IntrusiveList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
