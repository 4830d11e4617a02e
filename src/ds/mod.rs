pub mod intrusive_list;
pub mod slot_arena;

pub use intrusive_list::{IntrusiveList, ListId, NodeRef};
pub use slot_arena::{SlotArena, SlotId};
