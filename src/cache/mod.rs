pub mod rsvp;
pub mod storage;

pub use rsvp::{AdminTokenSlot, RsvpCache};
pub use storage::{FileStorage, KeyValueStore};
