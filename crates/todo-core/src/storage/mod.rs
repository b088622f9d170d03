//! Local storage layer
//!
//! Handles the key-value slots the client keeps on this machine.
//! The only slot in use holds the display order as a JSON array of ids.

pub mod error;
pub mod slot;

pub use error::{StorageError, StorageResult};
pub use slot::{FileSlotStore, MemorySlotStore, SlotStore};
