pub mod codec;
pub mod storage;
pub mod store;

pub use storage::{HistoryStorage, JsonFileStorage, MemoryStorage, SlotUpdate};
pub use store::{HistoryRecovery, HistorySnapshot, HistoryStore};
