pub mod memory;
pub mod realtime;

pub use memory::InMemoryStore;
pub use realtime::RealtimeStore;
