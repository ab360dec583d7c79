//! Event-driven synchronization between the map document, its fills and
//! the leader map.

mod cancel;
mod event;
mod loader;
mod orchestrator;
mod runtime;

pub use cancel::{CancelScope, CancelToken};
pub use event::MapEvent;
pub use loader::{DocumentLoader, Loaded, MapSource};
pub use orchestrator::{FeedStatus, MapState, MapSync, SyncListener};
pub use runtime::MapRuntime;
