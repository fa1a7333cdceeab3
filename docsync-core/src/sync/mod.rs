//! Keeps the canonical document, the editor markup and the persisted copy in
//! agreement.
//!
//! - [`engine`]: the state machine driven by widget edits
//! - [`debounce`]: the single save deadline
//! - [`clock`]: injectable time source
//! - [`persistence`]: snapshot payload and sink trait

pub mod clock;
pub mod debounce;
pub mod engine;
pub mod persistence;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{SyncEngine, SyncError, SyncFailure, SyncOptions, SyncState, UpdateOutcome};
pub use persistence::{ChannelSink, PersistError, PersistenceSink, Snapshot};
