//! The persistence boundary.
//!
//! The engine hands a full [`Snapshot`] of the document to a
//! [`PersistenceSink`] whenever a save is due. Sinks must not block on slow
//! I/O: a sink that talks to a network service should enqueue the snapshot
//! (see [`ChannelSink`]) and let another task do the write.

use crate::model::DocumentJson;
use serde::Serialize;
use std::sync::mpsc::{self, Receiver, Sender};
use thiserror::Error;

/// Owned payload handed to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub document: DocumentJson,
    pub plain_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    #[error("persistence backend failed: {0}")]
    Backend(String),
    #[error("persistence channel is disconnected")]
    Disconnected,
}

pub trait PersistenceSink {
    fn persist(&mut self, snapshot: Snapshot) -> Result<(), PersistError>;
}

impl<F> PersistenceSink for F
where
    F: FnMut(Snapshot) -> Result<(), PersistError>,
{
    fn persist(&mut self, snapshot: Snapshot) -> Result<(), PersistError> {
        self(snapshot)
    }
}

/// Sink that forwards snapshots over an mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<Snapshot>,
}

impl ChannelSink {
    /// Create a sink together with the receiving end for the writer task.
    pub fn channel() -> (Self, Receiver<Snapshot>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl PersistenceSink for ChannelSink {
    fn persist(&mut self, snapshot: Snapshot) -> Result<(), PersistError> {
        self.sender
            .send(snapshot)
            .map_err(|_| PersistError::Disconnected)
    }
}
