//! # Device Data-Layer Sync
//!
//! The companion app publishes small key-value records ("data items") at
//! well-known paths. The watch side connects to the data layer, registers a
//! listener, and receives change events. This module defines the payload
//! types, the [`DataLayer`] seam the engine talks to, and [`LinkDataLayer`],
//! the in-process link the binary uses.
//!
//! Connecting is asynchronous: `connect` only starts the attempt, and the
//! outcome comes back later as a [`ConnectionEvent`] through the host loop.

use crate::host::HostEvent;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::mpsc::UnboundedSender;

/// A single value in a data item
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

/// Key-value payload of a data item
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataMap(BTreeMap<String, DataValue>);

impl DataMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_string(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), DataValue::Text(value.into()));
    }

    pub fn put_int(&mut self, key: &str, value: i64) {
        self.0.insert(key.to_string(), DataValue::Int(value));
    }

    /// String value, `None` if absent or of another type
    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(DataValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Integer value, `None` if absent, of another type, or out of `i32` range
    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.0.get(key) {
            Some(DataValue::Int(v)) => i32::try_from(*v).ok(),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataEventKind {
    Changed,
    Deleted,
}

/// A change to the data item at `path`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataEvent {
    pub kind: DataEventKind,
    pub path: String,
    #[serde(default)]
    pub data: DataMap,
}

impl DataEvent {
    pub fn changed(path: &str, data: DataMap) -> Self {
        Self {
            kind: DataEventKind::Changed,
            path: path.to_string(),
            data,
        }
    }
}

/// Outcome of a connection attempt, delivered after `connect`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionEvent {
    Connected,
    Suspended(i32),
    Failed(String),
}

/// The data-layer transport as seen by the engine
pub trait DataLayer {
    /// Start connecting; the result arrives as a [`ConnectionEvent`]
    fn connect(&mut self);

    fn disconnect(&mut self);

    /// Start delivering data events to the engine
    fn add_listener(&mut self);

    fn remove_listener(&mut self);
}

/// Data layer backed by the host loop's own event channel.
///
/// The companion feed writes data events into the same channel, so this link
/// only has to report connection outcomes.
#[derive(Debug)]
pub struct LinkDataLayer {
    events: UnboundedSender<HostEvent>,
    connected: bool,
    listening: bool,
}

impl LinkDataLayer {
    pub fn new(events: UnboundedSender<HostEvent>) -> Self {
        Self {
            events,
            connected: false,
            listening: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }
}

impl DataLayer for LinkDataLayer {
    fn connect(&mut self) {
        let outcome = ConnectionEvent::Connected;
        match self.events.send(HostEvent::Connection(outcome)) {
            Ok(()) => self.connected = true,
            Err(e) => warn!("Data layer connect failed: host loop is gone ({})", e),
        }
    }

    fn disconnect(&mut self) {
        self.connected = false;
        debug!("Data layer disconnected");
    }

    fn add_listener(&mut self) {
        self.listening = true;
    }

    fn remove_listener(&mut self) {
        self.listening = false;
    }
}
