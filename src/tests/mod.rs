//! Scenario tests that drive the engine through host lifecycles.


use crate::clock::ManualClock;
use crate::config::Config;
use crate::engine::WatchFaceEngine;
use crate::sync::DataLayer;
use std::cell::RefCell;
use std::rc::Rc;

/// Call log shared between a test and the engine's data layer
#[derive(Debug, Default)]
pub struct LayerCalls {
    pub connects: u32,
    pub disconnects: u32,
    pub adds: u32,
    pub removes: u32,
}

/// Data layer that only records what the engine asked of it
#[derive(Clone, Debug, Default)]
pub struct RecordingDataLayer {
    pub calls: Rc<RefCell<LayerCalls>>,
}

impl DataLayer for RecordingDataLayer {
    fn connect(&mut self) {
        self.calls.borrow_mut().connects += 1;
    }

    fn disconnect(&mut self) {
        self.calls.borrow_mut().disconnects += 1;
    }

    fn add_listener(&mut self) {
        self.calls.borrow_mut().adds += 1;
    }

    fn remove_listener(&mut self) {
        self.calls.borrow_mut().removes += 1;
    }
}

pub type TestEngine = WatchFaceEngine<RecordingDataLayer, ManualClock>;

/// Engine at 2024-03-03 09:05:42.250 UTC plus handles to its collaborators
pub fn test_engine() -> (TestEngine, RecordingDataLayer, ManualClock) {
    let layer = RecordingDataLayer::default();
    let clock = ManualClock::new(1_709_456_742_250);
    let engine = WatchFaceEngine::create(&Config::default(), layer.clone(), clock.clone());
    (engine, layer, clock)
}
