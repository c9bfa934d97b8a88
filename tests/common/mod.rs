//! Shared test infrastructure for segment-sequencer integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use segment_sequencer::{
    DesignerConfig, Frame, KeyValueStore, Packet, Project, Renderer, SequenceId, StepId,
    StorageError, TimeSource, Timestamp, Transport,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Routes library logs to the test harness. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Mock Transport
// ============================================================================

/// Mock transport that records every packet sent
pub struct MockTransport {
    packets: Vec<Packet>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            packets: Vec::new(),
        }
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub fn last_packet(&self) -> Option<&Packet> {
        self.packets.last()
    }
}

impl Transport for MockTransport {
    fn send(&mut self, packet: &Packet) {
        self.packets.push(*packet);
    }
}

// ============================================================================
// Mock Renderer
// ============================================================================

/// Mock renderer that records every frame drawn
pub struct MockRenderer {
    frames: Vec<Frame>,
    silenced: usize,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            silenced: 0,
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn silenced(&self) -> usize {
        self.silenced
    }
}

impl Renderer for MockRenderer {
    fn render(&mut self, frame: &Frame) {
        self.frames.push(*frame);
    }

    fn silence(&mut self) {
        self.silenced += 1;
    }
}

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current_time: Cell<u64>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: Cell::new(0),
        }
    }

    /// Advance time by the given number of milliseconds
    pub fn advance(&self, millis: u64) {
        self.current_time.set(self.current_time.get() + millis);
    }

    pub fn set_time(&self, millis: u64) {
        self.current_time.set(millis);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp(self.current_time.get())
    }
}

// ============================================================================
// Shared Store
// ============================================================================

/// In-memory store whose contents outlive the history that wrote them,
/// standing in for storage that survives a restart.
#[derive(Clone, Default)]
pub struct SharedStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn put_raw(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    /// Makes every subsequent write fail.
    pub fn fail_writes(&self) {
        self.fail_writes.set(true);
    }
}

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

/// Fresh project with default configuration
pub fn new_project() -> Project {
    init_logging();
    Project::new(DesignerConfig::default())
}

/// The current sequence and its first step
pub fn current_ids(project: &Project) -> (SequenceId, StepId) {
    let sequence = project.current_sequence().unwrap();
    (sequence.index(), sequence.steps()[0].index)
}

/// Sets the duration of every step of `sequence` in order, adding steps as needed
pub fn set_durations(project: &mut Project, sequence: SequenceId, durations: &[u32]) -> Vec<StepId> {
    let mut ids: Vec<StepId> = project
        .sequence(sequence)
        .unwrap()
        .steps()
        .iter()
        .map(|s| s.index)
        .collect();
    while ids.len() < durations.len() {
        ids.push(project.add_step(sequence).unwrap());
    }
    for (id, duration) in ids.iter().zip(durations) {
        project.set_step_duration(sequence, *id, *duration).unwrap();
    }
    ids
}

/// Every index in the project, sequences and steps alike
pub fn all_indices(project: &Project) -> Vec<u32> {
    project
        .sequences()
        .iter()
        .flat_map(|s| {
            core::iter::once(s.index().0).chain(s.steps().iter().map(|step| step.index.0))
        })
        .collect()
}
