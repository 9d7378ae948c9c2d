//! Accumulated, user-visible decoded output
//!
//! Two layouts are supported:
//! - **Stream**: one growing string; unit boundaries are lost once merged
//! - **Records**: one timestamped record per append, kept newest-first or
//!   oldest-first
//!
//! The layout and ordering are chosen once per monitor and never change,
//! so the order the user sees is stable for the whole session. The buffer
//! survives reconnects and is only emptied by `clear()`.

use actor_protocol::{DisplayDelta, ReceivedRecord};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Where new records go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordOrder {
    /// New records are prepended (latest reading on top)
    #[default]
    NewestFirst,
    /// New records are appended (log order)
    OldestFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Single append-only text blob
    Stream,
    /// Discrete timestamped records
    Records(RecordOrder),
}

impl Default for DisplayMode {
    fn default() -> Self {
        Self::Records(RecordOrder::default())
    }
}

#[derive(Debug, Clone)]
pub struct DisplayBuffer {
    mode: DisplayMode,
    text: String,
    records: VecDeque<ReceivedRecord>,
    // Never reset by clear(), so ids stay unique for the monitor's lifetime
    next_id: u64,
}

impl DisplayBuffer {
    pub fn new(mode: DisplayMode) -> Self {
        Self {
            mode,
            text: String::new(),
            records: VecDeque::new(),
            next_id: 1,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Add one received unit and return the change for the presentation layer
    ///
    /// `received_at_us` is only kept in record mode.
    pub fn append(&mut self, text: String, received_at_us: u64) -> DisplayDelta {
        match self.mode {
            DisplayMode::Stream => {
                self.text.push_str(&text);
                DisplayDelta::TextAppended { text }
            }
            DisplayMode::Records(order) => {
                let record = ReceivedRecord {
                    id: self.next_id,
                    text,
                    received_at_us,
                };
                self.next_id = self.next_id.wrapping_add(1);

                match order {
                    RecordOrder::NewestFirst => self.records.push_front(record.clone()),
                    RecordOrder::OldestFirst => self.records.push_back(record.clone()),
                }
                DisplayDelta::Appended(record)
            }
        }
    }

    /// Drop everything; connection state is not touched
    pub fn clear(&mut self) -> DisplayDelta {
        self.text.clear();
        self.records.clear();
        DisplayDelta::Cleared
    }

    /// Number of records, or bytes of text in stream mode
    pub fn size(&self) -> usize {
        match self.mode {
            DisplayMode::Stream => self.text.len(),
            DisplayMode::Records(_) => self.records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Accumulated text (stream mode; empty in record mode)
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Records in display order (record mode; empty in stream mode)
    pub fn records(&self) -> impl Iterator<Item = &ReceivedRecord> {
        self.records.iter()
    }
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new(DisplayMode::default())
    }
}
