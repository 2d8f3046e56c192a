//! Undo/redo history.
//!
//! Every entry is a full MessagePack snapshot of the document taken at an
//! explicit `save` call. The top of the undo stack always mirrors the last
//! committed state, so undo pops it and restores the one beneath; redo
//! pushes it back. Intermediate gesture frames never reach this stack.

use fw_core::{Document, EditError};

#[derive(Debug, Clone)]
struct Entry {
    label: String,
    bytes: Vec<u8>,
}

/// Bounded snapshot stacks.
pub struct History {
    undo_stack: Vec<Entry>,
    redo_stack: Vec<Entry>,
    /// Maximum undo depth (the baseline entry is not counted).
    max_depth: usize,
}

fn encode(doc: &Document) -> Result<Vec<u8>, EditError> {
    rmp_serde::to_vec_named(doc).map_err(|e| EditError::Snapshot(e.to_string()))
}

fn decode(bytes: &[u8]) -> Result<Document, EditError> {
    rmp_serde::from_slice(bytes).map_err(|e| EditError::Snapshot(e.to_string()))
}

impl History {
    /// Start a history whose baseline is `doc`.
    pub fn new(doc: &Document, max_depth: usize) -> Result<Self, EditError> {
        let mut history = Self {
            undo_stack: Vec::with_capacity(max_depth.min(64) + 1),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        };
        history.reset(doc)?;
        Ok(history)
    }

    /// Drop every entry and make `doc` the new baseline.
    pub fn reset(&mut self, doc: &Document) -> Result<(), EditError> {
        let bytes = encode(doc)?;
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.undo_stack.push(Entry {
            label: "initial".to_string(),
            bytes,
        });
        Ok(())
    }

    /// Commit `doc` under `label`. Returns `false` (and records nothing) when
    /// the document is byte-identical to the last committed state.
    pub fn save(&mut self, label: &str, doc: &Document) -> Result<bool, EditError> {
        let bytes = encode(doc)?;
        if self.undo_stack.last().is_some_and(|top| top.bytes == bytes) {
            return Ok(false);
        }
        self.undo_stack.push(Entry {
            label: label.to_string(),
            bytes,
        });
        if self.undo_stack.len() > self.max_depth + 1 {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
        log::debug!("history: saved \"{label}\" ({} entries)", self.undo_stack.len());
        Ok(true)
    }

    /// Step back one entry. Returns the undone label and the state to restore.
    pub fn undo(&mut self) -> Result<Option<(String, Document)>, EditError> {
        if self.undo_stack.len() < 2 {
            return Ok(None);
        }
        let restore = decode(&self.undo_stack[self.undo_stack.len() - 2].bytes)?;
        let Some(entry) = self.undo_stack.pop() else {
            return Ok(None);
        };
        let label = entry.label.clone();
        self.redo_stack.push(entry);
        Ok(Some((label, restore)))
    }

    /// Re-apply the most recently undone entry.
    pub fn redo(&mut self) -> Result<Option<(String, Document)>, EditError> {
        let Some(entry) = self.redo_stack.last() else {
            return Ok(None);
        };
        let restore = decode(&entry.bytes)?;
        let Some(entry) = self.redo_stack.pop() else {
            return Ok(None);
        };
        let label = entry.label.clone();
        self.undo_stack.push(entry);
        Ok(Some((label, restore)))
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Labels of undoable entries, oldest first.
    pub fn labels(&self) -> Vec<&str> {
        self.undo_stack
            .iter()
            .skip(1)
            .map(|e| e.label.as_str())
            .collect()
    }
}
