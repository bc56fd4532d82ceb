use std::collections::VecDeque;

use crate::{
    action::types::{ExecId, ExecutionRecord},
    error::{PlanningError, invalid},
};

/// Fixed-capacity ring of execution records.
///
/// Unlike every other bounded table in this crate, a full ring is not an
/// error: pushing evicts the oldest record.
#[derive(Debug, Clone)]
pub struct ExecutionHistory {
    capacity: usize,
    records: VecDeque<ExecutionRecord>,
}

impl ExecutionHistory {
    pub fn new(capacity: usize) -> Result<Self, PlanningError> {
        if capacity == 0 {
            return Err(invalid("execution history capacity must be at least 1"));
        }
        Ok(Self {
            capacity,
            records: VecDeque::with_capacity(capacity),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a record and returns the one it evicted, if any.
    pub fn push(&mut self, record: ExecutionRecord) -> Option<ExecutionRecord> {
        let evicted = if self.records.len() >= self.capacity {
            self.records.pop_front()
        } else {
            None
        };
        self.records.push_back(record);
        evicted
    }

    pub fn get(&self, exec_id: ExecId) -> Option<&ExecutionRecord> {
        self.records.iter().find(|record| record.exec_id == exec_id)
    }

    pub fn get_mut(&mut self, exec_id: ExecId) -> Option<&mut ExecutionRecord> {
        self.records
            .iter_mut()
            .find(|record| record.exec_id == exec_id)
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.records.iter()
    }
}
