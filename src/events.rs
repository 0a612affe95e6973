//! Process-wide typed change bus.
//!
//! Mutations publish what changed; subscribers decide how to react. A
//! lagged receiver means events were dropped, and subscribers are expected
//! to fall back to a full reconciliation instead of replaying.

#![allow(dead_code)]

use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::types::ChatMessage;

const DEFAULT_BUS_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOperation {
    Created,
    Updated,
    Moved,
    Completed,
    Deleted,
}

impl TaskOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskOperation::Created => "created",
            TaskOperation::Updated => "updated",
            TaskOperation::Moved => "moved",
            TaskOperation::Completed => "completed",
            TaskOperation::Deleted => "deleted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    TaskChanged {
        task_id: Uuid,
        operation: TaskOperation,
    },
    MessageInserted {
        message: ChatMessage,
    },
}

#[derive(Debug, Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Publishing without subscribers is not an error; the event is dropped.
    pub fn publish(&self, event: ChangeEvent) {
        match self.sender.send(event) {
            Ok(receivers) => debug!(receivers, "published change event"),
            Err(_) => debug!("change event dropped (no subscribers)"),
        }
    }

    pub fn publish_task_change(&self, task_id: Uuid, operation: TaskOperation) {
        self.publish(ChangeEvent::TaskChanged { task_id, operation });
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}
