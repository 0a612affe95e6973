//! Card movement between columns, shared by mouse drag and keyboard moves.

use anyhow::Result;
use uuid::Uuid;

use crate::db::Database;
use crate::events::{ChangeBus, TaskOperation};
use crate::types::{Column, Task};

/// Drag lifecycle for the board view. The task id is captured at drag
/// start and held until release; hover tracks the column under the cursor
/// for highlighting.
#[derive(Debug, Default)]
pub struct MoveController {
    dragging: Option<Uuid>,
    hover_column: Option<Uuid>,
}

impl MoveController {
    pub fn begin_drag(&mut self, task_id: Uuid) {
        self.dragging = Some(task_id);
        self.hover_column = None;
    }

    pub fn dragging(&self) -> Option<Uuid> {
        self.dragging
    }

    pub fn hover(&mut self, column_id: Option<Uuid>) {
        if self.dragging.is_some() {
            self.hover_column = column_id;
        }
    }

    pub fn hovered_column(&self) -> Option<Uuid> {
        self.hover_column
    }

    pub fn cancel(&mut self) {
        self.dragging = None;
        self.hover_column = None;
    }

    /// Release over a column. Clears the drag either way; the move only
    /// happens when a task was actually captured.
    pub fn drop_on(
        &mut self,
        db: &Database,
        bus: &ChangeBus,
        column_id: Uuid,
    ) -> Result<Option<Task>> {
        let Some(task_id) = self.dragging.take() else {
            self.hover_column = None;
            return Ok(None);
        };
        self.hover_column = None;

        let task = move_task_to_column(db, bus, task_id, column_id)?;
        Ok(Some(task))
    }
}

/// The one move path: persist the combined column+status update, then
/// publish the change. The view catches up through reconciliation, not
/// through an optimistic patch.
pub fn move_task_to_column(
    db: &Database,
    bus: &ChangeBus,
    task_id: Uuid,
    column_id: Uuid,
) -> Result<Task> {
    let task = db.move_task(task_id, column_id)?;
    bus.publish_task_change(task.id, TaskOperation::Moved);
    Ok(task)
}

/// Keyboard move by column offset. Returns None when already at the edge.
pub fn shift_task(
    db: &Database,
    bus: &ChangeBus,
    columns: &[Column],
    task: &Task,
    delta: i64,
) -> Result<Option<Task>> {
    let Some(current) = columns.iter().position(|c| c.id == task.column_id) else {
        return Ok(None);
    };

    let target = current as i64 + delta;
    if target < 0 || target >= columns.len() as i64 {
        return Ok(None);
    }

    let moved = move_task_to_column(db, bus, task.id, columns[target as usize].id)?;
    Ok(Some(moved))
}
