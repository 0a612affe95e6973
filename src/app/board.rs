//! Pure board projections: column grouping, table rows, sorting, and
//! due-date urgency classification.

use std::cmp::Ordering;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::types::{Column, Priority, Status, Task, TaskKind, Urgency};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug)]
pub struct ColumnGroup<'a> {
    pub column: &'a Column,
    pub tasks: Vec<&'a Task>,
}

/// Group tasks into columns by exact id match, preserving column order.
/// Columns with no tasks yield empty groups so the view can render an
/// explicit empty state.
pub fn column_groups<'a>(columns: &'a [Column], tasks: &'a [Task]) -> Vec<ColumnGroup<'a>> {
    columns
        .iter()
        .map(|column| ColumnGroup {
            column,
            tasks: tasks
                .iter()
                .filter(|task| task.column_id == column.id)
                .collect(),
        })
        .collect()
}

/// Date-only comparison against today; time of day never matters.
pub fn due_date_urgency(due_date: Option<&str>, today: NaiveDate) -> Urgency {
    let Some(raw) = due_date else {
        return Urgency::None;
    };
    let Ok(date) = NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) else {
        return Urgency::None;
    };
    match date.cmp(&today) {
        Ordering::Less => Urgency::Overdue,
        Ordering::Equal => Urgency::DueToday,
        Ordering::Greater => Urgency::Upcoming,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub task_id: Uuid,
    pub title: String,
    pub assignee: String,
    pub request_date: String,
    pub status: Status,
    pub priority: Priority,
    pub kind: TaskKind,
    pub client: String,
    pub due_date: String,
    pub urgency: Urgency,
}

/// One row per task regardless of column.
pub fn table_rows(
    tasks: &[Task],
    assignee_name: impl Fn(Option<Uuid>) -> Option<String>,
    today: NaiveDate,
) -> Vec<TableRow> {
    tasks
        .iter()
        .map(|task| TableRow {
            task_id: task.id,
            title: task.title.clone(),
            assignee: assignee_name(task.assignee_id).unwrap_or_default(),
            request_date: task.request_date.clone().unwrap_or_default(),
            status: task.status,
            priority: task.priority,
            kind: task.kind,
            client: task.client.clone().unwrap_or_default(),
            due_date: task.due_date.clone().unwrap_or_default(),
            urgency: due_date_urgency(task.due_date.as_deref(), today),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Title,
    Assignee,
    RequestDate,
    Status,
    Priority,
    Client,
    Kind,
    DueDate,
}

impl SortColumn {
    pub const ALL: [SortColumn; 8] = [
        SortColumn::Title,
        SortColumn::Assignee,
        SortColumn::RequestDate,
        SortColumn::Status,
        SortColumn::Priority,
        SortColumn::Client,
        SortColumn::Kind,
        SortColumn::DueDate,
    ];

    pub fn header(self) -> &'static str {
        match self {
            SortColumn::Title => "Task",
            SortColumn::Assignee => "Assignee",
            SortColumn::RequestDate => "Requested",
            SortColumn::Status => "Status",
            SortColumn::Priority => "Priority",
            SortColumn::Client => "Client",
            SortColumn::Kind => "Type",
            SortColumn::DueDate => "Due",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableSort {
    pub column: Option<SortColumn>,
    pub direction: SortDirection,
}

impl TableSort {
    /// Selecting the active column flips direction; any other column starts
    /// ascending.
    pub fn toggle(&mut self, column: SortColumn) {
        if self.column == Some(column) {
            self.direction = match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            };
        } else {
            self.column = Some(column);
            self.direction = SortDirection::Ascending;
        }
    }
}

pub fn sort_table_rows(rows: &mut [TableRow], sort: TableSort) {
    let Some(column) = sort.column else {
        return;
    };

    rows.sort_by(|a, b| {
        let ordering = compare_rows(a, b, column);
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn compare_rows(a: &TableRow, b: &TableRow, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Title => compare_cells(&a.title, &b.title),
        SortColumn::Assignee => compare_cells(&a.assignee, &b.assignee),
        SortColumn::RequestDate => compare_cells(&a.request_date, &b.request_date),
        SortColumn::Status => compare_cells(a.status.label(), b.status.label()),
        // Priority orders by severity, not by label text.
        SortColumn::Priority => a.priority.rank().cmp(&b.priority.rank()),
        SortColumn::Client => compare_cells(&a.client, &b.client),
        SortColumn::Kind => compare_cells(a.kind.label(), b.kind.label()),
        SortColumn::DueDate => compare_cells(&a.due_date, &b.due_date),
    }
}

/// Numeric when both cells parse as numbers, date when both parse as dates,
/// else case-insensitive text.
fn compare_cells(a: &str, b: &str) -> Ordering {
    let a = a.trim();
    let b = b.trim();

    let a_num = a.replace(',', ".").parse::<f64>();
    let b_num = b.replace(',', ".").parse::<f64>();
    if let (Ok(a_num), Ok(b_num)) = (a_num, b_num) {
        return a_num.partial_cmp(&b_num).unwrap_or(Ordering::Equal);
    }

    let a_date = NaiveDate::parse_from_str(a, DATE_FORMAT);
    let b_date = NaiveDate::parse_from_str(b, DATE_FORMAT);
    if let (Ok(a_date), Ok(b_date)) = (a_date, b_date) {
        return a_date.cmp(&b_date);
    }

    a.to_lowercase().cmp(&b.to_lowercase())
}
