use chrono::{DateTime, Utc};
use serde::Serialize;

/// One line of the team messages box
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub text: String,
    pub color: String,
    pub font_size: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    Paid,
    Unpaid,
    Pending,
    Unknown,
}

impl TodoStatus {
    /// Map a sheet cell: `1`, `0`, `-1`, anything else
    pub fn from_cell(cell: &str) -> Self {
        match cell.trim() {
            "1" => Self::Paid,
            "0" => Self::Unpaid,
            "-1" => Self::Pending,
            _ => Self::Unknown,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Paid => "✔",
            Self::Unpaid => "✘",
            Self::Pending => "⧖",
            Self::Unknown => "?",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TodoCell {
    pub status: TodoStatus,
    pub icon: &'static str,
}

impl From<TodoStatus> for TodoCell {
    fn from(status: TodoStatus) -> Self {
        Self {
            status,
            icon: status.icon(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TodoRow {
    pub label: String,
    pub cells: Vec<TodoCell>,
}

/// Status table read from the todo sheet
#[derive(Debug, Clone, Serialize)]
pub struct TodoTable {
    pub heading: String,
    pub headers: Vec<String>,
    pub rows: Vec<TodoRow>,
}

/// Messages box content
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessagesView {
    pub messages: Vec<Message>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Set when the latest refresh failed; `messages` then holds the previous content
    pub error: Option<String>,
}

/// Todo box content
#[derive(Debug, Clone, Default, Serialize)]
pub struct TodoView {
    /// `None` until a sheet with at least a heading and header row is read
    pub table: Option<TodoTable>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Empty-state or error text for the display
    pub notice: Option<String>,
    pub error: Option<String>,
}
