use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

use crate::events::TodoEventKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Colour \"{0}\" is unsupported.")]
pub struct UnsupportedColourError(pub String);

/// A list colour. Only the palette below can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Colour {
    #[default]
    White,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Grey,
}

impl Colour {
    pub const SUPPORTED: [Colour; 8] = [
        Colour::White,
        Colour::Red,
        Colour::Orange,
        Colour::Yellow,
        Colour::Green,
        Colour::Blue,
        Colour::Purple,
        Colour::Grey,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Colour::White => "#FFFFFF",
            Colour::Red => "#FF5733",
            Colour::Orange => "#FFC300",
            Colour::Yellow => "#FFFF66",
            Colour::Green => "#CCFF99",
            Colour::Blue => "#6666FF",
            Colour::Purple => "#9966CC",
            Colour::Grey => "#999999",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, UnsupportedColourError> {
        Self::SUPPORTED
            .into_iter()
            .find(|colour| colour.code() == code)
            .ok_or_else(|| UnsupportedColourError(code.to_string()))
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Colour {
    type Err = UnsupportedColourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl TryFrom<String> for Colour {
    type Error = UnsupportedColourError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_code(&value)
    }
}

impl From<Colour> for String {
    fn from(colour: Colour) -> Self {
        colour.code().to_string()
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum PriorityLevel {
    #[default]
    #[sea_orm(num_value = 0)]
    None,
    #[sea_orm(num_value = 1)]
    Low,
    #[sea_orm(num_value = 2)]
    Medium,
    #[sea_orm(num_value = 3)]
    High,
}

impl PriorityLevel {
    pub const ALL: [PriorityLevel; 4] = [
        PriorityLevel::None,
        PriorityLevel::Low,
        PriorityLevel::Medium,
        PriorityLevel::High,
    ];

    pub fn value(&self) -> i32 {
        match self {
            PriorityLevel::None => 0,
            PriorityLevel::Low => 1,
            PriorityLevel::Medium => 2,
            PriorityLevel::High => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PriorityLevel::None => "None",
            PriorityLevel::Low => "Low",
            PriorityLevel::Medium => "Medium",
            PriorityLevel::High => "High",
        }
    }
}

/// Creation, modification and soft-delete stamps shared by every entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFields {
    pub created_on: DateTime<Utc>,
    pub created_by: i64,
    pub last_modified_on: Option<DateTime<Utc>>,
    pub last_modified_by: Option<i64>,
    pub deleted_on: Option<DateTime<Utc>>,
    pub deleted_by: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    /// Zero until the list is first saved
    pub id: i64,
    pub title: String,
    pub colour: Colour,
    pub audit: AuditFields,
}

impl TodoList {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            colour: Colour::default(),
            audit: AuditFields::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: i64,
    pub list_id: i64,
    pub title: String,
    pub note: Option<String>,
    pub priority: PriorityLevel,
    pub reminder: Option<DateTime<Utc>>,
    pub done: bool,
    pub audit: AuditFields,
}

impl TodoItem {
    pub fn new(list_id: i64, title: impl Into<String>) -> Self {
        Self {
            id: 0,
            list_id,
            title: title.into(),
            note: None,
            priority: PriorityLevel::default(),
            reminder: None,
            done: false,
            audit: AuditFields::default(),
        }
    }

    /// Sets the done flag. Completing an open item yields the event to record.
    pub fn set_done(&mut self, done: bool) -> Option<TodoEventKind> {
        let completed = done && !self.done;
        self.done = done;
        completed.then_some(TodoEventKind::ItemCompleted)
    }
}

// ---------------------------------------------------------------------------
// Read models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LookupDto {
    pub id: i32,
    pub title: String,
}

impl From<PriorityLevel> for LookupDto {
    fn from(level: PriorityLevel) -> Self {
        Self {
            id: level.value(),
            title: level.name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TodoItemDto {
    pub id: i64,
    pub list_id: i64,
    pub title: String,
    pub done: bool,
    pub priority: PriorityLevel,
    pub note: Option<String>,
}

impl From<TodoItem> for TodoItemDto {
    fn from(item: TodoItem) -> Self {
        Self {
            id: item.id,
            list_id: item.list_id,
            title: item.title,
            done: item.done,
            priority: item.priority,
            note: item.note,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TodoListDto {
    pub id: i64,
    pub title: String,
    #[schema(value_type = String, example = "#FFFFFF")]
    pub colour: Colour,
    pub items: Vec<TodoItemDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TodosVm {
    pub priority_levels: Vec<LookupDto>,
    pub lists: Vec<TodoListDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TodoItemBriefDto {
    pub id: i64,
    pub list_id: i64,
    pub title: String,
    pub done: bool,
}

impl From<TodoItem> for TodoItemBriefDto {
    fn from(item: TodoItem) -> Self {
        Self {
            id: item.id,
            list_id: item.list_id,
            title: item.title,
            done: item.done,
        }
    }
}
