use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{AuditFields, PriorityLevel, TodoItem};
use crate::repository::WriteOp;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "todo_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub list_id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub note: Option<String>,
    pub priority: PriorityLevel,
    pub reminder: Option<DateTimeUtc>,
    pub done: bool,
    pub created_on: DateTimeUtc,
    pub created_by: i64,
    pub last_modified_on: Option<DateTimeUtc>,
    pub last_modified_by: Option<i64>,
    pub deleted_on: Option<DateTimeUtc>,
    pub deleted_by: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for TodoItem {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            list_id: model.list_id,
            title: model.title,
            note: model.note,
            priority: model.priority,
            reminder: model.reminder,
            done: model.done,
            audit: AuditFields {
                created_on: model.created_on,
                created_by: model.created_by,
                last_modified_on: model.last_modified_on,
                last_modified_by: model.last_modified_by,
                deleted_on: model.deleted_on,
                deleted_by: model.deleted_by,
            },
        }
    }
}

pub fn to_active_model(item: TodoItem, op: WriteOp) -> ActiveModel {
    let audit = item.audit;
    let (id, created_on, created_by) = match op {
        WriteOp::Insert => (NotSet, Set(audit.created_on), Set(audit.created_by)),
        WriteOp::Update => (Set(item.id), NotSet, NotSet),
    };

    ActiveModel {
        id,
        list_id: Set(item.list_id),
        title: Set(item.title),
        note: Set(item.note),
        priority: Set(item.priority),
        reminder: Set(item.reminder),
        done: Set(item.done),
        created_on,
        created_by,
        last_modified_on: Set(audit.last_modified_on),
        last_modified_by: Set(audit.last_modified_by),
        deleted_on: Set(audit.deleted_on),
        deleted_by: Set(audit.deleted_by),
    }
}
