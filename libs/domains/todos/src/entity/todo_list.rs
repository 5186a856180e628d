use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::TodoError;
use crate::models::{AuditFields, Colour, TodoList};
use crate::repository::WriteOp;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "todo_lists")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub colour: String,
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

impl TryFrom<Model> for TodoList {
    type Error = TodoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let colour = Colour::from_code(&model.colour)
            .map_err(|e| TodoError::Database(format!("todo list {}: {}", model.id, e)))?;

        Ok(Self {
            id: model.id,
            title: model.title,
            colour,
            audit: AuditFields {
                created_on: model.created_on,
                created_by: model.created_by,
                last_modified_on: model.last_modified_on,
                last_modified_by: model.last_modified_by,
                deleted_on: model.deleted_on,
                deleted_by: model.deleted_by,
            },
        })
    }
}

/// Inserts leave the id to the database; updates never touch the created stamps.
pub fn to_active_model(list: TodoList, op: WriteOp) -> ActiveModel {
    let AuditFields {
        created_on,
        created_by,
        last_modified_on,
        last_modified_by,
        deleted_on,
        deleted_by,
    } = list.audit;
    let (id, created_on, created_by) = match op {
        WriteOp::Insert => (NotSet, Set(created_on), Set(created_by)),
        WriteOp::Update => (Set(list.id), NotSet, NotSet),
    };

    ActiveModel {
        id,
        title: Set(list.title),
        colour: Set(list.colour.code().to_string()),
        created_on,
        created_by,
        last_modified_on: Set(last_modified_on),
        last_modified_by: Set(last_modified_by),
        deleted_on: Set(deleted_on),
        deleted_by: Set(deleted_by),
    }
}
