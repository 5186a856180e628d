use async_trait::async_trait;
use mediator::{RequestContext, ValidationFailure, Validator};
use std::borrow::Cow;
use validator::ValidationError;

use crate::commands::{CreateTodoList, UpdateTodoList};
use crate::context::TodoDbContextFactory;
use crate::error::TodoError;
use crate::repository::{TodoListQuery, TodoStore};

pub const TITLE_REQUIRED: &str = "'Title' must not be empty.";
pub const TITLE_TOO_LONG: &str = "'Title' must not exceed 200 characters.";
pub const TITLE_TAKEN: &str = "The specified title already exists.";

/// `#[validate(custom)]` rule rejecting empty or whitespace-only titles.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank").with_message(Cow::Borrowed(TITLE_REQUIRED)));
    }
    Ok(())
}

/// Rejects a list title already used by another live list.
pub struct UniqueListTitle<S: TodoStore + ?Sized> {
    contexts: TodoDbContextFactory<S>,
}

impl<S: TodoStore + ?Sized> UniqueListTitle<S> {
    pub fn new(contexts: TodoDbContextFactory<S>) -> Self {
        Self { contexts }
    }

    async fn check(
        &self,
        query: TodoListQuery,
        ctx: &RequestContext,
    ) -> Result<Vec<ValidationFailure>, TodoError> {
        let mut db = self.contexts.create(ctx);
        let taken = !db.todo_lists().query(query).await?.is_empty();

        Ok(if taken {
            vec![ValidationFailure::new("title", TITLE_TAKEN)]
        } else {
            Vec::new()
        })
    }
}

#[async_trait]
impl<S: TodoStore + ?Sized + 'static> Validator<CreateTodoList, TodoError> for UniqueListTitle<S> {
    async fn validate(
        &self,
        request: &CreateTodoList,
        ctx: &RequestContext,
    ) -> Result<Vec<ValidationFailure>, TodoError> {
        self.check(TodoListQuery::titled(request.title.as_str()), ctx)
            .await
    }
}

#[async_trait]
impl<S: TodoStore + ?Sized + 'static> Validator<UpdateTodoList, TodoError> for UniqueListTitle<S> {
    async fn validate(
        &self,
        request: &UpdateTodoList,
        ctx: &RequestContext,
    ) -> Result<Vec<ValidationFailure>, TodoError> {
        self.check(
            TodoListQuery::titled(request.title.as_str()).excluding(request.id),
            ctx,
        )
        .await
    }
}
