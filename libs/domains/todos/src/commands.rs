//! State-changing requests and their handlers.

use async_trait::async_trait;
use mediator::{CrudResult, RequestContext, RequestHandler, command};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::context::TodoDbContextFactory;
use crate::error::{TodoError, TodoResult};
use crate::events::{DomainEvents, TodoEventKind};
use crate::models::{PriorityLevel, TodoItem, TodoList};
use crate::repository::{TodoListQuery, TodoStore};
use crate::validators::not_blank;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema, Validate)]
pub struct CreateTodoList {
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "'Title' must not exceed 200 characters.")
    )]
    pub title: String,
}

command!(CreateTodoList => i64);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema, Validate)]
pub struct UpdateTodoList {
    pub id: i64,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "'Title' must not exceed 200 characters.")
    )]
    pub title: String,
}

command!(UpdateTodoList);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct DeleteTodoList {
    pub id: i64,
}

command!(DeleteTodoList);

/// Soft-deletes every live list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PurgeTodoLists;

command!(PurgeTodoLists);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema, Validate)]
pub struct CreateTodoItem {
    pub list_id: i64,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "'Title' must not exceed 200 characters.")
    )]
    pub title: String,
}

command!(CreateTodoItem => i64);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema, Validate)]
pub struct UpdateTodoItem {
    pub id: i64,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "'Title' must not exceed 200 characters.")
    )]
    pub title: String,
    pub done: bool,
}

command!(UpdateTodoItem);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct UpdateTodoItemDetail {
    pub id: i64,
    pub list_id: i64,
    pub priority: PriorityLevel,
    pub note: Option<String>,
}

command!(UpdateTodoItemDetail);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct DeleteTodoItem {
    pub id: i64,
}

command!(DeleteTodoItem);

pub(crate) fn list_not_found<T>(id: i64) -> CrudResult<T> {
    CrudResult::not_found(format!("Todo list {} was not found", id))
}

pub(crate) fn item_not_found<T>(id: i64) -> CrudResult<T> {
    CrudResult::not_found(format!("Todo item {} was not found", id))
}

/// Handles every todo command and query against one store.
pub struct TodoHandler<S: TodoStore + ?Sized> {
    pub(crate) contexts: TodoDbContextFactory<S>,
}

impl<S: TodoStore + ?Sized> TodoHandler<S> {
    pub fn new(contexts: TodoDbContextFactory<S>) -> Self {
        Self { contexts }
    }
}

#[async_trait]
impl<S: TodoStore + ?Sized + 'static> RequestHandler<CreateTodoList, TodoError>
    for TodoHandler<S>
{
    async fn handle(
        &self,
        request: &CreateTodoList,
        ctx: &RequestContext,
    ) -> TodoResult<CrudResult<i64>> {
        let mut db = self.contexts.create(ctx);
        let key = db.todo_lists().add(TodoList::new(request.title.clone()));
        db.save_changes(ctx.actor(), &mut DomainEvents::new())
            .await?;

        let id = db.todo_lists().id_of(key)?;
        tracing::info!(list_id = id, "Created todo list");
        Ok(CrudResult::succeeded(id))
    }
}

#[async_trait]
impl<S: TodoStore + ?Sized + 'static> RequestHandler<UpdateTodoList, TodoError>
    for TodoHandler<S>
{
    async fn handle(
        &self,
        request: &UpdateTodoList,
        ctx: &RequestContext,
    ) -> TodoResult<CrudResult<()>> {
        let mut db = self.contexts.create(ctx);
        let Some(key) = db.todo_lists().find(request.id).await? else {
            return Ok(list_not_found(request.id));
        };

        db.todo_lists()
            .update(key, |list| list.title = request.title.clone())?;
        db.save_changes(ctx.actor(), &mut DomainEvents::new())
            .await?;

        tracing::info!(list_id = request.id, "Updated todo list");
        Ok(CrudResult::ok())
    }
}

#[async_trait]
impl<S: TodoStore + ?Sized + 'static> RequestHandler<DeleteTodoList, TodoError>
    for TodoHandler<S>
{
    async fn handle(
        &self,
        request: &DeleteTodoList,
        ctx: &RequestContext,
    ) -> TodoResult<CrudResult<()>> {
        let mut db = self.contexts.create(ctx);
        let Some(key) = db.todo_lists().find(request.id).await? else {
            return Ok(list_not_found(request.id));
        };

        db.todo_lists().remove(key)?;
        db.save_changes(ctx.actor(), &mut DomainEvents::new())
            .await?;

        tracing::info!(list_id = request.id, "Deleted todo list");
        Ok(CrudResult::ok())
    }
}

#[async_trait]
impl<S: TodoStore + ?Sized + 'static> RequestHandler<PurgeTodoLists, TodoError>
    for TodoHandler<S>
{
    async fn handle(
        &self,
        _request: &PurgeTodoLists,
        ctx: &RequestContext,
    ) -> TodoResult<CrudResult<()>> {
        let mut db = self.contexts.create(ctx);
        let keys = db.todo_lists().track(TodoListQuery::default()).await?;
        let purged = keys.len();

        db.todo_lists().remove_range(keys)?;
        db.save_changes(ctx.actor(), &mut DomainEvents::new())
            .await?;

        tracing::info!(purged, "Purged todo lists");
        Ok(CrudResult::ok())
    }
}

#[async_trait]
impl<S: TodoStore + ?Sized + 'static> RequestHandler<CreateTodoItem, TodoError>
    for TodoHandler<S>
{
    async fn handle(
        &self,
        request: &CreateTodoItem,
        ctx: &RequestContext,
    ) -> TodoResult<CrudResult<i64>> {
        let mut db = self.contexts.create(ctx);
        if !db.todo_lists().exists(request.list_id).await? {
            return Ok(list_not_found(request.list_id));
        }

        let mut events = DomainEvents::new();
        let key = db
            .todo_items()
            .add(TodoItem::new(request.list_id, request.title.clone()));
        events.record(key, TodoEventKind::ItemCreated);
        db.save_changes(ctx.actor(), &mut events).await?;

        let id = db.todo_items().id_of(key)?;
        tracing::info!(item_id = id, list_id = request.list_id, "Created todo item");
        Ok(CrudResult::succeeded(id))
    }
}

#[async_trait]
impl<S: TodoStore + ?Sized + 'static> RequestHandler<UpdateTodoItem, TodoError>
    for TodoHandler<S>
{
    async fn handle(
        &self,
        request: &UpdateTodoItem,
        ctx: &RequestContext,
    ) -> TodoResult<CrudResult<()>> {
        let mut db = self.contexts.create(ctx);
        let Some(key) = db.todo_items().find(request.id).await? else {
            return Ok(item_not_found(request.id));
        };

        let mut events = DomainEvents::new();
        let completed = db.todo_items().update(key, |item| {
            item.title = request.title.clone();
            item.set_done(request.done)
        })?;
        if let Some(kind) = completed {
            events.record(key, kind);
        }
        db.save_changes(ctx.actor(), &mut events).await?;

        tracing::info!(item_id = request.id, done = request.done, "Updated todo item");
        Ok(CrudResult::ok())
    }
}

#[async_trait]
impl<S: TodoStore + ?Sized + 'static> RequestHandler<UpdateTodoItemDetail, TodoError>
    for TodoHandler<S>
{
    async fn handle(
        &self,
        request: &UpdateTodoItemDetail,
        ctx: &RequestContext,
    ) -> TodoResult<CrudResult<()>> {
        let mut db = self.contexts.create(ctx);
        let Some(key) = db.todo_items().find(request.id).await? else {
            return Ok(item_not_found(request.id));
        };
        if !db.todo_lists().exists(request.list_id).await? {
            return Ok(list_not_found(request.list_id));
        }

        db.todo_items().update(key, |item| {
            item.list_id = request.list_id;
            item.priority = request.priority;
            item.note = request.note.clone();
        })?;
        db.save_changes(ctx.actor(), &mut DomainEvents::new())
            .await?;

        tracing::info!(item_id = request.id, "Updated todo item detail");
        Ok(CrudResult::ok())
    }
}

#[async_trait]
impl<S: TodoStore + ?Sized + 'static> RequestHandler<DeleteTodoItem, TodoError>
    for TodoHandler<S>
{
    async fn handle(
        &self,
        request: &DeleteTodoItem,
        ctx: &RequestContext,
    ) -> TodoResult<CrudResult<()>> {
        let mut db = self.contexts.create(ctx);
        let Some(key) = db.todo_items().find(request.id).await? else {
            return Ok(item_not_found(request.id));
        };

        let mut events = DomainEvents::new();
        db.todo_items().remove(key)?;
        events.record(key, TodoEventKind::ItemDeleted);
        db.save_changes(ctx.actor(), &mut events).await?;

        tracing::info!(item_id = request.id, "Deleted todo item");
        Ok(CrudResult::ok())
    }
}
