//! Read-only requests and their handlers.

use async_trait::async_trait;
use mediator::{CrudResult, RequestContext, RequestHandler, query};
use pagination::{PageRequest, PaginatedList};
use serde::Deserialize;
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::commands::{TodoHandler, list_not_found};
use crate::error::{TodoError, TodoResult};
use crate::models::{
    LookupDto, PriorityLevel, TodoItemBriefDto, TodoItemDto, TodoListDto, TodosVm,
};
use crate::repository::{TodoItemQuery, TodoListQuery, TodoStore};

/// Every live list with its items, plus the priority lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GetTodos;

query!(GetTodos => TodosVm);

fn default_page_number() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct GetTodoItemsWithPagination {
    #[validate(range(min = 1, message = "'List Id' must be greater than or equal to '1'."))]
    pub list_id: i64,
    #[serde(default = "default_page_number")]
    #[validate(range(min = 1, message = "'Page Number' must be greater than or equal to '1'."))]
    pub page_number: i64,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, message = "'Page Size' must be greater than or equal to '1'."))]
    pub page_size: i64,
}

query!(GetTodoItemsWithPagination => PaginatedList<TodoItemBriefDto>);

#[async_trait]
impl<S: TodoStore + ?Sized + 'static> RequestHandler<GetTodos, TodoError> for TodoHandler<S> {
    async fn handle(
        &self,
        _request: &GetTodos,
        ctx: &RequestContext,
    ) -> TodoResult<CrudResult<TodosVm>> {
        let mut db = self.contexts.create(ctx);
        let lists = db.todo_lists().query(TodoListQuery::default()).await?;

        let list_ids = lists.iter().map(|list| list.id).collect();
        let mut items_by_list: HashMap<i64, Vec<TodoItemDto>> = HashMap::new();
        for item in db.todo_items().query(TodoItemQuery::in_lists(list_ids)).await? {
            items_by_list
                .entry(item.list_id)
                .or_default()
                .push(item.into());
        }

        let lists = lists
            .into_iter()
            .map(|list| TodoListDto {
                items: items_by_list.remove(&list.id).unwrap_or_default(),
                id: list.id,
                title: list.title,
                colour: list.colour,
            })
            .collect();

        Ok(CrudResult::succeeded(TodosVm {
            priority_levels: PriorityLevel::ALL.into_iter().map(LookupDto::from).collect(),
            lists,
        }))
    }
}

#[async_trait]
impl<S: TodoStore + ?Sized + 'static> RequestHandler<GetTodoItemsWithPagination, TodoError>
    for TodoHandler<S>
{
    async fn handle(
        &self,
        request: &GetTodoItemsWithPagination,
        ctx: &RequestContext,
    ) -> TodoResult<CrudResult<PaginatedList<TodoItemBriefDto>>> {
        // Validation runs first, so a bad page here is a wiring bug.
        let page = PageRequest::new(request.page_number, request.page_size)
            .map_err(|e| TodoError::Internal(e.to_string()))?;

        let mut db = self.contexts.create(ctx);
        if !db.todo_lists().exists(request.list_id).await? {
            return Ok(list_not_found(request.list_id));
        }

        let query = TodoItemQuery::in_lists(vec![request.list_id]);
        let total = db.todo_items().count(query.clone()).await?;
        let items = db.todo_items().query(query.paged(page)).await?;

        let list = PaginatedList::new(items, total, page).map(TodoItemBriefDto::from);
        Ok(CrudResult::succeeded(list))
    }
}
