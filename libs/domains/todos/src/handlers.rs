use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{get, put},
};
use axum_helpers::{
    Actor, AppError, CrudJson, IdPath,
    errors::responses::{
        BadRequestResponse, InternalServerErrorResponse, ServiceUnavailableResponse,
    },
};
use mediator::{CrudMessage, CrudOutcome, CrudResult, CrudStatus, RequestContext, Sender};
use pagination::PaginatedList;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::commands::{
    CreateTodoItem, CreateTodoList, DeleteTodoItem, DeleteTodoList, PurgeTodoLists,
    UpdateTodoItem, UpdateTodoItemDetail, UpdateTodoList,
};
use crate::models::{LookupDto, PriorityLevel, TodoItemBriefDto, TodoItemDto, TodoListDto, TodosVm};
use crate::queries::{GetTodoItemsWithPagination, GetTodos};
use crate::service::TodoService;

const LISTS_TAG: &str = "Todo Lists";
const ITEMS_TAG: &str = "Todo Items";

type ApiResult<T> = Result<CrudJson<T>, AppError>;

/// OpenAPI documentation for the todo endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        get_todos,
        create_todo_list,
        update_todo_list,
        delete_todo_list,
        purge_todo_lists,
        get_todo_items,
        create_todo_item,
        update_todo_item,
        update_todo_item_detail,
        delete_todo_item,
    ),
    components(
        schemas(
            CrudStatus,
            CrudMessage,
            CrudOutcome,
            CreateTodoList,
            UpdateTodoList,
            CreateTodoItem,
            UpdateTodoItem,
            UpdateTodoItemDetail,
            PriorityLevel,
            LookupDto,
            TodoItemDto,
            TodoListDto,
            TodosVm,
            TodoItemBriefDto,
        ),
        responses(BadRequestResponse, InternalServerErrorResponse, ServiceUnavailableResponse)
    ),
    tags(
        (name = LISTS_TAG, description = "Todo list management"),
        (name = ITEMS_TAG, description = "Todo item management")
    )
)]
pub struct ApiDoc;

/// Todo routes, relative to wherever the app nests them.
pub fn router(service: Arc<TodoService>) -> Router {
    Router::new()
        .route(
            "/todo-lists",
            get(get_todos).post(create_todo_list).delete(purge_todo_lists),
        )
        .route(
            "/todo-lists/{id}",
            put(update_todo_list).delete(delete_todo_list),
        )
        .route("/todo-items", get(get_todo_items).post(create_todo_item))
        .route(
            "/todo-items/{id}",
            put(update_todo_item).delete(delete_todo_item),
        )
        .route("/todo-items/{id}/detail", put(update_todo_item_detail))
        .with_state(service)
}

fn context(Actor(actor): Actor) -> RequestContext {
    RequestContext::for_actor(actor)
}

fn ensure_same_id(route_id: i64, body_id: i64) -> Result<(), AppError> {
    if route_id == body_id {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Route id {} does not match body id {}",
            route_id, body_id
        )))
    }
}

/// All live lists with their items
#[utoipa::path(
    get,
    path = "/todo-lists",
    tag = LISTS_TAG,
    responses(
        (status = 200, description = "Lists with items and priority levels", body = CrudResult<TodosVm>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_todos(State(service): State<Arc<TodoService>>, actor: Actor) -> ApiResult<TodosVm> {
    let result = service.send(GetTodos, &context(actor)).await?;
    Ok(result.into())
}

/// Create a list
#[utoipa::path(
    post,
    path = "/todo-lists",
    tag = LISTS_TAG,
    request_body = CreateTodoList,
    responses(
        (status = 201, description = "Id of the new list", body = CrudResult<i64>),
        (status = 400, description = "Validation failed", body = CrudOutcome),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_todo_list(
    State(service): State<Arc<TodoService>>,
    actor: Actor,
    payload: Result<Json<CreateTodoList>, JsonRejection>,
) -> ApiResult<i64> {
    let Json(command) = payload?;
    let result = service.send(command, &context(actor)).await?;
    Ok(CrudJson::created(result))
}

/// Rename a list
#[utoipa::path(
    put,
    path = "/todo-lists/{id}",
    tag = LISTS_TAG,
    params(("id" = i64, Path, description = "Todo list id")),
    request_body = UpdateTodoList,
    responses(
        (status = 200, description = "List updated", body = CrudOutcome),
        (status = 400, response = BadRequestResponse),
        (status = 404, description = "List not found", body = CrudOutcome),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_todo_list(
    State(service): State<Arc<TodoService>>,
    actor: Actor,
    IdPath(id): IdPath,
    payload: Result<Json<UpdateTodoList>, JsonRejection>,
) -> ApiResult<()> {
    let Json(command) = payload?;
    ensure_same_id(id, command.id)?;
    let result = service.send(command, &context(actor)).await?;
    Ok(result.into())
}

/// Soft-delete a list
#[utoipa::path(
    delete,
    path = "/todo-lists/{id}",
    tag = LISTS_TAG,
    params(("id" = i64, Path, description = "Todo list id")),
    responses(
        (status = 200, description = "List deleted", body = CrudOutcome),
        (status = 404, description = "List not found", body = CrudOutcome),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_todo_list(
    State(service): State<Arc<TodoService>>,
    actor: Actor,
    IdPath(id): IdPath,
) -> ApiResult<()> {
    let result = service.send(DeleteTodoList { id }, &context(actor)).await?;
    Ok(result.into())
}

/// Soft-delete every list
#[utoipa::path(
    delete,
    path = "/todo-lists",
    tag = LISTS_TAG,
    responses(
        (status = 200, description = "All lists deleted", body = CrudOutcome),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn purge_todo_lists(State(service): State<Arc<TodoService>>, actor: Actor) -> ApiResult<()> {
    let result = service.send(PurgeTodoLists, &context(actor)).await?;
    Ok(result.into())
}

/// One page of a list's items, ordered by title
#[utoipa::path(
    get,
    path = "/todo-items",
    tag = ITEMS_TAG,
    params(GetTodoItemsWithPagination),
    responses(
        (status = 200, description = "Page of items", body = CrudResult<PaginatedList<TodoItemBriefDto>>),
        (status = 400, description = "Invalid paging", body = CrudOutcome),
        (status = 404, description = "List not found", body = CrudOutcome),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_todo_items(
    State(service): State<Arc<TodoService>>,
    actor: Actor,
    query: Result<Query<GetTodoItemsWithPagination>, QueryRejection>,
) -> ApiResult<PaginatedList<TodoItemBriefDto>> {
    let Query(query) = query?;
    let result = service.send(query, &context(actor)).await?;
    Ok(result.into())
}

/// Add an item to a list
#[utoipa::path(
    post,
    path = "/todo-items",
    tag = ITEMS_TAG,
    request_body = CreateTodoItem,
    responses(
        (status = 201, description = "Id of the new item", body = CrudResult<i64>),
        (status = 400, description = "Validation failed", body = CrudOutcome),
        (status = 404, description = "List not found", body = CrudOutcome),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_todo_item(
    State(service): State<Arc<TodoService>>,
    actor: Actor,
    payload: Result<Json<CreateTodoItem>, JsonRejection>,
) -> ApiResult<i64> {
    let Json(command) = payload?;
    let result = service.send(command, &context(actor)).await?;
    Ok(CrudJson::created(result))
}

/// Change an item's title or completion
#[utoipa::path(
    put,
    path = "/todo-items/{id}",
    tag = ITEMS_TAG,
    params(("id" = i64, Path, description = "Todo item id")),
    request_body = UpdateTodoItem,
    responses(
        (status = 200, description = "Item updated", body = CrudOutcome),
        (status = 400, response = BadRequestResponse),
        (status = 404, description = "Item not found", body = CrudOutcome),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_todo_item(
    State(service): State<Arc<TodoService>>,
    actor: Actor,
    IdPath(id): IdPath,
    payload: Result<Json<UpdateTodoItem>, JsonRejection>,
) -> ApiResult<()> {
    let Json(command) = payload?;
    ensure_same_id(id, command.id)?;
    let result = service.send(command, &context(actor)).await?;
    Ok(result.into())
}

/// Move an item, or change its priority or note
#[utoipa::path(
    put,
    path = "/todo-items/{id}/detail",
    tag = ITEMS_TAG,
    params(("id" = i64, Path, description = "Todo item id")),
    request_body = UpdateTodoItemDetail,
    responses(
        (status = 200, description = "Item updated", body = CrudOutcome),
        (status = 400, response = BadRequestResponse),
        (status = 404, description = "Item or list not found", body = CrudOutcome),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_todo_item_detail(
    State(service): State<Arc<TodoService>>,
    actor: Actor,
    IdPath(id): IdPath,
    payload: Result<Json<UpdateTodoItemDetail>, JsonRejection>,
) -> ApiResult<()> {
    let Json(command) = payload?;
    ensure_same_id(id, command.id)?;
    let result = service.send(command, &context(actor)).await?;
    Ok(result.into())
}

/// Soft-delete an item
#[utoipa::path(
    delete,
    path = "/todo-items/{id}",
    tag = ITEMS_TAG,
    params(("id" = i64, Path, description = "Todo item id")),
    responses(
        (status = 200, description = "Item deleted", body = CrudOutcome),
        (status = 404, description = "Item not found", body = CrudOutcome),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_todo_item(
    State(service): State<Arc<TodoService>>,
    actor: Actor,
    IdPath(id): IdPath,
) -> ApiResult<()> {
    let result = service.send(DeleteTodoItem { id }, &context(actor)).await?;
    Ok(result.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatched_ids_are_rejected() {
        assert!(ensure_same_id(3, 3).is_ok());
        assert!(matches!(
            ensure_same_id(3, 4),
            Err(AppError::BadRequest(msg)) if msg.contains("3") && msg.contains("4")
        ));
    }

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();

        for expected in [
            "/todo-lists",
            "/todo-lists/{id}",
            "/todo-items",
            "/todo-items/{id}",
            "/todo-items/{id}/detail",
        ] {
            assert!(paths.iter().any(|p| p == expected), "missing {expected}");
        }
    }
}
