use async_trait::async_trait;
use mediator::{CrudResult, Pipeline, PipelineConfig, Request, RequestContext, Sender};
use std::sync::Arc;

use crate::audit::{Clock, SystemClock};
use crate::commands::{
    CreateTodoItem, CreateTodoList, DeleteTodoItem, DeleteTodoList, PurgeTodoLists,
    TodoHandler, UpdateTodoItem, UpdateTodoItemDetail, UpdateTodoList,
};
use crate::context::TodoDbContextFactory;
use crate::error::{TodoError, TodoResult};
use crate::events::EventDispatcher;
use crate::queries::{GetTodoItemsWithPagination, GetTodos};
use crate::repository::TodoStore;
use crate::validators::UniqueListTitle;

/// Entry point for the todo use cases: one pipeline per request type.
///
/// Send requests through the [`Sender`] impls:
///
/// ```ignore
/// let id = service.send(CreateTodoList { title }, &ctx).await?;
/// ```
pub struct TodoService {
    create_todo_list: Pipeline<CreateTodoList, TodoError>,
    update_todo_list: Pipeline<UpdateTodoList, TodoError>,
    delete_todo_list: Pipeline<DeleteTodoList, TodoError>,
    purge_todo_lists: Pipeline<PurgeTodoLists, TodoError>,
    create_todo_item: Pipeline<CreateTodoItem, TodoError>,
    update_todo_item: Pipeline<UpdateTodoItem, TodoError>,
    update_todo_item_detail: Pipeline<UpdateTodoItemDetail, TodoError>,
    delete_todo_item: Pipeline<DeleteTodoItem, TodoError>,
    get_todos: Pipeline<GetTodos, TodoError>,
    get_todo_items: Pipeline<GetTodoItemsWithPagination, TodoError>,
}

impl TodoService {
    pub fn new<S: TodoStore + 'static>(
        store: Arc<S>,
        dispatcher: EventDispatcher,
        config: &PipelineConfig,
    ) -> Self {
        Self::with_clock(store, dispatcher, Arc::new(SystemClock), config)
    }

    pub fn with_clock<S: TodoStore + 'static>(
        store: Arc<S>,
        dispatcher: EventDispatcher,
        clock: Arc<dyn Clock>,
        config: &PipelineConfig,
    ) -> Self {
        let contexts = TodoDbContextFactory::with_clock(store, dispatcher, clock);
        let handler = Arc::new(TodoHandler::new(contexts.clone()));

        Self {
            create_todo_list: Pipeline::builder(handler.clone())
                .validated()
                .validator(UniqueListTitle::new(contexts.clone()))
                .build(config),
            update_todo_list: Pipeline::builder(handler.clone())
                .validated()
                .validator(UniqueListTitle::new(contexts))
                .build(config),
            delete_todo_list: Pipeline::builder(handler.clone()).build(config),
            purge_todo_lists: Pipeline::builder(handler.clone()).build(config),
            create_todo_item: Pipeline::builder(handler.clone()).validated().build(config),
            update_todo_item: Pipeline::builder(handler.clone()).validated().build(config),
            update_todo_item_detail: Pipeline::builder(handler.clone()).build(config),
            delete_todo_item: Pipeline::builder(handler.clone()).build(config),
            get_todos: Pipeline::builder(handler.clone()).build(config),
            get_todo_items: Pipeline::builder(handler).validated().build(config),
        }
    }
}

macro_rules! route_requests {
    ($($request:ty => $pipeline:ident),+ $(,)?) => {
        $(
            #[async_trait]
            impl Sender<$request> for TodoService {
                type Error = TodoError;

                async fn send(
                    &self,
                    request: $request,
                    ctx: &RequestContext,
                ) -> TodoResult<CrudResult<<$request as Request>::Output>> {
                    self.$pipeline.send(request, ctx).await
                }
            }
        )+
    };
}

route_requests! {
    CreateTodoList => create_todo_list,
    UpdateTodoList => update_todo_list,
    DeleteTodoList => delete_todo_list,
    PurgeTodoLists => purge_todo_lists,
    CreateTodoItem => create_todo_item,
    UpdateTodoItem => update_todo_item,
    UpdateTodoItemDetail => update_todo_item_detail,
    DeleteTodoItem => delete_todo_item,
    GetTodos => get_todos,
    GetTodoItemsWithPagination => get_todo_items,
}
