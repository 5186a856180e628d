//! Todos Domain
//!
//! Todo lists and their items behind a request pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   Handlers   │  ← axum routes, OpenAPI
//! └──────┬───────┘
//! ┌──────▼───────┐
//! │ TodoService  │  ← one Pipeline per command/query (validation, timing)
//! └──────┬───────┘
//! ┌──────▼───────┐
//! │ TodoDbContext│  ← change tracking, audit stamps, soft delete, domain events
//! └──────┬───────┘
//! ┌──────▼───────┐
//! │  TodoStore   │  ← PgTodoStore (sea-orm) or InMemoryTodoStore
//! └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_todos::{
//!     EventDispatcher, LoggingEventSubscriber, PgTodoStore, TodoService, create_schema,
//! };
//! use mediator::PipelineConfig;
//! use sea_orm::Database;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("postgres://...").await?;
//! create_schema(&db).await?;
//!
//! let dispatcher = EventDispatcher::new().subscribe(LoggingEventSubscriber);
//! let service = TodoService::new(
//!     Arc::new(PgTodoStore::new(db)),
//!     dispatcher,
//!     &PipelineConfig::default(),
//! );
//! let app = domain_todos::handlers::router(Arc::new(service));
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod commands;
pub mod context;
pub mod entity;
pub mod error;
pub mod events;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod queries;
pub mod repository;
pub mod service;
pub mod validators;

pub use audit::{Clock, FixedClock, SystemClock};
pub use commands::{
    CreateTodoItem, CreateTodoList, DeleteTodoItem, DeleteTodoList, PurgeTodoLists,
    UpdateTodoItem, UpdateTodoItemDetail, UpdateTodoList,
};
pub use context::{TodoDbContext, TodoDbContextFactory};
pub use entity::create_schema;
pub use error::{TodoError, TodoResult};
pub use events::{
    DomainEvents, EventDispatcher, EventSubscriber, LoggingEventSubscriber, TodoEvent,
    TodoEventKind,
};
pub use handlers::ApiDoc;
pub use models::{
    Colour, LookupDto, PriorityLevel, TodoItem, TodoItemBriefDto, TodoItemDto, TodoList,
    TodoListDto, TodosVm,
};
pub use postgres::PgTodoStore;
pub use queries::{GetTodoItemsWithPagination, GetTodos};
pub use repository::{InMemoryTodoStore, TodoStore};
pub use service::TodoService;
