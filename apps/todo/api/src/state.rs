use domain_todos::TodoService;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared handles for the routers and for shutdown.
#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<TodoService>,
    /// `None` when running on the in-memory store
    pub db: Option<DatabaseConnection>,
}
