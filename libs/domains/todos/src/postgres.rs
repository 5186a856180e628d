use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
};

use crate::{
    entity::{todo_item, todo_list},
    error::{TodoError, TodoResult},
    models::{TodoItem, TodoList},
    repository::{AppliedChanges, ChangeSet, TodoItemQuery, TodoListQuery, TodoStore, WriteOp},
};

fn db_error(e: sea_orm::DbErr) -> TodoError {
    TodoError::Database(format!("Database error: {}", e))
}

pub struct PgTodoStore {
    db: DatabaseConnection,
}

impl PgTodoStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    fn list_select(query: &TodoListQuery) -> Select<todo_list::Entity> {
        let mut select = todo_list::Entity::find();

        if let Some(id) = query.id {
            select = select.filter(todo_list::Column::Id.eq(id));
        }
        if let Some(title) = &query.title {
            select = select.filter(todo_list::Column::Title.eq(title.as_str()));
        }
        if let Some(id) = query.exclude_id {
            select = select.filter(todo_list::Column::Id.ne(id));
        }
        if query.soft_delete.excludes_deleted() {
            select = select.filter(
                Condition::all()
                    .add(todo_list::Column::DeletedOn.is_null())
                    .add(todo_list::Column::DeletedBy.is_null()),
            );
        }

        select
    }

    fn item_select(query: &TodoItemQuery) -> Select<todo_item::Entity> {
        let mut select = todo_item::Entity::find();

        if let Some(id) = query.id {
            select = select.filter(todo_item::Column::Id.eq(id));
        }
        if let Some(list_ids) = &query.list_ids {
            select = select.filter(todo_item::Column::ListId.is_in(list_ids.iter().copied()));
        }
        if query.soft_delete.excludes_deleted() {
            select = select.filter(
                Condition::all()
                    .add(todo_item::Column::DeletedOn.is_null())
                    .add(todo_item::Column::DeletedBy.is_null()),
            );
        }

        select
    }

    fn ordered_item_select(query: &TodoItemQuery) -> Select<todo_item::Entity> {
        let select = Self::item_select(query)
            .order_by_asc(todo_item::Column::Title)
            .order_by_asc(todo_item::Column::Id);

        match query.page {
            Some(page) => select.offset(page.offset()).limit(page.limit()),
            None => select,
        }
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn find_lists(&self, query: &TodoListQuery) -> TodoResult<Vec<TodoList>> {
        let models = Self::list_select(query)
            .order_by_asc(todo_list::Column::Title)
            .order_by_asc(todo_list::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error)?;

        models.into_iter().map(TodoList::try_from).collect()
    }

    async fn find_items(&self, query: &TodoItemQuery) -> TodoResult<Vec<TodoItem>> {
        let models = Self::ordered_item_select(query)
            .all(&self.db)
            .await
            .map_err(db_error)?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count_items(&self, query: &TodoItemQuery) -> TodoResult<u64> {
        Self::item_select(query)
            .count(&self.db)
            .await
            .map_err(db_error)
    }

    async fn apply(&self, changes: ChangeSet) -> TodoResult<AppliedChanges> {
        let txn = self.db.begin().await.map_err(db_error)?;
        let mut applied = AppliedChanges::default();

        // Lists first so new items can reference them.
        for write in changes.lists {
            let model = todo_list::to_active_model(write.entity, write.op);
            let saved = match write.op {
                WriteOp::Insert => model.insert(&txn).await,
                WriteOp::Update => model.update(&txn).await,
            }
            .map_err(db_error)?;
            applied.list_ids.push(saved.id);
        }

        for write in changes.items {
            let model = todo_item::to_active_model(write.entity, write.op);
            let saved = match write.op {
                WriteOp::Insert => model.insert(&txn).await,
                WriteOp::Update => model.update(&txn).await,
            }
            .map_err(db_error)?;
            applied.item_ids.push(saved.id);
        }

        txn.commit().await.map_err(db_error)?;

        applied.affected = (applied.list_ids.len() + applied.item_ids.len()) as u64;
        tracing::info!(
            lists = applied.list_ids.len(),
            items = applied.item_ids.len(),
            "Applied todo changes"
        );
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::SoftDeleteFilter;
    use crate::repository::PendingWrite;
    use chrono::Utc;
    use pagination::PageRequest;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, QueryTrait};

    #[test]
    fn test_applied_filter_requires_both_delete_columns_null() {
        let mut query = TodoListQuery::titled("Shopping");
        query.soft_delete = SoftDeleteFilter::Applied;

        let sql = PgTodoStore::list_select(&query)
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""deleted_on" IS NULL"#));
        assert!(sql.contains(r#""deleted_by" IS NULL"#));
    }

    #[test]
    fn test_ignored_filter_reads_deleted_rows() {
        let query = TodoItemQuery::in_lists(vec![1, 2]).including_deleted();

        let sql = PgTodoStore::item_select(&query)
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(!sql.contains(r#""deleted_on" IS NULL"#));
        assert!(!sql.contains(r#""deleted_by" IS NULL"#));
        assert!(sql.contains(r#""list_id" IN (1, 2)"#));
    }

    #[test]
    fn test_huge_page_number_binds_as_signed_offset() {
        let page = PageRequest::new(i64::MAX, 10).unwrap();
        let query = TodoItemQuery::in_lists(vec![1]).paged(page);

        let sql = PgTodoStore::ordered_item_select(&query)
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(&format!("OFFSET {}", i64::MAX)));
        assert!(sql.contains("LIMIT 10"));
    }

    #[tokio::test]
    async fn test_find_lists_maps_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![todo_list::Model {
                id: 1,
                title: "Shopping".into(),
                colour: "#FFFFFF".into(),
                created_on: Utc::now(),
                created_by: 0,
                last_modified_on: None,
                last_modified_by: None,
                deleted_on: None,
                deleted_by: None,
            }]])
            .into_connection();
        let store = PgTodoStore::new(db);

        let lists = store
            .find_lists(&TodoListQuery::default())
            .await
            .unwrap();

        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].title, "Shopping");
    }

    #[tokio::test]
    async fn test_apply_inserts_and_returns_ids() {
        let now = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![todo_list::Model {
                id: 12,
                title: "Chores".into(),
                colour: "#FFFFFF".into(),
                created_on: now,
                created_by: 3,
                last_modified_on: Some(now),
                last_modified_by: Some(3),
                deleted_on: None,
                deleted_by: None,
            }]])
            .append_exec_results([MockExecResult {
                last_insert_id: 12,
                rows_affected: 1,
            }])
            .into_connection();
        let store = PgTodoStore::new(db);

        let applied = store
            .apply(ChangeSet {
                lists: vec![PendingWrite {
                    op: WriteOp::Insert,
                    entity: TodoList::new("Chores"),
                }],
                items: vec![],
            })
            .await
            .unwrap();

        assert_eq!(applied.list_ids, vec![12]);
        assert_eq!(applied.affected, 1);
    }

    #[tokio::test]
    #[ignore] // Requires actual database
    async fn test_pg_store_round_trip() {
        let url = std::env::var("DATABASE_URL").unwrap();
        let db = sea_orm::Database::connect(&url).await.unwrap();
        crate::entity::create_schema(&db).await.unwrap();
        let store = PgTodoStore::new(db);

        let applied = store
            .apply(ChangeSet {
                lists: vec![PendingWrite {
                    op: WriteOp::Insert,
                    entity: TodoList::new("Round trip"),
                }],
                items: vec![],
            })
            .await
            .unwrap();

        let found = store
            .find_lists(&TodoListQuery::by_id(applied.list_ids[0]))
            .await
            .unwrap();
        assert_eq!(found[0].title, "Round trip");
    }
}
