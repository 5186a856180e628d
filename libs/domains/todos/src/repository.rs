use async_trait::async_trait;
use pagination::PageRequest;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::audit::{Auditable, SoftDeleteFilter, SoftDeleteQuery};
use crate::error::{TodoError, TodoResult};
use crate::models::{TodoItem, TodoList};

/// Read criteria for todo lists. Results are ordered by title, then id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoListQuery {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub exclude_id: Option<i64>,
    pub soft_delete: SoftDeleteFilter,
}

impl TodoListQuery {
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn excluding(mut self, id: i64) -> Self {
        self.exclude_id = Some(id);
        self
    }

    pub fn including_deleted(mut self) -> Self {
        self.soft_delete = SoftDeleteFilter::Ignored;
        self
    }

    pub fn matches(&self, list: &TodoList) -> bool {
        self.id.is_none_or(|id| list.id == id)
            && self.title.as_ref().is_none_or(|title| &list.title == title)
            && self.exclude_id.is_none_or(|id| list.id != id)
            && !(self.soft_delete.excludes_deleted() && list.is_soft_deleted())
    }
}

impl SoftDeleteQuery for TodoListQuery {
    fn soft_delete_filter(&mut self) -> &mut SoftDeleteFilter {
        &mut self.soft_delete
    }
}

/// Read criteria for todo items. Results are ordered by title, then id.
/// `page` is ignored by counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoItemQuery {
    pub id: Option<i64>,
    pub list_ids: Option<Vec<i64>>,
    pub page: Option<PageRequest>,
    pub soft_delete: SoftDeleteFilter,
}

impl TodoItemQuery {
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn in_lists(list_ids: Vec<i64>) -> Self {
        Self {
            list_ids: Some(list_ids),
            ..Self::default()
        }
    }

    pub fn paged(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }

    pub fn including_deleted(mut self) -> Self {
        self.soft_delete = SoftDeleteFilter::Ignored;
        self
    }

    pub fn matches(&self, item: &TodoItem) -> bool {
        self.id.is_none_or(|id| item.id == id)
            && self
                .list_ids
                .as_ref()
                .is_none_or(|ids| ids.contains(&item.list_id))
            && !(self.soft_delete.excludes_deleted() && item.is_soft_deleted())
    }
}

impl SoftDeleteQuery for TodoItemQuery {
    fn soft_delete_filter(&mut self) -> &mut SoftDeleteFilter {
        &mut self.soft_delete
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Insert,
    /// Full-row update that never touches the created stamps
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite<T> {
    pub op: WriteOp,
    pub entity: T,
}

/// Everything one `save_changes` writes. Lists are applied before items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub lists: Vec<PendingWrite<TodoList>>,
    pub items: Vec<PendingWrite<TodoItem>>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty() && self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lists.len() + self.items.len()
    }
}

/// Ids of the written rows, index-aligned with the `ChangeSet`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedChanges {
    pub list_ids: Vec<i64>,
    pub item_ids: Vec<i64>,
    pub affected: u64,
}

/// Persistence boundary for the todo aggregates.
///
/// `apply` is atomic: either every write in the change set lands or none does.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn find_lists(&self, query: &TodoListQuery) -> TodoResult<Vec<TodoList>>;

    async fn find_items(&self, query: &TodoItemQuery) -> TodoResult<Vec<TodoItem>>;

    async fn count_items(&self, query: &TodoItemQuery) -> TodoResult<u64>;

    async fn apply(&self, changes: ChangeSet) -> TodoResult<AppliedChanges>;
}

#[derive(Debug, Default)]
struct MemoryState {
    lists: BTreeMap<i64, TodoList>,
    items: BTreeMap<i64, TodoItem>,
    last_list_id: i64,
    last_item_id: i64,
}

/// In-memory store for tests and the `memory` backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTodoStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn by_title<T>(rows: &mut [T], key: impl Fn(&T) -> (&str, i64)) {
    rows.sort_by(|a, b| key(a).cmp(&key(b)));
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn find_lists(&self, query: &TodoListQuery) -> TodoResult<Vec<TodoList>> {
        let state = self.state.read().await;
        let mut lists: Vec<TodoList> = state
            .lists
            .values()
            .filter(|list| query.matches(list))
            .cloned()
            .collect();

        by_title(&mut lists, |l| (l.title.as_str(), l.id));
        Ok(lists)
    }

    async fn find_items(&self, query: &TodoItemQuery) -> TodoResult<Vec<TodoItem>> {
        let state = self.state.read().await;
        let mut items: Vec<TodoItem> = state
            .items
            .values()
            .filter(|item| query.matches(item))
            .cloned()
            .collect();

        by_title(&mut items, |i| (i.title.as_str(), i.id));

        Ok(match query.page {
            Some(page) => items
                .into_iter()
                .skip(page.offset() as usize)
                .take(page.limit() as usize)
                .collect(),
            None => items,
        })
    }

    async fn count_items(&self, query: &TodoItemQuery) -> TodoResult<u64> {
        let state = self.state.read().await;
        Ok(state.items.values().filter(|i| query.matches(i)).count() as u64)
    }

    async fn apply(&self, changes: ChangeSet) -> TodoResult<AppliedChanges> {
        let mut state = self.state.write().await;

        // Reject the whole set before mutating anything.
        for write in changes.lists.iter().filter(|w| w.op == WriteOp::Update) {
            if !state.lists.contains_key(&write.entity.id) {
                return Err(TodoError::Database(format!(
                    "todo list {} does not exist",
                    write.entity.id
                )));
            }
        }
        for write in changes.items.iter().filter(|w| w.op == WriteOp::Update) {
            if !state.items.contains_key(&write.entity.id) {
                return Err(TodoError::Database(format!(
                    "todo item {} does not exist",
                    write.entity.id
                )));
            }
        }

        let mut applied = AppliedChanges::default();

        for PendingWrite { op, mut entity } in changes.lists {
            match op {
                WriteOp::Insert => {
                    state.last_list_id += 1;
                    entity.id = state.last_list_id;
                }
                WriteOp::Update => {
                    if let Some(existing) = state.lists.get(&entity.id) {
                        entity.audit.created_on = existing.audit.created_on;
                        entity.audit.created_by = existing.audit.created_by;
                    }
                }
            }
            applied.list_ids.push(entity.id);
            state.lists.insert(entity.id, entity);
        }

        for PendingWrite { op, mut entity } in changes.items {
            match op {
                WriteOp::Insert => {
                    state.last_item_id += 1;
                    entity.id = state.last_item_id;
                }
                WriteOp::Update => {
                    if let Some(existing) = state.items.get(&entity.id) {
                        entity.audit.created_on = existing.audit.created_on;
                        entity.audit.created_by = existing.audit.created_by;
                    }
                }
            }
            applied.item_ids.push(entity.id);
            state.items.insert(entity.id, entity);
        }

        applied.affected = (applied.list_ids.len() + applied.item_ids.len()) as u64;
        Ok(applied)
    }
}
