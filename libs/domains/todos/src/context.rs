//! Unit of work over a [`TodoStore`].
//!
//! Handlers load and stage entities through the typed views returned by
//! [`TodoDbContext::todo_lists`] and [`TodoDbContext::todo_items`], then call
//! [`TodoDbContext::save_changes`], which
//!
//! 1. stamps audit fields and turns deletions into soft deletes,
//! 2. applies the resulting `ChangeSet` atomically,
//! 3. drains the handler's [`DomainEvents`] and dispatches them post-commit.
//!
//! Every read goes through the soft-delete filter unless the query opts out.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::audit::{
    AuditInterceptor, Auditable, Clock, EntityState, SoftDeleteQuery, SystemClock,
};
use crate::error::{TodoError, TodoResult};
use crate::events::{DomainEvents, EventDispatcher, TodoEvent};
use crate::models::{TodoItem, TodoList};
use crate::repository::{ChangeSet, PendingWrite, TodoItemQuery, TodoListQuery, TodoStore, WriteOp};
use mediator::RequestContext;

/// Handle to an entity tracked by one context.
pub struct EntryKey<T> {
    index: usize,
    _entity: PhantomData<fn() -> T>,
}

impl<T> EntryKey<T> {
    fn new(index: usize) -> Self {
        Self {
            index,
            _entity: PhantomData,
        }
    }
}

impl<T> Clone for EntryKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for EntryKey<T> {}

impl<T> PartialEq for EntryKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for EntryKey<T> {}

impl<T> fmt::Debug for EntryKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryKey({})", self.index)
    }
}

/// An entity the change tracker can identify.
pub trait Tracked: Auditable + Clone + Send + Sync {
    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
}

impl Tracked for TodoList {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Tracked for TodoItem {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

struct Entry<T> {
    entity: T,
    state: EntityState,
}

/// Entities loaded or staged in one unit of work, with their pending state.
pub struct ChangeTracker<T> {
    entries: Vec<Entry<T>>,
}

impl<T> Default for ChangeTracker<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Tracked> ChangeTracker<T> {
    /// Tracks a loaded entity as unchanged. An entity already tracked under
    /// the same id keeps its local changes.
    fn attach(&mut self, entity: T) -> EntryKey<T> {
        if let Some(index) = self
            .entries
            .iter()
            .position(|e| e.entity.id() != 0 && e.entity.id() == entity.id())
        {
            return EntryKey::new(index);
        }
        self.push(entity, EntityState::Unchanged)
    }

    fn push(&mut self, entity: T, state: EntityState) -> EntryKey<T> {
        self.entries.push(Entry { entity, state });
        EntryKey::new(self.entries.len() - 1)
    }

    fn entry(&self, key: EntryKey<T>) -> TodoResult<&Entry<T>> {
        self.entries
            .get(key.index)
            .ok_or_else(|| TodoError::Internal(format!("{key:?} is not tracked by this context")))
    }

    fn entry_mut(&mut self, key: EntryKey<T>) -> TodoResult<&mut Entry<T>> {
        self.entries
            .get_mut(key.index)
            .ok_or_else(|| TodoError::Internal(format!("{key:?} is not tracked by this context")))
    }

    fn modify<R>(&mut self, key: EntryKey<T>, f: impl FnOnce(&mut T) -> R) -> TodoResult<R> {
        let entry = self.entry_mut(key)?;
        let out = f(&mut entry.entity);
        if entry.state == EntityState::Unchanged {
            entry.state = EntityState::Modified;
        }
        Ok(out)
    }

    fn remove(&mut self, key: EntryKey<T>) -> TodoResult<()> {
        let entry = self.entry_mut(key)?;
        // Removing something never saved just forgets it.
        entry.state = if entry.state == EntityState::Added {
            EntityState::Unchanged
        } else {
            EntityState::Deleted
        };
        Ok(())
    }

    fn intercept(&mut self, interceptor: &AuditInterceptor, actor: Option<i64>) {
        for entry in &mut self.entries {
            entry.state = interceptor.intercept(&mut entry.entity, entry.state, actor);
        }
    }

    /// Pending writes plus the entry index each one came from.
    fn pending_writes(&self) -> (Vec<PendingWrite<T>>, Vec<usize>) {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let op = match entry.state {
                    EntityState::Added => WriteOp::Insert,
                    EntityState::Modified => WriteOp::Update,
                    EntityState::Unchanged | EntityState::Deleted => return None,
                };
                Some((
                    PendingWrite {
                        op,
                        entity: entry.entity.clone(),
                    },
                    index,
                ))
            })
            .unzip()
    }

    fn accept(&mut self, written: &[usize], ids: &[i64]) {
        for (index, id) in written.iter().zip(ids) {
            if let Some(entry) = self.entries.get_mut(*index) {
                entry.entity.set_id(*id);
            }
        }
        for entry in &mut self.entries {
            entry.state = EntityState::Unchanged;
        }
    }

    fn has_changes(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.state != EntityState::Unchanged)
    }
}

async fn guarded<T>(
    cancellation: &CancellationToken,
    operation: impl Future<Output = TodoResult<T>>,
) -> TodoResult<T> {
    tokio::select! {
        biased;
        _ = cancellation.cancelled() => Err(TodoError::Cancelled),
        outcome = operation => outcome,
    }
}

fn filtered<Q: SoftDeleteQuery>(mut query: Q) -> Q {
    query.soft_delete_filter().apply();
    query
}

/// One unit of work. Create one per request through [`TodoDbContextFactory`].
pub struct TodoDbContext<S: TodoStore + ?Sized> {
    store: Arc<S>,
    dispatcher: Arc<EventDispatcher>,
    interceptor: AuditInterceptor,
    cancellation: CancellationToken,
    lists: ChangeTracker<TodoList>,
    items: ChangeTracker<TodoItem>,
}

impl<S: TodoStore + ?Sized> TodoDbContext<S> {
    pub fn new(
        store: Arc<S>,
        dispatcher: Arc<EventDispatcher>,
        interceptor: AuditInterceptor,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            store,
            dispatcher,
            interceptor,
            cancellation,
            lists: ChangeTracker::default(),
            items: ChangeTracker::default(),
        }
    }

    pub fn todo_lists(&mut self) -> TodoLists<'_, S> {
        TodoLists { ctx: self }
    }

    pub fn todo_items(&mut self) -> TodoItems<'_, S> {
        TodoItems { ctx: self }
    }

    pub fn has_changes(&self) -> bool {
        self.lists.has_changes() || self.items.has_changes()
    }

    /// Writes every pending change and then delivers `events`.
    ///
    /// Returns the number of rows written. On success `events` is empty. A
    /// subscriber failure is reported after the data has been committed.
    pub async fn save_changes(
        &mut self,
        actor: Option<i64>,
        events: &mut DomainEvents,
    ) -> TodoResult<u64> {
        if self.cancellation.is_cancelled() {
            return Err(TodoError::Cancelled);
        }

        self.lists.intercept(&self.interceptor, actor);
        self.items.intercept(&self.interceptor, actor);

        let (lists, list_entries) = self.lists.pending_writes();
        let (items, item_entries) = self.items.pending_writes();
        let changes = ChangeSet { lists, items };

        let affected = if changes.is_empty() {
            0
        } else {
            let writes = changes.len();
            let applied = guarded(&self.cancellation, self.store.apply(changes)).await?;
            self.lists.accept(&list_entries, &applied.list_ids);
            self.items.accept(&item_entries, &applied.item_ids);
            tracing::debug!(writes, affected = applied.affected, "Saved changes");
            applied.affected
        };

        let resolved = events
            .drain()
            .into_iter()
            .map(|(key, kind)| -> TodoResult<TodoEvent> {
                let item = self.items.entry(key)?.entity.clone();
                Ok(TodoEvent::new(kind, item))
            })
            .collect::<TodoResult<Vec<_>>>()?;

        if !resolved.is_empty() {
            self.dispatcher
                .dispatch(resolved, &self.cancellation)
                .await?;
        }

        Ok(affected)
    }
}

/// Typed access to todo lists within a context.
pub struct TodoLists<'a, S: TodoStore + ?Sized> {
    ctx: &'a mut TodoDbContext<S>,
}

impl<S: TodoStore + ?Sized> TodoLists<'_, S> {
    /// Loads and tracks a live list.
    pub async fn find(&mut self, id: i64) -> TodoResult<Option<EntryKey<TodoList>>> {
        Ok(self.track(TodoListQuery::by_id(id)).await?.into_iter().next())
    }

    /// Loads and tracks every list matching `query`.
    pub async fn track(&mut self, query: TodoListQuery) -> TodoResult<Vec<EntryKey<TodoList>>> {
        let lists = self.query(query).await?;
        Ok(lists
            .into_iter()
            .map(|list| self.ctx.lists.attach(list))
            .collect())
    }

    /// Reads without tracking.
    pub async fn query(&self, query: TodoListQuery) -> TodoResult<Vec<TodoList>> {
        let query = filtered(query);
        guarded(&self.ctx.cancellation, self.ctx.store.find_lists(&query)).await
    }

    pub async fn exists(&self, id: i64) -> TodoResult<bool> {
        Ok(!self.query(TodoListQuery::by_id(id)).await?.is_empty())
    }

    pub fn add(&mut self, list: TodoList) -> EntryKey<TodoList> {
        self.ctx.lists.push(list, EntityState::Added)
    }

    pub fn get(&self, key: EntryKey<TodoList>) -> TodoResult<&TodoList> {
        Ok(&self.ctx.lists.entry(key)?.entity)
    }

    /// Id of a tracked list; only meaningful after it has been saved.
    pub fn id_of(&self, key: EntryKey<TodoList>) -> TodoResult<i64> {
        Ok(self.get(key)?.id)
    }

    pub fn update<R>(
        &mut self,
        key: EntryKey<TodoList>,
        f: impl FnOnce(&mut TodoList) -> R,
    ) -> TodoResult<R> {
        self.ctx.lists.modify(key, f)
    }

    pub fn remove(&mut self, key: EntryKey<TodoList>) -> TodoResult<()> {
        self.ctx.lists.remove(key)
    }

    pub fn remove_range(
        &mut self,
        keys: impl IntoIterator<Item = EntryKey<TodoList>>,
    ) -> TodoResult<()> {
        keys.into_iter().try_for_each(|key| self.remove(key))
    }
}

/// Typed access to todo items within a context.
pub struct TodoItems<'a, S: TodoStore + ?Sized> {
    ctx: &'a mut TodoDbContext<S>,
}

impl<S: TodoStore + ?Sized> TodoItems<'_, S> {
    pub async fn find(&mut self, id: i64) -> TodoResult<Option<EntryKey<TodoItem>>> {
        let items = self.query(TodoItemQuery::by_id(id)).await?;
        Ok(items
            .into_iter()
            .next()
            .map(|item| self.ctx.items.attach(item)))
    }

    pub async fn query(&self, query: TodoItemQuery) -> TodoResult<Vec<TodoItem>> {
        let query = filtered(query);
        guarded(&self.ctx.cancellation, self.ctx.store.find_items(&query)).await
    }

    pub async fn count(&self, query: TodoItemQuery) -> TodoResult<u64> {
        let query = filtered(query);
        guarded(&self.ctx.cancellation, self.ctx.store.count_items(&query)).await
    }

    pub fn add(&mut self, item: TodoItem) -> EntryKey<TodoItem> {
        self.ctx.items.push(item, EntityState::Added)
    }

    pub fn get(&self, key: EntryKey<TodoItem>) -> TodoResult<&TodoItem> {
        Ok(&self.ctx.items.entry(key)?.entity)
    }

    pub fn id_of(&self, key: EntryKey<TodoItem>) -> TodoResult<i64> {
        Ok(self.get(key)?.id)
    }

    pub fn update<R>(
        &mut self,
        key: EntryKey<TodoItem>,
        f: impl FnOnce(&mut TodoItem) -> R,
    ) -> TodoResult<R> {
        self.ctx.items.modify(key, f)
    }

    pub fn remove(&mut self, key: EntryKey<TodoItem>) -> TodoResult<()> {
        self.ctx.items.remove(key)
    }
}

/// Builds a fresh [`TodoDbContext`] per request.
pub struct TodoDbContextFactory<S: TodoStore + ?Sized> {
    store: Arc<S>,
    dispatcher: Arc<EventDispatcher>,
    clock: Arc<dyn Clock>,
}

impl<S: TodoStore + ?Sized> Clone for TodoDbContextFactory<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            dispatcher: self.dispatcher.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<S: TodoStore + ?Sized> TodoDbContextFactory<S> {
    pub fn new(store: Arc<S>, dispatcher: EventDispatcher) -> Self {
        Self::with_clock(store, dispatcher, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<S>, dispatcher: EventDispatcher, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            dispatcher: Arc::new(dispatcher),
            clock,
        }
    }

    pub fn create(&self, ctx: &RequestContext) -> TodoDbContext<S> {
        TodoDbContext::new(
            self.store.clone(),
            self.dispatcher.clone(),
            AuditInterceptor::new(self.clock.clone()),
            ctx.cancellation().clone(),
        )
    }
}
