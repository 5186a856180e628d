use async_trait::async_trait;
use std::sync::Arc;
use strum::Display;
use tokio_util::sync::CancellationToken;

use crate::context::EntryKey;
use crate::error::{TodoError, TodoResult};
use crate::models::TodoItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TodoEventKind {
    ItemCreated,
    ItemCompleted,
    ItemDeleted,
}

/// A business fact, delivered after the change that caused it was committed.
/// Carries the item as it was persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum TodoEvent {
    ItemCreated(TodoItem),
    ItemCompleted(TodoItem),
    ItemDeleted(TodoItem),
}

impl TodoEvent {
    pub fn new(kind: TodoEventKind, item: TodoItem) -> Self {
        match kind {
            TodoEventKind::ItemCreated => TodoEvent::ItemCreated(item),
            TodoEventKind::ItemCompleted => TodoEvent::ItemCompleted(item),
            TodoEventKind::ItemDeleted => TodoEvent::ItemDeleted(item),
        }
    }

    pub fn kind(&self) -> TodoEventKind {
        match self {
            TodoEvent::ItemCreated(_) => TodoEventKind::ItemCreated,
            TodoEvent::ItemCompleted(_) => TodoEventKind::ItemCompleted,
            TodoEvent::ItemDeleted(_) => TodoEventKind::ItemDeleted,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TodoEvent::ItemCreated(_) => "TodoItemCreatedEvent",
            TodoEvent::ItemCompleted(_) => "TodoItemCompletedEvent",
            TodoEvent::ItemDeleted(_) => "TodoItemDeletedEvent",
        }
    }

    pub fn item(&self) -> &TodoItem {
        match self {
            TodoEvent::ItemCreated(item)
            | TodoEvent::ItemCompleted(item)
            | TodoEvent::ItemDeleted(item) => item,
        }
    }
}

/// Events recorded by a handler during one unit of work.
///
/// Handed to `TodoDbContext::save_changes`, which drains it once the write
/// has committed.
#[derive(Debug, Default)]
pub struct DomainEvents {
    pending: Vec<(EntryKey<TodoItem>, TodoEventKind)>,
}

impl DomainEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, item: EntryKey<TodoItem>, kind: TodoEventKind) {
        self.pending.push((item, kind));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn drain(&mut self) -> Vec<(EntryKey<TodoItem>, TodoEventKind)> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    async fn handle(&self, event: &TodoEvent) -> TodoResult<()>;
}

/// Delivers events to subscribers one at a time, in registration order.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(mut self, subscriber: impl EventSubscriber + 'static) -> Self {
        self.subscribers.push(Arc::new(subscriber));
        self
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Stops at the first subscriber error. Events already delivered are not
    /// retried.
    pub async fn dispatch(
        &self,
        events: Vec<TodoEvent>,
        cancellation: &CancellationToken,
    ) -> TodoResult<()> {
        for event in &events {
            for subscriber in &self.subscribers {
                if cancellation.is_cancelled() {
                    return Err(TodoError::Cancelled);
                }

                subscriber.handle(event).await.map_err(|e| {
                    TodoError::EventDispatch(format!("{} handler failed: {}", event.name(), e))
                })?;
            }
        }

        Ok(())
    }
}

/// Logs each event at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSubscriber;

#[async_trait]
impl EventSubscriber for LoggingEventSubscriber {
    async fn handle(&self, event: &TodoEvent) -> TodoResult<()> {
        tracing::info!(
            item_id = event.item().id,
            list_id = event.item().list_id,
            "Domain Event: {}",
            event.name()
        );
        Ok(())
    }
}
