//! End-to-end use cases through `TodoService` on the in-memory store.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use domain_todos::repository::{TodoItemQuery, TodoListQuery};
use domain_todos::*;
use mediator::{CrudStatus, PipelineConfig, RequestContext, Sender};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct RecordingSubscriber {
    seen: Arc<Mutex<Vec<TodoEventKind>>>,
}

impl RecordingSubscriber {
    fn seen(&self) -> Vec<TodoEventKind> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSubscriber for RecordingSubscriber {
    async fn handle(&self, event: &TodoEvent) -> TodoResult<()> {
        self.seen.lock().unwrap().push(event.kind());
        Ok(())
    }
}

struct Harness {
    service: TodoService,
    store: Arc<InMemoryTodoStore>,
    events: RecordingSubscriber,
}

fn harness() -> Harness {
    let store = Arc::new(InMemoryTodoStore::new());
    let events = RecordingSubscriber::default();
    let dispatcher = EventDispatcher::new()
        .subscribe(LoggingEventSubscriber)
        .subscribe(events.clone());
    let service = TodoService::new(store.clone(), dispatcher, &PipelineConfig::default());

    Harness {
        service,
        store,
        events,
    }
}

fn ctx() -> RequestContext {
    RequestContext::for_actor(Some(7))
}

async fn create_list(service: &TodoService, title: &str) -> i64 {
    service
        .send(CreateTodoList { title: title.into() }, &ctx())
        .await
        .unwrap()
        .into_result()
        .unwrap()
}

async fn create_item(service: &TodoService, list_id: i64, title: &str) -> i64 {
    service
        .send(
            CreateTodoItem {
                list_id,
                title: title.into(),
            },
            &ctx(),
        )
        .await
        .unwrap()
        .into_result()
        .unwrap()
}

#[tokio::test]
async fn test_new_list_shows_up_white() {
    let h = harness();
    create_list(&h.service, "Shopping").await;

    let vm = h
        .service
        .send(GetTodos, &ctx())
        .await
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(vm.lists.len(), 1);
    assert_eq!(vm.lists[0].title, "Shopping");
    let json = serde_json::to_value(&vm.lists[0]).unwrap();
    assert_eq!(json["colour"], "#FFFFFF");
}

#[tokio::test]
async fn test_saved_list_is_stamped_with_actor() {
    let h = harness();
    let id = create_list(&h.service, "Errands").await;

    let stored = h.store.find_lists(&TodoListQuery::by_id(id)).await.unwrap();
    let audit = &stored[0].audit;

    assert_eq!(audit.created_by, 7);
    assert!(audit.deleted_on.is_none());
    assert!(audit.deleted_by.is_none());
}

#[tokio::test]
async fn test_completing_an_item_fires_once() {
    let h = harness();
    let list_id = create_list(&h.service, "Chores").await;
    let item_id = create_item(&h.service, list_id, "Dishes").await;

    for _ in 0..2 {
        let result = h
            .service
            .send(
                UpdateTodoItem {
                    id: item_id,
                    title: "Dishes".into(),
                    done: true,
                },
                &ctx(),
            )
            .await
            .unwrap();
        assert!(result.is_succeeded());
    }

    assert_eq!(
        h.events.seen(),
        vec![TodoEventKind::ItemCreated, TodoEventKind::ItemCompleted]
    );
}

#[tokio::test]
async fn test_deleted_item_is_hidden_but_kept() {
    let h = harness();
    let list_id = create_list(&h.service, "Chores").await;
    let item_id = create_item(&h.service, list_id, "Laundry").await;

    let result = h
        .service
        .send(DeleteTodoItem { id: item_id }, &ctx())
        .await
        .unwrap();
    assert!(result.is_succeeded());

    let visible = h.store.find_items(&TodoItemQuery::by_id(item_id)).await.unwrap();
    let mut live = TodoItemQuery::by_id(item_id);
    live.soft_delete.apply();
    let filtered = h.store.find_items(&live).await.unwrap();

    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].audit.deleted_by, Some(7));
    assert!(visible[0].audit.deleted_on.is_some());
    assert!(filtered.is_empty());
    assert_eq!(h.events.seen().last(), Some(&TodoEventKind::ItemDeleted));
}

#[tokio::test]
async fn test_second_soft_delete_keeps_first_stamp() {
    let store = Arc::new(InMemoryTodoStore::new());
    let first = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let later = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();

    let factory = TodoDbContextFactory::with_clock(
        store.clone(),
        EventDispatcher::new(),
        Arc::new(FixedClock(first)),
    );
    let mut db = factory.create(&ctx());
    let key = db.todo_lists().add(TodoList::new("Old"));
    db.save_changes(Some(7), &mut DomainEvents::new()).await.unwrap();
    db.todo_lists().remove(key).unwrap();
    db.save_changes(Some(7), &mut DomainEvents::new()).await.unwrap();
    let id = db.todo_lists().id_of(key).unwrap();

    let factory = TodoDbContextFactory::with_clock(
        store.clone(),
        EventDispatcher::new(),
        Arc::new(FixedClock(later)),
    );
    let mut db = factory.create(&ctx());
    let keys = db
        .todo_lists()
        .track(TodoListQuery::by_id(id).including_deleted())
        .await
        .unwrap();
    assert_eq!(keys.len(), 1);
    db.todo_lists().remove(keys[0]).unwrap();
    let written = db
        .save_changes(Some(8), &mut DomainEvents::new())
        .await
        .unwrap();

    let stored = store
        .find_lists(&TodoListQuery::by_id(id).including_deleted())
        .await
        .unwrap();
    assert_eq!(written, 0);
    assert_eq!(stored[0].audit.deleted_on, Some(first));
    assert_eq!(stored[0].audit.deleted_by, Some(7));
}

#[tokio::test]
async fn test_second_page_of_twenty_five() {
    let h = harness();
    let list_id = create_list(&h.service, "Big").await;
    for n in 0..25 {
        create_item(&h.service, list_id, &format!("Item {:02}", n)).await;
    }

    let page = h
        .service
        .send(
            GetTodoItemsWithPagination {
                list_id,
                page_number: 2,
                page_size: 10,
            },
            &ctx(),
        )
        .await
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(page.items.len(), 10);
    assert_eq!(page.items[0].title, "Item 10");
    assert_eq!(page.total_pages, 3);
    assert!(page.has_next_page);
    assert!(page.has_previous_page);
}

#[tokio::test]
async fn test_invalid_requests_never_reach_the_store() {
    let h = harness();

    let result = h
        .service
        .send(
            GetTodoItemsWithPagination {
                list_id: 0,
                page_number: 0,
                page_size: 0,
            },
            &ctx(),
        )
        .await
        .unwrap();

    assert_eq!(result.status, CrudStatus::InputNotValid);
    assert_eq!(result.messages.len(), 3);
    assert!(h.store.find_lists(&TodoListQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_purge_hides_every_list() {
    let h = harness();
    create_list(&h.service, "One").await;
    create_list(&h.service, "Two").await;

    let purged = h.service.send(PurgeTodoLists, &ctx()).await.unwrap();
    let vm = h
        .service
        .send(GetTodos, &ctx())
        .await
        .unwrap()
        .into_result()
        .unwrap();

    assert!(purged.is_succeeded());
    assert!(vm.lists.is_empty());
    assert_eq!(
        h.store.find_lists(&TodoListQuery::default()).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn test_title_of_deleted_list_can_be_reused() {
    let h = harness();
    let id = create_list(&h.service, "Weekly").await;
    h.service.send(DeleteTodoList { id }, &ctx()).await.unwrap();

    let again = h
        .service
        .send(CreateTodoList { title: "Weekly".into() }, &ctx())
        .await
        .unwrap();

    assert!(again.is_succeeded());
}
