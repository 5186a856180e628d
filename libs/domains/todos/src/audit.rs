//! Audit stamping and soft-delete rules applied by `TodoDbContext` before a
//! write, and the soft-delete marker carried by every read.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::models::{AuditFields, TodoItem, TodoList};
use mediator::ANONYMOUS_ACTOR;

/// An entity carrying [`AuditFields`].
pub trait Auditable {
    fn audit(&self) -> &AuditFields;
    fn audit_mut(&mut self) -> &mut AuditFields;

    /// Deleted if either soft-delete stamp is present.
    fn is_soft_deleted(&self) -> bool {
        let audit = self.audit();
        audit.deleted_on.is_some() || audit.deleted_by.is_some()
    }
}

impl Auditable for TodoList {
    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

impl Auditable for TodoItem {
    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

/// Tracking state of an entity inside a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    Unchanged,
    Added,
    Modified,
    Deleted,
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Clone)]
pub struct AuditInterceptor {
    clock: Arc<dyn Clock>,
}

impl AuditInterceptor {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Stamps `entity` for its pending write and returns the state it should
    /// be written with. Deletions become soft deletes.
    pub fn intercept<E: Auditable>(
        &self,
        entity: &mut E,
        state: EntityState,
        actor: Option<i64>,
    ) -> EntityState {
        let now = self.clock.now();
        let actor = actor.unwrap_or(ANONYMOUS_ACTOR);

        match state {
            EntityState::Unchanged => EntityState::Unchanged,
            EntityState::Added => {
                let audit = entity.audit_mut();
                audit.created_on = now;
                audit.created_by = actor;
                audit.last_modified_on = Some(now);
                audit.last_modified_by = Some(actor);
                audit.deleted_on = None;
                audit.deleted_by = None;
                EntityState::Added
            }
            EntityState::Modified => {
                stamp_modified(entity.audit_mut(), now, actor);
                EntityState::Modified
            }
            EntityState::Deleted if entity.is_soft_deleted() => EntityState::Unchanged,
            EntityState::Deleted => {
                let audit = entity.audit_mut();
                stamp_modified(audit, now, actor);
                audit.deleted_on = Some(now);
                audit.deleted_by = Some(actor);
                EntityState::Modified
            }
        }
    }
}

impl Default for AuditInterceptor {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

fn stamp_modified(audit: &mut AuditFields, now: DateTime<Utc>, actor: i64) {
    audit.last_modified_on = Some(now);
    audit.last_modified_by = Some(actor);
}

/// Whether a read excludes soft-deleted rows.
///
/// Stores only filter when the marker is `Applied`; the context applies it
/// to every query it forwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SoftDeleteFilter {
    #[default]
    Unapplied,
    Applied,
    /// Explicit opt-out: deleted rows are returned too
    Ignored,
}

impl SoftDeleteFilter {
    /// Applies the filter; returns `false` when there was nothing to do.
    pub fn apply(&mut self) -> bool {
        match self {
            SoftDeleteFilter::Unapplied => {
                *self = SoftDeleteFilter::Applied;
                true
            }
            SoftDeleteFilter::Applied | SoftDeleteFilter::Ignored => false,
        }
    }

    pub fn excludes_deleted(&self) -> bool {
        matches!(self, SoftDeleteFilter::Applied)
    }
}

/// A query that carries a [`SoftDeleteFilter`].
pub trait SoftDeleteQuery {
    fn soft_delete_filter(&mut self) -> &mut SoftDeleteFilter;
}
