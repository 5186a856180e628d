//! Sea-ORM entities for the todo tables.

pub mod todo_item;
pub mod todo_list;

use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Schema};

/// Creates both tables if they do not exist yet.
pub async fn create_schema<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    create_table(db, todo_list::Entity).await?;
    create_table(db, todo_item::Entity).await?;
    tracing::info!("Todo schema ready");
    Ok(())
}

async fn create_table<C: ConnectionTrait, E: EntityTrait>(db: &C, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut table = Schema::new(backend).create_table_from_entity(entity);
    table.if_not_exists();
    let stmt = backend.build(&table);
    db.execute_unprepared(&stmt.sql).await?;
    Ok(())
}
