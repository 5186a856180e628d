//! Custom extractors for Axum handlers.

pub mod actor;
pub mod id_path;

pub use actor::{Actor, USER_ID_HEADER};
pub use id_path::IdPath;
