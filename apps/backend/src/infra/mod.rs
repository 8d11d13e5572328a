//! Infrastructure layer: schema bootstrap, state building, DB error mapping.

pub mod db_errors;
pub mod schema;
pub mod state;
