//! CRUD operations, implemented directly on the schema types.
pub mod song;
