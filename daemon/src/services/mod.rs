//! The catalog workflows that touch more than the database.

pub mod catalog;
