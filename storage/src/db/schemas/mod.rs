#![allow(clippy::module_name_repetitions)]
pub mod song;
