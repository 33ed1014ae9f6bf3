//! Flutter bridge over `noteit_core`.

pub mod api;
