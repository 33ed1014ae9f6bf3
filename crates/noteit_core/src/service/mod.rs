//! Core use-case services.
//!
//! # Responsibility
//! - Give the editing screen and stateless callers (FFI, CLI) note
//!   operations without going through the list controller.

pub mod note_service;
