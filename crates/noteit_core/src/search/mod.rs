//! Note list search.
//!
//! # Responsibility
//! - Provide the in-memory substring filter behind the search box.
//! - Keep filtering pure so the list controller can run it synchronously.

pub mod filter;
