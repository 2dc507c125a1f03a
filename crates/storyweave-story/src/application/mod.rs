//! Application services: sessions, command handlers, and query handlers.

pub mod command_handlers;
pub mod context;
pub mod query_handlers;
pub mod session;
pub mod sessions;
