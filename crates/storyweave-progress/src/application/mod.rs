//! Application services: query handlers over the collaborator ports.

pub mod query_handlers;
