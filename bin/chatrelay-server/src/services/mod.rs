//! Request-independent building blocks used by the chat routes.

pub mod document;
pub mod reply;
