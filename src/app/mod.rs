//! Board state and the domain logic behind the UI: the wholesale-reload
//! snapshot store, the reconciliation gate, task editing and movement,
//! the chat panel, and user administration.

pub mod board;
pub mod chat;
pub mod editor;
pub mod move_task;
pub mod polling;
pub mod reconcile;
pub mod store;
pub mod users;
