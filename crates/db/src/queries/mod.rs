// crates/db/src/queries/mod.rs
// Typed query methods on `Database`, grouped by table.

pub(crate) mod rows;

mod comments;
mod flags;
pub mod journeys;
mod messages;
mod portfolio;
pub mod posts;
pub mod users;
pub mod visitors;
