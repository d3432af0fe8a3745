/// Database models
///
/// - `user`: User accounts and credential lookups
/// - `todo`: Owner-scoped todo items
///
/// The query methods here talk to PostgreSQL directly. Application code goes
/// through the store traits in [`crate::store`] instead.

pub mod todo;
pub mod user;
