/// Table gateways for taskdeck
///
/// Each submodule mediates all reads and writes for one table:
///
/// - `user`: user accounts, plus the Postgres-backed `UserDirectory`
/// - `task`: the task resource, always scoped by owner
/// - `task_patch`: the partial-update payload and its update planner
pub mod task;
pub mod task_patch;
pub mod user;
