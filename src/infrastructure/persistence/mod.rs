mod in_memory_history_store;
mod pg_history_store;
mod pg_pool;

pub use in_memory_history_store::InMemoryHistoryStore;
pub use pg_history_store::PgHistoryStore;

pub use pg_pool::create_pool;
