pub mod memory_repo;
pub mod models;
pub mod restaurant_repo;
pub mod sql_types;
