pub mod models;
pub mod query_state;
pub mod repository;
