pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
