//! Repository implementations.
//!
//! - [`PgUrlRepository`] - PostgreSQL storage, uniqueness enforced by indexes
//! - [`MemoryUrlRepository`] - in-process storage, uniqueness enforced under one lock

pub mod memory_url_repository;
pub mod pg_url_repository;

pub use memory_url_repository::MemoryUrlRepository;
pub use pg_url_repository::PgUrlRepository;
