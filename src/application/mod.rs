//! Application layer services implementing business logic.
//!
//! Services consume repository traits and provide the API used by HTTP
//! handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::sequence_allocator::SequenceAllocator`] - Dedupe-or-create with sequential ids
//! - [`services::resolution_service::ResolutionService`] - Short key to record lookup

pub mod services;
