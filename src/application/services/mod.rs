//! Business logic services for the application layer.

pub mod resolution_service;
pub mod sequence_allocator;

pub use resolution_service::ResolutionService;
pub use sequence_allocator::{DEFAULT_MAX_ATTEMPTS, SequenceAllocator};
