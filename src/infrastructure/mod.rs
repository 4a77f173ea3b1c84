// Infrastructure layer module
// Contains template service and storage adapters
// Follows Hexagonal Architecture

pub mod repositories;
pub mod storage;
