// Domain layer module exports
// Following Hexagonal Architecture and DDD principles
// Domain is independent of infrastructure concerns

pub mod catalog;
pub mod errors;
pub mod repositories;
pub mod template;
pub mod usage;
pub mod workspace;
