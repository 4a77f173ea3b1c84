// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod http_template_repository;
pub mod in_memory_template_repository;

pub use http_template_repository::HttpTemplateRepository;
pub use in_memory_template_repository::InMemoryTemplateRepository;
