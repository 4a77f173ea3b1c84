// Ports the domain depends on
// Implemented by adapters in the infrastructure layer

pub mod key_value_store;
pub mod template_repository;

pub use key_value_store::KeyValueStore;
pub use template_repository::TemplateRepository;
