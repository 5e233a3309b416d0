pub mod criterion;
pub mod criterion_registry;
pub mod request_schema;
pub mod schema_compiler;
