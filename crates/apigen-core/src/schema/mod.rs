pub mod registry;
pub mod resolver;
pub mod type_ref;

pub use registry::{ResolvedSchema, SchemaRegistry};
pub use resolver::{NamedType, TypeResolver};
pub use type_ref::{NamedKind, Primitive, TypeRef};
