pub mod client;
pub mod dto;
pub mod operation;
pub mod parameter;
pub mod response;

pub use client::{ClientGroup, ClientModel, group_operations};
pub use dto::{DiscriminatorMapping, DiscriminatorModel, DtoModel, EnumValueModel, PropertyModel};
pub use operation::{OperationContext, OperationModel, PathPart, SecurityModel};
pub use parameter::{ParameterKind, ParameterModel};
pub use response::{ExpectedSchemaModel, ResponseModel};
