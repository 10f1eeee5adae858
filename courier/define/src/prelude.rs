//! Convenient re-exports for building descriptor tables in code.

pub use crate::descriptor::EndpointDescriptor;
pub use crate::method::RestMethod;
pub use crate::parameter::{ParameterDescriptor, ParameterLocation};
pub use crate::security::{EndpointSecurity, SecurityDefinition, SecurityScheme};
pub use crate::table::DescriptorTable;
