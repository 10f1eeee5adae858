//! Courier Definition Library
//!
//! Declarative descriptors for remote REST operations. A descriptor table is
//! pure data: the `courier` crate reads it to build, authenticate and
//! dispatch requests without any per-endpoint code.
//!
//! ## Core Types
//!
//! - [`EndpointDescriptor`] - One operation: path/URI template, method, parameters, security
//! - [`ParameterDescriptor`] - One parameter and its [`ParameterLocation`]
//! - [`RestMethod`] - HTTP methods with a transport binding
//! - [`SecurityDefinition`] / [`EndpointSecurity`] - Authentication metadata
//! - [`DescriptorTable`] - Operation id → descriptor, loaded from JSON or YAML
//!
//! ## Examples
//!
//! ```
//! use courier_define::prelude::*;
//!
//! let descriptor = EndpointDescriptor::new("get", "/users/{id}")
//!     .with_parameter(ParameterDescriptor::path("id"))
//!     .with_parameter(ParameterDescriptor::query("fields"));
//!
//! let mut table = DescriptorTable::new();
//! table.insert("getUser", descriptor);
//!
//! assert!(table.validate().is_ok());
//! ```

pub mod descriptor;
pub mod error;
pub mod method;
pub mod parameter;
pub mod prelude;
pub mod security;
pub mod table;

pub use descriptor::{EndpointDescriptor, placeholders};
pub use error::DefinitionError;
pub use method::RestMethod;
pub use parameter::{ParameterDescriptor, ParameterLocation};
pub use security::{EndpointSecurity, SecurityDefinition, SecurityDefinitions, SecurityScheme};
pub use table::DescriptorTable;
