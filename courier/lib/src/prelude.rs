//! Common imports for callers of the request engine.

pub use crate::auth::{ApiKeyLocation, Provider};
pub use crate::bag::ArgumentBag;
pub use crate::client::{ApiClient, ApiClientBuilder, CallOptions, Outcome, Requester};
pub use crate::error::{ApiError, AuthError, ClientError, ConfigError, ErrorObject, ValidationError};
pub use crate::gateway::{GatewayClient, GatewayHandler, GatewayRequest};
pub use crate::response::RawPayload;

pub use courier_define::prelude::*;
