//! `eligo-client` — HTTP access to the eligibility service.
//!
//! Every request goes through [`ApiGateway`], which stamps the session's
//! bearer credential and turns a 401 into a forced logout. The role-specific
//! surfaces ([`api`]) are thin typed wrappers on top of it.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod transport;

pub use api::{AdminApi, AuthApi, LoginError, PayerApi, ProviderApi};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, AuthError};
pub use gateway::ApiGateway;
pub use transport::{
    ApiRequest, ApiResponse, HttpTransport, Method, ReqwestTransport, TransportError,
};
