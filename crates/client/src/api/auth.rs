use serde::Serialize;
use thiserror::Error;

use eligo_auth::{Credential, Identity};
use eligo_session::{SessionError, StorageError};

use crate::error::ApiError;
use crate::gateway::ApiGateway;

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

impl core::fmt::Debug for LoginRequest<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl LoginError {
    /// Message for the login screen.
    pub fn user_message(&self) -> &'static str {
        match self {
            LoginError::Api(e) if e.is_unauthenticated() => "Invalid username or password",
            _ => "Unexpected error. Try again.",
        }
    }
}

pub struct AuthApi<'a> {
    gateway: &'a ApiGateway,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(gateway: &'a ApiGateway) -> Self {
        Self { gateway }
    }

    /// Exchange username/password for a credential and establish the session.
    ///
    /// The request carries no bearer, so a failed sign-in leaves any current
    /// session untouched. The error keeps its origin (service or local
    /// decode/storage).
    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, LoginError> {
        let response = self
            .gateway
            .post_anonymous("/auth/login", &LoginRequest { username, password })
            .await?;

        let credential =
            Credential::from_response_body(&response.body).map_err(SessionError::from)?;
        let identity = self.gateway.session().login(credential.expose()).await?;

        Ok(identity)
    }

    /// See [`eligo_session::SessionStore::logout`].
    pub async fn logout(&self) -> Option<StorageError> {
        self.gateway.session().logout().await
    }
}
