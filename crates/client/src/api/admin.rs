use core::str::FromStr;

use serde::{Deserialize, Serialize};

use eligo_auth::Role;
use eligo_core::{DomainError, OrganizationId};

use crate::error::ApiError;
use crate::gateway::ApiGateway;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganizationType {
    Provider,
    Payer,
}

impl FromStr for OrganizationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PROVIDER" => Ok(OrganizationType::Provider),
            "PAYER" => Ok(OrganizationType::Payer),
            _ => Err(DomainError::validation("organization type must be PROVIDER or PAYER")),
        }
    }
}

/// Roles an administrator may hand out. `SYSTEM_ADMIN` is not one of them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignableRole {
    ProviderUser,
    PayerUser,
}

impl From<AssignableRole> for Role {
    fn from(value: AssignableRole) -> Self {
        match value {
            AssignableRole::ProviderUser => Role::ProviderUser,
            AssignableRole::PayerUser => Role::PayerUser,
        }
    }
}

impl FromStr for AssignableRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Role::parse(&s.trim().to_ascii_uppercase()) {
            Role::ProviderUser => Ok(AssignableRole::ProviderUser),
            Role::PayerUser => Ok(AssignableRole::PayerUser),
            _ => Err(DomainError::validation("role must be PROVIDER_USER or PAYER_USER")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateOrganization {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OrganizationType,
}

impl CreateOrganization {
    pub fn new(name: impl Into<String>, kind: OrganizationType) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("organization name must not be empty"));
        }
        Ok(Self { name, kind })
    }
}

#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub role: AssignableRole,
    pub organization_id: OrganizationId,
}

impl CreateUser {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        role: AssignableRole,
        organization_id: OrganizationId,
    ) -> Result<Self, DomainError> {
        let username = username.into().trim().to_string();
        let password = password.into();
        if username.is_empty() {
            return Err(DomainError::validation("username must not be empty"));
        }
        if password.is_empty() {
            return Err(DomainError::validation("password must not be empty"));
        }
        Ok(Self {
            username,
            password,
            role,
            organization_id,
        })
    }
}

impl core::fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CreateUser")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("organization_id", &self.organization_id)
            .finish()
    }
}

/// `SYSTEM_ADMIN` operations.
pub struct AdminApi<'a> {
    gateway: &'a ApiGateway,
}

impl<'a> AdminApi<'a> {
    pub(crate) fn new(gateway: &'a ApiGateway) -> Self {
        Self { gateway }
    }

    pub async fn create_organization(&self, request: &CreateOrganization) -> Result<(), ApiError> {
        self.gateway.post("/admin/organizations", request).await?;
        tracing::info!(name = %request.name, kind = ?request.kind, "organization created");
        Ok(())
    }

    pub async fn create_user(&self, request: &CreateUser) -> Result<(), ApiError> {
        self.gateway.post("/admin/users", request).await?;
        tracing::info!(username = %request.username, role = ?request.role, "user created");
        Ok(())
    }
}
