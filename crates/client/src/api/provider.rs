use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use eligo_core::{MemberExternalId, ServiceCode};

use crate::error::ApiError;
use crate::gateway::ApiGateway;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityCheck {
    pub member_external_id: MemberExternalId,
    pub service_code: ServiceCode,
    pub request_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResult {
    pub eligible: bool,
    pub prior_auth_required: bool,
    #[serde(default)]
    pub reason_code: Option<String>,
}

/// `PROVIDER_USER` operations.
pub struct ProviderApi<'a> {
    gateway: &'a ApiGateway,
}

impl<'a> ProviderApi<'a> {
    pub(crate) fn new(gateway: &'a ApiGateway) -> Self {
        Self { gateway }
    }

    pub async fn check_eligibility(
        &self,
        request: &EligibilityCheck,
    ) -> Result<EligibilityResult, ApiError> {
        let result: EligibilityResult = self
            .gateway
            .post_json("/provider/eligibility/check", request)
            .await?;
        tracing::info!(
            member = %request.member_external_id,
            service = %request.service_code,
            eligible = result.eligible,
            "eligibility checked"
        );
        Ok(result)
    }
}

/// Message for a failed eligibility check.
pub fn eligibility_error_message(err: &ApiError) -> &'static str {
    match err.status() {
        Some(404) => "Member not found",
        Some(403) => "You are not authorized to perform this action",
        Some(401) => "Session expired. Please login again.",
        _ => "Unexpected error occurred",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use eligo_auth::testing::token_for_role;
    use serde_json::json;

    use crate::gateway::tests::{ScriptedTransport, gateway_with};

    use super::*;

    fn check() -> EligibilityCheck {
        EligibilityCheck {
            member_external_id: MemberExternalId::new("M-1").unwrap(),
            service_code: ServiceCode::new("XRAY").unwrap(),
            request_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        }
    }

    #[tokio::test]
    async fn check_returns_the_service_verdict() {
        let body = json!({
            "eligible": true,
            "priorAuthRequired": false,
            "reasonCode": "COVERED",
        })
        .to_string();
        let transport = Arc::new(ScriptedTransport::default()).respond(200, &body);
        let gateway = gateway_with(transport.clone());
        gateway.session().login(&token_for_role("PROVIDER_USER")).await.unwrap();

        let result = gateway.provider().check_eligibility(&check()).await.unwrap();
        assert!(result.eligible);
        assert_eq!(result.reason_code.as_deref(), Some("COVERED"));

        assert_eq!(
            transport.sent()[0].body,
            Some(json!({
                "memberExternalId": "M-1",
                "serviceCode": "XRAY",
                "requestDate": "2025-03-14",
            }))
        );
    }

    #[tokio::test]
    async fn unparseable_verdict_is_an_invalid_response() {
        let transport = Arc::new(ScriptedTransport::default()).respond(200, "<html>");
        let gateway = gateway_with(transport);

        let err = gateway.provider().check_eligibility(&check()).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[test]
    fn error_messages_follow_status() {
        let status = |status| ApiError::Status {
            status,
            body: String::new(),
        };
        assert_eq!(eligibility_error_message(&status(404)), "Member not found");
        assert_eq!(
            eligibility_error_message(&crate::AuthError::Forbidden.into()),
            "You are not authorized to perform this action"
        );
        assert_eq!(
            eligibility_error_message(&crate::AuthError::Unauthenticated.into()),
            "Session expired. Please login again."
        );
        assert_eq!(
            eligibility_error_message(&status(500)),
            "Unexpected error occurred"
        );
    }
}
