use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use eligo_core::{DomainError, MemberExternalId, PlanCode, ServiceCode};

use crate::error::ApiError;
use crate::gateway::{ApiGateway, path};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlan {
    pub plan_code: PlanCode,
    pub plan_name: String,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
}

impl CreatePlan {
    pub fn new(
        plan_code: PlanCode,
        plan_name: impl Into<String>,
        valid_from: NaiveDate,
        valid_to: NaiveDate,
    ) -> Result<Self, DomainError> {
        let plan_name = plan_name.into().trim().to_string();
        if plan_name.is_empty() {
            return Err(DomainError::validation("plan name must not be empty"));
        }
        if valid_from > valid_to {
            return Err(DomainError::validation("validFrom must not be after validTo"));
        }
        Ok(Self {
            plan_code,
            plan_name,
            valid_from,
            valid_to,
        })
    }
}

/// Coverage terms shared by create and update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageTerms {
    pub covered: bool,
    pub prior_auth_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u32>,
}

impl CoverageTerms {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let (Some(min), Some(max)) = (self.min_age, self.max_age) {
            if min > max {
                return Err(DomainError::validation("minAge must not exceed maxAge"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageRule {
    pub service_code: ServiceCode,
    #[serde(flatten)]
    pub terms: CoverageTerms,
}

impl CoverageRule {
    /// One rule per service, all with the same terms.
    pub fn for_services<I>(services: I, terms: CoverageTerms) -> Vec<CoverageRule>
    where
        I: IntoIterator<Item = ServiceCode>,
    {
        services
            .into_iter()
            .map(|service_code| CoverageRule {
                service_code,
                terms,
            })
            .collect()
    }
}

/// Services that already have a rule on a plan.
pub fn covered_services(rules: &[CoverageRule]) -> HashSet<&ServiceCode> {
    rules.iter().map(|r| &r.service_code).collect()
}

#[derive(Debug, Serialize)]
struct BulkRules<'a> {
    rules: &'a [CoverageRule],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollMember {
    pub member_external_id: MemberExternalId,
    pub full_name: String,
    pub age: u32,
    pub plan_code: PlanCode,
    pub coverage_start_date: NaiveDate,
    pub coverage_end_date: NaiveDate,
}

impl EnrollMember {
    pub fn new(
        member_external_id: MemberExternalId,
        full_name: impl Into<String>,
        age: u32,
        plan_code: PlanCode,
        coverage_start_date: NaiveDate,
        coverage_end_date: NaiveDate,
    ) -> Result<Self, DomainError> {
        let full_name = full_name.into().trim().to_string();
        if full_name.is_empty() {
            return Err(DomainError::validation("full name must not be empty"));
        }
        if coverage_start_date > coverage_end_date {
            return Err(DomainError::validation(
                "coverageStartDate must not be after coverageEndDate",
            ));
        }
        Ok(Self {
            member_external_id,
            full_name,
            age,
            plan_code,
            coverage_start_date,
            coverage_end_date,
        })
    }
}

/// `PAYER_USER` operations: plans, coverage rules, members.
pub struct PayerApi<'a> {
    gateway: &'a ApiGateway,
}

impl<'a> PayerApi<'a> {
    pub(crate) fn new(gateway: &'a ApiGateway) -> Self {
        Self { gateway }
    }

    pub async fn create_plan(&self, request: &CreatePlan) -> Result<(), ApiError> {
        self.gateway.post("/payer/plans", request).await?;
        tracing::info!(plan = %request.plan_code, "plan created");
        Ok(())
    }

    /// Rules on a plan. A plan with no rules (404) reads as an empty list.
    pub async fn list_rules(&self, plan: &PlanCode) -> Result<Vec<CoverageRule>, ApiError> {
        let url = path(&["payer", "plans", plan.as_str(), "rules"]);
        match self.gateway.get_json(&url).await {
            Ok(rules) => Ok(rules),
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Create several rules at once.
    ///
    /// The service answers 409 when any service already has a rule on the
    /// plan and 404 when the plan does not exist; both come back as
    /// `ApiError::Status`.
    pub async fn create_rules_bulk(
        &self,
        plan: &PlanCode,
        rules: &[CoverageRule],
    ) -> Result<(), ApiError> {
        if rules.is_empty() {
            return Err(DomainError::validation("select at least one service").into());
        }
        for rule in rules {
            rule.terms.validate()?;
        }

        let url = path(&["payer", "plans", plan.as_str(), "rules", "bulk"]);
        self.gateway.post(&url, &BulkRules { rules }).await?;
        tracing::info!(plan = %plan, count = rules.len(), "coverage rules created");
        Ok(())
    }

    pub async fn update_rule(
        &self,
        plan: &PlanCode,
        service: &ServiceCode,
        terms: &CoverageTerms,
    ) -> Result<(), ApiError> {
        terms.validate()?;

        let url = path(&["payer", "plans", plan.as_str(), "rules", service.as_str()]);
        self.gateway.put(&url, terms).await?;
        tracing::info!(plan = %plan, service = %service, "coverage rule updated");
        Ok(())
    }

    pub async fn enroll_member(&self, request: &EnrollMember) -> Result<(), ApiError> {
        self.gateway.post("/payer/members", request).await?;
        tracing::info!(
            member = %request.member_external_id,
            plan = %request.plan_code,
            "member enrolled"
        );
        Ok(())
    }
}
