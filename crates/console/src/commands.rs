//! Command execution: the console is the view renderer for whatever role the
//! stored session carries.

use std::io::Write;

use anyhow::{Context, anyhow};
use chrono::Utc;

use eligo_auth::{AuthzError, Capability, authorize};
use eligo_client::api::{
    CoverageRule, CoverageTerms, CreateOrganization, CreatePlan, CreateUser, EligibilityCheck,
    EnrollMember, eligibility_error_message,
};
use eligo_client::{ApiError, ApiGateway};

use crate::cli::{AdminCommand, Command, PayerCommand, ProviderCommand};

pub struct Console {
    gateway: ApiGateway,
}

impl Console {
    pub fn new(gateway: ApiGateway) -> Self {
        Self { gateway }
    }

    /// Run one command, writing user-facing output to `out`.
    pub async fn run<W: Write>(&self, command: Command, out: &mut W) -> anyhow::Result<()> {
        match command {
            Command::Login { username, password } => self.login(&username, password, out).await,
            Command::Logout => {
                let leftover = self.gateway.auth().logout().await;
                writeln!(out, "Logged out")?;
                match leftover {
                    Some(e) => Err(anyhow::Error::new(e).context(
                        "the saved session could not be removed; delete the session file",
                    )),
                    None => Ok(()),
                }
            }
            Command::Whoami => self.whoami(out),
            Command::Admin(cmd) => self.admin(cmd, out).await,
            Command::Payer(cmd) => self.payer(cmd, out).await,
            Command::Provider(cmd) => self.provider(cmd, out).await,
        }
    }

    /// Client-side gate, checked before any request leaves the process.
    fn require(&self, capability: Capability) -> anyhow::Result<()> {
        let view = self.gateway.session().current_view();
        authorize(view, capability).map_err(|e| match e {
            AuthzError::LoginRequired => anyhow!("Not logged in. Run `eligo login` first."),
            AuthzError::UnrecognizedRole => {
                anyhow!("Your account's role is not recognized by this client.")
            }
            AuthzError::Forbidden { view, capability } => {
                anyhow!("'{capability}' is not available from the {view} view")
            }
        })
    }

    async fn login<W: Write>(
        &self,
        username: &str,
        password: Option<String>,
        out: &mut W,
    ) -> anyhow::Result<()> {
        // Signing in again replaces the current session.
        if self.gateway.session().is_authenticated() {
            tracing::debug!("logging in over an existing session");
        }
        let password = password.context("a password is required")?;

        let identity = self
            .gateway
            .auth()
            .login(username, &password)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "login failed");
                anyhow!(e.user_message())
            })?;

        let view = self.gateway.session().current_view();
        writeln!(out, "Logged in as {} ({view})", identity.role)?;
        Ok(())
    }

    fn whoami<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        let Some(session) = self.gateway.session().current_session() else {
            writeln!(out, "Not logged in")?;
            return Ok(());
        };
        let identity = session.identity();
        let view = session.view();

        writeln!(out, "role: {}", identity.role)?;
        writeln!(out, "view: {view}")?;
        if let Some(subject) = &identity.subject {
            writeln!(out, "subject: {subject}")?;
        }
        if let Some(exp) = identity.expires_at {
            let note = if identity.is_expired_at(Utc::now()) { " (expired)" } else { "" };
            writeln!(out, "expires: {}{note}", exp.to_rfc3339())?;
        }
        for capability in view.capabilities() {
            writeln!(out, "  can: {capability}")?;
        }
        Ok(())
    }

    async fn admin<W: Write>(&self, cmd: AdminCommand, out: &mut W) -> anyhow::Result<()> {
        let admin = self.gateway.admin();
        match cmd {
            AdminCommand::CreateOrg { name, kind } => {
                self.require(Capability::CreateOrganization)?;
                let req = CreateOrganization::new(name, kind)?;
                admin.create_organization(&req).await.map_err(describe)?;
                writeln!(out, "Organization '{}' created", req.name)?;
            }
            AdminCommand::CreateUser {
                username,
                password,
                role,
                organization_id,
            } => {
                self.require(Capability::CreateUser)?;
                let req = CreateUser::new(username, password, role, organization_id)?;
                admin.create_user(&req).await.map_err(describe)?;
                writeln!(out, "User '{}' created", req.username)?;
            }
        }
        Ok(())
    }

    async fn payer<W: Write>(&self, cmd: PayerCommand, out: &mut W) -> anyhow::Result<()> {
        let payer = self.gateway.payer();
        match cmd {
            PayerCommand::CreatePlan { code, name, from, to } => {
                self.require(Capability::CreatePlan)?;
                let req = CreatePlan::new(code, name, from, to)?;
                payer.create_plan(&req).await.map_err(describe)?;
                writeln!(out, "Plan {} created", req.plan_code)?;
            }
            PayerCommand::Rules { plan } => {
                self.require(Capability::ReadCoverageRules)?;
                let rules = payer.list_rules(&plan).await.map_err(describe)?;
                if rules.is_empty() {
                    writeln!(out, "No coverage rules for plan {plan}")?;
                }
                for rule in &rules {
                    writeln!(out, "{}", format_rule(rule))?;
                }
            }
            PayerCommand::AddRules {
                plan,
                services,
                terms,
            } => {
                self.require(Capability::CreateCoverageRules)?;
                let rules = CoverageRule::for_services(services, terms.into());
                payer
                    .create_rules_bulk(&plan, &rules)
                    .await
                    .map_err(|e| match e.status() {
                        Some(409) => {
                            anyhow!("Rules already exist for one or more selected services")
                        }
                        Some(404) => anyhow!("Plan {plan} not found"),
                        _ => describe(e),
                    })?;
                writeln!(out, "{} rule(s) added to plan {plan}", rules.len())?;
            }
            PayerCommand::UpdateRule {
                plan,
                service,
                terms,
            } => {
                self.require(Capability::UpdateCoverageRule)?;
                let terms = CoverageTerms::from(terms);
                payer
                    .update_rule(&plan, &service, &terms)
                    .await
                    .map_err(describe)?;
                writeln!(out, "Rule for {service} on plan {plan} updated")?;
            }
            PayerCommand::Enroll {
                member,
                name,
                age,
                plan,
                start,
                end,
            } => {
                self.require(Capability::EnrollMember)?;
                let req = EnrollMember::new(member, name, age, plan, start, end)?;
                payer.enroll_member(&req).await.map_err(describe)?;
                writeln!(
                    out,
                    "Member {} enrolled in plan {}",
                    req.member_external_id, req.plan_code
                )?;
            }
        }
        Ok(())
    }

    async fn provider<W: Write>(&self, cmd: ProviderCommand, out: &mut W) -> anyhow::Result<()> {
        match cmd {
            ProviderCommand::Check {
                member,
                service,
                date,
            } => {
                self.require(Capability::CheckEligibility)?;
                let req = EligibilityCheck {
                    member_external_id: member,
                    service_code: service,
                    request_date: date.unwrap_or_else(|| Utc::now().date_naive()),
                };
                let result = self
                    .gateway
                    .provider()
                    .check_eligibility(&req)
                    .await
                    .map_err(|e| anyhow!(eligibility_error_message(&e)))?;

                writeln!(out, "eligible: {}", yes_no(result.eligible))?;
                writeln!(out, "prior auth required: {}", yes_no(result.prior_auth_required))?;
                if let Some(reason) = &result.reason_code {
                    writeln!(out, "reason: {reason}")?;
                }
            }
        }
        Ok(())
    }
}

fn describe(err: ApiError) -> anyhow::Error {
    if err.is_unauthenticated() {
        return anyhow!("Session expired. Please login again.");
    }
    if err.is_forbidden() {
        return anyhow!("You are not authorized to perform this action");
    }
    match err {
        ApiError::Validation(e) => anyhow!("{e}"),
        other => anyhow::Error::new(other).context("request failed"),
    }
}

fn format_rule(rule: &CoverageRule) -> String {
    let t = &rule.terms;
    let ages = match (t.min_age, t.max_age) {
        (None, None) => "any age".to_string(),
        (Some(min), None) => format!("age {min}+"),
        (None, Some(max)) => format!("age up to {max}"),
        (Some(min), Some(max)) => format!("age {min}-{max}"),
    };
    format!(
        "{:<12} covered: {:<3} prior auth: {:<3} {ages}",
        rule.service_code,
        yes_no(t.covered),
        yes_no(t.prior_auth_required)
    )
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
