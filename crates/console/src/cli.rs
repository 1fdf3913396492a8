//! Command-line surface of the `eligo` binary.
//!
//! Flags win over environment variables, which win over defaults.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use eligo_client::api::{AssignableRole, CoverageTerms, OrganizationType};
use eligo_core::{MemberExternalId, OrganizationId, PlanCode, ServiceCode};
use eligo_observability::LogFormat;

/// Admin console for the eligibility service.
#[derive(Parser, Debug)]
#[command(name = "eligo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Service root URL (also: ELIGO_API_URL)
    #[arg(long, env = "ELIGO_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Where the session credential is kept between runs (also: ELIGO_SESSION_FILE)
    #[arg(long, env = "ELIGO_SESSION_FILE", value_name = "PATH", global = true)]
    pub session_file: Option<PathBuf>,

    /// Log output: pretty or json (also: ELIGO_LOG_FORMAT)
    #[arg(long, env = "ELIGO_LOG_FORMAT", global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and keep the session for later commands
    Login {
        username: String,

        /// Read from stdin when omitted
        #[arg(long, env = "ELIGO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// End the current session
    Logout,

    /// Show the current role, view and what it may do
    Whoami,

    /// SYSTEM_ADMIN commands
    #[command(subcommand)]
    Admin(AdminCommand),

    /// PAYER_USER commands
    #[command(subcommand)]
    Payer(PayerCommand),

    /// PROVIDER_USER commands
    #[command(subcommand)]
    Provider(ProviderCommand),
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Create a provider or payer organization
    CreateOrg {
        name: String,

        /// PROVIDER or PAYER
        #[arg(long = "type")]
        kind: OrganizationType,
    },

    /// Create a user inside an organization
    CreateUser {
        username: String,

        #[arg(long)]
        password: String,

        /// PROVIDER_USER or PAYER_USER
        #[arg(long)]
        role: AssignableRole,

        #[arg(long = "org")]
        organization_id: OrganizationId,
    },
}

#[derive(Subcommand, Debug)]
pub enum PayerCommand {
    /// Create an insurance plan
    CreatePlan {
        code: PlanCode,

        #[arg(long)]
        name: String,

        /// First valid day (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// Last valid day (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },

    /// List the coverage rules of a plan
    Rules { plan: PlanCode },

    /// Add the same coverage terms for several services at once
    AddRules {
        plan: PlanCode,

        /// Repeat for each service
        #[arg(long = "service", required = true)]
        services: Vec<ServiceCode>,

        #[command(flatten)]
        terms: TermsArgs,
    },

    /// Replace the terms of one service's rule
    UpdateRule {
        plan: PlanCode,
        service: ServiceCode,

        #[command(flatten)]
        terms: TermsArgs,
    },

    /// Enroll a member in a plan
    Enroll {
        #[arg(long)]
        member: MemberExternalId,

        #[arg(long)]
        name: String,

        #[arg(long)]
        age: u32,

        #[arg(long)]
        plan: PlanCode,

        #[arg(long)]
        start: NaiveDate,

        #[arg(long)]
        end: NaiveDate,
    },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct TermsArgs {
    /// Record the service as not covered
    #[arg(long)]
    pub not_covered: bool,

    #[arg(long)]
    pub prior_auth: bool,

    #[arg(long)]
    pub min_age: Option<u32>,

    #[arg(long)]
    pub max_age: Option<u32>,
}

impl From<TermsArgs> for CoverageTerms {
    fn from(args: TermsArgs) -> Self {
        CoverageTerms {
            covered: !args.not_covered,
            prior_auth_required: args.prior_auth,
            min_age: args.min_age,
            max_age: args.max_age,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ProviderCommand {
    /// Check whether a member is covered for a service
    Check {
        #[arg(long)]
        member: MemberExternalId,

        #[arg(long)]
        service: ServiceCode,

        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("eligo").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn add_rules_collects_services_and_terms() {
        let cli = parse(&[
            "payer", "add-rules", "GOLD", "--service", "XRAY", "--service", "MRI", "--prior-auth",
            "--min-age", "18",
        ]);
        let Command::Payer(PayerCommand::AddRules { plan, services, terms }) = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(plan.as_str(), "GOLD");
        assert_eq!(services.len(), 2);

        let terms = CoverageTerms::from(terms);
        assert!(terms.covered);
        assert!(terms.prior_auth_required);
        assert_eq!(terms.min_age, Some(18));
        assert_eq!(terms.max_age, None);
    }

    #[test]
    fn blank_identifiers_are_rejected_at_parse_time() {
        let res = Cli::try_parse_from(["eligo", "payer", "rules", "  "]);
        assert!(res.is_err());
    }

    #[test]
    fn admin_create_user_parses_role_and_org() {
        let cli = parse(&[
            "admin",
            "create-user",
            "dana",
            "--password",
            "pw",
            "--role",
            "payer_user",
            "--org",
            "7",
        ]);
        let Command::Admin(AdminCommand::CreateUser {
            role,
            organization_id,
            ..
        }) = cli.command
        else {
            panic!("wrong command");
        };
        assert_eq!(role, AssignableRole::PayerUser);
        assert_eq!(organization_id.get(), 7);
    }

    #[test]
    fn global_flags_work_after_the_subcommand() {
        let cli = parse(&["whoami", "--api-url", "http://svc:9000", "--log-format", "json"]);
        assert_eq!(cli.api_url.as_deref(), Some("http://svc:9000"));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
    }
}
