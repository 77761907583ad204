// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Command-line and environment configuration.

use clap::Parser;
use rentbook::NotificationKind;
use rentbook_api::{EngineConfig, TemplateIds};
use std::path::PathBuf;
use std::time::Duration;

/// Prefix of the per-notification template id variables.
pub const TEMPLATE_ENV_PREFIX: &str = "RENTBOOK_TEMPLATE_";

/// rentbook server - booking lifecycle and payment reconciliation
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the `SQLite` database file. If not provided, uses an in-memory database.
    #[arg(short, long, env = "RENTBOOK_DATABASE")]
    pub database: Option<PathBuf>,

    /// Port to bind the server to
    #[arg(short, long, env = "RENTBOOK_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind the server to
    #[arg(long, env = "RENTBOOK_BIND", default_value = "127.0.0.1")]
    pub bind: String,

    /// Shared secret used to sign inbound payment webhooks
    #[arg(long, env = "RENTBOOK_WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: String,

    /// Base URL of the payment processor API
    #[arg(
        long,
        env = "RENTBOOK_PROCESSOR_URL",
        default_value = "https://connect.squareup.com"
    )]
    pub processor_base_url: String,

    /// Bearer token for the payment processor
    #[arg(long, env = "RENTBOOK_PROCESSOR_TOKEN", hide_env_values = true)]
    pub processor_token: String,

    /// Merchant location id at the payment processor
    #[arg(long, env = "RENTBOOK_PROCESSOR_LOCATION")]
    pub processor_location: String,

    /// Base URL of the mail API
    #[arg(long, env = "RENTBOOK_MAIL_URL", default_value = "https://api.resend.com")]
    pub mail_base_url: String,

    /// API key for the mail API
    #[arg(long, env = "RENTBOOK_MAIL_API_KEY", hide_env_values = true)]
    pub mail_api_key: String,

    /// Sender of every outbound email
    #[arg(
        long,
        env = "RENTBOOK_MAIL_FROM",
        default_value = "Bookings <no-reply@example.com>"
    )]
    pub mail_from: String,

    /// Admin alert recipient; repeat the flag or pass a comma separated list
    #[arg(
        long = "admin-email",
        env = "RENTBOOK_ADMIN_EMAILS",
        value_delimiter = ',',
        required = true
    )]
    pub admin_emails: Vec<String>,

    /// Deposit share of the total, in percent
    #[arg(long, env = "RENTBOOK_DEPOSIT_PERCENT", default_value_t = 35)]
    pub deposit_percent: u32,

    /// Days before the event that the remaining balance is charged
    #[arg(long, env = "RENTBOOK_AUTOPAY_LEAD_DAYS", default_value_t = 2)]
    pub autopay_lead_days: u32,

    /// Send the day-of event reminder at most once per booking
    #[arg(
        long,
        env = "RENTBOOK_GUARD_EVENT_REMINDERS",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub guard_event_reminders: bool,

    /// Timeout for each payment processor or mail call, in seconds
    #[arg(long, env = "RENTBOOK_EXTERNAL_TIMEOUT_SECS", default_value_t = 10)]
    pub external_timeout_secs: u64,

    /// Pay link used in balance reminders when no invoice was published
    #[arg(long, env = "RENTBOOK_DEFAULT_PAY_LINK")]
    pub default_pay_link: Option<String>,

    /// Link included in review request emails
    #[arg(long, env = "RENTBOOK_REVIEW_LINK")]
    pub review_link: Option<String>,

    /// JSON file of legacy booking documents to import at startup
    #[arg(long)]
    pub import_legacy: Option<PathBuf>,
}

impl Args {
    pub const fn external_timeout(&self) -> Duration {
        Duration::from_secs(self.external_timeout_secs)
    }

    /// Builds the engine configuration.
    ///
    /// `lookup` resolves template id variables; the binary passes the
    /// process environment.
    pub fn engine_config<F>(&self, lookup: F) -> EngineConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: EngineConfig = EngineConfig::new(&self.webhook_secret);
        config.admin_emails = self
            .admin_emails
            .iter()
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .collect();
        config.deposit_percent = self.deposit_percent;
        config.autopay_lead_days = self.autopay_lead_days;
        config.guard_event_reminders = self.guard_event_reminders;
        config.external_timeout = self.external_timeout();
        config.default_pay_link.clone_from(&self.default_pay_link);
        config.review_link.clone_from(&self.review_link);
        config.templates = templates_from(lookup);
        config
    }
}

/// Reads `RENTBOOK_TEMPLATE_<KIND>` for every notification kind.
pub fn templates_from<F>(lookup: F) -> TemplateIds
where
    F: Fn(&str) -> Option<String>,
{
    let mut templates: TemplateIds = TemplateIds::default();
    for key in NotificationKind::TEMPLATE_KEYS {
        let variable: String = format!("{TEMPLATE_ENV_PREFIX}{}", key.to_uppercase());
        if let Some(id) = lookup(&variable).filter(|id| !id.trim().is_empty()) {
            templates.insert(key, id.trim());
        }
    }
    templates
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 11] = [
        "rentbook-server",
        "--webhook-secret",
        "shh",
        "--processor-token",
        "tok",
        "--processor-location",
        "LOC1",
        "--mail-api-key",
        "key",
        "--admin-email",
        "owner@example.com,crew@example.com",
    ];

    #[test]
    fn test_defaults_apply() {
        let args: Args = Args::try_parse_from(REQUIRED).unwrap();
        let config: EngineConfig = args.engine_config(|_| None);

        assert_eq!(args.port, 3000);
        assert_eq!(args.bind, "127.0.0.1");
        assert_eq!(args.processor_base_url, "https://connect.squareup.com");
        assert_eq!(
            config.admin_emails,
            vec![
                String::from("owner@example.com"),
                String::from("crew@example.com")
            ]
        );
        assert_eq!(config.deposit_percent, 35);
        assert_eq!(config.autopay_lead_days, 2);
        assert!(config.guard_event_reminders);
        assert_eq!(config.external_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_event_reminder_guard_can_be_disabled() {
        let mut argv: Vec<&str> = REQUIRED.to_vec();
        argv.extend(["--guard-event-reminders", "false"]);

        let args: Args = Args::try_parse_from(argv).unwrap();

        assert!(!args.engine_config(|_| None).guard_event_reminders);
    }

    #[test]
    fn test_missing_secret_is_refused() {
        let argv: Vec<&str> = REQUIRED
            .iter()
            .copied()
            .filter(|arg| *arg != "--webhook-secret" && *arg != "shh")
            .collect();

        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_template_ids_come_from_variables() {
        let templates: TemplateIds = templates_from(|name| match name {
            "RENTBOOK_TEMPLATE_DEPOSIT_RECEIVED" => Some(String::from("tmpl-deposit")),
            "RENTBOOK_TEMPLATE_REVIEW_REQUEST" => Some(String::from("  ")),
            _ => None,
        });

        assert_eq!(
            templates.resolve(&NotificationKind::DepositReceived),
            "tmpl-deposit"
        );
        assert_eq!(
            templates.resolve(&NotificationKind::ReviewRequest),
            "review_request"
        );
    }
}
