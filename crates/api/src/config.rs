// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Engine configuration.
//!
//! Built by the server from its command line; the engine never reads the
//! environment itself.

use rentbook::{DEFAULT_AUTOPAY_LEAD_DAYS, NotificationKind};
use rentbook_domain::BookingRules;
use std::collections::HashMap;
use std::time::Duration;

/// Default per-call timeout for the store lock and external collaborators.
pub const DEFAULT_EXTERNAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Template ids per notification kind.
///
/// A kind without an explicit id uses its template key as the id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateIds {
    ids: HashMap<String, String>,
}

impl TemplateIds {
    /// Sets the template id for a template key.
    pub fn insert(&mut self, template_key: &str, template_id: &str) {
        self.ids
            .insert(template_key.to_string(), template_id.to_string());
    }

    /// Returns the template id for a notification.
    #[must_use]
    pub fn resolve(&self, kind: &NotificationKind) -> String {
        let key: &str = kind.template_key();
        self.ids
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Shared HMAC secret for inbound webhooks.
    pub webhook_secret: String,
    /// Recipients of admin alerts.
    pub admin_emails: Vec<String>,
    /// Deposit percent seeded into the booking rules on first read.
    pub deposit_percent: u32,
    pub autopay_lead_days: u32,
    /// Whether day-of reminders go out at most once per booking.
    pub guard_event_reminders: bool,
    pub external_timeout: Duration,
    /// Pay link used in balance reminders when no invoice was published.
    pub default_pay_link: Option<String>,
    pub review_link: Option<String>,
    pub templates: TemplateIds,
}

impl EngineConfig {
    /// Creates a configuration with defaults for everything but the secret.
    #[must_use]
    pub fn new(webhook_secret: &str) -> Self {
        Self {
            webhook_secret: webhook_secret.to_string(),
            admin_emails: Vec::new(),
            deposit_percent: 35,
            autopay_lead_days: DEFAULT_AUTOPAY_LEAD_DAYS,
            guard_event_reminders: true,
            external_timeout: DEFAULT_EXTERNAL_TIMEOUT,
            default_pay_link: None,
            review_link: None,
            templates: TemplateIds::default(),
        }
    }

    /// Booking rules seeded into the store when none are stored yet.
    #[must_use]
    pub fn default_rules(&self) -> BookingRules {
        BookingRules::with_deposit_percent(self.deposit_percent)
    }
}
