// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Date arithmetic for the daily lifecycle run.
//!
//! The scheduler is not time-aware beyond "today"; every scan is an
//! exact event-date match against one of the dates computed here.

use crate::error::CoreError;
use rentbook_domain::offset_days;
use time::Date;

/// Default number of days before the event the balance is collected.
pub const DEFAULT_AUTOPAY_LEAD_DAYS: u32 = 2;

/// Day offsets after a completed event at which an anniversary note goes out.
pub const ANNIVERSARY_OFFSETS: [u32; 2] = [182, 365];

/// The event dates one scheduler run looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulePlan {
    /// The run date.
    pub today: Date,
    /// Events whose balance is collected today.
    pub autopay_date: Date,
    /// Events that happened yesterday.
    pub yesterday: Date,
    /// `(offset, event date)` pairs for anniversary notes.
    pub anniversaries: Vec<(u32, Date)>,
}

impl SchedulePlan {
    /// Computes the scan dates for a run on `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if any date leaves the supported calendar range.
    pub fn for_day(today: Date, autopay_lead_days: u32) -> Result<Self, CoreError> {
        let autopay_date: Date = offset_days(today, i64::from(autopay_lead_days))?;
        let yesterday: Date = offset_days(today, -1)?;
        let anniversaries: Vec<(u32, Date)> = ANNIVERSARY_OFFSETS
            .iter()
            .map(|days| offset_days(today, -i64::from(*days)).map(|date| (*days, date)))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            today,
            autopay_date,
            yesterday,
            anniversaries,
        })
    }
}
