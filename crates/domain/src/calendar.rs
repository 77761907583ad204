// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calendar invite attached to the deposit confirmation.

use crate::dates::format_compact_date;
use crate::types::Booking;

/// Attachment file name used for invites.
pub const INVITE_FILENAME: &str = "event-reminder.ics";

/// Default delivery time, UTC.
const EVENT_START: &str = "T120000Z";
/// Default pickup time, UTC.
const EVENT_END: &str = "T160000Z";

/// A rendered calendar file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarInvite {
    pub filename: String,
    pub content: String,
}

/// Renders an iCalendar invite for a booking's event date.
#[must_use]
pub fn render_invite(booking: &Booking) -> CalendarInvite {
    let day: String = format_compact_date(booking.event_date);
    let location: &str = booking.address.as_deref().unwrap_or("TBD");
    let lines: [String; 11] = [
        String::from("BEGIN:VCALENDAR"),
        String::from("VERSION:2.0"),
        String::from("PRODID:-//rentbook//Booking//EN"),
        String::from("BEGIN:VEVENT"),
        format!("UID:{}@rentbook", booking.booking_id),
        format!("DTSTART:{day}{EVENT_START}"),
        format!("DTEND:{day}{EVENT_END}"),
        format!("SUMMARY:{}", escape_text(&format!("Rental: {}", booking.customer.name))),
        format!(
            "DESCRIPTION:{}",
            escape_text(&format!("Remaining Balance: {}", booking.pricing.remaining))
        ),
        format!("LOCATION:{}", escape_text(location)),
        String::from("END:VEVENT\r\nEND:VCALENDAR"),
    ];

    let mut content: String = lines.join("\r\n");
    content.push_str("\r\n");
    CalendarInvite {
        filename: String::from(INVITE_FILENAME),
        content,
    }
}

/// Escapes iCalendar TEXT values.
fn escape_text(value: &str) -> String {
    let mut escaped: String = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}
