// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::create_test_persistence;
use crate::{BOOKING_RULES_SETTING, Persistence, merge_document};
use rentbook_domain::BookingRules;
use serde_json::{Value, json};

#[test]
fn test_first_read_seeds_defaults() {
    let mut persistence: Persistence = create_test_persistence();
    let defaults: BookingRules = BookingRules::with_deposit_percent(40);

    let rules: BookingRules = persistence.booking_rules(&defaults).unwrap();
    assert_eq!(rules, defaults);

    // Later reads return the stored document, not the caller's defaults.
    let other_defaults: BookingRules = BookingRules::default();
    let again: BookingRules = persistence.booking_rules(&other_defaults).unwrap();
    assert_eq!(again.deposit_percent, 40);
}

#[test]
fn test_put_booking_rules_replaces_document() {
    let mut persistence: Persistence = create_test_persistence();
    let mut rules: BookingRules = persistence.booking_rules(&BookingRules::default()).unwrap();
    rules.max_bookings_per_day = 5;
    rules.blackout_dates = vec![String::from("2025-07-04")];

    persistence.put_booking_rules(&rules).unwrap();

    let stored: BookingRules = persistence.booking_rules(&BookingRules::default()).unwrap();
    assert_eq!(stored, rules);
}

#[test]
fn test_generic_settings_roundtrip() {
    let mut persistence: Persistence = create_test_persistence();

    let seeded: Value = persistence
        .get_or_seed_setting("theme", &json!({"primary": "#ff0000"}))
        .unwrap();
    persistence
        .put_setting("theme", &json!({"primary": "#00ff00"}))
        .unwrap();
    let stored: Value = persistence
        .get_or_seed_setting("theme", &json!({}))
        .unwrap();

    assert_eq!(seeded["primary"], "#ff0000");
    assert_eq!(stored["primary"], "#00ff00");
    assert_ne!(BOOKING_RULES_SETTING, "theme");
}

#[test]
fn test_merge_document_merges_objects_recursively() {
    let mut base: Value = json!({
        "maxBookingsPerDay": 3,
        "hours": {"start": "08:00", "end": "10:00"},
        "blackoutDates": ["2025-01-01"]
    });

    merge_document(
        &mut base,
        &json!({"hours": {"end": "11:00"}, "blackoutDates": ["2025-12-25"]}),
    );

    assert_eq!(base["maxBookingsPerDay"], 3);
    assert_eq!(base["hours"]["start"], "08:00");
    assert_eq!(base["hours"]["end"], "11:00");
    assert_eq!(base["blackoutDates"], json!(["2025-12-25"]));
}
