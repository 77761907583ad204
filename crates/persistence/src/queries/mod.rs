// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `bookings` — single lookups and field scans over booking documents
//! - `events` — the transition audit trail
//! - `settings` — named settings documents

pub mod bookings;
pub mod events;
pub mod settings;

pub use bookings::BookingField;
