// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! - `bookings` — booking inserts, merges, deletes and transition writes
//! - `settings` — settings documents with seeded defaults

pub mod bookings;
pub mod settings;
