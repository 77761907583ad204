// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::SettingRow;
use crate::diesel_schema::settings;
use crate::error::PersistenceError;

/// Retrieves a settings document, or `None` if it was never written.
///
/// # Errors
///
/// Returns an error if the query fails or the document is not JSON.
pub fn get_setting(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<serde_json::Value>, PersistenceError> {
    let row: Option<SettingRow> = settings::table
        .find(name)
        .select(SettingRow::as_select())
        .first::<SettingRow>(conn)
        .optional()?;

    match row {
        Some(row) => Ok(Some(serde_json::from_str(&row.document)?)),
        None => Ok(None),
    }
}
