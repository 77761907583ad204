// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Text;
use serde_json::Value;
use tracing::info;

use crate::diesel_schema::settings;
use crate::error::PersistenceError;
use crate::queries::settings::get_setting;

/// Reads a settings document, writing `defaults` first if it is absent.
///
/// # Errors
///
/// Returns an error if the read or the seeding write fails.
pub fn get_or_seed_setting(
    conn: &mut SqliteConnection,
    name: &str,
    defaults: &Value,
) -> Result<Value, PersistenceError> {
    conn.transaction::<Value, PersistenceError, _>(|conn| {
        if let Some(document) = get_setting(conn, name)? {
            return Ok(document);
        }

        diesel::insert_into(settings::table)
            .values((
                settings::name.eq(name),
                settings::document.eq(serde_json::to_string(defaults)?),
            ))
            .execute(conn)?;
        info!(setting = name, "Seeded settings document with defaults");
        Ok(defaults.clone())
    })
}

/// Writes a settings document, replacing any previous version.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn put_setting(
    conn: &mut SqliteConnection,
    name: &str,
    document: &Value,
) -> Result<(), PersistenceError> {
    let encoded: String = serde_json::to_string(document)?;

    diesel::insert_into(settings::table)
        .values((
            settings::name.eq(name),
            settings::document.eq(&encoded),
        ))
        .on_conflict(settings::name)
        .do_update()
        .set((
            settings::document.eq(&encoded),
            settings::updated_at.eq(sql::<Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;
    Ok(())
}

/// Deep-merges `patch` into `base`.
///
/// Objects merge key by key; any other patch value replaces the base value.
pub fn merge_document(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                merge_document(base.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (base, patch) => *base = patch.clone(),
    }
}
