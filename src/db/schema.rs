//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// Name of the single table backing every module's settings.
pub const MODULES_TABLE: &str = "cms_modules";

/// SQLite schema includes:
/// - `cms_modules` table (one row per registered bcms module, settings as a JSON blob)
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Registered bcms modules
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS cms_modules (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL UNIQUE,
    cms_managed INTEGER NOT NULL DEFAULT 0,
    settings TEXT NOT NULL DEFAULT '{}', -- JSON object
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_cms_modules_managed ON cms_modules(cms_managed);
"#;
