//! SQL schema for the Muster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Deleting a parent cascades down the hierarchy and into `band_member`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS commission (
    id          TEXT PRIMARY KEY,
    created_at  TEXT NOT NULL,          -- RFC 3339 UTC; store-assigned
    name_ar     TEXT NOT NULL DEFAULT '',
    name_en     TEXT NOT NULL DEFAULT '',
    code        TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS district (
    id            TEXT PRIMARY KEY,
    created_at    TEXT NOT NULL,
    name          TEXT NOT NULL DEFAULT '',
    code          TEXT NOT NULL DEFAULT '',
    commission_id TEXT REFERENCES commission(id) ON DELETE CASCADE
);

-- \"group\" is a keyword; every statement quotes identifiers.
CREATE TABLE IF NOT EXISTS \"group\" (
    id            TEXT PRIMARY KEY,
    created_at    TEXT NOT NULL,
    name          TEXT NOT NULL DEFAULT '',
    code          TEXT NOT NULL DEFAULT '',
    town_name     TEXT NOT NULL DEFAULT '',
    district_id   TEXT REFERENCES district(id)   ON DELETE CASCADE,
    commission_id TEXT REFERENCES commission(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS band (
    id            TEXT PRIMARY KEY,
    created_at    TEXT NOT NULL,
    name          TEXT NOT NULL DEFAULT '',
    code          TEXT NOT NULL DEFAULT '',
    town_name     TEXT NOT NULL DEFAULT '',
    group_id      TEXT REFERENCES \"group\"(id)   ON DELETE CASCADE,
    district_id   TEXT REFERENCES district(id)   ON DELETE CASCADE,
    commission_id TEXT REFERENCES commission(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS member (
    id            TEXT PRIMARY KEY,
    created_at    TEXT NOT NULL,
    name          TEXT NOT NULL DEFAULT '',
    code          TEXT NOT NULL DEFAULT '',
    civil_id      TEXT NOT NULL DEFAULT '',
    phone_number  TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS band_member (
    member_id TEXT NOT NULL REFERENCES member(id) ON DELETE CASCADE,
    band_id   TEXT NOT NULL REFERENCES band(id)   ON DELETE CASCADE,
    PRIMARY KEY (member_id, band_id)
);

CREATE INDEX IF NOT EXISTS district_commission_idx ON district(commission_id);
CREATE INDEX IF NOT EXISTS group_district_idx      ON \"group\"(district_id);
CREATE INDEX IF NOT EXISTS band_group_idx          ON band(group_id);
CREATE INDEX IF NOT EXISTS band_member_band_idx    ON band_member(band_id);

PRAGMA user_version = 1;
";
