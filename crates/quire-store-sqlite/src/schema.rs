//! Database schema.
//!
//! Statements are idempotent and run on every connect.

/// DDL statements, in dependency order.
pub(crate) const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS menus (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        url_slug TEXT NOT NULL,
        disabled INTEGER NOT NULL DEFAULT 0,
        parent_id INTEGER REFERENCES menus(id) ON DELETE CASCADE,
        redirect_to TEXT,
        position INTEGER NOT NULL DEFAULT 0
    )",
    // Root slugs are unique; child slugs are unique per parent.
    "CREATE UNIQUE INDEX IF NOT EXISTS unique_parent_url_slug
        ON menus(url_slug) WHERE parent_id IS NULL",
    "CREATE UNIQUE INDEX IF NOT EXISTS unique_child_url_slug
        ON menus(parent_id, url_slug) WHERE parent_id IS NOT NULL",
    "CREATE TABLE IF NOT EXISTS content_sections (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        key TEXT,
        static_location TEXT,
        menu_id INTEGER UNIQUE REFERENCES menus(id) ON DELETE CASCADE
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS unique_static_section_key
        ON content_sections(key) WHERE menu_id IS NULL",
    "CREATE TABLE IF NOT EXISTS content_blocks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        section_id INTEGER REFERENCES content_sections(id) ON DELETE CASCADE,
        disabled INTEGER NOT NULL DEFAULT 0,
        key TEXT,
        static_location TEXT,
        position INTEGER NOT NULL DEFAULT 0,
        kind TEXT NOT NULL,
        payload TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS content_blocks_section_position
        ON content_blocks(section_id, position)",
    "CREATE UNIQUE INDEX IF NOT EXISTS unique_static_block_key
        ON content_blocks(kind, key) WHERE section_id IS NULL",
    "CREATE TABLE IF NOT EXISTS blurbs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        identifier TEXT UNIQUE,
        label TEXT,
        content TEXT,
        plain_text INTEGER NOT NULL DEFAULT 0,
        last_known_location TEXT
    )",
    "CREATE INDEX IF NOT EXISTS blurbs_location_identifier
        ON blurbs(last_known_location, identifier)",
    "CREATE TABLE IF NOT EXISTS image_blurbs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        identifier TEXT UNIQUE,
        label TEXT,
        image TEXT,
        placeholder TEXT,
        last_known_location TEXT
    )",
    "CREATE INDEX IF NOT EXISTS image_blurbs_location_identifier
        ON image_blurbs(last_known_location, identifier)",
];
