// crates/db/src/migrations.rs
/// Inline SQL migrations for the folio database schema.
///
/// We use simple inline migrations rather than sqlx migration files
/// because the schema is small and self-contained. Each entry is a
/// single statement; `run_migrations` records the applied version.

pub const MIGRATIONS: &[&str] = &[
    // Migration 1: journeys table — one row per tracked browsing session.
    // `events` and `actions` hold JSON arrays; `revision` guards
    // concurrent read-modify-write cycles.
    r#"
CREATE TABLE IF NOT EXISTS journeys (
    session_id TEXT PRIMARY KEY,
    visitor_id TEXT NOT NULL,
    landing_page TEXT NOT NULL,
    referrer TEXT,
    user_agent TEXT NOT NULL DEFAULT '',
    device_type TEXT NOT NULL DEFAULT 'desktop',
    os TEXT NOT NULL DEFAULT 'Unknown',
    browser TEXT NOT NULL DEFAULT 'Unknown',
    country TEXT,
    region TEXT,
    started_at INTEGER NOT NULL,
    ended_at INTEGER,
    total_duration_secs INTEGER NOT NULL DEFAULT 0,
    events TEXT NOT NULL DEFAULT '[]',
    actions TEXT NOT NULL DEFAULT '[]',
    revision INTEGER NOT NULL DEFAULT 0
);
"#,
    // Migration 2: journeys indexes
    r#"
CREATE INDEX IF NOT EXISTS idx_journeys_visitor ON journeys(visitor_id);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_journeys_started ON journeys(started_at DESC);
"#,
    // Migration 3: visitor_stats table — one row per returning visitor
    r#"
CREATE TABLE IF NOT EXISTS visitor_stats (
    visitor_id TEXT PRIMARY KEY,
    visit_count INTEGER NOT NULL DEFAULT 0,
    first_visit_at INTEGER NOT NULL,
    last_visit_at INTEGER NOT NULL,
    display_name TEXT,
    last_device TEXT,
    last_locale TEXT
);
"#,
    // Migration 4: visits table — one row per page view
    r#"
CREATE TABLE IF NOT EXISTS visits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    visitor_id TEXT NOT NULL,
    page TEXT NOT NULL,
    referrer TEXT,
    visited_at INTEGER NOT NULL
);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_visits_time ON visits(visited_at);
"#,
    // Migration 5: posts + comments
    r#"
CREATE TABLE IF NOT EXISTS posts (
    id TEXT PRIMARY KEY,
    slug TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    summary TEXT NOT NULL DEFAULT '',
    body TEXT NOT NULL DEFAULT '',
    tags TEXT NOT NULL DEFAULT '[]',
    published BOOLEAN NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
"#,
    r#"
CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    post_id TEXT NOT NULL REFERENCES posts(id),
    author TEXT NOT NULL,
    body TEXT NOT NULL,
    approved BOOLEAN NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id);
"#,
    // Migration 6: contact messages
    r#"
CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    subject TEXT,
    body TEXT NOT NULL,
    read BOOLEAN NOT NULL DEFAULT 0,
    received_at INTEGER NOT NULL
);
"#,
    // Migration 7: portfolio singleton — the whole document lives in one
    // JSON column so edits replace it atomically
    r#"
CREATE TABLE IF NOT EXISTS portfolio (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    doc TEXT NOT NULL DEFAULT '{}',
    updated_at INTEGER NOT NULL DEFAULT 0
);
"#,
    r#"
INSERT OR IGNORE INTO portfolio (id, doc, updated_at) VALUES (1, '{}', 0);
"#,
    // Migration 8: feature flags, seeded with the toggles the frontend knows
    r#"
CREATE TABLE IF NOT EXISTS feature_flags (
    key TEXT PRIMARY KEY,
    enabled BOOLEAN NOT NULL DEFAULT 0,
    note TEXT,
    updated_at INTEGER NOT NULL DEFAULT 0
);
"#,
    r#"
INSERT OR IGNORE INTO feature_flags (key, enabled, note, updated_at) VALUES
    ('chat', 1, 'assistant widget on the landing page', 0),
    ('comments', 1, 'comment form under blog posts', 0),
    ('particle-cursor', 1, 'decorative cursor trail', 0),
    ('sound-effects', 0, 'UI click sounds', 0);
"#,
    // Migration 9: admin accounts
    r#"
CREATE TABLE IF NOT EXISTS admin_users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    salt TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'admin',
    created_at INTEGER NOT NULL
);
"#,
];
