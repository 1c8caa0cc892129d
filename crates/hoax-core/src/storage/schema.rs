//! SQLite schema for the game store.
//!
//! Tables:
//! - `folders`: story groupings, row 1 is the undeletable General folder
//! - `stories`: true/fake story pairs
//! - `rounds`: issued rounds and their server-held true slot
//! - `responses`: append-only answer log
//!
//! `stories.introduction` and `stories.hint` are additive columns, see
//! `store_internal::schema::migrate_story_columns_impl`.

/// DDL for the game tables.
///
/// Schema version: 2
pub const GAME_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS folders (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE COLLATE NOCASE
);

INSERT OR IGNORE INTO folders (id, name) VALUES (1, 'General');

CREATE TABLE IF NOT EXISTS stories (
    id            TEXT PRIMARY KEY,
    seq           INTEGER NOT NULL UNIQUE,
    folder_id     INTEGER NOT NULL DEFAULT 1 REFERENCES folders(id),
    event         TEXT NOT NULL,
    true_version  TEXT NOT NULL CHECK (length(trim(true_version)) > 0),
    fake_version  TEXT NOT NULL CHECK (length(trim(fake_version)) > 0),
    explanation   TEXT NOT NULL
);

-- Issued rounds; answered_at is set exactly once
CREATE TABLE IF NOT EXISTS rounds (
    round_token  TEXT PRIMARY KEY,
    story_id     TEXT NOT NULL REFERENCES stories(id),
    true_slot    TEXT NOT NULL CHECK (true_slot IN ('T', 'H')),
    issued_at    TEXT NOT NULL,
    answered_at  TEXT
);

-- Answer log (append-only, immutable)
CREATE TABLE IF NOT EXISTS responses (
    input_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id   TEXT NOT NULL,
    story_id     TEXT NOT NULL REFERENCES stories(id),
    choice       TEXT NOT NULL CHECK (choice IN ('T', 'H')),
    is_correct   INTEGER NOT NULL,
    round_token  TEXT NOT NULL UNIQUE REFERENCES rounds(round_token),
    answered_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_stories_folder_id
    ON stories(folder_id);
CREATE INDEX IF NOT EXISTS idx_rounds_story_id
    ON rounds(story_id);
CREATE INDEX IF NOT EXISTS idx_rounds_unanswered_issued_at
    ON rounds(issued_at) WHERE answered_at IS NULL;
CREATE INDEX IF NOT EXISTS idx_responses_session_id
    ON responses(session_id);
CREATE INDEX IF NOT EXISTS idx_responses_story_id
    ON responses(story_id);
"#;
