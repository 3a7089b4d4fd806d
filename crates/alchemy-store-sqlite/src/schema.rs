//! SQL schema for the Alchemy SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision; future migrations will be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// The platform numbers questions, options and responses per survey, so
/// those identities are scoped by `survey_id`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS survey (
    id    INTEGER PRIMARY KEY,
    title TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS question (
    survey_id     INTEGER NOT NULL REFERENCES survey(id),
    id            INTEGER NOT NULL,
    parent_id     INTEGER,            -- owning TABLE/MATRIX question, if any
    title         TEXT    NOT NULL,
    shortname     TEXT,               -- NULL when the platform sent none
    base_type     INTEGER NOT NULL,   -- BaseType code
    question_type INTEGER NOT NULL,   -- QuestionType code
    PRIMARY KEY (survey_id, id),
    FOREIGN KEY (survey_id, parent_id) REFERENCES question(survey_id, id)
);

CREATE TABLE IF NOT EXISTS option (
    survey_id    INTEGER NOT NULL,
    id           INTEGER NOT NULL,
    question_id  INTEGER NOT NULL,
    value        TEXT    NOT NULL,
    option_order INTEGER NOT NULL,    -- 0-based declaration order
    PRIMARY KEY (survey_id, id),
    FOREIGN KEY (survey_id, question_id) REFERENCES question(survey_id, id)
);

CREATE TABLE IF NOT EXISTS response (
    survey_id INTEGER NOT NULL REFERENCES survey(id),
    id        INTEGER NOT NULL,
    PRIMARY KEY (survey_id, id)
);

-- One row per atomic answer. 0 in sub_question_id / option_id means
-- 'not applicable'.
CREATE TABLE IF NOT EXISTS answer (
    answer_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    survey_id       INTEGER NOT NULL,
    response_id     INTEGER NOT NULL,
    question_id     INTEGER NOT NULL,
    sub_question_id INTEGER NOT NULL DEFAULT 0,
    option_id       INTEGER NOT NULL DEFAULT 0,
    answer          TEXT,
    UNIQUE (survey_id, response_id, question_id, sub_question_id, option_id),
    FOREIGN KEY (survey_id, response_id) REFERENCES response(survey_id, id),
    FOREIGN KEY (survey_id, question_id) REFERENCES question(survey_id, id)
);

CREATE INDEX IF NOT EXISTS answer_question_idx ON answer(survey_id, question_id);

PRAGMA user_version = 1;
";
