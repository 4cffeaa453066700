//! SQLite schema definition

/// Name of the sequence row backing `fileNNN` identifiers
pub const DOCUMENT_SEQUENCE: &str = "document";

/// SQL schema for the study-helper database
pub const SCHEMA_SQL: &str = r#"
-- Sequences: serialized identifier allocation
CREATE TABLE IF NOT EXISTS id_sequences (
    name TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);

-- Documents: extracted text plus derived search vector
CREATE TABLE IF NOT EXISTS documents (
    file_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    file_type TEXT NOT NULL,
    content TEXT,
    search_vector TEXT NOT NULL,
    token_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

-- Document terms: inverted index over search vectors
CREATE TABLE IF NOT EXISTS document_terms (
    term TEXT NOT NULL,
    file_id TEXT NOT NULL REFERENCES documents(file_id),
    frequency INTEGER NOT NULL,
    PRIMARY KEY (term, file_id)
);

-- Quizzes
CREATE TABLE IF NOT EXISTS quizzes (
    quiz_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    difficulty TEXT NOT NULL,
    topic TEXT NOT NULL,
    number_of_questions INTEGER NOT NULL,
    question_type TEXT NOT NULL,
    custom_instructions TEXT,
    created_at TEXT NOT NULL
);

-- Questions: owned by a quiz, ordered by position
CREATE TABLE IF NOT EXISTS questions (
    question_id TEXT PRIMARY KEY,
    quiz_id TEXT NOT NULL REFERENCES quizzes(quiz_id),
    position INTEGER NOT NULL,
    question TEXT NOT NULL,
    options_json TEXT NOT NULL,
    correct_answer TEXT NOT NULL,
    UNIQUE(quiz_id, position)
);

-- Submissions: append-only answer log
CREATE TABLE IF NOT EXISTS quiz_submissions (
    submission_id TEXT PRIMARY KEY,
    quiz_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    question_id TEXT NOT NULL,
    selected_answer TEXT NOT NULL,
    is_correct INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

-- Indexes for performance
CREATE INDEX IF NOT EXISTS idx_documents_type ON documents(file_type);
CREATE INDEX IF NOT EXISTS idx_documents_name ON documents(name);
CREATE INDEX IF NOT EXISTS idx_terms_file ON document_terms(file_id);
CREATE INDEX IF NOT EXISTS idx_quizzes_created ON quizzes(created_at);
CREATE INDEX IF NOT EXISTS idx_questions_quiz ON questions(quiz_id);
CREATE INDEX IF NOT EXISTS idx_submissions_quiz ON quiz_submissions(quiz_id, created_at);
CREATE INDEX IF NOT EXISTS idx_submissions_user ON quiz_submissions(user_id);

-- Seed the document sequence from any ids already allocated
INSERT OR IGNORE INTO id_sequences (name, value) VALUES ('document', 0);
UPDATE id_sequences
SET value = MAX(
    value,
    (SELECT COALESCE(MAX(CAST(SUBSTR(file_id, 5) AS INTEGER)), 0)
     FROM documents WHERE file_id LIKE 'file%')
)
WHERE name = 'document';
"#;
