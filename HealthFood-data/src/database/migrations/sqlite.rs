use rusqlite::{Connection, OptionalExtension};
use tracing::{info, warn};

/// Version of the schema created by [`run_migrations`]
pub const SCHEMA_VERSION: i64 = 3;

/// Tables in drop order: children before parents
const TABLES: &[&str] = &[
    "meal_logs",
    "activity_logs",
    "health_plan_meals",
    "health_plan_activities",
    "health_plans",
    "chat_messages",
    "chat_sessions",
    "documents",
    "foods",
    "user_sessions",
    "health_profiles",
    "users",
];

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    full_name TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'user',
    is_active INTEGER NOT NULL DEFAULT 1,
    last_login_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token_hash TEXT NOT NULL,
    device_info TEXT,
    ip_address TEXT,
    expires_at TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS health_profiles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    profile_name TEXT NOT NULL,
    age INTEGER,
    gender TEXT CHECK (gender IN ('male', 'female', 'other')),
    weight REAL,
    height REAL,
    conditions_text TEXT,
    conditions_json TEXT,
    is_default INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (user_id, profile_name)
);

CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    health_profile_id INTEGER NOT NULL REFERENCES health_profiles(id) ON DELETE CASCADE,
    filename TEXT NOT NULL,
    original_content TEXT,
    ai_summary TEXT,
    file_type TEXT NOT NULL DEFAULT 'pdf',
    file_size INTEGER,
    uploaded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chat_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    health_profile_id INTEGER NOT NULL REFERENCES health_profiles(id) ON DELETE CASCADE,
    session_name TEXT,
    started_at TEXT NOT NULL,
    last_message_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chat_messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL REFERENCES chat_sessions(id) ON DELETE CASCADE,
    role TEXT NOT NULL CHECK (role IN ('user', 'assistant')),
    content TEXT NOT NULL,
    message_type TEXT NOT NULL DEFAULT 'text' CHECK (message_type IN ('text', 'image', 'file')),
    metadata_json TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS foods (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    category TEXT,
    subcategory TEXT,
    nutrients_json TEXT,
    contraindications_json TEXT,
    benefits_json TEXT,
    recommended_portions_json TEXT,
    preparation_notes TEXT,
    source_reliability TEXT NOT NULL DEFAULT 'verified',
    created_by INTEGER REFERENCES users(id) ON DELETE SET NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS health_plans (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    health_profile_id INTEGER NOT NULL REFERENCES health_profiles(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    goal_type TEXT NOT NULL,
    target_value REAL NOT NULL,
    target_unit TEXT NOT NULL,
    duration_days INTEGER NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'active'
        CHECK (status IN ('active', 'paused', 'completed', 'cancelled')),
    available_activities_json TEXT,
    dietary_restrictions_json TEXT,
    ai_analysis_json TEXT,
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS health_plan_activities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    health_plan_id INTEGER NOT NULL REFERENCES health_plans(id) ON DELETE CASCADE,
    date TEXT NOT NULL,
    activity_type TEXT NOT NULL,
    activity_name TEXT NOT NULL,
    duration_minutes INTEGER NOT NULL,
    intensity TEXT,
    calories_target REAL,
    instructions TEXT,
    is_completed INTEGER NOT NULL DEFAULT 0,
    completed_at TEXT,
    activity_log_id INTEGER
);

CREATE TABLE IF NOT EXISTS health_plan_meals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    health_plan_id INTEGER NOT NULL REFERENCES health_plans(id) ON DELETE CASCADE,
    date TEXT NOT NULL,
    meal_type TEXT NOT NULL,
    food_items_json TEXT,
    total_calories REAL,
    macros_json TEXT,
    preparation_notes TEXT,
    is_completed INTEGER NOT NULL DEFAULT 0,
    completed_at TEXT
);

CREATE TABLE IF NOT EXISTS activity_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    health_profile_id INTEGER NOT NULL REFERENCES health_profiles(id) ON DELETE CASCADE,
    date TEXT NOT NULL,
    activity_type TEXT NOT NULL,
    activity_name TEXT,
    duration_minutes INTEGER NOT NULL,
    intensity TEXT,
    calories_burned REAL,
    notes TEXT,
    plan_activity_id INTEGER,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS meal_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    health_profile_id INTEGER NOT NULL REFERENCES health_profiles(id) ON DELETE CASCADE,
    date TEXT NOT NULL,
    meal_type TEXT NOT NULL,
    food_items_json TEXT,
    total_calories REAL,
    notes TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_user_sessions_token ON user_sessions (token_hash);
CREATE INDEX IF NOT EXISTS idx_health_profiles_user ON health_profiles (user_id);
CREATE INDEX IF NOT EXISTS idx_documents_profile ON documents (health_profile_id);
CREATE INDEX IF NOT EXISTS idx_chat_sessions_profile ON chat_sessions (health_profile_id);
CREATE INDEX IF NOT EXISTS idx_chat_messages_session ON chat_messages (session_id);
CREATE INDEX IF NOT EXISTS idx_foods_category ON foods (category);
CREATE INDEX IF NOT EXISTS idx_health_plans_profile ON health_plans (health_profile_id);
CREATE INDEX IF NOT EXISTS idx_plan_activities_plan_date ON health_plan_activities (health_plan_id, date);
CREATE INDEX IF NOT EXISTS idx_plan_meals_plan_date ON health_plan_meals (health_plan_id, date);
CREATE INDEX IF NOT EXISTS idx_activity_logs_profile_date ON activity_logs (health_profile_id, date);
CREATE INDEX IF NOT EXISTS idx_meal_logs_profile_date ON meal_logs (health_profile_id, date);
";

/// Run SQLite migrations.
///
/// A database stamped with a different schema version is rebuilt from
/// scratch; its rows are discarded.
pub fn run_migrations(conn: &mut Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    let tx = conn.transaction().map_err(|e| e.to_string())?;

    tx.execute(
        "CREATE TABLE IF NOT EXISTS meta (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
        [],
    )
    .map_err(|e| format!("Failed to create meta table: {}", e))?;

    let current: Option<String> = tx
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| e.to_string())?;

    match current.as_deref().map(str::parse::<i64>) {
        Some(Ok(version)) if version == SCHEMA_VERSION => {
            info!("Schema is up to date (version {})", version);
        }
        found => {
            if found.is_some() {
                warn!(
                    "Schema version mismatch (found {:?}, expected {}), rebuilding tables",
                    current, SCHEMA_VERSION
                );
                drop_tables(&tx)?;
            }
            tx.execute_batch(SCHEMA)
                .map_err(|e| format!("Failed to create schema: {}", e))?;
            tx.execute(
                "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
                [SCHEMA_VERSION.to_string()],
            )
            .map_err(|e| e.to_string())?;
        }
    }

    tx.commit().map_err(|e| e.to_string())?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

fn drop_tables(conn: &Connection) -> Result<(), String> {
    for table in TABLES {
        conn.execute(&format!("DROP TABLE IF EXISTS {}", table), [])
            .map_err(|e| format!("Failed to drop {}: {}", table, e))?;
    }
    Ok(())
}
