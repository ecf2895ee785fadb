use sqlx::SqlitePool;

pub async fn init_db(database_url: &str) -> SqlitePool {
    let pool = SqlitePool::connect(database_url)
        .await
        .expect("Failed to connect to database");
    init_schema(&pool).await.expect("Failed to initialize schema");
    pool
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS employees (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        department TEXT NOT NULL DEFAULT '',
        salary REAL NOT NULL DEFAULT 0,
        divisor INTEGER,
        blocked INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS schedules (
        employee_id INTEGER PRIMARY KEY,
        sunday TEXT NOT NULL DEFAULT 'Repos',
        monday TEXT NOT NULL DEFAULT 'Repos',
        tuesday TEXT NOT NULL DEFAULT 'Repos',
        wednesday TEXT NOT NULL DEFAULT 'Repos',
        thursday TEXT NOT NULL DEFAULT 'Repos',
        friday TEXT NOT NULL DEFAULT 'Repos',
        saturday TEXT NOT NULL DEFAULT 'Repos'
    )",
    "CREATE TABLE IF NOT EXISTS punches (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL,
        punched_at TEXT NOT NULL,
        punch_day TEXT NOT NULL,
        source TEXT NOT NULL DEFAULT 'biometric'
    )",
    "CREATE INDEX IF NOT EXISTS idx_punches_day ON punches (punch_day, employee_id)",
    "CREATE TABLE IF NOT EXISTS ledger (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        period TEXT NOT NULL,
        employee_id INTEGER NOT NULL,
        day TEXT NOT NULL,
        present INTEGER NOT NULL DEFAULT 0,
        advance REAL NOT NULL DEFAULT 0,
        extra REAL NOT NULL DEFAULT 0,
        prime REAL NOT NULL DEFAULT 0,
        infraction REAL NOT NULL DEFAULT 0,
        doublage REAL NOT NULL DEFAULT 0,
        mise_a_pied_days INTEGER NOT NULL DEFAULT 0,
        retard_minutes INTEGER NOT NULL DEFAULT 0,
        remark TEXT,
        clock_in TEXT,
        clock_out TEXT,
        manually_edited INTEGER NOT NULL DEFAULT 0,
        UNIQUE (employee_id, day)
    )",
    "CREATE INDEX IF NOT EXISTS idx_ledger_period ON ledger (period, employee_id)",
    "CREATE TABLE IF NOT EXISTS retards (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL,
        day TEXT NOT NULL,
        minutes INTEGER NOT NULL DEFAULT 0,
        reason TEXT NOT NULL DEFAULT '',
        UNIQUE (employee_id, day)
    )",
    "CREATE TABLE IF NOT EXISTS absents (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL,
        day TEXT NOT NULL,
        reason TEXT NOT NULL DEFAULT '',
        UNIQUE (employee_id, day)
    )",
    "CREATE TABLE IF NOT EXISTS advances (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL,
        day TEXT NOT NULL,
        amount REAL NOT NULL DEFAULT 0,
        motive TEXT,
        status TEXT NOT NULL DEFAULT 'En attente'
    )",
    "CREATE TABLE IF NOT EXISTS extras (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL,
        day TEXT NOT NULL,
        amount REAL NOT NULL DEFAULT 0,
        motive TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS doublages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL,
        day TEXT NOT NULL,
        amount REAL NOT NULL DEFAULT 0,
        motive TEXT
    )",
    "CREATE TABLE IF NOT EXISTS notifications (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL,
        title TEXT NOT NULL,
        message TEXT NOT NULL,
        employee_id INTEGER,
        actor TEXT,
        deep_link TEXT,
        dedup_key TEXT UNIQUE,
        created_at TEXT NOT NULL
    )",
];

/// Columns added after the first release. Applied by diffing the live
/// table so re-running is always safe.
const LEDGER_ADDITIVE: &[(&str, &str)] = &[("paid", "INTEGER NOT NULL DEFAULT 0")];

pub async fn init_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    migrate(pool).await
}

async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    let existing: Vec<(String,)> =
        sqlx::query_as("SELECT name FROM pragma_table_info('ledger')").fetch_all(pool).await?;

    for (column, ddl) in LEDGER_ADDITIVE {
        if existing.iter().any(|(name,)| name == column) {
            continue;
        }
        let sql = format!("ALTER TABLE ledger ADD COLUMN {} {}", column, ddl);
        sqlx::query(&sql).execute(pool).await?;
        tracing::info!(column, "Ledger column added");
    }
    Ok(())
}
