//! Schema Bootstrap and Seed Data

use crate::StorageError;
use sqlx::{Connection, SqliteConnection};
use tracing::{debug, info};

const CREATE_LOCATIONS: &str = r#"
    CREATE TABLE IF NOT EXISTS locations (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL
    )
"#;

const CREATE_INVENTORY: &str = r#"
    CREATE TABLE IF NOT EXISTS inventory (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        count INTEGER NOT NULL DEFAULT 0,
        deployable INTEGER NOT NULL DEFAULT 0,
        low_count INTEGER,
        location_id TEXT NOT NULL REFERENCES locations(id)
    )
"#;

/// Columns added after the first release, with the DDL that adds each one
const ADDITIVE_COLUMNS: &[(&str, &str)] = &[
    (
        "deployable",
        "ALTER TABLE inventory ADD COLUMN deployable INTEGER NOT NULL DEFAULT 0",
    ),
    ("low_count", "ALTER TABLE inventory ADD COLUMN low_count INTEGER"),
];

/// Locations created on first start: (id, name)
pub const SEED_LOCATIONS: &[(&str, &str)] = &[
    ("helpdesk", "Help Desk"),
    ("storage", "Storage Room"),
    ("lab1", "Computer Lab 1"),
    ("lab2", "Computer Lab 2"),
    ("server", "Server Room"),
];

/// Starter catalog: (name, count, location id)
pub const SEED_ITEMS: &[(&str, i64, &str)] = &[
    ("Wireless Mouse", 15, "helpdesk"),
    ("USB Keyboard", 12, "helpdesk"),
    ("HDMI Cable (6ft)", 8, "helpdesk"),
    ("USB-C Charger", 10, "helpdesk"),
    ("Laptop Bag", 5, "helpdesk"),
    ("Dell Monitor 24\"", 20, "storage"),
    ("HP Monitor 27\"", 15, "storage"),
    ("Ethernet Cable (25ft)", 30, "storage"),
    ("Power Strip 6-outlet", 18, "storage"),
    ("Extension Cord", 12, "storage"),
    ("Wireless Adapter", 25, "lab1"),
    ("Webcam HD", 8, "lab1"),
    ("Headset with Microphone", 10, "lab1"),
    ("USB Hub 4-port", 6, "lab1"),
    ("VGA Cable", 14, "lab2"),
    ("DVI Cable", 10, "lab2"),
    ("Display Port Cable", 8, "lab2"),
    ("Laptop Stand", 12, "lab2"),
    ("Cat6 Ethernet Cable (3ft)", 50, "server"),
    ("Network Switch 24-port", 4, "server"),
    ("Rack Mount Kit", 6, "server"),
    ("UPS Battery Backup", 8, "server"),
    ("Server Rails", 10, "server"),
];

/// Create tables, add missing columns and seed an empty database
pub(crate) async fn bootstrap(conn: &mut SqliteConnection) -> Result<(), StorageError> {
    sqlx::query(CREATE_LOCATIONS).execute(&mut *conn).await?;
    sqlx::query(CREATE_INVENTORY).execute(&mut *conn).await?;

    add_missing_columns(conn).await?;

    let locations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM locations")
        .fetch_one(&mut *conn)
        .await?;

    if locations == 0 {
        seed(conn).await?;
    }

    Ok(())
}

/// SQLite has no ADD COLUMN IF NOT EXISTS, so check table_info first
async fn add_missing_columns(conn: &mut SqliteConnection) -> Result<(), StorageError> {
    let columns: Vec<(i32, String, String, i32, Option<String>, i32)> =
        sqlx::query_as("PRAGMA table_info(inventory)")
            .fetch_all(&mut *conn)
            .await?;

    for &(column, ddl) in ADDITIVE_COLUMNS {
        let present = columns.iter().any(|(_, name, _, _, _, _)| name == column);
        if !present {
            info!("Migrating inventory table: adding column {}", column);
            sqlx::query(ddl).execute(&mut *conn).await?;
        }
    }

    Ok(())
}

async fn seed(conn: &mut SqliteConnection) -> Result<(), StorageError> {
    info!(
        locations = SEED_LOCATIONS.len(),
        items = SEED_ITEMS.len(),
        "Seeding empty database"
    );

    let mut tx = conn.begin().await?;

    for &(id, name) in SEED_LOCATIONS {
        sqlx::query("INSERT INTO locations (id, name) VALUES (?, ?)")
            .bind(id)
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }

    for &(name, count, location_id) in SEED_ITEMS {
        sqlx::query(
            "INSERT INTO inventory (name, count, deployable, low_count, location_id) \
             VALUES (?, ?, 1, NULL, ?)",
        )
        .bind(name)
        .bind(count)
        .bind(location_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    debug!("Seed committed");
    Ok(())
}
