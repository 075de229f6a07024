//! Repository Implementation

use crate::models::{
    Deployment, InventoryItem, ItemFilter, ItemUpdate, Location, LocationSummary, NewItem,
};
use crate::{schema, summary, StorageError};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, SqliteConnection};
use std::path::Path;
use tracing::{debug, info, warn};
use uuid::Uuid;

const ITEM_SELECT: &str = r#"
    SELECT i.id, i.name, i.count,
           i.deployable, i.low_count,
           i.location_id, l.name AS location_name
    FROM inventory i
    JOIN locations l ON i.location_id = l.id
"#;

/// Repository over a single SQLite database file.
///
/// Holds only connection options; each call connects, executes and closes.
#[derive(Debug, Clone)]
pub struct Repository {
    options: SqliteConnectOptions,
}

impl Repository {
    /// Open (creating if needed) the database at `path` and bootstrap its schema
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let repo = Self { options };

        info!("Opening inventory database at {}", path.display());
        let mut conn = repo.connect().await?;
        schema::bootstrap(&mut conn).await?;
        conn.close().await?;

        Ok(repo)
    }

    async fn connect(&self) -> Result<SqliteConnection, StorageError> {
        Ok(SqliteConnection::connect_with(&self.options).await?)
    }

    // ----- Locations -----

    /// All locations ordered by name
    pub async fn list_locations(&self) -> Result<Vec<Location>, StorageError> {
        let mut conn = self.connect().await?;
        let rows = sqlx::query_as::<_, Location>("SELECT id, name FROM locations ORDER BY name")
            .fetch_all(&mut conn)
            .await?;
        conn.close().await?;
        Ok(rows)
    }

    /// Insert a location under a fresh identifier and return it
    pub async fn create_location(&self, name: &str) -> Result<String, StorageError> {
        let id = Uuid::new_v4().to_string();

        let mut conn = self.connect().await?;
        sqlx::query("INSERT INTO locations (id, name) VALUES (?, ?)")
            .bind(&id)
            .bind(name)
            .execute(&mut conn)
            .await?;
        conn.close().await?;

        info!(location_id = %id, "Created location {:?}", name);
        Ok(id)
    }

    /// Rename a location. Returns false when no such location exists.
    pub async fn rename_location(&self, location_id: &str, name: &str) -> Result<bool, StorageError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query("UPDATE locations SET name = ? WHERE id = ?")
            .bind(name)
            .bind(location_id)
            .execute(&mut conn)
            .await?;
        conn.close().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a location that no item references.
    ///
    /// Fails with [`StorageError::LocationInUse`] instead of cascading.
    pub async fn delete_location(&self, location_id: &str) -> Result<bool, StorageError> {
        let mut conn = self.connect().await?;

        let item_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM inventory WHERE location_id = ?")
                .bind(location_id)
                .fetch_one(&mut conn)
                .await?;

        if item_count > 0 {
            conn.close().await?;
            warn!(location_id, item_count, "Refusing to delete non-empty location");
            return Err(StorageError::LocationInUse {
                location_id: location_id.to_string(),
                item_count,
            });
        }

        let result = sqlx::query("DELETE FROM locations WHERE id = ?")
            .bind(location_id)
            .execute(&mut conn)
            .await?;
        conn.close().await?;

        Ok(result.rows_affected() > 0)
    }

    // ----- Items -----

    /// Items matching `filter`, ordered by name
    pub async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<InventoryItem>, StorageError> {
        let mut sql = format!("{} WHERE 1=1", ITEM_SELECT);
        let mut binds: Vec<String> = Vec::new();

        if let Some(location_id) = &filter.location_id {
            sql.push_str(" AND i.location_id = ?");
            binds.push(location_id.clone());
        }

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            sql.push_str(" AND LOWER(i.name) LIKE LOWER(?) ESCAPE '\\'");
            binds.push(format!("%{}%", escape_like(search)));
        }

        sql.push_str(" ORDER BY i.name, i.id");

        let mut query = sqlx::query_as::<_, InventoryItem>(&sql);
        for value in &binds {
            query = query.bind(value);
        }

        let mut conn = self.connect().await?;
        let rows = query.fetch_all(&mut conn).await?;
        conn.close().await?;

        debug!("Listed {} items", rows.len());
        Ok(rows)
    }

    /// Single item by id, or `None` when absent
    pub async fn get_item(&self, item_id: i64) -> Result<Option<InventoryItem>, StorageError> {
        let sql = format!("{} WHERE i.id = ?", ITEM_SELECT);

        let mut conn = self.connect().await?;
        let row = sqlx::query_as::<_, InventoryItem>(&sql)
            .bind(item_id)
            .fetch_optional(&mut conn)
            .await?;
        conn.close().await?;

        Ok(row)
    }

    /// Insert an item and return its new identifier
    pub async fn create_item(&self, item: &NewItem) -> Result<i64, StorageError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query(
            "INSERT INTO inventory (name, count, deployable, low_count, location_id) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&item.name)
        .bind(item.count.max(0))
        .bind(item.deployable)
        .bind(item.low_count)
        .bind(&item.location_id)
        .execute(&mut conn)
        .await?;
        conn.close().await?;

        let id = result.last_insert_rowid();
        info!(item_id = id, "Created item {:?} at {}", item.name, item.location_id);
        Ok(id)
    }

    /// Overwrite an item's editable fields. Count is clamped to zero.
    pub async fn update_item(&self, item_id: i64, update: &ItemUpdate) -> Result<bool, StorageError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query(
            "UPDATE inventory \
             SET name = ?, count = ?, deployable = ?, low_count = ?, location_id = ? \
             WHERE id = ?",
        )
        .bind(&update.name)
        .bind(update.count.max(0))
        .bind(update.deployable)
        .bind(update.low_count)
        .bind(&update.location_id)
        .bind(item_id)
        .execute(&mut conn)
        .await?;
        conn.close().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Overwrite only the count, clamped to zero
    pub async fn set_item_count(&self, item_id: i64, count: i64) -> Result<bool, StorageError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query("UPDATE inventory SET count = ? WHERE id = ?")
            .bind(count.max(0))
            .bind(item_id)
            .execute(&mut conn)
            .await?;
        conn.close().await?;

        debug!(item_id, count, "Set item count");
        Ok(result.rows_affected() > 0)
    }

    /// Remove an item. Absent ids are a no-op returning false.
    pub async fn delete_item(&self, item_id: i64) -> Result<bool, StorageError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query("DELETE FROM inventory WHERE id = ?")
            .bind(item_id)
            .execute(&mut conn)
            .await?;
        conn.close().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Subtract each quantity from its item, clamping at zero.
    ///
    /// All rows are written in one transaction with a single commit. Stock
    /// sufficiency is the caller's responsibility. Returns rows updated.
    pub async fn deploy_items(&self, deployments: &[Deployment]) -> Result<u64, StorageError> {
        let mut conn = self.connect().await?;
        let mut tx = conn.begin().await?;
        let mut updated = 0;

        for deployment in deployments {
            if deployment.quantity <= 0 {
                warn!(item_id = deployment.item_id, "Skipping non-positive deploy quantity");
                continue;
            }
            let result = sqlx::query("UPDATE inventory SET count = MAX(0, count - ?) WHERE id = ?")
                .bind(deployment.quantity)
                .bind(deployment.item_id)
                .execute(&mut *tx)
                .await?;
            updated += result.rows_affected();
        }

        tx.commit().await?;
        conn.close().await?;

        info!(lines = deployments.len(), updated, "Deployed items");
        Ok(updated)
    }

    /// All-or-nothing variant of [`Repository::deploy_items`].
    ///
    /// Any missing item or short row rolls back the whole batch.
    pub async fn deploy_items_strict(&self, deployments: &[Deployment]) -> Result<u64, StorageError> {
        let mut conn = self.connect().await?;
        let mut tx = conn.begin().await?;
        let mut updated = 0;

        for deployment in deployments {
            if deployment.quantity <= 0 {
                continue;
            }

            let available: Option<i64> =
                sqlx::query_scalar("SELECT count FROM inventory WHERE id = ?")
                    .bind(deployment.item_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            let available = match available {
                Some(available) => available,
                None => {
                    tx.rollback().await?;
                    return Err(StorageError::ItemNotFound(deployment.item_id));
                }
            };

            if deployment.quantity > available {
                tx.rollback().await?;
                return Err(StorageError::InsufficientStock {
                    item_id: deployment.item_id,
                    requested: deployment.quantity,
                    available,
                });
            }

            let result = sqlx::query("UPDATE inventory SET count = count - ? WHERE id = ?")
                .bind(deployment.quantity)
                .bind(deployment.item_id)
                .execute(&mut *tx)
                .await?;
            updated += result.rows_affected();
        }

        tx.commit().await?;
        conn.close().await?;

        info!(lines = deployments.len(), updated, "Deployed items (strict)");
        Ok(updated)
    }

    // ----- Summaries -----

    /// Item count and total quantity for every location, including empty ones
    pub async fn location_summary(&self) -> Result<Vec<LocationSummary>, StorageError> {
        let mut conn = self.connect().await?;
        let rows = sqlx::query_as::<_, LocationSummary>(
            r#"
            SELECT
                l.id AS location_id,
                l.name AS name,
                COUNT(i.id) AS item_count,
                COALESCE(SUM(i.count), 0) AS total_count
            FROM locations l
            LEFT JOIN inventory i ON l.id = i.location_id
            GROUP BY l.id, l.name
            ORDER BY l.name, l.id
            "#,
        )
        .fetch_all(&mut conn)
        .await?;
        conn.close().await?;

        Ok(rows)
    }

    /// Items at or below their low-stock threshold
    pub async fn low_items(&self) -> Result<Vec<InventoryItem>, StorageError> {
        let items = self.list_items(&ItemFilter::all()).await?;
        Ok(summary::low_items(items))
    }

    /// Per-location summary restricted to low items
    pub async fn low_item_location_summary(&self) -> Result<Vec<LocationSummary>, StorageError> {
        let items = self.low_items().await?;
        Ok(summary::summarize_low_items(&items))
    }
}

/// Escape LIKE wildcards so the search term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
