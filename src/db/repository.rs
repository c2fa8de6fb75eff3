//! Storage facade over the key-value collection layout.
//!
//! Collections are read and written whole, one JSON array per key. Every
//! successful write of a primary collection refreshes the rolling backup
//! blob and increments the global revision, all inside one transaction.

use chrono::Utc;
use serde::de::DeserializeOwned;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    ActivityLog, BackupSnapshot, Booking, CreateBookingRequest, CreateStaffRequest,
    InitStaffRequest, MigrationRecord, RevisionInfo, SnapshotBundle, Staff, UpdateBookingRequest,
    UpdateStaffRequest, SNAPSHOT_SCHEMA_VERSION,
};

/// Collection keys in the backing store.
pub mod keys {
    pub const BOOKINGS: &str = "bookings";
    pub const STAFF: &str = "staff";
    pub const LOGS: &str = "logs";
    pub const BACKUP: &str = "backup";
    pub const SESSION: &str = "session";
    pub const MIGRATIONS: &str = "migrations";
}

/// Activity log entries retained after truncation, most recent first.
pub const LOG_CAP: usize = 100;

/// Storage facade for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== REVISION ====================

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    // ==================== COLLECTION PRIMITIVES ====================

    /// Read and deserialize a stored collection.
    ///
    /// An absent row yields an empty collection, and so does a row that no
    /// longer parses: stored corruption degrades to an empty view with a
    /// warning instead of failing the caller.
    async fn fetch_collection<T: DeserializeOwned>(
        conn: &mut SqliteConnection,
        key: &str,
    ) -> Result<Vec<T>, AppError> {
        let row = sqlx::query("SELECT value FROM collections WHERE key = ?")
            .bind(key)
            .fetch_optional(conn)
            .await?;

        let Some(row) = row else {
            return Ok(Vec::new());
        };

        let value: String = row.get("value");
        match serde_json::from_str(&value) {
            Ok(items) => Ok(items),
            Err(err) => {
                tracing::warn!(key, error = %err, "Stored collection is unreadable, returning empty");
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite a collection row, bumping its version.
    ///
    /// When `expected_version` is supplied and does not match the stored
    /// version the write is rejected; otherwise last write wins.
    async fn write_collection(
        conn: &mut SqliteConnection,
        key: &str,
        value: &str,
        expected_version: Option<i64>,
    ) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT version FROM collections WHERE key = ?")
            .bind(key)
            .fetch_optional(&mut *conn)
            .await?;
        let current = row.map(|r| r.get::<i64, _>("version")).unwrap_or(0);

        if let Some(expected) = expected_version {
            if current != expected {
                return Err(AppError::Conflict {
                    message: format!(
                        "Version mismatch for {}: expected {}, current {}",
                        key, expected, current
                    ),
                    current_version: Some(current),
                });
            }
        }

        let next = current + 1;
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"INSERT INTO collections (key, value, version, updated_at) VALUES (?, ?, ?, ?)
               ON CONFLICT(key) DO UPDATE SET
                   value = excluded.value,
                   version = excluded.version,
                   updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(value)
        .bind(next)
        .bind(&now)
        .execute(&mut *conn)
        .await?;

        Ok(next)
    }

    /// Rewrite the backup blob from the current state of all three primary
    /// collections. The backup mirrors the latest committed write; it is a
    /// guard against loss of the storage medium, not a history.
    async fn refresh_backup(conn: &mut SqliteConnection) -> Result<(), AppError> {
        let bookings: Vec<Booking> = Self::fetch_collection(&mut *conn, keys::BOOKINGS).await?;
        let staff: Vec<Staff> = Self::fetch_collection(&mut *conn, keys::STAFF).await?;
        let logs: Vec<ActivityLog> = Self::fetch_collection(&mut *conn, keys::LOGS).await?;

        let snapshot = BackupSnapshot {
            bookings,
            staff,
            logs,
            timestamp: Utc::now().to_rfc3339(),
        };

        let value = serde_json::to_string(&snapshot)?;
        Self::write_collection(&mut *conn, keys::BACKUP, &value, None).await?;
        Ok(())
    }

    /// Increment the global revision and return the new value.
    async fn bump_revision(conn: &mut SqliteConnection) -> Result<i64, AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(&now)
            .execute(&mut *conn)
            .await?;
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.get("revision_id"))
    }

    // ==================== BOOKING OPERATIONS ====================

    /// List all bookings.
    pub async fn list_bookings(&self) -> Result<Vec<Booking>, AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_collection(&mut conn, keys::BOOKINGS).await
    }

    /// Get a booking by ID.
    pub async fn get_booking(&self, id: &str) -> Result<Option<Booking>, AppError> {
        Ok(self.list_bookings().await?.into_iter().find(|b| b.id == id))
    }

    /// Overwrite the entire bookings collection.
    pub async fn save_bookings(
        &self,
        bookings: &[Booking],
        expected_version: Option<i64>,
    ) -> Result<i64, AppError> {
        let value = serde_json::to_string(bookings)?;
        let mut tx = self.pool.begin().await?;
        let version =
            Self::write_collection(&mut tx, keys::BOOKINGS, &value, expected_version).await?;
        Self::refresh_backup(&mut tx).await?;
        Self::bump_revision(&mut tx).await?;
        tx.commit().await?;
        Ok(version)
    }

    /// Create a new booking.
    pub async fn create_booking(
        &self,
        request: &CreateBookingRequest,
    ) -> Result<Booking, AppError> {
        let booking = Booking {
            id: uuid::Uuid::new_v4().to_string(),
            title: request.title.clone(),
            date: request.date.clone(),
            start_time: request.start_time.clone(),
            end_time: request.end_time.clone(),
            revenue: request.revenue,
            assignments: request.assignments.clone(),
        };

        let mut tx = self.pool.begin().await?;
        let mut bookings: Vec<Booking> = Self::fetch_collection(&mut tx, keys::BOOKINGS).await?;
        bookings.push(booking.clone());
        let value = serde_json::to_string(&bookings)?;
        Self::write_collection(&mut tx, keys::BOOKINGS, &value, None).await?;
        Self::refresh_backup(&mut tx).await?;
        Self::bump_revision(&mut tx).await?;
        tx.commit().await?;

        Ok(booking)
    }

    /// Update a booking in place.
    pub async fn update_booking(
        &self,
        id: &str,
        request: &UpdateBookingRequest,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut bookings: Vec<Booking> = Self::fetch_collection(&mut tx, keys::BOOKINGS).await?;

        let booking = bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))?;

        if let Some(title) = &request.title {
            booking.title = title.clone();
        }
        if let Some(date) = &request.date {
            booking.date = date.clone();
        }
        if let Some(start_time) = &request.start_time {
            booking.start_time = start_time.clone();
        }
        if let Some(end_time) = &request.end_time {
            booking.end_time = end_time.clone();
        }
        if let Some(revenue) = request.revenue {
            booking.revenue = revenue;
        }
        if let Some(assignments) = &request.assignments {
            booking.assignments = assignments.clone();
        }
        let updated = booking.clone();

        let value = serde_json::to_string(&bookings)?;
        Self::write_collection(&mut tx, keys::BOOKINGS, &value, None).await?;
        Self::refresh_backup(&mut tx).await?;
        Self::bump_revision(&mut tx).await?;
        tx.commit().await?;

        Ok(updated)
    }

    /// Delete a booking, returning the removed record.
    pub async fn delete_booking(&self, id: &str) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut bookings: Vec<Booking> = Self::fetch_collection(&mut tx, keys::BOOKINGS).await?;

        let index = bookings
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))?;
        let removed = bookings.remove(index);

        let value = serde_json::to_string(&bookings)?;
        Self::write_collection(&mut tx, keys::BOOKINGS, &value, None).await?;
        Self::refresh_backup(&mut tx).await?;
        Self::bump_revision(&mut tx).await?;
        tx.commit().await?;

        Ok(removed)
    }

    // ==================== STAFF OPERATIONS ====================

    /// List all staff.
    pub async fn list_staff(&self) -> Result<Vec<Staff>, AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_collection(&mut conn, keys::STAFF).await
    }

    /// Get a staff member by ID.
    pub async fn get_staff(&self, id: &str) -> Result<Option<Staff>, AppError> {
        Ok(self.list_staff().await?.into_iter().find(|s| s.id == id))
    }

    /// Overwrite the entire staff collection.
    pub async fn save_staff(
        &self,
        staff: &[Staff],
        expected_version: Option<i64>,
    ) -> Result<i64, AppError> {
        let value = serde_json::to_string(staff)?;
        let mut tx = self.pool.begin().await?;
        let version =
            Self::write_collection(&mut tx, keys::STAFF, &value, expected_version).await?;
        Self::refresh_backup(&mut tx).await?;
        Self::bump_revision(&mut tx).await?;
        tx.commit().await?;
        Ok(version)
    }

    /// Create the first staff record. Only valid while the collection is
    /// empty; the created record is always admin-flagged.
    pub async fn init_staff(&self, request: &InitStaffRequest) -> Result<Staff, AppError> {
        let mut tx = self.pool.begin().await?;
        let staff: Vec<Staff> = Self::fetch_collection(&mut tx, keys::STAFF).await?;

        if !staff.is_empty() {
            return Err(AppError::Conflict {
                message: "Staff collection is already initialized".to_string(),
                current_version: None,
            });
        }

        let admin = Staff {
            id: uuid::Uuid::new_v4().to_string(),
            name: request.name.clone(),
            contact: request
                .contact
                .clone()
                .unwrap_or_else(|| "Studio Manager".to_string()),
            base_designation: request
                .base_designation
                .clone()
                .unwrap_or_else(|| "Studio Owner".to_string()),
            is_admin: true,
        };

        let value = serde_json::to_string(&[admin.clone()])?;
        Self::write_collection(&mut tx, keys::STAFF, &value, None).await?;
        Self::refresh_backup(&mut tx).await?;
        Self::bump_revision(&mut tx).await?;
        tx.commit().await?;

        Ok(admin)
    }

    /// Create a new staff member.
    pub async fn create_staff(&self, request: &CreateStaffRequest) -> Result<Staff, AppError> {
        let member = Staff {
            id: uuid::Uuid::new_v4().to_string(),
            name: request.name.clone(),
            contact: request.contact.clone().unwrap_or_default(),
            base_designation: request.base_designation.clone().unwrap_or_default(),
            is_admin: request.is_admin,
        };

        let mut tx = self.pool.begin().await?;
        let mut staff: Vec<Staff> = Self::fetch_collection(&mut tx, keys::STAFF).await?;
        staff.push(member.clone());
        let value = serde_json::to_string(&staff)?;
        Self::write_collection(&mut tx, keys::STAFF, &value, None).await?;
        Self::refresh_backup(&mut tx).await?;
        Self::bump_revision(&mut tx).await?;
        tx.commit().await?;

        Ok(member)
    }

    /// Update a staff member in place.
    pub async fn update_staff(
        &self,
        id: &str,
        request: &UpdateStaffRequest,
    ) -> Result<Staff, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut staff: Vec<Staff> = Self::fetch_collection(&mut tx, keys::STAFF).await?;

        let member = staff
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Staff {} not found", id)))?;

        if let Some(name) = &request.name {
            member.name = name.clone();
        }
        if let Some(contact) = &request.contact {
            member.contact = contact.clone();
        }
        if let Some(base_designation) = &request.base_designation {
            member.base_designation = base_designation.clone();
        }
        if let Some(is_admin) = request.is_admin {
            member.is_admin = is_admin;
        }
        let updated = member.clone();

        let value = serde_json::to_string(&staff)?;
        Self::write_collection(&mut tx, keys::STAFF, &value, None).await?;
        Self::refresh_backup(&mut tx).await?;
        Self::bump_revision(&mut tx).await?;
        tx.commit().await?;

        Ok(updated)
    }

    /// Delete a staff member, returning the removed record.
    ///
    /// Assignments referencing the deleted id are left dangling on purpose;
    /// aggregation treats them as zero contribution.
    pub async fn delete_staff(&self, id: &str) -> Result<Staff, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut staff: Vec<Staff> = Self::fetch_collection(&mut tx, keys::STAFF).await?;

        let index = staff
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Staff {} not found", id)))?;
        let removed = staff.remove(index);

        let value = serde_json::to_string(&staff)?;
        Self::write_collection(&mut tx, keys::STAFF, &value, None).await?;
        Self::refresh_backup(&mut tx).await?;
        Self::bump_revision(&mut tx).await?;
        tx.commit().await?;

        Ok(removed)
    }

    // ==================== ACTIVITY LOG OPERATIONS ====================

    /// List activity log entries, most recent first.
    pub async fn list_logs(&self) -> Result<Vec<ActivityLog>, AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_collection(&mut conn, keys::LOGS).await
    }

    /// Prepend an entry and truncate to the most recent [`LOG_CAP`].
    pub async fn append_log(&self, entry: ActivityLog) -> Result<ActivityLog, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut logs: Vec<ActivityLog> = Self::fetch_collection(&mut tx, keys::LOGS).await?;
        logs.insert(0, entry.clone());
        logs.truncate(LOG_CAP);

        let value = serde_json::to_string(&logs)?;
        Self::write_collection(&mut tx, keys::LOGS, &value, None).await?;
        Self::refresh_backup(&mut tx).await?;
        Self::bump_revision(&mut tx).await?;
        tx.commit().await?;

        Ok(entry)
    }

    // ==================== SNAPSHOT OPERATIONS ====================

    /// Serialize all three collections into a portable bundle.
    pub async fn export_snapshot(&self) -> Result<SnapshotBundle, AppError> {
        Ok(SnapshotBundle {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            generated_at: Utc::now().to_rfc3339(),
            bookings: Some(self.list_bookings().await?),
            staff: Some(self.list_staff().await?),
            logs: Some(self.list_logs().await?),
        })
    }

    /// Parse a serialized bundle and overwrite each collection it contains.
    ///
    /// Collections absent from the bundle are left untouched. Malformed
    /// input is rejected before any write.
    pub async fn import_snapshot(&self, serialized: &str) -> Result<SnapshotBundle, AppError> {
        let bundle: SnapshotBundle = serde_json::from_str(serialized).map_err(|err| {
            AppError::BadRequest(format!("Snapshot bundle is not valid JSON: {}", err))
        })?;

        let mut tx = self.pool.begin().await?;

        if let Some(bookings) = &bundle.bookings {
            let value = serde_json::to_string(bookings)?;
            Self::write_collection(&mut tx, keys::BOOKINGS, &value, None).await?;
        }
        if let Some(staff) = &bundle.staff {
            let value = serde_json::to_string(staff)?;
            Self::write_collection(&mut tx, keys::STAFF, &value, None).await?;
        }
        if let Some(logs) = &bundle.logs {
            let value = serde_json::to_string(logs)?;
            Self::write_collection(&mut tx, keys::LOGS, &value, None).await?;
        }

        Self::refresh_backup(&mut tx).await?;
        Self::bump_revision(&mut tx).await?;
        tx.commit().await?;

        Ok(bundle)
    }

    /// Overwrite all three collections from the rolling backup blob.
    ///
    /// Returns `Ok(false)`, with nothing touched, when no backup has ever
    /// been written (or the blob is unreadable).
    pub async fn restore_from_backup(&self) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT value FROM collections WHERE key = ?")
            .bind(keys::BACKUP)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            return Ok(false);
        };

        let value: String = row.get("value");
        let snapshot: BackupSnapshot = match serde_json::from_str(&value) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(error = %err, "Backup snapshot is unreadable, nothing restored");
                return Ok(false);
            }
        };

        for (key, value) in [
            (keys::BOOKINGS, serde_json::to_string(&snapshot.bookings)?),
            (keys::STAFF, serde_json::to_string(&snapshot.staff)?),
            (keys::LOGS, serde_json::to_string(&snapshot.logs)?),
        ] {
            Self::write_collection(&mut tx, key, &value, None).await?;
        }

        Self::bump_revision(&mut tx).await?;
        tx.commit().await?;

        Ok(true)
    }

    // ==================== SESSION ====================

    /// The current-session user record, if one is set.
    pub async fn current_session(&self) -> Result<Option<Staff>, AppError> {
        let row = sqlx::query("SELECT value FROM collections WHERE key = ?")
            .bind(keys::SESSION)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let value: String = row.get("value");
        match serde_json::from_str(&value) {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                tracing::warn!(error = %err, "Session record is unreadable, treating as signed out");
                Ok(None)
            }
        }
    }

    /// Set the current-session user record.
    pub async fn set_session(&self, user: &Staff) -> Result<(), AppError> {
        let value = serde_json::to_string(user)?;
        let mut conn = self.pool.acquire().await?;
        Self::write_collection(&mut conn, keys::SESSION, &value, None).await?;
        Ok(())
    }

    /// Clear the current-session user record.
    pub async fn clear_session(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM collections WHERE key = ?")
            .bind(keys::SESSION)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ==================== MIGRATION LOG ====================

    /// List schema migrations applied to this store.
    pub async fn list_migrations(&self) -> Result<Vec<MigrationRecord>, AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_collection(&mut conn, keys::MIGRATIONS).await
    }
}
