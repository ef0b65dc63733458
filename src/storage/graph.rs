// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HabitSphere

//! Embedded graph store backed by redb (pure Rust, ACID).
//!
//! Users and habits are nodes; `HAS` edges link a user to the habits they
//! track. The relationship is an unordered set: an edge either exists or it
//! does not, and inserting it again is a no-op.
//!
//! ## Table Layout
//!
//! - `users`: user_id → serialized StoredUser
//! - `email_index`: lowercase email → user_id (uniqueness at creation)
//! - `username_index`: username → user_id (uniqueness at update)
//! - `habits`: habit name → serialized StoredHabit
//! - `has_edges`: composite key (user_id|habit_name) → habit_name

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: user_id → serialized StoredUser (JSON bytes).
const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Index: lowercase email → user_id. Enforces email uniqueness at creation.
const EMAIL_INDEX: TableDefinition<&str, &str> = TableDefinition::new("email_index");

/// Index: username → user_id. Enforces username uniqueness once set.
/// The placeholder username is never indexed.
const USERNAME_INDEX: TableDefinition<&str, &str> = TableDefinition::new("username_index");

/// Habit catalog: habit name → serialized StoredHabit (JSON bytes).
const HABITS: TableDefinition<&str, &[u8]> = TableDefinition::new("habits");

/// HAS edges: composite key (user_id|habit_name) → habit_name.
/// Key insertion is a merge: re-linking an existing pair changes nothing.
const HAS_EDGES: TableDefinition<&[u8], &str> = TableDefinition::new("has_edges");

/// Username value assigned at creation, before the user picks one.
pub const PLACEHOLDER_USERNAME: &str = "pending_username";

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),
}

pub type GraphResult<T> = Result<T, GraphError>;

// =============================================================================
// Stored Entities
// =============================================================================

/// Durable user node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    /// Opaque unique identifier (UUIDv4), generated at creation, immutable.
    pub id: String,
    /// Unique email address (lowercased for indexing).
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Placeholder value until the user picks a username.
    pub username: String,
    /// Argon2 digest. Never exposed via the API.
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

/// Durable habit node. Habits are seeded at startup, never created by the
/// request path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredHabit {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Edge Key Helpers
// =============================================================================

/// Build a composite key for the has_edges table: `user_id | habit_name`.
fn make_edge_key(user_id: &str, habit_name: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(user_id.len() + 1 + habit_name.len());
    key.extend_from_slice(user_id.as_bytes());
    key.push(b'|');
    key.extend_from_slice(habit_name.as_bytes());
    key
}

/// Build a prefix for range scanning all edges of a user.
fn make_user_prefix(user_id: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(user_id.len() + 1);
    prefix.extend_from_slice(user_id.as_bytes());
    prefix.push(b'|');
    prefix
}

/// Build the upper bound for a user's edge range scan.
fn make_user_prefix_end(user_id: &str) -> Vec<u8> {
    let mut end = make_user_prefix(user_id);
    // Past any valid key with this prefix
    end.extend_from_slice(&[0xFF; 20]);
    end
}

// =============================================================================
// GraphStore
// =============================================================================

/// Embedded ACID graph store for users, habits, and HAS edges.
pub struct GraphStore {
    db: Database,
}

impl GraphStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> GraphResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(EMAIL_INDEX)?;
            let _ = write_txn.open_table(USERNAME_INDEX)?;
            let _ = write_txn.open_table(HABITS)?;
            let _ = write_txn.open_table(HAS_EDGES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Check whether a user with this email already exists.
    pub fn email_exists(&self, email: &str) -> GraphResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EMAIL_INDEX)?;
        Ok(table.get(email.to_lowercase().as_str())?.is_some())
    }

    /// Create a user node.
    ///
    /// Fails with `AlreadyExists` if the email is taken. The user record and
    /// its email index entry commit in one transaction.
    pub fn create_user(&self, user: &StoredUser) -> GraphResult<()> {
        let email_key = user.email.to_lowercase();
        let json = serde_json::to_vec(user)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut email_table = write_txn.open_table(EMAIL_INDEX)?;
            if email_table.get(email_key.as_str())?.is_some() {
                return Err(GraphError::AlreadyExists(format!(
                    "User with email {email_key}"
                )));
            }
            email_table.insert(email_key.as_str(), user.id.as_str())?;

            let mut user_table = write_txn.open_table(USERS)?;
            user_table.insert(user.id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a user by id.
    pub fn get_user(&self, user_id: &str) -> GraphResult<Option<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(user_id)? {
            Some(value) => {
                let user: StoredUser = serde_json::from_slice(value.value())?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// Look up a user by email.
    pub fn get_user_by_email(&self, email: &str) -> GraphResult<Option<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let email_table = read_txn.open_table(EMAIL_INDEX)?;
        let user_id = match email_table.get(email.to_lowercase().as_str())? {
            Some(v) => v.value().to_string(),
            None => return Ok(None),
        };
        let user_table = read_txn.open_table(USERS)?;
        match user_table.get(user_id.as_str())? {
            Some(value) => {
                let user: StoredUser = serde_json::from_slice(value.value())?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// Set a user's username.
    ///
    /// Fails with `AlreadyExists` if another user holds the name and
    /// `NotFound` if the user vanished. Index maintenance and the record
    /// update commit in one transaction.
    pub fn update_username(&self, user_id: &str, username: &str) -> GraphResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut username_table = write_txn.open_table(USERNAME_INDEX)?;
            if let Some(holder) = username_table.get(username)? {
                if holder.value() != user_id {
                    return Err(GraphError::AlreadyExists(format!("Username {username}")));
                }
            }

            let mut user_table = write_txn.open_table(USERS)?;
            let existing_bytes = {
                let existing = user_table
                    .get(user_id)?
                    .ok_or_else(|| GraphError::NotFound(format!("User {user_id}")))?;
                existing.value().to_vec()
            };

            let mut user: StoredUser = serde_json::from_slice(&existing_bytes)?;
            if user.username != PLACEHOLDER_USERNAME {
                username_table.remove(user.username.as_str())?;
            }
            user.username = username.to_string();
            username_table.insert(username, user_id)?;

            let json = serde_json::to_vec(&user)?;
            user_table.insert(user_id, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // =========================================================================
    // Habits
    // =========================================================================

    /// Insert a habit node. Merge semantics: inserting an existing name is a
    /// no-op (the stored record is overwritten with identical data).
    pub fn insert_habit(&self, name: &str) -> GraphResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(HABITS)?;
            if table.get(name)?.is_none() {
                let habit = StoredHabit {
                    name: name.to_string(),
                    created_at: Utc::now(),
                };
                let json = serde_json::to_vec(&habit)?;
                table.insert(name, json.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// List the full habit catalog.
    pub fn list_habits(&self) -> GraphResult<Vec<StoredHabit>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(HABITS)?;
        let mut habits = Vec::new();
        for entry in table.iter()? {
            let entry = entry?;
            let habit: StoredHabit = serde_json::from_slice(entry.1.value())?;
            habits.push(habit);
        }
        Ok(habits)
    }

    // =========================================================================
    // HAS Edges
    // =========================================================================

    /// Link a user to each named habit in one atomic transaction.
    ///
    /// Names without a matching habit node are skipped, not failed. Edge
    /// insertion is a merge, so overlapping names across calls (or within
    /// one call) never produce duplicate edges. Returns the names that were
    /// actually matched.
    ///
    /// Fails with `NotFound` if the user does not exist; no edges are
    /// written in that case.
    pub fn save_habits(&self, user_id: &str, habit_names: &[String]) -> GraphResult<Vec<String>> {
        let write_txn = self.db.begin_write()?;
        let mut linked = Vec::new();
        {
            let user_table = write_txn.open_table(USERS)?;
            if user_table.get(user_id)?.is_none() {
                return Err(GraphError::NotFound(format!("User {user_id}")));
            }

            let habit_table = write_txn.open_table(HABITS)?;
            let mut edge_table = write_txn.open_table(HAS_EDGES)?;
            for name in habit_names {
                // MERGE semantics: only link names that match a habit node
                if habit_table.get(name.as_str())?.is_none() {
                    continue;
                }
                let key = make_edge_key(user_id, name);
                let inserted = edge_table.insert(key.as_slice(), name.as_str())?.is_none();
                if inserted {
                    linked.push(name.clone());
                }
            }
        }
        write_txn.commit()?;
        Ok(linked)
    }

    /// List the habit names a user is linked to.
    pub fn user_habits(&self, user_id: &str) -> GraphResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(HAS_EDGES)?;

        let prefix = make_user_prefix(user_id);
        let prefix_end = make_user_prefix_end(user_id);

        let mut names = Vec::new();
        for entry in table.range(prefix.as_slice()..prefix_end.as_slice())? {
            let entry = entry?;
            names.push(entry.1.value().to_string());
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (GraphStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = GraphStore::open(&dir.path().join("test.redb")).unwrap();
        (store, dir)
    }

    fn sample_user(id: &str, email: &str) -> StoredUser {
        StoredUser {
            id: id.to_string(),
            email: email.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            username: PLACEHOLDER_USERNAME.to_string(),
            hashed_password: "$argon2id$fake".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn create_and_get_user() {
        let (store, _dir) = temp_store();
        let user = sample_user("u-1", "ada@example.com");
        store.create_user(&user).unwrap();

        let loaded = store.get_user("u-1").unwrap().unwrap();
        assert_eq!(loaded, user);

        let by_email = store.get_user_by_email("ada@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, "u-1");
    }

    #[test]
    fn email_lookup_is_case_insensitive() {
        let (store, _dir) = temp_store();
        store.create_user(&sample_user("u-1", "Ada@Example.com")).unwrap();

        assert!(store.email_exists("ada@example.com").unwrap());
        assert!(store.get_user_by_email("ADA@EXAMPLE.COM").unwrap().is_some());
    }

    #[test]
    fn duplicate_email_rejected() {
        let (store, _dir) = temp_store();
        store.create_user(&sample_user("u-1", "ada@example.com")).unwrap();

        let result = store.create_user(&sample_user("u-2", "ada@example.com"));
        assert!(matches!(result, Err(GraphError::AlreadyExists(_))));

        // The losing user record must not exist
        assert!(store.get_user("u-2").unwrap().is_none());
    }

    #[test]
    fn update_username_enforces_uniqueness() {
        let (store, _dir) = temp_store();
        store.create_user(&sample_user("u-1", "a@example.com")).unwrap();
        store.create_user(&sample_user("u-2", "b@example.com")).unwrap();

        store.update_username("u-1", "ada_lovelace").unwrap();
        assert_eq!(store.get_user("u-1").unwrap().unwrap().username, "ada_lovelace");

        let result = store.update_username("u-2", "ada_lovelace");
        assert!(matches!(result, Err(GraphError::AlreadyExists(_))));

        // Renaming yourself to your own name is fine
        store.update_username("u-1", "ada_lovelace").unwrap();
    }

    #[test]
    fn update_username_frees_previous_name() {
        let (store, _dir) = temp_store();
        store.create_user(&sample_user("u-1", "a@example.com")).unwrap();
        store.create_user(&sample_user("u-2", "b@example.com")).unwrap();

        store.update_username("u-1", "first_name").unwrap();
        store.update_username("u-1", "second_name").unwrap();

        // The old name is released for others
        store.update_username("u-2", "first_name").unwrap();
    }

    #[test]
    fn update_username_unknown_user() {
        let (store, _dir) = temp_store();
        let result = store.update_username("ghost", "whatever");
        assert!(matches!(result, Err(GraphError::NotFound(_))));
    }

    #[test]
    fn habit_seeding_is_idempotent() {
        let (store, _dir) = temp_store();
        store.insert_habit("Reading").unwrap();
        store.insert_habit("Reading").unwrap();
        store.insert_habit("Running").unwrap();

        let habits = store.list_habits().unwrap();
        assert_eq!(habits.len(), 2);
    }

    #[test]
    fn save_habits_links_and_dedupes() {
        let (store, _dir) = temp_store();
        store.create_user(&sample_user("u-1", "a@example.com")).unwrap();
        store.insert_habit("Reading").unwrap();
        store.insert_habit("Running").unwrap();

        // Duplicate names within one call produce one edge
        let linked = store
            .save_habits("u-1", &["Reading".to_string(), "Reading".to_string()])
            .unwrap();
        assert_eq!(linked, vec!["Reading".to_string()]);
        assert_eq!(store.user_habits("u-1").unwrap(), vec!["Reading".to_string()]);

        // Re-running with overlapping names changes nothing
        store
            .save_habits("u-1", &["Reading".to_string(), "Running".to_string()])
            .unwrap();
        let mut habits = store.user_habits("u-1").unwrap();
        habits.sort();
        assert_eq!(habits, vec!["Reading".to_string(), "Running".to_string()]);

        store.save_habits("u-1", &["Reading".to_string()]).unwrap();
        assert_eq!(store.user_habits("u-1").unwrap().len(), 2);
    }

    #[test]
    fn save_habits_skips_unknown_names() {
        let (store, _dir) = temp_store();
        store.create_user(&sample_user("u-1", "a@example.com")).unwrap();
        store.insert_habit("Reading").unwrap();

        let linked = store
            .save_habits("u-1", &["Reading".to_string(), "Skydiving".to_string()])
            .unwrap();
        assert_eq!(linked, vec!["Reading".to_string()]);
        assert_eq!(store.user_habits("u-1").unwrap(), vec!["Reading".to_string()]);
    }

    #[test]
    fn save_habits_unknown_user_writes_nothing() {
        let (store, _dir) = temp_store();
        store.insert_habit("Reading").unwrap();

        let result = store.save_habits("ghost", &["Reading".to_string()]);
        assert!(matches!(result, Err(GraphError::NotFound(_))));
        assert!(store.user_habits("ghost").unwrap().is_empty());
    }

    #[test]
    fn user_habits_scoped_per_user() {
        let (store, _dir) = temp_store();
        store.create_user(&sample_user("u-1", "a@example.com")).unwrap();
        store.create_user(&sample_user("u-2", "b@example.com")).unwrap();
        store.insert_habit("Reading").unwrap();
        store.insert_habit("Running").unwrap();

        store.save_habits("u-1", &["Reading".to_string()]).unwrap();
        store.save_habits("u-2", &["Running".to_string()]).unwrap();

        assert_eq!(store.user_habits("u-1").unwrap(), vec!["Reading".to_string()]);
        assert_eq!(store.user_habits("u-2").unwrap(), vec!["Running".to_string()]);
    }
}
