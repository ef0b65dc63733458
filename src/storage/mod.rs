// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HabitSphere

//! # Storage Module
//!
//! Two stores with very different lifetimes:
//!
//! - [`graph`] — the durable graph store (redb): user nodes, the habit
//!   catalog, and HAS edges. ACID; every multi-statement operation runs in
//!   one write transaction.
//! - [`pending`] — the transient pending-registration cache. Process
//!   memory only; entries survive neither restarts nor their 10-minute TTL.

pub mod graph;
pub mod pending;

pub use graph::{GraphError, GraphResult, GraphStore, StoredHabit, StoredUser, PLACEHOLDER_USERNAME};
pub use pending::{PendingError, PendingRegistration, PendingStore, PENDING_TTL};
