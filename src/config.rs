// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HabitSphere

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup; secrets and tunables are then passed into components at
//! construction time.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for the embedded graph store | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `JWT_SECRET` | HS256 signing secret for session tokens | Required |
//! | `SMTP_HOST` | SMTP relay host | Optional (log-only mail if unset) |
//! | `SMTP_PORT` | SMTP relay port | `587` |
//! | `SMTP_USER` | SMTP username | Required with `SMTP_HOST` |
//! | `SMTP_PASS` | SMTP password | Required with `SMTP_HOST` |
//! | `MAIL_FROM` | From address for verification mail | `SMTP_USER` |
//! | `SEED_HABITS` | Comma-separated habit catalog seeded at startup | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

/// Environment variable name for the graph store data directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Default data directory when `DATA_DIR` is unset.
pub const DEFAULT_DATA_DIR: &str = "/data";

/// File name of the embedded graph database inside the data directory.
pub const GRAPH_DB_FILE: &str = "habitsphere.redb";

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Default bind port (the original deployment's port).
pub const DEFAULT_PORT: u16 = 3000;

/// Environment variable name for the session token signing secret.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// SMTP relay settings. When `SMTP_HOST` is unset the server uses a
/// log-only mailer (development mode).
pub const SMTP_HOST_ENV: &str = "SMTP_HOST";
pub const SMTP_PORT_ENV: &str = "SMTP_PORT";
pub const SMTP_USER_ENV: &str = "SMTP_USER";
pub const SMTP_PASS_ENV: &str = "SMTP_PASS";
pub const MAIL_FROM_ENV: &str = "MAIL_FROM";

/// Default SMTP submission port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Environment variable name for the seeded habit catalog
/// (comma-separated names).
pub const SEED_HABITS_ENV: &str = "SEED_HABITS";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default `RUST_LOG` filter when none is provided.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";
