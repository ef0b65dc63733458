// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HabitSphere

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use habitsphere_server::{
    api::router,
    auth::{TokenService, SESSION_TTL},
    config,
    mailer::{LogMailer, Mailer, SmtpConfig, SmtpMailer},
    state::AppState,
    storage::GraphStore,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

    match env::var(config::LOG_FORMAT_ENV).as_deref() {
        Ok("json") => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

/// Build the mailer from the environment. Without `SMTP_HOST` the server
/// runs in development mode and logs verification codes instead of
/// sending them.
fn build_mailer() -> Arc<dyn Mailer> {
    let Ok(host) = env::var(config::SMTP_HOST_ENV) else {
        warn!("SMTP_HOST not set, verification mail will be logged only");
        return Arc::new(LogMailer);
    };

    let username = env::var(config::SMTP_USER_ENV).unwrap_or_default();
    let password = env::var(config::SMTP_PASS_ENV).unwrap_or_default();
    let from = env::var(config::MAIL_FROM_ENV).unwrap_or_else(|_| username.clone());
    let port = env::var(config::SMTP_PORT_ENV)
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(config::DEFAULT_SMTP_PORT);

    Arc::new(SmtpMailer::new(SmtpConfig {
        host,
        port,
        username,
        password,
        from,
    }))
}

/// Seed the habit catalog from `SEED_HABITS` (comma-separated names).
/// Inserts are idempotent, so re-seeding on restart is harmless.
fn seed_habits(graph: &GraphStore) {
    let Ok(seed) = env::var(config::SEED_HABITS_ENV) else {
        return;
    };

    for name in seed.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if let Err(e) = graph.insert_habit(name) {
            warn!(habit = %name, error = %e, "failed to seed habit");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() {
    init_tracing();

    let secret = env::var(config::JWT_SECRET_ENV)
        .unwrap_or_else(|_| panic!("{} must be set", config::JWT_SECRET_ENV));

    let data_dir = PathBuf::from(
        env::var(config::DATA_DIR_ENV).unwrap_or_else(|_| config::DEFAULT_DATA_DIR.to_string()),
    );
    let db_path = data_dir.join(config::GRAPH_DB_FILE);
    let graph = GraphStore::open(&db_path)
        .unwrap_or_else(|e| panic!("failed to open graph store at {}: {e}", db_path.display()));

    seed_habits(&graph);

    let tokens = TokenService::new(&secret, SESSION_TTL);
    let state = AppState::new(graph, tokens, build_mailer());
    let app = router(state);

    let host = env::var(config::HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var(config::PORT_ENV)
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(config::DEFAULT_PORT);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));

    info!(%addr, "HabitSphere server listening (docs at /docs)");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("server failed");
}
