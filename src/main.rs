// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use trust_gate::api::router;
use trust_gate::auth::BearerGate;
use trust_gate::config::{LogFormat, Settings};
use trust_gate::keys::{HttpKeySetSource, KeyCache, KeyRefresher};
use trust_gate::state::AppState;
use trust_gate::store::InMemorySecretStore;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() {
    let settings = Settings::from_env().expect("Invalid configuration");
    init_tracing(settings.log_format);

    // Client secrets
    let format = settings.gate.issuer_format;
    let store = match &settings.client_secrets_file {
        Some(path) => InMemorySecretStore::from_file(path, format)
            .await
            .expect("Failed to load client secrets file"),
        None => {
            warn!("No client secrets file configured; every bearer token will be rejected");
            InMemorySecretStore::new(format)
        }
    };
    info!(clients = store.len().await, "Loaded client secrets");

    let gate = BearerGate::new(settings.gate.clone(), Arc::new(store));
    let mut state = AppState::new(gate);

    let shutdown = CancellationToken::new();

    // Callback signing keys
    if let Some(url) = &settings.well_known_keys_url {
        let source = HttpKeySetSource::new(url.as_str(), settings.key_fetch_timeout)
            .expect("Failed to build key set HTTP client");
        let cache = Arc::new(KeyCache::new(Arc::new(source), settings.key_cache));
        tokio::spawn(KeyRefresher::new(cache.clone()).run(shutdown.clone()));
        state = state.with_key_cache(cache);
        info!(url = %url, "Callback verification enabled");
    } else {
        info!("No well-known keys URL configured; callback verification disabled");
    }

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .expect("Failed to bind listener");
    info!(addr = %settings.bind_addr, "Trust Gate listening");

    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
        }
        signal.cancel();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .expect("HTTP server failed");
}
