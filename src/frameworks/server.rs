use std::net::SocketAddr;
use std::sync::Arc;

use crate::domain::ports::Clock;
use crate::domain::token::{TokenConfig, TokenSigner};
use crate::frameworks::config::GatewayConfig;
use crate::interface_adapters::clients::{HttpGuestStore, HttpNotifier};
use crate::interface_adapters::rate_limit::InMemoryRateLimitStore;
use crate::interface_adapters::routes::app;
use crate::interface_adapters::state::{AppState, SystemClock};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run() {
    init_tracing();

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            return;
        }
    };

    let rate_store = InMemoryRateLimitStore::new();
    let clock = SystemClock;

    // Periodic sweep keeps the rate-limit map bounded under sustained traffic
    // from many distinct clients.
    {
        let rate_store = rate_store.clone();
        let clock = clock.clone();
        let interval = config.sweep_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                rate_store.sweep(clock.now_epoch_millis()).await;
            }
        });
    }

    let state = AppState {
        clock: Arc::new(clock),
        rate_store: Arc::new(rate_store),
        store: Arc::new(HttpGuestStore::new(
            config.store_base_url.clone(),
            config.store_timeout,
        )),
        notifier: Arc::new(HttpNotifier::new(
            config.notifier_base_url.clone(),
            config.store_timeout,
        )),
        signer: TokenSigner::new(TokenConfig {
            secret: config.token_secret.clone(),
            ttl_ms: config.token_ttl_ms,
        }),
    };

    // Wire routes for the guest QR gateway.
    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            return;
        }
    };
    tracing::info!(%addr, "listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
    }
}
