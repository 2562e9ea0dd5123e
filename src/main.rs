//! HTTP server for the market.
//!
//! Endpoints: health, submit offer, submit bid, bid lookup, symbols, last price, book.
//! Configuration comes from the environment; see [`market_engine::MarketConfig`].

use market_engine::{api, Market, MarketConfig};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    let _ = env_logger::try_init();
    let config = MarketConfig::from_env();
    match &config.state_path {
        Some(path) => log::info!("using file storage path={}", path.display()),
        None => log::info!("using in-memory storage"),
    }
    let market = Arc::new(Market::new(config.open_storage()));
    let app = api::create_router(market);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("bind {} failed: {}", addr, e);
            std::process::exit(1);
        }
    };
    log::info!("listening on http://{}", addr);
    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        log::error!("server error: {}", e);
        std::process::exit(1);
    }
}
