//! REST API router for the market.
//!
//! Used by the binary and by integration tests. Create with [`create_router`].
//! Uses Extension for state so the router is `Router<()>` and works with `into_make_service()`.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::{AccountId, Bid, BidId, Market, MarketError, Offer, OrderType, Symbol};

/// Shared app state: one market per process.
#[derive(Clone)]
pub struct AppState {
    pub(crate) market: Arc<Market>,
}

/// Builds the REST router over the market. Returns `Router<()>` so you can call `.into_make_service()` for `axum::serve`.
pub fn create_router(market: Arc<Market>) -> Router<()> {
    let state = AppState { market };
    Router::new()
        .route("/health", get(health))
        .route("/offers", post(submit_offer))
        .route("/bids", post(submit_bid))
        .route("/bids/:id", get(get_bid))
        .route("/symbols", get(symbols))
        .route("/prices/:symbol", get(last_price))
        .route("/book/:symbol", get(book))
        .layer(Extension(state))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

fn error_response(err: MarketError) -> Response {
    let status = match &err {
        MarketError::BidNotFound(_) => StatusCode::NOT_FOUND,
        MarketError::InvalidOffer(_) => StatusCode::BAD_REQUEST,
        MarketError::NoProcessor(_) => StatusCode::UNPROCESSABLE_ENTITY,
        MarketError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

#[derive(serde::Deserialize)]
struct OfferRequest {
    #[serde(default = "default_offer_type")]
    offer_type: OrderType,
    account: u64,
    symbol: String,
    price: i64,
    amount: i64,
}

fn default_offer_type() -> OrderType {
    OrderType::LimitOffer
}

async fn submit_offer(
    Extension(state): Extension<AppState>,
    Json(body): Json<OfferRequest>,
) -> Response {
    let mut offer = Offer::new(AccountId(body.account), Symbol(body.symbol), body.price, body.amount);
    offer.offer_type = body.offer_type;
    match state.market.offer(offer) {
        Ok(offer_id) => {
            #[derive(serde::Serialize)]
            struct Out {
                offer_id: crate::OfferId,
            }
            (StatusCode::OK, Json(Out { offer_id })).into_response()
        }
        Err(e) => error_response(e),
    }
}

#[derive(serde::Deserialize)]
struct BidRequest {
    #[serde(default = "default_bid_type")]
    bid_type: OrderType,
    account: u64,
    symbol: String,
    #[serde(default)]
    price: i64,
    amount: i64,
}

fn default_bid_type() -> OrderType {
    OrderType::MarketBid
}

async fn submit_bid(
    Extension(state): Extension<AppState>,
    Json(body): Json<BidRequest>,
) -> Response {
    let mut bid = Bid::new(AccountId(body.account), Symbol(body.symbol), body.price, body.amount);
    bid.bid_type = body.bid_type;
    let result = state
        .market
        .bid(bid)
        .and_then(|id| state.market.get_bid(id));
    match result {
        Ok(bid) => {
            #[derive(serde::Serialize)]
            struct Out {
                bid_id: BidId,
                bid: Bid,
            }
            (StatusCode::OK, Json(Out { bid_id: bid.id, bid })).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn get_bid(Extension(state): Extension<AppState>, Path(id): Path<u64>) -> Response {
    match state.market.bid_summary(BidId(id)) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn symbols(Extension(state): Extension<AppState>) -> Response {
    match state.market.symbols() {
        Ok(symbols) => (StatusCode::OK, Json(symbols)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn last_price(Extension(state): Extension<AppState>, Path(symbol): Path<String>) -> Response {
    let symbol = Symbol(symbol);
    match state.market.last_price(&symbol) {
        Ok(last_price) => {
            #[derive(serde::Serialize)]
            struct Out {
                symbol: Symbol,
                last_price: i64,
            }
            (StatusCode::OK, Json(Out { symbol, last_price })).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn book(Extension(state): Extension<AppState>, Path(symbol): Path<String>) -> Response {
    match state.market.offers(&Symbol(symbol)) {
        Ok(offers) => (StatusCode::OK, Json(offers)).into_response(),
        Err(e) => error_response(e),
    }
}
