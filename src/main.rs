#![forbid(unsafe_code)]
#![cfg_attr(tarpaulin, feature(register_tool))]
#![cfg_attr(tarpaulin, register_tool(tarpaulin))]
#![cfg_attr(tarpaulin, feature(coverage_attribute))]
#![deny(missing_docs, missing_debug_implementations)]

//! # Shipment Tracking
//!
//! Backend for an order-management admin panel's
//! shipment tracking block: attach and detach carrier
//! tracking numbers, and look up carrier-provided detail.

// Third-Party Imports
use axum::{routing, Router};
use shuttle_secrets::SecretStore;
use tower_http::trace::TraceLayer;


pub mod actions;
pub mod carriers;
pub mod error;
pub mod lookup;
pub mod ports;
pub mod rendering;
pub mod state;
pub mod storage;
pub mod types;
pub mod utils;

// Crate-Level Imports
use crate::state::ShipmentTrackingState;

/// Run the project
#[shuttle_runtime::main]
async fn main(
    #[shuttle_shared_db::Postgres] db: sqlx::PgPool,
    #[shuttle_secrets::Secrets] secrets: SecretStore,
) -> shuttle_axum::ShuttleAxum {
    storage::ensure_schema(&db)
        .await
        .map_err(anyhow::Error::from)?;

    let state = ShipmentTrackingState::initialize(db, Some(secrets), None, None)?;

    Ok(router(state).into())
}

/// Create the project's main `Router` instance
#[tracing::instrument(skip_all)]
pub fn router(state: ShipmentTrackingState) -> Router {
    Router::new()
        .route("/orders/:order_id/tracks", routing::post(actions::add_track))
        .route(
            "/orders/:order_id/shipments/:shipment_id/tracks",
            routing::post(actions::add_track),
        )
        .route(
            "/orders/:order_id/shipments/:shipment_id/tracks/:track_id/remove",
            routing::post(actions::remove_track),
        )
        .route("/tracks/:track_id", routing::get(actions::view_track))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
