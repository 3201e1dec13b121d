//! ### Remove Track
//!

// Third-Party Imports
use axum::{
    extract::{Path, State},
    response::Html,
};

// Crate-Level Imports
use crate::error::TrackingError;
use crate::state::ShipmentTrackingState;
use crate::types::ShipmentLoadRequest;

/// `POST /orders/:order_id/shipments/:shipment_id/tracks/:track_id/remove`
#[tracing::instrument(ret, err(Debug), skip(state))]
pub async fn remove_track(
    State(state): State<ShipmentTrackingState>,
    Path((order_id, shipment_id, track_id)): Path<(i64, i64, i64)>,
) -> Result<Html<String>, TrackingError> {
    let request = ShipmentLoadRequest {
        order_id,
        shipment_id: Some(shipment_id),
        ..ShipmentLoadRequest::default()
    };

    let mut shipment = state.loader.load(&request).await?;

    shipment
        .remove_track(track_id)
        .ok_or(TrackingError::TrackNotFound(track_id))?;

    state.shipments.remove_track(shipment_id, track_id).await?;

    super::render_shipment_tracking(&state, &shipment).map(Html)
}
