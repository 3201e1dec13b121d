//! ### View Track
//!

// Third-Party Imports
use axum::{
    extract::{Path, State},
    response::Html,
};
use serde_json::{Map as JsonObject, Value};

// Crate-Level Imports
use crate::error::TrackingError;
use crate::lookup::{ShipmentTrack, TrackingLookup};
use crate::rendering::{fragment_context, TRACKING_INFO};
use crate::state::ShipmentTrackingState;

/// `GET /tracks/:track_id`
#[tracing::instrument(ret, err(Debug), skip(state))]
pub async fn view_track(
    State(state): State<ShipmentTrackingState>,
    Path(track_id): Path<i64>,
) -> Result<Html<String>, TrackingError> {
    let (shipment, record) = state.shipments.find_track(track_id).await?;
    let track = ShipmentTrack::new(shipment.id.unwrap_or_default(), &record);

    let detail = TrackingLookup::new(state.carriers.as_ref(), state.shipments.as_ref())
        .number_detail(&track)
        .await?;

    let context = Value::Object(JsonObject::from_iter([
        ("track".to_string(), fragment_context(TRACKING_INFO, &track)?),
        ("detail".to_string(), Value::String(detail.to_string())),
        ("result".to_string(), fragment_context(TRACKING_INFO, &detail)?),
    ]));

    state.renderer.render_fragment(TRACKING_INFO, &context).map(Html)
}
