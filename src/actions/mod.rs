//! ## Admin Actions
//!

// Module Declarations
#[path = "add-track.rs"]
pub mod add_track;
#[path = "remove-track.rs"]
pub mod remove_track;
#[path = "view-track.rs"]
pub mod view_track;

pub use self::{
    add_track::{add_track, ShipmentTrackingAction},
    remove_track::remove_track,
    view_track::view_track,
};

// Crate-Level Imports
use crate::error::TrackingError;
use crate::rendering::{fragment_context, SHIPMENT_TRACKING};
use crate::state::ShipmentTrackingState;
use crate::types::Shipment;

/// Re-render the `shipment_tracking` fragment for `shipment`
pub(crate) fn render_shipment_tracking(
    state: &ShipmentTrackingState,
    shipment: &Shipment,
) -> Result<String, TrackingError> {
    let context = fragment_context(SHIPMENT_TRACKING, shipment)?;

    state.renderer.render_fragment(SHIPMENT_TRACKING, &context)
}
