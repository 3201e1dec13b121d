//! ### Add Track
//!

// Third-Party Imports
use axum::{
    extract::{Form, Path, State},
    response::Html,
};

// Crate-Level Imports
use crate::error::TrackingError;
use crate::state::ShipmentTrackingState;
use crate::types::{ShipmentLoadParams, ShipmentLoadRequest, ShipmentRoute, TrackSubmission};

/// Attaches a posted tracking number to a shipment
/// and re-renders the shipment's tracking panel
#[derive(Clone, Copy, Debug)]
pub struct ShipmentTrackingAction<'state> {
    state: &'state ShipmentTrackingState,
}

impl<'state> ShipmentTrackingAction<'state> {
    /// Run against the supplied collaborators
    pub fn new(state: &'state ShipmentTrackingState) -> Self {
        Self { state }
    }

    /// Load the shipment, attach the submitted track,
    /// save, and return the re-rendered panel
    #[tracing::instrument(
        err(Debug),
        skip_all,
        fields(
            order.id = request.order_id,
            shipment.id = request.shipment_id,
            track.carrier = %submission.carrier,
        )
    )]
    pub async fn execute(
        &self,
        request: ShipmentLoadRequest,
        submission: TrackSubmission,
    ) -> Result<String, TrackingError> {
        submission.validate()?;

        let mut shipment = self.state.loader.load(&request).await?;

        let track = self
            .state
            .tracks
            .create()
            .with_number(submission.number)
            .with_carrier_code(submission.carrier)
            .with_title(submission.title);

        shipment.add_track(track);
        self.state.shipments.save(&mut shipment).await?;

        tracing::info!(
            "shipment {:?} now carries {} track(s)",
            shipment.id,
            shipment.tracks.len()
        );

        super::render_shipment_tracking(self.state, &shipment)
    }
}

/// `POST /orders/:order_id/shipments/:shipment_id/tracks`
#[tracing::instrument(ret, err(Debug), skip(state))]
pub async fn add_track(
    State(state): State<ShipmentTrackingState>,
    Path(route): Path<ShipmentRoute>,
    params: ShipmentLoadParams,
    Form(submission): Form<TrackSubmission>,
) -> Result<Html<String>, TrackingError> {
    let request = ShipmentLoadRequest {
        order_id: route.order_id,
        shipment_id: route.shipment_id,
        shipment: params.shipment,
        tracking: params.tracking,
    };

    ShipmentTrackingAction::new(&state)
        .execute(request, submission)
        .await
        .map(Html)
}
