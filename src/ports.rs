//! ## Collaborator Capabilities
//!
//! Each workflow receives its collaborators as trait objects so
//! tests can swap in doubles without touching a database.

// Standard Library Imports
use core::fmt::Debug;

// Third-Party Imports
use axum::async_trait;
use serde_json::Value;

// Crate-Level Imports
use crate::error::TrackingError;
use crate::types::{Shipment, ShipmentLoadRequest, StoreScope, TrackingRecord};

/// Produces the shipment a request operates on
#[async_trait]
pub trait ShipmentLoader: Debug + Send + Sync {
    /// Fetch (or create) the shipment described by `request`
    async fn load(&self, request: &ShipmentLoadRequest) -> Result<Shipment, TrackingError>;
}

/// Produces blank tracking records
pub trait TrackFactory: Debug + Send + Sync {
    /// Create a new, unattached tracking record
    fn create(&self) -> TrackingRecord;
}

/// Where shipments live between requests
#[async_trait]
pub trait ShipmentRepository: Debug + Send + Sync {
    /// Fetch the shipment with the supplied id
    async fn get(&self, id: i64) -> Result<Shipment, TrackingError>;

    /// Persist the shipment and append its new tracks, assigning
    /// ids to anything that doesn't have one yet.
    ///
    /// Tracks already stored are never touched, even when they're
    /// missing from `shipment.tracks`.
    async fn save(&self, shipment: &mut Shipment) -> Result<(), TrackingError>;

    /// Delete a single track from the shipment it's attached to
    async fn remove_track(&self, shipment_id: i64, track_id: i64) -> Result<(), TrackingError>;

    /// Fetch a track along with the shipment it's attached to
    async fn find_track(&self, track_id: i64)
        -> Result<(Shipment, TrackingRecord), TrackingError>;
}

/// A shipping provider capable of describing a tracking number
#[async_trait]
pub trait Carrier: Debug + Send + Sync {
    /// Scope subsequent lookups to the supplied store
    fn set_store(&mut self, store: StoreScope);

    /// Describe the supplied tracking number, if the carrier can
    async fn tracking_info(&self, number: &str) -> Result<Option<String>, TrackingError>;
}

/// Resolves carriers by code
pub trait CarrierFactory: Debug + Send + Sync {
    /// Create a fresh carrier instance for `code`
    fn create(&self, code: &str) -> Option<Box<dyn Carrier>>;
}

/// Renders named HTML fragments
pub trait FragmentRenderer: Debug + Send + Sync {
    /// Render the fragment called `name` against `context`
    fn render_fragment(&self, name: &str, context: &Value) -> Result<String, TrackingError>;
}

/// The default [`TrackFactory`]
#[derive(Clone, Copy, Debug, Default)]
pub struct BlankTrackFactory;

impl TrackFactory for BlankTrackFactory {
    fn create(&self) -> TrackingRecord {
        TrackingRecord::default()
    }
}
