//! ## Error Types
//!

// Third-Party Imports
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map as JsonObject, Value};

/// Everything that can go wrong while loading,
/// tracking, or rendering a shipment
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    /// The posted carrier code was empty
    #[error("Please specify a carrier.")]
    MissingCarrier,
    /// The posted tracking number was empty
    #[error("Please enter a tracking number.")]
    MissingNumber,
    /// A request parameter couldn't be decoded
    #[error("invalid {name:?} parameter: {reason}")]
    InvalidParameter {
        /// the parameter's name
        name: &'static str,
        /// why decoding failed
        reason: String,
    },
    /// No shipment exists with the requested id
    #[error("shipment {0} does not exist")]
    ShipmentNotFound(i64),
    /// No track exists with the requested id
    #[error("We can't load track with retrieving identifier right now.")]
    TrackNotFound(i64),
    /// The shipment exists, but belongs to a different order
    #[error("shipment {shipment_id} does not belong to order {order_id}")]
    OrderMismatch {
        /// the order id supplied with the request
        order_id: i64,
        /// the shipment id supplied with the request
        shipment_id: i64,
    },
    /// A new shipment was requested without anything to ship
    #[error("We can't initialize shipment for adding tracking number.")]
    CannotInitialize,
    /// The named fragment couldn't be rendered
    #[error("unable to render fragment {name:?}: {reason}")]
    Render {
        /// the fragment's name
        name: String,
        /// the underlying template error
        reason: String,
    },
    /// A carrier failed to produce tracking info
    #[error("carrier {code:?} lookup failed: {reason}")]
    Carrier {
        /// the carrier's code
        code: String,
        /// the underlying failure
        reason: String,
    },
    /// The carrier table couldn't be loaded
    #[error("invalid carrier configuration: {0}")]
    Configuration(String),
    /// The database rejected a query
    #[error("We can't save or load shipment tracking right now.")]
    Database(#[from] sqlx::Error),
}

impl TrackingError {
    /// The HTTP status best describing the error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingCarrier
            | Self::MissingNumber
            | Self::InvalidParameter { .. }
            | Self::CannotInitialize => StatusCode::BAD_REQUEST,
            Self::ShipmentNotFound(_) | Self::TrackNotFound(_) => StatusCode::NOT_FOUND,
            Self::OrderMismatch { .. } => StatusCode::CONFLICT,
            Self::Carrier { .. } | Self::Database(_) => StatusCode::FAILED_DEPENDENCY,
            Self::Render { .. } | Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TrackingError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() || matches!(self, Self::Database(_)) {
            tracing::error!("{self:?}");
        } else {
            tracing::warn!("{self}");
        }

        (
            status,
            Json(Value::Object(JsonObject::from_iter([
                ("error".to_string(), Value::Bool(true)),
                ("message".to_string(), Value::String(self.to_string())),
            ]))),
        )
            .into_response()
    }
}
