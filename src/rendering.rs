//! ## Fragment Rendering
//!

// Third-Party Imports
use axum_template::TemplateEngine as _;
use serde::Serialize;
use serde_json::Value;

// Crate-Level Imports
use crate::error::TrackingError;
use crate::ports::FragmentRenderer;
use crate::state::TemplateEngine;

/// The fragment re-rendered after a shipment's tracks change
pub const SHIPMENT_TRACKING: &str = "shipment_tracking";

/// The fragment describing a single track's carrier detail
pub const TRACKING_INFO: &str = "tracking_info";

/// Serialize `data` into a render context for the fragment called `name`
pub fn fragment_context<T: Serialize>(name: &str, data: &T) -> Result<Value, TrackingError> {
    serde_json::to_value(data).map_err(|error| TrackingError::Render {
        name: name.to_string(),
        reason: error.to_string(),
    })
}

impl FragmentRenderer for TemplateEngine {
    #[tracing::instrument(skip(self, context), err(Display))]
    fn render_fragment(&self, name: &str, context: &Value) -> Result<String, TrackingError> {
        self.render(name, context)
            .map_err(|error| TrackingError::Render {
                name: name.to_string(),
                reason: error.to_string(),
            })
    }
}
