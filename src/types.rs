//! ## Custom Types
//!

// Standard Library Imports
use core::fmt::{Display, Formatter, Result as FormatResult};
use std::collections::{BTreeMap, HashMap};

// Third-Party Imports
use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use chrono::{DateTime, Utc};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::Value;

// Crate-Level Imports
use crate::error::TrackingError;

// <editor-fold desc="// StoreScope ...">

/// The store context a carrier performs lookups under.
///
/// An empty scope means "the default store".
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreScope(pub String);

impl StoreScope {
    /// The default store's scope
    pub fn default_store() -> Self {
        Self::default()
    }

    /// The scope's store code
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for StoreScope {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for StoreScope {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// </editor-fold desc="// StoreScope ...">

// <editor-fold desc="// TrackingRecord ...">

/// A carrier / tracking number / title tuple
/// attached to a [`Shipment`]
#[cfg_attr(test, derive(PartialEq))]
#[derive(Clone, Debug, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct TrackingRecord {
    /// the record's sequential id, assigned on save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// the code of the carrier that issued the number
    pub carrier_code: String,
    /// the record's human-readable title
    pub title: String,
    /// the carrier-issued tracking number
    #[sqlx(rename = "track_number")]
    pub number: String,
    /// when the record was first persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl TrackingRecord {
    /// Set the record's tracking number
    #[must_use]
    pub fn with_number<T: Into<String>>(mut self, number: T) -> Self {
        self.number = number.into();
        self
    }

    /// Set the record's carrier code
    #[must_use]
    pub fn with_carrier_code<T: Into<String>>(mut self, carrier_code: T) -> Self {
        self.carrier_code = carrier_code.into();
        self
    }

    /// Set the record's title
    #[must_use]
    pub fn with_title<T: Into<String>>(mut self, title: T) -> Self {
        self.title = title.into();
        self
    }
}

// </editor-fold desc="// TrackingRecord ...">

// <editor-fold desc="// Shipment ...">

/// A physical shipment tied to an order
#[cfg_attr(test, derive(PartialEq))]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Shipment {
    /// the shipment's sequential id, assigned on save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// the id of the order the shipment belongs to
    pub order_id: i64,
    /// the store the order was placed in
    #[serde(default)]
    pub store: StoreScope,
    /// shipped quantity keyed by order item id
    #[serde(default)]
    pub items: BTreeMap<String, f64>,
    /// the shipment's tracking records, in attach order
    #[serde(default)]
    pub tracks: Vec<TrackingRecord>,
}

impl Shipment {
    /// Create a new, not yet persisted, shipment
    pub fn new(order_id: i64, store: StoreScope, items: BTreeMap<String, f64>) -> Self {
        Self {
            id: None,
            order_id,
            store,
            items,
            tracks: Vec::new(),
        }
    }

    /// Attach the supplied tracking record
    pub fn add_track(&mut self, record: TrackingRecord) -> &mut Self {
        self.tracks.push(record);
        self
    }

    /// Detach the tracking record with the supplied id
    pub fn remove_track(&mut self, track_id: i64) -> Option<TrackingRecord> {
        self.tracks
            .iter()
            .position(|track| track.id == Some(track_id))
            .map(|index| self.tracks.remove(index))
    }

    /// Get the tracking record with the supplied id
    pub fn track(&self, track_id: i64) -> Option<&TrackingRecord> {
        self.tracks.iter().find(|track| track.id == Some(track_id))
    }
}

// </editor-fold desc="// Shipment ...">

// <editor-fold desc="// Request Payloads ...">

/// The `shipment` request parameter
#[cfg_attr(test, derive(PartialEq))]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShipmentPayload {
    /// requested quantity keyed by order item id
    #[serde(default, deserialize_with = "deserialize_items")]
    pub items: BTreeMap<String, f64>,
    /// whether the customer should be notified
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub send_email: String,
}

/// One entry of the `tracking` request parameter
#[cfg_attr(test, derive(Eq, PartialEq))]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TrackingRecordInput {
    /// the code of the carrier that issued the number
    #[serde(default)]
    pub carrier_code: String,
    /// the record's human-readable title
    #[serde(default)]
    pub title: String,
    /// the carrier-issued tracking number
    #[serde(default)]
    pub number: String,
}

impl From<TrackingRecordInput> for TrackingRecord {
    fn from(input: TrackingRecordInput) -> Self {
        Self::default()
            .with_carrier_code(input.carrier_code)
            .with_title(input.title)
            .with_number(input.number)
    }
}

/// Everything a [`ShipmentLoader`](crate::ports::ShipmentLoader)
/// needs to produce a shipment
#[cfg_attr(test, derive(PartialEq))]
#[derive(Clone, Debug, Default)]
pub struct ShipmentLoadRequest {
    /// the order the shipment belongs to
    pub order_id: i64,
    /// the shipment to fetch, absent for a new shipment
    pub shipment_id: Option<i64>,
    /// the `shipment` request parameter
    pub shipment: ShipmentPayload,
    /// the `tracking` request parameter
    pub tracking: Vec<TrackingRecordInput>,
}

/// Posted fields describing the track to add
#[cfg_attr(test, derive(Eq, PartialEq))]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TrackSubmission {
    /// the carrier's code
    #[serde(default)]
    pub carrier: String,
    /// the carrier-issued tracking number
    #[serde(default)]
    pub number: String,
    /// the track's human-readable title
    #[serde(default)]
    pub title: String,
}

impl TrackSubmission {
    /// Reject submissions without a carrier or number
    pub fn validate(&self) -> Result<(), TrackingError> {
        if self.carrier.trim().is_empty() {
            return Err(TrackingError::MissingCarrier);
        }

        if self.number.trim().is_empty() {
            return Err(TrackingError::MissingNumber);
        }

        Ok(())
    }
}

/// Route parameters identifying an order's shipment
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ShipmentRoute {
    /// the order's id
    pub order_id: i64,
    /// the shipment's id, absent when creating one
    #[serde(default)]
    pub shipment_id: Option<i64>,
}

/// Accept either an object keyed by item id
/// or an empty list for "no items"
fn deserialize_items<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, f64>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(BTreeMap::new()),
        Value::Array(items) if items.is_empty() => Ok(BTreeMap::new()),
        Value::Object(items) => items
            .into_iter()
            .map(|(id, qty)| match qty {
                Value::Number(qty) => qty.as_f64().map(|qty| (id, qty)),
                Value::String(qty) => qty.parse::<f64>().ok().map(|qty| (id, qty)),
                _ => None,
            })
            .map(|entry| entry.filter(|(_, qty)| qty.is_finite()))
            .collect::<Option<BTreeMap<String, f64>>>()
            .ok_or_else(|| D::Error::custom("item quantities must be numeric")),
        other => Err(D::Error::custom(format!("unexpected items value: {other}"))),
    }
}

/// Accept strings, booleans, and numbers as a flag
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(flag) => flag,
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        other => other.to_string(),
    })
}

// </editor-fold desc="// Request Payloads ...">

// <editor-fold desc="// ShipmentLoadParams ...">

/// [`axum` extractor](axum::extract) for the JSON-encoded
/// `shipment` and `tracking` query parameters
#[derive(Debug, Default)]
pub struct ShipmentLoadParams {
    /// the decoded `shipment` parameter
    pub shipment: ShipmentPayload,
    /// the decoded `tracking` parameter
    pub tracking: Vec<TrackingRecordInput>,
}

#[async_trait]
impl<State: Send + Sync> FromRequestParts<State> for ShipmentLoadParams {
    type Rejection = TrackingError;

    async fn from_request_parts(parts: &mut Parts, state: &State) -> Result<Self, Self::Rejection> {
        let Query(mut params) =
            <Query<HashMap<String, String>> as FromRequestParts<State>>::from_request_parts(
                parts, state,
            )
            .await
            .map_err(|error| TrackingError::InvalidParameter {
                name: "query",
                reason: error.to_string(),
            })?;

        let shipment = params
            .remove("shipment")
            .filter(|raw| !raw.is_empty())
            .map(|raw| serde_json::from_str::<ShipmentPayload>(&raw))
            .transpose()
            .map_err(|error| TrackingError::InvalidParameter {
                name: "shipment",
                reason: error.to_string(),
            })?
            .unwrap_or_default();

        let tracking = params
            .remove("tracking")
            .filter(|raw| !raw.is_empty())
            .map(|raw| serde_json::from_str::<Vec<TrackingRecordInput>>(&raw))
            .transpose()
            .map_err(|error| TrackingError::InvalidParameter {
                name: "tracking",
                reason: error.to_string(),
            })?
            .unwrap_or_default();

        Ok(Self { shipment, tracking })
    }
}

// </editor-fold desc="// ShipmentLoadParams ...">

// <editor-fold desc="// TrackingDetail ...">

/// The human-readable result of a tracking lookup
#[cfg_attr(test, derive(Eq, PartialEq))]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackingDetail {
    /// Detail text supplied by the carrier
    Carrier {
        /// the carrier's text
        info: String,
    },
    /// The carrier had nothing to say about the number
    Unavailable {
        /// the number that was looked up
        number: String,
    },
    /// No carrier is registered for the track's code
    Custom {
        /// the track's title
        title: String,
        /// the track's number
        number: String,
    },
}

impl Display for TrackingDetail {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self {
            Self::Carrier { info } => formatter.write_str(info),
            Self::Unavailable { number } => write!(formatter, r#"No detail for number "{number}""#),
            Self::Custom { title, number } => write!(formatter, "{title}: {number}"),
        }
    }
}

// </editor-fold desc="// TrackingDetail ...">
