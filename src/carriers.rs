//! ## Carriers
//!

// Standard Library Imports
use std::{collections::BTreeMap, path::Path as FilePath};

// Third-Party Imports
use axum::async_trait;
use serde::{Deserialize, Serialize};

// Crate-Level Imports
use crate::error::TrackingError;
use crate::ports::{Carrier, CarrierFactory};
use crate::types::StoreScope;

/// Placeholder substituted with the
/// (url-encoded) tracking number
const NUMBER_PLACEHOLDER: &str = "{number}";

// <editor-fold desc="// CarrierConfig ...">

/// How a single carrier describes its tracking numbers
#[cfg_attr(test, derive(Eq, PartialEq))]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CarrierConfig {
    /// the carrier's human-readable name
    pub title: String,
    /// tracking page url templates keyed by store code,
    /// the empty key being the default store's template.
    /// Carriers without any template are "offline" and
    /// never have anything to say about a number.
    #[serde(default)]
    pub tracking_url: BTreeMap<String, String>,
}

impl CarrierConfig {
    /// The url template to use for the supplied store
    fn template_for(&self, store: &StoreScope) -> Option<&str> {
        self.tracking_url
            .get(store.as_str())
            .or_else(|| self.tracking_url.get(""))
            .map(String::as_str)
    }
}

// </editor-fold desc="// CarrierConfig ...">

// <editor-fold desc="// ConfiguredCarrier ...">

/// A [`Carrier`] backed by a [`CarrierConfig`]
#[derive(Clone, Debug)]
pub struct ConfiguredCarrier {
    code: String,
    config: CarrierConfig,
    store: StoreScope,
}

impl ConfiguredCarrier {
    /// Create a carrier scoped to the default store
    pub fn new<T: Into<String>>(code: T, config: CarrierConfig) -> Self {
        Self {
            code: code.into(),
            config,
            store: StoreScope::default_store(),
        }
    }
}

#[async_trait]
impl Carrier for ConfiguredCarrier {
    fn set_store(&mut self, store: StoreScope) {
        self.store = store;
    }

    #[tracing::instrument(ret, skip(self))]
    async fn tracking_info(&self, number: &str) -> Result<Option<String>, TrackingError> {
        let Some(template) = self.config.template_for(&self.store) else {
            tracing::debug!("{} has no tracking page for store {:?}", self.code, self.store);
            return Ok(None);
        };

        if !template.contains(NUMBER_PLACEHOLDER) {
            return Err(TrackingError::Carrier {
                code: self.code.clone(),
                reason: format!("tracking url template lacks {NUMBER_PLACEHOLDER}: {template}"),
            });
        }

        let encoded = url::form_urlencoded::byte_serialize(number.as_bytes()).collect::<String>();

        Ok(Some(format!(
            "{}: {}",
            self.config.title,
            template.replace(NUMBER_PLACEHOLDER, &encoded)
        )))
    }
}

// </editor-fold desc="// ConfiguredCarrier ...">

// <editor-fold desc="// CarrierRegistry ...">

/// The service's table of known carriers
#[derive(Clone, Debug, Default)]
pub struct CarrierRegistry {
    carriers: BTreeMap<String, CarrierConfig>,
}

impl CarrierRegistry {
    /// Parse a JSON object of carrier configs keyed by carrier code
    pub fn from_json(raw: &str) -> Result<Self, TrackingError> {
        serde_json::from_str::<BTreeMap<String, CarrierConfig>>(raw)
            .map(|carriers| Self { carriers })
            .map_err(|error| TrackingError::Configuration(error.to_string()))
    }

    /// Read and parse the carrier table at `path`
    pub fn from_path<P: AsRef<FilePath>>(path: P) -> Result<Self, TrackingError> {
        let path = path.as_ref();

        std::fs::read_to_string(path)
            .map_err(|error| TrackingError::Configuration(format!("{}: {error}", path.display())))
            .and_then(|raw| Self::from_json(&raw))
    }

    /// Register (or replace) a carrier
    #[must_use]
    pub fn with_carrier<T: Into<String>>(mut self, code: T, config: CarrierConfig) -> Self {
        self.carriers.insert(code.into(), config);
        self
    }

    /// The codes of every registered carrier
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.carriers.keys().map(String::as_str)
    }
}

impl CarrierFactory for CarrierRegistry {
    fn create(&self, code: &str) -> Option<Box<dyn Carrier>> {
        self.carriers.get(code).map(|config| {
            Box::new(ConfiguredCarrier::new(code, config.clone())) as Box<dyn Carrier>
        })
    }
}

// </editor-fold desc="// CarrierRegistry ...">
