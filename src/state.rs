//! ## Service State
//!

// Standard Library Imports
use std::{
    boxed::Box,
    collections::BTreeMap,
    env::{set_var as set_env_var, var as get_env_var},
    path::PathBuf as FilePathBuf,
    sync::Arc,
};

// Third-Party Imports
use axum::extract::FromRef;
use axum_template::engine::Engine as HandlebarsEngine;
use handlebars::{Handlebars, TemplateError};
use once_cell::sync::Lazy;
use shuttle_secrets::SecretStore;

// Crate-Level Imports
use crate::carriers::CarrierRegistry;
use crate::ports::{
    BlankTrackFactory, CarrierFactory, FragmentRenderer, ShipmentLoader, ShipmentRepository,
    TrackFactory,
};
use crate::storage::{PgShipmentRepository, RepositoryShipmentLoader};

pub(crate) type TemplateEngine = HandlebarsEngine<Handlebars<'static>>;

/// Where the bundled carrier table lives
static DEFAULT_CARRIERS_CONFIG: Lazy<FilePathBuf> = Lazy::new(|| {
    FilePathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("assets")
        .join("carriers.json")
});

// <editor-fold desc="// ShipmentTrackingState ...">

/// The service's "shared" state
#[derive(Clone, Debug, FromRef)]
pub struct ShipmentTrackingState {
    /// Produces the shipment each request operates on
    pub loader: Arc<dyn ShipmentLoader>,
    /// Produces blank tracking records
    pub tracks: Arc<dyn TrackFactory>,
    /// Where shipments are persisted
    pub shipments: Arc<dyn ShipmentRepository>,
    /// Resolves carriers by code
    pub carriers: Arc<dyn CarrierFactory>,
    /// Renders the panel's HTML fragments
    pub renderer: Arc<dyn FragmentRenderer>,
}

//noinspection RsReplaceMatchExpr
impl ShipmentTrackingState {
    /// Initialize the service's state
    #[tracing::instrument(skip_all)]
    pub fn initialize(
        db: sqlx::PgPool,
        secrets: Option<SecretStore>,
        templates: Option<TemplateEngine>,
        carriers: Option<CarrierRegistry>,
    ) -> anyhow::Result<Self> {
        Self::_initialize_secrets(secrets);

        let templates = templates.map_or_else(
            Self::_default_template_engine,
            Result::<TemplateEngine, Box<TemplateError>>::Ok,
        )?;

        let carriers = match carriers {
            Some(carriers) => carriers,
            None => Self::_default_carriers()?,
        };

        let shipments: Arc<dyn ShipmentRepository> = Arc::new(PgShipmentRepository::new(db));

        Ok(Self {
            loader: Arc::new(RepositoryShipmentLoader::new(shipments.clone())),
            tracks: Arc::new(BlankTrackFactory),
            shipments,
            carriers: Arc::new(carriers),
            renderer: Arc::new(templates),
        })
    }

    #[cfg_attr(tarpaulin, coverage(off))]
    #[cfg_attr(tarpaulin, tarpaulin::skip)]
    fn _default_secrets() -> SecretStore {
        SecretStore::new(BTreeMap::new())
    }

    #[cfg_attr(tarpaulin, coverage(off))]
    #[cfg_attr(tarpaulin, tarpaulin::skip)]
    pub(crate) fn _default_template_engine() -> Result<TemplateEngine, Box<TemplateError>> {
        let mut engine = Handlebars::new();

        if get_env_var("SHUTTLE").is_ok_and(|value| &value == "true") {
            engine.set_dev_mode(true);
        }

        engine
            .register_templates_directory(
                ".tpl",
                FilePathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets")),
            )
            .map_err(Box::from)
            .map(|_| TemplateEngine::from(engine))
    }

    fn _initialize_secrets(secrets: Option<SecretStore>) -> SecretStore {
        let secrets = secrets.unwrap_or_else(Self::_default_secrets);

        if let Some(path) = get_env_var("SHIPMENT_CARRIERS_CONFIG")
            .ok()
            .or_else(|| secrets.get("CARRIERS_CONFIG"))
        {
            set_env_var("SHIPMENT_CARRIERS_CONFIG", path);
        }

        secrets
    }

    fn _default_carriers() -> anyhow::Result<CarrierRegistry> {
        let path = get_env_var("SHIPMENT_CARRIERS_CONFIG")
            .map(FilePathBuf::from)
            .unwrap_or_else(|_| DEFAULT_CARRIERS_CONFIG.clone());

        tracing::info!("loading carrier table from: {}", path.display());

        Ok(CarrierRegistry::from_path(path)?)
    }
}

// </editor-fold desc="// ShipmentTrackingState ...">
