//! ## Tracking Lookup
//!
//! Resolves a stored track's carrier and asks it to
//! describe the track's number, scoped to the store
//! the track's shipment was placed in.

// Third-Party Imports
use serde::{Deserialize, Serialize};

// Crate-Level Imports
use crate::error::TrackingError;
use crate::ports::{CarrierFactory, ShipmentRepository};
use crate::types::{TrackingDetail, TrackingRecord};

/// A tracking record, as seen from the shipment it's attached to
#[cfg_attr(test, derive(Eq, PartialEq))]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShipmentTrack {
    /// the track's sequential id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// the id of the shipment the track is attached to
    pub parent_id: i64,
    /// the code of the carrier that issued the number
    pub carrier_code: String,
    /// the track's human-readable title
    pub title: String,
    /// the carrier-issued tracking number
    pub number: String,
}

impl ShipmentTrack {
    /// View `record` as a track of the shipment `parent_id`
    pub fn new(parent_id: i64, record: &TrackingRecord) -> Self {
        Self {
            id: record.id,
            parent_id,
            carrier_code: record.carrier_code.clone(),
            title: record.title.clone(),
            number: record.number.clone(),
        }
    }
}

/// Looks up carrier-provided detail for stored tracks
#[derive(Clone, Copy, Debug)]
pub struct TrackingLookup<'services> {
    carriers: &'services dyn CarrierFactory,
    shipments: &'services dyn ShipmentRepository,
}

impl<'services> TrackingLookup<'services> {
    /// Look tracks up through the supplied collaborators
    pub fn new(
        carriers: &'services dyn CarrierFactory,
        shipments: &'services dyn ShipmentRepository,
    ) -> Self {
        Self {
            carriers,
            shipments,
        }
    }

    /// Describe the supplied track's number
    #[tracing::instrument(
        ret,
        err(Debug),
        skip(self),
        fields(store)
    )]
    pub async fn number_detail(&self, track: &ShipmentTrack) -> Result<TrackingDetail, TrackingError> {
        let Some(mut carrier) = self.carriers.create(&track.carrier_code) else {
            tracing::info!("no carrier registered for {:?}", track.carrier_code);
            return Ok(TrackingDetail::Custom {
                title: track.title.clone(),
                number: track.number.clone(),
            });
        };

        let store = self.shipments.get(track.parent_id).await?.store;
        tracing::Span::current().record("store", store.as_str());

        carrier.set_store(store);

        Ok(match carrier.tracking_info(&track.number).await? {
            Some(info) if !info.is_empty() => TrackingDetail::Carrier { info },
            _ => TrackingDetail::Unavailable {
                number: track.number.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    //! ## I/O-free Unit Tests

    // Standard Library Imports
    use std::collections::BTreeMap;

    // Third-Party Imports
    use pretty_assertions::{assert_eq, assert_str_eq};
    use rstest::{fixture, rstest};

    // Crate-Level Imports
    use super::{ShipmentTrack, TrackingLookup};
    use crate::ports::ShipmentRepository;
    use crate::types::{Shipment, StoreScope, TrackingDetail};
    use crate::utils::{InMemoryShipments, StubCarriers};

    fn track(carrier_code: &str) -> ShipmentTrack {
        ShipmentTrack {
            id: Some(7),
            parent_id: 1,
            carrier_code: carrier_code.to_string(),
            title: "title".to_string(),
            number: "number".to_string(),
        }
    }

    #[fixture]
    async fn shipments() -> InMemoryShipments {
        let shipments = InMemoryShipments::default();
        let mut shipment = Shipment::new(10003, StoreScope::default_store(), BTreeMap::new());
        shipments.save(&mut shipment).await.unwrap();
        shipments
    }

    #[rstest]
    #[test_log::test(tokio::test)]
    async fn test_lookup(#[future] shipments: InMemoryShipments) -> anyhow::Result<()> {
        let shipments = shipments.await;
        let carriers = StubCarriers::answering(Some("trackingInfo"));

        let detail = TrackingLookup::new(&carriers, &shipments)
            .number_detail(&track("freeshipping"))
            .await?;

        assert_str_eq!("trackingInfo", detail.to_string());
        assert_eq!(vec!["freeshipping".to_string()], carriers.created());
        assert_eq!(vec![StoreScope::from("")], carriers.stores());
        assert_eq!(vec!["number".to_string()], carriers.lookups());

        Ok(())
    }

    #[rstest]
    #[test_log::test(tokio::test)]
    async fn test_lookup_is_repeatable(
        #[future] shipments: InMemoryShipments,
    ) -> anyhow::Result<()> {
        let shipments = shipments.await;
        let carriers = StubCarriers::answering(Some("trackingInfo"));
        let lookup = TrackingLookup::new(&carriers, &shipments);

        let first = lookup.number_detail(&track("ups")).await?;
        let second = lookup.number_detail(&track("ups")).await?;

        assert_eq!(first, second);
        assert_eq!(2, carriers.created().len());

        Ok(())
    }

    #[rstest]
    #[case::nothing(None)]
    #[case::empty(Some(""))]
    #[test_log::test(tokio::test)]
    async fn test_lookup_without_detail(
        #[future] shipments: InMemoryShipments,
        #[case] answer: Option<&str>,
    ) -> anyhow::Result<()> {
        let shipments = shipments.await;
        let carriers = StubCarriers::answering(answer);

        let detail = TrackingLookup::new(&carriers, &shipments)
            .number_detail(&track("ups"))
            .await?;

        assert_eq!(
            TrackingDetail::Unavailable {
                number: "number".to_string()
            },
            detail
        );

        Ok(())
    }

    #[rstest]
    #[test_log::test(tokio::test)]
    async fn test_lookup_unknown_carrier(
        #[future] shipments: InMemoryShipments,
    ) -> anyhow::Result<()> {
        let shipments = shipments.await;
        let carriers = StubCarriers::answering(Some("trackingInfo")).without("custom");

        let detail = TrackingLookup::new(&carriers, &shipments)
            .number_detail(&track("custom"))
            .await?;

        assert_eq!(
            TrackingDetail::Custom {
                title: "title".to_string(),
                number: "number".to_string()
            },
            detail
        );
        assert!(carriers.stores().is_empty());

        Ok(())
    }

    #[rstest]
    #[test_log::test(tokio::test)]
    async fn test_lookup_scopes_to_shipment_store() -> anyhow::Result<()> {
        let shipments = InMemoryShipments::default();
        let mut shipment = Shipment::new(10003, StoreScope::from("de"), BTreeMap::new());
        shipments.save(&mut shipment).await?;

        let carriers = StubCarriers::answering(Some("Sendungsverfolgung"));

        TrackingLookup::new(&carriers, &shipments)
            .number_detail(&track("ups"))
            .await?;

        assert_eq!(vec![StoreScope::from("de")], carriers.stores());

        Ok(())
    }
}
