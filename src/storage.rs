//! ## Shipment Storage
//!

// Standard Library Imports
use std::{collections::BTreeMap, sync::Arc};

// Third-Party Imports
use axum::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{error::Error as DbError, postgres::PgQueryResult, types::Json, FromRow};

// Crate-Level Imports
use crate::error::TrackingError;
use crate::ports::{ShipmentLoader, ShipmentRepository};
use crate::types::{Shipment, ShipmentLoadRequest, StoreScope, TrackingRecord};

/// Create the `shipments` and `shipment_tracks` tables if they don't exist
#[tracing::instrument(err(Debug), skip(db))]
pub async fn ensure_schema(db: &sqlx::PgPool) -> Result<PgQueryResult, DbError> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS shipments (
          id BIGSERIAL PRIMARY KEY,
          order_id BIGINT NOT NULL,
          store_code VARCHAR(64) NOT NULL DEFAULT '',
          items JSONB NOT NULL DEFAULT '{}'
        );
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS shipment_tracks (
          id BIGSERIAL PRIMARY KEY,
          parent_id BIGINT NOT NULL REFERENCES shipments (id) ON DELETE CASCADE,
          order_id BIGINT NOT NULL,
          carrier_code VARCHAR(32) NOT NULL,
          title VARCHAR(255) NOT NULL DEFAULT '',
          track_number TEXT NOT NULL,
          created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(db)
    .await
}

// <editor-fold desc="// ShipmentRow ...">

/// A `shipments` table row
#[derive(Debug, FromRow)]
struct ShipmentRow {
    id: i64,
    order_id: i64,
    store_code: String,
    items: Json<BTreeMap<String, f64>>,
}

impl ShipmentRow {
    fn into_shipment(self, tracks: Vec<TrackingRecord>) -> Shipment {
        Shipment {
            id: Some(self.id),
            order_id: self.order_id,
            store: StoreScope::from(self.store_code),
            items: self.items.0,
            tracks,
        }
    }
}

// </editor-fold desc="// ShipmentRow ...">

// <editor-fold desc="// PgShipmentRepository ...">

/// A [`ShipmentRepository`] backed by PostgreSQL
#[derive(Clone, Debug)]
pub struct PgShipmentRepository {
    db: sqlx::PgPool,
}

impl PgShipmentRepository {
    /// Wrap the supplied connection pool
    pub fn new(db: sqlx::PgPool) -> Self {
        Self { db }
    }

    async fn tracks_of(&self, shipment_id: i64) -> Result<Vec<TrackingRecord>, DbError> {
        sqlx::query_as::<_, TrackingRecord>(
            r#"SELECT
              id,
              carrier_code,
              title,
              track_number,
              created_at
            FROM
              shipment_tracks
            WHERE
              parent_id = $1
            ORDER BY
              id ASC"#,
        )
        .bind(shipment_id)
        .fetch_all(&self.db)
        .await
    }
}

#[async_trait]
impl ShipmentRepository for PgShipmentRepository {
    #[tracing::instrument(err(Debug), skip(self))]
    async fn get(&self, id: i64) -> Result<Shipment, TrackingError> {
        let row = sqlx::query_as::<_, ShipmentRow>(
            "SELECT id, order_id, store_code, items FROM shipments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(TrackingError::ShipmentNotFound(id))?;

        let tracks = self.tracks_of(id).await?;

        Ok(row.into_shipment(tracks))
    }

    #[tracing::instrument(
        err(Debug),
        skip_all,
        fields(shipment.id = shipment.id, shipment.tracks = shipment.tracks.len())
    )]
    async fn save(&self, shipment: &mut Shipment) -> Result<(), TrackingError> {
        let mut transaction = self.db.begin().await?;

        let shipment_id = match shipment.id {
            Some(id) => {
                sqlx::query("UPDATE shipments SET store_code = $2, items = $3 WHERE id = $1")
                    .bind(id)
                    .bind(shipment.store.as_str())
                    .bind(Json(&shipment.items))
                    .execute(&mut *transaction)
                    .await?;
                id
            }
            None => {
                sqlx::query_scalar::<_, i64>(
                    "INSERT INTO shipments (order_id, store_code, items) VALUES ($1, $2, $3) RETURNING id",
                )
                .bind(shipment.order_id)
                .bind(shipment.store.as_str())
                .bind(Json(&shipment.items))
                .fetch_one(&mut *transaction)
                .await?
            }
        };

        for track in shipment.tracks.iter_mut().filter(|track| track.id.is_none()) {
            let (id, created_at) = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
                r#"INSERT INTO shipment_tracks
                  (parent_id, order_id, carrier_code, title, track_number)
                VALUES
                  ($1, $2, $3, $4, $5)
                RETURNING
                  id, created_at"#,
            )
            .bind(shipment_id)
            .bind(shipment.order_id)
            .bind(&track.carrier_code)
            .bind(&track.title)
            .bind(&track.number)
            .fetch_one(&mut *transaction)
            .await?;

            track.id = Some(id);
            track.created_at = Some(created_at);
        }

        transaction.commit().await?;

        shipment.id = Some(shipment_id);
        tracing::Span::current().record("shipment.id", shipment_id);

        Ok(())
    }

    #[tracing::instrument(err(Debug), skip(self))]
    async fn remove_track(&self, shipment_id: i64, track_id: i64) -> Result<(), TrackingError> {
        let result = sqlx::query("DELETE FROM shipment_tracks WHERE id = $1 AND parent_id = $2")
            .bind(track_id)
            .bind(shipment_id)
            .execute(&self.db)
            .await?;

        match result.rows_affected() {
            0 => Err(TrackingError::TrackNotFound(track_id)),
            _ => Ok(()),
        }
    }

    #[tracing::instrument(err(Debug), skip(self))]
    async fn find_track(
        &self,
        track_id: i64,
    ) -> Result<(Shipment, TrackingRecord), TrackingError> {
        let parent_id =
            sqlx::query_scalar::<_, i64>("SELECT parent_id FROM shipment_tracks WHERE id = $1")
                .bind(track_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or(TrackingError::TrackNotFound(track_id))?;

        let shipment = self.get(parent_id).await?;
        let track = shipment
            .track(track_id)
            .cloned()
            .ok_or(TrackingError::TrackNotFound(track_id))?;

        Ok((shipment, track))
    }
}

// </editor-fold desc="// PgShipmentRepository ...">

// <editor-fold desc="// RepositoryShipmentLoader ...">

/// A [`ShipmentLoader`] that fetches existing shipments from
/// a [`ShipmentRepository`] and prepares new ones in memory
#[derive(Clone, Debug)]
pub struct RepositoryShipmentLoader {
    shipments: Arc<dyn ShipmentRepository>,
}

impl RepositoryShipmentLoader {
    /// Load shipments from the supplied repository
    pub fn new(shipments: Arc<dyn ShipmentRepository>) -> Self {
        Self { shipments }
    }

    fn prepare(request: &ShipmentLoadRequest) -> Result<Shipment, TrackingError> {
        let items = request
            .shipment
            .items
            .iter()
            .filter(|(_, qty)| **qty > 0.0)
            .map(|(id, qty)| (id.clone(), *qty))
            .collect::<BTreeMap<String, f64>>();

        if items.is_empty() {
            return Err(TrackingError::CannotInitialize);
        }

        let mut shipment = Shipment::new(request.order_id, StoreScope::default_store(), items);

        for input in request
            .tracking
            .iter()
            .filter(|input| !input.number.trim().is_empty())
        {
            shipment.add_track(TrackingRecord::from(input.clone()));
        }

        Ok(shipment)
    }
}

#[async_trait]
impl ShipmentLoader for RepositoryShipmentLoader {
    #[tracing::instrument(err(Debug), skip(self))]
    async fn load(&self, request: &ShipmentLoadRequest) -> Result<Shipment, TrackingError> {
        let Some(shipment_id) = request.shipment_id else {
            return Self::prepare(request);
        };

        let shipment = self.shipments.get(shipment_id).await?;

        if shipment.order_id != request.order_id {
            return Err(TrackingError::OrderMismatch {
                order_id: request.order_id,
                shipment_id,
            });
        }

        Ok(shipment)
    }
}

// </editor-fold desc="// RepositoryShipmentLoader ...">


#[cfg(test)]
mod db_tests {
    //! ## PostgreSQL-backed Tests
    //!
    //! Skipped unless `TEST_DB_URL` points at a reachable database

    // Standard Library Imports
    use std::collections::BTreeMap;

    // Third-Party Imports
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    // Crate-Level Imports
    use super::{ensure_schema, PgShipmentRepository};
    use crate::error::TrackingError;
    use crate::ports::ShipmentRepository;
    use crate::types::{Shipment, StoreScope, TrackingRecord};

    async fn repository() -> anyhow::Result<Option<PgShipmentRepository>> {
        let Ok(url) = std::env::var("TEST_DB_URL") else {
            tracing::warn!("TEST_DB_URL is not set, skipping");
            return Ok(None);
        };

        let db = sqlx::PgPool::connect(&url).await?;
        ensure_schema(&db).await?;

        Ok(Some(PgShipmentRepository::new(db)))
    }

    fn track(carrier_code: &str, number: &str) -> TrackingRecord {
        TrackingRecord::default()
            .with_carrier_code(carrier_code)
            .with_title(carrier_code.to_uppercase())
            .with_number(number)
    }

    fn shipment() -> Shipment {
        Shipment::new(
            10003,
            StoreScope::from("de"),
            BTreeMap::from([("41".to_string(), 2.0)]),
        )
    }

    #[rstest]
    #[test_log::test(tokio::test)]
    async fn test_save_and_get() -> anyhow::Result<()> {
        let Some(repository) = repository().await? else {
            return Ok(());
        };

        let mut stored = shipment();
        stored.add_track(track("ups", "1Z999"));
        repository.save(&mut stored).await?;

        let shipment_id = stored.id.unwrap();
        let track_id = stored.tracks[0].id.unwrap();

        assert!(stored.tracks[0].created_at.is_some());

        let loaded = repository.get(shipment_id).await?;

        assert_eq!(stored, loaded);

        let (parent, record) = repository.find_track(track_id).await?;

        assert_eq!(Some(shipment_id), parent.id);
        assert_eq!("1Z999", record.number);
        assert_eq!("de", parent.store.as_str());

        Ok(())
    }

    #[rstest]
    #[test_log::test(tokio::test)]
    async fn test_interleaved_saves_keep_every_track() -> anyhow::Result<()> {
        let Some(repository) = repository().await? else {
            return Ok(());
        };

        let mut stored = shipment();
        stored.add_track(track("ups", "1Z999"));
        repository.save(&mut stored).await?;

        let shipment_id = stored.id.unwrap();
        let mut first = repository.get(shipment_id).await?;
        let mut second = repository.get(shipment_id).await?;

        first.add_track(track("dhl", "JD0001"));
        repository.save(&mut first).await?;

        second.add_track(track("fedex", "7946"));
        repository.save(&mut second).await?;

        let numbers = repository
            .get(shipment_id)
            .await?
            .tracks
            .into_iter()
            .map(|track| track.number)
            .collect::<Vec<String>>();

        assert_eq!(vec!["1Z999", "JD0001", "7946"], numbers);

        Ok(())
    }

    #[rstest]
    #[test_log::test(tokio::test)]
    async fn test_remove_single_track() -> anyhow::Result<()> {
        let Some(repository) = repository().await? else {
            return Ok(());
        };

        let mut stored = shipment();
        stored
            .add_track(track("ups", "1Z999"))
            .add_track(track("dhl", "JD0001"));
        repository.save(&mut stored).await?;

        let shipment_id = stored.id.unwrap();
        let removed = stored.tracks[0].id.unwrap();

        repository.remove_track(shipment_id, removed).await?;

        let remaining = repository.get(shipment_id).await?.tracks;

        assert_eq!(1, remaining.len());
        assert_eq!("JD0001", remaining[0].number);
        assert!(matches!(
            repository.remove_track(shipment_id, removed).await,
            Err(TrackingError::TrackNotFound(id)) if id == removed
        ));
        assert!(matches!(
            repository.find_track(removed).await,
            Err(TrackingError::TrackNotFound(_))
        ));

        Ok(())
    }
}
