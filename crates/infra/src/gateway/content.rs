//! Brand, training-event and media-library gateways.
//!
//! CRUD goes through [`CollectionGateway`] (see `collection()`); these types
//! add the queries and workflows specific to each collection.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use aesthetica_content::{
    Brand, DEFAULT_MEDIA_FOLDER, MediaAsset, MediaFields, TrainingEvent,
};
use aesthetica_core::{CatalogEntity, DocumentId, DomainError, EventId, MediaId};

use crate::backend::CatalogBackend;
use crate::objects::{FileUpload, ObjectPath, ObjectStoreError};
use crate::store::{CREATED_AT_FIELD, Direction, Query};

use super::{CollectionGateway, GatewayError, GatewayResult, decode, to_document};

#[derive(Debug, Clone)]
pub struct BrandGateway {
    brands: CollectionGateway<Brand>,
}

impl BrandGateway {
    pub fn new(backend: Arc<CatalogBackend>) -> Self {
        Self {
            brands: CollectionGateway::new(backend),
        }
    }

    pub fn collection(&self) -> &CollectionGateway<Brand> {
        &self.brands
    }

    /// Active brands in display order.
    pub async fn get_active_brands(&self) -> GatewayResult<Vec<Brand>> {
        let query = Query::new()
            .where_eq("isActive", true)
            .order_by("order", Direction::Asc);
        self.brands
            .query(&query, "failed to fetch active brands")
            .await
    }
}

#[derive(Debug, Clone)]
pub struct EventGateway {
    events: CollectionGateway<TrainingEvent>,
}

impl EventGateway {
    pub fn new(backend: Arc<CatalogBackend>) -> Self {
        Self {
            events: CollectionGateway::new(backend),
        }
    }

    pub fn collection(&self) -> &CollectionGateway<TrainingEvent> {
        &self.events
    }

    /// Active events starting after `now`, soonest first.
    pub async fn get_upcoming_events(&self, now: DateTime<Utc>) -> GatewayResult<Vec<TrainingEvent>> {
        let active = self
            .events
            .query(
                &Query::new().where_eq("isActive", true),
                "failed to fetch upcoming events",
            )
            .await?;

        let mut upcoming: Vec<TrainingEvent> = active
            .into_iter()
            .filter(|event| event.fields.is_upcoming(now))
            .collect();
        upcoming.sort_by_key(|event| event.fields.starts_at);
        Ok(upcoming)
    }

    /// Take one seat and return the updated event.
    ///
    /// The capacity check and the increment are separate store calls, so two
    /// concurrent registrations for the last seat can both succeed.
    pub async fn register_attendee(&self, id: &EventId, now: DateTime<Utc>) -> GatewayResult<TrainingEvent> {
        const FAILED: &str = "failed to register attendee";
        let event = self.events.get(id).await?.ok_or(DomainError::NotFound)?;
        event.fields.check_registration(now)?;

        let store = self.events.store()?;
        let doc_id: DocumentId = id.clone().into();
        let updated = store
            .increment(TrainingEvent::COLLECTION, &doc_id, "registeredCount", 1)
            .await
            .map_err(|e| GatewayError::operation(FAILED, e))?;
        let updated: TrainingEvent = decode(updated).map_err(|e| GatewayError::operation(FAILED, e))?;

        info!(
            event_id = %id,
            registered = updated.fields.registered_count,
            "attendee registered"
        );
        Ok(updated)
    }
}

#[derive(Debug, Clone)]
pub struct MediaGateway {
    media: CollectionGateway<MediaAsset>,
}

impl MediaGateway {
    pub fn new(backend: Arc<CatalogBackend>) -> Self {
        Self {
            media: CollectionGateway::new(backend),
        }
    }

    pub fn collection(&self) -> &CollectionGateway<MediaAsset> {
        &self.media
    }

    /// Assets in one folder, newest first.
    pub async fn get_media_by_folder(&self, folder: &str) -> GatewayResult<Vec<MediaAsset>> {
        let query = Query::new()
            .where_eq("folder", folder)
            .order_by(CREATED_AT_FIELD, Direction::Desc);
        self.media.query(&query, "failed to fetch media").await
    }

    /// Store the file under `media/<folder>/<file>` and record it in the
    /// library. If the record cannot be written the uploaded object is
    /// removed again.
    pub async fn upload_media(
        &self,
        upload: FileUpload,
        folder: Option<&str>,
        alt: Option<String>,
    ) -> GatewayResult<MediaAsset> {
        const FAILED: &str = "failed to upload media";
        let objects = self.media.backend().objects()?;
        let store = self.media.store()?;

        let folder = folder
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_MEDIA_FOLDER);
        let path = ObjectPath::media(folder, &upload.file_name)
            .map_err(|e| GatewayError::operation(FAILED, e))?;
        let name = upload.file_name.clone();

        let stored = objects
            .put(&path, upload)
            .await
            .map_err(|e| GatewayError::operation(FAILED, e))?;

        let fields = MediaFields {
            name,
            url: stored.url.clone(),
            path: stored.path.to_string(),
            content_type: stored.content_type.clone(),
            size: stored.size,
            alt: alt.unwrap_or_default(),
            folder: folder.to_string(),
        };

        let record = match to_document(&fields) {
            Ok(body) => store.insert(MediaAsset::COLLECTION, body).await,
            Err(e) => Err(e),
        };
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                if let Err(cleanup) = objects.delete(&stored.path).await {
                    warn!(path = %stored.path, error = %cleanup, "orphaned media object");
                }
                return Err(GatewayError::operation(FAILED, e));
            }
        };

        let asset: MediaAsset = decode(record).map_err(|e| GatewayError::operation(FAILED, e))?;
        info!(media_id = %asset.id, path = %asset.fields.path, "media uploaded");
        Ok(asset)
    }

    /// Remove the stored object and the library record.
    ///
    /// An object that is already gone is not an error; the record is still
    /// deleted.
    pub async fn delete_media(&self, id: &MediaId) -> GatewayResult<()> {
        const FAILED: &str = "failed to delete media";
        let objects = self.media.backend().objects()?;
        let asset = self.media.get(id).await?.ok_or(DomainError::NotFound)?;

        match ObjectPath::parse(&asset.fields.path) {
            Ok(path) => match objects.delete(&path).await {
                Ok(()) | Err(ObjectStoreError::NotFound(_)) => {}
                Err(e) => return Err(GatewayError::operation(FAILED, e)),
            },
            Err(e) => warn!(media_id = %id, error = %e, "media record has no valid object path"),
        }

        self.media.delete(id).await
    }
}
