use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aesthetica_core::{CatalogEntity, DomainError, DomainResult, EventId, Timestamps};
use aesthetica_products::CertificationLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFields {
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub starts_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: String,
    /// Seats available; `None` means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub registered_count: u32,
    #[serde(default)]
    pub price: f64,
    /// Level granted on completion.
    #[serde(default)]
    pub certification_level: CertificationLevel,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl EventFields {
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.starts_at > now
    }

    pub fn seats_left(&self) -> Option<u32> {
        self.capacity
            .map(|cap| cap.saturating_sub(self.registered_count))
    }

    /// Check that one more attendee can register at `now`.
    pub fn check_registration(&self, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.is_active {
            return Err(DomainError::validation("event is not open for registration"));
        }
        if self.starts_at <= now {
            return Err(DomainError::validation("event has already started"));
        }
        if self.seats_left() == Some(0) {
            return Err(DomainError::conflict("event is full"));
        }
        Ok(())
    }
}

/// A training or certification event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingEvent {
    pub id: EventId,
    #[serde(flatten)]
    pub fields: EventFields,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl CatalogEntity for TrainingEvent {
    type Id = EventId;
    type Fields = EventFields;
    type Patch = EventPatch;

    const COLLECTION: &'static str = "events";
    const LABEL: &'static str = "event";

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn slug(&self) -> Option<&str> {
        Some(&self.fields.slug)
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certification_level: Option<CertificationLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
