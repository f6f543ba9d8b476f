use std::sync::Arc;

use chrono::Utc;
use checkin_core::Identifier;

use crate::guest_list::GuestList;
use crate::store::CheckinStore;
use crate::types::{CheckinOutcome, CheckinRecord, RegistrationError, RejectionRecord};

/// The authoritative check-in registry.
///
/// Stateless apart from its store handle; cheap to clone into every worker.
/// Credential checks happen in front of it, in the HTTP middleware.
#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn CheckinStore>,
    guest_list: Option<Arc<GuestList>>,
}

impl RegistrationService {
    /// Creates a new instance of `RegistrationService` over `store`, with an optional guest list.
    pub fn new(store: Arc<dyn CheckinStore>, guest_list: Option<GuestList>) -> Self {
        Self {
            store,
            guest_list: guest_list.map(Arc::new),
        }
    }

    /// Classifies and, if new, records a check-in.
    ///
    /// Checks run in this order: format, guest list, rejection, existing
    /// check-in. The final step is a single insert-or-fail, so concurrent
    /// callers for the same fresh identifier get exactly one `Accepted`.
    pub async fn check_in(&self, raw_id: &str) -> Result<CheckinOutcome, RegistrationError> {
        let identifier = Identifier::parse(raw_id)?;

        if let Some(guest_list) = &self.guest_list {
            if !guest_list.contains(&identifier) {
                log::info!("❔ ID '{}' is not on the guest list", identifier);
                return Ok(CheckinOutcome::Unknown);
            }
        }

        // Rejection wins over an existing check-in.
        if let Some(rejection) = self.store.find_rejection(&identifier).await? {
            log::warn!("🚫 Rejected ID '{}' attempted check-in", identifier);
            return Ok(CheckinOutcome::Rejected {
                reason: rejection.reason,
            });
        }

        let record = CheckinRecord {
            identifier,
            registered_at: Utc::now(),
        };
        if self.store.insert_checkin(&record).await? {
            log::info!("✅ ID '{}' checked in", record.identifier);
            Ok(CheckinOutcome::Accepted)
        } else {
            log::info!("⚠️ ID '{}' was already checked in", record.identifier);
            Ok(CheckinOutcome::AlreadyRegistered)
        }
    }

    /// Returns every checked-in identifier, ascending.
    pub async fn list_registered(&self) -> Result<Vec<Identifier>, RegistrationError> {
        let records = self.store.list_checkins().await?;
        let mut ids: Vec<Identifier> = records.into_iter().map(|r| r.identifier).collect();
        // Backends already order, but not necessarily by byte value.
        ids.sort();
        Ok(ids)
    }

    /// Deletes every check-in record. Rejection records are kept.
    pub async fn clear_all(&self) -> Result<u64, RegistrationError> {
        let removed = self.store.clear_checkins().await?;
        log::warn!("🧹 Cleared {} check-in records", removed);
        Ok(removed)
    }

    /// Records a rejection for `raw_id`, whether or not it has checked in.
    ///
    /// Fails with [`RegistrationError::AlreadyRejected`] if a rejection already
    /// exists; the stored reason is never overwritten.
    pub async fn reject(
        &self,
        raw_id: &str,
        reason: &str,
        rejected_by: Option<&str>,
    ) -> Result<RejectionRecord, RegistrationError> {
        let identifier = Identifier::parse(raw_id)?;

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(RegistrationError::Validation(
                "A rejection reason is required".to_string(),
            ));
        }

        let record = RejectionRecord {
            identifier,
            reason: reason.to_string(),
            rejected_by: rejected_by
                .map(str::trim)
                .filter(|by| !by.is_empty())
                .map(str::to_string),
            rejected_at: Utc::now(),
        };

        if !self.store.insert_rejection(&record).await? {
            return Err(RegistrationError::AlreadyRejected(record.identifier));
        }

        log::warn!(
            "🚫 ID '{}' rejected by {}: {}",
            record.identifier,
            record.rejected_by.as_deref().unwrap_or("unknown"),
            record.reason
        );
        Ok(record)
    }
}
