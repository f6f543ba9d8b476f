use async_trait::async_trait;
use checkin_core::Identifier;

use crate::types::{CheckinRecord, RejectionRecord, StoreError};

mod file;
mod memory;
mod pg;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use pg::PgCheckinStore;

/// Persistence for check-in and rejection records.
///
/// Both collections are keyed by identifier. The insert methods are
/// insert-or-fail: they must be atomic with respect to concurrent callers, and
/// they report whether a new record was created. This is the only concurrency
/// control the registration service relies on.
#[async_trait]
pub trait CheckinStore: Send + Sync {
    /// Inserts a check-in record. Returns `false` if one already existed.
    async fn insert_checkin(&self, record: &CheckinRecord) -> Result<bool, StoreError>;

    /// Inserts a rejection record. Returns `false` if one already existed;
    /// the existing record is left untouched.
    async fn insert_rejection(&self, record: &RejectionRecord) -> Result<bool, StoreError>;

    /// Looks up the rejection record for `identifier`.
    async fn find_rejection(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<RejectionRecord>, StoreError>;

    /// Returns all check-in records ordered by identifier, ascending.
    async fn list_checkins(&self) -> Result<Vec<CheckinRecord>, StoreError>;

    /// Deletes every check-in record and returns how many were removed.
    /// Rejection records are not touched.
    async fn clear_checkins(&self) -> Result<u64, StoreError>;
}
