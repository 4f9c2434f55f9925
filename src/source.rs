//! Remote listing source - the collaborator the store reconciles against

use async_trait::async_trait;

use crate::models::{Turf, TurfDraft, TurfId, TurfPatch};
use crate::store::ListingError;

/// Backend operations on turf listings.
///
/// Implementations report transport and decode problems as
/// [`ListingError::FetchFailed`] and missing listings as [`ListingError::NotFound`].
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch one page of listings. An empty vector means there are no more pages.
    async fn fetch_page(&self, page: u32) -> Result<Vec<Turf>, ListingError>;

    async fn create_item(&self, draft: &TurfDraft) -> Result<Turf, ListingError>;

    /// Returns the listing as stored after the update
    async fn update_item(&self, id: TurfId, patch: &TurfPatch) -> Result<Turf, ListingError>;

    async fn delete_item(&self, id: TurfId) -> Result<(), ListingError>;
}
