//! Network messages - communication between App and Network layers

use crate::models::{Turf, TurfDraft, TurfId, TurfPatch};
use crate::store::{ListingError, PageTicket};

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Fetch the page reserved by `ticket`
    FetchPage { ticket: PageTicket },
    CreateTurf { id: u64, draft: TurfDraft },
    UpdateTurf {
        id: u64,
        turf_id: TurfId,
        patch: TurfPatch,
    },
    DeleteTurf { id: u64, turf_id: TurfId },
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    PageFetched {
        ticket: PageTicket,
        result: Result<Vec<Turf>, ListingError>,
    },
    Created {
        id: u64,
        result: Result<Turf, ListingError>,
    },
    Updated {
        id: u64,
        turf_id: TurfId,
        result: Result<Turf, ListingError>,
    },
    Deleted {
        id: u64,
        turf_id: TurfId,
        result: Result<(), ListingError>,
    },
}

impl NetworkResponse {
    /// Whether the backend call behind this response failed
    pub fn is_error(&self) -> bool {
        match self {
            NetworkResponse::PageFetched { result, .. } => result.is_err(),
            NetworkResponse::Created { result, .. } => result.is_err(),
            NetworkResponse::Updated { result, .. } => result.is_err(),
            NetworkResponse::Deleted { result, .. } => result.is_err(),
        }
    }
}
