//! Network actor - runs listing API calls in the Tokio async runtime

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::messages::{NetworkCommand, NetworkResponse};
use crate::source::ListingSource;

/// Network actor that turns commands into calls on a listing source
pub struct NetworkActor {
    source: Arc<dyn ListingSource>,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
}

impl NetworkActor {
    pub fn new(
        source: Arc<dyn ListingSource>,
        response_tx: mpsc::UnboundedSender<NetworkResponse>,
    ) -> Self {
        NetworkActor {
            source,
            response_tx,
            active_requests: JoinSet::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                // Handle incoming commands
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Shutdown) | None => {
                            // In-flight results have nowhere to go
                            self.active_requests.abort_all();
                            break;
                        }
                        Some(cmd) => self.spawn(cmd),
                    }
                }

                // Clean up completed tasks
                Some(_result) = self.active_requests.join_next() => {}
            }
        }
    }

    fn spawn(&mut self, cmd: NetworkCommand) {
        let source = Arc::clone(&self.source);
        let response_tx = self.response_tx.clone();

        self.active_requests.spawn(async move {
            let response = match cmd {
                NetworkCommand::FetchPage { ticket } => {
                    tracing::info!(page = ticket.page(), "Fetching turfs");
                    let result = source.fetch_page(ticket.page()).await;
                    NetworkResponse::PageFetched { ticket, result }
                }
                NetworkCommand::CreateTurf { id, draft } => {
                    tracing::info!(id, name = %draft.name, has_image = draft.image_path.is_some(), "Creating turf");
                    let result = source.create_item(&draft).await;
                    NetworkResponse::Created { id, result }
                }
                NetworkCommand::UpdateTurf { id, turf_id, patch } => {
                    tracing::info!(id, turf_id, "Updating turf");
                    let result = source.update_item(turf_id, &patch).await;
                    NetworkResponse::Updated { id, turf_id, result }
                }
                NetworkCommand::DeleteTurf { id, turf_id } => {
                    tracing::info!(id, turf_id, "Deleting turf");
                    let result = source.delete_item(turf_id).await;
                    NetworkResponse::Deleted { id, turf_id, result }
                }
                NetworkCommand::Shutdown => return,
            };

            if response.is_error() {
                tracing::warn!(?response, "Request failed");
            }
            let _ = response_tx.send(response);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{sample_turf, Turf, TurfDraft, TurfId, TurfPatch};
    use crate::store::{ListingError, ListingStore};
    use async_trait::async_trait;

    struct StaticSource;

    #[async_trait]
    impl ListingSource for StaticSource {
        async fn fetch_page(&self, page: u32) -> Result<Vec<Turf>, ListingError> {
            Ok(if page == 1 { vec![sample_turf(1, 300.0)] } else { vec![] })
        }

        async fn create_item(&self, _draft: &TurfDraft) -> Result<Turf, ListingError> {
            Ok(sample_turf(5, 100.0))
        }

        async fn update_item(&self, id: TurfId, _patch: &TurfPatch) -> Result<Turf, ListingError> {
            Err(ListingError::NotFound(id))
        }

        async fn delete_item(&self, _id: TurfId) -> Result<(), ListingError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_commands_round_trip_through_source() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(NetworkActor::new(Arc::new(StaticSource), resp_tx).run(cmd_rx));

        let ticket = ListingStore::new().begin_fetch().unwrap();
        cmd_tx.send(NetworkCommand::FetchPage { ticket }).unwrap();
        match resp_rx.recv().await.unwrap() {
            NetworkResponse::PageFetched { ticket: got, result } => {
                assert_eq!(got, ticket);
                assert_eq!(result.unwrap().len(), 1);
            }
            other => panic!("unexpected response {:?}", other),
        }

        cmd_tx
            .send(NetworkCommand::UpdateTurf {
                id: 3,
                turf_id: 8,
                patch: TurfPatch::default(),
            })
            .unwrap();
        match resp_rx.recv().await.unwrap() {
            NetworkResponse::Updated { id, result, .. } => {
                assert_eq!(id, 3);
                assert_eq!(result, Err(ListingError::NotFound(8)));
            }
            other => panic!("unexpected response {:?}", other),
        }

        cmd_tx.send(NetworkCommand::Shutdown).unwrap();
        handle.await.unwrap();
    }
}
