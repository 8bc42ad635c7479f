use std::sync::Arc;

use tokio::sync::mpsc;

use crate::feed::{FeedError, TicketFeed};
use crate::push::{PushError, TicketPush};
use crate::ticket::Ticket;

#[derive(Debug, thiserror::Error)]
pub enum LiveError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Push(#[from] PushError),
}

/// Keeps a user's ticket view fresh: one snapshot up front, then a full
/// refetch on every push notification. No incremental merging — each push
/// replaces the whole view with backend truth, so ordering of notifications
/// does not matter.
pub struct LiveTickets {
    feed: Arc<TicketFeed>,
    push: Arc<dyn TicketPush>,
}

impl LiveTickets {
    pub fn new(feed: Arc<TicketFeed>, push: Arc<dyn TicketPush>) -> Self {
        Self { feed, push }
    }

    /// Runs until the snapshot receiver is dropped. A refresh that fails is
    /// logged and skipped; the previous snapshot simply stays current.
    pub async fn run(
        &self,
        user_id: i64,
        snapshots: mpsc::Sender<Vec<Ticket>>,
    ) -> Result<(), LiveError> {
        let (notify_tx, mut notify_rx) = mpsc::channel(8);
        let handle = self.push.subscribe(user_id, notify_tx).await?;

        let initial = self.feed.refresh(user_id).await?;
        if snapshots.send(initial).await.is_err() {
            return Ok(());
        }

        while notify_rx.recv().await.is_some() {
            match self.feed.refresh(user_id).await {
                Ok(tickets) => {
                    if snapshots.send(tickets).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Ticket refresh failed, keeping stale view: {}", e);
                }
            }
        }

        handle.stop();
        Ok(())
    }
}
