//! Whole-table invalidation driven by the store's change feed.
//!
//! Notifications carry no row data. A consumer that hears about a change to
//! its table simply reloads everything, so missed or duplicated events can
//! only cause an extra fetch, never a wrong result.

use std::future::Future;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{CatalogBackend, Table, TableChange};

/// Keeps a change listener alive. Dropping it stops the listener.
#[derive(Debug)]
#[must_use = "dropping a Subscription immediately cancels it"]
pub struct Subscription {
    table: Table,
    handle: JoinHandle<()>,
}

impl Subscription {
    #[must_use]
    pub const fn table(&self) -> Table {
        self.table
    }

    /// False once the listener has stopped (feed closed or cancelled).
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop listening. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
        debug!(table = %self.table, "Realtime subscription released");
    }
}

/// Call `on_change` every time `table` changes in `backend`.
///
/// Runs on a spawned task until the returned [`Subscription`] is dropped or
/// the feed closes. Changes that pile up while `on_change` runs are
/// coalesced into a single follow-up call.
pub fn subscribe_to_table_changes<B, F, Fut>(backend: &B, table: Table, on_change: F) -> Subscription
where
    B: CatalogBackend,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let mut changes = backend.changes();
    let handle = tokio::spawn(async move {
        debug!(%table, "Realtime subscription started");
        loop {
            match changes.recv().await {
                Ok(TableChange { table: changed }) if changed == table => {}
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    // Something may have been missed; reload to be safe
                    warn!(%table, skipped, "Change feed lagged");
                }
                Err(RecvError::Closed) => {
                    debug!(%table, "Change feed closed");
                    break;
                }
            }

            drain_pending(&mut changes);
            debug!(%table, "Table changed, reloading");
            on_change().await;
        }
    });

    Subscription { table, handle }
}

/// Discard queued notifications; one reload covers all of them.
fn drain_pending(changes: &mut broadcast::Receiver<TableChange>) {
    loop {
        match changes.try_recv() {
            Ok(_) | Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}
