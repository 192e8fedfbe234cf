//! [`Tx`] client definitions.

use std::sync::Arc;

use tokio::sync::{
    Mutex, OwnedMutexGuard, RwLock, RwLockMappedWriteGuard, RwLockWriteGuard,
};

use crate::infra::database::in_memory::store::{State, Store};

use super::NonTx;

/// Transactional in-memory database client.
///
/// The first operation locks the live [`State`] and clones it into a scratch
/// copy all the following operations work upon, so the transaction holds the
/// whole database exclusively until it's committed or dropped.
#[derive(Clone, Debug)]
pub struct Tx {
    /// Live [`State`] to lock once the transaction starts.
    state: Arc<Mutex<State>>,

    /// [`Changes`] accumulated by this transaction, if it has started.
    changes: Arc<RwLock<Option<Changes>>>,
}

/// Uncommitted changes of a started [`Tx`] client.
#[derive(Debug)]
struct Changes {
    /// Guard keeping the live [`State`] locked for the whole transaction.
    guard: OwnedMutexGuard<State>,

    /// Scratch copy of the [`State`] the transaction works upon.
    scratch: State,
}

impl Tx {
    /// Creates a new [`Tx`] client from the provided [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(client: NonTx) -> Self {
        Self {
            state: client.state,
            changes: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the [`Changes`] of this [`Tx`] client, starting the
    /// transaction if it hasn't started yet.
    async fn changes(&self) -> RwLockMappedWriteGuard<'_, Changes> {
        let mut changes = self.changes.write().await;
        if changes.is_none() {
            let guard = Arc::clone(&self.state).lock_owned().await;
            let scratch = (*guard).clone();
            *changes = Some(Changes { guard, scratch });
        }

        RwLockWriteGuard::map(changes, |c| {
            c.as_mut().expect("initialized above")
        })
    }

    /// Commits this [`Tx`] client, publishing its changes to the live
    /// [`State`].
    ///
    /// Dropping an uncommitted [`Tx`] client rolls the transaction back,
    /// leaving the live [`State`] untouched.
    pub async fn commit(&self) {
        // Without a started transaction there is nothing to commit.
        if let Some(Changes { mut guard, scratch }) =
            self.changes.write().await.take()
        {
            *guard = scratch;
        }
    }
}

impl Store for Tx {
    async fn view<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        f(&self.changes().await.scratch)
    }

    async fn apply<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.changes().await.scratch)
    }
}
