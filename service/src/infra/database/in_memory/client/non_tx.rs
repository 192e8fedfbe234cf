//! [`NonTx`] client definitions.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::infra::database::in_memory::store::{State, Store};

/// Non-transactional in-memory database client.
///
/// Every operation locks the live [`State`] just for its own duration.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// Live [`State`] shared by all the clients of the same database.
    pub(crate) state: Arc<Mutex<State>>,
}

impl Store for NonTx {
    async fn view<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        f(&*self.state.lock().await)
    }

    async fn apply<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut *self.state.lock().await)
    }
}
