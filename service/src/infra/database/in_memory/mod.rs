//! In-memory [`Database`] implementation.

pub mod client;
mod impls;
pub mod store;

use std::fmt;

use derive_more::Deref;

#[cfg(doc)]
use crate::infra::Database;

pub use self::{
    client::{NonTx, Tx},
    store::Store,
};

/// In-memory [`Database`] client.
///
/// All the clients cloned out of the same [`InMemory`] instance share one
/// [`store::State`], so a [`Tx`] committed through one of them is visible to
/// all the others.
#[derive(Clone, Copy, Debug, Default, Deref)]
pub struct InMemory<T = NonTx>(T);

impl InMemory {
    /// Creates a new empty [`InMemory`] client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// In-memory database [`Error`].
///
/// No operation of an [`InMemory`] database can fail, so no value of this
/// type can be constructed.
#[derive(Clone, Copy, Debug)]
pub enum Error {}

impl fmt::Display for Error {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl std::error::Error for Error {}
