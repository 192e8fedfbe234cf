//! [`Customer`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{customer, Customer},
    infra::{
        database::{self, in_memory::Store, InMemory},
        Database,
    },
};

impl<C> Database<Select<By<Option<Customer>, customer::Id>>> for InMemory<C>
where
    C: Store,
{
    type Ok = Option<Customer>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Customer>, customer::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.view(|state| state.customers.get(&id).cloned()).await)
    }
}

impl<C> Database<Insert<customer::New>> for InMemory<C>
where
    C: Store,
{
    type Ok = Customer;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<customer::New>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .apply(|state| {
                let customer = new.with_id(state.next_customer_id());
                _ = state.customers.insert(customer.id, customer.clone());
                customer
            })
            .await)
    }
}
