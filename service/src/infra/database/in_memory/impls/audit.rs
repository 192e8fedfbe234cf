//! [`audit::Entry`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::audit,
    infra::{
        database::{self, in_memory::Store, InMemory},
        Database,
    },
};

impl<C> Database<Select<By<Vec<audit::Entry>, audit::Subject>>> for InMemory<C>
where
    C: Store,
{
    type Ok = Vec<audit::Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<audit::Entry>, audit::Subject>>,
    ) -> Result<Self::Ok, Self::Err> {
        let subject = by.into_inner();
        Ok(self
            .view(|state| {
                state
                    .audit_log
                    .iter()
                    .filter(|e| e.subject == subject)
                    .cloned()
                    .collect()
            })
            .await)
    }
}

impl<C> Database<Insert<audit::New>> for InMemory<C>
where
    C: Store,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<audit::New>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .apply(|state| {
                let entry = new.with_id(state.next_audit_id());
                state.audit_log.push(entry);
            })
            .await)
    }
}
