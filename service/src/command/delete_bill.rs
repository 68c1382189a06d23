//! [`Command`] for deleting a [`Bill`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{bill, Bill},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Bill`].
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteBill {
    /// ID of the [`Bill`] to delete.
    pub bill_id: bill::Id,
}

impl<Db> Command<DeleteBill> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Bill, bill::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Bill>, bill::Id>>,
            Ok = Option<Bill>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Bill, bill::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    /// Deleted [`Bill`].
    type Ok = Bill;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteBill) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteBill { bill_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(bill_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let bill = tx
            .execute(Select(By::new(bill_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BillNotFound(bill_id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Delete(By::new(bill_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Bill(number: {})` is deleted", bill.number);

        Ok(bill)
    }
}

/// Error of [`DeleteBill`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Bill`] with the provided ID does not exist.
    #[display("`Bill(id: {_0})` does not exist")]
    #[from(ignore)]
    BillNotFound(#[error(not(source))] bill::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::bill,
        infra::Memory,
        testing, Command as _,
    };

    use super::{DeleteBill, ExecutionError};

    #[tokio::test]
    async fn deletes_existing_bill() {
        let member = testing::member("101");
        let db = Memory::with_members([member.clone()]);
        let bill = testing::bill(&member, 1, 2024);
        db.put_bill(bill.clone());
        let svc = testing::service(db);

        let deleted = svc.execute(DeleteBill::from(bill.id)).await.unwrap();

        assert_eq!(deleted.id, bill.id);
        assert!(svc.database().bills().is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_bill() {
        let svc = testing::service(Memory::default());
        let bill_id = bill::Id::new();

        let err = svc.execute(DeleteBill { bill_id }).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::BillNotFound(id) if *id == bill_id,
        ));
    }
}
