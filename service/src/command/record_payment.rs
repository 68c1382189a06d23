//! [`Command`] for recording a [`Bill`] payment.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::{
    bill::{PaymentMethod, Remarks, TransactionId},
    Member,
};
use crate::{
    domain::{
        bill::{self, Payment},
        Access, Bill,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recording a [`Bill`] payment.
///
/// Only [`bill::Status::Unpaid`] and [`bill::Status::Overdue`] [`Bill`]s can
/// be paid. Residents may pay the [`Bill`]s of their own [`Member`] only.
#[derive(Clone, Debug)]
pub struct RecordPayment {
    /// ID of the [`Bill`] being paid.
    pub bill_id: bill::Id,

    /// [`Access`] of the payer.
    pub by: Access,

    /// [`PaymentMethod`] used.
    pub method: bill::PaymentMethod,

    /// [`TransactionId`] of the payment.
    pub transaction_id: bill::TransactionId,

    /// Optional [`Remarks`] of the payment.
    pub remarks: Option<bill::Remarks>,
}

impl<Db> Command<RecordPayment> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Bill, bill::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Bill>, bill::Id>>,
            Ok = Option<Bill>,
            Err = Traced<database::Error>,
        > + Database<Update<Bill>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Bill;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RecordPayment) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RecordPayment {
            bill_id,
            by,
            method,
            transaction_id,
            remarks,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid racing with other payments and the overdue sweep.
        tx.execute(Lock(By::new(bill_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut bill = tx
            .execute(Select(By::new(bill_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BillNotFound(bill_id))
            .map_err(tracerr::wrap!())?;

        if !by.allows(bill.member_id) {
            return Err(tracerr::new!(E::NotBillOwner(bill_id)));
        }

        bill.record_payment(Payment {
            paid_on: Date::today().coerce(),
            method,
            transaction_id,
            remarks,
        })
        .map_err(|status| {
            tracerr::new!(E::BillNotPayable { bill_id, status })
        })?;

        tx.execute(Update(bill.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Bill(number: {})` is paid", bill.number);

        Ok(bill)
    }
}

/// Error of [`RecordPayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Bill`] with the provided ID does not exist.
    #[display("`Bill(id: {_0})` does not exist")]
    #[from(ignore)]
    BillNotFound(#[error(not(source))] bill::Id),

    /// [`Bill`] is in a [`bill::Status`] not accepting payments.
    #[display("`Bill(id: {bill_id})` is {status} and cannot be paid")]
    #[from(ignore)]
    BillNotPayable {
        /// ID of the [`Bill`].
        #[error(not(source))]
        bill_id: bill::Id,

        /// Current [`bill::Status`] of the [`Bill`].
        #[error(not(source))]
        status: bill::Status,
    },

    /// [`Bill`] belongs to another [`Member`].
    #[display("`Bill(id: {_0})` belongs to another `Member`")]
    #[from(ignore)]
    NotBillOwner(#[error(not(source))] bill::Id),
}
