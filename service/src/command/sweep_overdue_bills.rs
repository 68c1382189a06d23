//! [`Command`] for marking overdue [`Bill`]s.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Date,
};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{bill, Bill},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for marking [`bill::Status::Unpaid`] [`Bill`]s past their due
/// date as [`bill::Status::Overdue`], charging the late fee of the
/// [`Tariff`] once.
///
/// [`Tariff`]: crate::domain::Tariff
#[derive(Clone, Copy, Debug)]
pub struct SweepOverdueBills;

impl<Db> Command<SweepOverdueBills> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Vec<Bill>, read::bill::list::Filter>>,
            Ok = Vec<Bill>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Bill, bill::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Bill>, bill::Id>>,
            Ok = Option<Bill>,
            Err = Traced<database::Error>,
        > + Database<Update<Bill>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    /// Number of [`Bill`]s that became overdue.
    type Ok = usize;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        _: SweepOverdueBills,
    ) -> Result<Self::Ok, Self::Err> {
        let today = Date::today();
        let late_fee = self.config().tariff.late_fee;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;

        let unpaid = tx
            .execute(Select(By::new(read::bill::list::Filter {
                member_id: None,
                status: Some(bill::Status::Unpaid),
            })))
            .await
            .map_err(tracerr::wrap!())?;

        let mut swept = 0;
        for candidate in unpaid {
            if today <= candidate.due_date.coerce() {
                continue;
            }

            // Re-read under lock, as the bill may have been paid meanwhile.
            tx.execute(Lock(By::new(candidate.id)))
                .await
                .map_err(tracerr::wrap!())
                .map(drop)?;
            let Some(mut bill) = tx
                .execute(Select(By::new(candidate.id)))
                .await
                .map_err(tracerr::wrap!())?
            else {
                continue;
            };

            if bill.mark_overdue(today, late_fee) {
                tx.execute(Update(bill))
                    .await
                    .map_err(tracerr::wrap!())
                    .map(drop)?;
                swept += 1;
            }
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        log::debug!("{swept} bills marked as overdue");

        Ok(swept)
    }
}

/// Error of [`SweepOverdueBills`] [`Command`] execution.
pub type ExecutionError = database::Error;

#[cfg(test)]
mod spec {
    use common::{Date, Money};

    use crate::{
        domain::bill::{self, Status},
        infra::Memory,
        testing, Command as _,
    };

    use super::SweepOverdueBills;

    #[tokio::test]
    async fn marks_bills_past_due_date() {
        let member = testing::member("202");
        let db = Memory::with_members([member.clone()]);

        let mut late = testing::bill(&member, 1, 2024);
        late.due_date = Date::today().previous_day().unwrap().coerce();
        let mut early = testing::bill(&member, 2, 2024);
        early.due_date = Date::today().next_day().unwrap().coerce();
        let mut today = testing::bill(&member, 3, 2024);
        today.due_date = Date::today().coerce();
        for bill in [late.clone(), early.clone(), today.clone()] {
            db.put_bill(bill);
        }
        let svc = testing::service(db);

        assert_eq!(svc.execute(SweepOverdueBills).await.unwrap(), 1);
        assert_eq!(svc.execute(SweepOverdueBills).await.unwrap(), 0);

        let bills = svc.database().bills();
        let status_of =
            |id: bill::Id| bills.iter().find(|b| b.id == id).unwrap().status;
        assert_eq!(status_of(late.id), Status::Overdue);
        assert_eq!(status_of(early.id), Status::Unpaid);
        assert_eq!(status_of(today.id), Status::Unpaid);

        let late = bills.iter().find(|b| b.id == late.id).unwrap();
        assert_eq!(late.charges.late_fee, Money::from_minor(10_000));
        assert_eq!(late.total, Money::from_minor(180_000));
    }

    #[tokio::test]
    async fn leaves_paid_bills_alone() {
        let member = testing::member("101");
        let db = Memory::with_members([member.clone()]);
        let mut bill = testing::bill(&member, 1, 2024);
        bill.status = Status::Paid;
        bill.due_date = Date::today().previous_day().unwrap().coerce();
        db.put_bill(bill);
        let svc = testing::service(db);

        assert_eq!(svc.execute(SweepOverdueBills).await.unwrap(), 0);
        assert_eq!(svc.database().bills()[0].status, Status::Paid);
    }
}
