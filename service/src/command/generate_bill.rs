//! [`Command`] for generating a [`Bill`] of a single [`Member`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{bill::Period, member, Bill, Member},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for generating a [`Bill`] of a single [`Member`].
#[derive(Clone, Copy, Debug)]
pub struct GenerateBill {
    /// ID of the [`Member`] to bill.
    pub member_id: member::Id,

    /// [`Period`] to bill for.
    pub period: Period,
}

impl<Db> Command<GenerateBill> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Member, member::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Member>, member::Id>>,
            Ok = Option<Member>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Bill>, (member::Id, Period)>>,
            Ok = Option<Bill>,
            Err = Traced<database::Error>,
        > + Database<Insert<Bill>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Bill;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: GenerateBill) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let GenerateBill { member_id, period } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent billing of the same `Member`.
        tx.execute(Lock(By::new(member_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let member = tx
            .execute(Select(By::new(member_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::MemberNotFound(member_id))
            .map_err(tracerr::wrap!())?;

        let existing = tx
            .execute(Select(By::new((member_id, period))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::DuplicateBill { member_id, period }));
        }

        let bill = Bill::generate(&member, period, &self.config().tariff);
        insert(&tx, bill.clone()).await.map_err(tracerr::wrap!())?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::debug!("generated `Bill(number: {})` for {period}", bill.number);

        Ok(bill)
    }
}

/// Inserts the provided [`Bill`], reporting a unique period violation as
/// [`ExecutionError::DuplicateBill`].
pub(super) async fn insert<Db>(
    db: &Db,
    bill: Bill,
) -> Result<(), Traced<ExecutionError>>
where
    Db: Database<Insert<Bill>, Err = Traced<database::Error>>,
{
    let (member_id, period) = (bill.member_id, bill.period);
    match db.execute(Insert(bill)).await {
        Ok(_) => Ok(()),
        Err(e)
            if e.as_ref()
                .is_unique_violation(Some(database::BILL_PERIOD_CONSTRAINT)) =>
        {
            Err(tracerr::new!(ExecutionError::DuplicateBill {
                member_id,
                period,
            }))
        }
        Err(e) => Err(e).map_err(tracerr::map_from_and_wrap!()),
    }
}

/// Error of [`GenerateBill`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Bill`] for the [`Period`] is already generated.
    #[display("`Member(id: {member_id})` is already billed for {period}")]
    #[from(ignore)]
    DuplicateBill {
        /// ID of the billed [`Member`].
        #[error(not(source))]
        member_id: member::Id,

        /// Already billed [`Period`].
        #[error(not(source))]
        period: Period,
    },

    /// [`Member`] with the provided ID does not exist.
    #[display("`Member(id: {_0})` does not exist")]
    #[from(ignore)]
    MemberNotFound(#[error(not(source))] member::Id),
}

#[cfg(test)]
mod spec {
    use common::Money;

    use crate::{
        domain::{
            bill::{Period, Status},
            Bill, Tariff,
        },
        infra::Memory,
        testing, Command as _,
    };

    use super::{ExecutionError, GenerateBill};

    #[tokio::test]
    async fn generates_bill_for_parking_flat() {
        let member = testing::member("101");
        let db = Memory::with_members([member.clone()]);
        let svc = testing::service(db.clone());

        let bill = svc
            .execute(GenerateBill {
                member_id: member.id,
                period: Period::new(1, 2024).unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(bill.member_id, member.id);
        assert_eq!(bill.status, Status::Unpaid);
        assert_eq!(bill.charges.parking_fee, Money::from_minor(10_000));
        assert_eq!(bill.due_date.to_string(), "2024-02-10");
        assert_eq!(bill.total, Money::from_minor(180_000));
        assert!(bill.number.to_string().starts_with("BILL/2024/1/101/"));
        assert_eq!(db.bills().len(), 1);
    }

    #[tokio::test]
    async fn rejects_duplicate_period() {
        let member = testing::member("202");
        let svc =
            testing::service(Memory::with_members([member.clone()]));
        let cmd = GenerateBill {
            member_id: member.id,
            period: Period::new(5, 2024).unwrap(),
        };

        drop(svc.execute(cmd).await.unwrap());
        let err = svc.execute(cmd).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::DuplicateBill { member_id, .. }
                if *member_id == member.id,
        ));
        assert_eq!(svc.database().bills().len(), 1);
    }

    #[tokio::test]
    async fn rejects_unknown_member() {
        let svc = testing::service(Memory::default());
        let member_id = testing::member("101").id;

        let err = svc
            .execute(GenerateBill {
                member_id,
                period: Period::new(1, 2024).unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::MemberNotFound(id) if *id == member_id,
        ));
    }

    #[tokio::test]
    async fn reports_unique_violation_as_duplicate() {
        let member = testing::member("101");
        let db = Memory::with_members([member.clone()]);
        let period = Period::new(2, 2024).unwrap();
        db.put_bill(Bill::generate(&member, period, &Tariff::default()));

        let err = super::insert(
            &db,
            Bill::generate(&member, period, &Tariff::default()),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::DuplicateBill { .. },
        ));
    }
}
