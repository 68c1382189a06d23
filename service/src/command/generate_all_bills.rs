//! [`Command`] for generating [`Bill`]s of all the [`Member`]s.

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted,
};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{bill::Period, member, Bill, Member},
    infra::{database, Database},
    Service,
};

use super::{generate_bill, Command};

/// [`Command`] for generating [`Bill`]s of all the [`Member`]s for a single
/// [`Period`].
///
/// [`Member`]s already billed for the [`Period`] are skipped, so repeating
/// this [`Command`] creates nothing new.
#[derive(Clone, Copy, Debug)]
pub struct GenerateAllBills {
    /// [`Period`] to bill for.
    pub period: Period,
}

impl<Db> Command<GenerateAllBills> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Vec<Member>, ()>>,
            Ok = Vec<Member>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Member, member::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Bill>, (member::Id, Period)>>,
            Ok = Option<Bill>,
            Err = Traced<database::Error>,
        > + Database<Insert<Bill>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    /// Number of newly generated [`Bill`]s.
    type Ok = usize;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: GenerateAllBills,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let GenerateAllBills { period } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let members = tx
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut generated = 0;
        for member in &members {
            // Avoid concurrent billing of the same `Member`.
            tx.execute(Lock(By::new(member.id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            let existing = tx
                .execute(Select(By::new((member.id, period))))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if existing.is_some() {
                continue;
            }

            let bill = Bill::generate(member, period, &self.config().tariff);
            generate_bill::insert(&tx, bill)
                .await
                .map_err(tracerr::wrap!())?;
            generated += 1;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "generated {generated} bills for {period} out of {} members",
            members.len(),
        );

        Ok(generated)
    }
}

/// Error of [`GenerateAllBills`] [`Command`] execution.
pub type ExecutionError = generate_bill::ExecutionError;

#[cfg(test)]
mod spec {
    use common::Money;

    use crate::{
        domain::{bill::Period, Bill, Tariff},
        infra::Memory,
        testing, Command as _,
    };

    use super::GenerateAllBills;

    #[tokio::test]
    async fn bills_every_member_once() {
        let members = [
            testing::member("101"),
            testing::member("202"),
            testing::member("199"),
        ];
        let svc = testing::service(Memory::with_members(members.clone()));
        let cmd = GenerateAllBills {
            period: Period::new(3, 2024).unwrap(),
        };

        assert_eq!(svc.execute(cmd).await.unwrap(), 3);
        assert_eq!(svc.execute(cmd).await.unwrap(), 0);

        let bills = svc.database().bills();
        assert_eq!(bills.len(), 3);
        for member in &members {
            let bill = bills.iter().find(|b| b.member_id == member.id).unwrap();
            let expected = if member.flat_num.has_parking() {
                Money::from_minor(10_000)
            } else {
                Money::ZERO
            };
            assert_eq!(bill.charges.parking_fee, expected);
        }
    }

    #[tokio::test]
    async fn skips_already_billed_members() {
        let billed = testing::member("101");
        let fresh = testing::member("202");
        let period = Period::new(12, 2024).unwrap();
        let db = Memory::with_members([billed.clone(), fresh.clone()]);
        let existing = Bill::generate(&billed, period, &Tariff::default());
        db.put_bill(existing.clone());
        let svc = testing::service(db);

        assert_eq!(svc.execute(GenerateAllBills { period }).await.unwrap(), 1);
        assert_eq!(svc.execute(GenerateAllBills { period }).await.unwrap(), 0);

        let bills = svc.database().bills();
        assert_eq!(bills.len(), 2);
        assert!(bills.iter().any(|b| b.member_id == fresh.id
            && b.due_date.to_string() == "2025-01-10"));
        let kept = bills.iter().find(|b| b.member_id == billed.id).unwrap();
        assert_eq!(kept.id, existing.id);
        assert_eq!(kept.number, existing.number);
        assert_eq!(kept.total, existing.total);
    }

    #[tokio::test]
    async fn nothing_to_bill_without_members() {
        let svc = testing::service(Memory::default());

        let generated = svc
            .execute(GenerateAllBills {
                period: Period::new(1, 2024).unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(generated, 0);
    }
}
