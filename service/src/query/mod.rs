//! [`Query`] definition.

pub mod bill;
pub mod bills;
pub mod member;
pub mod members;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{database, Database},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] [`Select`]ing a `T`ype from a [`Database`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseQuery<T>(T);

impl<W, B> DatabaseQuery<By<W, B>> {
    /// Creates a new [`DatabaseQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, W, B> Query<DatabaseQuery<By<W, B>>> for Service<Db>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        DatabaseQuery(by): DatabaseQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use common::Money;

    use crate::{
        domain::bill::Status, infra::Memory, read, testing, Query as _,
    };

    use super::{bill, bills};

    #[tokio::test]
    async fn selects_latest_bill_and_summary() {
        let member = testing::member("101");
        let other = testing::member("202");
        let db = Memory::with_members([member.clone(), other.clone()]);
        let mut paid = testing::bill(&member, 11, 2024);
        paid.status = Status::Paid;
        db.put_bill(paid);
        db.put_bill(testing::bill(&member, 12, 2024));
        db.put_bill(testing::bill(&other, 1, 2025));
        let svc = testing::service(db);

        let latest = svc
            .execute(bill::Latest::by(member.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.period.to_string(), "12/2024");

        let all = svc.execute(bills::Summary::by(None)).await.unwrap();
        assert_eq!(all.paid_count, 1);
        assert_eq!(all.unpaid_count, 2);
        assert_eq!(all.total_collected, Money::from_minor(180_000));
        assert_eq!(all.pending_amount, Money::from_minor(350_000));

        let own = svc
            .execute(bills::Summary::by(Some(member.id)))
            .await
            .unwrap();
        assert_eq!(own.unpaid_count, 1);

        let list = svc
            .execute(bills::List::by(read::bill::list::Filter {
                member_id: Some(member.id),
                status: None,
            }))
            .await
            .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].period.to_string(), "12/2024");
    }
}
