//! In-memory [`Database`] used for testing.
//!
//! Operations apply immediately, so a transaction is never rolled back.

use std::sync::{Arc, Mutex, MutexGuard};

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use derive_more::{Display, Error as StdError};
use tracerr::Traced;

use crate::{
    domain::{
        bill::{self, Period},
        member, Bill, Member,
    },
    infra::{database, Database},
    read,
};

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Unique constraint is violated.
    #[display("Unique constraint `{_0}` is violated")]
    UniqueViolation(#[error(not(source))] &'static str),
}

/// Contents of a [`Memory`] database.
#[derive(Debug, Default)]
struct State {
    /// Stored [`Member`]s.
    members: Vec<Member>,

    /// Stored [`Bill`]s.
    bills: Vec<Bill>,
}

/// In-memory [`Database`].
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<Mutex<State>>);

impl Memory {
    /// Creates a new [`Memory`] database holding the provided [`Member`]s.
    #[must_use]
    pub fn with_members(members: impl IntoIterator<Item = Member>) -> Self {
        let this = Self::default();
        this.state().members.extend(members);
        this
    }

    /// Stores the provided [`Bill`] bypassing any checks.
    pub fn put_bill(&self, bill: Bill) {
        self.state().bills.push(bill);
    }

    /// Returns all the stored [`Bill`]s.
    #[must_use]
    pub fn bills(&self) -> Vec<Bill> {
        self.state().bills.clone()
    }

    /// Locks the [`State`] of this [`Memory`] database.
    fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().expect("poisoned")
    }
}

/// Sorts the provided [`Bill`]s from the latest [`Period`] to the earliest.
fn latest_first(bills: &mut [Bill]) {
    bills.sort_by(|a, b| b.period.cmp(&a.period));
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<T> Database<Lock<T>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Lock<T>) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<Member>, member::Id>>> for Memory {
    type Ok = Option<Member>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Member>, member::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.state().members.iter().find(|m| m.id == id).cloned())
    }
}

impl Database<Select<By<Vec<Member>, ()>>> for Memory {
    type Ok = Vec<Member>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Member>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().members.clone())
    }
}

impl Database<Insert<Member>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(member): Insert<Member>,
    ) -> Result<Self::Ok, Self::Err> {
        self.state().members.push(member);
        Ok(())
    }
}

impl Database<Delete<By<Member, member::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Member, member::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.state().members.retain(|m| m.id != id);
        Ok(())
    }
}

impl Database<Select<By<read::member::HasBills, member::Id>>> for Memory {
    type Ok = read::member::HasBills;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::member::HasBills, member::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(read::member::HasBills(
            self.state().bills.iter().any(|b| b.member_id == id),
        ))
    }
}

impl Database<Select<By<Option<Bill>, bill::Id>>> for Memory {
    type Ok = Option<Bill>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Bill>, bill::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.state().bills.iter().find(|b| b.id == id).cloned())
    }
}

impl Database<Select<By<Option<Bill>, (member::Id, Period)>>> for Memory {
    type Ok = Option<Bill>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Bill>, (member::Id, Period)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (member_id, period) = by.into_inner();
        Ok(self
            .state()
            .bills
            .iter()
            .find(|b| b.member_id == member_id && b.period == period)
            .cloned())
    }
}

impl Database<Select<By<Vec<Bill>, read::bill::list::Filter>>> for Memory {
    type Ok = Vec<Bill>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Bill>, read::bill::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let mut bills: Vec<_> = self
            .state()
            .bills
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        latest_first(&mut bills);
        Ok(bills)
    }
}

impl Database<Select<By<Option<read::bill::Latest>, member::Id>>> for Memory {
    type Ok = Option<read::bill::Latest>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<read::bill::Latest>, member::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .state()
            .bills
            .iter()
            .filter(|b| b.member_id == id)
            .max_by_key(|b| b.period)
            .cloned()
            .map(read::bill::Latest))
    }
}

impl Database<Select<By<read::bill::Summary, Option<member::Id>>>> for Memory {
    type Ok = read::bill::Summary;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::bill::Summary, Option<member::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let member_id = by.into_inner();
        Ok(self
            .state()
            .bills
            .iter()
            .filter(|b| member_id.is_none_or(|id| b.member_id == id))
            .collect())
    }
}

impl Database<Insert<Bill>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(bill): Insert<Bill>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        if state
            .bills
            .iter()
            .any(|b| b.member_id == bill.member_id && b.period == bill.period)
        {
            return Err(tracerr::new!(database::Error::from(
                Error::UniqueViolation(database::BILL_PERIOD_CONSTRAINT),
            )));
        }
        state.bills.push(bill);
        Ok(())
    }
}

impl Database<Update<Bill>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(bill): Update<Bill>,
    ) -> Result<Self::Ok, Self::Err> {
        if let Some(stored) =
            self.state().bills.iter_mut().find(|b| b.id == bill.id)
        {
            *stored = bill;
        }
        Ok(())
    }
}

impl Database<Delete<By<Bill, bill::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Bill, bill::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.state().bills.retain(|b| b.id != id);
        Ok(())
    }
}
