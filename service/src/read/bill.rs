//! [`Bill`]-related read definitions.

use common::Money;
use derive_more::{Deref, From, Into};

use crate::domain::{bill::Status, Bill};
#[cfg(doc)]
use crate::domain::Member;

/// Aggregated figures over a set of [`Bill`]s.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    /// Sum of the totals of [`Status::Paid`] [`Bill`]s.
    pub total_collected: Money,

    /// Sum of the totals of [`Status::Unpaid`] and [`Status::Overdue`]
    /// [`Bill`]s.
    pub pending_amount: Money,

    /// Number of [`Status::Paid`] [`Bill`]s.
    pub paid_count: i64,

    /// Number of [`Status::Unpaid`] [`Bill`]s.
    pub unpaid_count: i64,

    /// Number of [`Status::Overdue`] [`Bill`]s.
    pub overdue_count: i64,
}

impl<'b> FromIterator<&'b Bill> for Summary {
    fn from_iter<I: IntoIterator<Item = &'b Bill>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), |mut s, bill| {
            match bill.status {
                Status::Paid => {
                    s.total_collected += bill.total;
                    s.paid_count += 1;
                }
                Status::Unpaid => {
                    s.pending_amount += bill.total;
                    s.unpaid_count += 1;
                }
                Status::Overdue => {
                    s.pending_amount += bill.total;
                    s.overdue_count += 1;
                }
            }
            s
        })
    }
}

/// Most recent [`Bill`] of a [`Member`], by its period.
#[derive(Clone, Debug, Deref, From, Into)]
pub struct Latest(pub Bill);

pub mod list {
    //! [`Bill`] list definitions.

    use crate::domain::{bill, member, Bill};
    #[cfg(doc)]
    use crate::domain::Member;

    /// Filter of a [`Bill`] list.
    ///
    /// Lists are ordered from the latest period to the earliest one.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// Only [`Bill`]s of this [`Member`].
        pub member_id: Option<member::Id>,

        /// Only [`Bill`]s in this [`bill::Status`].
        pub status: Option<bill::Status>,
    }

    impl Filter {
        /// Indicates whether the provided [`Bill`] passes this [`Filter`].
        #[must_use]
        pub fn matches(&self, bill: &Bill) -> bool {
            self.member_id.is_none_or(|id| bill.member_id == id)
                && self.status.is_none_or(|s| bill.status == s)
        }
    }
}
