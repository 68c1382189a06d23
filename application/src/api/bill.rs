//! [`Bill`]-related definitions.

use common::{Date, DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLObject, GraphQLScalar};
use service::{domain, read};
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    define_error, AsError as _, Context, Error,
};

/// A monthly maintenance bill of a society member.
#[derive(Clone, Debug, From, Into)]
pub struct Bill(domain::Bill);

/// A monthly maintenance bill of a society `Member`.
#[graphql_object(context = Context)]
impl Bill {
    /// Unique identifier of this `Bill`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Human-readable number of this `Bill`, like `BILL/2024/3/101/4821`.
    #[must_use]
    pub fn number(&self) -> String {
        self.0.number.to_string()
    }

    /// `Member` this `Bill` is issued to.
    #[must_use]
    pub fn member(&self) -> api::Member {
        #[expect(
            unsafe_code,
            reason = "`Bill` loaded from repository guarantees `Member` \
                      existence"
        )]
        unsafe {
            api::Member::new_unchecked(self.0.member_id)
        }
    }

    /// Month of the billing period, from 1 to 12.
    #[must_use]
    pub fn month(&self) -> i32 {
        u8::from(self.0.period.month).into()
    }

    /// Year of the billing period.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.period.year.into()
    }

    /// Line items of this `Bill`.
    #[must_use]
    pub fn charges(&self) -> Charges {
        self.0.charges.into()
    }

    /// Sum of all the charges of this `Bill`, except the late fee and the
    /// discount.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.0.subtotal
    }

    /// Amount to be paid: the subtotal plus the late fee minus the discount.
    #[must_use]
    pub fn total(&self) -> Money {
        self.0.total
    }

    /// `Date` this `Bill` is due by.
    #[must_use]
    pub fn due_date(&self) -> Date {
        self.0.due_date.coerce()
    }

    /// Status of this `Bill`.
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// Details of the payment, if this `Bill` is paid.
    #[must_use]
    pub fn payment(&self) -> Option<Payment> {
        self.0.payment.clone().map(Into::into)
    }

    /// `DateTime` when this `Bill` was generated.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Line items of a `Bill`.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "BillCharges")]
pub struct Charges {
    /// Maintenance charge.
    pub maintenance: Money,

    /// Contribution to the sinking fund.
    pub sinking_fund: Money,

    /// Parking fee, charged only to flats having a parking slot.
    pub parking_fee: Money,

    /// Water charge.
    pub water: Money,

    /// Electricity charge for the common areas.
    pub electricity: Money,

    /// Garbage collection charge.
    pub garbage: Money,

    /// Fee charged once the `Bill` became overdue.
    pub late_fee: Money,

    /// Discount granted.
    pub discount: Money,
}

impl From<domain::bill::Charges> for Charges {
    fn from(charges: domain::bill::Charges) -> Self {
        let domain::bill::Charges {
            maintenance,
            sinking_fund,
            parking_fee,
            water,
            electricity,
            garbage,
            late_fee,
            discount,
        } = charges;
        Self {
            maintenance,
            sinking_fund,
            parking_fee,
            water,
            electricity,
            garbage,
            late_fee,
            discount,
        }
    }
}

/// Details of a `Bill` payment.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "BillPayment")]
pub struct Payment {
    /// `Date` the `Bill` was paid on.
    pub paid_on: Date,

    /// Method the `Bill` was paid with.
    pub method: PaymentMethod,

    /// ID of the payment transaction.
    pub transaction_id: TransactionId,

    /// Remarks left by the payer.
    pub remarks: Option<Remarks>,
}

impl From<domain::bill::Payment> for Payment {
    fn from(payment: domain::bill::Payment) -> Self {
        let domain::bill::Payment {
            paid_on,
            method,
            transaction_id,
            remarks,
        } = payment;
        Self {
            paid_on: paid_on.coerce(),
            method: method.into(),
            transaction_id: transaction_id.into(),
            remarks: remarks.map(Into::into),
        }
    }
}

/// Aggregated figures over a set of `Bill`s.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "BillingSummary")]
pub struct Summary {
    /// Sum of the totals of the paid `Bill`s.
    pub total_collected: Money,

    /// Sum of the totals of the unpaid and overdue `Bill`s.
    pub pending_amount: Money,

    /// Number of the paid `Bill`s.
    pub paid_count: i32,

    /// Number of the unpaid `Bill`s.
    pub unpaid_count: i32,

    /// Number of the overdue `Bill`s.
    pub overdue_count: i32,
}

impl TryFrom<read::bill::Summary> for Summary {
    type Error = Error;

    fn try_from(summary: read::bill::Summary) -> Result<Self, Self::Error> {
        let count = |n: i64| i32::try_from(n).map_err(|e| e.into_error());
        Ok(Self {
            total_collected: summary.total_collected,
            pending_amount: summary.pending_amount,
            paid_count: count(summary.paid_count)?,
            unpaid_count: count(summary.unpaid_count)?,
            overdue_count: count(summary.overdue_count)?,
        })
    }
}

/// Status of a `Bill`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "BillStatus")]
pub enum Status {
    /// Generated and waiting for a payment.
    Unpaid,

    /// Paid in full.
    Paid,

    /// Not paid by its due date.
    Overdue,
}

impl From<domain::bill::Status> for Status {
    fn from(status: domain::bill::Status) -> Self {
        use domain::bill::Status as S;
        match status {
            S::Unpaid => Self::Unpaid,
            S::Paid => Self::Paid,
            S::Overdue => Self::Overdue,
        }
    }
}

impl From<Status> for domain::bill::Status {
    fn from(status: Status) -> Self {
        match status {
            Status::Unpaid => Self::Unpaid,
            Status::Paid => Self::Paid,
            Status::Overdue => Self::Overdue,
        }
    }
}

/// Unique identifier of a `Bill`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::bill::Id)]
#[into(domain::bill::Id)]
#[graphql(name = "BillId", transparent)]
pub struct Id(Uuid);

/// Method a `Bill` was paid with, like `Cash` or `Online`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PaymentMethod",
    with = scalar::Via::<domain::bill::PaymentMethod>,
)]
pub struct PaymentMethod(domain::bill::PaymentMethod);

/// ID of a payment transaction.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "TransactionId",
    with = scalar::Via::<domain::bill::TransactionId>,
)]
pub struct TransactionId(domain::bill::TransactionId);

/// Remarks attached to a payment.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PaymentRemarks",
    with = scalar::Via::<domain::bill::Remarks>,
)]
pub struct Remarks(domain::bill::Remarks);

/// Parses a billing [`domain::bill::Period`] from the provided GraphQL
/// arguments.
///
/// # Errors
///
/// With `INVALID_PERIOD` code if the `month` or the `year` is out of range.
pub fn period(month: i32, year: i32) -> Result<domain::bill::Period, Error> {
    let month =
        u8::try_from(month).map_err(|_| Error::from(PeriodError::Month))?;
    domain::bill::Period::new(month, year).map_err(|e| e.into_error())
}

define_error! {
    enum PeriodError {
        #[code = "INVALID_PERIOD"]
        #[status = BAD_REQUEST]
        #[message = "Month must be within 1..=12"]
        Month,
    }
}

define_error! {
    enum BillError {
        #[code = "BILL_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Bill` with the specified ID does not exist"]
        NotExists,
    }
}

#[cfg(test)]
mod spec {
    use super::period;

    #[test]
    fn parses_period() {
        assert_eq!(period(3, 2024).unwrap().to_string(), "3/2024");
    }

    #[test]
    fn rejects_out_of_range_period() {
        for (month, year) in [(0, 2024), (13, 2024), (-1, 2024), (300, 2024)] {
            assert_eq!(period(month, year).unwrap_err().code, "INVALID_PERIOD");
        }
    }
}
