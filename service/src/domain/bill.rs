//! [`Bill`] definitions.

use std::fmt;

#[cfg(doc)]
use common::{Date, DateTime};
use common::{define_kind, unit, DateOf, DateTimeOf, Money};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rand::Rng as _;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    member::{self, FlatNum},
    Member, Tariff,
};

/// Monthly maintenance bill of a [`Member`].
#[derive(Clone, Debug)]
pub struct Bill {
    /// ID of this [`Bill`].
    pub id: Id,

    /// Human-readable [`Number`] of this [`Bill`].
    pub number: Number,

    /// ID of the [`Member`] this [`Bill`] is issued to.
    pub member_id: member::Id,

    /// [`Period`] this [`Bill`] covers.
    pub period: Period,

    /// Line items of this [`Bill`].
    pub charges: Charges,

    /// Sum of the base [`Charges`] of this [`Bill`].
    pub subtotal: Money,

    /// Amount to be paid for this [`Bill`].
    pub total: Money,

    /// [`Date`] this [`Bill`] must be paid by.
    pub due_date: DueDate,

    /// [`Status`] of this [`Bill`].
    pub status: Status,

    /// [`Payment`] of this [`Bill`], once it's paid.
    pub payment: Option<Payment>,

    /// [`DateTime`] when this [`Bill`] was created.
    pub created_at: CreationDateTime,
}

impl Bill {
    /// Generates a new unpaid [`Bill`] of the provided [`Member`] for the
    /// provided [`Period`] according to the provided [`Tariff`].
    #[must_use]
    pub fn generate(member: &Member, period: Period, tariff: &Tariff) -> Self {
        let mut bill = Self {
            id: Id::new(),
            number: Number::generate(period, &member.flat_num),
            member_id: member.id,
            period,
            charges: tariff.charges_for(&member.flat_num),
            subtotal: Money::ZERO,
            total: Money::ZERO,
            due_date: period.due_date(),
            status: Status::Unpaid,
            payment: None,
            created_at: DateTimeOf::now(),
        };
        bill.recompute_totals();
        bill
    }

    /// Recalculates [`Bill::subtotal`] and [`Bill::total`] from the current
    /// [`Charges`].
    pub fn recompute_totals(&mut self) {
        self.subtotal = self.charges.subtotal();
        self.total = self.charges.total();
    }

    /// Records the provided [`Payment`] of this [`Bill`].
    ///
    /// Totals are left untouched.
    ///
    /// # Errors
    ///
    /// With the current [`Status`] if this [`Bill`] isn't payable.
    pub fn record_payment(&mut self, payment: Payment) -> Result<(), Status> {
        if !self.status.is_payable() {
            return Err(self.status);
        }
        self.status = Status::Paid;
        self.payment = Some(payment);
        Ok(())
    }

    /// Marks this [`Bill`] as [`Status::Overdue`] if it's unpaid past its
    /// [`DueDate`] on the provided `today`.
    ///
    /// The provided `late_fee` is charged only if no late fee was charged
    /// before.
    ///
    /// Returns whether this [`Bill`] has transitioned.
    pub fn mark_overdue<Of: ?Sized>(
        &mut self,
        today: DateOf<Of>,
        late_fee: Money,
    ) -> bool {
        if self.status != Status::Unpaid || today <= self.due_date.coerce() {
            return false;
        }
        self.status = Status::Overdue;
        if self.charges.late_fee.is_zero() {
            self.charges.late_fee = late_fee;
            self.recompute_totals();
        }
        true
    }
}

/// ID of a [`Bill`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Human-readable number of a [`Bill`] in
/// `BILL/{year}/{month}/{flat}/{suffix}` format.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Number(String);

impl Number {
    /// Range the random suffix of a [`Number`] is picked from.
    const SUFFIX: std::ops::RangeInclusive<u16> = 1000..=9999;

    /// Creates a new [`Number`] with the provided `suffix`.
    #[must_use]
    pub fn new(period: Period, flat: &FlatNum, suffix: u16) -> Self {
        Self(format!(
            "BILL/{}/{}/{flat}/{suffix}",
            period.year, period.month,
        ))
    }

    /// Generates a new [`Number`] with a random 4-digit suffix.
    ///
    /// Collisions aren't checked.
    #[must_use]
    pub fn generate(period: Period, flat: &FlatNum) -> Self {
        let suffix = rand::thread_rng().gen_range(Self::SUFFIX);
        Self::new(period, flat, suffix)
    }
}

/// Month of a [`Period`] in `1..=12` range.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
pub struct Month(u8);

impl Month {
    /// Creates a new [`Month`] if the provided `month` is valid.
    #[must_use]
    pub fn new(month: u8) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self(month))
    }
}

impl FromStr for Month {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().ok().and_then(Self::new).ok_or("invalid `Month`")
    }
}

/// Year of a [`Period`].
///
/// Bounded so the [`DueDate`] of its last month stays representable.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
pub struct Year(i32);

impl Year {
    /// Latest supported [`Year`].
    pub const MAX: i32 = 9998;

    /// Creates a new [`Year`] if the provided `year` is valid.
    #[must_use]
    pub fn new(year: i32) -> Option<Self> {
        (1..=Self::MAX).contains(&year).then_some(Self(year))
    }
}

impl FromStr for Year {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().ok().and_then(Self::new).ok_or("invalid `Year`")
    }
}

/// Billing period: a calendar month of a year.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Period {
    /// [`Year`] of this [`Period`].
    pub year: Year,

    /// [`Month`] of this [`Period`].
    pub month: Month,
}

impl Period {
    /// Day of the next month the [`DueDate`] falls on.
    const DUE_DAY: u8 = 10;

    /// Creates a new [`Period`] out of raw `month` and `year`.
    ///
    /// # Errors
    ///
    /// If either the `month` or the `year` is out of range.
    pub fn new(month: u8, year: i32) -> Result<Self, InvalidPeriod> {
        Ok(Self {
            year: Year::new(year).ok_or(InvalidPeriod { month, year })?,
            month: Month::new(month).ok_or(InvalidPeriod { month, year })?,
        })
    }

    /// Returns the [`DueDate`] of a [`Bill`] for this [`Period`]: the 10th
    /// of the next month.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn due_date(self) -> DueDate {
        let (year, month) = match self.month.0 {
            12 => (self.year.0 + 1, 1),
            m => (self.year.0, m + 1),
        };
        DueDate::from_calendar_date(year, month, Self::DUE_DAY)
            .expect("`Year` is bounded to keep due dates representable")
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.month, self.year)
    }
}

/// Error of an out-of-range [`Period`].
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("`{month}/{year}` is not a valid billing period")]
pub struct InvalidPeriod {
    /// Provided month.
    pub month: u8,

    /// Provided year.
    pub year: i32,
}

/// Line items of a [`Bill`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Charges {
    /// Maintenance charge.
    pub maintenance: Money,

    /// Sinking fund contribution.
    pub sinking_fund: Money,

    /// Parking fee.
    pub parking_fee: Money,

    /// Water charge.
    pub water: Money,

    /// Electricity charge.
    pub electricity: Money,

    /// Garbage collection charge.
    pub garbage: Money,

    /// Late fee charged for an overdue payment.
    pub late_fee: Money,

    /// Discount subtracted from the total.
    pub discount: Money,
}

impl Charges {
    /// Sums up the base items, excluding the late fee and the discount.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        [
            self.maintenance,
            self.sinking_fund,
            self.parking_fee,
            self.water,
            self.electricity,
            self.garbage,
        ]
        .into_iter()
        .sum()
    }

    /// Calculates the amount due.
    ///
    /// Not clamped: may go negative if the discount outweighs the rest.
    #[must_use]
    pub fn total(&self) -> Money {
        self.subtotal() + self.late_fee - self.discount
    }
}

define_kind! {
    #[doc = "Status of a [`Bill`]."]
    enum Status {
        #[doc = "[`Bill`] awaits payment."]
        Unpaid = 1,

        #[doc = "[`Bill`] is paid."]
        Paid = 2,

        #[doc = "[`Bill`] wasn't paid by its due date."]
        Overdue = 3,
    }
}

impl Status {
    /// Indicates whether a [`Bill`] in this [`Status`] accepts a payment.
    #[must_use]
    pub const fn is_payable(self) -> bool {
        matches!(self, Self::Unpaid | Self::Overdue)
    }
}

/// Payment details of a [`Bill`].
#[derive(Clone, Debug)]
pub struct Payment {
    /// [`Date`] the [`Bill`] was paid on.
    pub paid_on: PaymentDate,

    /// [`PaymentMethod`] used.
    pub method: PaymentMethod,

    /// [`TransactionId`] of the payment.
    pub transaction_id: TransactionId,

    /// Free-form [`Remarks`], if any.
    pub remarks: Option<Remarks>,
}

/// Generates a trimmed free-text newtype bounded by the provided length.
macro_rules! bounded_text {
    ($(#[doc = $doc:literal])* $name:ident, $max:literal) => {
        $(#[doc = $doc])*
        #[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
        #[as_ref(str, String)]
        #[cfg_attr(
            feature = "postgres",
            derive(FromSql, ToSql),
            postgres(transparent)
        )]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new [`", stringify!($name), "`] if \
                             the provided `text` is valid.")]
            #[must_use]
            pub fn new(text: impl Into<String>) -> Option<Self> {
                let text = text.into();
                Self::check(&text).then_some(Self(text))
            }

            /// Checks whether the provided `text` is valid.
            fn check(text: &str) -> bool {
                text.trim() == text
                    && !text.is_empty()
                    && text.chars().count() <= $max
            }
        }

        impl FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
                    .ok_or(concat!("invalid `", stringify!($name), "`"))
            }
        }
    };
}

bounded_text!(
    /// Method a [`Bill`] was paid with, like `Cash` or `Online`.
    PaymentMethod,
    50
);

bounded_text!(
    /// ID of the payment transaction, as reported by the payer.
    TransactionId,
    100
);

bounded_text!(
    /// Remarks attached to a [`Payment`].
    Remarks,
    1000
);

/// [`Date`] a [`Bill`] is due by.
pub type DueDate = DateOf<(Bill, unit::Due)>;

/// [`Date`] a [`Bill`] was paid on.
pub type PaymentDate = DateOf<(Bill, unit::Payment)>;

/// [`DateTime`] when a [`Bill`] was created.
pub type CreationDateTime = DateTimeOf<(Bill, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::{Date, DateTime, Money};

    use crate::domain::{
        member::{self, FlatNum},
        Member, Tariff,
    };

    use super::{
        Bill, Charges, DueDate, Number, Payment, PaymentMethod, Period,
        Status, TransactionId,
    };

    fn member(flat: &str) -> Member {
        Member {
            id: member::Id::new(),
            name: member::Name::new("John Doe").unwrap(),
            flat_num: FlatNum::new(flat).unwrap(),
            contact: None,
            email: None,
            kind: member::Kind::Owner,
            joined_at: DateTime::now().coerce(),
        }
    }

    fn payment(method: &str, txn: &str) -> Payment {
        Payment {
            paid_on: Date::today().coerce(),
            method: PaymentMethod::new(method).unwrap(),
            transaction_id: TransactionId::new(txn).unwrap(),
            remarks: None,
        }
    }

    #[test]
    fn computes_totals() {
        let charges = Charges {
            maintenance: Money::from_minor(100_000),
            sinking_fund: Money::from_minor(20_000),
            parking_fee: Money::from_minor(10_000),
            water: Money::from_minor(15_000),
            electricity: Money::from_minor(30_000),
            garbage: Money::from_minor(5_000),
            late_fee: Money::from_minor(10_000),
            discount: Money::from_minor(5_000),
        };

        assert_eq!(charges.subtotal(), Money::from_minor(180_000));
        assert_eq!(charges.total(), Money::from_minor(185_000));
    }

    #[test]
    fn zero_charges_total_to_zero() {
        let charges = Charges::default();

        assert_eq!(charges.subtotal(), Money::ZERO);
        assert_eq!(charges.total(), Money::ZERO);
    }

    #[test]
    fn totals_largest_storable_charges() {
        let max = Money::from_minor(Tariff::MAX_AMOUNT_MINOR);
        let charges = Charges {
            maintenance: max,
            sinking_fund: max,
            parking_fee: max,
            water: max,
            electricity: max,
            garbage: max,
            late_fee: max,
            discount: Money::ZERO,
        };

        assert_eq!(charges.subtotal(), Money::from_minor(59_999_999_994));
        assert_eq!(charges.total(), Money::from_minor(69_999_999_993));

        let discounted = Charges {
            discount: max,
            ..charges
        };
        assert_eq!(discounted.total(), charges.subtotal());
    }

    #[test]
    fn total_is_not_clamped() {
        let charges = Charges {
            water: Money::from_minor(1_000),
            discount: Money::from_minor(5_000),
            ..Charges::default()
        };

        assert_eq!(charges.total(), Money::from_minor(-4_000));
    }

    #[test]
    fn due_date_rolls_over_year() {
        assert_eq!(
            Period::new(12, 2024).unwrap().due_date(),
            DueDate::from_calendar_date(2025, 1, 10).unwrap(),
        );
        assert_eq!(
            Period::new(1, 2024).unwrap().due_date(),
            DueDate::from_calendar_date(2024, 2, 10).unwrap(),
        );
        assert_eq!(
            Period::new(12, 9998).unwrap().due_date(),
            DueDate::from_calendar_date(9999, 1, 10).unwrap(),
        );
    }

    #[test]
    fn rejects_invalid_periods() {
        assert!(Period::new(0, 2024).is_err());
        assert!(Period::new(13, 2024).is_err());
        assert!(Period::new(1, 0).is_err());
        assert!(Period::new(1, 9999).is_err());
        assert_eq!(
            Period::new(13, 2024).unwrap_err().to_string(),
            "`13/2024` is not a valid billing period",
        );
    }

    #[test]
    fn orders_periods_chronologically() {
        let dec = Period::new(12, 2023).unwrap();
        let jan = Period::new(1, 2024).unwrap();
        let feb = Period::new(2, 2024).unwrap();

        assert!(dec < jan);
        assert!(jan < feb);
    }

    #[test]
    fn formats_number() {
        let period = Period::new(3, 2024).unwrap();
        let flat = FlatNum::new("101").unwrap();

        assert_eq!(
            Number::new(period, &flat, 4321).to_string(),
            "BILL/2024/3/101/4321",
        );

        let generated = Number::generate(period, &flat).to_string();
        let (prefix, suffix) = generated.rsplit_once('/').unwrap();
        assert_eq!(prefix, "BILL/2024/3/101");
        let suffix: u16 = suffix.parse().unwrap();
        assert!((1000..=9999).contains(&suffix));
    }

    #[test]
    fn generates_unpaid_bill() {
        let member = member("101");
        let bill = Bill::generate(
            &member,
            Period::new(1, 2024).unwrap(),
            &Tariff::default(),
        );

        assert_eq!(bill.member_id, member.id);
        assert_eq!(bill.status, Status::Unpaid);
        assert_eq!(bill.charges.parking_fee, Money::from_minor(10_000));
        assert_eq!(bill.charges.late_fee, Money::ZERO);
        assert_eq!(bill.charges.discount, Money::ZERO);
        assert_eq!(bill.subtotal, Money::from_minor(180_000));
        assert_eq!(bill.total, Money::from_minor(180_000));
        assert_eq!(bill.due_date.to_string(), "2024-02-10");
        assert!(bill.payment.is_none());
    }

    #[test]
    fn becomes_overdue_only_after_due_date() {
        let mut bill = Bill::generate(
            &member("202"),
            Period::new(1, 2024).unwrap(),
            &Tariff::default(),
        );
        let late_fee = Money::from_minor(10_000);

        bill.due_date = Date::today().next_day().unwrap().coerce();
        assert!(!bill.mark_overdue(Date::today(), late_fee));
        assert_eq!(bill.status, Status::Unpaid);

        bill.due_date = Date::today().coerce();
        assert!(!bill.mark_overdue(Date::today(), late_fee));

        bill.due_date = Date::today().previous_day().unwrap().coerce();
        assert!(bill.mark_overdue(Date::today(), late_fee));
        assert_eq!(bill.status, Status::Overdue);
        assert_eq!(bill.charges.late_fee, late_fee);
        assert_eq!(bill.total, Money::from_minor(180_000));

        assert!(!bill.mark_overdue(Date::today(), late_fee));
    }

    #[test]
    fn keeps_existing_late_fee() {
        let mut bill = Bill::generate(
            &member("202"),
            Period::new(1, 2024).unwrap(),
            &Tariff::default(),
        );
        bill.charges.late_fee = Money::from_minor(2_500);
        bill.recompute_totals();
        bill.due_date = Date::today().previous_day().unwrap().coerce();

        assert!(bill.mark_overdue(Date::today(), Money::from_minor(10_000)));
        assert_eq!(bill.charges.late_fee, Money::from_minor(2_500));
        assert_eq!(bill.total, Money::from_minor(172_500));
    }

    #[test]
    fn paid_bill_never_becomes_overdue() {
        let mut bill = Bill::generate(
            &member("202"),
            Period::new(1, 2024).unwrap(),
            &Tariff::default(),
        );
        bill.record_payment(payment("Cash", "C-1")).unwrap();
        bill.due_date = Date::today().previous_day().unwrap().coerce();

        assert!(!bill.mark_overdue(Date::today(), Money::from_minor(10_000)));
        assert_eq!(bill.status, Status::Paid);
    }

    #[test]
    fn accepts_payment_once() {
        let mut bill = Bill::generate(
            &member("101"),
            Period::new(1, 2024).unwrap(),
            &Tariff::default(),
        );

        bill.record_payment(payment("Online", "TXN1")).unwrap();
        assert_eq!(bill.status, Status::Paid);
        assert_eq!(bill.total, Money::from_minor(180_000));
        let paid = bill.payment.as_ref().unwrap();
        assert_eq!(paid.paid_on, Date::today().coerce());
        assert_eq!(paid.method.to_string(), "Online");
        assert_eq!(paid.transaction_id.to_string(), "TXN1");

        assert_eq!(
            bill.record_payment(payment("Online", "TXN2")),
            Err(Status::Paid),
        );
        assert_eq!(
            bill.payment.unwrap().transaction_id.to_string(),
            "TXN1",
        );
    }

    #[test]
    fn overdue_bill_is_payable() {
        let mut bill = Bill::generate(
            &member("101"),
            Period::new(1, 2024).unwrap(),
            &Tariff::default(),
        );
        bill.due_date = Date::today().previous_day().unwrap().coerce();
        assert!(bill.mark_overdue(Date::today(), Money::from_minor(10_000)));

        bill.record_payment(payment("Cheque", "CHQ-77")).unwrap();
        assert_eq!(bill.status, Status::Paid);
        assert_eq!(bill.total, Money::from_minor(190_000));
    }

    #[test]
    fn validates_payment_details() {
        assert!(PaymentMethod::new("Online").is_some());
        assert!(PaymentMethod::new("").is_none());
        assert!(PaymentMethod::new("x".repeat(51)).is_none());
        assert!(TransactionId::new(" TXN").is_none());
        assert!(TransactionId::new("x".repeat(100)).is_some());
    }
}
