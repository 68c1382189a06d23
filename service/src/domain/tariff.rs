//! [`Tariff`] definitions.

use common::Money;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use crate::domain::{bill::Charges, member::FlatNum};

/// Standard charges applied to every generated [`Bill`].
///
/// [`Bill`]: crate::domain::Bill
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, SmartDefault,
)]
#[serde(default)]
pub struct Tariff {
    /// Monthly maintenance charge.
    #[default(Money::from_minor(100_000))]
    pub maintenance: Money,

    /// Monthly contribution to the sinking fund.
    #[default(Money::from_minor(20_000))]
    pub sinking_fund: Money,

    /// Parking fee charged to flats having a parking slot.
    #[default(Money::from_minor(10_000))]
    pub parking_fee: Money,

    /// Water charge.
    #[default(Money::from_minor(15_000))]
    pub water: Money,

    /// Electricity charge for the common areas.
    #[default(Money::from_minor(30_000))]
    pub electricity: Money,

    /// Garbage collection charge.
    #[default(Money::from_minor(5_000))]
    pub garbage: Money,

    /// Fee charged once a bill becomes overdue.
    #[default(Money::from_minor(10_000))]
    pub late_fee: Money,
}

impl Tariff {
    /// Returns the parking fee the provided flat is charged.
    #[must_use]
    pub fn parking_fee_for(&self, flat: &FlatNum) -> Money {
        if flat.has_parking() {
            self.parking_fee
        } else {
            Money::ZERO
        }
    }

    /// Returns the base [`Charges`] of a fresh bill for the provided flat.
    #[must_use]
    pub fn charges_for(&self, flat: &FlatNum) -> Charges {
        Charges {
            maintenance: self.maintenance,
            sinking_fund: self.sinking_fund,
            parking_fee: self.parking_fee_for(flat),
            water: self.water,
            electricity: self.electricity,
            garbage: self.garbage,
            late_fee: Money::ZERO,
            discount: Money::ZERO,
        }
    }

    /// Largest amount, in minor units, a single charge is stored with.
    pub const MAX_AMOUNT_MINOR: i64 = 9_999_999_999;

    /// Largest number of fractional digits a charge is stored with.
    pub const MAX_FRACTIONAL_DIGITS: u32 = 2;

    /// Returns the name of the first amount in this [`Tariff`] that cannot be
    /// billed, if any.
    ///
    /// An amount can be billed when it's not negative, doesn't exceed
    /// [`Tariff::MAX_AMOUNT_MINOR`] and has no more than
    /// [`Tariff::MAX_FRACTIONAL_DIGITS`].
    #[must_use]
    pub fn unbillable_amount(&self) -> Option<&'static str> {
        let max = Money::from_minor(Self::MAX_AMOUNT_MINOR);
        [
            ("maintenance", self.maintenance),
            ("sinking_fund", self.sinking_fund),
            ("parking_fee", self.parking_fee),
            ("water", self.water),
            ("electricity", self.electricity),
            ("garbage", self.garbage),
            ("late_fee", self.late_fee),
        ]
        .into_iter()
        .find_map(|(name, amount)| {
            (amount.is_negative()
                || amount > max
                || amount.fractional_digits() > Self::MAX_FRACTIONAL_DIGITS)
                .then_some(name)
        })
    }
}

#[cfg(test)]
mod spec {
    use common::Money;

    use crate::domain::member::FlatNum;

    use super::Tariff;

    #[test]
    fn default_charges_for_parking_flat() {
        let flat = FlatNum::new("101").unwrap();
        let charges = Tariff::default().charges_for(&flat);

        assert_eq!(charges.maintenance, Money::from_minor(100_000));
        assert_eq!(charges.sinking_fund, Money::from_minor(20_000));
        assert_eq!(charges.parking_fee, Money::from_minor(10_000));
        assert_eq!(charges.water, Money::from_minor(15_000));
        assert_eq!(charges.electricity, Money::from_minor(30_000));
        assert_eq!(charges.garbage, Money::from_minor(5_000));
        assert_eq!(charges.late_fee, Money::ZERO);
        assert_eq!(charges.discount, Money::ZERO);
        assert_eq!(charges.subtotal(), Money::from_minor(180_000));
    }

    #[test]
    fn no_parking_fee_outside_first_wing() {
        let tariff = Tariff::default();

        assert_eq!(
            tariff.parking_fee_for(&FlatNum::new("202").unwrap()),
            Money::ZERO,
        );
        assert_eq!(
            tariff.charges_for(&FlatNum::new("999").unwrap()).subtotal(),
            Money::from_minor(170_000),
        );
    }

    #[test]
    fn detects_unbillable_amounts() {
        assert_eq!(Tariff::default().unbillable_amount(), None);

        let negative = Tariff {
            water: Money::from_minor(-1),
            ..Tariff::default()
        };
        assert_eq!(negative.unbillable_amount(), Some("water"));

        let largest = Tariff {
            maintenance: Money::from_minor(Tariff::MAX_AMOUNT_MINOR),
            garbage: Money::from_minor(10),
            ..Tariff::default()
        };
        assert_eq!(largest.unbillable_amount(), None);

        let too_large = Tariff {
            maintenance: Money::from_minor(Tariff::MAX_AMOUNT_MINOR + 1),
            ..Tariff::default()
        };
        assert_eq!(too_large.unbillable_amount(), Some("maintenance"));

        let too_precise = Tariff {
            late_fee: "0.125".parse().unwrap(),
            ..Tariff::default()
        };
        assert_eq!(too_precise.unbillable_amount(), Some("late_fee"));
    }
}
