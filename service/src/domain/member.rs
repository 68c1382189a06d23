//! [`Member`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resident of the society: the billable unit.
#[derive(Clone, Debug)]
pub struct Member {
    /// ID of this [`Member`].
    pub id: Id,

    /// [`Name`] of this [`Member`].
    pub name: Name,

    /// [`FlatNum`] this [`Member`] lives in.
    pub flat_num: FlatNum,

    /// Contact [`Phone`] of this [`Member`], if any.
    pub contact: Option<Phone>,

    /// [`Email`] of this [`Member`], if any.
    pub email: Option<Email>,

    /// [`Kind`] of this [`Member`].
    pub kind: Kind,

    /// [`DateTime`] when this [`Member`] joined the society.
    pub joined_at: JoinDateTime,
}

/// ID of a [`Member`].
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
    Ord,
    PartialEq,
    PartialOrd,
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

/// Full name of a [`Member`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 100
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Number of a flat in the society, like `101` or `B-12`.
///
/// The first character encodes the wing of the building.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct FlatNum(String);

impl FlatNum {
    /// Wing whose flats are eligible for a parking slot.
    const PARKING_WING: char = '1';

    /// Creates a new [`FlatNum`] if the given `num` is valid.
    #[must_use]
    pub fn new(num: impl Into<String>) -> Option<Self> {
        let num = num.into();
        Self::check(&num).then_some(Self(num))
    }

    /// Indicates whether this flat is charged a parking fee.
    #[must_use]
    pub fn has_parking(&self) -> bool {
        self.0.starts_with(Self::PARKING_WING)
    }

    /// Checks whether the given `num` is a valid [`FlatNum`].
    fn check(num: impl AsRef<str>) -> bool {
        let num = num.as_ref();
        num.trim() == num
            && !num.is_empty()
            && num.chars().count() <= 10
            && !num.contains('/')
    }
}

impl FromStr for FlatNum {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `FlatNum`")
    }
}

/// Contact phone number of a [`Member`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Phone`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^([+]?\d{1,2}[-\s]?|)\d{3}[-\s]?\d{3}[-\s]?\d{4}$")
                .expect("valid regex")
        });

        REGEX.is_match(number.as_ref())
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// Email address of a [`Member`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Simplified `local@domain.tld` shape, at most 100 characters.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 100 && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

define_kind! {
    #[doc = "Kind of a [`Member`] residency."]
    enum Kind {
        #[doc = "Member owns the flat."]
        Owner = 1,

        #[doc = "Member rents the flat."]
        Tenant = 2,
    }
}

/// [`DateTime`] when a [`Member`] joined the society.
pub type JoinDateTime = DateTimeOf<(Member, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Email, FlatNum, Kind, Phone};

    #[test]
    fn parking_is_granted_to_first_wing_only() {
        for (flat, expected) in
            [("101", true), ("202", false), ("199", true), ("999", false)]
        {
            assert_eq!(
                FlatNum::new(flat).unwrap().has_parking(),
                expected,
                "flat `{flat}`",
            );
        }
    }

    #[test]
    fn validates_flat_numbers() {
        assert!(FlatNum::new("A-101").is_some());
        assert!(FlatNum::new("").is_none());
        assert!(FlatNum::new(" 101").is_none());
        assert!(FlatNum::new("12345678901").is_none());
        assert!(FlatNum::new("1/2").is_none());
    }

    #[test]
    fn validates_contacts() {
        assert!(Phone::new("9876543210").is_some());
        assert!(Phone::new("+91 987 654 3210").is_some());
        assert!(Phone::new("12345").is_none());

        assert!(Email::new("john@example.com").is_some());
        assert!(Email::new("john@example").is_none());
        assert!(Email::new("john example.com").is_none());
    }

    #[test]
    fn kind_round_trips_through_text() {
        assert_eq!(Kind::Owner.to_string(), "OWNER");
        assert_eq!("TENANT".parse::<Kind>().unwrap(), Kind::Tenant);
        assert_eq!(Kind::try_from(2_u8), Ok(Kind::Tenant));
    }
}
