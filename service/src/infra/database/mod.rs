//! [`Database`]-related implementations.

#[cfg(test)]
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;
#[cfg(doc)]
use crate::domain::{Bill, Member};

/// Database operation.
pub use common::Handler as Database;

/// Unique constraint allowing a single [`Bill`] per [`Member`] and period.
pub const BILL_PERIOD_CONSTRAINT: &str = "bills_member_period_key";

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),

    #[cfg(test)]
    /// [`memory::Memory`] error.
    Memory(memory::Error),
}

impl Error {
    /// Checks whether this [`Error`] is a violation of the provided unique
    /// `constraint`, or of any unique constraint if [`None`].
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(e) => e.is_unique_violation(constraint),
            #[cfg(test)]
            Self::Memory(memory::Error::UniqueViolation(c)) => {
                constraint.is_none_or(|constraint| *c == constraint)
            }
        }
    }
}
