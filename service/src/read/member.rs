//! [`Member`]-related read definitions.

use derive_more::Deref;

#[cfg(doc)]
use crate::domain::{Bill, Member};

/// Indicator whether a [`Member`] has any [`Bill`]s issued.
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct HasBills(pub bool);

impl PartialEq<bool> for HasBills {
    fn eq(&self, other: &bool) -> bool {
        self.0 == *other
    }
}
