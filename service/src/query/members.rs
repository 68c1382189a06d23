//! [`Query`] collection related to the multiple [`Member`]s.

use common::operations::By;

use crate::domain::Member;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Member`]s ordered by their flats.
pub type List = DatabaseQuery<By<Vec<Member>, ()>>;
