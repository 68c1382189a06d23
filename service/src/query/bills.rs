//! [`Query`] collection related to the multiple [`Bill`]s.

use common::operations::By;

use crate::{
    domain::{member, Bill},
    read,
};
#[cfg(doc)]
use crate::{domain::Member, Query};

use super::DatabaseQuery;

/// Queries a list of [`Bill`]s, the latest billing period first.
pub type List = DatabaseQuery<By<Vec<Bill>, read::bill::list::Filter>>;

/// Queries a [`read::bill::Summary`] of all the [`Bill`]s, or of the ones of
/// a single [`Member`] only.
pub type Summary =
    DatabaseQuery<By<read::bill::Summary, Option<member::Id>>>;
