//! [`Query`] collection related to a single [`Bill`].

use common::operations::By;

use crate::{
    domain::{bill, member, Bill},
    read,
};
#[cfg(doc)]
use crate::{domain::Member, Query};

use super::DatabaseQuery;

/// Queries a [`Bill`] by its [`bill::Id`].
pub type ById = DatabaseQuery<By<Option<Bill>, bill::Id>>;

/// Queries the [`Bill`] of a [`Member`] for the provided [`bill::Period`].
pub type ByPeriod =
    DatabaseQuery<By<Option<Bill>, (member::Id, bill::Period)>>;

/// Queries the latest [`Bill`] of a [`Member`].
pub type Latest = DatabaseQuery<By<Option<read::bill::Latest>, member::Id>>;
