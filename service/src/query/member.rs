//! [`Query`] collection related to a single [`Member`].

use common::operations::By;

use crate::domain::{member, Member};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Member`] by its [`member::Id`].
pub type ById = DatabaseQuery<By<Option<Member>, member::Id>>;
