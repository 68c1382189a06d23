//! [`Access`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, FromStr};
use serde::{Deserialize, Serialize};

use crate::domain::member;
#[cfg(doc)]
use crate::domain::Member;

/// Granted access to the billing, carried by a [`Token`].
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Access {
    /// [`Subject`] this [`Access`] is granted to.
    #[serde(flatten)]
    pub subject: Subject,

    /// [`DateTime`] when this [`Access`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

impl Access {
    /// Indicates whether this [`Access`] belongs to the society
    /// administration.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.subject, Subject::Admin)
    }

    /// Returns ID of the [`Member`] this [`Access`] belongs to, if any.
    #[must_use]
    pub const fn member_id(&self) -> Option<member::Id> {
        match self.subject {
            Subject::Admin => None,
            Subject::Resident { member_id } => Some(member_id),
        }
    }

    /// Indicates whether this [`Access`] allows to act on behalf of the
    /// provided [`Member`].
    #[must_use]
    pub fn allows(&self, member_id: member::Id) -> bool {
        match self.subject {
            Subject::Admin => true,
            Subject::Resident { member_id: own } => own == member_id,
        }
    }
}

/// Holder of an [`Access`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Subject {
    /// Society administration, allowed to do everything.
    Admin,

    /// Resident, allowed to deal with the bills of their own [`Member`].
    Resident {
        /// ID of the [`Member`] record of the resident.
        #[serde(rename = "sub")]
        member_id: member::Id,
    },
}

/// Bearer token of an [`Access`].
#[derive(AsRef, Clone, Debug, Display, FromStr)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// [`DateTime`] of an [`Access`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Access, unit::Expiration)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use crate::domain::member;

    use super::{Access, Subject};

    #[test]
    fn admin_is_allowed_everything() {
        let access = Access {
            subject: Subject::Admin,
            expires_at: (DateTime::now() + Duration::from_secs(60)).coerce(),
        };

        assert!(access.is_admin());
        assert_eq!(access.member_id(), None);
        assert!(access.allows(member::Id::new()));
    }

    #[test]
    fn resident_is_allowed_own_member_only() {
        let own = member::Id::new();
        let access = Access {
            subject: Subject::Resident { member_id: own },
            expires_at: (DateTime::now() + Duration::from_secs(60)).coerce(),
        };

        assert!(!access.is_admin());
        assert_eq!(access.member_id(), Some(own));
        assert!(access.allows(own));
        assert!(!access.allows(member::Id::new()));
    }
}
