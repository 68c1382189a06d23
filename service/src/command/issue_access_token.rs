//! [`Command`] for issuing an [`access::Token`].

use std::time::Duration;

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        access::{self, Subject},
        member, Access, Member,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for issuing an [`access::Token`] to the provided [`Subject`].
#[derive(Clone, Copy, Debug)]
pub struct IssueAccessToken {
    /// [`Subject`] to grant an [`Access`] to.
    pub subject: Subject,

    /// [`Duration`] the issued [`Access`] stays valid for.
    pub ttl: Duration,
}

/// Output of [`IssueAccessToken`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Issued [`access::Token`].
    pub token: access::Token,

    /// [`Access`] encoded into the [`access::Token`].
    pub access: Access,
}

impl<Db> Command<IssueAccessToken> for Service<Db>
where
    Db: Database<
        Select<By<Option<Member>, member::Id>>,
        Ok = Option<Member>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: IssueAccessToken,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let IssueAccessToken { subject, ttl } = cmd;

        if let Subject::Resident { member_id } = subject {
            drop(
                self.database()
                    .execute(Select(By::new(member_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::MemberNotFound(member_id))
                    .map_err(tracerr::wrap!())?,
            );
        }

        let access = Access {
            subject,
            expires_at: (DateTime::now() + ttl).coerce(),
        };
        let token = jsonwebtoken::encode::<Access>(
            &jsonwebtoken::Header::default(),
            &access,
            &self.config.jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `access::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { access::Token::new_unchecked(token) };

        Ok(Output { token, access })
    }
}

/// Error of [`IssueAccessToken`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`Member`] to issue the [`access::Token`] for does not exist.
    #[display("`Member(id: {_0})` does not exist")]
    #[from(ignore)]
    MemberNotFound(#[error(not(source))] member::Id),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use crate::{
        domain::{access::Subject, member},
        infra::Memory,
        testing, Command as _,
    };

    use super::{ExecutionError, IssueAccessToken};

    #[tokio::test]
    async fn issues_admin_token() {
        let svc = testing::service(Memory::default());

        let out = svc
            .execute(IssueAccessToken {
                subject: Subject::Admin,
                ttl: Duration::from_secs(3600),
            })
            .await
            .unwrap();

        assert!(out.access.is_admin());
        assert!(!out.token.as_ref().is_empty());
    }

    #[tokio::test]
    async fn refuses_unknown_member() {
        let svc = testing::service(Memory::default());
        let member_id = member::Id::new();

        let err = svc
            .execute(IssueAccessToken {
                subject: Subject::Resident { member_id },
                ttl: Duration::from_secs(60),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::MemberNotFound(id) if *id == member_id,
        ));
    }
}
