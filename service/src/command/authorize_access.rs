//! [`Command`] for authorizing an [`Access`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::{access, member, Access, Member},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing an [`Access`] by its bearer [`access::Token`].
#[derive(Clone, Debug, From)]
pub struct AuthorizeAccess {
    /// [`access::Token`] to authorize.
    pub token: access::Token,
}

impl<Db> Command<AuthorizeAccess> for Service<Db>
where
    Db: Database<
        Select<By<Option<Member>, member::Id>>,
        Ok = Option<Member>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Access;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeAccess,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeAccess { token } = cmd;

        let access = jsonwebtoken::decode::<Access>(
            token.as_ref(),
            &self.config.jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        // Residents lose their access once their `Member` is deleted.
        if let Some(member_id) = access.member_id() {
            drop(
                self.database()
                    .execute(Select(By::new(member_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::MemberNotFound(member_id))
                    .map_err(tracerr::wrap!())?,
            );
        }

        Ok(access)
    }
}

/// Error of [`AuthorizeAccess`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`Member`] the [`Access`] belongs to does not exist.
    #[display("`Member(id: {_0})` does not exist")]
    #[from(ignore)]
    MemberNotFound(#[error(not(source))] member::Id),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use crate::{
        command::IssueAccessToken,
        domain::access::{Subject, Token},
        infra::Memory,
        testing, Command as _,
    };

    use super::{AuthorizeAccess, ExecutionError};

    #[tokio::test]
    async fn authorizes_issued_token() {
        let member = testing::member("101");
        let svc = testing::service(Memory::with_members([member.clone()]));
        let issued = svc
            .execute(IssueAccessToken {
                subject: Subject::Resident {
                    member_id: member.id,
                },
                ttl: Duration::from_secs(60),
            })
            .await
            .unwrap();

        let access = svc
            .execute(AuthorizeAccess::from(issued.token))
            .await
            .unwrap();

        assert_eq!(access.member_id(), Some(member.id));
        assert!(!access.is_admin());
    }

    #[tokio::test]
    async fn rejects_garbage_token() {
        let svc = testing::service(Memory::default());
        // SAFETY: Invalid on purpose.
        #[expect(unsafe_code, reason = "test")]
        let token = unsafe { Token::new_unchecked("garbage".into()) };

        let err = svc.execute(AuthorizeAccess::from(token)).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn rejects_token_of_deleted_member() {
        let member = testing::member("101");
        let db = Memory::with_members([member.clone()]);
        let issued = testing::service(db)
            .execute(IssueAccessToken {
                subject: Subject::Resident {
                    member_id: member.id,
                },
                ttl: Duration::from_secs(60),
            })
            .await
            .unwrap();
        let svc = testing::service(Memory::default());

        let err = svc
            .execute(AuthorizeAccess::from(issued.token))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::MemberNotFound(id) if *id == member.id,
        ));
    }
}
