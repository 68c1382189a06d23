//! [`Command`] for registering a new [`Member`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime,
};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::member::{Email, FlatNum, Kind, Name, Phone};
use crate::{
    domain::{member, Member},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for registering a new [`Member`] in the society.
#[derive(Clone, Debug)]
pub struct RegisterMember {
    /// [`Name`] of a new [`Member`].
    pub name: member::Name,

    /// [`FlatNum`] a new [`Member`] lives in.
    pub flat_num: member::FlatNum,

    /// Contact [`Phone`] of a new [`Member`].
    pub contact: Option<member::Phone>,

    /// [`Email`] of a new [`Member`].
    pub email: Option<member::Email>,

    /// [`Kind`] of a new [`Member`].
    pub kind: member::Kind,
}

impl<Db> Command<RegisterMember> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Member>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Member;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RegisterMember,
    ) -> Result<Self::Ok, Self::Err> {
        let RegisterMember {
            name,
            flat_num,
            contact,
            email,
            kind,
        } = cmd;

        let member = Member {
            id: member::Id::new(),
            name,
            flat_num,
            contact,
            email,
            kind,
            joined_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;
        tx.execute(Insert(member.clone()))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        Ok(member)
    }
}

/// Error of [`RegisterMember`] [`Command`] execution.
pub type ExecutionError = database::Error;

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        domain::{member, Member},
        infra::{Database as _, Memory},
        testing,
    };

    use super::RegisterMember;

    #[tokio::test]
    async fn registers_member() {
        let svc = testing::service(Memory::default());

        let member = svc
            .execute(RegisterMember {
                name: member::Name::new("Asha Rao").unwrap(),
                flat_num: member::FlatNum::new("104").unwrap(),
                contact: member::Phone::new("9876543210"),
                email: member::Email::new("asha@example.com"),
                kind: member::Kind::Tenant,
            })
            .await
            .unwrap();

        let stored: Option<Member> = svc
            .database()
            .execute(Select(By::<Option<Member>, _>::new(member.id)))
            .await
            .unwrap();
        let stored = stored.unwrap();
        assert_eq!(stored.flat_num.to_string(), "104");
        assert_eq!(stored.kind, member::Kind::Tenant);
        assert!(stored.flat_num.has_parking());
    }
}
