//! [`Command`] for deleting a [`Member`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Bill;
use crate::{
    domain::{member, Member},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for deleting a [`Member`] having no [`Bill`]s.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteMember {
    /// ID of the [`Member`] to delete.
    pub member_id: member::Id,
}

impl<Db> Command<DeleteMember> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Member, member::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Member>, member::Id>>,
            Ok = Option<Member>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::member::HasBills, member::Id>>,
            Ok = read::member::HasBills,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Member, member::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    /// Deleted [`Member`].
    type Ok = Member;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteMember) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteMember { member_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid billing the `Member` while it's being deleted.
        tx.execute(Lock(By::new(member_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let member = tx
            .execute(Select(By::<Option<Member>, _>::new(member_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::MemberNotFound(member_id))
            .map_err(tracerr::wrap!())?;

        let has_bills = tx
            .execute(Select(By::<read::member::HasBills, _>::new(member_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if *has_bills {
            return Err(tracerr::new!(E::MemberHasBills(member_id)));
        }

        tx.execute(Delete(By::new(member_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(member)
    }
}

/// Error of [`DeleteMember`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Member`] has [`Bill`]s issued, so cannot be deleted.
    #[display("`Member(id: {_0})` has bills")]
    #[from(ignore)]
    MemberHasBills(#[error(not(source))] member::Id),

    /// [`Member`] with the provided ID does not exist.
    #[display("`Member(id: {_0})` does not exist")]
    #[from(ignore)]
    MemberNotFound(#[error(not(source))] member::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        infra::Memory,
        testing, Command as _,
    };

    use super::{DeleteMember, ExecutionError};

    #[tokio::test]
    async fn deletes_unbilled_member() {
        let member = testing::member("101");
        let svc = testing::service(Memory::with_members([member.clone()]));

        let deleted =
            svc.execute(DeleteMember::from(member.id)).await.unwrap();

        assert_eq!(deleted.id, member.id);
        let err = svc
            .execute(DeleteMember::from(member.id))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::MemberNotFound(_)));
    }

    #[tokio::test]
    async fn refuses_billed_member() {
        let member = testing::member("101");
        let db = Memory::with_members([member.clone()]);
        db.put_bill(testing::bill(&member, 1, 2024));
        let svc = testing::service(db);

        let err = svc
            .execute(DeleteMember::from(member.id))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::MemberHasBills(id) if *id == member.id,
        ));
    }
}
