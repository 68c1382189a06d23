//! [`Member`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{member, Member},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `members` table, in [`member_from_row()`] order.
const COLUMNS: &str = "id, name, flat_num, contact, email, kind, joined_at";

/// Builds a [`Member`] out of the provided `members` table [`Row`].
fn member_from_row(row: &Row) -> Member {
    Member {
        id: row.get("id"),
        name: row.get("name"),
        flat_num: row.get("flat_num"),
        contact: row.get("contact"),
        email: row.get("email"),
        kind: row.get("kind"),
        joined_at: row.get("joined_at"),
    }
}

impl<C> Database<Select<By<Option<Member>, member::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Member>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Member>, member::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: member::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM members \
             WHERE id = $1::UUID",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(member_from_row))
    }
}

impl<C> Database<Select<By<Vec<Member>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Member>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Member>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM members \
             ORDER BY flat_num, joined_at",
        );
        Ok(self
            .query(sql.as_str(), &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(member_from_row)
            .collect())
    }
}

impl<C> Database<Insert<Member>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(member): Insert<Member>,
    ) -> Result<Self::Ok, Self::Err> {
        let Member {
            id,
            name,
            flat_num,
            contact,
            email,
            kind,
            joined_at,
        } = member;

        const SQL: &str = "\
            INSERT INTO members (\
                id, name, flat_num, contact, email, kind, joined_at\
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, \
                $4::VARCHAR, $5::VARCHAR, \
                $6::INT2, $7::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[&id, &name, &flat_num, &contact, &email, &kind, &joined_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Member, member::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Member, member::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: member::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM members \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Member, member::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Member, member::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: member::Id = by.into_inner();

        // Row lock is held until the end of the current transaction.
        const SQL: &str = "\
            SELECT id \
            FROM members \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<read::member::HasBills, member::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::member::HasBills;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::member::HasBills, member::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let member_id: member::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM bills \
            WHERE member_id = $1::UUID \
            LIMIT 1";
        self.query_opt(SQL, &[&member_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|r| read::member::HasBills(r.is_some()))
    }
}
