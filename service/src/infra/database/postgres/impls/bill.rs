//! [`Bill`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        bill::{self, Charges, Payment, Period},
        member, Bill,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `bills` table, as read by [`bill_from_row()`].
const COLUMNS: &str = "\
    id, number, member_id, month, year, \
    maintenance, sinking_fund, parking_fee, water, electricity, garbage, \
    late_fee, discount, subtotal, total, \
    due_date, status, \
    paid_date, payment_method, transaction_id, remarks, \
    created_at";

/// Builds a [`Bill`] out of the provided `bills` table [`Row`].
///
/// Missing amounts are read as zero.
fn bill_from_row(row: &Row) -> Bill {
    let money =
        |col: &str| row.get::<_, Option<Money>>(col).unwrap_or_default();

    let month = u8::try_from(row.get::<_, i16>("month"))
        .expect("`month` overflow");
    Bill {
        id: row.get("id"),
        number: row.get("number"),
        member_id: row.get("member_id"),
        period: Period::new(month, row.get("year"))
            .expect("`bills` table checks the period"),
        charges: Charges {
            maintenance: money("maintenance"),
            sinking_fund: money("sinking_fund"),
            parking_fee: money("parking_fee"),
            water: money("water"),
            electricity: money("electricity"),
            garbage: money("garbage"),
            late_fee: money("late_fee"),
            discount: money("discount"),
        },
        subtotal: money("subtotal"),
        total: money("total"),
        due_date: row.get("due_date"),
        status: row.get("status"),
        payment: row.get::<_, Option<bill::PaymentDate>>("paid_date").map(
            |paid_on| Payment {
                paid_on,
                method: row.get("payment_method"),
                transaction_id: row.get("transaction_id"),
                remarks: row.get("remarks"),
            },
        ),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Bill>, bill::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Bill>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Bill>, bill::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: bill::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bills \
             WHERE id = $1::UUID",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(bill_from_row))
    }
}

impl<C> Database<Select<By<Option<Bill>, (member::Id, Period)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Bill>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Bill>, (member::Id, Period)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (member_id, period) = by.into_inner();
        let month = i16::from(u8::from(period.month));
        let year = i32::from(period.year);

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bills \
             WHERE member_id = $1::UUID \
               AND month = $2::INT2 \
               AND year = $3::INT4",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&member_id, &month, &year])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(bill_from_row))
    }
}

impl<C> Database<Select<By<Vec<Bill>, read::bill::list::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Bill>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Bill>, read::bill::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::bill::list::Filter { member_id, status } = by.into_inner();

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let mut conditions = vec![];
        if let Some(id) = &member_id {
            ps.push(id);
            conditions.push(format!("member_id = ${}::UUID", ps.len()));
        }
        if let Some(status) = &status {
            ps.push(status);
            conditions.push(format!("status = ${}::INT2", ps.len()));
        }

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bills \
             WHERE true {filtering} \
             ORDER BY year DESC, month DESC, created_at DESC",
            filtering = conditions
                .iter()
                .format_with(" ", |c, f| f(&format_args!("AND {c}"))),
        );
        Ok(self
            .query(sql.as_str(), &ps)
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(bill_from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Option<read::bill::Latest>, member::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<read::bill::Latest>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<read::bill::Latest>, member::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let member_id: member::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bills \
             WHERE member_id = $1::UUID \
             ORDER BY year DESC, month DESC \
             LIMIT 1",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&member_id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(|row| read::bill::Latest(bill_from_row(row))))
    }
}

impl<C> Database<Select<By<read::bill::Summary, Option<member::Id>>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::bill::Summary;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::bill::Summary, Option<member::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let member_id: Option<member::Id> = by.into_inner();

        const SQL: &str = "\
            SELECT COALESCE(SUM(total) FILTER (WHERE status = $1::INT2), 0) \
                       AS total_collected, \
                   COALESCE(SUM(total) FILTER (WHERE status <> $1::INT2), 0) \
                       AS pending_amount, \
                   COUNT(*) FILTER (WHERE status = $1::INT2) AS paid_count, \
                   COUNT(*) FILTER (WHERE status = $2::INT2) AS unpaid_count, \
                   COUNT(*) FILTER (WHERE status = $3::INT2) AS overdue_count \
            FROM bills \
            WHERE $4::UUID IS NULL OR member_id = $4::UUID";
        let row = self
            .query_opt(
                SQL,
                &[
                    &bill::Status::Paid,
                    &bill::Status::Unpaid,
                    &bill::Status::Overdue,
                    &member_id,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?;
        Ok(row.map_or_else(read::bill::Summary::default, |row| {
            read::bill::Summary {
                total_collected: row.get("total_collected"),
                pending_amount: row.get("pending_amount"),
                paid_count: row.get("paid_count"),
                unpaid_count: row.get("unpaid_count"),
                overdue_count: row.get("overdue_count"),
            }
        }))
    }
}

impl<C> Database<Insert<Bill>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(bill): Insert<Bill>,
    ) -> Result<Self::Ok, Self::Err> {
        let month = i16::from(u8::from(bill.period.month));
        let year = i32::from(bill.period.year);
        let Charges {
            maintenance,
            sinking_fund,
            parking_fee,
            water,
            electricity,
            garbage,
            late_fee,
            discount,
        } = bill.charges;

        const SQL: &str = "\
            INSERT INTO bills (\
                id, number, member_id, month, year, \
                maintenance, sinking_fund, parking_fee, \
                water, electricity, garbage, \
                late_fee, discount, subtotal, total, \
                due_date, status, created_at\
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::UUID, $4::INT2, $5::INT4, \
                $6::NUMERIC, $7::NUMERIC, $8::NUMERIC, \
                $9::NUMERIC, $10::NUMERIC, $11::NUMERIC, \
                $12::NUMERIC, $13::NUMERIC, $14::NUMERIC, $15::NUMERIC, \
                $16::DATE, $17::INT2, $18::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &bill.id,
                &bill.number,
                &bill.member_id,
                &month,
                &year,
                &maintenance,
                &sinking_fund,
                &parking_fee,
                &water,
                &electricity,
                &garbage,
                &late_fee,
                &discount,
                &bill.subtotal,
                &bill.total,
                &bill.due_date,
                &bill.status,
                &bill.created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<Bill>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(bill): Update<Bill>,
    ) -> Result<Self::Ok, Self::Err> {
        let Bill {
            id,
            charges,
            subtotal,
            total,
            status,
            payment,
            ..
        } = bill;
        let (paid_date, method, transaction_id, remarks) = payment
            .map(|p| {
                let Payment {
                    paid_on,
                    method,
                    transaction_id,
                    remarks,
                } = p;
                (Some(paid_on), Some(method), Some(transaction_id), remarks)
            })
            .unwrap_or_default();

        const SQL: &str = "\
            UPDATE bills \
            SET late_fee = $2::NUMERIC, \
                discount = $3::NUMERIC, \
                subtotal = $4::NUMERIC, \
                total = $5::NUMERIC, \
                status = $6::INT2, \
                paid_date = $7::DATE, \
                payment_method = $8::VARCHAR, \
                transaction_id = $9::VARCHAR, \
                remarks = $10::TEXT \
            WHERE id = $1::UUID";
        self.exec(
            SQL,
            &[
                &id,
                &charges.late_fee,
                &charges.discount,
                &subtotal,
                &total,
                &status,
                &paid_date,
                &method,
                &transaction_id,
                &remarks,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Bill, bill::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Bill, bill::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: bill::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM bills \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Bill, bill::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Bill, bill::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: bill::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM bills \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
