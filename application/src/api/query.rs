//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, read, Query as _};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";

    /// Lists [`api::Bill`]s passing the provided filter.
    pub(crate) async fn bills_by(
        filter: read::bill::list::Filter,
        ctx: &Context,
    ) -> Result<Vec<api::Bill>, Error> {
        ctx.service()
            .execute(query::bills::List::by(filter))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|bills| bills.into_iter().map(Into::into).collect())
    }

    /// Summarizes [`api::Bill`]s of the provided member, or all of them.
    async fn summary_by(
        member_id: Option<api::member::Id>,
        ctx: &Context,
    ) -> Result<api::bill::Summary, Error> {
        ctx.service()
            .execute(query::bills::Summary::by(member_id.map(Into::into)))
            .await
            .map_err(AsError::into_error)
            .and_then(TryInto::try_into)
            .map_err(ctx.error())
    }
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `Member` record of the currently authenticated resident.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_RESIDENT` - the current access doesn't belong to a resident.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myMember",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_member(ctx: &Context) -> Result<api::Member, Error> {
        let my_id = ctx.resident_id().await?;
        #[expect(unsafe_code, reason = "existence is checked on authorization")]
        let member = unsafe { api::Member::new_unchecked(my_id) };
        Ok(member)
    }

    /// Returns the `Member` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `MEMBER_NOT_FOUND` - the `Member` with the specified ID does not
    ///                        exist;
    /// - `NOT_OWNER` - the current resident tries to access another
    ///                 `Member`.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "member",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn member(
        id: api::member::Id,
        ctx: &Context,
    ) -> Result<api::Member, Error> {
        _ = ctx.ensure_allowed(id.into()).await?;

        ctx.service()
            .execute(query::member::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::member::MemberError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists all the `Member`s of the society ordered by their flats.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_ADMIN` - the current access doesn't belong to the
    ///                 administration.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "members",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn members(ctx: &Context) -> Result<Vec<api::Member>, Error> {
        _ = ctx.admin_access().await?;

        ctx.service()
            .execute(query::members::List::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|members| members.into_iter().map(Into::into).collect())
    }

    /// Returns the `Bill` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BILL_NOT_FOUND` - the `Bill` with the specified ID does not exist;
    /// - `NOT_OWNER` - the `Bill` is issued to another `Member`.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "bill",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn bill(
        id: api::bill::Id,
        ctx: &Context,
    ) -> Result<api::Bill, Error> {
        let bill = ctx
            .service()
            .execute(query::bill::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::bill::BillError::NotExists.into())
            .map_err(ctx.error())?;
        _ = ctx.ensure_allowed(bill.member_id).await?;

        Ok(bill.into())
    }

    /// Lists `Bill`s, the latest billing period first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_ADMIN` - the current access doesn't belong to the
    ///                 administration.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "bills",
            member_id = ?member_id.map(|id| id.to_string()),
            otel.name = Self::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn bills(
        status: Option<api::bill::Status>,
        member_id: Option<api::member::Id>,
        ctx: &Context,
    ) -> Result<Vec<api::Bill>, Error> {
        _ = ctx.admin_access().await?;

        Self::bills_by(
            read::bill::list::Filter {
                member_id: member_id.map(Into::into),
                status: status.map(Into::into),
            },
            ctx,
        )
        .await
    }

    /// Lists `Bill`s of the currently authenticated resident, the latest
    /// billing period first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_RESIDENT` - the current access doesn't belong to a resident.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myBills",
            otel.name = Self::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn my_bills(
        status: Option<api::bill::Status>,
        ctx: &Context,
    ) -> Result<Vec<api::Bill>, Error> {
        let my_id = ctx.resident_id().await?;

        Self::bills_by(
            read::bill::list::Filter {
                member_id: Some(my_id),
                status: status.map(Into::into),
            },
            ctx,
        )
        .await
    }

    /// Returns the latest `Bill` of the specified `Member`, if any.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_OWNER` - the current resident tries to access another
    ///                 `Member`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "latestBill",
            member_id = %member_id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn latest_bill(
        member_id: api::member::Id,
        ctx: &Context,
    ) -> Result<Option<api::Bill>, Error> {
        #[expect(unsafe_code, reason = "absent `Member` has no bills")]
        let member = unsafe { api::Member::new_unchecked(member_id) };
        member.latest_bill(ctx).await
    }

    /// Returns the summary over the `Bill`s of the whole society, or of the
    /// specified `Member` only.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_ADMIN` - the current access doesn't belong to the
    ///                 administration.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "billingSummary",
            member_id = ?member_id.map(|id| id.to_string()),
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn billing_summary(
        member_id: Option<api::member::Id>,
        ctx: &Context,
    ) -> Result<api::bill::Summary, Error> {
        _ = ctx.admin_access().await?;

        Self::summary_by(member_id, ctx).await
    }

    /// Returns the summary over the `Bill`s of the currently authenticated
    /// resident.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_RESIDENT` - the current access doesn't belong to a resident.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myBillingSummary",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_billing_summary(
        ctx: &Context,
    ) -> Result<api::bill::Summary, Error> {
        let my_id = ctx.resident_id().await?;

        Self::summary_by(Some(my_id.into()), ctx).await
    }
}
