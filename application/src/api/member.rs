//! [`Member`]-related definitions.

use std::future;

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query, read, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    define_error, AsError, Context, Error,
};

/// A member of the society.
#[derive(Clone, Debug, From)]
pub struct Member {
    /// ID of this [`Member`].
    pub id: Id,

    /// [`domain::Member`] representing this [`Member`].
    member: OnceCell<domain::Member>,
}

impl From<domain::Member> for Member {
    fn from(member: domain::Member) -> Self {
        Self {
            id: member.id.into(),
            member: OnceCell::new_with(Some(member)),
        }
    }
}

impl Member {
    /// Creates a new [`Member`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Member`] with the provided ID exists,
    /// otherwise accessing this [`Member`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            member: OnceCell::new(),
        }
    }

    /// Returns the [`domain::Member`] representing this [`Member`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Member`] doesn't exist.
    async fn member(&self, ctx: &Context) -> Result<&domain::Member, Error> {
        let id = self.id.into();
        self.member
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::member::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|m| {
                        future::ready(
                            m.ok_or_else(|| MemberError::NotExists.into())
                                .map_err(ctx.error()),
                        )
                    })
            })
            .await
    }
}

/// A member of the society, either an owner or a tenant of a flat.
#[graphql_object(context = Context)]
impl Member {
    /// Unique identifier of this `Member`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Member.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Name of this `Member`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Member.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.member(ctx).await?.name.clone().into())
    }

    /// Flat this `Member` lives in.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Member.flatNum",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn flat_num(&self, ctx: &Context) -> Result<FlatNum, Error> {
        Ok(self.member(ctx).await?.flat_num.clone().into())
    }

    /// Indicator whether the flat of this `Member` has a parking slot, so is
    /// charged a parking fee.
    pub async fn has_parking(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.member(ctx).await?.flat_num.has_parking())
    }

    /// Contact phone of this `Member`.
    pub async fn contact(
        &self,
        ctx: &Context,
    ) -> Result<Option<Phone>, Error> {
        Ok(self.member(ctx).await?.contact.clone().map(Into::into))
    }

    /// Email of this `Member`.
    pub async fn email(&self, ctx: &Context) -> Result<Option<Email>, Error> {
        Ok(self.member(ctx).await?.email.clone().map(Into::into))
    }

    /// Kind of this `Member`.
    pub async fn kind(&self, ctx: &Context) -> Result<Kind, Error> {
        Ok(self.member(ctx).await?.kind.into())
    }

    /// `DateTime` when this `Member` joined the society.
    pub async fn joined_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.member(ctx).await?.joined_at.coerce())
    }

    /// Latest `Bill` of this `Member`, if any was generated.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_OWNER` - the current resident is not this `Member`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Member.latestBill",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn latest_bill(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::Bill>, Error> {
        _ = ctx.ensure_allowed(self.id.into()).await?;

        ctx.service()
            .execute(query::bill::Latest::by(self.id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|b| b.map(|read::bill::Latest(b)| b.into()))
    }

    /// `Bill`s of this `Member`, the latest period first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_OWNER` - the current resident is not this `Member`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Member.bills",
            otel.name = api::Query::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn bills(
        &self,
        status: Option<api::bill::Status>,
        ctx: &Context,
    ) -> Result<Vec<api::Bill>, Error> {
        _ = ctx.ensure_allowed(self.id.into()).await?;

        api::Query::bills_by(
            read::bill::list::Filter {
                member_id: Some(self.id.into()),
                status: status.map(Into::into),
            },
            ctx,
        )
        .await
    }
}

/// Unique identifier of a `Member`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::member::Id)]
#[into(domain::member::Id)]
#[graphql(name = "MemberId", transparent)]
pub struct Id(Uuid);

/// Name of a `Member`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "MemberName",
    with = scalar::Via::<domain::member::Name>,
)]
pub struct Name(domain::member::Name);

/// Number of a flat in the society, like `101`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "FlatNum",
    with = scalar::Via::<domain::member::FlatNum>,
)]
pub struct FlatNum(domain::member::FlatNum);

/// Contact phone of a `Member`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "MemberPhone",
    with = scalar::Via::<domain::member::Phone>,
)]
pub struct Phone(domain::member::Phone);

/// Email of a `Member`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "MemberEmail",
    with = scalar::Via::<domain::member::Email>,
)]
pub struct Email(domain::member::Email);

/// Kind of a `Member`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "MemberKind")]
pub enum Kind {
    /// Owner of the flat.
    Owner,

    /// Tenant renting the flat.
    Tenant,
}

impl From<domain::member::Kind> for Kind {
    fn from(kind: domain::member::Kind) -> Self {
        use domain::member::Kind as K;
        match kind {
            K::Owner => Self::Owner,
            K::Tenant => Self::Tenant,
        }
    }
}

impl From<Kind> for domain::member::Kind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Owner => Self::Owner,
            Kind::Tenant => Self::Tenant,
        }
    }
}

define_error! {
    enum MemberError {
        #[code = "MEMBER_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Member` with the specified ID does not exist"]
        NotExists,
    }
}
