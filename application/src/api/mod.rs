//! GraphQL API definitions.

pub mod bill;
pub mod member;
mod mutation;
mod query;
pub mod scalar;

use juniper::EmptySubscription;

use crate::{define_error, Context};

pub use self::{
    bill::Bill, member::Member, mutation::Mutation, query::Query,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

/// Creates a new [`Schema`].
#[must_use]
pub fn schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}

define_error! {
    enum PrivilegeError {
        #[code = "NOT_ADMIN"]
        #[status = FORBIDDEN]
        #[message = "Authenticated access must belong to the administration"]
        Admin,

        #[code = "NOT_OWNER"]
        #[status = FORBIDDEN]
        #[message = "Authenticated resident is not allowed to access other \
                     members"]
        Owner,

        #[code = "NOT_RESIDENT"]
        #[status = FORBIDDEN]
        #[message = "Authenticated access must belong to a resident"]
        Resident,
    }
}

#[cfg(test)]
mod spec {
    #[test]
    fn schema_exposes_billing_operations() {
        let sdl = super::schema().as_sdl();

        for field in [
            "generateBill(",
            "generateAllBills(",
            "payBill(",
            "sweepOverdueBills",
            "billingSummary(",
            "myBills(",
        ] {
            assert!(sdl.contains(field), "missing `{field}` in:\n{sdl}");
        }
    }
}
