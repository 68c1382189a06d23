//! Infrastructure layer.

pub mod database;

#[cfg(test)]
pub use self::database::memory::Memory;
pub use self::database::Database;
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
