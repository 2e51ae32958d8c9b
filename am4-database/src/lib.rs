pub mod cache;
pub mod database;
pub mod error;
pub mod impls;
pub mod model;
pub mod store;

pub use cache::CacheService;
pub use database::{Database, MIGRATOR};
pub use error::{DbError, Result};
pub use model::user::{NewUser, Role, UserChanges, UserRecord};
pub use store::{Lookup, UserStore};
