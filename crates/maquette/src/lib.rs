mod factory;
pub use factory::SessionFactory;

mod identity_map;
pub use identity_map::IdentityMap;

mod instance;
pub use instance::{Draft, Instance, Ref};

mod query;
pub use query::Query;

mod relation;

mod session;
pub use session::Session;

pub use maquette_core::{driver, schema, stmt, Error, Result};
