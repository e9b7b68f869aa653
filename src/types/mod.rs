mod location;
mod lookup;
mod models;
mod query;
mod status;

pub use location::{HierarchyKind, LocationPath, LocationRef, PATH_SEPARATOR, Placement};
pub use lookup::{LookupKind, LookupRef};
pub use models::*;
pub use query::*;
pub use status::{StatusFilter, TicketStatus};
