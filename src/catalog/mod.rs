mod integrity;
mod load;
mod models;
mod schema;
mod store;

pub use integrity::{CatalogError, IntegrityProblem};
pub use load::load_catalog;
pub use models::TrackMetadata;
pub use schema::{SqlType, Table, TRACKS_TABLE};
pub use store::{CatalogRow, CatalogStore};
