//! Headless entity list: faceted filters, their field adapters, the URL
//! state codec and the controller that turns all of it into list queries.

pub mod controller;
pub mod facet;
pub mod field;
pub mod params;
pub mod query;

pub use controller::{EntityListController, FetchTicket, ListRow, ListStatus, LOAD_ERROR_TEXT, MAX_DISPLAY_COLUMNS};
pub use facet::{FacetBody, FacetEvent, FacetFooter, FacetOption, FacetProps, FacetRow, FacetView, FacetedFilter};
pub use field::{FieldOptionsState, FilterField};
pub use params::ListParams;
pub use query::{FilterState, InstancesCache, QueryKey};
