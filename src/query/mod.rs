//! Query engine: predicate composition, pagination, execution and
//! proximity search over loaded catalog records.

pub mod executor;
pub mod filter;
pub mod page;
pub mod proximity;
pub mod records;

pub use executor::{execute, top, Record};
pub use filter::{city_name_contains, DestinationCriteria, Filter, MAX_SEARCH_RADIUS_KM};
pub use page::{FetchPlan, Page, PageParams, SortDirection, SortField, Sortable};
pub use proximity::{search, Nearby, ProximityParams, ProximityQuery};
pub use records::{compare_popularity, CityRecord, CitySort, DestinationRecord, DestinationSort};
