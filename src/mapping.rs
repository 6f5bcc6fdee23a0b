pub mod defaults;
pub mod event_map;
pub mod keywords;
pub mod store;

pub use event_map::{AxisMap, EventMap, Mapping, OutCode};
pub use store::{MappingId, MappingStore};
