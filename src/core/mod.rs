pub mod batch;
pub mod details;
pub mod ecoregion;
pub mod orchestrator;
pub mod reader;
pub mod resolver;

pub use crate::domain::model::{Ecoregions, LocationRecord, Lookup, PlaceDetail, PlaceId};
pub use crate::domain::ports::{BrowserLauncher, BrowserSession, RateLimiter, SheetSink, SheetSource};
pub use crate::utils::error::Result;
