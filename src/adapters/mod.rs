// Adapters layer: concrete implementations for external systems (sheets, places API, browser).

pub mod csv_sheet;
pub mod places;
pub mod sheets;
pub mod webdriver;
