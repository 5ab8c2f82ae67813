pub mod loaders;
pub mod order;

pub use loaders::{download_orders, parse_orders};
pub use order::OrderRecord;
