pub mod csv_loader;

pub use csv_loader::{download_orders, parse_orders};
