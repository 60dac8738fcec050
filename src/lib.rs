// Lotto draw history: fetch per-day results and export them to CSV
pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod harvest;
pub mod types;
pub mod utils;

pub use api::*;
pub use config::Config;
pub use error::*;
pub use export::*;
pub use harvest::*;
pub use types::*;
pub use utils::*;
