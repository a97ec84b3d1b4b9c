pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{ReportError, ReportResult};
pub use types::{GroupKey, Row, Table, Value};
