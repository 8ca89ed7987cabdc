pub mod config;
pub mod fingerprint;
pub mod result;

pub use config::{ConfigError, ScreenerConfig};
pub use fingerprint::query_fingerprint;
pub use result::{AnalysisResult, ErrorKind, PatentRecord, QueryInfo};
