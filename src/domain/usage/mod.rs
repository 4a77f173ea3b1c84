// Usage tracking module
// Local capped history plus the best-effort remote usage report

pub mod log;
pub mod record;
pub mod recorder;

pub use log::{UsageLog, MAX_USAGE_RECORDS, USAGE_LOG_KEY};
pub use record::UsageRecord;
pub use recorder::UsageRecorder;
