mod aggregator;
mod report;
mod storage;
mod window;
#[cfg(test)]
mod tests;

pub use aggregator::{EventKind, RecognitionEvent, StatsAggregator};
pub use report::{KindReport, SessionDuration, StatsReport};
pub use storage::{JsonFileStore, MemoryStatsStore, StatsStore};
pub use window::FrequencyWindow;
