pub mod client;
pub mod config;
pub mod harvest;
pub mod logging;
pub mod model;
pub mod pacing;
pub mod storage;
pub mod traits;

// Re-export common types for convenience
pub use client::GrantsApiClient;
pub use config::*;
pub use harvest::{
    CollectError, DetailHarvester, HarvestError, HarvestPipeline, HarvestReport, HarvestStage,
    IdentifierCollector, MimeTypeCounts, PipelineError, PipelineResult, PipelineStats,
    StatisticsAccumulator, StatisticsSummary,
};
pub use model::*;
pub use pacing::*;
pub use storage::*;
pub use traits::*;
