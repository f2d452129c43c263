//! Harvest module - the two pipeline stages and their coordination.
//!
//! - **Traits**: [`HarvestStage`] and the stage error types
//! - **Collector**: [`IdentifierCollector`] pages through the search endpoint
//! - **Details**: [`DetailHarvester`] fetches, filters and counts attachments
//! - **Stats**: [`StatisticsAccumulator`] and the persisted [`StatisticsSummary`]
//! - **Pipeline**: [`HarvestPipeline`] runs both stages in one process

pub mod collector;
pub mod details;
pub mod pipeline;
pub mod stats;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use collector::IdentifierCollector;
pub use details::{DetailHarvester, HarvestReport};
pub use pipeline::{HarvestPipeline, PipelineError, PipelineResult, PipelineStats};
pub use stats::{MimeTypeCounts, StatisticsAccumulator, StatisticsSummary};
pub use traits::{CollectError, HarvestError, HarvestStage};
