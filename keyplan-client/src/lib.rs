pub mod error;
pub mod keywords;
pub mod planner;
pub mod result;

#[cfg(test)]
mod test_support;

pub use error::ClientError;
pub use keywords::{FetcherConfig, KeywordFetcher};
pub use planner::{PlannerConfig, TopicPlanner};
pub use result::{KeywordTable, TopicPlan};
