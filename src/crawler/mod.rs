//! Crawler module for article fetching and aggregation
//!
//! This module contains the core crawling logic, including:
//! - Content API queries with pagination and retry logic
//! - Word and link extraction from fetched pages
//! - A bounded worker pool for fetch tasks
//! - Overall job coordination

mod coordinator;
mod fetcher;
mod parser;
mod pool;

pub use coordinator::Coordinator;
pub use fetcher::{
    backoff_delay, build_http_client, build_query, merge_continuation, rate_limit_delay,
    retry_after_secs, tokio_sleeper, Fetcher, Page, PageLink, PageProp, Sleeper,
};
pub use parser::{collect_links, count_page_words, count_words};
pub use pool::{TaskFailure, WorkerPool};

use crate::config::Config;
use crate::state::JobResult;
use crate::{RippleError, UNKNOWN_ERROR};

/// Runs a complete crawl for one article
///
/// This is the main entry point for a one-shot crawl. It will:
/// 1. Build the engine from the configuration
/// 2. Submit the job
/// 3. Wait for its terminal result
/// 4. Clean the job up
///
/// # Arguments
///
/// * `config` - The engine configuration
/// * `article` - Title of the seed article
/// * `depth` - Number of link hops to follow (0 = seed only)
///
/// # Returns
///
/// * `Ok(JobResult)` - The job's terminal result, success or failure
/// * `Err(RippleError)` - The engine could not be built
pub async fn crawl(config: &Config, article: &str, depth: u32) -> Result<JobResult, RippleError> {
    let coordinator = Coordinator::new(config)?;
    let key = coordinator.submit(article, depth);

    let result = coordinator.wait(key).await.unwrap_or_else(|| JobResult::Failure {
        error: UNKNOWN_ERROR.to_string(),
    });
    coordinator.cleanup(key);

    Ok(result)
}
