//! Live workout sources.
//!
//! A [`WorkoutSource`] hands out pages of already-shaped workouts; [`fetch_all`]
//! walks the pages and returns one collection in the same newest-first order
//! the CSV builder produces, ready for [`crate::analytics`].

pub mod hevy;

use crate::api::logs::{log_info, log_success, LogStage};
use crate::error::SourceError;
use crate::models::{sort_newest_first, Workout};

pub use hevy::HevyClient;

/// One page of workouts.
#[derive(Debug, Clone, Default)]
pub struct WorkoutPage {
    /// 1-based page number.
    pub page: u32,
    pub page_count: u32,
    pub workouts: Vec<Workout>,
}

/// A paginated provider of workouts.
#[allow(async_fn_in_trait)]
pub trait WorkoutSource {
    /// Fetch a 1-based page.
    async fn fetch_page(&self, page: u32) -> Result<WorkoutPage, SourceError>;
}

/// Fetch pages until the source runs out or `max_pages` is reached.
pub async fn fetch_all<S: WorkoutSource>(
    source: &S,
    max_pages: Option<u32>,
) -> Result<Vec<Workout>, SourceError> {
    let mut workouts = Vec::new();
    let mut page = 1;

    loop {
        let batch = source.fetch_page(page).await?;
        let fetched = batch.workouts.len();
        workouts.extend(batch.workouts);
        log_info(
            LogStage::Fetch,
            format!("Page {}/{}: {} workouts", page, batch.page_count.max(page), fetched),
        );

        let limit_reached = max_pages.is_some_and(|max| page >= max);
        if fetched == 0 || page >= batch.page_count || limit_reached {
            break;
        }
        page += 1;
    }

    sort_newest_first(&mut workouts);
    log_success(LogStage::Fetch, format!("{} workouts fetched", workouts.len()));
    Ok(workouts)
}
