// src/api/pagination.rs
//! Cursor pagination driven by async closures.

use crate::constants::NOTION_API_PAGE_SIZE;
use crate::error::AppError;
use crate::model::Paginated;

/// Fetches every page of a cursor-paginated list.
///
/// `fetch_page` receives the page size and the cursor of the page to fetch.
/// The cursor only lives for the duration of this call. Stops after
/// `max_pages` pages when a limit is given.
pub async fn fetch_all_pages<T, F, Fut>(
    mut fetch_page: F,
    max_pages: Option<u32>,
) -> Result<Vec<T>, AppError>
where
    F: FnMut(u32, Option<String>) -> Fut,
    Fut: std::future::Future<Output = Result<Paginated<T>, AppError>>,
{
    let mut all_items = Vec::new();
    let mut cursor = None;
    let mut pages_fetched = 0u32;

    loop {
        if let Some(max) = max_pages {
            if pages_fetched >= max {
                log::debug!("Reached maximum page limit: {}", max);
                break;
            }
        }

        let page = fetch_page(NOTION_API_PAGE_SIZE, cursor).await?;
        pages_fetched += 1;
        all_items.extend(page.results);

        match page.next_cursor {
            Some(next) if page.has_more => cursor = Some(next),
            _ => break,
        }
    }

    log::debug!(
        "Fetched {} items over {} page(s)",
        all_items.len(),
        pages_fetched
    );
    Ok(all_items)
}
