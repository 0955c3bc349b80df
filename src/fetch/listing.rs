/// Photo listing client
///
/// Talks to the picsum.photos listing endpoint: one GET per page, nine
/// records at a time, server-side random ordering. A fresh batch starts
/// from a random page so the grid looks different every launch.

use std::time::Duration;

use rand::Rng;
use serde::Deserialize;

use super::FetchError;
use crate::gallery::data::PhotoRef;

/// Photos requested per listing page (one grid screen)
pub const PAGE_SIZE: usize = 9;

/// Highest page index picked for a fresh batch
const MAX_RANDOM_PAGE: u32 = 100;

/// How long a listing request may take before it counts as failed
const LISTING_TIMEOUT: Duration = Duration::from_secs(10);

const LISTING_BASE: &str = "https://picsum.photos/v2/list";

/// One record of the listing response.
///
/// Only the download URL feeds the rest of the app; id and author come
/// along for log lines.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingRecord {
    pub id: String,
    pub author: String,
    pub download_url: String,
}

/// Pick the page index for a fresh batch
pub fn random_page() -> u32 {
    rand::thread_rng().gen_range(1..=MAX_RANDOM_PAGE)
}

/// Build the listing URL for one page
fn listing_url(page: u32) -> String {
    format!(
        "{}?page={}&limit={}&order_by=random",
        LISTING_BASE, page, PAGE_SIZE
    )
}

/// Fetch one page of the random photo listing.
///
/// The body is parsed separately from the download so that malformed
/// JSON reports as a data-format error, not a transport error.
pub async fn fetch_listing(
    client: reqwest::Client,
    page: u32,
) -> Result<Vec<PhotoRef>, FetchError> {
    let url = listing_url(page);
    let body = super::download_bytes(&client, &url, LISTING_TIMEOUT).await?;
    let records = parse_listing(&body, &url)?;

    println!("📥 Listing page {}: {} photos", page, records.len());
    for record in &records {
        println!("  📸 #{} by {}", record.id, record.author);
    }

    Ok(records
        .into_iter()
        .map(|record| PhotoRef::new(record.download_url))
        .collect())
}

/// Decode a listing body into records
fn parse_listing(body: &[u8], url: &str) -> Result<Vec<ListingRecord>, FetchError> {
    serde_json::from_slice(body).map_err(|_| FetchError::DataFormat {
        url: url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_url_carries_page_size_and_order() {
        let url = listing_url(42);

        assert_eq!(
            url,
            "https://picsum.photos/v2/list?page=42&limit=9&order_by=random"
        );
    }

    #[test]
    fn test_random_page_stays_in_range() {
        for _ in 0..200 {
            let page = random_page();
            assert!((1..=MAX_RANDOM_PAGE).contains(&page));
        }
    }

    #[test]
    fn test_parse_listing_extracts_records() {
        let body = r#"[
            {
                "id": "0",
                "author": "Alejandro Escamilla",
                "width": 5616,
                "height": 3744,
                "url": "https://unsplash.com/photos/yC-Yzbqy7PY",
                "download_url": "https://picsum.photos/id/0/5616/3744"
            },
            {
                "id": "10",
                "author": "Paul Jarvis",
                "width": 2500,
                "height": 1667,
                "url": "https://unsplash.com/photos/6J--NXulQCs",
                "download_url": "https://picsum.photos/id/10/2500/1667"
            }
        ]"#;

        let records = parse_listing(body.as_bytes(), "test://listing").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "0");
        assert_eq!(records[1].author, "Paul Jarvis");
        assert_eq!(
            records[1].download_url,
            "https://picsum.photos/id/10/2500/1667"
        );
    }

    #[test]
    fn test_malformed_listing_is_a_data_format_error() {
        let result = parse_listing(b"<html>rate limited</html>", "test://listing");

        assert_eq!(
            result.unwrap_err(),
            FetchError::DataFormat {
                url: "test://listing".to_string()
            }
        );
    }
}
