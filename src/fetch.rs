use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::api_types::ApiVideoListResponse;
use crate::models::VideoRecord;

/// Hard upper bound the API accepts for `maxResults`.
pub const MAX_RESULTS_CAP: u32 = 50;

/// Anything that can produce one region's trending list.
#[async_trait]
pub trait TrendingSource {
    async fn fetch_region(&self, region: &str, max_results: u32) -> Result<Vec<VideoRecord>>;
}

/// YouTube Data API v3 `videos.list?chart=mostPopular`.
pub struct YouTubeClient {
    client: Client,
    api_base: Url,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(api_base: Url, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client, api_base, api_key })
    }

    fn videos_url(&self, region: &str, max_results: u32) -> Result<Url> {
        let mut url = self.api_base.join("videos").context("joining videos endpoint")?;
        url.query_pairs_mut()
            .append_pair("part", "snippet,statistics")
            .append_pair("chart", "mostPopular")
            .append_pair("regionCode", region)
            .append_pair("maxResults", &clamp_max_results(max_results).to_string())
            .append_pair("key", &self.api_key);
        Ok(url)
    }
}

#[async_trait]
impl TrendingSource for YouTubeClient {
    async fn fetch_region(&self, region: &str, max_results: u32) -> Result<Vec<VideoRecord>> {
        let url = self.videos_url(region, max_results)?;

        // without_url(): the query string carries the API key
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("request failed for region {}", region))?;

        let resp = resp
            .error_for_status()
            .map_err(|e| e.without_url())
            .with_context(|| format!("HTTP error for region {}", region))?;

        let body: ApiVideoListResponse = resp
            .json()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("decoding JSON for region {}", region))?;

        Ok(map_response(region, body))
    }
}

pub fn clamp_max_results(max_results: u32) -> u32 {
    max_results.clamp(1, MAX_RESULTS_CAP)
}

/// Flatten an API page into uniform records tagged with `region`.
pub fn map_response(region: &str, body: ApiVideoListResponse) -> Vec<VideoRecord> {
    body.items
        .into_iter()
        .map(|item| VideoRecord {
            video_id: item.id,
            title: item.snippet.title,
            category_id: item.snippet.category_id,
            publish_time: item.snippet.published_at,
            views: item.statistics.view_count,
            likes: item.statistics.like_count,
            comment_count: item.statistics.comment_count,
            region: region.to_string(),
        })
        .collect()
}

/// Outcome of a full multi-region pass.
#[derive(Debug, Default)]
pub struct FetchSummary {
    pub records: Vec<VideoRecord>,
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
}

/// Fetch every region in order, one at a time, pausing `delay` between calls.
///
/// A failing region is logged and contributes nothing; it never aborts the pass.
pub async fn fetch_all_regions<S>(source: &S, regions: &[String], max_results: u32, delay: Duration) -> FetchSummary
where
    S: TrendingSource + ?Sized,
{
    let start = Instant::now();
    let max_results = clamp_max_results(max_results);
    let mut summary = FetchSummary::default();

    for (i, region) in regions.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let region_start = Instant::now();
        debug!("Fetching region - region={}, max_results={}", region, max_results);

        match source.fetch_region(region, max_results).await {
            Ok(videos) if videos.is_empty() => {
                warn!("Region returned no videos - region={}", region);
                summary.succeeded.push(region.clone());
            }
            Ok(videos) => {
                info!(
                    "Fetched region - region={}, videos={}, duration={:.2}s",
                    region,
                    videos.len(),
                    region_start.elapsed().as_secs_f32()
                );
                summary.succeeded.push(region.clone());
                summary.records.extend(videos);
            }
            Err(e) => {
                warn!("Skipping region {}: {:#}", region, e);
                summary.failed.push(region.clone());
            }
        }
    }

    info!(
        "Region fetch completed - duration={:.2}s, videos={}, succeeded={}, failed={}",
        start.elapsed().as_secs_f32(),
        summary.records.len(),
        summary.succeeded.len(),
        summary.failed.len()
    );
    summary
}
