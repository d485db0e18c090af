use chrono::{DateTime, Timelike};
use tracing::{debug, warn};

use crate::models::{Dataset, EnrichedRecord, VideoRecord};

/// Cleaning / type coercion: trim titles, parse `publish_time`, attach the
/// detected language. Rows whose timestamp cannot be parsed are dropped.
pub fn clean_records(videos: Vec<VideoRecord>, languages: Vec<String>) -> Dataset {
    debug_assert_eq!(videos.len(), languages.len());
    let before = videos.len();

    let mut out = Vec::with_capacity(before);
    for (mut video, language) in videos.into_iter().zip(languages) {
        video.title = video.title.trim().to_string();
        match DateTime::parse_from_rfc3339(video.publish_time.trim()) {
            Ok(ts) => out.push(EnrichedRecord::from_video(video, ts, language)),
            Err(e) => {
                warn!(
                    "Dropping video with unparseable publish_time - video_id={}, region={}, publish_time={:?}: {}",
                    video.video_id, video.region, video.publish_time, e
                );
            }
        }
    }

    let dropped = before - out.len();
    if dropped > 0 {
        warn!("Cleaning - dropped={} rows, retained={}", dropped, out.len());
    } else {
        debug!("Cleaning - all {} rows retained", out.len());
    }
    out
}

/// Derive `publish_hour` and the engagement ratios, then clear out
/// non-finite ratios across the whole table.
pub fn derive_features(dataset: &mut Dataset) {
    for r in dataset.iter_mut() {
        r.publish_hour = r.publish_time.hour();

        let views = r.views as f64;
        r.like_ratio = r.likes as f64 / views;
        r.comment_ratio = r.comment_count as f64 / views;
        r.engagement_score = (r.likes as f64 + r.comment_count as f64) / views;
    }
    normalize_non_finite(dataset);
}

/// NaN and ±inf (views == 0) become 0.
pub fn normalize_non_finite(dataset: &mut Dataset) {
    let mut replaced = 0usize;
    for r in dataset.iter_mut() {
        for v in [&mut r.like_ratio, &mut r.comment_ratio, &mut r.engagement_score] {
            if !v.is_finite() {
                *v = 0.0;
                replaced += 1;
            }
        }
    }
    if replaced > 0 {
        debug!("Normalized non-finite ratio values - count={}", replaced);
    }
}
