use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::models::{Dataset, EnrichedRecord};

/// Output columns, in order. Readers depend on both names and order.
pub const COLUMNS: [&str; 15] = [
    "video_id",
    "title",
    "category_id",
    "publish_time",
    "views",
    "likes",
    "comment_count",
    "region",
    "language",
    "publish_hour",
    "like_ratio",
    "comment_ratio",
    "engagement_score",
    "title_sentiment",
    "viral",
];

/// Timestamp layout of the `publish_time` column, e.g. "2025-10-18 14:03:11+00:00".
pub const PUBLISH_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

fn to_row(r: &EnrichedRecord) -> [String; 15] {
    [
        r.video_id.clone(),
        r.title.clone(),
        r.category_id.clone(),
        r.publish_time.format(PUBLISH_TIME_FORMAT).to_string(),
        r.views.to_string(),
        r.likes.to_string(),
        r.comment_count.to_string(),
        r.region.clone(),
        r.language.clone(),
        r.publish_hour.to_string(),
        r.like_ratio.to_string(),
        r.comment_ratio.to_string(),
        r.engagement_score.to_string(),
        r.title_sentiment.to_string(),
        r.viral.to_string(),
    ]
}

/// Write into a temp file beside `path`, then rename over it. Readers see
/// either the previous file or the complete new one.
fn write_atomic<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("create {:?}", dir))?;

    let mut tmp = NamedTempFile::new_in(dir).with_context(|| format!("temp file in {:?}", dir))?;
    fill(&mut tmp)?;
    tmp.as_file().sync_all().context("sync temp file")?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("replace {:?}", path))?;
    Ok(())
}

/// Persist the full table as CSV, replacing any previous run's file.
pub fn write_dataset(path: &Path, dataset: &Dataset) -> Result<()> {
    write_atomic(path, |tmp| {
        let mut w = csv::Writer::from_writer(tmp.as_file_mut());
        w.write_record(COLUMNS)?;
        for r in dataset {
            w.write_record(to_row(r))?;
        }
        w.flush()?;
        Ok(())
    })?;
    debug!("Wrote dataset - path={}, rows={}", path.display(), dataset.len());
    Ok(())
}

pub fn write_json_atomic<T: ?Sized + Serialize>(path: &Path, value: &T) -> Result<()> {
    write_atomic(path, |tmp| {
        let bytes = serde_json::to_vec_pretty(value)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        Ok(())
    })
}
