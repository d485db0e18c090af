use std::path::PathBuf;

use anyhow::{bail, Result};
use itertools::Itertools;
use tracing::{debug, error, info, warn};

use crate::classifier::{train_and_evaluate, ClassifierReport};
use crate::config::Settings;
use crate::error::PipelineError;
use crate::features::{clean_records, derive_features};
use crate::fetch::{fetch_all_regions, TrendingSource};
use crate::label::label_viral;
use crate::language::{detect_language, UNKNOWN_LANGUAGE};
use crate::models::{Dataset, VideoRecord};
use crate::render::render_report;
use crate::sentiment::score_titles;
use crate::writer::{write_dataset, write_json_atomic};

/// What a successful run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub rows: usize,
    pub regions_succeeded: Vec<String>,
    pub regions_failed: Vec<String>,
    pub viral_threshold: f64,
    pub classifier: Option<ClassifierReport>,
    pub output_path: PathBuf,
    pub report_path: Option<PathBuf>,
}

/// Language → cleaning → features → sentiment → labels.
/// Returns the labeled table and the viral threshold.
pub fn enrich(videos: Vec<VideoRecord>) -> Result<(Dataset, f64)> {
    let languages: Vec<String> = videos.iter().map(|v| detect_language(&v.title)).collect();
    debug!(
        "Language detection - videos={}, unknown={}",
        languages.len(),
        languages.iter().filter(|l| l.as_str() == UNKNOWN_LANGUAGE).count()
    );

    let mut dataset = clean_records(videos, languages);
    if dataset.is_empty() {
        bail!("no usable rows left after cleaning");
    }

    derive_features(&mut dataset);
    score_titles(&mut dataset);

    let Some(threshold) = label_viral(&mut dataset) else {
        bail!("cannot compute viral threshold on an empty table");
    };
    Ok((dataset, threshold))
}

/// One full pipeline run. Nothing is written unless every stage before the
/// writer succeeded; classification problems are logged and skipped.
pub async fn run_pipeline<S>(source: &S, settings: &Settings) -> Result<RunSummary>
where
    S: TrendingSource + ?Sized,
{
    let pipeline_start = std::time::Instant::now();
    info!(
        "Pipeline started - regions={}, max_results={}, output={}",
        settings.regions.iter().join(","),
        settings.max_results,
        settings.output_path.display()
    );

    // 1) fetch every region; failures only cost that region
    let fetched = fetch_all_regions(source, &settings.regions, settings.max_results, settings.region_delay).await;
    if fetched.records.is_empty() {
        error!("No data fetched from any region - failed={}", fetched.failed.iter().join(","));
        return Err(PipelineError::NoRegionData { regions: settings.regions.iter().join(",") }.into());
    }
    if !fetched.failed.is_empty() {
        warn!("Continuing without regions: {}", fetched.failed.iter().join(","));
    }

    // 2) enrich + label
    let enrich_start = std::time::Instant::now();
    let (dataset, threshold) = enrich(fetched.records)?;
    info!(
        "Enrichment completed - duration={:.2}s, rows={}",
        enrich_start.elapsed().as_secs_f32(),
        dataset.len()
    );

    // 3) classifier: side information only
    let classifier = match train_and_evaluate(&dataset, &settings.classifier) {
        Ok(report) => {
            for line in render_report(&report).lines() {
                info!("{}", line);
            }
            Some(report)
        }
        Err(e) => {
            warn!("Classification skipped: {:#}", e);
            None
        }
    };

    // 4) persist
    write_dataset(&settings.output_path, &dataset)?;
    info!("Dataset written - path={}, rows={}", settings.output_path.display(), dataset.len());

    // the dataset is already published; a missing report must not fail the run
    let mut report_path = None;
    if let (Some(path), Some(report)) = (&settings.report_path, &classifier) {
        match write_json_atomic(path, report) {
            Ok(()) => {
                debug!("Wrote classifier report - path={}", path.display());
                report_path = Some(path.clone());
            }
            Err(e) => warn!("Classifier report not written - path={}: {:#}", path.display(), e),
        }
    }

    info!(
        "Pipeline completed successfully - total_duration={:.2}s, rows={}, regions={}",
        pipeline_start.elapsed().as_secs_f32(),
        dataset.len(),
        fetched.succeeded.len()
    );

    Ok(RunSummary {
        rows: dataset.len(),
        regions_succeeded: fetched.succeeded,
        regions_failed: fetched.failed,
        viral_threshold: threshold,
        classifier,
        output_path: settings.output_path.clone(),
        report_path,
    })
}
