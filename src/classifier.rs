use std::cmp::Ordering;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::forest::{ForestParams, RandomForest};
use crate::metrics::{evaluate, ClassificationMetrics};
use crate::models::{Dataset, EnrichedRecord};
use crate::scaler::StandardScaler;

pub const N_FEATURES: usize = 7;

/// Model inputs, in column order.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "likes",
    "comment_count",
    "like_ratio",
    "comment_ratio",
    "engagement_score",
    "publish_hour",
    "title_sentiment",
];

pub type FeatureRow = [f64; N_FEATURES];

#[derive(Debug, Clone)]
pub struct ClassifierParams {
    pub seed: u64,
    pub test_fraction: f64,
    pub n_trees: usize,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self { seed: 42, test_fraction: 0.2, n_trees: 100 }
    }
}

pub fn feature_row(r: &EnrichedRecord) -> FeatureRow {
    [
        r.likes as f64,
        r.comment_count as f64,
        r.like_ratio,
        r.comment_ratio,
        r.engagement_score,
        r.publish_hour as f64,
        r.title_sentiment,
    ]
}

/// Seeded shuffle split: `ceil(n * test_fraction)` rows go to test.
/// Returns `(train, test)` row indices.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>), PipelineError> {
    let n_test = (n as f64 * test_fraction).ceil() as usize;
    if n < 2 || n_test == 0 || n_test >= n {
        return Err(PipelineError::InsufficientData(n));
    }
    let mut perm: Vec<usize> = (0..n).collect();
    perm.shuffle(&mut StdRng::seed_from_u64(seed));
    let train = perm.split_off(n_test);
    Ok((train, perm))
}

/// Split, scaled features and targets, ready for fitting.
#[derive(Debug, Clone)]
pub struct PreparedSplit {
    pub train_idx: Vec<usize>,
    pub test_idx: Vec<usize>,
    pub scaler: StandardScaler,
    pub x_train: Vec<FeatureRow>,
    pub x_test: Vec<FeatureRow>,
    pub y_train: Vec<u8>,
    pub y_test: Vec<u8>,
}

/// Split the table and standardize; the scaler only ever sees training rows.
pub fn prepare(dataset: &Dataset, params: &ClassifierParams) -> Result<PreparedSplit> {
    let (train_idx, test_idx) = train_test_split(dataset.len(), params.test_fraction, params.seed)?;

    let y_train: Vec<u8> = train_idx.iter().map(|&i| dataset[i].viral).collect();
    if let Some(&first) = y_train.first() {
        if y_train.iter().all(|&y| y == first) {
            return Err(PipelineError::InsufficientLabelDiversity(first).into());
        }
    }
    let y_test: Vec<u8> = test_idx.iter().map(|&i| dataset[i].viral).collect();

    let raw_train: Vec<FeatureRow> = train_idx.iter().map(|&i| feature_row(&dataset[i])).collect();
    let raw_test: Vec<FeatureRow> = test_idx.iter().map(|&i| feature_row(&dataset[i])).collect();

    let scaler = StandardScaler::fit(&raw_train)?;
    let x_train = scaler.transform(&raw_train);
    let x_test = scaler.transform(&raw_test);

    debug!("Prepared split - train={}, test={}", train_idx.len(), test_idx.len());
    Ok(PreparedSplit { train_idx, test_idx, scaler, x_train, x_test, y_train, y_test })
}

#[derive(Debug, Clone, Serialize)]
pub struct TestPrediction {
    pub video_id: String,
    pub region: String,
    pub actual: u8,
    pub predicted: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureImportance {
    pub feature: &'static str,
    pub importance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifierReport {
    pub train_size: usize,
    pub test_size: usize,
    pub metrics: ClassificationMetrics,
    /// Descending by importance.
    pub feature_importance: Vec<FeatureImportance>,
    pub predictions: Vec<TestPrediction>,
}

/// Train on the training partition, score the held-out rows.
pub fn train_and_evaluate(dataset: &Dataset, params: &ClassifierParams) -> Result<ClassifierReport> {
    let split = prepare(dataset, params)?;

    let forest = RandomForest::fit(
        &split.x_train,
        &split.y_train,
        &ForestParams { n_trees: params.n_trees, seed: params.seed, ..Default::default() },
    )?;
    let y_pred = forest.predict(&split.x_test);
    let metrics = evaluate(&split.y_test, &y_pred);

    let feature_importance = rank_importances(forest.feature_importances());

    let predictions = split
        .test_idx
        .iter()
        .zip(&y_pred)
        .map(|(&i, &predicted)| TestPrediction {
            video_id: dataset[i].video_id.clone(),
            region: dataset[i].region.clone(),
            actual: dataset[i].viral,
            predicted,
        })
        .collect();

    info!(
        "Classifier evaluated - train={}, test={}, accuracy={:.4}",
        split.train_idx.len(),
        split.test_idx.len(),
        metrics.accuracy
    );

    Ok(ClassifierReport {
        train_size: split.train_idx.len(),
        test_size: split.test_idx.len(),
        metrics,
        feature_importance,
        predictions,
    })
}

fn rank_importances(importances: &[f64]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = FEATURE_NAMES
        .iter()
        .zip(importances)
        .map(|(&feature, &importance)| FeatureImportance { feature, importance })
        .collect();
    // stable: ties keep column order
    ranked.sort_by(|a, b| b.importance.partial_cmp(&a.importance).unwrap_or(Ordering::Equal));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VideoRecord;
    use chrono::DateTime;

    fn record(i: usize) -> EnrichedRecord {
        let ts = DateTime::parse_from_rfc3339("2025-05-05T10:00:00Z").unwrap();
        let views = 1_000 + (i as u64) * 500;
        let mut r = EnrichedRecord::from_video(
            VideoRecord {
                video_id: format!("vid{i}"),
                title: format!("title {i}"),
                category_id: "20".into(),
                publish_time: String::new(),
                views,
                likes: views / 20,
                comment_count: views / 100 + (i as u64 % 7),
                region: "US".into(),
            },
            ts,
            "en".into(),
        );
        r.like_ratio = r.likes as f64 / views as f64;
        r.comment_ratio = r.comment_count as f64 / views as f64;
        r.engagement_score = r.like_ratio + r.comment_ratio;
        r.publish_hour = (i % 24) as u32;
        r.title_sentiment = ((i % 5) as f64 - 2.0) / 2.0;
        r.viral = u8::from(i >= 30);
        r
    }

    fn dataset(n: usize) -> Dataset {
        (0..n).map(record).collect()
    }

    #[test]
    fn split_is_seeded_and_sized() {
        let (train, test) = train_test_split(10, 0.2, 42).unwrap();
        assert_eq!((train.len(), test.len()), (8, 2));
        let (train2, test2) = train_test_split(10, 0.2, 42).unwrap();
        assert_eq!((train.clone(), test.clone()), (train2, test2));

        let mut all: Vec<usize> = train.into_iter().chain(test).collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());

        let (_, test) = train_test_split(11, 0.2, 42).unwrap();
        assert_eq!(test.len(), 3);
    }

    #[test]
    fn tiny_tables_cannot_split() {
        assert!(matches!(train_test_split(1, 0.2, 42), Err(PipelineError::InsufficientData(1))));
        assert!(matches!(train_test_split(0, 0.2, 42), Err(PipelineError::InsufficientData(0))));
    }

    #[test]
    fn scaler_ignores_test_rows() {
        let params = ClassifierParams::default();
        let ds = dataset(40);
        let before = prepare(&ds, &params).unwrap();

        let mut perturbed = ds.clone();
        for &i in &before.test_idx {
            perturbed[i].likes *= 1000;
            perturbed[i].like_ratio = 42.0;
            perturbed[i].title_sentiment = -1.0;
            perturbed[i].publish_hour = 23;
        }
        let after = prepare(&perturbed, &params).unwrap();

        assert_eq!(before.train_idx, after.train_idx);
        assert_eq!(before.scaler, after.scaler);
        assert_eq!(before.x_train, after.x_train);
        assert_ne!(before.x_test, after.x_test);
    }

    #[test]
    fn single_class_training_set_is_reported() {
        let mut ds = dataset(20);
        ds.iter_mut().for_each(|r| r.viral = 0);
        let err = train_and_evaluate(&ds, &ClassifierParams::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::InsufficientLabelDiversity(0))
        ));
        assert!(err.to_string().contains("insufficient label diversity"));
    }

    #[test]
    fn report_is_complete_and_ranked() {
        let ds = dataset(40);
        let params = ClassifierParams { n_trees: 30, ..Default::default() };
        let report = train_and_evaluate(&ds, &params).unwrap();

        assert_eq!(report.train_size, 32);
        assert_eq!(report.test_size, 8);
        assert_eq!(report.predictions.len(), 8);
        assert!(report.predictions.iter().all(|p| p.predicted <= 1));

        let cm = report.metrics.confusion;
        assert_eq!(cm.iter().flatten().sum::<usize>(), 8);

        assert_eq!(report.feature_importance.len(), N_FEATURES);
        assert!(report
            .feature_importance
            .windows(2)
            .all(|w| w[0].importance >= w[1].importance));
        let total: f64 = report.feature_importance.iter().map(|f| f.importance).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}
