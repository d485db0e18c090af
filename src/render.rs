// src/render.rs
use crate::classifier::ClassifierReport;
use crate::metrics::{ClassMetrics, LABELS};

fn metrics_line(label: &str, m: &ClassMetrics) -> String {
    format!(
        "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
        label, m.precision, m.recall, m.f1, m.support
    )
}

/// Precision / recall / F1 table in the usual column layout.
pub fn render_classification_table(report: &ClassifierReport) -> String {
    let m = &report.metrics;
    let mut out = String::new();
    out.push_str(&format!("{:>12} {:>9} {:>9} {:>9} {:>9}\n\n", "", "precision", "recall", "f1-score", "support"));

    for (label, class) in LABELS.iter().zip(m.per_class.iter()) {
        out.push_str(&metrics_line(&label.to_string(), class));
    }
    out.push('\n');
    out.push_str(&format!(
        "{:>12} {:>9} {:>9} {:>9.2} {:>9}\n",
        "accuracy", "", "", m.accuracy, m.macro_avg.support
    ));
    out.push_str(&metrics_line("macro avg", &m.macro_avg));
    out.push_str(&metrics_line("weighted avg", &m.weighted_avg));
    out
}

pub fn render_confusion_matrix(report: &ClassifierReport) -> String {
    let c = report.metrics.confusion;
    format!("[[{:>4} {:>4}]\n [{:>4} {:>4}]]\n", c[0][0], c[0][1], c[1][0], c[1][1])
}

pub fn render_feature_importance(report: &ClassifierReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<18} {:>10}\n", "Feature", "Importance"));
    for f in &report.feature_importance {
        out.push_str(&format!("{:<18} {:>10.6}\n", f.feature, f.importance));
    }
    out
}

/// Everything the run prints about the model, in one block.
pub fn render_report(report: &ClassifierReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Train rows: {} | Test rows: {}\n\n",
        report.train_size, report.test_size
    ));
    out.push_str(&format!("Accuracy: {:.4}\n\n", report.metrics.accuracy));
    out.push_str("Confusion Matrix:\n");
    out.push_str(&render_confusion_matrix(report));
    out.push_str("\nClassification Report:\n");
    out.push_str(&render_classification_table(report));
    out.push_str("\nFeature Importance:\n");
    out.push_str(&render_feature_importance(report));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::FeatureImportance;
    use crate::metrics::evaluate;

    fn report() -> ClassifierReport {
        ClassifierReport {
            train_size: 8,
            test_size: 4,
            metrics: evaluate(&[0, 0, 1, 1], &[0, 1, 1, 1]),
            feature_importance: vec![
                FeatureImportance { feature: "likes", importance: 0.75 },
                FeatureImportance { feature: "publish_hour", importance: 0.25 },
            ],
            predictions: Vec::new(),
        }
    }

    #[test]
    fn table_has_expected_rows() {
        let text = render_classification_table(&report());
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].contains("precision") && lines[0].contains("support"));
        assert!(lines[1].trim_start().starts_with('0'));
        assert!(lines[2].trim_start().starts_with("1      0.67      1.00      0.80         2"));
        assert!(lines[3].contains("accuracy") && lines[3].contains("0.75"));
        assert!(lines[5].contains("weighted avg"));
    }

    #[test]
    fn confusion_and_importance_render() {
        let r = report();
        assert_eq!(render_confusion_matrix(&r), "[[   1    1]\n [   0    2]]\n");
        let imp = render_feature_importance(&r);
        assert!(imp.lines().nth(1).unwrap().starts_with("likes"));
        assert!(render_report(&r).contains("Accuracy: 0.7500"));
    }
}
