use serde::Serialize;

/// Class labels in report order.
pub const LABELS: [u8; 2] = [0, 1];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    /// `confusion[true][predicted]`
    pub confusion: [[usize; 2]; 2],
    pub per_class: [ClassMetrics; 2],
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

pub fn confusion_matrix(y_true: &[u8], y_pred: &[u8]) -> [[usize; 2]; 2] {
    let mut m = [[0usize; 2]; 2];
    for (&t, &p) in y_true.iter().zip(y_pred) {
        m[usize::from(t.min(1))][usize::from(p.min(1))] += 1;
    }
    m
}

/// Accuracy, confusion matrix and precision/recall/F1 with zero-division
/// mapped to 0.
pub fn evaluate(y_true: &[u8], y_pred: &[u8]) -> ClassificationMetrics {
    let confusion = confusion_matrix(y_true, y_pred);
    let total: usize = confusion.iter().flatten().sum();
    let correct = confusion[0][0] + confusion[1][1];

    let mut per_class = [ClassMetrics::default(); 2];
    for (c, slot) in per_class.iter_mut().enumerate() {
        let tp = confusion[c][c];
        let predicted = confusion[0][c] + confusion[1][c];
        let support = confusion[c][0] + confusion[c][1];
        let precision = ratio(tp, predicted);
        let recall = ratio(tp, support);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        *slot = ClassMetrics { precision, recall, f1, support };
    }

    let macro_avg = ClassMetrics {
        precision: per_class.iter().map(|m| m.precision).sum::<f64>() / 2.0,
        recall: per_class.iter().map(|m| m.recall).sum::<f64>() / 2.0,
        f1: per_class.iter().map(|m| m.f1).sum::<f64>() / 2.0,
        support: total,
    };

    let weight = |f: fn(&ClassMetrics) -> f64| -> f64 {
        if total == 0 {
            return 0.0;
        }
        per_class.iter().map(|m| f(m) * m.support as f64).sum::<f64>() / total as f64
    };
    let weighted_avg = ClassMetrics {
        precision: weight(|m| m.precision),
        recall: weight(|m| m.recall),
        f1: weight(|m| m.f1),
        support: total,
    };

    ClassificationMetrics {
        accuracy: ratio(correct, total),
        confusion,
        per_class,
        macro_avg,
        weighted_avg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confusion_rows_are_truth() {
        let m = confusion_matrix(&[0, 0, 1, 1, 1], &[0, 1, 1, 0, 1]);
        assert_eq!(m, [[1, 1], [1, 2]]);
    }

    #[test]
    fn report_numbers() {
        let y_true = [0, 0, 0, 0, 1, 1, 1, 1, 1, 1];
        let y_pred = [0, 0, 0, 1, 1, 1, 1, 1, 0, 0];
        let m = evaluate(&y_true, &y_pred);
        assert!((m.accuracy - 0.7).abs() < 1e-12);
        // class 0: tp=3, predicted=5, support=4
        assert!((m.per_class[0].precision - 0.6).abs() < 1e-12);
        assert!((m.per_class[0].recall - 0.75).abs() < 1e-12);
        // class 1: tp=4, predicted=5, support=6
        assert!((m.per_class[1].precision - 0.8).abs() < 1e-12);
        assert!((m.per_class[1].recall - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(m.per_class[1].support, 6);
        let expected_weighted_recall = (0.75 * 4.0 + (4.0 / 6.0) * 6.0) / 10.0;
        assert!((m.weighted_avg.recall - expected_weighted_recall).abs() < 1e-12);
        assert_eq!(m.macro_avg.support, 10);
    }

    #[test]
    fn absent_class_scores_zero_not_nan() {
        let m = evaluate(&[0, 0, 0], &[0, 0, 0]);
        assert_eq!(m.accuracy, 1.0);
        assert_eq!(m.per_class[1], ClassMetrics { precision: 0.0, recall: 0.0, f1: 0.0, support: 0 });
        assert!(m.weighted_avg.f1.is_finite());
    }
}
