//! Evaluation of predicted vs. actual churn labels

use crate::error::ModelError;
use crate::schema::LABEL_DOMAIN;
use std::fmt;

/// Counts for the positive ("churn", label 1) class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    pub fn from_labels(predicted: &[usize], actual: &[usize]) -> Self {
        let mut matrix = ConfusionMatrix::default();
        for (&p, &a) in predicted.iter().zip(actual) {
            match (p == 1, a == 1) {
                (true, true) => matrix.true_positive += 1,
                (true, false) => matrix.false_positive += 1,
                (false, false) => matrix.true_negative += 1,
                (false, true) => matrix.false_negative += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    /// Precision/recall/F1/support for class 0 (retained) or 1 (churned).
    pub fn class_metrics(&self, class: usize) -> ClassMetrics {
        let (hit, false_alarm, miss) = if class == 1 {
            (self.true_positive, self.false_positive, self.false_negative)
        } else {
            (self.true_negative, self.false_negative, self.false_positive)
        };
        let precision = ratio(hit, hit + false_alarm);
        let recall = ratio(hit, hit + miss);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        ClassMetrics {
            precision,
            recall,
            f1,
            support: hit + miss,
        }
    }
}

/// Undefined ratios (zero denominator) are reported as 0.
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Accuracy, confusion matrix and per-class report.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
    /// Indexed by encoded label
    pub classes: [ClassMetrics; 2],
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

/// Compare predicted labels against ground truth.
pub fn evaluate(predicted: &[usize], actual: &[usize]) -> Result<EvaluationReport, ModelError> {
    if predicted.len() != actual.len() {
        return Err(ModelError::LengthMismatch {
            rows: predicted.len(),
            labels: actual.len(),
        });
    }

    let confusion = ConfusionMatrix::from_labels(predicted, actual);
    let classes = [confusion.class_metrics(0), confusion.class_metrics(1)];
    let total = confusion.total();

    let macro_avg = ClassMetrics {
        precision: (classes[0].precision + classes[1].precision) / 2.0,
        recall: (classes[0].recall + classes[1].recall) / 2.0,
        f1: (classes[0].f1 + classes[1].f1) / 2.0,
        support: total,
    };
    let weight = |f: fn(&ClassMetrics) -> f64| {
        if total == 0 {
            0.0
        } else {
            classes
                .iter()
                .map(|c| f(c) * c.support as f64)
                .sum::<f64>()
                / total as f64
        }
    };
    let weighted_avg = ClassMetrics {
        precision: weight(|c| c.precision),
        recall: weight(|c| c.recall),
        f1: weight(|c| c.f1),
        support: total,
    };

    Ok(EvaluationReport {
        accuracy: confusion.accuracy(),
        confusion,
        classes,
        macro_avg,
        weighted_avg,
    })
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy: {:.4}", self.accuracy)?;
        writeln!(f, "\nClassification Report:")?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for (label, m) in LABEL_DOMAIN.iter().zip(self.classes.iter()) {
            write_row(f, label, m)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.confusion.total()
        )?;
        write_row(f, "macro avg", &self.macro_avg)?;
        write_row(f, "weighted avg", &self.weighted_avg)?;

        let c = &self.confusion;
        writeln!(f, "\nConfusion Matrix (rows: actual, columns: predicted):")?;
        writeln!(f, "{:>8} {:>8} {:>8}", "", "No", "Yes")?;
        writeln!(f, "{:>8} {:>8} {:>8}", "No", c.true_negative, c.false_positive)?;
        writeln!(f, "{:>8} {:>8} {:>8}", "Yes", c.false_negative, c.true_positive)
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, label: &str, m: &ClassMetrics) -> fmt::Result {
    writeln!(
        f,
        "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
        label, m.precision, m.recall, m.f1, m.support
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confusion_matrix_scenario() {
        let report = evaluate(&[1, 0, 1, 1], &[1, 0, 0, 1]).unwrap();

        assert_eq!(report.accuracy, 0.75);
        assert_eq!(
            report.confusion,
            ConfusionMatrix {
                true_positive: 2,
                false_positive: 1,
                true_negative: 1,
                false_negative: 0,
            }
        );
    }

    #[test]
    fn test_class_metrics() {
        let report = evaluate(&[1, 0, 1, 1], &[1, 0, 0, 1]).unwrap();
        let churn = report.classes[1];
        assert!((churn.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(churn.recall, 1.0);
        assert!((churn.f1 - 0.8).abs() < 1e-12);
        assert_eq!(churn.support, 2);

        let retained = report.classes[0];
        assert_eq!(retained.precision, 1.0);
        assert_eq!(retained.recall, 0.5);
        assert!((retained.f1 - 2.0 / 3.0).abs() < 1e-12);

        assert!((report.macro_avg.f1 - (0.8 + 2.0 / 3.0) / 2.0).abs() < 1e-12);
        assert!((report.weighted_avg.recall - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_zero_division_reports_zero() {
        let report = evaluate(&[0, 0], &[0, 0]).unwrap();
        assert_eq!(report.classes[1].precision, 0.0);
        assert_eq!(report.classes[1].f1, 0.0);
        assert_eq!(report.accuracy, 1.0);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(evaluate(&[1], &[1, 0]).is_err());
    }

    #[test]
    fn test_display() {
        let text = evaluate(&[1, 0, 1, 1], &[1, 0, 0, 1]).unwrap().to_string();
        assert!(text.contains("Accuracy: 0.7500"));
        assert!(text.contains("weighted avg"));
    }
}
