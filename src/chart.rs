use crate::state::PredictionResult;

/// Fixed category names for the outcome chart, in render order.
pub const CHART_LABELS: [&str; 3] = ["Home Win", "Draw", "Away Win"];

/// Chart-ready view of a prediction: the fixed labels plus the three
/// probabilities scaled to percentages.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub labels: [&'static str; 3],
    pub series: [f64; 3],
}

/// Pure and total over any input. Values are passed through scaled by 100
/// with no normalization; a series that does not sum to 100 renders as-is.
pub fn chart_data(result: &PredictionResult) -> ChartData {
    ChartData {
        labels: CHART_LABELS,
        series: [
            result.home_win * 100.0,
            result.draw * 100.0,
            result.away_win * 100.0,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_probabilities_to_percentages() {
        let data = chart_data(&PredictionResult {
            home_win: 0.5,
            draw: 0.2,
            away_win: 0.3,
        });
        assert_eq!(data.labels, ["Home Win", "Draw", "Away Win"]);
        assert_eq!(data.series, [50.0, 20.0, 30.0]);
    }

    #[test]
    fn identical_input_yields_identical_output() {
        let result = PredictionResult {
            home_win: 0.61,
            draw: 0.24,
            away_win: 0.15,
        };
        assert_eq!(chart_data(&result), chart_data(&result));
    }

    #[test]
    fn degenerate_sum_passes_through_unnormalized() {
        let data = chart_data(&PredictionResult {
            home_win: 0.9,
            draw: 0.9,
            away_win: 0.9,
        });
        assert_eq!(data.series, [90.0, 90.0, 90.0]);
    }

    #[test]
    fn zero_probabilities_render_as_zero() {
        let data = chart_data(&PredictionResult {
            home_win: 0.0,
            draw: 0.0,
            away_win: 0.0,
        });
        assert_eq!(data.series, [0.0, 0.0, 0.0]);
    }
}
