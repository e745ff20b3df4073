//! Moving averages over daily closes

use crate::error::{Result, StockError};
use ta::{Next, indicators::SimpleMovingAverage};

/// Short moving average window in trading days
pub const SHORT_WINDOW: usize = 50;
/// Long moving average window in trading days
pub const LONG_WINDOW: usize = 200;

/// Simple moving average of the last `period` closes.
///
/// Needs at least `period` closes; a shorter series would silently average
/// over fewer days.
pub fn simple_moving_average(closes: &[f64], period: usize) -> Result<f64> {
    if closes.len() < period {
        return Err(StockError::IndicatorError(format!(
            "{period}-day average needs {period} closes, got {}",
            closes.len()
        )));
    }

    let mut sma =
        SimpleMovingAverage::new(period).map_err(|e| StockError::IndicatorError(e.to_string()))?;

    let mut current = 0.0;
    for &close in &closes[closes.len() - period..] {
        current = sma.next(close);
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_uses_trailing_window() {
        let closes: Vec<f64> = (1..=10).map(f64::from).collect();
        let sma = simple_moving_average(&closes, 4).unwrap();
        assert!((sma - 8.5).abs() < 1e-9);
    }

    #[test]
    fn test_sma_full_window() {
        let closes = vec![100.0; LONG_WINDOW];
        assert!((simple_moving_average(&closes, LONG_WINDOW).unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_sma_short_series() {
        let closes = vec![10.0; SHORT_WINDOW - 1];
        assert!(matches!(
            simple_moving_average(&closes, SHORT_WINDOW),
            Err(StockError::IndicatorError(_))
        ));
    }

    #[test]
    fn test_sma_zero_period() {
        assert!(simple_moving_average(&[1.0, 2.0], 0).is_err());
    }
}
