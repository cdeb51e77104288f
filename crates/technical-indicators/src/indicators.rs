//! Technical indicators over daily closing prices.
//!
//! All functions are pure, never panic on short input, and keep full
//! precision; rounding happens only at the reporting boundary via
//! [`round2`].

/// RSI smoothing period.
pub const RSI_PERIOD: usize = 14;

/// MACD spans: fast EMA, slow EMA, signal EMA.
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// Simple Moving Average, aligned with the input series. `None` until the
/// trailing window fills.
pub fn sma(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if window == 0 || closes.len() < window {
        return result;
    }

    let mut sum: f64 = closes[..window].iter().sum();
    result[window - 1] = Some(sum / window as f64);

    for i in window..closes.len() {
        sum += closes[i] - closes[i - window];
        result[i] = Some(sum / window as f64);
    }
    result
}

/// Exponential Moving Average with alpha = 2 / (span + 1), seeded with the
/// first close. Same length as the input.
pub fn ema(closes: &[f64], span: usize) -> Vec<f64> {
    if closes.is_empty() || span == 0 {
        return vec![];
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut result = Vec::with_capacity(closes.len());
    result.push(closes[0]);

    for i in 1..closes.len() {
        let prev = result[i - 1];
        result.push(alpha * closes[i] + (1.0 - alpha) * prev);
    }
    result
}

/// 14-period Relative Strength Index.
///
/// Day-over-day deltas are split into gain and loss series, each smoothed
/// with alpha = 1/14 seeded at the first delta. Values are aligned from the
/// second bar; empty for fewer than 2 bars. A zero smoothed loss average
/// clamps the value to 100.
pub fn rsi(closes: &[f64]) -> Vec<f64> {
    if closes.len() < 2 {
        return vec![];
    }

    let alpha = 1.0 / RSI_PERIOD as f64;
    let mut result = Vec::with_capacity(closes.len() - 1);
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 1..closes.len() {
        let delta = closes[i] - closes[i - 1];
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);

        if i == 1 {
            avg_gain = gain;
            avg_loss = loss;
        } else {
            avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
            avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;
        }

        let value = if avg_loss == 0.0 {
            100.0
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - 100.0 / (1.0 + rs)
        };
        result.push(value);
    }
    result
}

/// MACD (Moving Average Convergence Divergence).
pub struct Macd {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// MACD line = EMA(12) - EMA(26), signal = EMA(macd, 9), histogram =
/// macd - signal. All three are aligned with the input series.
pub fn macd(closes: &[f64]) -> Macd {
    let fast = ema(closes, MACD_FAST);
    let slow = ema(closes, MACD_SLOW);

    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema(&line, MACD_SIGNAL);
    let histogram = line.iter().zip(&signal).map(|(m, s)| m - s).collect();

    Macd {
        macd: line,
        signal,
        histogram,
    }
}

/// Round to 2 decimal places for reporting.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
