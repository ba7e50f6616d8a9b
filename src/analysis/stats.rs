use serde::Serialize;

// ---------------------------------------------------------------------------
// Small descriptive-statistics helpers
// ---------------------------------------------------------------------------

/// Running sum / count that skips NaN and infinite inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    pub sum: f64,
    pub count: usize,
}

impl Accumulator {
    pub fn push(&mut self, value: f64) {
        if value.is_finite() {
            self.sum += value;
            self.count += 1;
        }
    }

    /// Arithmetic mean of the accepted values, `None` when there are none.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    /// Sum of the accepted values, `None` when there are none.
    pub fn total(&self) -> Option<f64> {
        (self.count > 0).then_some(self.sum)
    }
}

/// Mean of the finite values, ignoring missing ones.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut acc = Accumulator::default();
    for v in values {
        acc.push(v);
    }
    acc.mean()
}

/// Count, location and spread of one indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Sample standard deviation (n - 1 denominator).
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Describe the finite values of `values`.
pub fn describe(values: impl IntoIterator<Item = f64>) -> Summary {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();

    let avg = mean(sorted.iter().copied());
    let median = match n {
        0 => None,
        _ if n % 2 == 1 => Some(sorted[n / 2]),
        _ => Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0),
    };
    let std_dev = match avg {
        Some(m) if n >= 2 => {
            let ss: f64 = sorted.iter().map(|v| (v - m).powi(2)).sum();
            Some((ss / (n - 1) as f64).sqrt())
        }
        _ => None,
    };

    Summary {
        count: n,
        mean: avg,
        median,
        std_dev,
        min: sorted.first().copied(),
        max: sorted.last().copied(),
    }
}
