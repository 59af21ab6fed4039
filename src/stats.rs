use super::{min_and_max, Error};

/// Descriptive statistics of one speed series, in Mb/s.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub max: f64,
    pub min: f64,
    pub mean: f64,
    pub median: f64,
    pub variance: f64,
    pub stdev: f64,
}

impl Summary {
    /// Needs at least two values, the variance is the sample one (n - 1).
    pub fn compute(data: &[f64]) -> Result<Summary, Error> {
        if data.len() < 2 {
            return Err(Error::TooFewPoints(data.len()));
        }
        let (min, max) = min_and_max(data);
        let mean = mean(data);
        let median = median(data);
        let variance = sample_variance(data, mean);
        Ok(Summary {
            max,
            min,
            mean,
            median,
            variance,
            stdev: variance.sqrt(),
        })
    }

    /// multi-line text for the chart annotation boxes
    pub fn label(&self, title: &str) -> String {
        format!(
            "{}\nMax: {:.3}\nMin: {:.3}\nMean: {:.3}\nMedian: {:.3}\nVariance: {:.3}\nStd. Dev: {:.3}",
            title, self.max, self.min, self.mean, self.median, self.variance, self.stdev
        )
    }
}

/// Neumaier compensated sum, keeps the low-order bits lost by naive summation.
pub fn compensated_sum(data: &[f64]) -> f64 {
    let mut sum = 0.;
    let mut c = 0.;
    for &v in data {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            c += (sum - t) + v;
        } else {
            c += (v - t) + sum;
        }
        sum = t;
    }
    sum + c
}

pub fn mean(data: &[f64]) -> f64 {
    compensated_sum(data) / data.len() as f64
}

/// middle value, or the average of the two middle values for even lengths
pub fn median(data: &[f64]) -> f64 {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.
    }
}

fn sample_variance(data: &[f64], mean: f64) -> f64 {
    let squares: Vec<f64> = data.iter().map(|v| (v - mean).powi(2)).collect();
    compensated_sum(&squares) / (data.len() - 1) as f64
}
