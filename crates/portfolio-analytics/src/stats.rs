//! Descriptive statistics over plain `f64` slices

/// Percent change between consecutive points.
///
/// Steps whose previous value is not strictly positive are skipped.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter_map(|w| (w[0] > 0.0).then_some(w[1] / w[0] - 1.0))
        .collect()
}

pub fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        None
    } else {
        Some(xs.iter().sum::<f64>() / xs.len() as f64)
    }
}

/// Sample standard deviation (n − 1 denominator)
pub fn sample_std(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let m = mean(xs)?;
    let var = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64;
    Some(var.sqrt())
}

/// Pearson correlation; `None` when undefined (short input or zero variance)
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let mx = mean(x)?;
    let my = mean(y)?;

    let mut cov = 0.0;
    let mut sx = 0.0;
    let mut sy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        cov += dx * dy;
        sx += dx * dx;
        sy += dy * dy;
    }

    if sx == 0.0 || sy == 0.0 {
        return None;
    }
    let r = cov / (sx * sy).sqrt();
    r.is_finite().then_some(r.clamp(-1.0, 1.0))
}

/// Most negative relative decline from a running peak; 0 for non-decreasing input
pub fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &v in values {
        peak = peak.max(v);
        if peak > 0.0 {
            worst = worst.min((v - peak) / peak);
        }
    }
    worst
}
