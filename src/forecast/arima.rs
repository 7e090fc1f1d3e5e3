//! Autoregressive-integrated model, `ARIMA(p, d, 0)`.
//!
//! Estimation follows the usual conditional least squares recipe:
//!
//! 1. difference the levels `d` times: `w = (1 - B)^d y`
//! 2. regress `w_t` on its `p` lags (plus a constant only when `d == 0`)
//! 3. `σ² = SSE / n_rows`
//!
//! Forecasts run the AR recursion on the differenced scale and integrate back
//! from the last observed levels. Interval widths come from the ψ-weights of the
//! full polynomial `φ(B)(1 - B)^d`:
//!
//! ```text
//! Var(e_h) = σ² Σ_{j=0}^{h-1} ψ_j²
//! ```

use nalgebra::{DMatrix, DVector, Schur};

use crate::domain::{ForecastResult, ModelOrder, Series, YearMonth};
use crate::error::AppError;
use crate::math::{fit_least_squares, two_sided_z};

/// Extra regression rows required beyond the parameter count.
pub const MIN_EXTRA_ROWS: usize = 10;

/// Companion eigenvalues at or above this modulus are treated as unit roots.
const UNIT_ROOT_TOL: f64 = 1.0 - 1e-8;

/// A fitted model, ready to forecast.
#[derive(Debug, Clone)]
pub struct ArimaModel {
    order: ModelOrder,
    ar: Vec<f64>,
    intercept: f64,
    sigma2: f64,
    /// `levels[k]` is the series differenced `k` times (`k < d`), plus the
    /// fully differenced series at index `d`.
    levels: Vec<Vec<f64>>,
    last_date: YearMonth,
    n_obs: usize,
}

impl ArimaModel {
    /// Fit on a contiguous monthly series.
    pub fn fit(series: &Series, order: ModelOrder) -> Result<Self, AppError> {
        if order.q > 0 {
            return Err(AppError::config(format!(
                "Model order {order}: moving-average terms are not supported."
            )));
        }
        let last_date = series
            .last()
            .map(|o| o.date)
            .ok_or_else(|| AppError::model_fit("No observations to fit."))?;

        let gaps = series.gaps();
        if let Some(first) = gaps.first() {
            return Err(AppError::model_fit(format!(
                "Series has {} missing month(s) (first: {first}); lagged terms would misalign.",
                gaps.len()
            )));
        }

        let y = series.values();
        if y.iter().any(|v| !v.is_finite()) {
            return Err(AppError::model_fit("Series contains non-finite values."));
        }

        let p = order.p;
        let with_const = order.d == 0;
        let cols = p + usize::from(with_const);

        let levels = difference_levels(&y, order.d);
        let w = &levels[order.d];
        let rows = w.len().saturating_sub(p);
        let required = cols + MIN_EXTRA_ROWS;
        if rows < required {
            return Err(AppError::model_fit(format!(
                "Insufficient data for ARIMA{order}: {} observation(s) give {rows} usable row(s), need {required}.",
                y.len()
            )));
        }

        let (ar, intercept, sse) = if cols == 0 {
            let sse = w.iter().map(|v| v * v).sum::<f64>();
            (Vec::new(), 0.0, sse)
        } else {
            let (x, target) = design_matrix(w, p, with_const);
            let fit = fit_least_squares(&x, &target).ok_or_else(|| {
                AppError::model_fit(format!("Least squares failed for ARIMA{order} (singular design)."))
            })?;
            let coeffs: Vec<f64> = fit.coefficients.iter().copied().collect();
            let (intercept, ar) = if with_const {
                (coeffs[0], coeffs[1..].to_vec())
            } else {
                (0.0, coeffs)
            };
            (ar, intercept, fit.sse)
        };

        let sigma2 = sse / rows as f64;
        if !sigma2.is_finite() {
            return Err(AppError::model_fit("Non-finite innovation variance."));
        }

        check_stationary(&ar)?;

        Ok(Self {
            order,
            ar,
            intercept,
            sigma2,
            levels,
            last_date,
            n_obs: y.len(),
        })
    }

    pub fn order(&self) -> ModelOrder {
        self.order
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Project `horizon` months past the last observation.
    pub fn forecast(&self, horizon: usize, confidence_level: f64) -> Result<ForecastResult, AppError> {
        if horizon == 0 {
            return Err(AppError::config("Forecast horizon must be > 0."));
        }
        let z = two_sided_z(confidence_level).ok_or_else(|| {
            AppError::config(format!("Confidence level must be in (0, 1), got {confidence_level}."))
        })?;

        let d = self.order.d;
        let mut extended = self.levels[d].clone();
        let mut diff_path = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            let n = extended.len();
            let next = self.intercept
                + self
                    .ar
                    .iter()
                    .enumerate()
                    .map(|(j, phi)| phi * extended[n - 1 - j])
                    .sum::<f64>();
            extended.push(next);
            diff_path.push(next);
        }

        // Undo each differencing step, innermost first.
        let mut point = diff_path;
        for k in (0..d).rev() {
            let mut level = self.levels[k]
                .last()
                .copied()
                .ok_or_else(|| AppError::model_fit("Missing anchor level for integration."))?;
            point = point
                .iter()
                .map(|step| {
                    level += step;
                    level
                })
                .collect();
        }

        let psi = psi_weights(&self.ar, d, horizon);
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        let mut acc = 0.0;
        for (h, &p) in point.iter().enumerate() {
            acc += psi[h] * psi[h];
            let half = z * (self.sigma2 * acc).sqrt();
            lower.push(p - half);
            upper.push(p + half);
        }

        if point.iter().chain(&lower).chain(&upper).any(|v| !v.is_finite()) {
            return Err(AppError::model_fit("Non-finite forecast values."));
        }

        let dates = (1..=horizon as i64).map(|h| self.last_date.add_months(h)).collect();

        Ok(ForecastResult {
            dates,
            point_forecast: point,
            lower_bound: lower,
            upper_bound: upper,
            confidence_level,
            order: self.order,
            ar_coefficients: self.ar.clone(),
            intercept: self.intercept,
            sigma2: self.sigma2,
            n_obs: self.n_obs,
        })
    }
}

fn difference_levels(y: &[f64], d: usize) -> Vec<Vec<f64>> {
    let mut levels = Vec::with_capacity(d + 1);
    levels.push(y.to_vec());
    for k in 0..d {
        let next: Vec<f64> = levels[k].windows(2).map(|w| w[1] - w[0]).collect();
        levels.push(next);
    }
    levels
}

/// Rows `t = p..n`: `[1?, w_{t-1}, ..., w_{t-p}]` -> `w_t`.
fn design_matrix(w: &[f64], p: usize, with_const: bool) -> (DMatrix<f64>, DVector<f64>) {
    let rows = w.len() - p;
    let cols = p + usize::from(with_const);
    let offset = usize::from(with_const);

    let mut x = DMatrix::<f64>::zeros(rows, cols);
    let mut target = DVector::<f64>::zeros(rows);
    for r in 0..rows {
        let t = p + r;
        if with_const {
            x[(r, 0)] = 1.0;
        }
        for j in 0..p {
            x[(r, offset + j)] = w[t - 1 - j];
        }
        target[r] = w[t];
    }
    (x, target)
}

fn check_stationary(ar: &[f64]) -> Result<(), AppError> {
    let p = ar.len();
    if p == 0 {
        return Ok(());
    }

    let mut companion = DMatrix::<f64>::zeros(p, p);
    for (j, &phi) in ar.iter().enumerate() {
        companion[(0, j)] = phi;
    }
    for i in 1..p {
        companion[(i, i - 1)] = 1.0;
    }

    let schur = Schur::try_new(companion, f64::EPSILON, 10_000)
        .ok_or_else(|| AppError::model_fit("Could not check AR stationarity (Schur did not converge)."))?;
    let max_modulus = schur
        .complex_eigenvalues()
        .iter()
        .map(|c| c.norm())
        .fold(0.0_f64, f64::max);

    if !(max_modulus < UNIT_ROOT_TOL) {
        return Err(AppError::model_fit(format!(
            "Estimated AR part is non-stationary (max root modulus {max_modulus:.4})."
        )));
    }
    Ok(())
}

/// ψ-weights of `φ(B)(1 - B)^d`, i.e. the MA(∞) form of the levels.
fn psi_weights(ar: &[f64], d: usize, n: usize) -> Vec<f64> {
    // Polynomial in B with the lag-0 coefficient first.
    let mut poly = Vec::with_capacity(ar.len() + 1);
    poly.push(1.0);
    poly.extend(ar.iter().map(|phi| -phi));
    for _ in 0..d {
        poly = poly_mul(&poly, &[1.0, -1.0]);
    }

    let mut psi = vec![0.0; n];
    if n == 0 {
        return psi;
    }
    psi[0] = 1.0;
    for j in 1..n {
        let mut v = 0.0;
        for k in 1..poly.len().min(j + 1) {
            v -= poly[k] * psi[j - k];
        }
        psi[j] = v;
    }
    psi
}

fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;
    use rand::prelude::*;
    use rand::rngs::StdRng;
    use rand_distr::Normal;

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    fn series_from(values: &[f64]) -> Series {
        let start = ym(2000, 1);
        Series::new(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| Observation::new(start.add_months(i as i64), v))
                .collect(),
        )
        .unwrap()
    }

    fn ar2_levels(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = Normal::new(0.0, 0.2).unwrap();
        let mut w = vec![0.0_f64; n];
        for t in 2..n {
            w[t] = 0.35 * w[t - 1] - 0.15 * w[t - 2] + noise.sample(&mut rng);
        }
        let mut level = 0.4;
        w.iter()
            .map(|dw| {
                level += dw;
                level
            })
            .collect()
    }

    #[test]
    fn recovers_ar1_coefficient() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = Normal::new(0.0, 1.0).unwrap();
        let mut y = vec![0.0_f64; 3000];
        for t in 1..y.len() {
            y[t] = 0.5 + 0.6 * y[t - 1] + noise.sample(&mut rng);
        }
        let model = ArimaModel::fit(&series_from(&y), ModelOrder { p: 1, d: 0, q: 0 }).unwrap();
        assert!((model.ar_coefficients()[0] - 0.6).abs() < 0.05);
        assert!((model.intercept() - 0.5).abs() < 0.1);
        assert!((model.sigma2() - 1.0).abs() < 0.1);
    }

    #[test]
    fn default_order_bounds_bracket_point_and_widen() {
        let s = series_from(&ar2_levels(300, 11));
        let model = ArimaModel::fit(&s, ModelOrder::DEFAULT).unwrap();
        let f = model.forecast(6, 0.95).unwrap();

        assert_eq!(f.horizon(), 6);
        assert_eq!(f.lower_bound.len(), 6);
        assert_eq!(f.upper_bound.len(), 6);
        assert_eq!(f.dates[0], s.last().unwrap().date.succ());
        for i in 0..6 {
            assert!(f.lower_bound[i] <= f.point_forecast[i]);
            assert!(f.point_forecast[i] <= f.upper_bound[i]);
        }
        let widths: Vec<f64> = (0..6).map(|i| f.upper_bound[i] - f.lower_bound[i]).collect();
        assert!(widths.windows(2).all(|w| w[1] >= w[0] - 1e-12));
    }

    #[test]
    fn random_walk_band_grows_with_sqrt_horizon() {
        // Alternating steps: Δy = ±1, so σ² = 1 under ARIMA(0,1,0).
        let y: Vec<f64> = (0..40).map(|t| if t % 2 == 0 { 0.0 } else { 1.0 }).collect();
        let model = ArimaModel::fit(&series_from(&y), ModelOrder { p: 0, d: 1, q: 0 }).unwrap();
        assert!((model.sigma2() - 1.0).abs() < 1e-12);

        let f = model.forecast(4, 0.95).unwrap();
        let z = two_sided_z(0.95).unwrap();
        for h in 0..4 {
            assert!((f.point_forecast[h] - 1.0).abs() < 1e-12);
            let half = f.upper_bound[h] - f.point_forecast[h];
            assert!((half - z * ((h + 1) as f64).sqrt()).abs() < 1e-9);
        }
    }

    #[test]
    fn second_difference_continues_linear_trend() {
        let y: Vec<f64> = (0..30).map(|t| 1.0 + 0.5 * t as f64).collect();
        let model = ArimaModel::fit(&series_from(&y), ModelOrder { p: 1, d: 2, q: 0 }).unwrap();
        let f = model.forecast(3, 0.9).unwrap();
        for (h, v) in f.point_forecast.iter().enumerate() {
            let expected = 1.0 + 0.5 * (29 + h + 1) as f64;
            assert!((v - expected).abs() < 1e-9, "h={h}: {v} vs {expected}");
        }
    }

    #[test]
    fn insufficient_data_is_a_fit_error() {
        let s = series_from(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8]);
        let err = ArimaModel::fit(&s, ModelOrder::DEFAULT).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ModelFit);
    }

    #[test]
    fn gaps_are_a_fit_error() {
        let mut obs: Vec<Observation> = ar2_levels(60, 3)
            .iter()
            .enumerate()
            .map(|(i, &v)| Observation::new(ym(2000, 1).add_months(i as i64), v))
            .collect();
        obs.remove(30);
        let s = Series::new(obs).unwrap();
        let err = ArimaModel::fit(&s, ModelOrder::DEFAULT).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ModelFit);
        assert!(err.message().contains("missing month"));
    }

    #[test]
    fn explosive_estimate_is_rejected() {
        let y: Vec<f64> = (0..30).map(|t| 1.5_f64.powi(t)).collect();
        let err = ArimaModel::fit(&series_from(&y), ModelOrder { p: 1, d: 0, q: 0 }).unwrap_err();
        assert!(err.message().contains("non-stationary"));
    }

    #[test]
    fn psi_weights_of_integrated_ar1() {
        // (1 - 0.5B)(1 - B) = 1 - 1.5B + 0.5B²  ->  ψ = 1, 1.5, 1.75, 1.875
        let psi = psi_weights(&[0.5], 1, 4);
        let expected = [1.0, 1.5, 1.75, 1.875];
        for (a, b) in psi.iter().zip(expected) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}
