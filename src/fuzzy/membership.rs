/// Bounded, discretized numeric range of a linguistic variable.
///
/// The step fixes the grid every term curve is sampled on. Sample `i` is
/// `min + i * step`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Universe {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Universe {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Number of sample points, both ends included.
    pub fn len(&self) -> usize {
        if self.step <= 0.0 || self.max < self.min {
            return 0;
        }
        // Tolerance absorbs binary representation error in steps like 0.1
        ((self.max - self.min) / self.step + 1e-9).floor() as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sample(&self, i: usize) -> f64 {
        self.min + i as f64 * self.step
    }

    /// Iterate over the sample points in ascending order.
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).map(move |i| self.sample(i))
    }

    /// Sample `function` at every grid point.
    pub fn sample_curve(&self, function: &MembershipFunction) -> Vec<f64> {
        self.samples().map(|x| function.evaluate(x)).collect()
    }

    /// Piecewise-linear reading of a curve sampled on this universe.
    ///
    /// `x` below the first or above the last sample takes that end sample's
    /// value. A grid point returns its sample exactly.
    pub fn interpolate(&self, curve: &[f64], x: f64) -> f64 {
        let n = curve.len().min(self.len());
        if n == 0 || x.is_nan() {
            return 0.0;
        }
        if n == 1 || x <= self.min {
            return curve[0];
        }
        if x >= self.sample(n - 1) {
            return curve[n - 1];
        }

        let mut j = (((x - self.min) / self.step).floor() as usize).min(n - 2);
        // The division can round across a grid point
        if x < self.sample(j) {
            j -= 1;
        } else if x >= self.sample(j + 1) {
            j += 1;
        }

        let x0 = self.sample(j);
        if x == x0 {
            return curve[j];
        }
        let slope = (curve[j + 1] - curve[j]) / (self.sample(j + 1) - x0);
        slope * (x - x0) + curve[j]
    }

    /// Map a crisp value onto the nearest point of the universe.
    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.min, self.max)
    }
}

/// Shape of a fuzzy term's membership curve.
#[derive(Debug, Clone, PartialEq)]
pub enum MembershipFunction {
    /// Descending spline: 1 up to `a`, 0 from `b`.
    Z { a: f64, b: f64 },
    /// Ascending spline: 0 up to `a`, 1 from `b`.
    S { a: f64, b: f64 },
    Triangular { a: f64, b: f64, c: f64 },
    Trapezoidal { a: f64, b: f64, c: f64, d: f64 },
    Gaussian { mean: f64, sigma: f64 },
    /// Generalized bell with width `a`, slope `b` and center `c`.
    Bell { a: f64, b: f64, c: f64 },
    /// S-rise over `a..b`, plateau over `b..c`, Z-fall over `c..d`.
    Pi { a: f64, b: f64, c: f64, d: f64 },
}

impl MembershipFunction {
    /// Degree of membership of `x`, always within `[0, 1]`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let degree = match *self {
            MembershipFunction::Z { a, b } => z_curve(x, a, b),
            MembershipFunction::S { a, b } => s_curve(x, a, b),
            MembershipFunction::Triangular { a, b, c } => triangular(x, a, b, c),
            MembershipFunction::Trapezoidal { a, b, c, d } => {
                if x >= b && x <= c {
                    1.0
                } else if x < b {
                    triangular(x, a, b, b)
                } else {
                    triangular(x, c, c, d)
                }
            }
            MembershipFunction::Gaussian { mean, sigma } => {
                (-(x - mean).powi(2) / (2.0 * sigma * sigma)).exp()
            }
            MembershipFunction::Bell { a, b, c } => {
                1.0 / (1.0 + ((x - c) / a).abs().powf(2.0 * b))
            }
            MembershipFunction::Pi { a, b, c, d } => {
                if x <= (b + c) / 2.0 {
                    s_curve(x, a, b)
                } else {
                    z_curve(x, c, d)
                }
            }
        };

        if degree.is_nan() {
            0.0
        } else {
            degree.clamp(0.0, 1.0)
        }
    }

    /// Human-readable shape name, used in model reports.
    pub fn shape(&self) -> &'static str {
        match self {
            MembershipFunction::Z { .. } => "z",
            MembershipFunction::S { .. } => "s",
            MembershipFunction::Triangular { .. } => "tri",
            MembershipFunction::Trapezoidal { .. } => "trap",
            MembershipFunction::Gaussian { .. } => "gauss",
            MembershipFunction::Bell { .. } => "gbell",
            MembershipFunction::Pi { .. } => "pi",
        }
    }

    /// Problems with the shape parameters, empty when the shape is well formed.
    pub fn parameter_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        match *self {
            MembershipFunction::Z { a, b } | MembershipFunction::S { a, b } => {
                if a >= b {
                    errors.push(format!("breakpoints must be increasing ({} >= {})", a, b));
                }
            }
            MembershipFunction::Triangular { a, b, c } => {
                if !(a <= b && b <= c) || a == c {
                    errors.push(format!("breakpoints must satisfy a <= b <= c, a < c ({}, {}, {})", a, b, c));
                }
            }
            MembershipFunction::Trapezoidal { a, b, c, d } | MembershipFunction::Pi { a, b, c, d } => {
                if !(a <= b && b <= c && c <= d) {
                    errors.push(format!(
                        "breakpoints must be non-decreasing ({}, {}, {}, {})",
                        a, b, c, d
                    ));
                }
            }
            MembershipFunction::Gaussian { sigma, .. } => {
                if sigma <= 0.0 {
                    errors.push(format!("sigma must be positive, got {}", sigma));
                }
            }
            MembershipFunction::Bell { a, b, .. } => {
                if a == 0.0 {
                    errors.push("bell width must be non-zero".to_string());
                }
                if b <= 0.0 {
                    errors.push(format!("bell slope must be positive, got {}", b));
                }
            }
        }
        errors
    }
}

fn z_curve(x: f64, a: f64, b: f64) -> f64 {
    let mid = (a + b) / 2.0;
    if x <= a {
        1.0
    } else if x < mid {
        1.0 - 2.0 * ((x - a) / (b - a)).powi(2)
    } else if x <= b {
        2.0 * ((x - b) / (b - a)).powi(2)
    } else {
        0.0
    }
}

fn s_curve(x: f64, a: f64, b: f64) -> f64 {
    let mid = (a + b) / 2.0;
    if x <= a {
        0.0
    } else if x <= mid {
        2.0 * ((x - a) / (b - a)).powi(2)
    } else if x <= b {
        1.0 - 2.0 * ((x - b) / (b - a)).powi(2)
    } else {
        1.0
    }
}

// Degenerate edges (a == b or b == c) are vertical: the peak itself is 1.
fn triangular(x: f64, a: f64, b: f64, c: f64) -> f64 {
    if x == b {
        1.0
    } else if x > a && x < b {
        (x - a) / (b - a)
    } else if x > b && x < c {
        (c - x) / (c - b)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_universe_sample_count() {
        assert_eq!(Universe::new(0.0, 100.0, 0.1).len(), 1001);
        assert_eq!(Universe::new(100.0, 3000.0, 1.0).len(), 2901);
        assert_eq!(Universe::new(0.1, 10.0, 0.05).len(), 199);
        assert_eq!(Universe::new(0.0, 8.0, 0.01).len(), 801);
    }

    #[test]
    fn test_universe_samples_span_range() {
        let u = Universe::new(0.0, 100.0, 0.1);
        let samples: Vec<f64> = u.samples().collect();
        assert_eq!(samples[0], 0.0);
        assert!(close(*samples.last().unwrap(), 100.0));
    }

    #[test]
    fn test_universe_invalid_is_empty() {
        assert!(Universe::new(0.0, 1.0, 0.0).is_empty());
        assert!(Universe::new(5.0, 1.0, 0.1).is_empty());
    }

    #[test]
    fn test_universe_clamp() {
        let u = Universe::new(100.0, 3000.0, 1.0);
        assert_eq!(u.clamp(50.0), 100.0);
        assert_eq!(u.clamp(5000.0), 3000.0);
        assert_eq!(u.clamp(290.0), 290.0);
    }

    #[test]
    fn test_interpolate_between_samples() {
        let u = Universe::new(0.0, 30.0, 0.1);
        let curve = u.sample_curve(&MembershipFunction::Pi { a: 0.85, b: 0.95, c: 1.05, d: 1.20 });
        // Grid neighbours of 0.93 are 0.9 (0.5) and 1.0 (1.0)
        assert!((u.interpolate(&curve, 0.93) - 0.65).abs() < 1e-9);
        // Grid neighbours of 1.15 are 1.1 (7/9) and 1.2 (0.0)
        assert!((u.interpolate(&curve, 1.15) - 7.0 / 18.0).abs() < 1e-9);
        assert_eq!(u.interpolate(&curve, 1.0), 1.0);
    }

    #[test]
    fn test_interpolate_outside_grid_uses_end_samples() {
        let u = Universe::new(0.0, 10.0, 1.0);
        let curve: Vec<f64> = u.samples().map(|x| x / 10.0).collect();
        assert_eq!(u.interpolate(&curve, -3.0), 0.0);
        assert_eq!(u.interpolate(&curve, 12.0), 1.0);
        assert!((u.interpolate(&curve, 2.5) - 0.25).abs() < 1e-12);
        assert_eq!(u.interpolate(&curve, f64::NAN), 0.0);
        assert_eq!(u.interpolate(&[], 2.0), 0.0);
    }

    #[test]
    fn test_interpolate_last_sample_below_max() {
        // 0..=1 with step 0.3 samples 0, 0.3, 0.6, 0.9
        let u = Universe::new(0.0, 1.0, 0.3);
        let curve = vec![0.0, 0.3, 0.6, 0.9];
        assert_eq!(u.len(), 4);
        assert_eq!(u.interpolate(&curve, 1.0), 0.9);
    }

    #[test]
    fn test_z_curve_shape() {
        let mf = MembershipFunction::Z { a: 240.0, b: 270.0 };
        assert_eq!(mf.evaluate(200.0), 1.0);
        assert_eq!(mf.evaluate(240.0), 1.0);
        assert!(close(mf.evaluate(255.0), 0.5));
        assert_eq!(mf.evaluate(270.0), 0.0);
        assert_eq!(mf.evaluate(300.0), 0.0);
    }

    #[test]
    fn test_z_curve_inside_ramp() {
        // 2 * ((1.0 - 1.05) / 0.25)^2
        let mf = MembershipFunction::Z { a: 0.8, b: 1.05 };
        assert!(close(mf.evaluate(1.0), 0.08));
    }

    #[test]
    fn test_s_curve_shape() {
        let mf = MembershipFunction::S { a: 320.0, b: 360.0 };
        assert_eq!(mf.evaluate(300.0), 0.0);
        assert!(close(mf.evaluate(340.0), 0.5));
        assert!(close(mf.evaluate(330.0), 0.125));
        assert_eq!(mf.evaluate(360.0), 1.0);
        assert_eq!(mf.evaluate(1000.0), 1.0);
    }

    #[test]
    fn test_triangular() {
        let mf = MembershipFunction::Triangular { a: 34.0, b: 46.0, c: 58.0 };
        assert_eq!(mf.evaluate(34.0), 0.0);
        assert!(close(mf.evaluate(40.0), 0.5));
        assert_eq!(mf.evaluate(46.0), 1.0);
        assert!(close(mf.evaluate(52.0), 0.5));
        assert_eq!(mf.evaluate(58.0), 0.0);
    }

    #[test]
    fn test_trapezoidal_with_vertical_left_edge() {
        let mf = MembershipFunction::Trapezoidal { a: 0.0, b: 0.0, c: 1.0, d: 2.0 };
        assert_eq!(mf.evaluate(0.0), 1.0);
        assert_eq!(mf.evaluate(1.0), 1.0);
        assert!(close(mf.evaluate(1.5), 0.5));
        assert_eq!(mf.evaluate(2.0), 0.0);
        assert_eq!(mf.evaluate(-1.0), 0.0);
    }

    #[test]
    fn test_trapezoidal_with_vertical_right_edge() {
        let mf = MembershipFunction::Trapezoidal { a: 78.0, b: 85.0, c: 100.0, d: 100.0 };
        assert_eq!(mf.evaluate(78.0), 0.0);
        assert!(close(mf.evaluate(81.5), 0.5));
        assert_eq!(mf.evaluate(100.0), 1.0);
    }

    #[test]
    fn test_gaussian() {
        let mf = MembershipFunction::Gaussian { mean: 290.0, sigma: 30.0 };
        assert_eq!(mf.evaluate(290.0), 1.0);
        assert!(close(mf.evaluate(320.0), (-0.5f64).exp()));
        // Far tails underflow to exactly zero
        assert_eq!(mf.evaluate(3000.0), 0.0);
    }

    #[test]
    fn test_bell() {
        let mf = MembershipFunction::Bell { a: 7.0, b: 2.0, c: 62.0 };
        assert_eq!(mf.evaluate(62.0), 1.0);
        assert!(close(mf.evaluate(69.0), 0.5));
        assert!(close(mf.evaluate(55.0), 0.5));
    }

    #[test]
    fn test_pi_curve() {
        let mf = MembershipFunction::Pi { a: 0.85, b: 0.95, c: 1.05, d: 1.20 };
        assert_eq!(mf.evaluate(0.5), 0.0);
        assert_eq!(mf.evaluate(0.85), 0.0);
        assert!(close(mf.evaluate(0.90), 0.5));
        assert_eq!(mf.evaluate(1.0), 1.0);
        assert!(close(mf.evaluate(1.125), 0.5));
        assert_eq!(mf.evaluate(1.20), 0.0);
        assert_eq!(mf.evaluate(3.0), 0.0);
    }

    #[test]
    fn test_degrees_stay_in_unit_interval() {
        let shapes = [
            MembershipFunction::Z { a: 0.4, b: 0.8 },
            MembershipFunction::S { a: 1.8, b: 2.3 },
            MembershipFunction::Triangular { a: 2.0, b: 5.0, c: 15.0 },
            MembershipFunction::Trapezoidal { a: 0.0, b: 0.0, c: 20.0, d: 40.0 },
            MembershipFunction::Gaussian { mean: 1.0, sigma: 0.2 },
            MembershipFunction::Bell { a: 0.2, b: 2.0, c: 4.4 },
            MembershipFunction::Pi { a: 0.85, b: 0.95, c: 1.05, d: 1.20 },
        ];
        for mf in &shapes {
            for i in -50..150 {
                let d = mf.evaluate(i as f64 * 0.37);
                assert!((0.0..=1.0).contains(&d), "{:?} gave {}", mf, d);
            }
        }
    }

    #[test]
    fn test_nan_input_yields_zero() {
        let mf = MembershipFunction::Gaussian { mean: 0.0, sigma: 1.0 };
        assert_eq!(mf.evaluate(f64::NAN), 0.0);
    }

    #[test]
    fn test_parameter_errors() {
        assert!(MembershipFunction::Z { a: 1.0, b: 2.0 }.parameter_errors().is_empty());
        assert_eq!(MembershipFunction::S { a: 2.0, b: 1.0 }.parameter_errors().len(), 1);
        assert_eq!(
            MembershipFunction::Gaussian { mean: 0.0, sigma: 0.0 }.parameter_errors().len(),
            1
        );
        assert_eq!(
            MembershipFunction::Bell { a: 0.0, b: -1.0, c: 0.0 }.parameter_errors().len(),
            2
        );
        assert!(MembershipFunction::Trapezoidal { a: 0.0, b: 0.0, c: 1.0, d: 2.0 }
            .parameter_errors()
            .is_empty());
    }
}
