//! Cubic spline interpolation.
//!
//! Used to fill the months between annual employment averages. The spline is
//! solved for its knot second derivatives `M_i` as one dense linear system;
//! with a few dozen knots a dense LU solve is simpler than a banded solver
//! and plenty fast.
//!
//! Boundary conditions:
//! - four or more knots: "not-a-knot" (third derivative continuous across the
//!   second and second-to-last knots), which reproduces cubic data exactly
//! - three knots: natural (`M_0 = M_{n-1} = 0`)
//! - two knots: straight line

use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivative at each knot.
    m: Vec<f64>,
}

impl CubicSpline {
    /// Fit a spline through `(xs[i], ys[i])`.
    ///
    /// Returns `None` when there are fewer than two knots, the lengths differ,
    /// `xs` is not strictly increasing, or the system is singular.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        let n = xs.len();
        if n < 2 || ys.len() != n {
            return None;
        }
        if xs.windows(2).any(|w| w[1] <= w[0]) || xs.iter().chain(ys).any(|v| !v.is_finite()) {
            return None;
        }

        let m = if n == 2 {
            vec![0.0, 0.0]
        } else {
            solve_second_derivatives(xs, ys)?
        };

        Some(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            m,
        })
    }

    /// Evaluate at `x`; `None` outside the knot span.
    pub fn eval(&self, x: f64) -> Option<f64> {
        let first = *self.xs.first()?;
        let last = *self.xs.last()?;
        if !(x >= first && x <= last) {
            return None;
        }

        // Segment i such that xs[i] <= x <= xs[i+1].
        let i = match self.xs.partition_point(|&k| k <= x) {
            0 => 0,
            p => (p - 1).min(self.xs.len() - 2),
        };

        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);
        let (m0, m1) = (self.m[i], self.m[i + 1]);
        let h = x1 - x0;
        let a = x1 - x;
        let b = x - x0;

        Some(
            m0 * a.powi(3) / (6.0 * h)
                + m1 * b.powi(3) / (6.0 * h)
                + (y0 / h - m0 * h / 6.0) * a
                + (y1 / h - m1 * h / 6.0) * b,
        )
    }
}

fn solve_second_derivatives(xs: &[f64], ys: &[f64]) -> Option<Vec<f64>> {
    let n = xs.len();
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();

    let mut a = DMatrix::<f64>::zeros(n, n);
    let mut rhs = DVector::<f64>::zeros(n);

    for i in 1..n - 1 {
        a[(i, i - 1)] = h[i - 1];
        a[(i, i)] = 2.0 * (h[i - 1] + h[i]);
        a[(i, i + 1)] = h[i];
        rhs[i] = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
    }

    if n >= 4 {
        // Not-a-knot: (M1 - M0)/h0 = (M2 - M1)/h1, and likewise at the end.
        a[(0, 0)] = -h[1];
        a[(0, 1)] = h[0] + h[1];
        a[(0, 2)] = -h[0];

        let k = n - 1;
        a[(k, k - 2)] = -h[k - 1];
        a[(k, k - 1)] = h[k - 2] + h[k - 1];
        a[(k, k)] = -h[k - 2];
    } else {
        a[(0, 0)] = 1.0;
        a[(n - 1, n - 1)] = 1.0;
    }

    let m = a.lu().solve(&rhs)?;
    m.iter().all(|v| v.is_finite()).then(|| m.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_a_knot_reproduces_a_cubic() {
        let f = |x: f64| x.powi(3) - 2.0 * x + 1.0;
        let xs = [0.0, 1.0, 2.0, 3.0, 5.0, 6.5];
        let ys: Vec<f64> = xs.iter().map(|&x| f(x)).collect();
        let s = CubicSpline::fit(&xs, &ys).unwrap();
        for x in [0.5, 2.5, 4.0, 6.0] {
            let got = s.eval(x).unwrap();
            assert!((got - f(x)).abs() < 1e-8, "x={x}: {got} vs {}", f(x));
        }
    }

    #[test]
    fn passes_through_knots_and_stays_in_span() {
        let xs = [0.0, 12.0, 24.0];
        let ys = [10.0, 14.0, 11.0];
        let s = CubicSpline::fit(&xs, &ys).unwrap();
        for (x, y) in xs.iter().zip(ys) {
            assert!((s.eval(*x).unwrap() - y).abs() < 1e-10);
        }
        assert!(s.eval(-1.0).is_none());
        assert!(s.eval(24.5).is_none());
    }

    #[test]
    fn two_knots_is_linear() {
        let s = CubicSpline::fit(&[0.0, 10.0], &[0.0, 5.0]).unwrap();
        assert!((s.eval(4.0).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_unsorted_knots() {
        assert!(CubicSpline::fit(&[0.0, 2.0, 1.0], &[0.0, 1.0, 2.0]).is_none());
        assert!(CubicSpline::fit(&[0.0], &[1.0]).is_none());
    }
}
