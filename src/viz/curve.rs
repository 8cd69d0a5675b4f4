//! Monotone cubic interpolation (Fritsch–Carlson).
//!
//! Series paths are drawn as smooth curves that never overshoot the data:
//! between two years the interpolant stays within the values at those
//! years, so a share can't dip below zero or bulge past a peak the way a
//! plain cubic spline would.

/// Sample a monotone cubic through `points` (strictly increasing x),
/// returning a dense polyline with `samples_per_segment` steps between
/// consecutive knots. Fewer than 3 points are returned as-is.
pub fn monotone_path(points: &[(f64, f64)], samples_per_segment: usize) -> Vec<(f64, f64)> {
    let n = points.len();
    if n < 3 || samples_per_segment < 2 {
        return points.to_vec();
    }

    // Secant slopes between knots.
    let mut d = Vec::with_capacity(n - 1);
    for w in points.windows(2) {
        let dx = w[1].0 - w[0].0;
        d.push(if dx > 0.0 { (w[1].1 - w[0].1) / dx } else { 0.0 });
    }

    // Tangents: endpoint secants, interior averages, zeroed at extrema.
    let mut m = vec![0.0f64; n];
    m[0] = d[0];
    m[n - 1] = d[n - 2];
    for i in 1..n - 1 {
        m[i] = if d[i - 1] * d[i] <= 0.0 {
            0.0
        } else {
            (d[i - 1] + d[i]) / 2.0
        };
    }

    // Fritsch–Carlson limiter keeps each segment monotone.
    for i in 0..n - 1 {
        if d[i] == 0.0 {
            m[i] = 0.0;
            m[i + 1] = 0.0;
            continue;
        }
        let a = m[i] / d[i];
        let b = m[i + 1] / d[i];
        let s = a * a + b * b;
        if s > 9.0 {
            let t = 3.0 / s.sqrt();
            m[i] = t * a * d[i];
            m[i + 1] = t * b * d[i];
        }
    }

    // Cubic Hermite sampling per segment.
    let mut out = Vec::with_capacity((n - 1) * samples_per_segment + 1);
    for i in 0..n - 1 {
        let (x0, y0) = points[i];
        let (x1, y1) = points[i + 1];
        let h = x1 - x0;
        for s in 0..samples_per_segment {
            let t = s as f64 / samples_per_segment as f64;
            let t2 = t * t;
            let t3 = t2 * t;
            let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
            let h10 = t3 - 2.0 * t2 + t;
            let h01 = -2.0 * t3 + 3.0 * t2;
            let h11 = t3 - t2;
            let y = h00 * y0 + h10 * h * m[i] + h01 * y1 + h11 * h * m[i + 1];
            out.push((x0 + t * h, y));
        }
    }
    out.push(points[n - 1]);
    out
}
