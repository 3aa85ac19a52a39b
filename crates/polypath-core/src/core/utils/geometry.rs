use nalgebra::{Point3, Vector3};

/// Maps `x` into `[0, length)`. A non-positive `length` marks a non-periodic axis and
/// leaves `x` untouched.
pub fn wrap_coordinate(x: f64, length: f64) -> f64 {
    if length <= 0.0 {
        return x;
    }
    let wrapped = x - (x / length).floor() * length;
    // Tiny negative inputs can round up to exactly `length`.
    if wrapped >= length { 0.0 } else { wrapped }
}

/// Minkowski p-norm distance between two equally sized coordinate slices.
///
/// `p = f64::INFINITY` yields the Chebyshev (maximum coordinate difference) distance.
pub fn minkowski_distance(a: &[f64], b: &[f64], p: f64) -> f64 {
    let diffs = a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs());
    if p == f64::INFINITY {
        diffs.fold(0.0, f64::max)
    } else if p == 1.0 {
        diffs.sum()
    } else if p == 2.0 {
        diffs.map(|d| d * d).sum::<f64>().sqrt()
    } else {
        diffs.map(|d| d.powf(p)).sum::<f64>().powf(1.0 / p)
    }
}

/// Angle in radians between the bond vectors `middle - first` and `last - middle`.
///
/// A straight continuation gives `0`, a full reversal gives `π`.
pub fn bond_angle(first: &Point3<f64>, middle: &Point3<f64>, last: &Point3<f64>) -> f64 {
    let incoming = middle - first;
    let outgoing = last - middle;
    angle_between(&incoming, &outgoing)
}

pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// Component of `v` orthogonal to the unit vector `axis`.
pub fn perpendicular_component(v: &Vector3<f64>, axis: &Vector3<f64>) -> Vector3<f64> {
    v - axis * v.dot(axis)
}

/// Per-axis extent (`max - min`) of a point cloud; zero for an empty slice.
pub fn bounding_box_lengths(points: &[Point3<f64>]) -> Vector3<f64> {
    let Some(first) = points.first() else {
        return Vector3::zeros();
    };
    let (min, max) = points
        .iter()
        .fold((first.coords, first.coords), |(min, max), p| {
            (min.inf(&p.coords), max.sup(&p.coords))
        });
    max - min
}
