//! Exact Euclidean distance transform (Felzenszwalb & Huttenlocher).
//!
//! The squared distance is computed one axis at a time as the lower
//! envelope of parabolas rooted at each lane's finite samples. Distances are
//! in voxel units.

use ndarray::{Array, Axis, Dimension};

/// Distance from every voxel to the nearest `true` voxel of `mask`.
///
/// Voxels in the mask have distance 0. If the mask is empty every distance
/// is infinite.
pub fn distance_to_foreground<D: Dimension>(mask: &Array<bool, D>) -> Array<f64, D> {
    let mut squared = mask.mapv(|inside| if inside { 0.0 } else { f64::INFINITY });

    let len = mask.shape().iter().copied().max().unwrap_or(0);
    let mut lane_in = Vec::with_capacity(len);
    let mut lane_out = vec![0.0; len];

    for axis in 0..squared.ndim() {
        for mut lane in squared.lanes_mut(Axis(axis)) {
            lane_in.clear();
            lane_in.extend(lane.iter().copied());
            let out = &mut lane_out[..lane_in.len()];
            squared_distance_1d(&lane_in, out);
            for (dst, src) in lane.iter_mut().zip(out.iter()) {
                *dst = *src;
            }
        }
    }

    squared.mapv_into(f64::sqrt)
}

/// One-dimensional squared distance transform of the sampled function `f`.
fn squared_distance_1d(f: &[f64], out: &mut [f64]) {
    // Parabola roots and the left boundary of each one's region.
    let mut roots: Vec<usize> = Vec::with_capacity(f.len());
    let mut bounds: Vec<f64> = Vec::with_capacity(f.len());

    for (q, &fq) in f.iter().enumerate() {
        if !fq.is_finite() {
            continue;
        }
        let qf = q as f64;
        loop {
            let Some(&p) = roots.last() else {
                roots.push(q);
                bounds.push(f64::NEG_INFINITY);
                break;
            };
            let pf = p as f64;
            let s = ((fq + qf * qf) - (f[p] + pf * pf)) / (2.0 * (qf - pf));
            if bounds.last().is_some_and(|&b| s <= b) {
                roots.pop();
                bounds.pop();
            } else {
                roots.push(q);
                bounds.push(s);
                break;
            }
        }
    }

    if roots.is_empty() {
        out.fill(f64::INFINITY);
        return;
    }

    let mut k = 0;
    for (q, dst) in out.iter_mut().enumerate() {
        let qf = q as f64;
        while k + 1 < roots.len() && bounds[k + 1] < qf {
            k += 1;
        }
        let d = qf - roots[k] as f64;
        *dst = d * d + f[roots[k]];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array3};

    fn brute_force(mask: &Array3<bool>) -> Array3<f64> {
        let sites: Vec<(usize, usize, usize)> = mask
            .indexed_iter()
            .filter(|(_, &v)| v)
            .map(|(idx, _)| idx)
            .collect();
        Array3::from_shape_fn(mask.dim(), |(z, y, x)| {
            sites
                .iter()
                .map(|&(sz, sy, sx)| {
                    let dz = z as f64 - sz as f64;
                    let dy = y as f64 - sy as f64;
                    let dx = x as f64 - sx as f64;
                    (dz * dz + dy * dy + dx * dx).sqrt()
                })
                .fold(f64::INFINITY, f64::min)
        })
    }

    #[test]
    fn test_one_dimensional() {
        let mask = Array1::from(vec![false, false, true, false, false, false, true]);
        let d = distance_to_foreground(&mask);
        assert_eq!(d.to_vec(), vec![2.0, 1.0, 0.0, 1.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_matches_brute_force() {
        let mut mask = Array3::from_elem((5, 6, 7), false);
        mask[[0, 0, 0]] = true;
        mask[[2, 3, 5]] = true;
        mask[[4, 1, 2]] = true;
        mask[[4, 5, 6]] = true;

        let fast = distance_to_foreground(&mask);
        let slow = brute_force(&mask);
        for (a, b) in fast.iter().zip(slow.iter()) {
            assert!((a - b).abs() < 1e-9, "{a} vs {b}");
        }
    }

    #[test]
    fn test_empty_mask_is_infinite() {
        let mask = Array3::from_elem((2, 2, 2), false);
        assert!(distance_to_foreground(&mask).iter().all(|d| d.is_infinite()));
    }
}
