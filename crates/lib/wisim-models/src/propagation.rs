use serde::Deserialize;
use typed_builder::TypedBuilder;

use crate::mobility::Point3D;

/// Distances below this floor are clamped before the path-loss logarithm so
/// coinciding nodes never produce an infinite loss.
pub const MIN_PROPAGATION_DISTANCE: f64 = 0.01;

pub fn distance_between(a: &Point3D, b: &Point3D) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Analytical signal strength estimate from the free-space path-loss model at
/// a fixed carrier frequency. This estimates what a receiver would see, it is
/// not a measurement of any PHY.
#[derive(Deserialize, Clone, Copy, Debug, TypedBuilder)]
pub struct FriisEstimator {
    pub frequency_ghz: f64,
}

impl FriisEstimator {
    pub fn path_loss(&self, distance_m: f64) -> f64 {
        let distance = distance_m.max(MIN_PROPAGATION_DISTANCE);
        20.0 * distance.log10() + 20.0 * self.frequency_ghz.log10() + 32.44
    }

    pub fn received_power(&self, distance_m: f64, tx_power_dbm: f64) -> f64 {
        tx_power_dbm - self.path_loss(distance_m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> FriisEstimator {
        FriisEstimator::builder().frequency_ghz(5.0).build()
    }

    #[test]
    fn test_distance_is_euclidean_3d() {
        let a = Point3D::builder().x(0.0).y(0.0).z(0.0).build();
        let b = Point3D::builder().x(3.0).y(4.0).z(12.0).build();
        assert!((distance_between(&a, &b) - 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_path_loss_at_reference_distance() {
        // 20*log10(1) + 20*log10(5) + 32.44 = 46.419...
        let loss = estimator().path_loss(1.0);
        assert!((loss - 46.4194).abs() < 1e-3);
    }

    #[test]
    fn test_received_power_decreases_with_distance() {
        let est = estimator();
        let near = est.received_power(5.0, 16.0);
        let far = est.received_power(20.0, 16.0);
        assert!(near > far);
        // Doubling distance in free space costs ~6 dB.
        let d1 = est.received_power(10.0, 16.0);
        let d2 = est.received_power(20.0, 16.0);
        assert!((d1 - d2 - 6.0206).abs() < 1e-3);
    }

    #[test]
    fn test_zero_distance_is_floored() {
        let signal = estimator().received_power(0.0, 16.0);
        assert!(signal.is_finite());
        assert_eq!(
            signal,
            estimator().received_power(MIN_PROPAGATION_DISTANCE, 16.0)
        );
    }
}
