use serde::Deserialize;
use typed_builder::TypedBuilder;

use wisim_core::bucket::TimeMS;

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub enum MobilityType {
    #[default]
    Stationary,
    Waypoint,
}

#[derive(Deserialize, Clone, Copy, Debug, Default, TypedBuilder)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    #[builder(default)]
    pub z: f64,
}

/// A (time, position) anchor of a piecewise-linear trajectory.
#[derive(Deserialize, Clone, Copy, Debug, TypedBuilder)]
pub struct Waypoint {
    pub time: TimeMS,
    pub pos: Point3D,
}

/// Piecewise-linear motion through time-ordered waypoints. Positions between
/// two anchors are interpolated, positions outside the trajectory are clamped
/// to the nearest endpoint. Consecutive anchors may share a position to model
/// a node that stays put for a while.
#[derive(Clone, Debug)]
pub struct WaypointPath {
    waypoints: Vec<Waypoint>,
}

impl WaypointPath {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        if waypoints.is_empty() {
            panic!("A waypoint trajectory needs at least one waypoint");
        }
        waypoints.windows(2).for_each(|pair| {
            if pair[1].time < pair[0].time {
                panic!(
                    "Waypoint times must be non-decreasing, got {} after {}",
                    pair[1].time, pair[0].time
                );
            }
        });
        Self { waypoints }
    }

    pub fn position_at(&self, time: TimeMS) -> Point3D {
        let first = self.waypoints.first().expect("empty trajectory");
        let last = self.waypoints.last().expect("empty trajectory");
        if time <= first.time {
            return first.pos;
        }
        if time >= last.time {
            return last.pos;
        }

        for pair in self.waypoints.windows(2) {
            let (w0, w1) = (pair[0], pair[1]);
            if time < w0.time || time > w1.time {
                continue;
            }
            // Zero-duration segments hold the earlier anchor.
            if w1.time == w0.time {
                return w0.pos;
            }
            let fraction = (time - w0.time).as_f64() / (w1.time - w0.time).as_f64();
            return Point3D::builder()
                .x(w0.pos.x + fraction * (w1.pos.x - w0.pos.x))
                .y(w0.pos.y + fraction * (w1.pos.y - w0.pos.y))
                .z(w0.pos.z + fraction * (w1.pos.z - w0.pos.z))
                .build();
        }
        last.pos
    }
}

/// Position of a node as a function of simulated time. Pure and deterministic,
/// no state is mutated by querying it.
#[derive(Clone, Debug)]
pub enum Mobility {
    Static(Point3D),
    Waypoints(WaypointPath),
}

impl Mobility {
    pub fn position_at(&self, time: TimeMS) -> Point3D {
        match self {
            Mobility::Static(pos) => *pos,
            Mobility::Waypoints(path) => path.position_at(time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64) -> Point3D {
        Point3D::builder().x(x).y(y).build()
    }

    fn sample_path() -> WaypointPath {
        WaypointPath::new(vec![
            Waypoint::builder().time(TimeMS::from(0)).pos(point(25.0, 40.0)).build(),
            Waypoint::builder().time(TimeMS::from(5000)).pos(point(25.0, 40.0)).build(),
            Waypoint::builder().time(TimeMS::from(10000)).pos(point(25.0, 55.0)).build(),
            Waypoint::builder().time(TimeMS::from(15000)).pos(point(25.0, 55.0)).build(),
            Waypoint::builder().time(TimeMS::from(20000)).pos(point(25.0, 45.0)).build(),
        ])
    }

    #[test]
    fn test_static_position_ignores_time() {
        let mobility = Mobility::Static(point(20.0, 20.0));
        let early = mobility.position_at(TimeMS::from(0));
        let late = mobility.position_at(TimeMS::from(20000));
        assert_eq!(early.x, late.x);
        assert_eq!(early.y, late.y);
    }

    #[test]
    fn test_exact_waypoint_times_return_stored_positions() {
        let path = sample_path();
        assert_eq!(path.position_at(TimeMS::from(0)).y, 40.0);
        assert_eq!(path.position_at(TimeMS::from(10000)).y, 55.0);
        assert_eq!(path.position_at(TimeMS::from(20000)).y, 45.0);
    }

    #[test]
    fn test_interpolation_between_waypoints() {
        let path = sample_path();
        // Halfway into the 5s..10s leg, 40.0 -> 55.0.
        let pos = path.position_at(TimeMS::from(7500));
        assert!((pos.y - 47.5).abs() < 1e-9);
        assert_eq!(pos.x, 25.0);
    }

    #[test]
    fn test_stay_segment_holds_position() {
        let path = sample_path();
        let pos = path.position_at(TimeMS::from(2500));
        assert_eq!(pos.y, 40.0);
        let pos = path.position_at(TimeMS::from(12000));
        assert_eq!(pos.y, 55.0);
    }

    #[test]
    fn test_out_of_bounds_clamps_to_endpoints() {
        let path = WaypointPath::new(vec![
            Waypoint::builder().time(TimeMS::from(1000)).pos(point(1.0, 1.0)).build(),
            Waypoint::builder().time(TimeMS::from(2000)).pos(point(2.0, 2.0)).build(),
        ]);
        assert_eq!(path.position_at(TimeMS::from(0)).x, 1.0);
        assert_eq!(path.position_at(TimeMS::from(9000)).x, 2.0);
    }

    #[test]
    fn test_zero_duration_segment_is_safe() {
        let path = WaypointPath::new(vec![
            Waypoint::builder().time(TimeMS::from(1000)).pos(point(3.0, 3.0)).build(),
            Waypoint::builder().time(TimeMS::from(1000)).pos(point(3.0, 3.0)).build(),
            Waypoint::builder().time(TimeMS::from(2000)).pos(point(4.0, 4.0)).build(),
        ]);
        let pos = path.position_at(TimeMS::from(1000));
        assert!(pos.x.is_finite());
        assert_eq!(pos.x, 3.0);
    }

    #[test]
    #[should_panic]
    fn test_decreasing_waypoint_times_panic() {
        WaypointPath::new(vec![
            Waypoint::builder().time(TimeMS::from(2000)).pos(point(0.0, 0.0)).build(),
            Waypoint::builder().time(TimeMS::from(1000)).pos(point(1.0, 1.0)).build(),
        ]);
    }
}
