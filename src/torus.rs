use crate::constants::POSITION_COUNT;
use glam::DVec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct World {
    pub width: f64,
    pub height: f64,
    pub max_vision_radius: f64,
}

impl World {
    pub fn new(width: f64, height: f64, max_vision_radius: f64) -> Self {
        Self {
            width,
            height,
            max_vision_radius,
        }
    }

    // Brings any finite position back into `[0, width) × [0, height)`.
    pub fn wrap(&self, position: DVec2) -> DVec2 {
        DVec2::new(
            wrap_axis(position.x, self.width),
            wrap_axis(position.y, self.height),
        )
    }

    /// The canonical position at index 0 followed by its eight mirrors, clockwise from
    /// the top-left copy: 1 top-left, 2 top, 3 top-right, 4 right, 5 bottom-right,
    /// 6 bottom, 7 bottom-left, 8 left.
    pub fn mirrors(&self, canonical: DVec2) -> [DVec2; POSITION_COUNT] {
        let (w, h) = (self.width, self.height);
        [
            DVec2::new(0.0, 0.0),
            DVec2::new(-w, -h),
            DVec2::new(0.0, -h),
            DVec2::new(w, -h),
            DVec2::new(w, 0.0),
            DVec2::new(w, h),
            DVec2::new(0.0, h),
            DVec2::new(-w, h),
            DVec2::new(-w, 0.0),
        ]
        .map(|offset| canonical + offset)
    }
}

#[inline]
fn wrap_axis(value: f64, extent: f64) -> f64 {
    let mut v = value;
    if v < 0.0 {
        v += extent;
    }
    // Also catches -ε + extent rounding up to extent.
    if v >= extent {
        v -= extent;
    }
    if (0.0..extent).contains(&v) {
        return v;
    }
    // More than one extent out.
    let folded = v.rem_euclid(extent);
    if folded >= extent { 0.0 } else { folded }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Band {
    min: DVec2,
    size: DVec2,
}

impl Band {
    #[inline]
    fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x
            && p.y >= self.min.y
            && p.x < self.min.x + self.size.x
            && p.y < self.min.y + self.size.y
    }
}

// Four strips along the world edges, each as thick as the widest vision radius. Only a
// boid inside a strip can see across that edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeBuffer {
    top: Band,
    left: Band,
    bottom: Band,
    right: Band,
}

impl EdgeBuffer {
    pub fn new(world: &World) -> Self {
        let (w, h, t) = (world.width, world.height, world.max_vision_radius);
        Self {
            top: Band {
                min: DVec2::ZERO,
                size: DVec2::new(w, t),
            },
            left: Band {
                min: DVec2::ZERO,
                size: DVec2::new(t, h),
            },
            bottom: Band {
                min: DVec2::new(0.0, h - t),
                size: DVec2::new(w, t),
            },
            right: Band {
                min: DVec2::new(w - t, 0.0),
                size: DVec2::new(t, h),
            },
        }
    }

    pub fn zones(&self, position: DVec2) -> EdgeZones {
        EdgeZones {
            top: self.top.contains(position),
            left: self.left.contains(position),
            bottom: self.bottom.contains(position),
            right: self.right.contains(position),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeZones {
    pub top: bool,
    pub left: bool,
    pub bottom: bool,
    pub right: bool,
}

impl EdgeZones {
    // Whether position `index` of another boid (see [`World::mirrors`]) is worth testing
    // against this observer's vision. The canonical position always is.
    pub fn admits(&self, index: usize) -> bool {
        match index {
            0 => true,
            1 => self.top && self.left,
            2 => self.top,
            3 => self.top && self.right,
            4 => self.right,
            5 => self.bottom && self.right,
            6 => self.bottom,
            7 => self.bottom && self.left,
            8 => self.left,
            _ => false,
        }
    }

    pub fn admitted(self) -> impl Iterator<Item = usize> {
        (0..POSITION_COUNT).filter(move |&index| self.admits(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(100.0, 80.0, 20.0)
    }

    #[test]
    fn wrap_is_a_no_op_inside_the_world() {
        let world = world();
        for p in [
            DVec2::new(0.0, 0.0),
            DVec2::new(50.0, 40.0),
            DVec2::new(99.999, 79.999),
        ] {
            assert_eq!(world.wrap(p), p);
        }
    }

    #[test]
    fn wrap_lands_strictly_inside() {
        let world = world();
        assert_eq!(world.wrap(DVec2::new(100.0, 80.0)), DVec2::ZERO);
        let p = world.wrap(DVec2::new(-1e-20, -0.5));
        assert!(p.x >= 0.0 && p.x < 100.0);
        assert!((p.y - 79.5).abs() < 1e-12);
        let q = world.wrap(DVec2::new(104.0, -3.0));
        assert!((q - DVec2::new(4.0, 77.0)).length() < 1e-12);
    }

    #[test]
    fn wrap_folds_positions_several_extents_out() {
        let w = world();
        for p in [
            DVec2::new(-250.0, 430.0),
            DVec2::new(1e6 + 0.5, -1e6),
            DVec2::new(-1e-13, 160.0),
        ] {
            let wrapped = w.wrap(p);
            assert!((0.0..100.0).contains(&wrapped.x), "{p} -> {wrapped}");
            assert!((0.0..80.0).contains(&wrapped.y), "{p} -> {wrapped}");
        }
        assert_eq!(w.wrap(DVec2::new(-250.0, 430.0)), DVec2::new(50.0, 30.0));
    }

    #[test]
    fn every_mirror_wraps_back_to_the_canonical_position() {
        let world = world();
        for canonical in [
            DVec2::new(0.0, 0.0),
            DVec2::new(12.5, 70.25),
            DVec2::new(99.5, 0.5),
            DVec2::new(37.0, 79.9),
        ] {
            let mirrors = world.mirrors(canonical);
            assert_eq!(mirrors[0], canonical);
            for mirror in &mirrors[1..] {
                assert!(
                    (world.wrap(*mirror) - canonical).length() < 1e-9,
                    "{mirror:?} did not wrap to {canonical:?}"
                );
            }
        }
    }

    #[test]
    fn mirror_order_is_clockwise_from_top_left() {
        let world = world();
        let m = world.mirrors(DVec2::new(10.0, 10.0));
        assert_eq!(m[1], DVec2::new(-90.0, -70.0));
        assert_eq!(m[2], DVec2::new(10.0, -70.0));
        assert_eq!(m[3], DVec2::new(110.0, -70.0));
        assert_eq!(m[4], DVec2::new(110.0, 10.0));
        assert_eq!(m[5], DVec2::new(110.0, 90.0));
        assert_eq!(m[6], DVec2::new(10.0, 90.0));
        assert_eq!(m[7], DVec2::new(-90.0, 90.0));
        assert_eq!(m[8], DVec2::new(-90.0, 10.0));
    }

    #[test]
    fn centre_of_the_world_only_tests_the_canonical_position() {
        let buffer = EdgeBuffer::new(&world());
        let zones = buffer.zones(DVec2::new(50.0, 40.0));
        assert_eq!(zones, EdgeZones::default());
        assert_eq!(zones.admitted().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn corners_admit_the_matching_diagonal() {
        let buffer = EdgeBuffer::new(&world());
        let top_left = buffer.zones(DVec2::new(5.0, 5.0));
        assert_eq!(top_left.admitted().collect::<Vec<_>>(), vec![0, 1, 2, 8]);

        let bottom_right = buffer.zones(DVec2::new(95.0, 75.0));
        assert_eq!(bottom_right.admitted().collect::<Vec<_>>(), vec![0, 4, 5, 6]);

        let top_right = buffer.zones(DVec2::new(90.0, 1.0));
        assert_eq!(top_right.admitted().collect::<Vec<_>>(), vec![0, 2, 3, 4]);

        let bottom_left = buffer.zones(DVec2::new(0.0, 79.0));
        assert_eq!(bottom_left.admitted().collect::<Vec<_>>(), vec![0, 6, 7, 8]);
    }

    #[test]
    fn single_edge_admits_one_mirror() {
        let buffer = EdgeBuffer::new(&world());
        let left = buffer.zones(DVec2::new(3.0, 40.0));
        assert_eq!(left.admitted().collect::<Vec<_>>(), vec![0, 8]);
    }
}
