use crate::angle::normalize;
use crate::constants::VERTEX_COUNT;
use crate::utils::{RandomSource, squared_draw};
use glam::DVec2;
use std::f64::consts::FRAC_PI_4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: DVec2,
    pub heading: f64,
}

impl Pose {
    pub fn new(position: DVec2, heading: f64) -> Self {
        Self { position, heading }
    }
}

// In a genome the vertices are local: origin-centred and facing angle 0. A channel's
// live copy is the same shape rotated by the owner's heading and moved to its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisionPolygon {
    vertices: [DVec2; VERTEX_COUNT],
}

impl VisionPolygon {
    pub fn new(vertices: [DVec2; VERTEX_COUNT]) -> Self {
        Self { vertices }
    }

    pub fn generate<R: RandomSource + ?Sized>(radius: f64, rng: &mut R) -> Self {
        let mut vertices = [DVec2::ZERO; VERTEX_COUNT];
        for (i, vertex) in vertices.iter_mut().enumerate() {
            let length = squared_draw(rng, radius);
            *vertex = DVec2::from_angle(i as f64 * FRAC_PI_4) * length;
        }
        Self { vertices }
    }

    pub fn regular(radius: f64) -> Self {
        let mut vertices = [DVec2::ZERO; VERTEX_COUNT];
        for (i, vertex) in vertices.iter_mut().enumerate() {
            *vertex = DVec2::from_angle(i as f64 * FRAC_PI_4) * radius;
        }
        Self { vertices }
    }

    #[inline]
    pub fn vertices(&self) -> &[DVec2; VERTEX_COUNT] {
        &self.vertices
    }

    pub fn posed(&self, pose: Pose) -> Self {
        let rotation = DVec2::from_angle(pose.heading);
        Self {
            vertices: self.vertices.map(|v| rotation.rotate(v) + pose.position),
        }
    }

    // Moves an already-posed polygon from `previous` to `current` by applying only the
    // change in heading (about the previous position) and the change in position.
    pub fn repose(&mut self, previous: Pose, current: Pose) {
        let turn = normalize(current.heading - previous.heading);
        let rotation = DVec2::from_angle(turn);
        let shift = current.position - previous.position;
        for vertex in &mut self.vertices {
            *vertex = rotation.rotate(*vertex - previous.position) + previous.position + shift;
        }
    }

    // Even-odd crossing test. Points exactly on an edge may land either side.
    pub fn contains(&self, point: DVec2) -> bool {
        let mut inside = false;
        let mut j = VERTEX_COUNT - 1;
        for i in 0..VERTEX_COUNT {
            let a = self.vertices[i];
            let b = self.vertices[j];
            if (a.y > point.y) != (b.y > point.y) {
                let crossing_x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if point.x < crossing_x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}
