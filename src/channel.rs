use crate::angle::{bearing_of, normalize};
use crate::constants::*;
use crate::polygon::{Pose, VisionPolygon};
use crate::utils::RandomSource;
use glam::DVec2;
use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelGenome {
    // Vision polygon in local, angle-0 coordinates.
    pub vertices: [DVec2; VERTEX_COUNT],
    pub reaction_speed: f64,
    pub reaction_weight: f64,
    // Carried and inherited, but not used when blending.
    pub distance_importance: f64,
    pub relative_angle: f64,
    pub vector_reaction_speed: f64,
    pub vector_reaction_weight: f64,
    pub vector_relative_angle: f64,
}

impl ChannelGenome {
    pub fn random<R: RandomSource + ?Sized>(vision_radius: f64, rng: &mut R) -> Self {
        let vertices = *VisionPolygon::generate(vision_radius, rng).vertices();
        let reaction_speed = rng.next_f64() * MAX_REACTION_SPEED;
        let distance_importance = rng.next_f64() * MAX_DISTANCE_IMPORTANCE;
        let relative_angle = rng.next_f64() * TAU;
        let vector_reaction_speed = rng.next_f64() * 2.0 - 1.0;
        let vector_relative_angle = rng.next_f64() * TAU;
        Self {
            vertices,
            reaction_speed,
            reaction_weight: INITIAL_REACTION_WEIGHT,
            distance_importance,
            relative_angle,
            vector_reaction_speed,
            vector_reaction_weight: INITIAL_VECTOR_REACTION_WEIGHT,
            vector_relative_angle,
        }
    }

    pub fn regular(vision_radius: f64) -> Self {
        Self {
            vertices: *VisionPolygon::regular(vision_radius).vertices(),
            reaction_speed: 1.0,
            reaction_weight: INITIAL_REACTION_WEIGHT,
            distance_importance: 0.0,
            relative_angle: 0.0,
            vector_reaction_speed: 0.0,
            vector_reaction_weight: INITIAL_VECTOR_REACTION_WEIGHT,
            vector_relative_angle: 0.0,
        }
    }

    #[inline]
    pub fn local_polygon(&self) -> VisionPolygon {
        VisionPolygon::new(self.vertices)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kinematics {
    pub position: DVec2,
    pub heading: f64,
    pub speed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSummary {
    pub count: usize,
    pub distance: f64,
    // Bearing from the owner towards the (average) detected position.
    pub bearing_to_group: f64,
    // Owner position minus average detected position.
    pub offset: DVec2,
    pub avg_heading: f64,
    pub avg_speed: f64,
}

#[derive(Debug, Clone)]
pub struct PerceptionChannel {
    genome: ChannelGenome,
    polygon: VisionPolygon,
    detected: Vec<usize>,
}

impl PerceptionChannel {
    pub fn new(genome: ChannelGenome, pose: Pose) -> Self {
        Self {
            polygon: genome.local_polygon().posed(pose),
            genome,
            detected: Vec::new(),
        }
    }

    #[inline]
    pub fn genome(&self) -> &ChannelGenome {
        &self.genome
    }

    #[inline]
    pub fn polygon(&self) -> &VisionPolygon {
        &self.polygon
    }

    #[inline]
    pub fn detected(&self) -> &[usize] {
        &self.detected
    }

    pub fn repose(&mut self, previous: Pose, current: Pose) {
        self.polygon.repose(previous, current);
    }

    pub fn add(&mut self, slot: usize) {
        debug_assert!(
            !self.detected.contains(&slot),
            "slot {slot} added twice to one channel"
        );
        self.detected.push(slot);
    }

    pub fn set_detected(&mut self, slots: Vec<usize>) {
        self.detected = slots;
    }

    #[inline]
    pub fn has_detections(&self) -> bool {
        !self.detected.is_empty()
    }

    pub fn clear(&mut self) {
        self.detected.clear();
    }

    pub fn summarize(&self, owner: DVec2, neighbours: &[Kinematics]) -> Option<ChannelSummary> {
        let (average_position, avg_heading, avg_speed) = match self.detected.as_slice() {
            [] => return None,
            [only] => {
                let n = neighbours[*only];
                (n.position, n.heading, n.speed)
            }
            many => {
                let mut position_sum = DVec2::ZERO;
                let mut heading_sum = DVec2::ZERO;
                let mut speed_sum = 0.0;
                for &slot in many {
                    let n = neighbours[slot];
                    position_sum += n.position;
                    // Angles wrap, so headings are averaged as unit vectors.
                    heading_sum += DVec2::from_angle(n.heading);
                    speed_sum += n.speed;
                }
                let count = many.len() as f64;
                (
                    position_sum / count,
                    normalize(heading_sum.y.atan2(heading_sum.x)),
                    speed_sum / count,
                )
            }
        };

        let offset = owner - average_position;
        // The bearing of the offset points back at the owner; flip it to face the group.
        let bearing_to_group = normalize(bearing_of(offset) + std::f64::consts::PI);
        Some(ChannelSummary {
            count: self.detected.len(),
            distance: offset.length(),
            bearing_to_group,
            offset,
            avg_heading,
            avg_speed,
        })
    }
}
