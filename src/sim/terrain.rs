//! Terrain streaming
//!
//! The corridor is a line of stages laid end to end along +z. Stage `i` is
//! centred on `z = i * length`. Only two stages are ever live: the one the
//! player is on and the one ahead. Once the player passes the midpoint of
//! the front pair the back stage is evicted and a new one appended.

use std::collections::VecDeque;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::resource::{Release, release_all};
use crate::settings::Settings;

/// Which piece of a stage a part is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartKind {
    Ground,
    LeftWall,
    RightWall,
}

/// One renderable piece of a stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentPart {
    pub kind: PartKind,
    /// Index of the owning segment
    pub segment: u32,
    pub center: Vec3,
    pub size: Vec3,
    released: bool,
}

impl SegmentPart {
    fn new(kind: PartKind, segment: u32, center: Vec3, size: Vec3) -> Self {
        Self {
            kind,
            segment,
            center,
            size,
            released: false,
        }
    }
}

impl Release for SegmentPart {
    fn release(&mut self) {
        debug_assert!(
            !self.released,
            "segment {} {:?} released twice",
            self.segment, self.kind
        );
        self.released = true;
    }

    fn is_released(&self) -> bool {
        self.released
    }
}

/// Stage dimensions shared by every segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageLayout {
    pub width: f32,
    pub length: f32,
    pub wall_height: f32,
    pub wall_thickness: f32,
}

impl From<&Settings> for StageLayout {
    fn from(settings: &Settings) -> Self {
        Self {
            width: settings.stage_width,
            length: settings.stage_length,
            wall_height: settings.wall_height,
            wall_thickness: settings.wall_thickness,
        }
    }
}

/// A stage: ground plus the two walls flanking it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainSegment {
    pub index: u32,
    pub parts: [SegmentPart; 3],
}

impl TerrainSegment {
    pub fn new(index: u32, layout: &StageLayout) -> Self {
        let origin = index as f32 * layout.length;
        let half = layout.width / 2.0;
        let wall_x = half + layout.wall_thickness / 2.0;
        let wall_size = Vec3::new(layout.wall_thickness, layout.wall_height, layout.length);
        let wall_y = layout.wall_height / 2.0;

        Self {
            index,
            parts: [
                SegmentPart::new(
                    PartKind::Ground,
                    index,
                    Vec3::new(0.0, 0.0, origin),
                    Vec3::new(layout.width, 0.0, layout.length),
                ),
                SegmentPart::new(
                    PartKind::LeftWall,
                    index,
                    Vec3::new(wall_x, wall_y, origin),
                    wall_size,
                ),
                SegmentPart::new(
                    PartKind::RightWall,
                    index,
                    Vec3::new(-wall_x, wall_y, origin),
                    wall_size,
                ),
            ],
        }
    }

    /// Forward coordinate the segment is centred on
    #[inline]
    pub fn origin(&self) -> f32 {
        self.parts[0].center.z
    }

    /// Forward span `[start, end)` covered by the ground
    pub fn span(&self) -> (f32, f32) {
        let half = self.parts[0].size.z / 2.0;
        (self.origin() - half, self.origin() + half)
    }
}

impl Release for TerrainSegment {
    fn release(&mut self) {
        debug_assert!(!self.is_released(), "segment {} evicted twice", self.index);
        if self.is_released() {
            return;
        }
        release_all(self.parts.iter_mut());
    }

    fn is_released(&self) -> bool {
        self.parts.iter().all(SegmentPart::is_released)
    }
}

/// What a terrain reconcile changed
#[derive(Debug, Default)]
pub struct TerrainDelta {
    /// Indices of new segments
    pub created: Vec<u32>,
    /// Segments that left the window, already released
    pub evicted: Vec<TerrainSegment>,
}

/// Owns the live window of terrain segments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainStreamer {
    layout: StageLayout,
    live: VecDeque<TerrainSegment>,
}

impl TerrainStreamer {
    /// Start with the first two stages live
    pub fn new(layout: StageLayout) -> Self {
        let live = (0..2).map(|i| TerrainSegment::new(i, &layout)).collect();
        Self { layout, live }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(StageLayout::from(settings))
    }

    pub fn layout(&self) -> &StageLayout {
        &self.layout
    }

    /// Live segments, oldest first
    pub fn segments(&self) -> impl ExactSizeIterator<Item = &TerrainSegment> {
        self.live.iter()
    }

    pub fn highest_index(&self) -> Option<u32> {
        self.live.back().map(|s| s.index)
    }

    /// Slide the window to follow the player
    ///
    /// The window after a reconcile is always the segment under the player
    /// plus the one ahead. A jump of several stages evicts the whole old
    /// window and creates only the two new segments.
    pub fn reconcile(&mut self, player_z: f32) -> TerrainDelta {
        let mut delta = TerrainDelta::default();
        if !player_z.is_finite() {
            log::warn!("Ignoring terrain reconcile at z={}", player_z);
            return delta;
        }
        let Some(highest) = self.highest_index() else {
            return delta;
        };

        // Saturates at u32::MAX for positions past the last addressable stage
        let wanted = (player_z / self.layout.length + 0.5).ceil() as u32;
        if wanted <= highest {
            return delta;
        }

        let first = wanted - 1;
        while self.live.front().is_some_and(|s| s.index < first) {
            if let Some(mut oldest) = self.live.pop_front() {
                oldest.release();
                log::debug!("Evicted segment {}", oldest.index);
                delta.evicted.push(oldest);
            }
        }

        for index in first.max(highest + 1)..=wanted {
            self.live.push_back(TerrainSegment::new(index, &self.layout));
            log::debug!(
                "Created segment {} at z={}",
                index,
                index as f32 * self.layout.length
            );
            delta.created.push(index);
        }

        delta
    }
}
