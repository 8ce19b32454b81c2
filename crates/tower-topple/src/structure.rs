//! Structure Builder: the stacked tower and its support slab.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use topple_engine::{ColliderDesc, EntityId};

use crate::config::TowerLayout;
use crate::ports::{BodyKind, BodyMode, BodySpec, PhysicsPort};

/// Index of a piece in build order, bottom row first, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u32);

/// One stacked piece.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: TargetId,
    pub body: EntityId,
    /// Position relative to the anchor at build time.
    pub offset: Vec3,
    pub mode: BodyMode,
    pub removed: bool,
}

/// The targets of one round plus the slab they stand on.
#[derive(Debug, Clone, PartialEq)]
pub struct Tower {
    anchor: Vec3,
    targets: Vec<Target>,
    support: EntityId,
}

impl Tower {
    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn support(&self) -> EntityId {
        self.support
    }

    /// Pieces that must come down to win.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn removed_count(&self) -> usize {
        self.targets.iter().filter(|t| t.removed).count()
    }

    /// Targets still standing (not yet scored).
    pub fn standing(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| !t.removed)
    }

    /// Let the stack fall: every standing static piece becomes dynamic.
    pub fn release(&mut self, physics: &mut impl PhysicsPort) {
        for target in self.targets.iter_mut().filter(|t| !t.removed) {
            if target.mode != BodyMode::Dynamic {
                physics.set_mode(target.body, BodyMode::Dynamic);
                target.mode = BodyMode::Dynamic;
            }
        }
    }

    /// Score every standing piece below `floor`: flag it, detach its body and
    /// return its id. A piece is reported at most once.
    pub fn collect_fallen(&mut self, floor: f32, physics: &mut impl PhysicsPort) -> Vec<TargetId> {
        let mut fallen = Vec::new();
        for target in self.targets.iter_mut().filter(|t| !t.removed) {
            let Some(pos) = physics.position(target.body) else {
                log::warn!("target {} has no body, skipping", target.id.0);
                continue;
            };
            if pos.y < floor {
                target.removed = true;
                physics.destroy_body(target.body);
                fallen.push(target.id);
            }
        }
        fallen
    }

    /// Tear the tower down, destroying every body it still owns.
    pub fn dismantle(self, physics: &mut impl PhysicsPort) {
        for target in self.targets.into_iter().filter(|t| !t.removed) {
            physics.destroy_body(target.body);
        }
        physics.destroy_body(self.support);
    }
}

/// Offsets of every piece centre from the anchor, in build order.
pub fn layout_offsets(layout: &TowerLayout) -> Vec<Vec3> {
    let width = layout.piece.width();
    let height = layout.piece.height();
    let base = 2.0 * layout.slab_half_extents.y + layout.clearance + height * 0.5;

    let mut offsets = Vec::with_capacity(layout.target_count());
    for (row, &count) in layout.rows.iter().enumerate() {
        let y = base + row as f32 * (height + layout.row_gap);
        let centre = (count as f32 - 1.0) * 0.5;
        for i in 0..count {
            let x = (i as f32 - centre) * (width + layout.gap);
            offsets.push(Vec3::new(x, y, 0.0));
        }
    }
    offsets
}

/// Offset of the slab centre from the anchor. Its bottom face sits on the anchor.
pub fn support_offset(layout: &TowerLayout) -> Vec3 {
    Vec3::new(0.0, layout.slab_half_extents.y, 0.0)
}

/// Build a tower at `anchor`. Every piece starts static.
pub fn build_tower(anchor: Vec3, layout: &TowerLayout, physics: &mut impl PhysicsPort) -> Tower {
    let support = physics.create_body(&BodySpec {
        kind: BodyKind::Support,
        shape: ColliderDesc::Cuboid {
            half_extents: layout.slab_half_extents,
        },
        mode: BodyMode::Static,
        position: anchor + support_offset(layout),
        density: layout.piece_density,
    });

    let shape = layout.piece.collider();
    let targets = layout_offsets(layout)
        .into_iter()
        .enumerate()
        .map(|(i, offset)| {
            let id = TargetId(i as u32);
            let body = physics.create_body(&BodySpec {
                kind: BodyKind::Target(id),
                shape,
                mode: BodyMode::Static,
                position: anchor + offset,
                density: layout.piece_density,
            });
            Target {
                id,
                body,
                offset,
                mode: BodyMode::Static,
                removed: false,
            }
        })
        .collect::<Vec<_>>();

    log::info!(
        "tower built at ({:.2}, {:.2}, {:.2}) with {} pieces",
        anchor.x,
        anchor.y,
        anchor.z,
        targets.len()
    );

    Tower {
        anchor,
        targets,
        support,
    }
}
