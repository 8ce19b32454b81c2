//! Round tuning.
//!
//! Every theme-specific constant (piece shape, row counts, spacing,
//! projectile size and throw strength, timer lengths) lives in one
//! [`RoundConfig`] record. Presets cover the cube and can themes in tabletop
//! and room-scale play; anything else can be loaded from JSON.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use topple_engine::ColliderDesc;

use crate::error::ConfigError;

/// Visual/physical theme of the tower pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Cubes,
    Cans,
}

/// Physical scale of play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    /// Tower sized for a table top.
    Tabletop,
    /// Tower sized for the floor of a room.
    RoomScale,
}

impl PlayMode {
    /// Length multiplier applied to the tabletop layout.
    pub fn scale(self) -> f32 {
        match self {
            PlayMode::Tabletop => 1.0,
            PlayMode::RoomScale => 3.0,
        }
    }
}

/// Shape of one tower piece. Sizes are full extents in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PieceShape {
    Box { size: f32 },
    Can { radius: f32, height: f32 },
}

impl PieceShape {
    pub fn width(&self) -> f32 {
        match *self {
            PieceShape::Box { size } => size,
            PieceShape::Can { radius, .. } => radius * 2.0,
        }
    }

    pub fn height(&self) -> f32 {
        match *self {
            PieceShape::Box { size } => size,
            PieceShape::Can { height, .. } => height,
        }
    }

    pub fn collider(&self) -> ColliderDesc {
        match *self {
            PieceShape::Box { size } => ColliderDesc::Cuboid {
                half_extents: Vec3::splat(size * 0.5),
            },
            PieceShape::Can { radius, height } => ColliderDesc::Cylinder {
                half_height: height * 0.5,
                radius,
            },
        }
    }

    fn scaled(self, factor: f32) -> Self {
        match self {
            PieceShape::Box { size } => PieceShape::Box { size: size * factor },
            PieceShape::Can { radius, height } => PieceShape::Can {
                radius: radius * factor,
                height: height * factor,
            },
        }
    }
}

/// Geometry of the stacked target structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerLayout {
    /// Pieces per row, bottom row first.
    pub rows: Vec<u32>,
    pub piece: PieceShape,
    /// Horizontal gap between neighbouring pieces in a row.
    pub gap: f32,
    /// Vertical gap between stacked rows.
    pub row_gap: f32,
    /// Gap between the support slab's top face and the bottom row.
    pub clearance: f32,
    /// Half extents of the static support slab.
    pub slab_half_extents: Vec3,
    pub piece_density: f32,
}

impl TowerLayout {
    pub fn target_count(&self) -> usize {
        self.rows.iter().map(|&n| n as usize).sum()
    }

    fn scaled(mut self, factor: f32) -> Self {
        self.piece = self.piece.scaled(factor);
        self.gap *= factor;
        self.row_gap *= factor;
        self.clearance *= factor;
        self.slab_half_extents *= factor;
        self
    }
}

impl Default for TowerLayout {
    fn default() -> Self {
        Self {
            rows: vec![3, 2, 1],
            piece: PieceShape::Box { size: 0.1 },
            gap: 0.01,
            row_gap: 0.002,
            clearance: 0.001,
            slab_half_extents: Vec3::new(0.2, 0.01, 0.1),
            piece_density: 300.0,
        }
    }
}

/// The thrown object and how it is held and launched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileSpec {
    pub radius: f32,
    pub density: f32,
    /// Distance in front of the viewer where a held projectile appears.
    pub forward_offset: f32,
    /// Height above the viewer's eye line where a held projectile appears.
    pub lift: f32,
    /// Magnitude of the launch impulse along the viewer's forward vector.
    pub impulse: f32,
}

impl ProjectileSpec {
    pub fn collider(&self) -> ColliderDesc {
        ColliderDesc::Ball { radius: self.radius }
    }

    fn scaled(mut self, factor: f32) -> Self {
        self.radius *= factor;
        self.forward_offset *= factor;
        self.lift *= factor;
        // Mass grows with volume; keep the launch speed the same.
        self.impulse *= factor * factor * factor;
        self
    }
}

impl Default for ProjectileSpec {
    fn default() -> Self {
        Self {
            radius: 0.03,
            density: 1000.0,
            forward_offset: 0.3,
            lift: 0.05,
            impulse: 0.35,
        }
    }
}

/// Lengths of the deferred steps of a round, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Placement until the stack turns dynamic and the first projectile appears.
    pub activation_delay: f32,
    /// Throw until the next projectile is handed out.
    pub settle_delay: f32,
    /// Extra wait after the last settle before a loss is declared.
    pub grace_delay: f32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            activation_delay: 0.5,
            settle_delay: 1.0,
            grace_delay: 2.0,
        }
    }
}

/// Everything tunable about a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    pub projectiles_per_round: u32,
    /// Minimum planar distance between the player and the tower anchor.
    pub min_placement_distance: f32,
    /// World height below which a target counts as knocked off.
    pub floor_height: f32,
    pub tower: TowerLayout,
    pub projectile: ProjectileSpec,
    pub timing: Timing,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            projectiles_per_round: 3,
            min_placement_distance: 0.5,
            floor_height: -1.5,
            tower: TowerLayout::default(),
            projectile: ProjectileSpec::default(),
            timing: Timing::default(),
        }
    }
}

impl RoundConfig {
    /// Built-in tuning for a theme and play mode.
    pub fn preset(theme: Theme, mode: PlayMode) -> Self {
        let mut config = Self::default();
        if theme == Theme::Cans {
            config.tower.piece = PieceShape::Can {
                radius: 0.033,
                height: 0.12,
            };
            config.tower.piece_density = 150.0;
            config.tower.gap = 0.006;
        }
        let factor = mode.scale();
        if factor != 1.0 {
            config.tower = config.tower.scaled(factor);
            config.projectile = config.projectile.scaled(factor);
        }
        config
    }

    /// Parse and validate a config from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RoundConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tower.target_count() == 0 {
            return Err(ConfigError::EmptyTower);
        }
        if self.projectiles_per_round == 0 {
            return Err(ConfigError::NoProjectiles);
        }
        positive("tower.piece width", self.tower.piece.width())?;
        positive("tower.piece height", self.tower.piece.height())?;
        positive("tower.piece_density", self.tower.piece_density)?;
        positive("projectile.radius", self.projectile.radius)?;
        positive("projectile.density", self.projectile.density)?;
        non_negative("min_placement_distance", self.min_placement_distance)?;
        non_negative("tower.gap", self.tower.gap)?;
        non_negative("tower.row_gap", self.tower.row_gap)?;
        non_negative("tower.clearance", self.tower.clearance)?;
        non_negative("timing.activation_delay", self.timing.activation_delay)?;
        non_negative("timing.settle_delay", self.timing.settle_delay)?;
        non_negative("timing.grace_delay", self.timing.grace_delay)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive(field))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative(field))
    }
}
