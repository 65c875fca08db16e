//! Benchmark scenarios.
//!
//! Each scenario is a deterministic world builder: same kind, same
//! space, same results.

use tumble_collide::circle::moment_for_circle;
use tumble_collide::polygon::moment_for_box;
use tumble_dynamics::{Body, PivotJoint, Space, SpaceConfig};
use tumble_math::Vec2;
use tumble_types::constants::DEFAULT_DT;

/// Which scenario to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioKind {
    /// A grid of circles raining onto a segment floor.
    CircleRain,
    /// A stack of boxes settling on a segment floor (sleeping enabled).
    BoxStack,
    /// A hanging chain of bodies linked by pivot joints.
    PivotChain,
}

impl ScenarioKind {
    /// All defined scenarios.
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::CircleRain,
            ScenarioKind::BoxStack,
            ScenarioKind::PivotChain,
        ]
    }

    /// Scenario name for reports.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::CircleRain => "circle_rain",
            ScenarioKind::BoxStack => "box_stack",
            ScenarioKind::PivotChain => "pivot_chain",
        }
    }
}

/// A runnable benchmark scenario.
pub struct Scenario {
    /// Scenario kind.
    pub kind: ScenarioKind,
    /// Number of timesteps to run.
    pub timesteps: u32,
    /// Timestep length (seconds).
    pub dt: f64,
}

impl Scenario {
    /// Default parameters for a scenario kind.
    pub fn from_kind(kind: ScenarioKind) -> Self {
        Self {
            kind,
            timesteps: 240,
            dt: DEFAULT_DT,
        }
    }

    /// Build the scenario's world.
    pub fn build(&self) -> Space {
        match self.kind {
            ScenarioKind::CircleRain => build_circle_rain(),
            ScenarioKind::BoxStack => build_box_stack(),
            ScenarioKind::PivotChain => build_pivot_chain(),
        }
    }
}

fn ground(space: &mut Space, half_width: f64) {
    let body = space.static_body();
    space.add_segment(
        body,
        Vec2::new(-half_width, 0.0),
        Vec2::new(half_width, 0.0),
        0.0,
    );
}

fn build_circle_rain() -> Space {
    let mut space = Space::new();
    space.config.gravity = Vec2::new(0.0, -10.0);

    ground(&mut space, 30.0);

    let radius = 0.4;
    for row in 0..6 {
        for col in 0..10 {
            let mut body = Body::new(1.0, moment_for_circle(1.0, 0.0, radius, Vec2::ZERO));
            // Stagger columns so the rain doesn't land in one line.
            body.p = Vec2::new(
                col as f64 - 4.5 + 0.1 * (row % 2) as f64,
                4.0 + row as f64 * 1.2,
            );
            let id = space.add_body(body);
            let shape = space.add_circle(id, radius, Vec2::ZERO);
            space.shape_mut(shape).friction = 0.7;
            space.shape_mut(shape).elasticity = 0.2;
        }
    }
    space
}

fn build_box_stack() -> Space {
    let mut space = Space::with_config(SpaceConfig {
        gravity: Vec2::new(0.0, -10.0),
        sleep_time_threshold: 0.5,
        ..SpaceConfig::default()
    });

    ground(&mut space, 30.0);

    let size = 1.0;
    for level in 0..8 {
        let mut body = Body::new(1.0, moment_for_box(1.0, size, size));
        body.p = Vec2::new(0.0, 0.45 + level as f64 * (size + 0.02));
        let id = space.add_body(body);
        let shape = space.add_box(id, size, size).expect("box verts are valid");
        space.shape_mut(shape).friction = 0.8;
    }
    space
}

fn build_pivot_chain() -> Space {
    let mut space = Space::new();
    space.config.gravity = Vec2::new(0.0, -10.0);

    let anchor = space.static_body();
    let link_len = 1.0;
    let mut prev = anchor;
    for i in 0..12 {
        let mut body = Body::new(1.0, moment_for_circle(1.0, 0.0, 0.2, Vec2::ZERO));
        body.p = Vec2::new((i + 1) as f64 * link_len, 0.0);
        let id = space.add_body(body);
        let shape = space.add_circle(id, 0.2, Vec2::ZERO);
        // Chain links must not collide with each other.
        space.shape_mut(shape).group = tumble_types::Group(1);

        let pivot = {
            let (pa, pb) = (space.body(prev), space.body(id));
            PivotJoint::new(pa, prev, pb, id, Vec2::new(i as f64 * link_len + 0.5, 0.0))
        };
        space.add_constraint(Box::new(pivot));
        prev = id;
    }
    space
}
