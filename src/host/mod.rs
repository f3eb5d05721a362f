//! The physics world the game runs in.
//!
//! The game only talks to the world through [`SimulationHost`], so the controller can be
//! driven against an in-memory host in tests while the binary uses [`RapierHost`].

mod rapier;

use rapier2d::na::{Point2, Vector2};

pub use rapier::RapierHost;

use crate::geometry::{BodySpec, Shape, Tag};

/// Opaque reference to a body owned by a [`SimulationHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(usize);

impl BodyHandle {
    pub(crate) fn new(index: usize) -> Self {
        BodyHandle(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Two tagged bodies that started touching during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    pub first: Tag,
    pub second: Tag,
}

impl Collision {
    pub fn new(first: Tag, second: Tag) -> Self {
        Collision { first, second }
    }

    /// Checks whether the participants are exactly `{a, b}`, in either order.
    pub fn is_between(&self, a: Tag, b: Tag) -> bool {
        (self.first == a && self.second == b) || (self.first == b && self.second == a)
    }
}

/// Where a body currently is, for drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyView {
    pub tag: Tag,
    pub shape: Shape,
    pub center: Point2<f32>,
    /// Counter-clockwise rotation in radians
    pub rotation: f32,
}

/// Operations the game needs from a physics engine.
///
/// Velocities are in world units per step; gravity is in world units per second squared.
pub trait SimulationHost {
    fn add_body(&mut self, spec: &BodySpec) -> BodyHandle;

    fn add_bodies<'a, I>(&mut self, specs: I) -> Vec<BodyHandle>
    where
        I: IntoIterator<Item = &'a BodySpec>,
        Self: Sized,
    {
        specs.into_iter().map(|spec| self.add_body(spec)).collect()
    }

    /// Advance the simulation by one tick and return the collisions that started during it.
    fn step(&mut self) -> Vec<Collision>;

    fn velocity(&self, body: BodyHandle) -> Vector2<f32>;

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vector2<f32>);

    /// Switch a body between immovable and dynamic.
    fn set_static(&mut self, body: BodyHandle, is_static: bool);

    fn gravity(&self) -> Vector2<f32>;

    fn set_gravity(&mut self, gravity: Vector2<f32>);

    fn bodies_tagged(&self, tag: Tag) -> Vec<BodyHandle>;

    fn snapshot(&self) -> Vec<BodyView>;
}
