use std::sync::mpsc::{self, Receiver, Sender};

use rapier2d::na::{Point2, Vector2};
use rapier2d::prelude::*;

use crate::geometry::{BodySpec, Shape, Tag};
use crate::host::{BodyHandle, BodyView, Collision, SimulationHost};

/// Fraction of velocity lost per second by moving bodies, standing in for air drag
const LINEAR_DAMPING: f32 = 0.6;
const FRICTION: f32 = 0.1;

struct TrackedBody {
    handle: RigidBodyHandle,
    tag: Tag,
    shape: Shape,
}

/// Forwards collision events raised inside the pipeline to the host.
///
/// Plays the part of rapier's `ChannelEventCollector` over a std channel, dropping contact
/// force events since nothing reads them.
struct CollisionCollector {
    sender: Sender<CollisionEvent>,
}

impl EventHandler for CollisionCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        // The receiver lives in the same host, so this only fails during drop
        self.sender.send(event).ok();
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// A [`SimulationHost`] backed by rapier2d.
pub struct RapierHost {
    gravity: Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,

    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,

    /// Bodies in insertion order; a [`BodyHandle`] indexes into this
    bodies: Vec<TrackedBody>,

    collision_collector: CollisionCollector,
    collision_rx: Receiver<CollisionEvent>,
}

impl Default for RapierHost {
    /// A world without gravity stepping 60 times per second
    fn default() -> Self {
        Self::new(60.0)
    }
}

impl RapierHost {
    /// Create an empty world advancing `1 / ticks_per_second` seconds per step.
    pub fn new(ticks_per_second: f32) -> Self {
        let (collision_tx, collision_rx) = mpsc::channel();

        Self {
            gravity: vector![0.0, 0.0],
            integration_parameters: IntegrationParameters {
                dt: 1.0 / ticks_per_second,
                ..IntegrationParameters::default()
            },
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),

            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),

            bodies: Vec::new(),

            collision_collector: CollisionCollector {
                sender: collision_tx,
            },
            collision_rx,
        }
    }

    fn rigid_body_handle(&self, body: BodyHandle) -> RigidBodyHandle {
        self.bodies[body.index()].handle
    }

    fn tag_of(&self, collider: ColliderHandle) -> Option<Tag> {
        self.collider_set
            .get(collider)
            .and_then(|collider| Tag::from_user_data(collider.user_data))
    }
}

impl SimulationHost for RapierHost {
    fn add_body(&mut self, spec: &BodySpec) -> BodyHandle {
        let rigid_body = if spec.is_static {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
                .linear_damping(LINEAR_DAMPING)
                .ccd_enabled(true)
        }
        .translation(spec.center.coords)
        .build();
        let handle = self.rigid_body_set.insert(rigid_body);

        let collider = match spec.shape {
            Shape::Rectangle { width, height } => ColliderBuilder::cuboid(width / 2.0, height / 2.0),
            Shape::Circle { radius } => ColliderBuilder::ball(radius),
        }
        .user_data(spec.tag.into())
        .active_events(ActiveEvents::COLLISION_EVENTS)
        .friction(FRICTION)
        .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        self.bodies.push(TrackedBody {
            handle,
            tag: spec.tag,
            shape: spec.shape,
        });
        BodyHandle::new(self.bodies.len() - 1)
    }

    fn step(&mut self) -> Vec<Collision> {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &self.collision_collector,
        );

        self.collision_rx
            .try_iter()
            .filter(|event| event.started())
            .filter_map(|event| {
                let first = self.tag_of(event.collider1())?;
                let second = self.tag_of(event.collider2())?;
                Some(Collision::new(first, second))
            })
            .collect()
    }

    fn velocity(&self, body: BodyHandle) -> Vector2<f32> {
        let linvel = *self.rigid_body_set[self.rigid_body_handle(body)].linvel();
        linvel * self.integration_parameters.dt
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vector2<f32>) {
        let handle = self.rigid_body_handle(body);
        let dt = self.integration_parameters.dt;
        self.rigid_body_set[handle].set_linvel(velocity / dt, true);
    }

    fn set_static(&mut self, body: BodyHandle, is_static: bool) {
        let handle = self.rigid_body_handle(body);
        let body_type = if is_static {
            RigidBodyType::Fixed
        } else {
            RigidBodyType::Dynamic
        };
        self.rigid_body_set[handle].set_body_type(body_type, true);
    }

    fn gravity(&self) -> Vector2<f32> {
        self.gravity
    }

    fn set_gravity(&mut self, gravity: Vector2<f32>) {
        self.gravity = gravity;
        // Sleeping bodies would otherwise ignore the new gravity until something hits them
        for (_, body) in self.rigid_body_set.iter_mut() {
            if body.is_dynamic() {
                body.wake_up(true);
            }
        }
    }

    fn bodies_tagged(&self, tag: Tag) -> Vec<BodyHandle> {
        self.bodies
            .iter()
            .enumerate()
            .filter(|(_, tracked)| tracked.tag == tag)
            .map(|(idx, _)| BodyHandle::new(idx))
            .collect()
    }

    fn snapshot(&self) -> Vec<BodyView> {
        self.bodies
            .iter()
            .map(|tracked| {
                let body = &self.rigid_body_set[tracked.handle];
                BodyView {
                    tag: tracked.tag,
                    shape: tracked.shape,
                    center: Point2::from(*body.translation()),
                    rotation: body.rotation().angle(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(tag: Tag, x: f32, y: f32, shape: Shape, is_static: bool) -> BodySpec {
        BodySpec {
            tag,
            center: Point2::new(x, y),
            shape,
            is_static,
        }
    }

    #[test]
    fn test_velocity_is_per_step() {
        let mut host = RapierHost::new(60.0);
        let ball = host.add_body(&spec(
            Tag::Ball,
            0.0,
            0.0,
            Shape::Circle { radius: 5.0 },
            false,
        ));
        host.set_velocity(ball, Vector2::new(5.0, -5.0));
        let velocity = host.velocity(ball);
        assert!((velocity.x - 5.0).abs() < 1e-3);
        assert!((velocity.y + 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_reports_ball_goal_collision() {
        let mut host = RapierHost::new(60.0);
        let ball = host.add_body(&spec(
            Tag::Ball,
            0.0,
            0.0,
            Shape::Circle { radius: 5.0 },
            false,
        ));
        host.add_body(&spec(
            Tag::Goal,
            30.0,
            0.0,
            Shape::Rectangle {
                width: 10.0,
                height: 10.0,
            },
            true,
        ));
        host.set_velocity(ball, Vector2::new(2.0, 0.0));

        let collided = (0..120)
            .flat_map(|_| host.step())
            .any(|collision| collision.is_between(Tag::Ball, Tag::Goal));
        assert!(collided);
    }

    #[test]
    fn test_released_wall_falls() {
        let mut host = RapierHost::new(60.0);
        let wall_shape = Shape::Rectangle {
            width: 20.0,
            height: 5.0,
        };
        let released = host.add_body(&spec(Tag::Wall, 0.0, 0.0, wall_shape, true));
        host.add_body(&spec(Tag::Wall, 100.0, 0.0, wall_shape, true));

        host.set_gravity(Vector2::new(0.0, 980.0));
        host.set_static(released, false);
        for _ in 0..30 {
            host.step();
        }

        let views = host.snapshot();
        assert!(views[0].center.y > 10.0, "released wall at {}", views[0].center.y);
        assert_eq!(views[1].center, Point2::new(100.0, 0.0));
    }

    #[test]
    fn test_bodies_tagged() {
        let mut host = RapierHost::default();
        let square = Shape::Rectangle {
            width: 1.0,
            height: 1.0,
        };
        let handles = host.add_bodies(&[
            spec(Tag::Boundary, 0.0, 0.0, square, true),
            spec(Tag::Wall, 5.0, 0.0, square, true),
            spec(Tag::Wall, 10.0, 0.0, square, true),
        ]);
        assert_eq!(host.bodies_tagged(Tag::Wall), handles[1..].to_vec());
        assert!(host.bodies_tagged(Tag::Ball).is_empty());
        assert_eq!(host.gravity(), Vector2::new(0.0, 0.0));
    }
}
