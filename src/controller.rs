//! Steering and the win condition.

use rapier2d::na::Vector2;

use crate::{
    geometry::Tag,
    host::{BodyHandle, Collision, SimulationHost},
    maze::Direction,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    #[default]
    Playing,
    /// Terminal: nothing leaves this state
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// A directional key was pressed
    Steer(Direction),
    Collision(Collision),
}

/// Side effects requested by a state transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    SetBallVelocity(Vector2<f32>),
    /// Tell the player they won
    RevealWin,
    EnableGravity,
    /// Turn every interior wall dynamic
    ReleaseWalls,
}

impl GameState {
    /// Compute the next state and its effects without touching the world.
    ///
    /// Steering sets the component of `ball_velocity` along the pressed axis to `speed`
    /// and keeps the other one. The y axis grows downward, so `Up` is negative.
    pub fn transition(
        self,
        event: &GameEvent,
        ball_velocity: Vector2<f32>,
        speed: f32,
    ) -> (GameState, Vec<Effect>) {
        match (self, event) {
            (GameState::Playing, GameEvent::Steer(direction)) => {
                let mut velocity = ball_velocity;
                match direction {
                    Direction::Up => velocity.y = -speed,
                    Direction::Down => velocity.y = speed,
                    Direction::Left => velocity.x = -speed,
                    Direction::Right => velocity.x = speed,
                }
                (GameState::Playing, vec![Effect::SetBallVelocity(velocity)])
            }
            (GameState::Playing, GameEvent::Collision(collision))
                if collision.is_between(Tag::Ball, Tag::Goal) =>
            {
                (
                    GameState::Won,
                    vec![Effect::RevealWin, Effect::EnableGravity, Effect::ReleaseWalls],
                )
            }
            (state, _) => (state, Vec::new()),
        }
    }
}

/// Owns the game state and applies transition effects to a [`SimulationHost`].
pub struct Controller {
    state: GameState,
    ball: BodyHandle,
    speed: f32,
    win_gravity: Vector2<f32>,
}

impl Controller {
    pub fn new(ball: BodyHandle, speed: f32, win_gravity: Vector2<f32>) -> Self {
        Controller {
            state: GameState::Playing,
            ball,
            speed,
            win_gravity,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_won(&self) -> bool {
        self.state == GameState::Won
    }

    /// Feed one event through the state machine and apply its effects to `host`.
    /// Returns the effects that were applied.
    pub fn handle<H: SimulationHost>(&mut self, event: GameEvent, host: &mut H) -> Vec<Effect> {
        let (next, effects) =
            self.state
                .transition(&event, host.velocity(self.ball), self.speed);
        if next != self.state {
            tracing::info!("[controller] {:?} -> {:?} on {:?}", self.state, next, event);
        }
        self.state = next;

        for effect in &effects {
            match *effect {
                Effect::SetBallVelocity(velocity) => host.set_velocity(self.ball, velocity),
                Effect::EnableGravity => host.set_gravity(self.win_gravity),
                Effect::ReleaseWalls => {
                    let walls = host.bodies_tagged(Tag::Wall);
                    tracing::debug!("[controller] Releasing {} walls", walls.len());
                    for wall in walls {
                        host.set_static(wall, false);
                    }
                }
                // Shown by the renderer
                Effect::RevealWin => {}
            }
        }
        effects
    }
}
