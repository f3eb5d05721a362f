mod renderer;

use std::{
    io::{Stdout, Write},
    sync::{
        Arc,
        atomic::AtomicBool,
        mpsc::{Receiver, Sender, TryRecvError},
    },
    time::{Duration, Instant},
};

use crossterm::{
    cursor,
    event::{self, KeyCode, KeyModifiers},
    queue,
    terminal::{self, ClearType},
};
use rapier2d::na::Vector2;

pub use renderer::{Canvas, Renderer, rasterize, status_line};

use crate::{
    config::GameConfig,
    controller::{Controller, Effect, GameEvent, GameState},
    generators::generate_maze,
    geometry::Layout,
    host::{RapierHost, SimulationHost},
    maze::{Direction, Maze},
};

const PLAYING_STATUS: &str = "WASD/arrows: roll the ball into the green goal   Esc/q: quit";
const WON_STATUS: &str = "You won! The maze is falling apart. Press Esc or q to exit.";

#[derive(Debug)]
enum UserInputEvent {
    KeyPress(event::KeyEvent),
    Resize(u16, u16),
}

/// What a key press asks the game to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UserAction {
    Steer(Direction),
    Quit,
}

/// Map a key press to a game action. WASD and the arrow keys steer; Esc, q and Ctrl-C quit.
pub fn user_action(key: &event::KeyEvent) -> Option<UserAction> {
    match key.code {
        KeyCode::Esc => Some(UserAction::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(UserAction::Quit)
        }
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'q' => Some(UserAction::Quit),
            'w' => Some(UserAction::Steer(Direction::Up)),
            'a' => Some(UserAction::Steer(Direction::Left)),
            's' => Some(UserAction::Steer(Direction::Down)),
            'd' => Some(UserAction::Steer(Direction::Right)),
            _ => None,
        },
        KeyCode::Up => Some(UserAction::Steer(Direction::Up)),
        KeyCode::Left => Some(UserAction::Steer(Direction::Left)),
        KeyCode::Down => Some(UserAction::Steer(Direction::Down)),
        KeyCode::Right => Some(UserAction::Steer(Direction::Right)),
        _ => None,
    }
}

pub struct App {
    config: GameConfig,
    /// Timeout for polling input events in the input thread, a.k.a.
    /// how often to check for the stop flag
    user_input_event_poll_timeout: Duration,
}

impl App {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            user_input_event_poll_timeout: Duration::from_millis(50),
        }
    }

    /// Set a panic hook to restore terminal state on panic
    /// This ensures that the terminal is not left in raw mode or alternate screen on panic
    /// even if the panic occurs in a different thread
    fn set_panic_hook() {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = App::restore_terminal(&mut std::io::stdout()); // ignore any errors as we are already failing
            hook(panic_info);
        }));
    }

    /// Setup terminal in raw mode and enter alternate screen
    /// Also sets a panic hook to restore terminal on panic
    pub fn setup_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        terminal::enable_raw_mode()?;
        App::set_panic_hook();
        queue!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Restore terminal to original state
    /// Leave alternate screen and disable raw mode
    pub fn restore_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        queue!(stdout, terminal::LeaveAlternateScreen, cursor::Show)?;
        stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Build the world, then run the game until the player quits.
    /// Returns the state the game ended in.
    pub fn run(&self) -> std::io::Result<GameState> {
        let (terminal_columns, terminal_rows) = terminal::size()?;
        let (columns, rows) = Renderer::play_area(terminal_columns, terminal_rows);
        let viewport = self.config.viewport_for(columns, rows);

        let mut maze = Maze::new(self.config.cells_vertical, self.config.cells_horizontal);
        let start = generate_maze(&mut maze, self.config.seed);
        let layout = Layout::from_maze(&maze, viewport);
        tracing::info!(
            "[game] {}x{} maze carved from {:?}, {} interior walls over a {}x{} viewport",
            maze.columns(),
            maze.rows(),
            start,
            layout.interior_walls().count(),
            viewport.width,
            viewport.height
        );

        let mut host = RapierHost::new(self.config.ticks_per_second as f32);
        // The ball comes last in the layout
        let Some(&ball) = host.add_bodies(layout.bodies()).last() else {
            unreachable!("a layout always has a ball");
        };
        let mut controller = Controller::new(
            ball,
            self.config.ball_speed,
            Vector2::new(0.0, self.config.win_gravity),
        );

        let mut renderer = Renderer::new(terminal_columns, terminal_rows, viewport);

        // Flag to let the input thread stop. Enabled by the main thread only.
        let should_stop = Arc::new(AtomicBool::new(false));
        let (user_input_event_tx, user_input_event_rx) =
            std::sync::mpsc::channel::<UserInputEvent>();

        let should_stop_for_input = should_stop.clone();
        let poll_timeout = self.user_input_event_poll_timeout;
        let input_thread_handle = std::thread::spawn(move || -> std::io::Result<()> {
            listen_to_user_input(user_input_event_tx, poll_timeout, &should_stop_for_input)
        });

        let loop_result = self.game_loop(
            &mut host,
            &mut controller,
            &mut renderer,
            user_input_event_rx,
        );

        should_stop.store(true, std::sync::atomic::Ordering::Release);
        tracing::debug!("[game] Waiting for input thread to finish...");
        input_thread_handle
            .join()
            .expect("Input thread panicked")?;
        loop_result?;

        Ok(controller.state())
    }

    /// Fixed-tick loop: apply pending input, step the world, feed collisions to the
    /// controller, draw.
    fn game_loop<H: SimulationHost>(
        &self,
        host: &mut H,
        controller: &mut Controller,
        renderer: &mut Renderer,
        user_input_event_rx: Receiver<UserInputEvent>,
    ) -> std::io::Result<()> {
        tracing::info!("[game loop] Started");
        let tick = self.config.tick_duration();
        let mut next_tick = Instant::now();

        loop {
            loop {
                match user_input_event_rx.try_recv() {
                    Ok(UserInputEvent::KeyPress(key_event)) => match user_action(&key_event) {
                        Some(UserAction::Quit) => {
                            tracing::info!("[game loop] Quit requested");
                            return Ok(());
                        }
                        Some(UserAction::Steer(direction)) => {
                            controller.handle(GameEvent::Steer(direction), host);
                        }
                        None => {}
                    },
                    Ok(UserInputEvent::Resize(columns, rows)) => renderer.resize(columns, rows)?,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        // Input thread has exited
                        tracing::info!("[game loop] Input closed, exiting");
                        return Ok(());
                    }
                }
            }

            for collision in host.step() {
                let effects = controller.handle(GameEvent::Collision(collision), host);
                if effects.contains(&Effect::RevealWin) {
                    tracing::info!("[game loop] Goal reached!");
                }
            }

            let status = if controller.is_won() {
                WON_STATUS
            } else {
                PLAYING_STATUS
            };
            renderer.draw(&host.snapshot(), status, controller.is_won())?;

            next_tick += tick;
            let now = Instant::now();
            if next_tick > now {
                std::thread::sleep(next_tick - now);
            } else {
                // Running behind, don't try to catch up
                next_tick = now;
            }
        }
    }
}

/// Listen for user input events (key presses and resize)
/// This function runs in a separate thread, and is the only place where user input is read
fn listen_to_user_input(
    user_input_event_tx: Sender<UserInputEvent>,
    event_poll_timeout: Duration,
    should_stop: &AtomicBool,
) -> std::io::Result<()> {
    loop {
        // Check if we should stop
        if should_stop.load(std::sync::atomic::Ordering::Acquire) {
            return Ok(());
        }

        // Poll for events with a timeout
        if !event::poll(event_poll_timeout)? {
            // No event available, continue loop to check flags again
            continue;
        }

        // We only care about key presses and resizes
        let input_event = match event::read()? {
            event::Event::Key(key_event) if key_event.kind == event::KeyEventKind::Press => {
                UserInputEvent::KeyPress(key_event)
            }
            event::Event::Resize(columns, rows) => UserInputEvent::Resize(columns, rows),
            _ => continue,
        };

        let should_exit = matches!(
            &input_event,
            UserInputEvent::KeyPress(key_event) if user_action(key_event) == Some(UserAction::Quit)
        );

        // Send the input event to the main thread
        if user_input_event_tx.send(input_event).is_err() {
            // Receiver has been dropped, exit the thread
            return Ok(());
        }

        if should_exit {
            tracing::debug!("[input loop] Quit key pressed, exiting");
            return Ok(());
        }
    }
}
