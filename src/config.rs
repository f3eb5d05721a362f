use std::{fmt, str::FromStr, time::Duration};

use crate::geometry::Viewport;

/// World units covered by one terminal column when the viewport follows the terminal.
pub const UNITS_PER_COLUMN: f32 = 10.0;
/// World units covered by one terminal row. Characters are about twice as tall as wide.
pub const UNITS_PER_ROW: f32 = 20.0;

pub const USAGE: &str = "\
Usage: mazefall [OPTIONS]

Options:
  --cells <HxV>      Maze columns x rows [default: 14x10]
  --size <WxH>       Viewport in world units [default: follows the terminal]
  --seed <N>         Seed for a reproducible maze
  --speed <S>        Ball speed in world units per step [default: 5]
  --gravity <G>      Gravity after winning, units per second squared [default: 980]
  --fps <N>          Simulation steps per second [default: 60]
  -h, --help         Print this message

Set MAZEFALL_LOG=<level> to write logs to mazefall.log.";

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    HelpRequested,
    UnknownFlag(String),
    MissingValue(&'static str),
    InvalidValue { flag: &'static str, value: String },
    /// A numeric value that must be positive and finite is not
    OutOfRange { flag: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::HelpRequested => write!(f, "help requested"),
            ConfigError::UnknownFlag(flag) => write!(f, "unknown option '{}'", flag),
            ConfigError::MissingValue(flag) => write!(f, "option '{}' needs a value", flag),
            ConfigError::InvalidValue { flag, value } => {
                write!(f, "invalid value '{}' for '{}'", value, flag)
            }
            ConfigError::OutOfRange { flag, value } => {
                write!(f, "value '{}' for '{}' must be positive", value, flag)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Number of maze columns
    pub cells_horizontal: usize,
    /// Number of maze rows
    pub cells_vertical: usize,
    /// Fixed viewport; `None` sizes it from the terminal
    pub viewport: Option<Viewport>,
    pub seed: Option<u64>,
    /// Ball speed in world units per step
    pub ball_speed: f32,
    /// Downward gravity switched on after a win, in units per second squared
    pub win_gravity: f32,
    pub ticks_per_second: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cells_horizontal: 14,
            cells_vertical: 10,
            viewport: None,
            seed: None,
            ball_speed: 5.0,
            win_gravity: 980.0,
            ticks_per_second: 60,
        }
    }
}

impl GameConfig {
    /// Parse command line arguments (without the executable name).
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = GameConfig::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let flag: &'static str = match arg.as_str() {
                "-h" | "--help" => return Err(ConfigError::HelpRequested),
                "--cells" => "--cells",
                "--size" => "--size",
                "--seed" => "--seed",
                "--speed" => "--speed",
                "--gravity" => "--gravity",
                "--fps" => "--fps",
                _ => return Err(ConfigError::UnknownFlag(arg.clone())),
            };
            let value = args.next().ok_or(ConfigError::MissingValue(flag))?;

            match flag {
                "--cells" => {
                    let (columns, rows) = parse_pair::<usize>(flag, &value)?;
                    if columns == 0 || rows == 0 {
                        return Err(ConfigError::OutOfRange { flag, value });
                    }
                    config.cells_horizontal = columns;
                    config.cells_vertical = rows;
                }
                "--size" => {
                    let (width, height) = parse_pair::<f32>(flag, &value)?;
                    if !is_positive(width) || !is_positive(height) {
                        return Err(ConfigError::OutOfRange { flag, value });
                    }
                    config.viewport = Some(Viewport::new(width, height));
                }
                "--seed" => config.seed = Some(parse_value(flag, &value)?),
                "--speed" => {
                    config.ball_speed = parse_positive(flag, value)?;
                }
                "--gravity" => {
                    config.win_gravity = parse_positive(flag, value)?;
                }
                "--fps" => {
                    let fps: u32 = parse_value(flag, &value)?;
                    if fps == 0 {
                        return Err(ConfigError::OutOfRange { flag, value });
                    }
                    config.ticks_per_second = fps;
                }
                _ => unreachable!("flag list and handlers are out of sync"),
            }
        }
        Ok(config)
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs(1) / self.ticks_per_second
    }

    /// Viewport for a play area of `columns x rows` terminal characters, unless a fixed
    /// one was configured.
    pub fn viewport_for(&self, columns: u16, rows: u16) -> Viewport {
        self.viewport.unwrap_or_else(|| {
            Viewport::new(
                columns.max(1) as f32 * UNITS_PER_COLUMN,
                rows.max(1) as f32 * UNITS_PER_ROW,
            )
        })
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn parse_value<T: FromStr>(flag: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        flag,
        value: value.to_string(),
    })
}

fn parse_positive(flag: &'static str, value: String) -> Result<f32, ConfigError> {
    let parsed: f32 = parse_value(flag, &value)?;
    if is_positive(parsed) {
        Ok(parsed)
    } else {
        Err(ConfigError::OutOfRange { flag, value })
    }
}

/// Parse `AxB` (also accepts `AXB`).
fn parse_pair<T: FromStr>(flag: &'static str, value: &str) -> Result<(T, T), ConfigError> {
    let (first, second) =
        value
            .split_once(['x', 'X'])
            .ok_or_else(|| ConfigError::InvalidValue {
                flag,
                value: value.to_string(),
            })?;
    Ok((parse_value(flag, first)?, parse_value(flag, second)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<GameConfig, ConfigError> {
        GameConfig::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.cells_horizontal, 14);
        assert_eq!(config.cells_vertical, 10);
        assert_eq!(config.tick_duration(), Duration::from_secs(1) / 60);
    }

    #[test]
    fn test_all_flags() {
        let config = parse(&[
            "--cells", "20x8", "--size", "800X400", "--seed", "42", "--speed", "3.5", "--gravity",
            "500", "--fps", "30",
        ])
        .unwrap();
        assert_eq!(config.cells_horizontal, 20);
        assert_eq!(config.cells_vertical, 8);
        assert_eq!(config.viewport, Some(Viewport::new(800.0, 400.0)));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.ball_speed, 3.5);
        assert_eq!(config.win_gravity, 500.0);
        assert_eq!(config.ticks_per_second, 30);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(parse(&["--help"]), Err(ConfigError::HelpRequested));
        assert_eq!(
            parse(&["--bogus"]),
            Err(ConfigError::UnknownFlag("--bogus".to_string()))
        );
        assert_eq!(parse(&["--seed"]), Err(ConfigError::MissingValue("--seed")));
        assert!(matches!(
            parse(&["--cells", "0x5"]),
            Err(ConfigError::OutOfRange { flag: "--cells", .. })
        ));
        assert!(matches!(
            parse(&["--cells", "12"]),
            Err(ConfigError::InvalidValue { flag: "--cells", .. })
        ));
        assert!(matches!(
            parse(&["--size", "inf x 300"]),
            Err(ConfigError::OutOfRange { flag: "--size", .. })
        ));
        assert!(matches!(
            parse(&["--speed", "-1"]),
            Err(ConfigError::OutOfRange { flag: "--speed", .. })
        ));
        assert!(matches!(
            parse(&["--fps", "0"]),
            Err(ConfigError::OutOfRange { flag: "--fps", .. })
        ));
    }

    #[test]
    fn test_viewport_follows_terminal() {
        let config = GameConfig::default();
        assert_eq!(config.viewport_for(84, 30), Viewport::new(840.0, 600.0));

        let fixed = GameConfig {
            viewport: Some(Viewport::new(100.0, 50.0)),
            ..GameConfig::default()
        };
        assert_eq!(fixed.viewport_for(84, 30), Viewport::new(100.0, 50.0));
    }
}
