use mazefall::{
    app::App,
    config::{ConfigError, GameConfig, USAGE},
    controller::GameState,
    logging,
};

fn main() -> std::io::Result<()> {
    let mut args = std::env::args();
    args.next(); // Skip executable name

    let config = match GameConfig::from_args(args) {
        Ok(config) => config,
        Err(ConfigError::HelpRequested) => {
            println!("{}", USAGE);
            return Ok(());
        }
        Err(err) => {
            eprintln!("Error: {}\n\n{}", err, USAGE);
            return Ok(());
        }
    };

    // Flushes buffered log lines when dropped at the end of main
    let _log_guard = logging::init_from_env();
    tracing::info!("Starting with {:?}", config);

    let app = App::new(config);
    let mut stdout = std::io::stdout();
    App::setup_terminal(&mut stdout)?;
    let outcome = app.run();
    App::restore_terminal(&mut stdout)?;

    match outcome? {
        GameState::Won => println!("You reached the goal!"),
        GameState::Playing => println!("Bye."),
    }
    Ok(())
}
