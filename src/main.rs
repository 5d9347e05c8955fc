use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use music_runner::build_info;
use music_runner::client::ScoreClient;
use music_runner::config::{ClientConfig, ServerConfig};
use music_runner::game::{
    GameController, GameStatus, HighScore, PhysicsConfig, RunnerInput, ScoreSubmitter,
};
use music_runner::scores::{FileStore, MemoryStore, ScoreService};
use music_runner::ui::draw_ui;
use music_runner::web::{start_score_server, ScoreServer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Input poll timeout; roughly one physics tick.
const FRAME_POLL_MS: u64 = 16;

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("serve") => serve(&args[2..]),
        Some("--version") | Some("-v") => {
            println!("music-runner {}", build_info::version_string());
            Ok(())
        }
        Some("--help") | Some("-h") => {
            print_help();
            Ok(())
        }
        _ => play(&args[1..]),
    }
}

fn print_help() {
    println!("Music Runner - terminal runner with a shared leaderboard\n");
    println!("Usage:");
    println!("  music-runner [options]        Play");
    println!("  music-runner serve [options]  Run the score server\n");
    println!("Play options:");
    println!("  --name NAME     Player name (default: $MUSIC_RUNNER_NAME or $USER)");
    println!("  --api URL       Score API base URL (default: $MUSIC_RUNNER_API or http://localhost:3001/api)");
    println!("  --offline       Play without a score server");
    println!("  --grounded      Jump only from the floor; the floor is safe");
    println!("  --seed N        Fixed obstacle seed\n");
    println!("Serve options:");
    println!("  --port N        Listen port (default: $PORT or 3001)");
    println!("  --host ADDR     Listen address (default: $HOST or 0.0.0.0)");
    println!("  --scores-file P Score file (default: $SCORES_FILE or the data directory)");
    println!("  --memory        Keep scores in memory only\n");
    println!("  --version       Show version information");
    println!("  --help          Show this help message");
}

fn invalid_input(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
}

fn serve(args: &[String]) -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env(args).map_err(invalid_input)?;

    let service = if config.in_memory {
        log::info!("Using in-memory score store");
        ScoreService::new(MemoryStore::new())
    } else {
        let path = match config.scores_file.clone() {
            Some(path) => path,
            None => FileStore::default_path()?,
        };
        let store = FileStore::open(path).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        ScoreService::new(store)
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(start_score_server(
        config.socket_addr(),
        Arc::new(ScoreServer::new(service)),
    ))
}

fn play(args: &[String]) -> io::Result<()> {
    // The alternate screen owns stdout; only warnings reach stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = ClientConfig::from_env(args).map_err(invalid_input)?;

    let submitter: Option<Box<dyn ScoreSubmitter>> = if config.offline {
        None
    } else {
        let client = ScoreClient::new(&config.api_url);
        if let Err(e) = client.health() {
            log::warn!("Score server at {} not reachable: {}", client.base_url(), e);
        }
        Some(Box::new(client))
    };

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let physics = PhysicsConfig {
        jump_rule: config.jump_rule,
        ..PhysicsConfig::default()
    };
    let mut ctrl = GameController::with_config(
        physics,
        rng,
        config.player_name.clone(),
        HighScore::load_default(),
        submitter,
    );
    ctrl.refresh_leaderboard();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_game(&mut terminal, &mut ctrl);

    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    println!(
        "Thanks for playing, {}! Best score: {}",
        ctrl.player_name(),
        ctrl.high_score()
    );
    Ok(())
}

fn run_game(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ctrl: &mut GameController,
) -> io::Result<()> {
    let mut last_frame = Instant::now();

    loop {
        terminal.draw(|frame| draw_ui(frame, &*ctrl))?;

        if event::poll(Duration::from_millis(FRAME_POLL_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let status = ctrl.game().status;
                match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Char(' ') | KeyCode::Up | KeyCode::Char('w') => {
                        ctrl.handle_input(RunnerInput::Jump)
                    }
                    KeyCode::Enter => ctrl.handle_input(RunnerInput::Start),
                    KeyCode::Char('r') | KeyCode::Char('R') if status == GameStatus::GameOver => {
                        ctrl.retry_submission();
                    }
                    KeyCode::Char('l') | KeyCode::Char('L') if status != GameStatus::Playing => {
                        ctrl.refresh_leaderboard()
                    }
                    _ => ctrl.handle_input(RunnerInput::Other),
                }
            }
        }

        let now = Instant::now();
        let dt_ms = now.duration_since(last_frame).as_millis() as u64;
        last_frame = now;
        ctrl.tick(dt_ms);
    }

    Ok(())
}
