// ============================================================================
// findash - Dashboard financier en terminal
// ============================================================================
// Saisie d'un ticker, requête au backend d'analyse, affichage en cartes
//
// Modes :
// - findash                : TUI interactive (par défaut)
// - findash show <TICKER>  : affiche les cartes sur stdout (ou --json)
// - findash health         : interroge GET /health
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Worker thread + channels : appels API sans bloquer l'UI
// 4. clap derive : CLI typée, variables d'environnement incluses
// ============================================================================

use std::io;
use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use findash::api::ApiClient;
use findash::app::{normalize_symbol, App, DEFAULT_TICKER};
use findash::config::BackendArgs;
use findash::models::{normalize, CanonicalSnapshot};
use findash::ui::cards::to_plain_text;
use findash::ui::dashboard::max_scroll;
use findash::ui::{render, Event, EventHandler};

// ============================================================================
// CLI
// ============================================================================
// CONCEPT RUST : #[derive(Parser)]
// - La structure décrit la ligne de commande
// - Les doc comments deviennent l'aide (--help)
// ============================================================================

/// Dashboard financier : analyse d'entreprises via le backend findash
#[derive(Debug, Parser)]
#[command(name = "findash", version, about)]
struct Cli {
    #[command(flatten)]
    backend: BackendArgs,

    /// Ticker pré-rempli dans la saisie
    #[arg(long, default_value = DEFAULT_TICKER)]
    ticker: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Affiche l'analyse d'un ticker sur stdout
    Show {
        /// Symbole boursier (ex: AAPL)
        ticker: String,

        /// Sortie JSON du snapshot normalisé
        #[arg(long)]
        json: bool,
    },

    /// Vérifie que le backend répond
    Health,
}

// ============================================================================
// AppCommand / AppResult : messages avec le worker thread
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie des commandes au worker
// - Le worker renvoie des résultats, l'UI reste seule propriétaire de App
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone)]
enum AppCommand {
    /// Récupérer et normaliser la fiche d'un ticker
    Fetch { symbol: String },
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    /// Snapshot prêt à afficher
    Loaded {
        symbol: String,
        snapshot: CanonicalSnapshot,
    },

    /// Échec : message destiné à l'utilisateur
    Failed { symbol: String, error: String },
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à rotation quotidienne
// ============================================================================

/// Répertoire des logs
///
/// - Linux : ~/.local/share/findash/logs/
/// - macOS : ~/Library/Application Support/findash/logs/
/// - Sinon : ./logs
fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("findash").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialise le logging vers fichier
///
/// ```bash
/// tail -f ~/.local/share/findash/logs/findash.log
/// RUST_LOG=findash=trace findash
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = log_directory();
    std::fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "findash.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // RUST_LOG prioritaire, sinon debug pour findash et info pour le reste
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "findash=debug,info".into()),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    info!(?log_dir, "Logging initialized");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    // .env optionnel : FINDASH_API_BASE, FINDASH_ROUTE, ...
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Si init échoue, on prévient et on continue sans logs
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    });

    let config = cli.backend.resolve();
    info!(base = %config.base_url, route = ?config.route, timeout = ?config.timeout, "findash starting up");

    let client = ApiClient::new(config).context("Failed to build HTTP client")?;

    match cli.command {
        Some(Command::Show { ticker, json }) => run_show(&client, &ticker, json),
        Some(Command::Health) => run_health(&client),
        None => run_tui(client, &cli.ticker),
    }
}

// ============================================================================
// Commandes non interactives
// ============================================================================

/// `findash show <TICKER>` : un seul fetch, sortie sur stdout
fn run_show(client: &ApiClient, ticker: &str, json: bool) -> Result<()> {
    let Some(symbol) = normalize_symbol(ticker) else {
        bail!("Ticker must not be empty");
    };

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let payload = runtime
        .block_on(client.fetch_company(&symbol))
        .with_context(|| format!("Failed to analyze {}", symbol))?;

    let snapshot = normalize(&payload);

    if json {
        let output =
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;
        println!("{}", output);
    } else {
        print!("{}", to_plain_text(&snapshot));
    }

    Ok(())
}

/// `findash health` : état du backend
fn run_health(client: &ApiClient) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let health = runtime
        .block_on(client.health())
        .with_context(|| format!("Backend at {} is not healthy", client.config().base_url))?;

    println!("{} {}", client.config().base_url, health.status);
    if let Some(service) = &health.service {
        println!("  service:   {}", service);
    }
    if let Some(timestamp) = &health.timestamp {
        println!("  timestamp: {}", timestamp);
    }

    Ok(())
}

// ============================================================================
// Mode TUI
// ============================================================================

fn run_tui(client: ApiClient, initial_ticker: &str) -> Result<()> {
    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    // L'UI est seule propriétaire de l'état : pas de Arc<Mutex<>>
    let mut app = App::new(initial_ticker);

    // CONCEPT RUST : mpsc channels
    // - command_tx/rx : UI -> worker
    // - result_tx/rx : worker -> UI
    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(client, command_rx, result_tx);

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &command_tx, &result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// CONCEPT RUST : Thread + runtime tokio dédié
// - block_on() bloque le worker, jamais l'UI
// - Une commande à la fois : l'UI n'en envoie pas d'autre pendant un chargement
// ============================================================================

fn spawn_background_worker(
    client: ApiClient,
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(error = %e, "Failed to create worker runtime");
                // Chaque commande reçoit une erreur pour ne pas bloquer l'UI en chargement
                for AppCommand::Fetch { symbol } in command_rx {
                    let _ = result_tx.send(AppResult::Failed {
                        symbol,
                        error: "Failed to start background worker".to_string(),
                    });
                }
                return;
            }
        };

        for command in command_rx {
            info!(?command, "Worker received command");

            match command {
                AppCommand::Fetch { symbol } => {
                    let result = match runtime.block_on(client.fetch_company(&symbol)) {
                        Ok(payload) => {
                            let snapshot = normalize(&payload);
                            info!(ticker = %symbol, "Snapshot ready");
                            AppResult::Loaded { symbol, snapshot }
                        }
                        Err(e) => {
                            error!(ticker = %symbol, error = ?e, "Failed to fetch company data");
                            AppResult::Failed {
                                symbol,
                                error: e.to_string(),
                            }
                        }
                    };

                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            }
        }

        info!("Worker thread exiting (channel closed)");
    });
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   1. Relève les résultats du worker
//   2. Dessine l'interface
//   3. Traite un événement (ou un tick)
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: &mpsc::Sender<AppCommand>,
    result_rx: &mpsc::Receiver<AppResult>,
) -> Result<()> {
    while app.is_running() {
        // 1. RÉSULTATS : non bloquant
        loop {
            match result_rx.try_recv() {
                Ok(AppResult::Loaded { symbol, snapshot }) => {
                    debug!(ticker = %symbol, "Displaying snapshot");
                    app.snapshot_loaded(snapshot);
                }
                Ok(AppResult::Failed { symbol, error }) => {
                    warn!(ticker = %symbol, error = %error, "Displaying fetch error");
                    app.fetch_failed(error);
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    if app.is_loading_data() {
                        error!("Worker thread disconnected during a fetch");
                        app.fetch_failed("Background worker stopped".to_string());
                    }
                    break;
                }
            }
        }

        // 2. RENDER, puis borne du défilement pour la taille courante
        let area = terminal.draw(|frame| render(frame, app))?.area;
        let limit = max_scroll(app, area);
        app.set_scroll_limit(limit);

        // 3. INPUT
        match events.next() {
            Ok(event) => handle_event(app, event, command_tx),
            Err(e) => warn!(error = %e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// La saisie est toujours active : les raccourcis passent par Entrée,
/// Échap, les flèches et Ctrl+...
fn handle_event(app: &mut App, event: Event, command_tx: &mpsc::Sender<AppCommand>) {
    use findash::ui::events::{
        get_char_from_event, is_backspace_event, is_clear_event, is_down_event, is_enter_event,
        is_force_quit_event, is_quit_event, is_ticker_char_event, is_up_event,
    };

    match event {
        Event::Key(_) if is_force_quit_event(&event) => {
            info!("User forced quit");
            app.quit();
        }

        // Échap : quit confirmation two-step
        Event::Key(_) if is_quit_event(&event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        Event::Key(_) if is_enter_event(&event) => {
            app.cancel_quit();
            if let Some(symbol) = app.submit() {
                info!(ticker = %symbol, "User submitted ticker");
                if command_tx.send(AppCommand::Fetch { symbol }).is_err() {
                    error!("Worker channel closed");
                    app.fetch_failed("Background worker stopped".to_string());
                }
            } else {
                debug!("Submit ignored (empty input or fetch in progress)");
            }
        }

        Event::Key(_) if is_clear_event(&event) => {
            app.cancel_quit();
            app.clear_input();
        }

        Event::Key(_) if is_backspace_event(&event) => {
            app.cancel_quit();
            app.backspace();
        }

        Event::Key(_) if is_up_event(&event) => {
            app.cancel_quit();
            app.scroll_up();
        }

        Event::Key(_) if is_down_event(&event) => {
            app.cancel_quit();
            app.scroll_down();
        }

        Event::Key(_) if is_ticker_char_event(&event) => {
            app.cancel_quit();
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c);
            }
        }

        Event::Key(_) => {
            // Toute autre touche : annule la confirmation si active
            app.cancel_quit();
        }

        Event::Tick => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
