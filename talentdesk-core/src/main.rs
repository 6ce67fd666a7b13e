//! src/main.rs
//! Recruiting data console: searchable, filterable, paginated tables over a
//! workspace file, with toast notifications.

use std::{
    io::{self, Stdout},
    panic::PanicHookInfo,
    path::PathBuf,
};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use tokio::{
    signal,
    sync::mpsc::{self, UnboundedReceiver},
    time::{Instant, MissedTickBehavior, interval},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use talentdesk_core::{
    AppError, LoggerBuilder,
    config::Config,
    controller::{
        actions::Action,
        action_dispatcher::{ActionDispatcher, SearchInput},
        keymap::KeyMap,
        screens::build_screens,
    },
    model::{
        notifications::NotificationCenter,
        records::Workspace,
        ui_state::RedrawFlag,
    },
    util::debounce::{DebounceConfig, Debouncer},
    view::ui::UIRenderer,
};

type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<()> {
    setup_panic_handler();

    let (config, config_error) = match Config::load().await {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let _log_guard = LoggerBuilder::new()
        .with_config(config.logging.clone())
        .build()
        .await
        .context("Failed to initialize logging")?;

    if let Some(e) = config_error {
        warn!("Failed to load config, using defaults: {e}");
    }
    info!("Starting talentdesk console");

    let data_file: Option<PathBuf> = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.data_file.clone());

    let workspace = match &data_file {
        Some(path) => Workspace::load(path)
            .await
            .with_context(|| format!("Failed to load workspace {}", path.display()))?,
        None => {
            info!("No data file given; using the bundled sample workspace");
            Workspace::sample()
        }
    };

    let app = App::new(config, workspace, data_file).context("Failed to initialize application")?;
    app.run().await.context("Application runtime error")?;

    info!("Application exited cleanly");
    Ok(())
}

struct App {
    terminal: AppTerminal,
    config: Config,
    dispatcher: ActionDispatcher,
    keymap: KeyMap,
    renderer: UIRenderer,
    action_rx: UnboundedReceiver<Action>,
    search_rx: UnboundedReceiver<SearchInput>,
    shutdown: CancellationToken,
    last_toast_count: usize,
}

impl App {
    fn new(config: Config, workspace: Workspace, data_file: Option<PathBuf>) -> Result<Self> {
        let (action_tx, action_rx) = mpsc::unbounded_channel::<Action>();
        let (search, search_rx) =
            Debouncer::<SearchInput>::new(DebounceConfig::new(config.table.search_debounce));

        let notifications = NotificationCenter::new(config.notifications.clone())
            .context("Failed to create notification queue")?;
        let screens = build_screens(&workspace, &config.table, &action_tx);
        let dispatcher = ActionDispatcher::new(screens, notifications, search, action_tx, data_file);

        let terminal = setup_terminal(config.ui.mouse).context("Failed to initialize terminal")?;

        info!("Application initialized successfully");
        Ok(Self {
            terminal,
            config,
            dispatcher,
            keymap: KeyMap::new(),
            renderer: UIRenderer::new(),
            action_rx,
            search_rx,
            shutdown: CancellationToken::new(),
            last_toast_count: 0,
        })
    }

    async fn run(mut self) -> Result<()> {
        self.setup_shutdown_handler();

        info!("Starting event loop");
        let mut event_stream = EventStream::new();

        let mut tick = interval(self.config.ui.tick_rate);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut progress = interval(self.config.notifications.progress_interval);
        progress.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            self.render()?;

            let action = tokio::select! {
                () = self.shutdown.cancelled() => {
                    info!("Shutdown signal received");
                    break;
                }

                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(event)) => self.keymap.map_event(&event, self.dispatcher.ui().mode),
                    Some(Err(e)) => {
                        warn!("Terminal event error: {e}");
                        continue;
                    }
                    None => break,
                },

                Some((epoch, tab, term)) = self.search_rx.recv() => {
                    Action::SearchSettled { epoch, tab, term }
                }

                Some(action) = self.action_rx.recv() => action,

                _ = progress.tick() => {
                    self.poll_toasts();
                    continue;
                }

                _ = tick.tick() => Action::Tick,
            };

            if !self.dispatcher.handle(action) {
                break;
            }
        }

        info!(
            frames = self.renderer.stats.frames,
            slow_frames = self.renderer.stats.slow,
            "Event loop terminated cleanly"
        );
        Ok(())
    }

    /// Redraw while toasts count down, and once more after the last expires.
    fn poll_toasts(&mut self) {
        let count = self.dispatcher.notifications().len();
        if count > 0 || count != self.last_toast_count {
            self.dispatcher.ui().request_redraw(RedrawFlag::Notification);
        }
        self.last_toast_count = count;
    }

    fn render(&mut self) -> Result<()> {
        if !self.dispatcher.ui().needs_redraw() {
            return Ok(());
        }

        let now = Instant::now();
        let mut table_area = Rect::default();
        let dispatcher = &self.dispatcher;
        let renderer = &mut self.renderer;
        self.terminal
            .draw(|frame| table_area = renderer.render(frame, dispatcher, now))
            .map_err(|e| AppError::terminal("draw frame", e))?;

        self.dispatcher.ui_mut().table_area = table_area;
        debug!(?table_area, "Frame drawn");
        Ok(())
    }

    fn setup_shutdown_handler(&self) {
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{SignalKind, signal};

                let Ok(mut sigterm) = signal(SignalKind::terminate()) else {
                    warn!("Failed to create SIGTERM handler");
                    return;
                };

                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                    _ = signal::ctrl_c() => info!("Received Ctrl+C"),
                }
            }

            #[cfg(not(unix))]
            {
                if let Err(e) = signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                    return;
                }
                info!("Received Ctrl+C");
            }

            shutdown.cancel();
        });
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Err(e) = cleanup_terminal(&mut self.terminal, self.config.ui.mouse) {
            warn!("Failed to cleanup terminal: {}", e);
        }
    }
}

fn setup_terminal(mouse: bool) -> Result<AppTerminal, AppError> {
    enable_raw_mode().map_err(|e| AppError::terminal("enable raw mode", e))?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| AppError::terminal("enter alternate screen", e))?;
    if mouse {
        execute!(stdout, EnableMouseCapture)
            .map_err(|e| AppError::terminal("enable mouse capture", e))?;
    }

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).map_err(|e| AppError::terminal("create terminal", e))?;

    info!("Terminal setup complete");
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut AppTerminal, mouse: bool) -> Result<(), AppError> {
    disable_raw_mode().map_err(|e| AppError::terminal("disable raw mode", e))?;
    if mouse {
        execute!(terminal.backend_mut(), DisableMouseCapture)
            .map_err(|e| AppError::terminal("disable mouse capture", e))?;
    }
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .map_err(|e| AppError::terminal("leave alternate screen", e))?;
    terminal
        .show_cursor()
        .map_err(|e| AppError::terminal("show cursor", e))?;

    info!("Terminal cleanup complete");
    Ok(())
}

fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen);

        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}
