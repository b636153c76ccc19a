use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures_util::StreamExt;
use ratatui::DefaultTerminal;
use search_client::{HttpSearchProvider, StockSearch, StockSearchClient};
use stock_dashboard::{ui, App, AppMessage};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILE: &str = "stock-dashboard.log";
const CLOCK_TICK: Duration = Duration::from_secs(1);

/// The terminal belongs to the UI, so logs go to a file.
fn init_tracing() -> anyhow::Result<()> {
    let path =
        std::env::var("STOCK_DASHBOARD_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path))?;
    let writer = std::sync::Mutex::new(file);

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stock_dashboard=info,search_client=info".into());

    if json_logging {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
            .init();
    }
    Ok(())
}

/// What woke the UI loop.
enum Wake {
    Tick,
    Message(Option<AppMessage>),
    Input(Option<std::io::Result<Event>>),
}

async fn run(terminal: &mut DefaultTerminal, mut app: App) -> anyhow::Result<()> {
    let mut events = EventStream::new();
    let mut clock = tokio::time::interval(CLOCK_TICK);
    clock.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        terminal.draw(|frame| ui::draw(frame, &app, chrono::Utc::now()))?;

        if app.should_quit {
            return Ok(());
        }

        let wake = tokio::select! {
            _ = clock.tick() => Wake::Tick,
            message = app.recv() => Wake::Message(message),
            event = events.next() => Wake::Input(event),
        };

        match wake {
            // Redraw for the header clock.
            Wake::Tick => {}
            Wake::Message(Some(message)) => {
                app.apply(message);
                app.drain();
            }
            Wake::Message(None) => return Ok(()),
            Wake::Input(Some(Ok(Event::Key(key)))) if key.kind == KeyEventKind::Press => {
                app.handle_key(key);
            }
            Wake::Input(Some(Ok(_))) => {}
            Wake::Input(Some(Err(e))) => return Err(e).context("failed to read terminal input"),
            Wake::Input(None) => return Ok(()),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let client = StockSearchClient::from_env().context("failed to build HTTP client")?;
    tracing::info!(base_url = client.base_url(), "Starting stock dashboard");

    let backend: Arc<dyn StockSearch> = Arc::new(HttpSearchProvider::from(client));
    let app = App::new(backend);

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, app).await;
    ratatui::restore();

    if let Err(e) = &result {
        tracing::error!("Dashboard exited with error: {:#}", e);
    }
    result
}
