mod app;
mod render;
mod events;

pub use app::{App, UiMessage};
use render::draw;
use events::{handle_key_event, Action};

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    Terminal,
};
use std::{
    io,
    sync::{mpsc, Arc},
    time::{Duration, Instant},
};
use tracing::{debug, info};

use crate::core::{
    api::AskTransport,
    config::Config,
    handler::{QueryHandler, ResponseSlot},
};

/// Forwards every display write of one ask to the UI loop, tagged with its token.
struct ChannelSlot {
    token: u64,
    tx: mpsc::Sender<UiMessage>,
}

impl ResponseSlot for ChannelSlot {
    fn show(&mut self, text: &str) {
        let _ = self.tx.send(UiMessage::Show {
            token: self.token,
            text: text.to_string(),
        });
    }
}

pub async fn run_tui<T>(
    config: &Config,
    handler: Arc<QueryHandler<T>>,
    initial_query: Option<String>,
) -> Result<(), Box<dyn std::error::Error>>
where
    T: AskTransport + 'static,
{
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app
    let mut app = App::new(config.behaviour.reentry, config.layout.clone());
    if let Some(query) = initial_query {
        app.set_input(query);
    }
    let size = terminal.size()?;
    app.terminal_size = (size.width, size.height);

    let (ui_tx, ui_rx) = mpsc::channel();
    info!(reentry = ?app.reentry, "tui started");

    // Main loop
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(100);

    let result = loop {
        // Apply display updates from running asks
        while let Ok(message) = ui_rx.try_recv() {
            app.apply(message);
        }

        // Draw UI
        if let Err(e) = terminal.draw(|f| draw(f, &app)) {
            break Err(e.into());
        }

        // Handle events
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        match event::poll(timeout) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) => {
                    if let Some(Action::Ask { token, input }) = handle_key_event(&mut app, key) {
                        spawn_ask(Arc::clone(&handler), token, input, ui_tx.clone());
                    }
                }
                Ok(Event::Resize(width, height)) => {
                    app.terminal_size = (width, height);
                }
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            break Ok(());
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("tui stopped");

    result
}

fn spawn_ask<T>(
    handler: Arc<QueryHandler<T>>,
    token: u64,
    input: String,
    ui_tx: mpsc::Sender<UiMessage>,
) where
    T: AskTransport + 'static,
{
    debug!(token, "spawning ask");
    tokio::spawn(async move {
        let mut slot = ChannelSlot {
            token,
            tx: ui_tx.clone(),
        };
        let outcome = handler.handle(&input, &mut slot).await;
        debug!(token, ?outcome, "ask settled");
        let _ = ui_tx.send(UiMessage::Finished { token });
    });
}
