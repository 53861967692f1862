//! Terminal host for Bin Buddy: search an address once, then keep its next bin
//! collection dates refreshed on a daily schedule.

mod app;
mod config;
mod input;
mod ui;

use std::{io, time::Duration as StdDuration};

use anyhow::Result;
use binbuddy_core::{EntryConfig, TickReason};
use binbuddy_provider_blacktown as blacktown;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

use crate::app::App;
use crate::config::EntryStore;
use crate::input::Action;

#[tokio::main]
async fn main() -> Result<()> {
    let store = EntryStore::from_env()?;
    let log_path = config::init_logging(store.dir())?;
    info!(log = %log_path.display(), "Starting Bin Buddy");

    // HTTP + council backend setup
    let client = Client::builder()
        .user_agent(concat!("binbuddy/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let plugin = blacktown::plugin(client, config::endpoints_from_env());

    let saved_entry = store.load()?;
    let mut app = App::new(plugin, store);

    // Ticks from the scheduler are consumed one at a time by the event loop
    let (tick_sender, mut tick_receiver) = mpsc::unbounded_channel();
    if let Some(entry) = saved_entry {
        info!(address = %entry.title, "Resuming saved address");
        app.begin_setup(entry, &tick_sender);
    }

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, app, &tick_sender, &mut tick_receiver).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    tick_sender: &UnboundedSender<TickReason>,
    tick_receiver: &mut UnboundedReceiver<TickReason>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, &app))?;

        while let Ok(reason) = tick_receiver.try_recv() {
            app.is_loading = true;
            terminal.draw(|frame| ui::draw(frame, &app))?;

            app.run_cycle(reason).await;

            app.is_loading = false;
            terminal.draw(|frame| ui::draw(frame, &app))?;
        }

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            match input::handle_key_event(key, &mut app) {
                Action::Quit => break,
                Action::None => {}
                Action::SearchAddresses => {
                    let term = app.address_input.trim().to_owned();
                    if term.is_empty() {
                        app.error_message = Some("Type an address, then press Enter".into());
                        continue;
                    }

                    app.is_loading = true;
                    app.error_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    let res = app.plugin.address_port.search(&term).await;

                    app.is_loading = false;
                    app.candidate_index = 0;
                    match res {
                        Ok(candidates) if candidates.is_empty() => {
                            app.candidates.clear();
                            app.error_message = Some(format!("No addresses found for '{term}'"));
                        }
                        Ok(candidates) => {
                            app.candidates = candidates;
                        }
                        Err(err) => {
                            app.candidates.clear();
                            app.error_message =
                                Some(format!("Cannot connect to the council address search: {err}"));
                        }
                    }
                }
                Action::SelectCurrentAddress => {
                    let Some(candidate) = app.current_candidate() else {
                        app.error_message =
                            Some("No address selected (search and pick one first)".into());
                        continue;
                    };

                    // Saved only once the initial refresh succeeds.
                    let entry = EntryConfig::from(candidate);
                    info!(address = %entry.title, location = %entry.location_id, "Address selected");
                    drain(tick_receiver);
                    app.begin_setup(entry, tick_sender);
                }
                Action::RefreshNow => app.request_refresh(),
                Action::ChangeAddress => {
                    app.deactivate();
                    drain(tick_receiver);
                    if let Err(err) = app.store.clear() {
                        warn!("Could not forget address: {err:#}");
                    }
                }
            }
        }
    }

    Ok(())
}

// Drop ticks left over from a scheduler that is no longer active.
fn drain(tick_receiver: &mut UnboundedReceiver<TickReason>) {
    while tick_receiver.try_recv().is_ok() {}
}
