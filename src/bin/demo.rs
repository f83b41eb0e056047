//! Demo host application for devpanel
//!
//! Runs a minimal TUI that emits log traffic through `tracing` while the
//! panel captures it. Toggle the overlay with ctrl+shift+d, clear with
//! ctrl+l, quit with q.

use std::io::{self, Stdout, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::Alignment,
    text::Line,
    widgets::{Block, Borders, Paragraph},
};
use tracing_subscriber::prelude::*;

use devpanel::{DevPanel, DevPanelConfig, LogKind, values};

/// Demo host for the devpanel overlay
#[derive(Parser, Debug)]
#[command(name = "devpanel-demo")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a devpanel TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the retained log history size
    #[arg(long)]
    max_log_history: Option<usize>,
}

/// A wrapper around the terminal that handles setup and teardown
struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        Ok(Self { terminal })
    }

    fn restore(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        // Best effort cleanup on drop
        let _ = self.restore();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DevPanelConfig::load(path)?,
        None => DevPanelConfig::default(),
    };
    if let Some(n) = args.max_log_history {
        config.max_log_history = n;
    }

    let mut panel = DevPanel::builder()
        .before_init(|config| {
            // The demo always captures, release builds included
            config.allow_production = true;
        })
        .mount(config)?;

    tracing_subscriber::registry()
        .with(panel.capture_layer())
        .init();

    let result = run(&mut panel);
    panel.unmount();

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }
    result
}

fn run(panel: &mut DevPanel) -> Result<()> {
    let mut tui = Tui::new()?;
    let mut last_emit = Instant::now();
    let mut seq = 0u64;

    loop {
        // Emit demo log traffic through the real logging facade
        if last_emit.elapsed() >= Duration::from_millis(700) {
            emit_sample(panel, seq);
            seq += 1;
            last_emit = Instant::now();
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if panel.handle_key(&key) {
                    // Panel consumed the key
                } else if key.code == KeyCode::Char('q')
                    || (key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL))
                {
                    break;
                }
            }
        }

        tui.terminal.draw(|frame| {
            let host = Paragraph::new(vec![
                Line::from("host application"),
                Line::from(""),
                Line::from("ctrl+shift+d  toggle console"),
                Line::from("ctrl+l        clear console"),
                Line::from("q             quit"),
            ])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(host, frame.area());

            panel.render(frame);
        })?;
    }

    tui.restore()?;
    Ok(())
}

fn emit_sample(panel: &DevPanel, seq: u64) {
    match seq % 5 {
        0 => tracing::info!(request = seq, "handled request"),
        1 => tracing::debug!("cache refresh {seq}"),
        2 => tracing::warn!(queue_depth = seq * 3, "queue backlog growing"),
        3 => tracing::error!("upstream timed out on request {seq}"),
        _ => {
            // Tagged entries go through the console directly
            panel.console().tagged(
                LogKind::Info,
                values!["session refreshed", seq],
                vec!["auth".to_string(), "api".to_string()],
            );
        }
    }
}
