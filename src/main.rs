mod cli;
mod controller;
mod error;
mod logging;
mod model;
mod player;
mod view;
#[cfg(test)]
mod testing;

use std::io;
use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use cli::Cli;
use controller::AppController;
use model::{AppModel, FolderContext, NavigationAction, RpcLibraryClient};
use player::ProcessPlayerBackend;
use view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(&cli.log_dir) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!(server = %cli.server, variant = ?cli.variant, "=== reelshelf starting ===");

    let library = RpcLibraryClient::new(&cli.server, Duration::from_secs(cli.timeout))?;
    let backend = ProcessPlayerBackend::new(&cli.player, library.base_url())?;

    let model = Arc::new(AppModel::new(library.base_url()));
    let controller = AppController::new(
        model.clone(),
        Arc::new(library),
        Arc::new(backend),
        cli.variant,
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // First listing loads in the background so the UI shows up immediately
    let controller_for_init = controller.clone();
    let start = NavigationAction::browse(FolderContext::at(cli.folder));
    tokio::spawn(async move {
        controller_for_init.navigate(start).await;
    });

    let res = run_app(&mut terminal, model, controller.clone()).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Never leave a player process behind
    controller.close_session().await;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("reelshelf shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<AppModel>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        // Auto-clear old errors (after 5 seconds)
        model.auto_clear_old_errors().await;

        let ui_state = model.get_ui_state().await;
        let browse_state = model.get_browse_state().await;
        let player_state = model.get_player_state().await;

        terminal.draw(|f| {
            AppView::render(f, &ui_state, &browse_state, &player_state);
        })?;

        if model.should_quit().await {
            break;
        }

        // Short poll keeps the UI responsive to background loads
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }
    }

    Ok(())
}
