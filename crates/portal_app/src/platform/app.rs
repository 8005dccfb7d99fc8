use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::Local;
use portal_core::{update, AppState, Msg, Page};
use portal_engine::{
    is_logged_in, ApiClient, EngineHandle, ExportWriter, FileTokenStore, HttpBackend, TokenStore,
};
use portal_logging::{portal_debug, portal_info, portal_warn};

use super::commands::{self, Command};
use super::config::PortalConfig;
use super::effects::{EffectRunner, MsgSink};
use super::logging;
use super::render;

/// Values taken from the command line.
pub struct LaunchOptions {
    pub page: String,
    pub config_path: PathBuf,
    pub base_url: Option<String>,
    pub set_token: Option<String>,
    pub logout: bool,
}

pub fn run_app(options: LaunchOptions) -> anyhow::Result<()> {
    let mut config = PortalConfig::load(&options.config_path)?;
    if let Some(base_url) = options.base_url {
        config.base_url = base_url;
    }
    logging::initialize(config.log_destination);
    portal_info!("Portal client starting against {}", config.base_url);

    let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.data_dir.clone()));
    if options.logout {
        tokens.clear().context("could not clear the stored session")?;
        portal_info!("Session cleared");
    }
    if let Some(token) = &options.set_token {
        tokens.store(token).context("could not store the session token")?;
        portal_info!("Session token stored");
    }

    let client = ApiClient::new(config.client_settings(), tokens.clone())
        .context("invalid API client settings")?;
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let engine = EngineHandle::new(
        Arc::new(HttpBackend::new(client)),
        ExportWriter::new(config.export_dir.clone()),
        Arc::new(MsgSink::new(msg_tx.clone())),
    )
    .context("could not start the engine runtime")?;
    let runner = EffectRunner::new(engine, msg_tx.clone());

    let page = Page::from_flag(&options.page);
    let quit = Arc::new(AtomicBool::new(false));
    spawn_input_reader(page, msg_tx.clone(), tokens.clone(), quit.clone());

    let _ = msg_tx.send(Msg::Activated {
        page,
        today: Local::now().date_naive(),
        logged_in: is_logged_in(tokens.as_ref()),
    });
    println!("{}", commands::help(page));

    let mut state = AppState::new();
    while !quit.load(Ordering::SeqCst) {
        let first = match msg_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(msg) => msg,
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };
        let mut inbox = vec![first];
        while let Ok(msg) = msg_rx.try_recv() {
            inbox.push(msg);
        }

        for msg in inbox {
            portal_debug!("dispatch {:?}", msg);
            let (next, effects) = update(state, msg);
            state = next;
            runner.enqueue(effects);
        }

        if state.consume_dirty() {
            print_screen(&render::render(&state.view()));
        }
    }

    runner.shutdown();
    portal_info!("Portal client exiting");
    Ok(())
}

fn print_screen(text: &str) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let _ = writeln!(out);
    let _ = write!(out, "{text}");
    let _ = out.flush();
}

fn spawn_input_reader(
    page: Page,
    msg_tx: mpsc::Sender<Msg>,
    tokens: Arc<dyn TokenStore>,
    quit: Arc<AtomicBool>,
) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match commands::parse(page, &line) {
                Command::Send(msg) => {
                    if msg_tx.send(msg).is_err() {
                        break;
                    }
                }
                Command::Help => println!("{}", commands::help(page)),
                Command::Invalid(text) => println!("{text}"),
                Command::Quit => break,
                Command::Login(token) => {
                    let logged_in = change_session(tokens.as_ref(), Some(&token));
                    if msg_tx.send(Msg::AuthChanged { logged_in }).is_err() {
                        break;
                    }
                }
                Command::Logout => {
                    let logged_in = change_session(tokens.as_ref(), None);
                    if msg_tx.send(Msg::AuthChanged { logged_in }).is_err() {
                        break;
                    }
                }
            }
        }
        quit.store(true, Ordering::SeqCst);
    });
}

/// Stores `token`, or clears the session when it is `None`. Returns the resulting login state.
fn change_session(tokens: &dyn TokenStore, token: Option<&str>) -> bool {
    let outcome = match token {
        Some(token) => tokens.store(token),
        None => tokens.clear(),
    };
    match outcome {
        Ok(()) => {
            portal_info!("Session {}", if token.is_some() { "stored" } else { "cleared" });
        }
        Err(err) => {
            portal_warn!("Could not update the stored session: {err}");
            println!("session update failed: {err}");
        }
    }
    is_logged_in(tokens)
}
