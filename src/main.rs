use assistant_chat::adapters::ReqwestHttpClient;
use assistant_chat::backend::BackendClient;
use assistant_chat::cache::LocalCache;
use assistant_chat::cli::{parse_args, run_cli_command, ChatArgs, CliCommand};
use assistant_chat::config::Config;
use assistant_chat::error::ChatError;
use assistant_chat::fingerprint::Fingerprinter;
use assistant_chat::functions::{FunctionHandler, HttpFunctionHandler, NoFunctionHandler};
use assistant_chat::logging::{init_logging, LogTarget};
use assistant_chat::meter::TokenMeter;
use assistant_chat::provider::{AssistantProvider, AssistantsApiClient};
use assistant_chat::run::RunDriver;
use assistant_chat::server::{start_server_on, ServerState};
use assistant_chat::sync::ThreadSynchronizer;
use assistant_chat::traits::HttpClient;
use assistant_chat::ui;
use assistant_chat::view::{resolve_user_token, AppMessage, ChatServices, ChatView, Command};

use color_eyre::Result;
use crossterm::{
    cursor::Show,
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;

fn main() -> Result<()> {
    // --version and friends work without any configuration
    let command = parse_args(std::env::args())?;
    if run_cli_command(&command) {
        return Ok(());
    }

    color_eyre::install()?;
    let config = Config::from_env()?;

    let runtime = tokio::runtime::Runtime::new()?;

    match command {
        CliCommand::Serve => {
            init_logging(LogTarget::Stderr)?;
            runtime.block_on(serve(config))
        }
        CliCommand::Chat(args) => {
            init_logging(LogTarget::File(config.log_path()))?;
            run_chat(&runtime, config, args)
        }
        CliCommand::Version => Ok(()),
    }
}

fn build_provider(config: &Config, http: Arc<dyn HttpClient>) -> Arc<dyn AssistantProvider> {
    let mut client = AssistantsApiClient::new(&config.api_url, &config.assistant_id, http);
    if let Some(key) = &config.api_key {
        client = client.with_api_key(key);
    }
    Arc::new(client)
}

fn open_cache(config: &Config) -> LocalCache {
    match LocalCache::open(config.cache_path()) {
        Ok(cache) => cache,
        Err(e) => {
            let err = ChatError::from(e);
            tracing::error!(category = %err.category(), "{}; nothing will be kept", err);
            LocalCache::in_memory()
        }
    }
}

fn build_services(config: &Config) -> ChatServices {
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let provider = build_provider(config, http.clone());

    let cache = open_cache(config);
    let backend = Arc::new(BackendClient::new(&config.backend_url, http.clone()));
    let fingerprinter = Arc::new(Fingerprinter::new(cache.clone()));
    let sync = ThreadSynchronizer::new(backend.clone(), cache.clone(), fingerprinter.clone());
    let meter = Arc::new(TokenMeter::new(backend, fingerprinter));

    let functions: Arc<dyn FunctionHandler> = match &config.functions_url {
        Some(url) => Arc::new(HttpFunctionHandler::new(url, http)),
        None => Arc::new(NoFunctionHandler),
    };
    let driver = Arc::new(RunDriver::new(provider.clone(), functions));

    ChatServices {
        cache,
        provider,
        sync,
        meter,
        driver,
    }
}

async fn serve(config: Config) -> Result<()> {
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let state = ServerState {
        provider: build_provider(&config, http),
    };
    let (handle, addr) = start_server_on(config.server_addr, state).await?;
    tracing::info!("Serving assistant proxy on {}", addr);
    handle.await?;
    Ok(())
}

fn run_chat(runtime: &tokio::runtime::Runtime, config: Config, args: ChatArgs) -> Result<()> {
    let services = build_services(&config);
    let user_token = resolve_user_token(args.user_token, &services.cache);
    let mut view = ChatView::new(Arc::new(services), user_token, args.sidebar);

    // Setup panic hook to ensure terminal cleanup on panic
    setup_panic_hook();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = runtime.block_on(async {
        if view.user_token.is_some() {
            terminal.draw(|f| ui::render(f, &view))?;
            view.load().await;
        }
        run_app(&mut terminal, &mut view).await
    });

    view.persist_current();
    restore_terminal(&mut terminal)?;
    result
}

/// Setup panic hook to restore terminal on panic
fn setup_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        original_hook(panic_info);
    }));
}

/// Restore terminal to normal mode
fn restore_terminal<B: ratatui::backend::Backend + std::io::Write>(
    terminal: &mut Terminal<B>,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    view: &mut ChatView,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let mut event_stream = EventStream::new();

    // Take the receiver; select! needs ownership
    let mut message_rx: Option<mpsc::UnboundedReceiver<AppMessage>> = view.message_rx.take();

    loop {
        if view.needs_redraw {
            terminal.draw(|f| ui::render(f, view))?;
            view.needs_redraw = false;
        }

        let timeout = tokio::time::sleep(std::time::Duration::from_millis(16));

        tokio::select! {
            _ = timeout => {}

            event_result = event_stream.next() => {
                match event_result {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        let command = view.handle_key(key);
                        dispatch(view, command).await;
                    }
                    Some(Ok(Event::Resize(_, _))) => view.mark_dirty(),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("Terminal event error: {}", e);
                        return Err(e.into());
                    }
                    None => return Ok(()),
                }
            }

            msg = async {
                match &mut message_rx {
                    Some(rx) => rx.recv().await,
                    None => std::future::pending().await,
                }
            } => {
                if let Some(msg) = msg {
                    view.handle_message(msg);
                }
            }
        }

        if view.should_quit {
            return Ok(());
        }
    }
}

async fn dispatch(view: &mut ChatView, command: Command) {
    match command {
        Command::None => {}
        Command::Quit => view.should_quit = true,
        Command::Submit => {
            // The run reports back through the view's channel
            let _ = view.submit_input().await;
        }
        Command::NewThread => {
            if let Err(e) = view.create_thread().await {
                let err = ChatError::from(e);
                tracing::warn!(category = %err.category(), "Could not create thread: {}", err);
                view.show_alert(err.user_message());
            }
        }
        Command::SubmitToken => {
            if view.submit_token() {
                view.load().await;
            }
        }
    }
}
