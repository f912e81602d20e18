//! LED matrix daemon
//!
//! Usage:
//!   ledmatrix                          # Defaults, or ~/.config/ledmatrix/config.json
//!   ledmatrix --config panel.json      # Explicit config file
//!   ledmatrix --png /tmp/panel.png     # Write frames to a PNG instead of the terminal
//!   PORT=8080 ledmatrix                # Override the listen port

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ledmatrix::clock::{SystemClock, ThreadPacer};
use ledmatrix::config::{DaemonConfig, SinkConfig};
use ledmatrix::display::{Display, PngSink, TerminalSink};
use ledmatrix::render::{AnimationEngine, Font, IdleRenderer};
use ledmatrix::scheduler::Scheduler;
use ledmatrix::server::Server;
use ledmatrix::settings::SettingsStore;
use ledmatrix::Error;
use ledmatrix::api::Api;
use ledmatrix::command;

#[derive(Parser)]
#[command(name = "ledmatrix")]
#[command(about = "Clock and scrolling message daemon for LED matrix panels")]
struct Args {
    /// Config file (default: ~/.config/ledmatrix/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:5000
    #[arg(short, long)]
    listen: Option<String>,

    /// Bitmap font name
    #[arg(long)]
    font: Option<String>,

    /// Write frames to this PNG file instead of the terminal
    #[arg(long)]
    png: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Args::parse()) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(args: &Args) -> ledmatrix::Result<DaemonConfig> {
    let mut config = DaemonConfig::load(args.config.as_deref())?;
    if let Some(listen) = &args.listen {
        config.listen = listen.clone();
    }
    if let Some(font) = &args.font {
        config.font = font.clone();
    }
    if let Some(png) = &args.png {
        config.sink = SinkConfig::Png(png.clone());
    }
    if let Ok(port) = std::env::var("PORT") {
        config.override_port(&port)?;
    }
    config.validate()?;
    Ok(config)
}

fn open_sink(config: &DaemonConfig) -> ledmatrix::Result<Box<dyn Display + Send>> {
    let sink: Box<dyn Display + Send> = match &config.sink {
        SinkConfig::Terminal => Box::new(TerminalSink::stdout(config.panel)),
        SinkConfig::Png(path) => {
            info!("Writing frames to {}", path.display());
            let sink = PngSink::create(path, config.panel)
                .map_err(|e| Error::Config(format!("cannot open PNG sink: {e}")))?;
            Box::new(sink)
        }
    };
    Ok(sink)
}

fn run(args: Args) -> ledmatrix::Result<()> {
    // Everything that can fail on bad configuration happens before any
    // thread starts.
    let config = load_config(&args)?;
    let font: Arc<dyn Font> = Arc::new(config.font_face()?);
    let sink = open_sink(&config)?;
    let listen = config.listen_addr()?;

    let settings = Arc::new(SettingsStore::new(config.initial_settings()));
    let (sender, queue) = command::queue();
    let pacer = Arc::new(ThreadPacer);
    let idle = IdleRenderer::new(font.clone(), Arc::new(SystemClock), pacer.clone())
        .with_dwell(config.idle_dwell());
    let engine = AnimationEngine::new(font, pacer).with_decoration(config.decorate);

    let server = Server::bind(listen, Api::new(settings.clone(), sender))?;

    let scheduler = Scheduler::new(sink, settings, queue, idle, engine);
    if let Some(welcome) = config.welcome.clone() {
        scheduler.seed(welcome);
    }
    info!(
        "Panel {}x{} ({} modules), font {}",
        config.panel.width(),
        config.panel.height,
        config.panel.modules,
        config.font
    );
    scheduler.spawn()?;

    server.serve();
    Ok(())
}
