//! LED matrix CLI - thin client for a running ledmatrix daemon.
//!
//! Usage:
//!   ledmatrix-cli message "Hello"              # Scroll a message
//!   ledmatrix-cli message "Hi" --repeat 2      # Show it three times
//!   ledmatrix-cli set --mode off               # Change settings
//!   ledmatrix-cli set --status "21°C"          # Show a status next to the clock
//!   ledmatrix-cli settings                     # Print current settings
//!   ledmatrix-cli ping                         # Check the daemon is up

use clap::{Parser, Subcommand};
use serde_json::{Map, Value, json};

use ledmatrix::server::{Request, Response, client};

#[derive(Parser)]
#[command(name = "ledmatrix-cli")]
#[command(about = "Send messages and settings to a running ledmatrix daemon")]
struct Cli {
    /// Daemon address
    #[arg(long, global = true, default_value = "127.0.0.1:5000")]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Queue a scrolling message
    Message {
        text: String,

        /// Seconds between animation steps
        #[arg(long)]
        delay: Option<f64>,

        /// Brightness for this message (0-255)
        #[arg(long)]
        contrast: Option<i64>,

        /// left_to_right or bottom_to_top
        #[arg(long)]
        direction: Option<String>,

        /// Additional runs after the first
        #[arg(long)]
        repeat: Option<u32>,
    },

    /// Print the current settings
    Settings,

    /// Change one or more settings
    Set {
        #[arg(long)]
        contrast: Option<i64>,

        /// Seconds between animation steps
        #[arg(long)]
        delay: Option<f64>,

        /// time or off
        #[arg(long)]
        mode: Option<String>,

        /// left_to_right or bottom_to_top
        #[arg(long)]
        direction: Option<String>,

        /// Status text shown next to the clock
        #[arg(long, conflicts_with = "clear_status")]
        status: Option<String>,

        /// Remove the status text
        #[arg(long)]
        clear_status: bool,
    },

    /// Check that the daemon is running
    Ping,
}

fn main() {
    let cli = Cli::parse();

    let request = match cli.command {
        Commands::Ping => {
            match client::ping(&cli.addr) {
                Ok(()) => println!("{} [OK]", cli.addr),
                Err(e) => fail(&e),
            }
            return;
        }
        Commands::Settings => Request::GetSettings,
        Commands::Message { text, delay, contrast, direction, repeat } => {
            let mut body = Map::new();
            body.insert("message".into(), json!(text));
            insert(&mut body, "scroll_delay", delay.map(Value::from));
            insert(&mut body, "contrast", contrast.map(Value::from));
            insert(&mut body, "scroll_direction", direction.map(Value::from));
            insert(&mut body, "repeat", repeat.map(Value::from));
            Request::Message(body)
        }
        Commands::Set { contrast, delay, mode, direction, status, clear_status } => {
            let mut body = Map::new();
            insert(&mut body, "contrast", contrast.map(Value::from));
            insert(&mut body, "scroll_delay", delay.map(Value::from));
            insert(&mut body, "mode", mode.map(Value::from));
            insert(&mut body, "scroll_direction", direction.map(Value::from));
            insert(&mut body, "status_message", status.map(Value::from));
            if clear_status {
                body.insert("status_message".into(), Value::Null);
            }
            if body.is_empty() {
                fail("nothing to set (see --help)");
            }
            Request::UpdateSettings(body)
        }
    };

    match client::send(&cli.addr, &request) {
        Ok(response) => print_response(response),
        Err(e) => fail(&e),
    }
}

fn insert(body: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        body.insert(key.into(), value);
    }
}

fn print_response(response: Response) {
    match response {
        Response::Ack(ack) => println!("{}", ack.result),
        Response::Settings(settings) => match serde_json::to_string_pretty(&settings) {
            Ok(text) => println!("{}", text),
            Err(e) => fail(&e.to_string()),
        },
        Response::Pong => println!("pong"),
        Response::Rejected(e) => fail(&e.to_string()),
        Response::Error(e) => fail(&e),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}
