use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{Duration, interval};

use airwave_chat::config::{self, AppConfig};
use airwave_chat::signal::bar_glyphs;
use airwave_chat::{ChatEvent, ChatSession, Message, MessageSender, ProximitySimulator};

#[derive(Parser)]
#[command(
    name = "airwave-chat",
    version,
    about = "Simulated nearby-radio scanner and chat"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Clone)]
enum Mode {
    /// Watch the ranked roster of nearby contacts
    Scan {
        /// Number of roster updates to print before exiting
        #[arg(long, default_value_t = 8)]
        ticks: u32,
    },
    /// Open a chat session with a contact
    Chat {
        /// Contact id from the scan listing (defaults to the strongest signal)
        #[arg(long)]
        contact: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let app_config = config::load_config(&cli.config);

    match cli.mode.unwrap_or(Mode::Scan { ticks: 8 }) {
        Mode::Scan { ticks } => run_scan(&app_config, ticks).await,
        Mode::Chat { contact } => run_chat(&app_config, contact).await,
    }
}

async fn run_scan(app_config: &AppConfig, ticks: u32) {
    let mut simulator = ProximitySimulator::start(&app_config.simulator);
    let mut updates = simulator.subscribe();
    let total_bars = app_config.simulator.total_bars;

    println!("People in range:");
    print_roster(&simulator, total_bars);

    for _ in 0..ticks {
        if updates.changed().await.is_err() {
            break;
        }
        println!();
        print_roster(&simulator, total_bars);
    }

    simulator.stop().await;
}

fn print_roster(simulator: &ProximitySimulator, total_bars: u8) {
    for contact in simulator.ranked_contacts() {
        println!(
            "{:>2}  {:<14} {:<9} {}  ~{} m",
            contact.id,
            contact.name,
            contact.handle,
            bar_glyphs(contact.signal, total_bars),
            contact.distance_meters
        );
    }
}

async fn run_chat(app_config: &AppConfig, wanted: Option<String>) {
    let mut simulator = ProximitySimulator::start(&app_config.simulator);
    let ranked = simulator.ranked_contacts();

    let contact = match wanted {
        Some(id) => ranked.iter().find(|c| c.id == id).or_else(|| {
            log::warn!("No contact with id {id}; falling back to strongest signal");
            ranked.first()
        }),
        None => ranked.first(),
    };
    let Some(contact) = contact.cloned() else {
        log::error!("Roster is empty; nothing to chat with");
        return;
    };

    println!(
        "Chatting with {} {}  {}",
        contact.name,
        contact.handle,
        bar_glyphs(contact.signal, app_config.simulator.total_bars)
    );

    let mut session = ChatSession::new(contact, app_config.chat.clone());
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    session.set_event_sink(event_tx);

    for message in session.messages().to_vec() {
        print_message(&message, session.contact().handle.as_str());
    }
    println!("Type a message and press Enter (Ctrl-D to leave).");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    // Folds delivered replies into the log so their events fire.
    let mut reply_poll = interval(Duration::from_millis(200));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if let Err(err) = session.send(&line) {
                            println!("! {err}");
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        log::error!("Failed to read input: {err}");
                        break;
                    }
                }
            }
            event = event_rx.recv() => {
                if let Some(ChatEvent::MessageAppended(message)) = event {
                    print_message(&message, session.contact().handle.as_str());
                }
            }
            _ = reply_poll.tick() => {
                session.messages();
            }
        }
    }

    session.teardown();
    simulator.stop().await;
}

fn print_message(message: &Message, handle: &str) {
    let who = match message.sender {
        MessageSender::Me => "you",
        MessageSender::Contact => handle,
    };
    println!("{who}> {}", message.text);
}
