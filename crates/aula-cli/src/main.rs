//! aula CLI: terminal front end for the educational chat assistant

use std::io::{BufRead, Write as _};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use aula_engine::{
    ChatSession, CommandSpeech, Config, FileWelcomeStore, HttpBackend, NullSpeech, Role, Speech,
    WelcomeStore,
};

/// Study assistant chat over a remote language-model backend
#[derive(Parser)]
#[command(name = "aula")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session (default when no command specified)
    Chat {
        /// Disable spoken playback for this session
        #[arg(long)]
        no_speech: bool,
    },

    /// Create the config file and state directory
    Init,

    /// Forget the stored greeting state so the next chat greets again
    Reset,

    /// Print configuration and greeting state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

const AULA_DIR: &str = ".aula";

fn main() {
    let cli = Cli::parse();

    match cli.command {
        None => {
            // Default: open a chat session
            cmd_chat(false);
        }
        Some(Commands::Chat { no_speech }) => {
            cmd_chat(no_speech);
        }
        Some(Commands::Init) => {
            cmd_init();
        }
        Some(Commands::Reset) => {
            cmd_reset();
        }
        Some(Commands::Status { json }) => {
            cmd_status(json);
        }
    }
}

fn config_path() -> PathBuf {
    Path::new(AULA_DIR).join("config.json")
}

/// Load the config file, falling back to defaults when absent.
fn load_config() -> Config {
    let path = config_path();
    if !path.exists() {
        return Config::default();
    }
    match Config::load(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}

fn cmd_init() {
    let config_path = config_path();

    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
    } else {
        let config = Config::default();
        match config.save(&config_path) {
            Ok(()) => println!("Created {}", config_path.display()),
            Err(e) => {
                eprintln!("Failed to write config: {e}");
                std::process::exit(1);
            }
        }
    }

    println!("\nSet your API key in the config file or via the AULA_API_KEY environment variable.");
}

fn cmd_reset() {
    let config = load_config();
    let mut store = FileWelcomeStore::new(config.welcome_flag_path());

    if let Err(e) = store.clear() {
        eprintln!("Failed to clear greeting state: {e}");
        std::process::exit(1);
    }
    println!("Greeting state cleared. The next chat will greet (and speak) again.");
}

fn cmd_status(json: bool) {
    let config = load_config();
    let store = FileWelcomeStore::new(config.welcome_flag_path());
    let welcome_shown = store.is_set().unwrap_or(false);

    if json {
        let output = serde_json::json!({
            "endpoint": config.backend.api_url,
            "speech_enabled": config.speech.enabled,
            "locale": config.speech.locale,
            "welcome_shown": welcome_shown,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).expect("failed to serialize")
        );
        return;
    }

    println!("Aula Status\n");
    println!("Endpoint: {}", config.backend.api_url);
    println!("Speech: {}", if config.speech.enabled { "enabled" } else { "disabled" });
    println!("Locale: {}", config.speech.locale);
    println!(
        "Greeting: {}",
        if welcome_shown { "already shown" } else { "will be shown" }
    );
}

fn cmd_chat(no_speech: bool) {
    let config = load_config();

    let backend = match HttpBackend::new(&config.backend) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let speech: Box<dyn Speech> = if no_speech || !config.speech.enabled {
        Box::new(NullSpeech)
    } else {
        match CommandSpeech::new(config.speech.command_argv.clone()) {
            Ok(s) => Box::new(s),
            Err(e) => {
                eprintln!("Speech unavailable ({e}), continuing without it");
                Box::new(NullSpeech)
            }
        }
    };

    let store = FileWelcomeStore::new(config.welcome_flag_path());
    let session = ChatSession::new(
        Box::new(backend),
        Box::new(store),
        speech,
        config.speech.locale.clone(),
    );

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    rt.block_on(run_chat(session));
}

async fn run_chat(mut session: ChatSession) {
    println!("aula chat - /new starts over, /quit exits\n");

    session.initialize();
    print_messages(&session, 0);

    let stdin = std::io::stdin();

    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        match line.trim() {
            "/quit" | "/exit" => break,
            "/new" => {
                session.reset();
                println!();
                print_messages(&session, 0);
                continue;
            }
            _ => {}
        }

        let before = session.messages().len();
        session.submit(&line).await;
        print_messages(&session, before);
    }

    println!("hasta luego!");
}

/// Print messages from `from` onward, skipping the user's own echo.
fn print_messages(session: &ChatSession, from: usize) {
    for message in &session.messages()[from..] {
        match message.role {
            Role::User => {}
            Role::Assistant => println!("aula: {}\n", message.text),
        }
    }
}
