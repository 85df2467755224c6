use clap::{Parser, Subcommand};
use fbmessenger::api::{AttachmentType, SendOptions};
use fbmessenger::config::{self, Config};
use fbmessenger::{Client, Messenger, SenderAction};
use std::path::PathBuf;

mod bots;

#[derive(Parser)]
#[command(name = "fbmessenger")]
#[command(about = "Messenger bot runner and Send API helper", long_about = None)]
struct Cli {
    /// Log at debug level for the library and this binary
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run a bot that echoes every text message back to the sender.
    Echo {
        /// Config file path (default: FBMESSENGER_CONFIG_PATH or ~/.fbmessenger/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Webhook port (default from config or 8080)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Run a bot that asks a question with postback buttons and answers the choice.
    Buttons {
        /// Config file path (default: FBMESSENGER_CONFIG_PATH or ~/.fbmessenger/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Webhook port (default from config or 8080)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Send a message (and optional images) to a user outside a conversation.
    Send {
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Page-scoped user id
        recipient: String,

        /// Message text
        text: String,

        /// Local image to send before the text (repeatable); needs publicAttachmentUrl
        #[arg(long = "image", value_name = "FILE")]
        images: Vec<PathBuf>,

        /// Local file to send after the text as a file attachment (repeatable)
        #[arg(long = "file", value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Show a typing indicator before sending
        #[arg(long)]
        typing: bool,
    },

    /// Configure the page's Messenger profile.
    Profile {
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        #[command(subcommand)]
        setting: ProfileSetting,
    },
}

#[derive(Subcommand)]
enum ProfileSetting {
    /// Greeting shown before the first message
    Greeting { text: String },
    /// Postback payload sent when a user taps "Get Started"
    GetStarted { payload: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "warn,fbmessenger=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let result = match cli.command {
        Some(Commands::Version) => {
            println!("fbmessenger {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Commands::Echo { config, port }) => {
            run_bot(config, port, bots::EchoBot::new).await
        }
        Some(Commands::Buttons { config, port }) => {
            run_bot(config, port, bots::ButtonBot::new).await
        }
        Some(Commands::Send {
            config,
            recipient,
            text,
            images,
            files,
            typing,
        }) => run_send(config, recipient, text, images, files, typing).await,
        Some(Commands::Profile { config, setting }) => run_profile(config, setting).await,
        None => {
            println!("Run with --help for usage");
            Ok(())
        }
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn load(config_path: Option<PathBuf>) -> anyhow::Result<(Config, Client)> {
    let (config, path) = config::load_config(config_path)?;
    log::debug!("loaded config from {}", path.display());
    let client = Client::from_config(&config)?;
    Ok((config, client))
}

async fn run_bot<H, F>(config_path: Option<PathBuf>, port: Option<u16>, make: F) -> anyhow::Result<()>
where
    H: fbmessenger::MessageHandler,
    F: FnOnce(Client) -> H,
{
    let (mut config, client) = load(config_path)?;
    if let Some(p) = port {
        config.server.port = p;
    }
    let handler = make(client.clone());
    log::info!("starting webhook on {}:{}", config.server.bind, config.server.port);
    Messenger::from_config(&config, client, handler)?.run().await
}

async fn run_send(
    config_path: Option<PathBuf>,
    recipient: String,
    text: String,
    images: Vec<PathBuf>,
    files: Vec<PathBuf>,
    typing: bool,
) -> anyhow::Result<()> {
    let (_, client) = load(config_path)?;
    if typing {
        client.send_action(&recipient, SenderAction::TypingOn).await?;
    }
    let delivered = client
        .send_message(&recipient, &text, SendOptions::default().images(images))
        .await?;
    if !files.is_empty() {
        client
            .send_attachments(&recipient, &files, AttachmentType::File)
            .await?;
    }
    println!("{}", if delivered { "sent" } else { "accepted without message id" });
    Ok(())
}

async fn run_profile(config_path: Option<PathBuf>, setting: ProfileSetting) -> anyhow::Result<()> {
    let (_, client) = load(config_path)?;
    match setting {
        ProfileSetting::Greeting { text } => client.set_greeting_text(&text).await?,
        ProfileSetting::GetStarted { payload } => client.set_get_started_payload(&payload).await?,
    }
    println!("profile updated");
    Ok(())
}
