//! `mailboard` - decode webmail provider messages and compose raw ones.
//!
//! A thin shell over `mailboard-core` and `mailboard-mime`: all file I/O and
//! logging setup live here.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::{info, warn};

use mailboard_core::{CodecConfig, Decoded, EmailDecoder, ProviderMessage};
use mailboard_mime::{Headers, OutboundAttachment, OutboundMessage};

#[derive(Parser)]
#[command(name = "mailboard", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Codec settings file (JSON)
    #[arg(long, value_name = "FILE", global = true, env = "MAILBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a provider message (or a JSON array of them) into email records
    Decode {
        /// Provider message JSON, or `-` for stdin
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Build a raw message ready for the provider's send endpoint
    Compose(ComposeArgs),
    /// Decode or encode a single header value
    Header {
        #[command(subcommand)]
        action: HeaderAction,
    },
}

#[derive(Args)]
struct ComposeArgs {
    /// Recipient (repeatable)
    #[arg(long, required = true, value_name = "ADDR")]
    to: Vec<String>,
    /// CC recipient (repeatable)
    #[arg(long, value_name = "ADDR")]
    cc: Vec<String>,
    /// BCC recipient (repeatable)
    #[arg(long, value_name = "ADDR")]
    bcc: Vec<String>,
    /// Subject line
    #[arg(short, long, default_value = "")]
    subject: String,
    /// Body text or HTML
    #[arg(short, long, conflicts_with = "body_file")]
    body: Option<String>,
    /// Read the body from a file
    #[arg(long, value_name = "FILE")]
    body_file: Option<PathBuf>,
    /// Reply-To address
    #[arg(long, value_name = "ADDR")]
    reply_to: Option<String>,
    /// Message-ID this message replies to
    #[arg(long, value_name = "MESSAGE_ID")]
    in_reply_to: Option<String>,
    /// Thread references
    #[arg(long)]
    references: Option<String>,
    /// File to attach, optionally with its MIME type (repeatable)
    #[arg(short, long, value_name = "PATH[:TYPE]", value_parser = parse_attach_spec)]
    attach: Vec<AttachSpec>,
    /// Print the RFC 2822 text instead of the Base64url envelope
    #[arg(long)]
    rfc2822: bool,
}

#[derive(Subcommand)]
enum HeaderAction {
    /// Decode RFC 2047 encoded-words
    Decode { value: String },
    /// Encode a value as an RFC 2047 encoded-word if it is not ASCII
    Encode { value: String },
}

/// A `--attach` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AttachSpec {
    path: PathBuf,
    content_type: Option<String>,
}

/// Splits `PATH[:TYPE]`. The suffix only counts as a type if it looks like
/// `type/subtype`, so paths containing `:` still work.
fn parse_attach_spec(spec: &str) -> Result<AttachSpec, String> {
    if spec.is_empty() {
        return Err("attachment path is empty".to_string());
    }

    let looks_like_mime = |mime: &str| {
        mime.split_once('/').is_some_and(|(main, sub)| {
            !main.is_empty() && !sub.is_empty() && main.chars().all(|c| c.is_ascii_alphabetic())
        })
    };
    let typed = spec
        .rsplit_once(':')
        .filter(|(path, mime)| !path.is_empty() && looks_like_mime(mime));

    Ok(match typed {
        Some((path, mime)) => AttachSpec {
            path: PathBuf::from(path),
            content_type: Some(mime.to_string()),
        },
        None => AttachSpec {
            path: PathBuf::from(spec),
            content_type: None,
        },
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(log_level(cli.verbose));

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Decode { path, pretty } => cmd_decode(&path, pretty, config),
        Commands::Compose(args) => cmd_compose(args, &config),
        Commands::Header { action } => {
            cmd_header(&action);
            Ok(())
        }
    }
}

const fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn setup_logging(level: &str) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CodecConfig> {
    let Some(path) = path else {
        return Ok(CodecConfig::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = CodecConfig::from_json(&text)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    info!(path = %path.display(), ?config, "Loaded config");
    Ok(config)
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        return io::read_to_string(io::stdin()).context("Failed to read stdin");
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn cmd_decode(path: &Path, pretty: bool, config: CodecConfig) -> anyhow::Result<()> {
    let input = read_input(path)?;
    let value: Value = serde_json::from_str(&input)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let decoder = EmailDecoder::with_config(config);
    let output = match value {
        Value::Array(items) => {
            let count = items.len();
            let emails = items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    decode_one(&decoder, item).with_context(|| format!("Message #{index}"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            info!(count, "Decoded messages");
            Value::Array(emails)
        }
        item => decode_one(&decoder, item)?,
    };

    let text = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{text}");
    Ok(())
}

fn decode_one(decoder: &EmailDecoder, item: Value) -> anyhow::Result<Value> {
    let message: ProviderMessage =
        serde_json::from_value(item).context("Not a provider message")?;
    let Decoded { email, warnings } = decoder.decode_with_warnings(&message);

    for warning in &warnings {
        warn!(id = %email.id, "{warning}");
    }

    Ok(serde_json::to_value(&email)?)
}

fn cmd_compose(args: ComposeArgs, config: &CodecConfig) -> anyhow::Result<()> {
    let body = match (args.body, &args.body_file) {
        (_, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read body {}", path.display()))?,
        (Some(body), None) => body,
        (None, None) => String::new(),
    };

    let mut message = OutboundMessage::new(args.subject, body);
    message.to = args.to;
    message.cc = args.cc;
    message.bcc = args.bcc;
    message.reply_to = args.reply_to;
    message.in_reply_to = args.in_reply_to;
    message.references = args.references;

    for spec in args.attach {
        let content = fs::read(&spec.path)
            .with_context(|| format!("Failed to read attachment {}", spec.path.display()))?;
        let filename = spec
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("Attachment {} has no file name", spec.path.display()))?;
        info!(%filename, bytes = content.len(), "Attaching file");
        message = message.attach(OutboundAttachment::new(
            filename,
            spec.content_type.unwrap_or_default(),
            content,
        ));
    }

    let builder = config.message_builder(&message);
    if args.rfc2822 {
        println!("{}", builder.to_rfc2822());
    } else {
        println!("{}", builder.build());
    }
    Ok(())
}

fn cmd_header(action: &HeaderAction) {
    match action {
        HeaderAction::Decode { value } => {
            let decoded = Headers::decode_value_report(value);
            for malformed in &decoded.malformed {
                warn!(word = %malformed.word, reason = %malformed.reason, "Left encoded-word as is");
            }
            println!("{}", decoded.text);
        }
        HeaderAction::Encode { value } => println!("{}", Headers::encode_value(value)),
    }
}
