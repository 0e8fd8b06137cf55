use casehook::config::{default_config_path, load_config, resolve_settings, Overrides, ENDPOINT_ENV};
use casehook::event::{CaseDetails, EventRecord};
use casehook::hooks::{delivery_hooks, HookedSender};
use casehook::report::deliver_and_describe;
use casehook::sender::WebhookSender;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

const USAGE: &str = "Usage: casehook [--config PATH] [--url URL] [--timeout SECS] \
                     [--delivery-log PATH] [--dry-run] [CASE_FILE]";

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    config: Option<PathBuf>,
    url: Option<String>,
    timeout_seconds: Option<u64>,
    delivery_log: Option<PathBuf>,
    dry_run: bool,
    case_file: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => parsed.config = Some(PathBuf::from(flag_value(&mut args, &arg)?)),
            "--url" => parsed.url = Some(flag_value(&mut args, &arg)?),
            "--timeout" => {
                let value = flag_value(&mut args, &arg)?;
                let secs = value
                    .parse::<u64>()
                    .map_err(|_| format!("invalid timeout '{}'; expected whole seconds", value))?;
                parsed.timeout_seconds = Some(secs);
            }
            "--delivery-log" => {
                parsed.delivery_log = Some(PathBuf::from(flag_value(&mut args, &arg)?))
            }
            "--dry-run" => parsed.dry_run = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            other if other.starts_with("--") => return Err(format!("unknown flag '{}'", other)),
            other => {
                if parsed.case_file.is_some() {
                    return Err(format!("unexpected extra argument '{}'", other));
                }
                parsed.case_file = Some(PathBuf::from(other));
            }
        }
    }

    Ok(parsed)
}

fn flag_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    args.next()
        .ok_or_else(|| format!("{} requires a value", flag))
}

fn parse_cli_args() -> CliArgs {
    match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            if message != USAGE {
                eprintln!("{}", USAGE);
            }
            std::process::exit(1);
        }
    }
}

fn init_logging() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = parse_cli_args();

    let config_path = args.config.clone().or_else(default_config_path);
    let file_config = config_path.as_deref().and_then(load_config);
    let settings = resolve_settings(
        file_config.as_ref(),
        Overrides {
            url: args.url,
            env_url: std::env::var(ENDPOINT_ENV).ok(),
            timeout_seconds: args.timeout_seconds,
            delivery_log: args.delivery_log,
        },
    );

    let details = match &args.case_file {
        Some(path) => CaseDetails::from_json_file(path).await?,
        None => CaseDetails::sample(),
    };
    let record = EventRecord::new(details).context("case details are invalid")?;

    if args.dry_run {
        let pretty = serde_json::to_string_pretty(&record).context("serializing event record")?;
        println!("{}", pretty);
        return Ok(());
    }

    let endpoint_url = match settings.endpoint_url {
        Some(url) => url,
        None => {
            eprintln!(
                "No webhook URL configured. Pass --url, set {}, or add [webhook].url to the config file.",
                ENDPOINT_ENV
            );
            std::process::exit(1);
        }
    };

    let base = match settings.timeout {
        Some(timeout) => WebhookSender::with_timeout(timeout),
        None => WebhookSender::new(),
    };
    let hooks = delivery_hooks(settings.delivery_log.as_deref()).await;
    let sender = HookedSender::new(Arc::new(base), hooks);

    for line in deliver_and_describe(&sender, &endpoint_url, &record).await {
        println!("{}", line);
    }

    Ok(())
}
