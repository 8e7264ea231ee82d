mod config;
mod core;
mod debrid;
mod i18n;
mod logging;
mod notify;
mod page;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use crate::core::catalog::{fetch_catalog, Catalog};
use crate::core::filter::FileFilter;
use crate::core::model::{IndicatorState, MagnetLink};
use crate::debrid::api::DebridApi;
use crate::debrid::realdebrid::RealDebridClient;
use crate::i18n::{get_messages, Locale, Messages};
use crate::notify::TerminalNotifier;
use crate::page::scan::PageSource;
use crate::page::{Activation, ClickReport, Integration, Page, RunReport};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn build_cli() -> Command {
    let page_arg = Arg::new("page")
        .help("Page to scan: http(s) url or local HTML file")
        .required(true)
        .num_args(1);

    let send = Command::new("send")
        .about("Send the page's magnet links to the debrid service")
        .arg(page_arg.clone())
        .arg(
            Arg::new("pick")
                .long("pick")
                .help("Only activate these links (1-based, repeatable or comma-separated)")
                .action(ArgAction::Append)
                .value_delimiter(',')
                .value_parser(value_parser!(usize)),
        );
    let send = debrid::cli::augment_send_command(debrid::cli::augment_command(send));

    let scan = Command::new("scan")
        .about("List the page's magnet links and whether the account already has them")
        .arg(page_arg);
    let scan = debrid::cli::augment_command(scan);

    Command::new("magnet-debrid")
        .about("Find magnet links on a web page and hand them to Real-Debrid")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Config file (default: ~/.config/magnet-debrid/config.toml)")
                .num_args(1),
        )
        .arg(
            Arg::new("locale")
                .long("locale")
                .global(true)
                .help("Message language: en, zh")
                .num_args(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .help("More log output (repeatable)")
                .action(ArgAction::Count),
        )
        .subcommand(send)
        .subcommand(scan)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();
    logging::init_logging(matches.get_count("verbose"));

    let Some((name, m)) = matches.subcommand() else {
        return Ok(());
    };

    let mut cfg = match m.get_one::<String>("config") {
        Some(p) => config::load_from(Path::new(p))?,
        None => config::load_or_init()?,
    };
    cfg.apply_env(std::env::var(config::TOKEN_ENV).ok());
    if let Some(l) = m.get_one::<String>("locale") {
        cfg.locale = l.clone();
    }
    debrid::cli::apply_matches(m, &mut cfg)?;
    if name == "send" {
        debrid::cli::apply_send_matches(m, &mut cfg)?;
    }
    let messages = get_messages(Locale::parse(&cfg.locale));

    match name {
        "send" => send(m, &cfg, messages).await,
        "scan" => scan(m, &cfg, messages).await,
        _ => Ok(()),
    }
}

async fn load_page(m: &ArgMatches, cfg: &config::AppConfig) -> anyhow::Result<Page> {
    let raw = m.get_one::<String>("page").context("missing page argument")?;
    let source = PageSource::parse(raw);
    let client = reqwest::Client::builder()
        .user_agent(cfg.user_agent.clone())
        .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
        .build()?;
    Page::load(&source, &client).await
}

async fn send(m: &ArgMatches, cfg: &config::AppConfig, messages: &'static Messages) -> anyhow::Result<()> {
    let ctx = cfg.debrid_context()?;
    let api: Arc<dyn DebridApi> = Arc::new(RealDebridClient::new(&ctx)?);
    let page = load_page(m, cfg).await?;

    let activation = match m.get_many::<usize>("pick") {
        Some(picks) => Activation::Picked(picks.copied().collect()),
        None => Activation::All,
    };

    let notifier = Arc::new(TerminalNotifier::new(Duration::from_secs(cfg.notify_secs))?);
    let integration = Integration {
        api,
        notifier: notifier.clone(),
        filter: FileFilter::new(&cfg.allowed_extensions),
        messages,
    };

    let report = match page::run(&page, integration, &activation).await {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, source = %page.source, "aborting");
            return Err(e.into());
        }
    };

    let RunReport::Ran { catalog_size, clicks } = report else {
        return Ok(());
    };
    notifier.settle().await;

    for line in summary_lines(catalog_size, &clicks, messages) {
        notifier.println(line);
    }
    Ok(())
}

fn summary_lines(catalog_size: usize, clicks: &[ClickReport], messages: &Messages) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!("{} ({} torrents already on the account):", messages.summary_header, catalog_size),
    ];
    for c in clicks {
        let state = state_label(c.state, messages);
        lines.push(match &c.outcome {
            Ok(s) => format!(
                "- #{} {} torrent={} files={}",
                c.position + 1,
                state,
                s.torrent_id,
                s.selected.join(",")
            ),
            Err(e) => format!("- #{} {} {}: {} ({})", c.position + 1, state, e.message(messages), e, c.href),
        });
    }
    lines
}

async fn scan(m: &ArgMatches, cfg: &config::AppConfig, messages: &'static Messages) -> anyhow::Result<()> {
    let page = load_page(m, cfg).await?;
    if page.anchors.is_empty() {
        println!("{}", messages.no_links);
        return Ok(());
    }

    // Without a token the listing still works, just without the known/new column.
    let catalog: Option<Catalog> = if cfg.has_token() {
        let client = RealDebridClient::new(&cfg.debrid_context()?)?;
        Some(fetch_catalog(&client).await?)
    } else {
        None
    };

    for a in &page.anchors {
        let link = match MagnetLink::parse(&a.href) {
            Ok(l) => l,
            Err(e) => {
                println!("{:>3}. {}: {} ({})", a.index + 1, messages.invalid_magnet, e, a.href);
                continue;
            }
        };
        let status = match catalog.as_ref().map(|c| c.find(&link.hash)) {
            Some(Some(rec)) => format!(
                "{} id={} {} {}",
                messages.known,
                rec.id,
                rec.filename.as_deref().unwrap_or(""),
                rec.status.as_deref().unwrap_or("")
            ),
            Some(None) => messages.new.to_string(),
            None => "-".to_string(),
        };
        println!(
            "{:>3}. {} {} trackers={} [{}] {}",
            a.index + 1,
            link.hash,
            link.label(),
            link.trackers.len(),
            status.trim_end(),
            a.text
        );
    }
    Ok(())
}

fn state_label(state: IndicatorState, messages: &Messages) -> &'static str {
    match state {
        IndicatorState::Idle => messages.state_idle,
        IndicatorState::Neutral => messages.state_neutral,
        IndicatorState::Active => messages.state_active,
    }
}
