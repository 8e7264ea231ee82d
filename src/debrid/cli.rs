use crate::config::AppConfig;
use clap::{Arg, ArgMatches, Command};

/// Adds the debrid connection flags to a subcommand.
pub fn augment_command(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("debrid_token")
            .long("token")
            .help_heading("Debrid")
            .help("API token (overrides the config file and RD_API_TOKEN)")
            .num_args(1),
    )
    .arg(
        Arg::new("debrid_base_url")
            .long("base-url")
            .help_heading("Debrid")
            .help("REST API base url")
            .num_args(1),
    )
    .arg(
        Arg::new("debrid_user_agent")
            .long("user-agent")
            .help_heading("Debrid")
            .help("HTTP User-Agent")
            .num_args(1),
    )
    .arg(
        Arg::new("debrid_timeout_secs")
            .long("timeout-secs")
            .help_heading("Debrid")
            .help("Per-request timeout in seconds")
            .num_args(1),
    )
}

/// Flags that only matter when links are actually submitted.
pub fn augment_send_command(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("debrid_extensions")
            .long("extensions")
            .help_heading("Debrid")
            .help("Comma-separated extensions to select, e.g. mkv,mp4,srt")
            .num_args(1),
    )
    .arg(
        Arg::new("notify_secs")
            .long("notify-secs")
            .help_heading("Notifications")
            .help("Seconds a notification stays visible")
            .num_args(1),
    )
}

/// Applies flags given on the command line; absent flags leave `cfg` untouched.
pub fn apply_matches(matches: &ArgMatches, cfg: &mut AppConfig) -> anyhow::Result<()> {
    if let Some(t) = matches.get_one::<String>("debrid_token") {
        cfg.api_token = t.clone();
    }
    if let Some(u) = matches.get_one::<String>("debrid_base_url") {
        cfg.base_url = u.clone();
    }
    if let Some(ua) = matches.get_one::<String>("debrid_user_agent") {
        cfg.user_agent = ua.clone();
    }
    if let Some(s) = matches.get_one::<String>("debrid_timeout_secs") {
        cfg.timeout_secs = s.parse()?;
    }
    Ok(())
}

/// Same as [`apply_matches`] for the flags of [`augment_send_command`].
pub fn apply_send_matches(matches: &ArgMatches, cfg: &mut AppConfig) -> anyhow::Result<()> {
    if let Some(s) = matches.get_one::<String>("notify_secs") {
        cfg.notify_secs = s.parse()?;
    }
    if let Some(list) = matches.get_one::<String>("debrid_extensions") {
        let exts: Vec<String> = list
            .split(',')
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        if exts.is_empty() {
            anyhow::bail!("invalid extension list: {}", list);
        }
        cfg.allowed_extensions = exts;
    }
    Ok(())
}
