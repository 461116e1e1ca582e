//! Argument parsing, logging setup, and command dispatch.

use audify_telemetry::{
    DEFAULT_LOG_LEVEL, GlobalContextGuard, LogFormat, LoggingConfig, build_sha, init_logging,
    with_request_context,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use url::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliResult, TelemetryEmitter, parse_url};
use crate::commands::auth::{handle_callback, handle_login, handle_logout, handle_whoami};
use crate::commands::compare::handle_compare;
use crate::commands::navigate::{handle_info, handle_open};
use crate::commands::optimize::handle_optimize;

/// Parses CLI arguments, executes the requested command, and handles
/// user-facing telemetry emission. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();

    let log_format = cli.log_format.unwrap_or_else(LogFormat::infer);
    let logging = LoggingConfig {
        level: &cli.log_level,
        format: log_format,
        build_sha: build_sha(),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: logging disabled: {err}");
    }

    let command_name = command_label(&cli.command);
    let _context = GlobalContextGuard::new(command_name);
    let trace_id = Uuid::new_v4().to_string();
    let telemetry = TelemetryEmitter::from_env();

    let result = match AppContext::from_cli(&cli, &trace_id) {
        Ok(ctx) => {
            with_request_context(trace_id.clone(), command_name, dispatch(cli.command, &ctx)).await
        }
        Err(err) => Err(err),
    };

    let (exit_code, message, outcome) = match result {
        Ok(()) => (0, None, "success"),
        Err(err) => {
            let exit_code = err.exit_code();
            let message = err.display_message();
            eprintln!("error: {message}");
            (exit_code, Some(message), "error")
        }
    };

    if let Some(emitter) = &telemetry {
        emitter
            .emit(
                &trace_id,
                command_name,
                outcome,
                exit_code,
                message.as_deref(),
            )
            .await;
    }

    exit_code
}

async fn dispatch(command: Command, ctx: &AppContext) -> CliResult<()> {
    match command {
        Command::Optimize(args) => handle_optimize(ctx, args).await,
        Command::Compare(args) => handle_compare(ctx, args).await,
        Command::Login => handle_login(ctx),
        Command::Callback(args) => handle_callback(ctx, args).await,
        Command::Logout(args) => handle_logout(ctx, args),
        Command::Whoami(args) => handle_whoami(ctx, args).await,
        Command::Open(args) => handle_open(ctx, &args),
        Command::Info => handle_info(ctx),
    }
}

#[derive(Parser)]
#[command(
    name = "audify",
    version,
    about = "Reorder Spotify playlists for smooth track transitions"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        value_parser = parse_url,
        help = "Optimization backend URL (overrides AUDIFY_BACKEND_URL)"
    )]
    pub(crate) backend_url: Option<Url>,
    #[arg(
        long,
        global = true,
        help = "HTTP timeout in seconds (overrides AUDIFY_HTTP_TIMEOUT_SECS)"
    )]
    pub(crate) timeout: Option<u64>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(long, global = true, env = "AUDIFY_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub(crate) log_level: String,
    #[arg(
        long,
        global = true,
        env = "AUDIFY_LOG_FORMAT",
        value_parser = parse_log_format,
        help = "Log format: json or pretty"
    )]
    pub(crate) log_format: Option<LogFormat>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Optimize the track order of a playlist.
    Optimize(OptimizeArgs),
    /// Measure how similar two playlists are.
    Compare(CompareArgs),
    /// Print the Spotify authorization URL.
    Login,
    /// Complete a login from the URL Spotify redirected to.
    Callback(CallbackArgs),
    /// Print the Spotify logout page.
    Logout(LogoutArgs),
    /// Show the Spotify profile behind an access token.
    Whoami(WhoamiArgs),
    /// Resolve an app path to its screen.
    Open(OpenArgs),
    /// Explain what Audify does.
    Info,
}

#[derive(Args)]
pub(crate) struct OptimizeArgs {
    #[arg(help = "Spotify playlist link")]
    pub(crate) link: String,
    #[arg(
        long,
        requires = "access_token",
        help = "Write the optimized order back to the playlist"
    )]
    pub(crate) apply: bool,
    #[arg(long, env = "AUDIFY_ACCESS_TOKEN", hide_env_values = true)]
    pub(crate) access_token: Option<String>,
}

#[derive(Args)]
pub(crate) struct CompareArgs {
    #[arg(help = "First playlist link")]
    pub(crate) playlist1: String,
    #[arg(help = "Second playlist link")]
    pub(crate) playlist2: String,
}

#[derive(Args)]
pub(crate) struct CallbackArgs {
    #[arg(value_parser = parse_url, help = "Full URL Spotify redirected the browser to")]
    pub(crate) redirect_url: Url,
}

#[derive(Args)]
pub(crate) struct LogoutArgs {
    #[arg(long, env = "AUDIFY_ACCESS_TOKEN", hide_env_values = true)]
    pub(crate) access_token: Option<String>,
}

#[derive(Args)]
pub(crate) struct WhoamiArgs {
    #[arg(long, env = "AUDIFY_ACCESS_TOKEN", hide_env_values = true)]
    pub(crate) access_token: String,
}

#[derive(Args)]
pub(crate) struct OpenArgs {
    #[arg(help = "App path such as /home or /sim")]
    pub(crate) path: String,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Optimize(_) => "optimize",
        Command::Compare(_) => "compare",
        Command::Login => "login",
        Command::Callback(_) => "callback",
        Command::Logout(_) => "logout",
        Command::Whoami(_) => "whoami",
        Command::Open(_) => "open",
        Command::Info => "info",
    }
}

fn parse_log_format(input: &str) -> Result<LogFormat, String> {
    input.parse::<LogFormat>().map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn apply_requires_an_access_token() {
        let parsed = Cli::try_parse_from(["audify", "optimize", "https://x.test/p", "--apply"]);
        assert!(parsed.is_err());

        let cli = Cli::try_parse_from([
            "audify",
            "optimize",
            "https://x.test/p",
            "--apply",
            "--access-token",
            "token",
        ])
        .expect("token supplied");
        assert_eq!(command_label(&cli.command), "optimize");
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "audify",
            "compare",
            "a",
            "b",
            "--output",
            "json",
            "--log-format",
            "pretty",
            "--backend-url",
            "http://127.0.0.1:5000",
        ])
        .expect("valid arguments");
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.log_format, Some(LogFormat::Pretty));
        assert_eq!(
            cli.backend_url.as_ref().map(Url::as_str),
            Some("http://127.0.0.1:5000/")
        );
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(parse_log_format("xml").is_err());
        assert_eq!(parse_log_format("json"), Ok(LogFormat::Json));
    }
}
