//! Chat widget loader: command-line entry point.
//!
//! The loader itself runs inside a host page.  This binary drives the same
//! library code from a terminal, which is how deployments are checked before
//! a profile ships:
//!
//! # Usage
//!
//! ```text
//! widget-loader [OPTIONS] <COMMAND>
//!
//! Commands:
//!   frame-url      Print the iframe URL for a set of script-tag attributes
//!   check-domain   Run the configured domain check for one or more URLs
//!   simulate       Run a full session against an in-memory page
//!
//! Options:
//!   --profile <FILE>              Loader profile (TOML)
//!   --preset <steno-chat|niro>    Built-in profile [default: steno-chat]
//!   --validation-service <URL>    Domain-check service base URL
//!   --allow-list-only             Check against allowed_urls, no network
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                     | Description                        |
//! |------------------------------|------------------------------------|
//! | `WIDGET_VALIDATION_SERVICE`  | Domain-check service base URL      |
//! | `RUST_LOG`                   | Log filter (default `info`)        |
//!
//! # Examples
//!
//! ```text
//! widget-loader frame-url --attr id=acme --attr position=left --viewport 390x844
//! widget-loader --preset niro check-domain https://niro.steno.ai https://evil.example
//! widget-loader --allow-list-only simulate --attr id=acme \
//!     --message '{"action":"resize","width":"400px","height":"640px"}'
//! ```

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use futures_util::future::join_all;
use tracing::info;
use tracing_subscriber::EnvFilter;

use widget_core::{build_frame_url, is_allowed_target, ScriptAttributes, Viewport, WidgetConfig};
use widget_loader::application::{DomainValidator, InboundMessage, WidgetSession};
use widget_loader::domain::{load_profile, LoaderProfile, ValidationMode};
use widget_loader::infrastructure::domain_check::checker_for;
use widget_loader::infrastructure::host_page::MemoryHost;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Chat widget loader tooling.
#[derive(Debug, Parser)]
#[command(
    name = "widget-loader",
    about = "Build frame URLs, check domains and simulate chat widget sessions",
    version
)]
struct Cli {
    /// Loader profile file (TOML).  Takes precedence over `--preset`.
    #[arg(long, global = true, value_name = "FILE", conflicts_with = "preset")]
    profile: Option<PathBuf>,

    /// Built-in loader profile.
    #[arg(long, global = true, value_enum)]
    preset: Option<Preset>,

    /// Base URL of the domain-check service, overriding the profile.
    #[arg(long, global = true, env = "WIDGET_VALIDATION_SERVICE")]
    validation_service: Option<String>,

    /// Check domains against the profile's allowed URLs only.
    #[arg(long, global = true)]
    allow_list_only: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Preset {
    StenoChat,
    Niro,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the iframe URL the loader would mount.
    FrameUrl(PageArgs),

    /// Run the configured domain check and print one line per URL.
    CheckDomain {
        #[arg(required = true, value_name = "URL")]
        urls: Vec<String>,
    },

    /// Run a session against an in-memory page and print every DOM operation.
    Simulate(SimulateArgs),
}

/// The embedding page as seen by the loader.
#[derive(Debug, Args)]
struct PageArgs {
    /// Script-tag attribute, e.g. `id=acme` or `data-position=left`.
    #[arg(long = "attr", value_name = "NAME=VALUE", value_parser = parse_attribute)]
    attributes: Vec<(String, String)>,

    /// Browser viewport as `WIDTHxHEIGHT`.
    #[arg(long, value_name = "WxH", default_value = "1280x800", value_parser = parse_viewport)]
    viewport: Viewport,
}

#[derive(Debug, Args)]
struct SimulateArgs {
    #[command(flatten)]
    page: PageArgs,

    /// Browser user agent.
    #[arg(long)]
    user_agent: Option<String>,

    /// Raw `document.cookie` of the page.
    #[arg(long)]
    cookies: Option<String>,

    /// JSON `postMessage` payload sent by the frame after mounting.
    /// May be repeated.
    #[arg(long = "message", value_name = "JSON")]
    messages: Vec<String>,

    /// Origin reported for `--message` payloads [default: the chat URL].
    #[arg(long)]
    origin: Option<String>,

    /// Fire `unload` at the end of the simulation.
    #[arg(long)]
    unload: bool,
}

impl Cli {
    /// Resolves the loader profile from `--profile`/`--preset` and applies
    /// the validation overrides.
    fn resolve_profile(&self) -> anyhow::Result<LoaderProfile> {
        let mut profile = match (&self.profile, self.preset) {
            (Some(path), _) => load_profile(path)
                .with_context(|| format!("failed to load profile {}", path.display()))?,
            (None, Some(Preset::Niro)) => LoaderProfile::niro(),
            (None, _) => LoaderProfile::steno_chat(),
        };

        if let Some(service) = &self.validation_service {
            profile.validation.service_url = service.clone();
        }
        if self.allow_list_only {
            profile.validation.mode = ValidationMode::AllowList;
        }
        Ok(profile)
    }
}

impl PageArgs {
    fn script_attributes(&self) -> ScriptAttributes {
        self.attributes.iter().cloned().collect()
    }

    fn attribute_pairs(&self) -> Vec<(&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Parses `NAME=VALUE`, adding the `data-` prefix when it is missing.
fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty attribute name in '{raw}'"));
    }
    let name = if name.starts_with("data-") {
        name.to_string()
    } else {
        format!("data-{name}")
    };
    Ok((name, value.to_string()))
}

/// Parses `WIDTHxHEIGHT`.
fn parse_viewport(raw: &str) -> Result<Viewport, String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{raw}'"))?;
    let width = w.trim().parse::<u32>().map_err(|e| format!("invalid width '{w}': {e}"))?;
    let height = h.trim().parse::<u32>().map_err(|e| format!("invalid height '{h}': {e}"))?;
    Ok(Viewport::new(width, height))
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn frame_url(profile: &LoaderProfile, page: &PageArgs) -> anyhow::Result<String> {
    let config = WidgetConfig::from_attributes(&page.script_attributes());
    let target = config.target_url(&profile.default_url);

    if !profile.allowed_urls.is_empty() && !is_allowed_target(target, profile.allowed_urls.as_slice()) {
        bail!("chat URL '{target}' is not in the profile's allowed URLs");
    }

    let mobile = profile.mobile.breakpoint().is_mobile(page.viewport);
    let url = build_frame_url(target, &profile.frame_path, &config, mobile)
        .with_context(|| format!("cannot build frame URL for '{target}'"))?;
    Ok(url.to_string())
}

async fn check_domains(profile: &LoaderProfile, urls: &[String]) -> anyhow::Result<()> {
    let checker = checker_for(profile).context("failed to configure the domain check")?;
    let validator = DomainValidator::new(checker);

    let outcomes = join_all(urls.iter().map(|url| validator.validate(url))).await;
    for (url, trusted) in urls.iter().zip(outcomes) {
        println!("{url}\t{}", if trusted { "trusted" } else { "untrusted" });
    }
    info!(
        "{} URL(s) checked with {} request(s)",
        urls.len(),
        validator.cached_hosts()
    );
    Ok(())
}

async fn simulate(profile: LoaderProfile, args: &SimulateArgs) -> anyhow::Result<()> {
    let checker = checker_for(&profile).context("failed to configure the domain check")?;

    let script_src = format!("https://cdn.example/{}", profile.script_suffix);
    let mut host = MemoryHost::new()
        .with_viewport(args.page.viewport.width, args.page.viewport.height)
        .with_script(&script_src, &args.page.attribute_pairs());
    if let Some(user_agent) = &args.user_agent {
        host = host.with_user_agent(user_agent);
    }
    if let Some(cookies) = &args.cookies {
        host = host.with_cookies(cookies);
    }

    let messages = args
        .messages
        .iter()
        .map(|raw| {
            serde_json::from_str::<serde_json::Value>(raw)
                .with_context(|| format!("--message is not valid JSON: {raw}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let host = Rc::new(host);
    let profile = Rc::new(profile);
    let session = WidgetSession::new(Rc::clone(&host), Rc::clone(&profile), checker);
    info!("simulating session {}", session.id());

    println!("start: {:?}", session.start().await);

    let origin = match &args.origin {
        Some(origin) => origin.clone(),
        None => session
            .config()
            .and_then(|c| c.url)
            .unwrap_or_else(|| profile.default_url.clone()),
    };
    for data in messages {
        let outcome = session
            .on_message(InboundMessage::from_frame(origin.as_str(), data))
            .await;
        println!("message: {outcome:?}");
    }

    if args.unload {
        session.on_unload();
    }

    println!("state: {}", session.state());
    for op in host.ops() {
        println!("  {op:?}");
    }
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// Sessions hold `Rc` state, so everything runs on a current-thread runtime.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.resolve_profile()?;

    match &cli.command {
        Command::FrameUrl(page) => println!("{}", frame_url(&profile, page)?),
        Command::CheckDomain { urls } => check_domains(&profile, urls).await?,
        Command::Simulate(args) => simulate(profile, args).await?,
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_steno_chat_profile() {
        // Arrange: no global options
        let cli = Cli::parse_from(["widget-loader", "frame-url"]);

        // Act
        let profile = cli.resolve_profile().unwrap();

        // Assert: `WIDGET_VALIDATION_SERVICE` may be exported in the test
        // environment, so the service URL follows whatever clap read.
        let mut expected = LoaderProfile::steno_chat();
        if let Some(service) = &cli.validation_service {
            expected.validation.service_url = service.clone();
        }
        assert_eq!(profile, expected);
    }

    #[test]
    fn test_cli_niro_preset() {
        let cli = Cli::parse_from(["widget-loader", "--preset", "niro", "frame-url"]);
        assert_eq!(cli.resolve_profile().unwrap().frame_id, "niro-iframe");
    }

    #[test]
    fn test_cli_profile_and_preset_conflict() {
        let result = Cli::try_parse_from([
            "widget-loader",
            "--profile",
            "p.toml",
            "--preset",
            "niro",
            "frame-url",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_validation_overrides() {
        let cli = Cli::parse_from([
            "widget-loader",
            "--validation-service",
            "http://127.0.0.1:9000",
            "--allow-list-only",
            "check-domain",
            "https://chat.steno.ai",
        ]);

        let profile = cli.resolve_profile().unwrap();

        assert_eq!(profile.validation.service_url, "http://127.0.0.1:9000");
        assert_eq!(profile.validation.mode, ValidationMode::AllowList);
    }

    #[test]
    fn test_cli_check_domain_requires_a_url() {
        assert!(Cli::try_parse_from(["widget-loader", "check-domain"]).is_err());
    }

    #[test]
    fn test_parse_attribute_adds_data_prefix() {
        assert_eq!(parse_attribute("id=acme").unwrap(), ("data-id".into(), "acme".into()));
        assert_eq!(
            parse_attribute("data-url=https://chat.steno.ai?a=b").unwrap(),
            ("data-url".into(), "https://chat.steno.ai?a=b".into())
        );
        assert!(parse_attribute("id").is_err());
        assert!(parse_attribute("=x").is_err());
    }

    #[test]
    fn test_parse_viewport() {
        assert_eq!(parse_viewport("390x844").unwrap(), Viewport::new(390, 844));
        assert!(parse_viewport("390").is_err());
        assert!(parse_viewport("wide x 844").is_err());
    }

    #[test]
    fn test_frame_url_command_uses_viewport_for_mobile_flag() {
        let cli = Cli::parse_from([
            "widget-loader",
            "frame-url",
            "--attr",
            "id=x",
            "--attr",
            "position=left",
            "--viewport",
            "390x844",
        ]);
        let profile = cli.resolve_profile().unwrap();
        let Command::FrameUrl(page) = &cli.command else {
            panic!("expected frame-url");
        };

        let url = frame_url(&profile, page).unwrap();

        assert_eq!(url, "https://chat.steno.ai/chat?id=x&position=left&mobile=true");
    }

    #[test]
    fn test_frame_url_command_rejects_disallowed_target() {
        let cli = Cli::parse_from(["widget-loader", "frame-url", "--attr", "url=https://evil.example"]);
        let profile = cli.resolve_profile().unwrap();
        let Command::FrameUrl(page) = &cli.command else {
            panic!("expected frame-url");
        };

        assert!(frame_url(&profile, page).is_err());
    }
}
