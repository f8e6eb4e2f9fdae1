use crate::{
    api::{self, VerificationGateway},
    cli::telemetry,
    turnstile::SiteVerifier,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use tracing::{info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub turnstile_secret: Option<SecretString>,
    pub siteverify_url: Url,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the HTTP client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    if args.turnstile_secret.is_none() {
        warn!("TURNSTILE_SECRET_KEY is not set, every verification will fail with 500");
    }

    let verifier =
        SiteVerifier::new(args.siteverify_url).context("Failed to build siteverify client")?;
    let gateway = VerificationGateway::new(args.turnstile_secret, verifier);

    let result = api::new(args.port, gateway).await;

    telemetry::shutdown_tracer();

    result
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("siteverify_url", args.siteverify_url.to_string()),
        (
            "turnstile_secret_set",
            args.turnstile_secret.is_some().to_string(),
        ),
    ];

    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!("{}\n\nStartup configuration:", banner());
    for (key, value) in &entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn banner() -> String {
    BANNER.replace(
        "{VERSION}",
        &format!(
            " - {} - {}",
            env!("CARGO_PKG_VERSION"),
            short_commit(crate::GIT_COMMIT_HASH)
        ),
    )
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}

const BANNER: &str = r"
   _____
  |  |  |
  |--+--|   G A T E K E E P E R {VERSION}
  |  |  |
  |__|__|";
