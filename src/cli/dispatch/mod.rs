use crate::cli::{
    actions::{Action, server::Args},
    commands::turnstile::{ARG_SECRET_KEY, ARG_SITEVERIFY_URL},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use url::Url;

/// # Errors
/// Returns an error if required arguments are missing or malformed.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let turnstile_secret = matches
        .get_one::<String>(ARG_SECRET_KEY)
        .filter(|secret| !secret.is_empty())
        .map(|secret| SecretString::from(secret.clone()));

    let siteverify_url = matches
        .get_one::<String>(ARG_SITEVERIFY_URL)
        .context("missing required argument: --siteverify-url")?;
    let siteverify_url = Url::parse(siteverify_url).context("invalid GATEKEEPER_SITEVERIFY_URL")?;

    Ok(Action::Server(Args {
        port,
        turnstile_secret,
        siteverify_url,
    }))
}
