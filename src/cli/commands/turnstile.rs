use clap::{Arg, Command};

pub const ARG_SECRET_KEY: &str = "turnstile-secret-key";
pub const ARG_SITEVERIFY_URL: &str = "siteverify-url";

// The secret stays optional: without it the gateway still starts and answers
// every verification with 500 instead of refusing to boot.
#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SECRET_KEY)
                .long(ARG_SECRET_KEY)
                .help("Turnstile secret key used to call siteverify")
                .env("TURNSTILE_SECRET_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_SITEVERIFY_URL)
                .long(ARG_SITEVERIFY_URL)
                .help("Turnstile siteverify endpoint")
                .env("GATEKEEPER_SITEVERIFY_URL")
                .default_value(crate::turnstile::SITEVERIFY_URL),
        )
}
