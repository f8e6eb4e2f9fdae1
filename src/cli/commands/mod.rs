pub mod logging;
pub mod turnstile;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("gatekeeper")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("GATEKEEPER_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = turnstile::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_KEYS: [&str; 4] = [
        "GATEKEEPER_PORT",
        "GATEKEEPER_LOG_LEVEL",
        "GATEKEEPER_SITEVERIFY_URL",
        "TURNSTILE_SECRET_KEY",
    ];

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "gatekeeper");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(ENV_KEYS, || {
            let matches = new().get_matches_from(vec!["gatekeeper"]);

            assert_eq!(matches.get_one::<u16>("port").copied(), Some(8080));
            assert_eq!(matches.get_one::<String>(turnstile::ARG_SECRET_KEY), None);
            assert_eq!(
                matches
                    .get_one::<String>(turnstile::ARG_SITEVERIFY_URL)
                    .cloned(),
                Some(crate::turnstile::SITEVERIFY_URL.to_string())
            );
        });
    }

    #[test]
    fn test_check_args() {
        temp_env::with_vars_unset(ENV_KEYS, || {
            let matches = new().get_matches_from(vec![
                "gatekeeper",
                "--port",
                "3000",
                "--turnstile-secret-key",
                "secret",
                "--siteverify-url",
                "http://localhost:9000/siteverify",
            ]);

            assert_eq!(matches.get_one::<u16>("port").copied(), Some(3000));
            assert_eq!(
                matches.get_one::<String>(turnstile::ARG_SECRET_KEY).cloned(),
                Some("secret".to_string())
            );
            assert_eq!(
                matches
                    .get_one::<String>(turnstile::ARG_SITEVERIFY_URL)
                    .cloned(),
                Some("http://localhost:9000/siteverify".to_string())
            );
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("GATEKEEPER_PORT", Some("443")),
                ("TURNSTILE_SECRET_KEY", Some("env-secret")),
                (
                    "GATEKEEPER_SITEVERIFY_URL",
                    Some("https://siteverify.internal/v0/siteverify"),
                ),
                ("GATEKEEPER_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["gatekeeper"]);
                assert_eq!(matches.get_one::<u16>("port").copied(), Some(443));
                assert_eq!(
                    matches.get_one::<String>(turnstile::ARG_SECRET_KEY).cloned(),
                    Some("env-secret".to_string())
                );
                assert_eq!(
                    matches
                        .get_one::<String>(turnstile::ARG_SITEVERIFY_URL)
                        .cloned(),
                    Some("https://siteverify.internal/v0/siteverify".to_string())
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("GATEKEEPER_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["gatekeeper"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for count in 0..5_u8 {
            temp_env::with_vars([("GATEKEEPER_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["gatekeeper".to_string()];
                if count > 0 {
                    args.push(format!("-{}", "v".repeat(usize::from(count))));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(count)
                );
            });
        }
    }
}
