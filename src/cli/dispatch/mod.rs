use crate::cli::actions::Action;
use anyhow::{Context, Result};
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let token_secret = matches
        .get_one::<String>("token-secret")
        .cloned()
        .context("missing required argument: --token-secret")?;

    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn: matches
            .get_one::<String>("dsn")
            .cloned()
            .context("missing required argument: --dsn")?,
        token_secret: SecretString::from(token_secret),
        token_ttl_seconds: matches
            .get_one::<i64>("token-ttl")
            .copied()
            .unwrap_or(7200),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn test_handler_builds_server_action() {
        temp_env::with_vars(
            [
                ("UZANTO_PORT", None::<&str>),
                ("UZANTO_TOKEN_TTL", None::<&str>),
            ],
            || {
                let matches = commands::new().get_matches_from(vec![
                    "uzanto",
                    "--dsn",
                    "postgres://localhost:5432/uzanto",
                    "--token-secret",
                    "hunter2",
                    "--token-ttl",
                    "60",
                ]);

                let Ok(Action::Server {
                    port,
                    dsn,
                    token_secret,
                    token_ttl_seconds,
                }) = handler(&matches)
                else {
                    panic!("expected a server action");
                };

                assert_eq!(port, 8080);
                assert_eq!(dsn, "postgres://localhost:5432/uzanto");
                assert_eq!(token_secret.expose_secret(), "hunter2");
                assert_eq!(token_ttl_seconds, 60);
            },
        );
    }
}
