use crate::{api, auth::token::TokenCodec, cli::actions::Action};
use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            token_secret,
            token_ttl_seconds,
        } => {
            // Fail before touching the network if the DSN is not even a URL.
            let dsn = Url::parse(&dsn).context("invalid database DSN")?;

            let codec = TokenCodec::new(token_secret.expose_secret(), token_ttl_seconds);

            api::new(port, dsn.as_str(), codec).await?;
        }
    }

    Ok(())
}
