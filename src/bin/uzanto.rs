use anyhow::Result;
use uzanto::cli::{actions::Action, start};

#[tokio::main]
async fn main() -> Result<()> {
    let action = start()?;

    match action {
        Action::Server { .. } => uzanto::cli::actions::server::handle(action).await?,
    }

    Ok(())
}
