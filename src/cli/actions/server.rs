use crate::api;
use crate::cli::actions::Action;
use anyhow::Result;
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server { port, dsn } => {
            // Catch malformed connection strings here instead of deep inside
            // the pool setup.
            let dsn = Url::parse(&dsn)?;

            api::new(port, dsn.as_str()).await?;
        }
    }

    Ok(())
}
