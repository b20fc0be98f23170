use mongodb::{Client, Database, options::ClientOptions};
use tracing::info;
use voluntry_config::Settings;

/// Connects to MongoDB and returns a handle to the configured database.
///
/// Pool bounds come from settings; the ping fails fast when the server is
/// unreachable instead of deferring the error to the first query.
pub async fn connect(settings: &Settings) -> Result<Database, mongodb::error::Error> {
    let mut options = ClientOptions::parse(&settings.database.url).await?;
    options.app_name = Some("voluntry".to_string());
    options.max_pool_size = settings.database.max_pool_size.or(options.max_pool_size);
    options.min_pool_size = settings.database.min_pool_size.or(options.min_pool_size);

    let client = Client::with_options(options)?;
    let db = client.database(&settings.database.name);

    db.run_command(bson::doc! { "ping": 1 }).await?;
    info!(db = %settings.database.name, "Connected to MongoDB");

    Ok(db)
}
