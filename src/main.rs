use flagwatch::api::denylist::DenylistApi;
use flagwatch::FlagService;
use std::error::Error;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_API_URL: &str = "https://denylist.example.com/api/v1";
const SNAPSHOT_VALIDITY: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing with debug level
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting Flagged Identifier Lookup");

    let base_url =
        std::env::var("DENYLIST_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let service = FlagService::new(DenylistApi::new(base_url), SNAPSHOT_VALIDITY);

    println!("=== Flagged Identifier Lookup ===");
    println!("Commands:");
    println!("  <identifier> - Check whether an identifier is flagged");
    println!("  list         - Show the cached flagged identifiers");
    println!("  refresh      - Force a refresh from the denylist service");
    println!("  exit         - Exit the program");

    let mut input = String::new();
    loop {
        input.clear();
        print!("> ");
        io::stdout().flush()?;
        io::stdin().read_line(&mut input)?;

        let command = input.trim();
        match command {
            "" => continue,
            "exit" => {
                debug!("Received exit command");
                break;
            }
            "list" => {
                debug!("Listing cached flagged identifiers");
                service.display_flagged().await;
            }
            "refresh" => {
                debug!("Forcing denylist refresh");
                service.refresh_and_display().await;
            }
            id => {
                debug!("Checking identifier: {}", id);
                service.check_and_display(id).await;
            }
        }
    }

    info!("Shutting down");
    Ok(())
}
