use tracing::{error, info};

use crate::api::denylist::DenylistApi;
use crate::models::cache::SnapshotCache;
use crate::utils::display::DisplayFormatter;
use std::sync::Arc;
use std::time::Duration;

pub struct FlagService {
    cache: SnapshotCache,
    display: DisplayFormatter,
}

impl FlagService {
    pub fn new(api: DenylistApi, validity: Duration) -> Self {
        Self {
            cache: SnapshotCache::new(Arc::new(api), validity),
            display: DisplayFormatter::new(),
        }
    }

    pub async fn check_and_display(&self, id: &str) {
        info!("Checking identifier: {}", id);
        let verdict = self.cache.check(id).await;
        println!("{}", self.display.format_verdict(id, verdict));
    }

    pub async fn display_flagged(&self) {
        info!("Listing flagged identifiers");
        match self.cache.current().await {
            Some(snapshot) => {
                let mut ids: Vec<String> = snapshot.ids.iter().cloned().collect();
                ids.sort();

                println!("{}", self.display.format_header("Flagged Identifiers"));
                println!("{}", self.display.format_flagged_table(&ids));
                println!(
                    "{} entries, {}",
                    ids.len(),
                    self.display.format_age(snapshot.age())
                );
            }
            None => println!("Denylist has not been loaded yet; try 'refresh'."),
        }
    }

    pub async fn refresh_and_display(&self) {
        info!("Forcing denylist refresh");
        match self.cache.refresh().await {
            Ok(count) => println!("Refreshed denylist: {} flagged identifiers", count),
            Err(e) => {
                error!("Failed to refresh denylist: {}", e);
                println!("Refresh failed: {}", e);
            }
        }
    }
}
