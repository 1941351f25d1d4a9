//! Store catalog lookup and cover art download
//!
//! Used to fill in the catalog id and cover art of new games. Every call is
//! best-effort: callers log failures and carry on without the data.

use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::io;
use std::path::Path;

use crate::config::AppConfig;
use crate::logging::{log_download, log_warning};

const STORE_SEARCH_URL: &str = "https://store.steampowered.com/api/storesearch/";
const STEAM_CDN_APPS: &str = "https://steamcdn-a.akamaihd.net/steam/apps";

/// One search hit.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize, Debug, Default)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<CatalogItem>,
}

/// External game catalog.
pub trait Catalog: Send + Sync {
    /// Search candidates by name, best match first.
    fn search(&self, name: &str) -> Result<Vec<CatalogItem>, Box<dyn Error>>;

    /// Download cover art for `id` into `dest`.
    fn download_thumbnail(&self, id: u64, dest: &Path) -> Result<(), Box<dyn Error>>;
}

/// Cover art URLs to try for an app, in order: portrait library art, then header.
pub fn thumbnail_candidates(id: u64) -> Vec<String> {
    vec![
        format!("{}/{}/library_600x900.jpg", STEAM_CDN_APPS, id),
        format!("{}/{}/header.jpg", STEAM_CDN_APPS, id),
    ]
}

// ============================================================================
// Steam Store
// ============================================================================

pub struct SteamCatalog {
    language: String,
    country: String,
}

impl Default for SteamCatalog {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl SteamCatalog {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            language: config.catalog_language.clone(),
            country: config.catalog_country.clone(),
        }
    }

    /// Fetch one URL into `dest`, requiring HTTP 200.
    fn fetch_to(url: &str, dest: &Path) -> Result<(), Box<dyn Error>> {
        let response = ureq::get(url)
            .set("User-Agent", "umu-front")
            .call()?;
        if response.status() != 200 {
            return Err(format!("HTTP {} for {}", response.status(), url).into());
        }

        let mut reader = response.into_reader();
        let mut file = fs::File::create(dest)?;
        if let Err(e) = io::copy(&mut reader, &mut file) {
            drop(file);
            let _ = fs::remove_file(dest);
            return Err(e.into());
        }
        Ok(())
    }
}

impl Catalog for SteamCatalog {
    fn search(&self, name: &str) -> Result<Vec<CatalogItem>, Box<dyn Error>> {
        let response = ureq::get(STORE_SEARCH_URL)
            .set("User-Agent", "umu-front")
            .query("term", name)
            .query("l", &self.language)
            .query("cc", &self.country)
            .call()?;

        if response.status() != 200 {
            return Err(format!("failed to search store: HTTP {}", response.status()).into());
        }

        let body: SearchResponse = response.into_json()?;
        Ok(body.items)
    }

    fn download_thumbnail(&self, id: u64, dest: &Path) -> Result<(), Box<dyn Error>> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        for url in thumbnail_candidates(id) {
            match Self::fetch_to(&url, dest) {
                Ok(()) => {
                    log_download(&format!("Cover for app {} saved to {}", id, dest.display()));
                    return Ok(());
                }
                Err(e) => log_download(&format!("Candidate {} failed: {}", url, e)),
            }
        }

        log_warning(&format!("No cover art available for app {}", id));
        Err(format!("failed to download thumbnail for app {}", id).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_candidate_order() {
        let urls = thumbnail_candidates(440);
        assert_eq!(urls.len(), 2);
        assert!(urls[0].ends_with("/440/library_600x900.jpg"));
        assert!(urls[1].ends_with("/440/header.jpg"));
    }

    #[test]
    fn test_parse_search_response() {
        let body = r#"{
            "total": 2,
            "items": [
                { "type": "app", "name": "Portal 2", "id": 620, "price": { "final": 999 } },
                { "type": "app", "name": "Portal", "id": 400 }
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.items,
            vec![
                CatalogItem { id: 620, name: "Portal 2".to_string() },
                CatalogItem { id: 400, name: "Portal".to_string() },
            ]
        );
    }

    #[test]
    fn test_parse_empty_search_response() {
        let parsed: SearchResponse = serde_json::from_str(r#"{ "total": 0 }"#).unwrap();
        assert!(parsed.items.is_empty());
    }
}
