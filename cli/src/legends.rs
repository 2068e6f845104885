use std::path::{Path, PathBuf};

use reqwest::header::ACCEPT;
use reqwest::Client;
use riftbound_core::LegendRecord;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.riftcodex.com/cards";
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_CARD_TYPE: &str = "Legend";
pub const DEFAULT_OUT_PATH: &str = "public/legends.json";

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("invalid base url: {0}")]
    Url(#[from] url::ParseError),

    #[error("request for page {page} failed: {source}")]
    Http {
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetch failed page {page}: {status}\n{body}")]
    Status {
        page: u32,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed response for page {page}: {source}")]
    Json {
        page: u32,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode catalog: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct CardPage {
    #[serde(default)]
    pub items: Vec<Card>,
    pub pages: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Card {
    pub name: Option<String>,
    pub classification: Option<Classification>,
    pub media: Option<Media>,
    pub tags: Option<Vec<String>>,
    pub set: Option<CardSet>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Classification {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub rarity: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Media {
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CardSet {
    pub label: Option<String>,
}

pub struct RefreshOptions {
    pub base_url: String,
    pub page_size: u32,
    pub card_type: String,
}

/// Maps a card to a catalog record when it is of `card_type` and carries
/// both a name and an image.
pub fn legend_from_card(card: Card, card_type: &str) -> Option<LegendRecord> {
    let classification = card.classification?;
    if classification.kind.as_deref() != Some(card_type) {
        return None;
    }
    let name = card.name.filter(|name| !name.is_empty())?;
    let photo_url = card
        .media
        .and_then(|media| media.image_url)
        .filter(|url| !url.is_empty())?;
    Some(LegendRecord {
        name,
        photo_url,
        rarity: classification.rarity,
        tags: card.tags.unwrap_or_default(),
        set_name: card.set.and_then(|set| set.label),
    })
}

pub fn page_url(base_url: &str, page: u32, page_size: u32) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?;
    url.query_pairs_mut()
        .append_pair("page", &page.to_string())
        .append_pair("size", &page_size.to_string());
    Ok(url)
}

/// Stable by-name ordering so refreshed files diff cleanly.
pub fn sort_legends(legends: &mut [LegendRecord]) {
    legends.sort_by(|a, b| a.name.cmp(&b.name));
}

pub async fn fetch_legends(
    client: &Client,
    options: &RefreshOptions,
) -> Result<Vec<LegendRecord>, RefreshError> {
    let mut legends = Vec::new();
    let mut page = 1;
    let mut pages = 1;

    while page <= pages {
        let url = page_url(&options.base_url, page, options.page_size)?;
        debug!(%url, "fetching card page");
        let response = client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| RefreshError::Http { page, source })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| RefreshError::Http { page, source })?;
        if !status.is_success() {
            return Err(RefreshError::Status { page, status, body });
        }
        let data: CardPage =
            serde_json::from_str(&body).map_err(|source| RefreshError::Json { page, source })?;
        pages = data.pages.unwrap_or(1);

        let before = legends.len();
        legends.extend(
            data.items
                .into_iter()
                .filter_map(|card| legend_from_card(card, &options.card_type)),
        );
        info!(page, pages, kept = legends.len() - before, "fetched card page");
        page += 1;
    }

    sort_legends(&mut legends);
    Ok(legends)
}

/// Writes the catalog as pretty JSON with a trailing newline. The file is
/// replaced in one rename so readers never see a partial catalog.
pub async fn write_catalog(path: &Path, legends: &[LegendRecord]) -> Result<(), RefreshError> {
    let mut json = serde_json::to_string_pretty(legends).map_err(RefreshError::Encode)?;
    json.push('\n');
    let io_err = |source| RefreshError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, json).await.map_err(io_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(io_err)?;
    Ok(())
}
