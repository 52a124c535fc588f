// API client module: the `ImmichApi` trait is the seam between the core
// and the network, and `ApiClient` is its blocking HTTP implementation.
// Every call runs to completion before returning; there is no retry.

use std::sync::Once;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{Album, AssetId};
use crate::path::RelativePath;

/// Contents of one folder in the server's folder view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderListing {
    /// Assets directly in the folder.
    pub assets: Vec<AssetId>,
    /// Names of the immediate child folders.
    pub folders: Vec<String>,
}

impl FolderListing {
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.folders.is_empty()
    }
}

/// Per-asset outcome of an add-assets request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkIdResponse {
    pub id: AssetId,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BulkIdResponse {
    /// The asset was refused because the album already holds it.
    pub fn is_duplicate(&self) -> bool {
        !self.success && self.error.as_deref() == Some("duplicate")
    }
}

/// Remote operations the core needs. Implemented by [`ApiClient`] for the
/// real server and by an in-memory fake in tests.
pub trait ImmichApi {
    /// `GET /api/view/folder?path=<path>`
    fn folder(&self, path: &RelativePath) -> Result<FolderListing>;

    /// `GET /api/albums`
    fn albums(&self) -> Result<Vec<Album>>;

    /// `POST /api/albums`
    fn create_album(&self, name: &str) -> Result<Album>;

    /// `PUT /api/albums/{album_id}/assets`
    fn add_assets(&self, album_id: &str, ids: &[AssetId]) -> Result<Vec<BulkIdResponse>>;
}

/// Blocking client for the server. The API key travels as a default
/// header so every request is authenticated.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FolderResponse {
    // Some server versions answer with the bare asset list.
    Bare(Vec<AssetRef>),
    Listing {
        #[serde(default)]
        assets: Vec<AssetRef>,
        #[serde(default)]
        folders: Vec<String>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AssetRef {
    Id(String),
    Object { id: String },
}

impl AssetRef {
    fn into_id(self) -> AssetId {
        match self {
            AssetRef::Id(id) | AssetRef::Object { id } => AssetId::new(id),
        }
    }
}

static BARE_LISTING: Once = Once::new();

impl FolderResponse {
    fn into_listing(self) -> FolderListing {
        let (assets, folders) = match self {
            FolderResponse::Bare(assets) => {
                BARE_LISTING.call_once(|| {
                    tracing::warn!(
                        "server returned a plain asset list for a folder; \
                         subfolders are not listed and will not be searched"
                    )
                });
                (assets, Vec::new())
            }
            FolderResponse::Listing { assets, folders } => (assets, folders),
        };
        FolderListing {
            assets: assets.into_iter().map(AssetRef::into_id).collect(),
            folders,
        }
    }
}

/// Decode a folder-view body in any of the shapes the server produces.
pub fn parse_folder_listing(body: &str) -> Result<FolderListing> {
    let resp: FolderResponse =
        serde_json::from_str(body).map_err(|e| Error::Decode(format!("folder listing: {e}")))?;
    Ok(resp.into_listing())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateAlbumRequest<'a> {
    album_name: &'a str,
}

#[derive(Serialize)]
struct AddAssetsRequest<'a> {
    ids: &'a [AssetId],
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| Error::InvalidConfig("API key contains invalid characters".into()))?;
        headers.insert("x-api-key", key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(ApiClient {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }
}

/// Map a non-2xx response onto the error taxonomy.
fn check(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(Error::Auth { status });
    }
    let body = res.text().unwrap_or_default();
    tracing::debug!(%status, %body, "request failed");
    Err(Error::Remote { status, body })
}

impl ImmichApi for ApiClient {
    fn folder(&self, path: &RelativePath) -> Result<FolderListing> {
        let url = self.url("view/folder");
        tracing::debug!(path = %path, "listing folder");
        let res = self
            .client
            .get(&url)
            .query(&[("path", path.as_str())])
            .send()?;
        let body = check(res)?.text()?;
        parse_folder_listing(&body)
    }

    fn albums(&self) -> Result<Vec<Album>> {
        let url = self.url("albums");
        tracing::debug!("listing albums");
        let res = self.client.get(&url).send()?;
        let albums: Vec<Album> = check(res)?.json()?;
        Ok(albums)
    }

    fn create_album(&self, name: &str) -> Result<Album> {
        let url = self.url("albums");
        tracing::debug!(name, "creating album");
        let res = self
            .client
            .post(&url)
            .json(&CreateAlbumRequest { album_name: name })
            .send()?;
        if res.status() == StatusCode::CONFLICT {
            return Err(Error::NameConflict {
                name: name.to_string(),
            });
        }
        let album: Album = check(res)?.json()?;
        Ok(album)
    }

    fn add_assets(&self, album_id: &str, ids: &[AssetId]) -> Result<Vec<BulkIdResponse>> {
        let url = self.url(&format!("albums/{album_id}/assets"));
        tracing::debug!(album_id, count = ids.len(), "adding assets");
        let res = self
            .client
            .put(&url)
            .json(&AddAssetsRequest { ids })
            .send()?;
        let results: Vec<BulkIdResponse> = check(res)?.json()?;
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(listing: &FolderListing) -> Vec<&str> {
        listing.assets.iter().map(AssetId::as_str).collect()
    }

    #[test]
    fn parses_listing_with_string_ids() {
        let listing =
            parse_folder_listing(r#"{"assets":["a","b"],"folders":["2023","2024"]}"#).unwrap();
        assert_eq!(ids(&listing), vec!["a", "b"]);
        assert_eq!(listing.folders, vec!["2023", "2024"]);
    }

    #[test]
    fn parses_listing_with_asset_objects() {
        let listing = parse_folder_listing(
            r#"{"assets":[{"id":"a","originalPath":"/x/a.jpg"}],"folders":[]}"#,
        )
        .unwrap();
        assert_eq!(ids(&listing), vec!["a"]);
        assert!(listing.folders.is_empty());
    }

    #[test]
    fn parses_bare_asset_array() {
        let listing =
            parse_folder_listing(r#"[{"id":"a","type":"IMAGE"},{"id":"b","type":"VIDEO"}]"#)
                .unwrap();
        assert_eq!(ids(&listing), vec!["a", "b"]);
        assert!(listing.folders.is_empty());
        assert!(BARE_LISTING.is_completed());
    }

    #[test]
    fn missing_keys_mean_empty() {
        assert!(parse_folder_listing("{}").unwrap().is_empty());
        assert!(parse_folder_listing("[]").unwrap().is_empty());
        let only_folders = parse_folder_listing(r#"{"folders":["x"]}"#).unwrap();
        assert!(only_folders.assets.is_empty());
        assert!(!only_folders.is_empty());
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(parse_folder_listing("not json"), Err(Error::Decode(_))));
        assert!(matches!(parse_folder_listing("42"), Err(Error::Decode(_))));
    }

    #[test]
    fn bulk_response_flags_duplicates() {
        let results: Vec<BulkIdResponse> = serde_json::from_str(
            r#"[{"id":"a","success":true},
                {"id":"b","success":false,"error":"duplicate"},
                {"id":"c","success":false,"error":"no_permission"}]"#,
        )
        .unwrap();
        assert!(!results[0].is_duplicate());
        assert!(results[1].is_duplicate());
        assert!(!results[2].is_duplicate());
    }

    #[test]
    fn add_assets_body_shape() {
        let ids = [AssetId::from("a"), AssetId::from("b")];
        let body = serde_json::to_value(AddAssetsRequest { ids: &ids }).unwrap();
        assert_eq!(body, serde_json::json!({ "ids": ["a", "b"] }));
        let body = serde_json::to_value(CreateAlbumRequest { album_name: "Momo" }).unwrap();
        assert_eq!(body, serde_json::json!({ "albumName": "Momo" }));
    }

    #[test]
    fn client_builds_urls_from_config() {
        let dir = std::env::temp_dir();
        let config = Config::new("nas:2283/", "key", dir).unwrap();
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://nas:2283");
        assert_eq!(client.url("view/folder"), "http://nas:2283/api/view/folder");
    }
}
