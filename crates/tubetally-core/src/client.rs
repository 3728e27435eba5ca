//! HTTP implementation of [`PlaylistSource`] for the YouTube Data API v3.
//!
//! Requests go either straight to the API ([`TransportConfig::Direct`]) or
//! through a same-origin proxy that takes the endpoint name as a query
//! parameter ([`TransportConfig::Proxied`]). Both transports share the same
//! response decoding.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::gateway::{MAX_PAGE_SIZE, PlaylistSource};
use crate::video::{PlaylistItem, PlaylistPage, VideoDetails};

/// Base URL of the public YouTube Data API.
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Resource kind of playlist entries that are actual videos.
const VIDEO_RESOURCE_KIND: &str = "youtube#video";

/// Key sent to a proxy when the user has none; the proxy supplies its own.
const PROXY_SERVER_KEY: &str = "server";

/// How requests reach the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TransportConfig {
    /// Call the API directly.
    Direct {
        /// API root, e.g. `https://www.googleapis.com/youtube/v3`.
        base_url: String,
    },
    /// Call a proxy endpoint that forwards to the API.
    Proxied {
        /// Proxy URL, e.g. `https://example.org/api/youtube-proxy`.
        proxy_url: String,
    },
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::Direct {
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl TransportConfig {
    /// Whether this transport needs a caller-supplied API key.
    #[must_use]
    pub const fn requires_api_key(&self) -> bool {
        matches!(self, Self::Direct { .. })
    }
}

/// One logical API call, independent of transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest<'a> {
    /// A page of playlist items.
    PlaylistItems {
        /// Playlist to list.
        playlist_id: &'a str,
        /// Continuation token from the previous page.
        page_token: Option<&'a str>,
    },
    /// Duration and statistics for a batch of videos.
    Videos {
        /// At most [`MAX_PAGE_SIZE`] IDs.
        video_ids: &'a [String],
    },
    /// Playlist metadata (title).
    Playlists {
        /// Playlist to describe.
        playlist_id: &'a str,
    },
}

impl ApiRequest<'_> {
    const fn endpoint(&self) -> &'static str {
        match self {
            Self::PlaylistItems { .. } => "playlistItems",
            Self::Videos { .. } => "videos",
            Self::Playlists { .. } => "playlists",
        }
    }

    /// Resolve the URL and query parameters for `transport`.
    ///
    /// The key is the last parameter so callers can strip it before logging.
    #[must_use]
    pub fn render(
        &self,
        transport: &TransportConfig,
        api_key: Option<&str>,
    ) -> (String, Vec<(&'static str, String)>) {
        let max_results = MAX_PAGE_SIZE.to_string();
        match transport {
            TransportConfig::Direct { base_url } => {
                let url = format!("{}/{}", base_url.trim_end_matches('/'), self.endpoint());
                let mut query: Vec<(&'static str, String)> = match self {
                    Self::PlaylistItems {
                        playlist_id,
                        page_token,
                    } => {
                        let mut q = vec![
                            ("part", "snippet,contentDetails".to_string()),
                            ("maxResults", max_results),
                            ("playlistId", (*playlist_id).to_string()),
                        ];
                        if let Some(token) = page_token {
                            q.push(("pageToken", (*token).to_string()));
                        }
                        q
                    }
                    Self::Videos { video_ids } => vec![
                        ("part", "contentDetails,statistics".to_string()),
                        ("id", video_ids.join(",")),
                    ],
                    Self::Playlists { playlist_id } => vec![
                        ("part", "snippet".to_string()),
                        ("id", (*playlist_id).to_string()),
                    ],
                };
                query.push(("key", api_key.unwrap_or_default().to_string()));
                (url, query)
            }
            TransportConfig::Proxied { proxy_url } => {
                let mut query = vec![("endpoint", self.endpoint().to_string())];
                match self {
                    Self::PlaylistItems {
                        playlist_id,
                        page_token,
                    } => {
                        query.push(("playlistId", (*playlist_id).to_string()));
                        query.push(("maxResults", max_results));
                        if let Some(token) = page_token {
                            query.push(("pageToken", (*token).to_string()));
                        }
                    }
                    Self::Videos { video_ids } => {
                        query.push(("videoIds", video_ids.join(",")));
                    }
                    Self::Playlists { playlist_id } => {
                        query.push(("playlistId", (*playlist_id).to_string()));
                    }
                }
                query.push(("apiKey", api_key.unwrap_or(PROXY_SERVER_KEY).to_string()));
                (proxy_url.clone(), query)
            }
        }
    }
}

// Wire types. Only the fields the pipeline reads are declared.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<RawPlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlaylistItem {
    snippet: Option<RawItemSnippet>,
    content_details: Option<RawItemContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItemSnippet {
    #[serde(default)]
    title: String,
    position: Option<u32>,
    channel_title: Option<String>,
    channel_id: Option<String>,
    published_at: Option<String>,
    video_owner_channel_title: Option<String>,
    video_owner_channel_id: Option<String>,
    resource_id: Option<RawResourceId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResourceId {
    kind: Option<String>,
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItemContentDetails {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<RawVideo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVideo {
    id: String,
    content_details: Option<RawVideoContentDetails>,
    statistics: Option<RawStatistics>,
}

#[derive(Debug, Deserialize)]
struct RawVideoContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatistics {
    // The API encodes counts as strings.
    view_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistsResponse {
    #[serde(default)]
    items: Vec<RawPlaylist>,
}

#[derive(Debug, Deserialize)]
struct RawPlaylist {
    snippet: Option<RawPlaylistSnippet>,
}

#[derive(Debug, Deserialize)]
struct RawPlaylistSnippet {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorBody {
    Detailed {
        code: Option<u16>,
        message: String,
    },
    Message(String),
}

/// Decode a response body, turning error payloads into [`Error::Remote`].
///
/// An `error` object wins over the status code, since proxies sometimes
/// answer 200 with an upstream error inside.
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T> {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        let (code, message) = match envelope.error {
            ApiErrorBody::Detailed { code, message } => (code, message),
            ApiErrorBody::Message(message) => (None, message),
        };
        return Err(Error::Remote {
            status: code.or(Some(status)),
            message,
        });
    }

    if !(200..300).contains(&status) {
        return Err(Error::Remote {
            status: Some(status),
            message: format!("HTTP {status}"),
        });
    }

    serde_json::from_str(body).map_err(|e| Error::Remote {
        status: Some(status),
        message: format!("Malformed response: {e}"),
    })
}

fn convert_items(raw: Vec<RawPlaylistItem>) -> Vec<PlaylistItem> {
    raw.into_iter()
        .filter_map(|item| {
            let snippet = item.snippet?;
            let resource = snippet.resource_id.as_ref();
            if let Some(kind) = resource.and_then(|r| r.kind.as_deref())
                && kind != VIDEO_RESOURCE_KIND
            {
                debug!("Skipping playlist entry of kind {}", kind);
                return None;
            }
            let video_id = item
                .content_details
                .and_then(|c| c.video_id)
                .or_else(|| resource.and_then(|r| r.video_id.clone()))?;

            Some(PlaylistItem {
                video_id,
                title: snippet.title,
                position: snippet.position.unwrap_or_default(),
                channel_title: snippet.video_owner_channel_title.or(snippet.channel_title),
                channel_id: snippet.video_owner_channel_id.or(snippet.channel_id),
                published_at: snippet.published_at,
            })
        })
        .collect()
}

fn convert_videos(raw: Vec<RawVideo>) -> HashMap<String, VideoDetails> {
    raw.into_iter()
        .map(|video| {
            let raw_duration = video
                .content_details
                .and_then(|c| c.duration)
                .unwrap_or_default();
            let view_count = video
                .statistics
                .and_then(|s| s.view_count)
                .and_then(|v| v.parse::<u64>().ok());
            (
                video.id,
                VideoDetails {
                    raw_duration,
                    view_count,
                },
            )
        })
        .collect()
}

fn remote_from_reqwest(err: reqwest::Error) -> Error {
    Error::Remote {
        status: err.status().map(|s| s.as_u16()),
        message: err.without_url().to_string(),
    }
}

/// YouTube Data API client.
#[derive(Debug, Clone)]
pub struct YouTubeApiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    transport: TransportConfig,
}

impl YouTubeApiClient {
    /// Create a client.
    ///
    /// Direct transport needs a non-blank key; a proxy may hold its own.
    pub fn new(
        api_key: Option<String>,
        transport: TransportConfig,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        if api_key.is_none() && transport.requires_api_key() {
            return Err(Error::MissingCredential);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            transport,
        })
    }

    /// The transport in use.
    #[must_use]
    pub const fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    async fn call<T: DeserializeOwned>(&self, request: ApiRequest<'_>) -> Result<T> {
        let (url, query) = request.render(&self.transport, self.api_key.as_deref());
        debug!("GET {} ({})", url, request.endpoint());

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(remote_from_reqwest)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(remote_from_reqwest)?;

        decode_response(status, &body)
    }
}

#[async_trait]
impl PlaylistSource for YouTubeApiClient {
    async fn fetch_playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<String>,
    ) -> Result<PlaylistPage> {
        let response: PlaylistItemsResponse = self
            .call(ApiRequest::PlaylistItems {
                playlist_id,
                page_token: page_token.as_deref(),
            })
            .await?;
        Ok(PlaylistPage {
            items: convert_items(response.items),
            next_page_token: response.next_page_token,
        })
    }

    async fn fetch_video_details(
        &self,
        video_ids: &[String],
    ) -> Result<HashMap<String, VideoDetails>> {
        if video_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let response: VideosResponse = self.call(ApiRequest::Videos { video_ids }).await?;
        let details = convert_videos(response.items);
        if details.len() < video_ids.len() {
            warn!(
                "Details missing for {} of {} videos",
                video_ids.len() - details.len(),
                video_ids.len()
            );
        }
        Ok(details)
    }

    async fn fetch_playlist_title(&self, playlist_id: &str) -> Result<Option<String>> {
        let response: PlaylistsResponse =
            self.call(ApiRequest::Playlists { playlist_id }).await?;
        Ok(response
            .items
            .into_iter()
            .find_map(|p| p.snippet.and_then(|s| s.title)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn query_value<'a>(query: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        query
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_direct_playlist_items() {
            let request = ApiRequest::PlaylistItems {
                playlist_id: "PL123",
                page_token: Some("CDIQAA"),
            };
            let (url, query) = request.render(&TransportConfig::default(), Some("secret"));

            assert_eq!(url, "https://www.googleapis.com/youtube/v3/playlistItems");
            assert_eq!(query_value(&query, "part"), Some("snippet,contentDetails"));
            assert_eq!(query_value(&query, "maxResults"), Some("50"));
            assert_eq!(query_value(&query, "playlistId"), Some("PL123"));
            assert_eq!(query_value(&query, "pageToken"), Some("CDIQAA"));
            assert_eq!(query.last().map(|(k, _)| *k), Some("key"));
        }

        #[test]
        fn test_direct_first_page_has_no_token() {
            let request = ApiRequest::PlaylistItems {
                playlist_id: "PL123",
                page_token: None,
            };
            let (_, query) = request.render(&TransportConfig::default(), Some("secret"));
            assert!(query_value(&query, "pageToken").is_none());
        }

        #[test]
        fn test_direct_videos_joins_ids() {
            let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
            let request = ApiRequest::Videos { video_ids: &ids };
            let transport = TransportConfig::Direct {
                base_url: "http://localhost:8080/v3/".to_string(),
            };
            let (url, query) = request.render(&transport, Some("secret"));

            assert_eq!(url, "http://localhost:8080/v3/videos");
            assert_eq!(query_value(&query, "id"), Some("a,b,c"));
            assert_eq!(query_value(&query, "part"), Some("contentDetails,statistics"));
        }

        #[test]
        fn test_proxied_uses_endpoint_parameter() {
            let ids = vec!["a".to_string(), "b".to_string()];
            let transport = TransportConfig::Proxied {
                proxy_url: "https://example.org/api/youtube-proxy".to_string(),
            };
            let (url, query) = ApiRequest::Videos { video_ids: &ids }.render(&transport, None);

            assert_eq!(url, "https://example.org/api/youtube-proxy");
            assert_eq!(query_value(&query, "endpoint"), Some("videos"));
            assert_eq!(query_value(&query, "videoIds"), Some("a,b"));
            assert_eq!(query_value(&query, "apiKey"), Some("server"));
        }
    }

    mod decode_tests {
        use super::*;

        #[test]
        fn test_decode_playlist_items() {
            let body = r#"{
                "nextPageToken": "NEXT",
                "items": [
                    {
                        "snippet": {
                            "title": "First",
                            "position": 0,
                            "channelTitle": "Curator",
                            "videoOwnerChannelTitle": "Uploader",
                            "publishedAt": "2024-01-01T00:00:00Z",
                            "resourceId": {"kind": "youtube#video", "videoId": "v0"}
                        },
                        "contentDetails": {"videoId": "v0"}
                    },
                    {
                        "snippet": {
                            "title": "Deleted video",
                            "position": 1,
                            "resourceId": {"kind": "youtube#video", "videoId": "v1"}
                        }
                    },
                    {
                        "snippet": {
                            "title": "A channel",
                            "position": 2,
                            "resourceId": {"kind": "youtube#channel"}
                        }
                    }
                ]
            }"#;
            let response: PlaylistItemsResponse = decode_response(200, body).expect("decode");
            assert_eq!(response.next_page_token.as_deref(), Some("NEXT"));

            let items = convert_items(response.items);
            assert_eq!(items.len(), 2);
            assert_eq!(items[0].video_id, "v0");
            assert_eq!(items[0].channel_title.as_deref(), Some("Uploader"));
            assert_eq!(items[1].title, "Deleted video");
            assert!(items[1].channel_title.is_none());
        }

        #[test]
        fn test_decode_videos_parses_string_counts() {
            let body = r#"{"items": [
                {"id": "v0", "contentDetails": {"duration": "PT4M13S"}, "statistics": {"viewCount": "1234"}},
                {"id": "v1", "contentDetails": {"duration": "P0D"}}
            ]}"#;
            let response: VideosResponse = decode_response(200, body).expect("decode");
            let details = convert_videos(response.items);

            assert_eq!(details["v0"].raw_duration, "PT4M13S");
            assert_eq!(details["v0"].view_count, Some(1234));
            assert_eq!(details["v1"].view_count, None);
        }

        #[test]
        fn test_error_payload_becomes_remote_error() {
            let body = r#"{"error": {"code": 403, "message": "API key not valid. Please pass a valid API key."}}"#;
            let err = decode_response::<VideosResponse>(400, body).unwrap_err();

            assert_eq!(err.kind(), ErrorKind::Remote);
            assert!(matches!(err, Error::Remote { status: Some(403), .. }));
            assert!(err.to_string().contains("API key not valid"));
        }

        #[test]
        fn test_proxy_string_error_inside_ok_response() {
            let body = r#"{"error": "Missing playlistId"}"#;
            let err = decode_response::<VideosResponse>(200, body).unwrap_err();
            assert!(err.to_string().contains("Missing playlistId"));
        }

        #[test]
        fn test_non_success_status_without_payload() {
            let err = decode_response::<VideosResponse>(502, "<html>bad gateway</html>").unwrap_err();
            assert!(matches!(err, Error::Remote { status: Some(502), .. }));
            assert!(err.is_retryable());
        }

        #[test]
        fn test_unparseable_success_body_is_remote() {
            let err = decode_response::<VideosResponse>(200, "<html>Service Unavailable</html>")
                .unwrap_err();

            assert_eq!(err.kind(), ErrorKind::Remote);
            assert!(err.is_retryable());
            assert!(matches!(err, Error::Remote { status: Some(200), .. }));
            assert!(err.to_string().contains("Malformed response"));
        }

        #[test]
        fn test_truncated_body_is_remote() {
            let err = decode_response::<VideosResponse>(200, r#"{"items": [{"id": "v0""#)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Remote);
        }

        #[test]
        fn test_playlist_title() {
            let body = r#"{"items": [{"snippet": {"title": "Road Trip"}}]}"#;
            let response: PlaylistsResponse = decode_response(200, body).expect("decode");
            let title = response
                .items
                .into_iter()
                .find_map(|p| p.snippet.and_then(|s| s.title));
            assert_eq!(title.as_deref(), Some("Road Trip"));
        }
    }

    #[test]
    fn test_direct_client_requires_key() {
        let err = YouTubeApiClient::new(
            Some("   ".to_string()),
            TransportConfig::default(),
            Duration::from_secs(5),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingCredential);
    }

    #[test]
    fn test_proxied_client_without_key() {
        let transport = TransportConfig::Proxied {
            proxy_url: "https://example.org/api/youtube-proxy".to_string(),
        };
        let client = YouTubeApiClient::new(None, transport.clone(), Duration::from_secs(5))
            .expect("proxy holds its own key");
        assert_eq!(client.transport(), &transport);
    }
}
