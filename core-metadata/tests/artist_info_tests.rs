//! Artist information assembled from Last.fm and Fanart.tv

mod common;

use async_trait::async_trait;
use bridge_desktop::JsonSettingsStore;
use bridge_traits::error::BridgeError;
use bridge_traits::storage::SettingsStore;
use common::RoutingHttpClient;
use core_library::persistence::USE_LOCALIZED_BIOGRAPHY_KEY;
use core_metadata::artist_info::ArtistImageQuery;
use core_metadata::providers::{FanartApi, LastfmApi, LastfmArtist};
use core_metadata::{
    ArtistImageGetter, ArtistInfoSource, ArtistInformation, ArtistInformationService,
    MetadataError, OnlineArtistImageGetter,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn artist_body(name: &str, bio: &str, similar: &[&str]) -> String {
    json!({
        "artist": {
            "name": name,
            "url": format!("https://www.last.fm/music/{}", name.replace(' ', "+")),
            "mbid": "",
            "image": [
                {"#text": format!("https://img.example/{}-small.png", name.len()), "size": "small"},
                {"#text": format!("https://img.example/{}-large.png", name.len()), "size": "extralarge"}
            ],
            "bio": {"summary": bio, "content": bio},
            "similar": {
                "artist": similar
                    .iter()
                    .map(|s| json!({"name": s, "url": "", "image": []}))
                    .collect::<Vec<_>>()
            }
        }
    })
    .to_string()
}

fn service_with(
    http: Arc<RoutingHttpClient>,
    image_getter: Arc<dyn ArtistImageGetter>,
    settings: Arc<dyn SettingsStore>,
) -> ArtistInformationService {
    let lastfm = LastfmApi::new(http, "test-key");
    ArtistInformationService::new(Arc::new(lastfm), image_getter, settings, "FR")
}

fn online_images() -> Arc<dyn ArtistImageGetter> {
    Arc::new(OnlineArtistImageGetter::new(None))
}

fn settings() -> Arc<dyn SettingsStore> {
    Arc::new(JsonSettingsStore::in_memory())
}

/// Image getter that always fails
struct BrokenImages;

#[async_trait]
impl ArtistImageGetter for BrokenImages {
    async fn get_artist_image(
        &self,
        _query: ArtistImageQuery<'_>,
    ) -> core_metadata::Result<String> {
        Err(MetadataError::HttpError {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

#[tokio::test]
async fn test_blank_localized_biography_falls_back_to_english() {
    let http = Arc::new(
        RoutingHttpClient::new()
            .route("artist=Portishead&lang=fr", 200, artist_body("Portishead", "", &[]))
            .route(
                "artist=Portishead&lang=en",
                200,
                artist_body("Portishead", "Trip hop band from Bristol.", &[]),
            ),
    );

    let service = service_with(http.clone(), online_images(), settings());
    let information = service.get_artist_information("Portishead").await;

    assert_eq!(information.name, "Portishead");
    assert_eq!(information.biography, "Trip hop band from Bristol.");
    assert_eq!(information.image_url, "https://img.example/10-large.png");
    assert_eq!(http.count_matching("lang=en"), 1);
}

#[tokio::test]
async fn test_disabled_localization_asks_for_english_once() {
    let settings = settings();
    settings
        .set_bool(USE_LOCALIZED_BIOGRAPHY_KEY, false)
        .await
        .unwrap();

    let http = Arc::new(RoutingHttpClient::new().route(
        "artist=Portishead&lang=en",
        200,
        artist_body("Portishead", "English bio", &[]),
    ));

    let service = service_with(http.clone(), online_images(), settings);
    let information = service.get_artist_information("Portishead").await;

    assert_eq!(information.biography, "English bio");
    assert_eq!(http.count_matching("lang=fr"), 0);
    assert_eq!(http.count_matching("lang=en"), 1);
}

#[tokio::test]
async fn test_failed_image_lookup_keeps_the_rest() {
    let http = Arc::new(RoutingHttpClient::new().route(
        "artist=Portishead",
        200,
        artist_body("Portishead", "Bio", &[]),
    ));

    let service = service_with(http, Arc::new(BrokenImages), settings());
    let information = service.get_artist_information("Portishead").await;

    assert_eq!(information.name, "Portishead");
    assert_eq!(information.biography, "Bio");
    assert_eq!(information.image_url, "");
}

#[tokio::test]
async fn test_similar_artists_that_fail_are_left_out() {
    let http = Arc::new(
        RoutingHttpClient::new()
            .route(
                "artist=Portishead",
                200,
                artist_body("Portishead", "Bio", &["Massive Attack", "Tricky", "Nobody"]),
            )
            .route(
                "artist=Massive%20Attack",
                200,
                artist_body("Massive Attack", "Other bio", &[]),
            )
            .fail("artist=Tricky")
            .route(
                "artist=Nobody",
                200,
                r#"{"error":6,"message":"The artist you supplied could not be found"}"#,
            ),
    );

    let service = service_with(http.clone(), online_images(), settings());
    let information = service.get_artist_information("Portishead").await;

    let names: Vec<&str> = information
        .similar_artists
        .iter()
        .map(|artist| artist.name.as_str())
        .collect();
    assert_eq!(names, vec!["Massive Attack"]);

    let massive_attack = &information.similar_artists[0];
    assert!(massive_attack.biography.is_empty());
    assert!(massive_attack.similar_artists.is_empty());
    assert_eq!(massive_attack.image_url, "https://img.example/14-large.png");

    // Similar artists are looked up without autocorrection
    assert_eq!(http.count_matching("artist=Massive%20Attack&lang=fr&autocorrect=0"), 1);
}

#[tokio::test]
async fn test_repeated_request_is_served_from_cache() {
    let http = Arc::new(RoutingHttpClient::new().route(
        "artist=Portishead",
        200,
        artist_body("Portishead", "Bio", &[]),
    ));

    let service = service_with(http.clone(), online_images(), settings());
    let first = service.get_artist_information("Portishead").await;
    let second = service.get_artist_information("Portishead").await;

    assert_eq!(first, second);
    assert_eq!(http.requested_urls().len(), 1);

    service.clear_cache().await;
    service.get_artist_information("Portishead").await;
    assert_eq!(http.requested_urls().len(), 2);
}

#[tokio::test]
async fn test_failed_primary_lookup_gives_empty_information() {
    let http = Arc::new(RoutingHttpClient::new().fail("audioscrobbler"));

    let service = service_with(http.clone(), online_images(), settings());
    let information = service.get_artist_information("Portishead").await;

    assert_eq!(information, ArtistInformation::empty());
    assert!(information.is_empty());

    service.get_artist_information("Portishead").await;
    assert_eq!(http.count_matching("audioscrobbler"), 2);
}

/// Artist source whose first call fails with a transport error
#[derive(Default)]
struct FlakySource {
    calls: AtomicUsize,
}

#[async_trait]
impl ArtistInfoSource for FlakySource {
    async fn artist_info(
        &self,
        artist_name: &str,
        _autocorrect: bool,
        _language_code: &str,
    ) -> core_metadata::Result<Option<LastfmArtist>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(MetadataError::Bridge(BridgeError::OperationFailed(
                "connection reset".to_string(),
            )));
        }

        let artist = serde_json::from_value(json!({
            "name": artist_name,
            "url": "https://www.last.fm/music/Portishead",
            "bio": {"summary": "Bristol", "content": "Bristol"}
        }))
        .unwrap();
        Ok(Some(artist))
    }
}

#[tokio::test]
async fn test_failed_lookup_is_retried_on_next_request() {
    let source = Arc::new(FlakySource::default());
    let service =
        ArtistInformationService::new(source.clone(), Arc::new(BrokenImages), settings(), "EN");

    let first = service.get_artist_information("Portishead").await;
    assert!(first.is_empty());

    let second = service.get_artist_information("Portishead").await;
    assert_eq!(second.name, "Portishead");
    assert_eq!(second.biography, "Bristol");
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);

    let third = service.get_artist_information("Portishead").await;
    assert_eq!(third, second);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_blank_name_is_not_looked_up() {
    let http = Arc::new(RoutingHttpClient::new());

    let service = service_with(http.clone(), online_images(), settings());
    let information = service.get_artist_information("   ").await;

    assert!(information.is_empty());
    assert!(http.requested_urls().is_empty());
}

#[tokio::test]
async fn test_fanart_thumbnail_preferred_when_mbid_known() {
    let body = json!({
        "artist": {
            "name": "Portishead",
            "url": "https://www.last.fm/music/Portishead",
            "mbid": "8f6bd1e4-fbe1-4f50-aa9b-94c450ec0f11",
            "image": [{"#text": "https://img.example/lastfm.png", "size": "large"}],
            "bio": {"summary": "Bio", "content": "Bio"}
        }
    })
    .to_string();

    let http = Arc::new(
        RoutingHttpClient::new()
            .route("artist=Portishead", 200, body)
            .route(
                "webservice.fanart.tv/v3/music/8f6bd1e4-fbe1-4f50-aa9b-94c450ec0f11",
                200,
                r#"{"artistthumb":[{"url":"https://fanart.example/portishead.jpg","likes":"3"}]}"#,
            ),
    );

    let fanart = FanartApi::new(http.clone(), "fanart-key");
    let images: Arc<dyn ArtistImageGetter> = Arc::new(OnlineArtistImageGetter::new(Some(fanart)));
    let service = service_with(http, images, settings());

    let information = service.get_artist_information("Portishead").await;
    assert_eq!(information.image_url, "https://fanart.example/portishead.jpg");
}
