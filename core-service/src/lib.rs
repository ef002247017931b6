//! Core service façade.
//!
//! Turns a validated [`CoreConfig`] into the services the host application
//! talks to: lyrics, artist information, Last.fm scrobbling, update checks
//! and the settings-backed persisters. Services whose feature flag is off
//! are not created and their accessors return `None`; lyrics are always
//! available, without the online source when online lyrics are disabled.
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use core_service::CoreService;
//!
//! let config = CoreConfig::builder().data_dir(data_dir).build().await?;
//! let core = CoreService::new(config)?;
//!
//! let lyrics = core.lyrics().get_lyrics(&track).await;
//! ```

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::{HttpClient, SettingsStore};
use core_library::{
    ColumnsPersister, PreferencePersister, SelectionPersister, TrackOrder, TrackOrderPersister,
};
use core_metadata::providers::{FanartApi, GitHubReleases, LastfmApi};
use core_metadata::{
    ArtistInformationService, LyricsService, OnlineArtistImageGetter, ScrobblingService,
    UpdateService,
};
use core_runtime::config::{CoreConfig, MetadataApiConfig};
use tracing::info;

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    config: Arc<CoreConfig>,
    lyrics: Arc<LyricsService>,
    artist_information: Option<Arc<ArtistInformationService>>,
    scrobbling: Option<Arc<ScrobblingService>>,
    updates: Option<Arc<UpdateService>>,
    preferences: Arc<PreferencePersister>,
    columns: Arc<ColumnsPersister>,
}

impl CoreService {
    /// Builds every service enabled in `config`.
    ///
    /// # Errors
    ///
    /// Fails when the configuration does not validate, e.g. a feature is
    /// enabled without the API credentials it needs.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let features = config.features;
        let api = &config.metadata_api_config;

        let lyrics = LyricsService::new(
            config.file_system.clone(),
            features
                .enable_online_lyrics
                .then(|| config.http_client.clone()),
            config.settings_store.clone(),
        );

        let artist_information = if features.enable_artist_information {
            let lastfm = lastfm_api(&config.http_client, api, "artist information")?;
            let fanart = api
                .fanart_api_key
                .as_deref()
                .map(|key| FanartApi::new(config.http_client.clone(), key));

            Some(Arc::new(ArtistInformationService::new(
                Arc::new(lastfm),
                Arc::new(OnlineArtistImageGetter::new(fanart)),
                config.settings_store.clone(),
                config.language_code.clone(),
            )))
        } else {
            None
        };

        let scrobbling = if features.enable_scrobbling {
            let lastfm = lastfm_api(&config.http_client, api, "scrobbling")?;
            if !lastfm.can_sign() {
                return Err(capability_missing(
                    "Last.fm shared secret",
                    "signed scrobbling calls",
                ));
            }

            Some(Arc::new(ScrobblingService::new(
                Arc::new(lastfm),
                config.secure_store.clone(),
                config.clock.clone(),
            )))
        } else {
            None
        };

        let updates = if features.enable_update_check {
            let (Some(owner), Some(repo)) = (&api.github_owner, &api.github_repo) else {
                return Err(capability_missing("GitHub repository", "update checks"));
            };
            let releases = GitHubReleases::new(config.http_client.clone())
                .with_user_agent(api.user_agent.clone());

            Some(Arc::new(UpdateService::new(
                releases,
                owner.clone(),
                repo.clone(),
            )))
        } else {
            None
        };

        info!(
            online_lyrics = features.enable_online_lyrics,
            artist_information = artist_information.is_some(),
            scrobbling = scrobbling.is_some(),
            update_check = updates.is_some(),
            "Core services ready"
        );

        Ok(Self {
            preferences: Arc::new(PreferencePersister::new(config.settings_store.clone())),
            columns: Arc::new(ColumnsPersister::new(config.settings_store.clone())),
            lyrics: Arc::new(lyrics),
            artist_information,
            scrobbling,
            updates,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn lyrics(&self) -> Arc<LyricsService> {
        Arc::clone(&self.lyrics)
    }

    /// `None` when artist information is disabled
    pub fn artist_information(&self) -> Option<Arc<ArtistInformationService>> {
        self.artist_information.clone()
    }

    /// `None` when scrobbling is disabled
    pub fn scrobbling(&self) -> Option<Arc<ScrobblingService>> {
        self.scrobbling.clone()
    }

    /// `None` when the update check is disabled
    pub fn updates(&self) -> Option<Arc<UpdateService>> {
        self.updates.clone()
    }

    pub fn preferences(&self) -> Arc<PreferencePersister> {
        Arc::clone(&self.preferences)
    }

    pub fn columns(&self) -> Arc<ColumnsPersister> {
        Arc::clone(&self.columns)
    }

    /// Track order persister of one screen, e.g. `"albums"`
    pub fn track_order(&self, screen: &str, default_order: TrackOrder) -> TrackOrderPersister {
        TrackOrderPersister::new(self.settings(), screen, default_order)
    }

    /// Selection persister stored under `key`, e.g. `"selected_genres"`
    pub fn selection(&self, key: &str) -> SelectionPersister {
        SelectionPersister::new(self.settings(), key)
    }

    fn settings(&self) -> Arc<dyn SettingsStore> {
        self.config.settings_store.clone()
    }
}

fn lastfm_api(
    http_client: &Arc<dyn HttpClient>,
    api: &MetadataApiConfig,
    purpose: &str,
) -> Result<LastfmApi> {
    let key = api
        .lastfm_api_key
        .as_deref()
        .ok_or_else(|| capability_missing("Last.fm API key", purpose))?;

    let mut lastfm =
        LastfmApi::new(http_client.clone(), key).with_user_agent(api.user_agent.clone());
    if let Some(secret) = api.lastfm_api_secret.as_deref() {
        lastfm = lastfm.with_shared_secret(secret);
    }
    Ok(lastfm)
}

fn capability_missing(capability: &str, purpose: &str) -> CoreError {
    CoreError::CapabilityMissing {
        capability: capability.to_string(),
        message: format!("required for {}", purpose),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_desktop::{JsonSettingsStore, TokioFileSystem};
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::{HttpRequest, HttpResponse, SecureStore};
    use core_library::{Track, TrackModel};
    use core_metadata::LyricsSourceType;
    use core_runtime::config::FeatureFlags;
    use std::path::Path;

    struct OfflineHttpClient;

    #[async_trait]
    impl HttpClient for OfflineHttpClient {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
            Err(BridgeError::OperationFailed(format!("offline: {}", request.url)))
        }
    }

    struct EmptySecureStore;

    #[async_trait]
    impl SecureStore for EmptySecureStore {
        async fn set_secret(&self, _key: &str, _value: &[u8]) -> BridgeResult<()> {
            Ok(())
        }

        async fn get_secret(&self, _key: &str) -> BridgeResult<Option<Vec<u8>>> {
            Ok(None)
        }

        async fn delete_secret(&self, _key: &str) -> BridgeResult<()> {
            Ok(())
        }
    }

    async fn config(
        data_dir: &Path,
        features: FeatureFlags,
        api: MetadataApiConfig,
    ) -> core_runtime::Result<CoreConfig> {
        CoreConfig::builder()
            .data_dir(data_dir)
            .http_client(Arc::new(OfflineHttpClient))
            .file_system(Arc::new(TokioFileSystem::with_data_directory(
                data_dir.to_path_buf(),
            )))
            .settings_store(Arc::new(JsonSettingsStore::in_memory()))
            .secure_store(Arc::new(EmptySecureStore))
            .features(features)
            .metadata_api_config(api)
            .build()
            .await
    }

    #[tokio::test]
    async fn test_default_features_only_build_lyrics() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), FeatureFlags::default(), MetadataApiConfig::new())
            .await
            .unwrap();

        let core = CoreService::new(config).unwrap();

        assert!(core.lyrics().has_online_source());
        assert!(core.artist_information().is_none());
        assert!(core.scrobbling().is_none());
        assert!(core.updates().is_none());
    }

    #[tokio::test]
    async fn test_all_features_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let features = FeatureFlags {
            enable_online_lyrics: false,
            enable_artist_information: true,
            enable_scrobbling: true,
            enable_update_check: true,
        };
        let api = MetadataApiConfig::new()
            .with_lastfm_api_key("key")
            .with_lastfm_api_secret("secret")
            .with_fanart_api_key("fanart")
            .with_github_repository("owner", "player");

        let core = CoreService::new(config(dir.path(), features, api).await.unwrap()).unwrap();

        assert!(!core.lyrics().has_online_source());
        assert!(core.artist_information().is_some());
        assert!(core.scrobbling().is_some());
        assert!(core.updates().is_some());
    }

    #[tokio::test]
    async fn test_config_changed_after_build_is_revalidated() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), FeatureFlags::default(), MetadataApiConfig::new())
            .await
            .unwrap();
        config.features.enable_scrobbling = true;

        let result = CoreService::new(config);
        assert!(matches!(result, Err(CoreError::Runtime(_))));
    }

    #[tokio::test]
    async fn test_lyrics_from_sidecar_while_offline() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("roads.mp3");
        std::fs::write(&audio, b"not really audio").unwrap();
        std::fs::write(dir.path().join("roads.lrc"), "[00:01.00]Oh, can't anybody see").unwrap();

        let core = CoreService::new(
            config(dir.path(), FeatureFlags::default(), MetadataApiConfig::new())
                .await
                .unwrap(),
        )
        .unwrap();

        let track = TrackModel::new(Track::new(1, audio.to_string_lossy()));
        let lyrics = core.lyrics().get_lyrics(&track).await;

        assert_eq!(lyrics.source_type, LyricsSourceType::Lrc);
        assert_eq!(lyrics.text, "Oh, can't anybody see");
    }

    #[tokio::test]
    async fn test_persisters_share_the_settings_store() {
        let dir = tempfile::tempdir().unwrap();
        let core = CoreService::new(
            config(dir.path(), FeatureFlags::default(), MetadataApiConfig::new())
                .await
                .unwrap(),
        )
        .unwrap();

        core.preferences()
            .set_download_lyrics_online(false)
            .await
            .unwrap();
        assert!(!core.preferences().download_lyrics_online().await.unwrap());

        let albums = core.track_order("albums", TrackOrder::Album);
        albums
            .set_selected_track_order(TrackOrder::DateAdded)
            .await
            .unwrap();
        assert_eq!(
            core.track_order("albums", TrackOrder::Album)
                .get_selected_track_order()
                .await,
            TrackOrder::DateAdded
        );

        core.selection("selected_genres")
            .set_selected(&["Trip Hop"])
            .await
            .unwrap();
        assert_eq!(
            core.selection("selected_genres").get_selected().await.unwrap(),
            vec!["Trip Hop"]
        );
    }
}
