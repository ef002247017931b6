//! # Core Configuration Module
//!
//! Provides configuration management for the player core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds all necessary dependencies and settings for the core
//! services. It enforces fail-fast validation so that a misconfigured host
//! learns about missing bridges or API keys at startup rather than on the
//! first lyrics lookup.
//!
//! ## Bridges (with platform defaults)
//!
//! - `HttpClient` - HTTP operations (desktop default: reqwest)
//! - `FileSystemAccess` - Sidecar LRC/SRT files (desktop default: tokio fs)
//! - `SettingsStore` - UI state and preferences (desktop default: JSON file)
//! - `SecureStore` - Last.fm session key (desktop default: OS keyring)
//! - `Clock` - Scrobble timestamps (default: system clock)
//!
//! When the `desktop-shims` feature is enabled, the desktop implementations
//! are injected automatically for any bridge that was not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, MetadataApiConfig};
//!
//! let config = CoreConfig::builder()
//!     .data_dir("/home/sam/.local/share/player-core")
//!     .metadata_api_config(
//!         MetadataApiConfig::new()
//!             .with_lastfm_api_key("key")
//!             .with_lastfm_api_secret("secret"),
//!     )
//!     .enable_artist_information(true)
//!     .language_code("de")
//!     .build()
//!     .await?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{
    Clock, FileSystemAccess, HttpClient, SecureStore, SettingsStore, SystemClock,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Language used when no localized biography exists
pub const DEFAULT_LANGUAGE_CODE: &str = "EN";

/// Default settings file name inside the data directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

const DEFAULT_USER_AGENT: &str = concat!("player-core/", env!("CARGO_PKG_VERSION"));

/// Core configuration for the player core.
///
/// This struct holds all dependencies and settings required to initialize
/// the core services. Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Directory for application data
    pub data_dir: PathBuf,

    /// JSON file backing the default settings store
    pub settings_path: PathBuf,

    /// HTTP client for lyrics sites and metadata APIs
    pub http_client: Arc<dyn HttpClient>,

    /// File system access for sidecar lyric files
    pub file_system: Arc<dyn FileSystemAccess>,

    /// User preferences storage
    pub settings_store: Arc<dyn SettingsStore>,

    /// Secure credential storage
    pub secure_store: Arc<dyn SecureStore>,

    /// Time source
    pub clock: Arc<dyn Clock>,

    /// Feature flags
    pub features: FeatureFlags,

    /// External metadata API configuration (Last.fm, Fanart.tv, GitHub)
    pub metadata_api_config: MetadataApiConfig,

    /// Preferred biography language (ISO 639-1, upper case)
    pub language_code: String,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("data_dir", &self.data_dir)
            .field("settings_path", &self.settings_path)
            .field("http_client", &"HttpClient { ... }")
            .field("file_system", &"FileSystemAccess { ... }")
            .field("settings_store", &"SettingsStore { ... }")
            .field("secure_store", &"SecureStore { ... }")
            .field("features", &self.features)
            .field("metadata_api_config", &self.metadata_api_config)
            .field("language_code", &self.language_code)
            .finish()
    }
}

/// Feature flags control optional functionality.
///
/// Online lyrics are on by default; the user can still switch downloads off
/// at runtime through the `download_lyrics_online` preference. The other
/// features need API credentials and are opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Allow the lyrics pipeline to query lyrics sites
    pub enable_online_lyrics: bool,

    /// Fetch biographies, images and similar artists (requires Last.fm key)
    pub enable_artist_information: bool,

    /// Submit plays to Last.fm (requires Last.fm key and secret)
    pub enable_scrobbling: bool,

    /// Check GitHub releases for a newer version (requires repository)
    pub enable_update_check: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_online_lyrics: true,
            enable_artist_information: false,
            enable_scrobbling: false,
            enable_update_check: false,
        }
    }
}

/// Configuration for external metadata API services.
///
/// # Security Note
///
/// API keys should never be hardcoded in the binary. They should be:
/// - Loaded from environment variables
/// - Injected via the host's build-time configuration
///
/// The `Debug` output masks the Last.fm secret.
///
/// # Example
///
/// ```
/// use core_runtime::config::MetadataApiConfig;
///
/// let config = MetadataApiConfig::new()
///     .with_lastfm_api_key("your_lastfm_api_key")
///     .with_fanart_api_key("your_fanart_key")
///     .with_github_repository("owner", "player");
/// assert!(config.has_lastfm());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct MetadataApiConfig {
    /// Last.fm API key for artist.getInfo and scrobbling
    ///
    /// Obtain an API key from: https://www.last.fm/api/account/create
    pub lastfm_api_key: Option<String>,

    /// Last.fm shared secret used to sign authenticated calls
    pub lastfm_api_secret: Option<String>,

    /// Fanart.tv API key for artist thumbnails
    ///
    /// Optional: without it artist images come from Last.fm only.
    pub fanart_api_key: Option<String>,

    /// GitHub repository owner used for update checks
    pub github_owner: Option<String>,

    /// GitHub repository name used for update checks
    pub github_repo: Option<String>,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for MetadataApiConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MetadataApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataApiConfig")
            .field("lastfm_api_key", &self.lastfm_api_key.as_ref().map(|_| "***"))
            .field(
                "lastfm_api_secret",
                &self.lastfm_api_secret.as_ref().map(|_| "***"),
            )
            .field("fanart_api_key", &self.fanart_api_key.as_ref().map(|_| "***"))
            .field("github_owner", &self.github_owner)
            .field("github_repo", &self.github_repo)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl MetadataApiConfig {
    /// Creates a new MetadataApiConfig with no API keys configured
    pub fn new() -> Self {
        Self {
            lastfm_api_key: None,
            lastfm_api_secret: None,
            fanart_api_key: None,
            github_owner: None,
            github_repo: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Sets the Last.fm API key
    pub fn with_lastfm_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.lastfm_api_key = Some(api_key.into());
        self
    }

    /// Sets the Last.fm shared secret
    pub fn with_lastfm_api_secret(mut self, secret: impl Into<String>) -> Self {
        self.lastfm_api_secret = Some(secret.into());
        self
    }

    /// Sets the Fanart.tv API key
    pub fn with_fanart_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.fanart_api_key = Some(api_key.into());
        self
    }

    /// Sets the GitHub repository checked for new releases
    pub fn with_github_repository(
        mut self,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        self.github_owner = Some(owner.into());
        self.github_repo = Some(repo.into());
        self
    }

    /// Sets the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.user_agent.trim().is_empty() {
            return Err(Error::Config("User agent cannot be empty".to_string()));
        }

        for (name, value) in [
            ("Last.fm API key", &self.lastfm_api_key),
            ("Last.fm API secret", &self.lastfm_api_secret),
            ("Fanart.tv API key", &self.fanart_api_key),
            ("GitHub owner", &self.github_owner),
            ("GitHub repository", &self.github_repo),
        ] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(Error::Config(format!("{} cannot be empty", name)));
            }
        }

        if self.lastfm_api_secret.is_some() && self.lastfm_api_key.is_none() {
            return Err(Error::Config(
                "Last.fm API secret provided without an API key".to_string(),
            ));
        }

        Ok(())
    }

    /// Checks if Last.fm is configured
    pub fn has_lastfm(&self) -> bool {
        self.lastfm_api_key.is_some()
    }

    /// Checks if signed Last.fm calls are possible
    pub fn has_lastfm_signing(&self) -> bool {
        self.lastfm_api_key.is_some() && self.lastfm_api_secret.is_some()
    }

    /// Checks if Fanart.tv is configured
    pub fn has_fanart(&self) -> bool {
        self.fanart_api_key.is_some()
    }

    /// Checks if a GitHub repository is configured
    pub fn has_github_repository(&self) -> bool {
        self.github_owner.is_some() && self.github_repo.is_some()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Paths are not empty
    /// - The language code is a two or three letter ISO 639 code
    /// - Feature flags have the API credentials they need
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(Error::Config("Data directory cannot be empty".to_string()));
        }

        if self.settings_path.as_os_str().is_empty() {
            return Err(Error::Config("Settings path cannot be empty".to_string()));
        }

        validate_language_code(&self.language_code)?;
        self.metadata_api_config.validate()?;

        if self.features.enable_artist_information && !self.metadata_api_config.has_lastfm() {
            return Err(Error::Config(
                "Artist information enabled but no Last.fm API key provided. \
                 Disable the feature or set MetadataApiConfig::lastfm_api_key."
                    .to_string(),
            ));
        }

        if self.features.enable_scrobbling && !self.metadata_api_config.has_lastfm_signing() {
            return Err(Error::Config(
                "Scrobbling enabled but the Last.fm API key or secret is missing. \
                 Signed Last.fm calls need both."
                    .to_string(),
            ));
        }

        if self.features.enable_update_check && !self.metadata_api_config.has_github_repository()
        {
            return Err(Error::Config(
                "Update check enabled but no GitHub repository configured. \
                 Use MetadataApiConfig::with_github_repository()."
                    .to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_language_code(code: &str) -> Result<()> {
    let valid = (2..=3).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphabetic());
    if valid {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid language code '{}': expected a two or three letter ISO 639 code",
            code
        )))
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn capability_missing(capability: &str, purpose: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: format!(
            "{} implementation is required for {}. \
             Desktop: enable the 'desktop-shims' feature to use the default implementation. \
             Other hosts: inject a platform implementation through the builder.",
            capability, purpose
        ),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(user_agent: &str) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;
    use std::time::Duration;

    let client = ReqwestHttpClient::with_options(Duration::from_secs(30), user_agent)?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_user_agent: &str) -> Result<Arc<dyn HttpClient>> {
    Err(capability_missing("HttpClient", "lyrics and metadata lookups"))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_file_system(data_dir: &Path) -> Result<Arc<dyn FileSystemAccess>> {
    use bridge_desktop::TokioFileSystem;

    Ok(Arc::new(TokioFileSystem::with_data_directory(
        data_dir.to_path_buf(),
    )))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_file_system(_data_dir: &Path) -> Result<Arc<dyn FileSystemAccess>> {
    Err(capability_missing("FileSystemAccess", "sidecar lyric files"))
}

#[cfg(feature = "desktop-shims")]
async fn provide_default_settings_store(settings_path: &Path) -> Result<Arc<dyn SettingsStore>> {
    use bridge_desktop::JsonSettingsStore;

    let store = JsonSettingsStore::open(settings_path.to_path_buf())
        .await
        .map_err(|e| {
            Error::Internal(format!("Failed to initialize default SettingsStore: {}", e))
        })?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "desktop-shims"))]
async fn provide_default_settings_store(_settings_path: &Path) -> Result<Arc<dyn SettingsStore>> {
    Err(capability_missing("SettingsStore", "user preferences"))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_secure_store() -> Result<Arc<dyn SecureStore>> {
    use bridge_desktop::KeyringSecureStore;

    Ok(Arc::new(KeyringSecureStore::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_secure_store() -> Result<Arc<dyn SecureStore>> {
    Err(capability_missing("SecureStore", "credential persistence"))
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Use this builder to incrementally set configuration options and then
/// call [`build()`](CoreConfigBuilder::build) to create the final config.
#[derive(Default)]
pub struct CoreConfigBuilder {
    data_dir: Option<PathBuf>,
    settings_path: Option<PathBuf>,
    http_client: Option<Arc<dyn HttpClient>>,
    file_system: Option<Arc<dyn FileSystemAccess>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    secure_store: Option<Arc<dyn SecureStore>>,
    clock: Option<Arc<dyn Clock>>,
    features: FeatureFlags,
    metadata_api_config: Option<MetadataApiConfig>,
    language_code: Option<String>,
}

impl CoreConfigBuilder {
    /// Sets the application data directory (required).
    pub fn data_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    /// Sets the settings file path.
    ///
    /// Default: `<data_dir>/settings.json`
    pub fn settings_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    /// Sets the HTTP client implementation.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the file system access implementation.
    pub fn file_system(mut self, fs: Arc<dyn FileSystemAccess>) -> Self {
        self.file_system = Some(fs);
        self
    }

    /// Sets the settings store implementation.
    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Sets the secure store implementation.
    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    /// Sets the time source. Default: [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Enables or disables online lyrics lookups.
    ///
    /// Default: true
    pub fn enable_online_lyrics(mut self, enabled: bool) -> Self {
        self.features.enable_online_lyrics = enabled;
        self
    }

    /// Enables or disables artist information.
    ///
    /// Requires a Last.fm API key.
    ///
    /// Default: false
    pub fn enable_artist_information(mut self, enabled: bool) -> Self {
        self.features.enable_artist_information = enabled;
        self
    }

    /// Enables or disables Last.fm scrobbling.
    ///
    /// Requires a Last.fm API key and shared secret.
    ///
    /// Default: false
    pub fn enable_scrobbling(mut self, enabled: bool) -> Self {
        self.features.enable_scrobbling = enabled;
        self
    }

    /// Enables or disables the update check.
    ///
    /// Requires a GitHub repository.
    ///
    /// Default: false
    pub fn enable_update_check(mut self, enabled: bool) -> Self {
        self.features.enable_update_check = enabled;
        self
    }

    /// Sets all feature flags at once.
    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    /// Sets the metadata API configuration.
    pub fn metadata_api_config(mut self, config: MetadataApiConfig) -> Self {
        self.metadata_api_config = Some(config);
        self
    }

    /// Sets the preferred biography language.
    ///
    /// Default: `EN`. The code is stored upper case.
    pub fn language_code(mut self, code: impl Into<String>) -> Self {
        self.language_code = Some(code.into());
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// Missing bridges are filled with desktop defaults when the
    /// `desktop-shims` feature is enabled. Opening the default settings
    /// store reads the settings file, hence the `async`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The data directory is missing
    /// - A bridge is missing and no default exists
    /// - Configuration values are invalid
    /// - Feature flags are inconsistent with the API configuration
    pub async fn build(self) -> Result<CoreConfig> {
        let data_dir = self.data_dir.ok_or_else(|| {
            Error::Config("Data directory is required. Use .data_dir() to set it.".to_string())
        })?;

        let settings_path = self
            .settings_path
            .unwrap_or_else(|| data_dir.join(SETTINGS_FILE_NAME));

        let metadata_api_config = self.metadata_api_config.unwrap_or_default();
        let language_code = self
            .language_code
            .map(|code| code.trim().to_uppercase())
            .unwrap_or_else(|| DEFAULT_LANGUAGE_CODE.to_string());

        // Validate cheap values before touching the disk for default bridges
        validate_language_code(&language_code)?;
        metadata_api_config.validate()?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(&metadata_api_config.user_agent)?,
        };

        let file_system = match self.file_system {
            Some(fs) => fs,
            None => provide_default_file_system(&data_dir)?,
        };

        let settings_store = match self.settings_store {
            Some(store) => store,
            None => provide_default_settings_store(&settings_path).await?,
        };

        let secure_store = match self.secure_store {
            Some(store) => store,
            None => provide_default_secure_store()?,
        };

        let config = CoreConfig {
            data_dir,
            settings_path,
            http_client,
            file_system,
            settings_store,
            secure_store,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            features: self.features,
            metadata_api_config,
            language_code,
        };

        config.validate()?;

        Ok(config)
    }
}
