//! Persisters against a failing or misbehaving settings store

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::storage::SettingsStore;
use core_library::persistence::{
    ColumnsPersister, PreferencePersister, SelectionPersister, TrackOrderPersister,
    DOWNLOAD_LYRICS_ONLINE_KEY,
};
use core_library::{LibraryError, TrackOrder, TracksColumns};
use mockall::mock;
use mockall::predicate::eq;
use std::sync::Arc;

mock! {
    Settings {}

    #[async_trait]
    impl SettingsStore for Settings {
        async fn set_string(&self, key: &str, value: &str) -> Result<()>;
        async fn get_string(&self, key: &str) -> Result<Option<String>>;
        async fn set_bool(&self, key: &str, value: bool) -> Result<()>;
        async fn get_bool(&self, key: &str) -> Result<Option<bool>>;
        async fn set_i64(&self, key: &str, value: i64) -> Result<()>;
        async fn get_i64(&self, key: &str) -> Result<Option<i64>>;
        async fn delete(&self, key: &str) -> Result<()>;
        async fn has_key(&self, key: &str) -> Result<bool>;
        async fn list_keys(&self) -> Result<Vec<String>>;
        async fn clear_all(&self) -> Result<()>;
    }
}

#[tokio::test]
async fn test_track_order_falls_back_when_store_fails() {
    let mut settings = MockSettings::new();
    settings
        .expect_get_string()
        .with(eq("collection_track_order"))
        .returning(|_| Err(BridgeError::OperationFailed("disk gone".to_string())));

    let persister =
        TrackOrderPersister::new(Arc::new(settings), "collection", TrackOrder::Rating);
    assert_eq!(persister.get_selected_track_order().await, TrackOrder::Rating);
}

#[tokio::test]
async fn test_track_order_write_failure_is_reported() {
    let mut settings = MockSettings::new();
    settings
        .expect_set_string()
        .returning(|_, _| Err(BridgeError::OperationFailed("read-only".to_string())));

    let persister =
        TrackOrderPersister::new(Arc::new(settings), "collection", TrackOrder::Rating);
    let result = persister.set_selected_track_order(TrackOrder::Album).await;
    assert!(matches!(result, Err(LibraryError::Bridge(_))));
}

#[tokio::test]
async fn test_selection_writes_delimited_value() {
    let mut settings = MockSettings::new();
    settings
        .expect_set_string()
        .with(eq("selected_artists"), eq(";Massive Attack;;Björk;"))
        .times(1)
        .returning(|_, _| Ok(()));

    let persister = SelectionPersister::new(Arc::new(settings), "selected_artists");
    persister
        .set_selected(&["Massive Attack".to_string(), "Björk".to_string()])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_columns_default_when_missing() {
    let mut settings = MockSettings::new();
    settings.expect_get_string().returning(|_| Ok(None));

    let persister = ColumnsPersister::new(Arc::new(settings));
    assert_eq!(persister.get_columns().await.unwrap(), TracksColumns::default());
}

#[tokio::test]
async fn test_preference_read_error_propagates() {
    let mut settings = MockSettings::new();
    settings
        .expect_get_bool()
        .with(eq(DOWNLOAD_LYRICS_ONLINE_KEY))
        .returning(|_| Err(BridgeError::NotAvailable("settings".to_string())));

    let persister = PreferencePersister::new(Arc::new(settings));
    assert!(persister.download_lyrics_online().await.is_err());
}
