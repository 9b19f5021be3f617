use log::{debug, warn};
use serde_json::Value;
use tokio::sync::{watch, Mutex};

use crate::error::Result;
use crate::model::MeasurementUnit;
use crate::storage::PersistentStore;

pub const MEASUREMENT_UNIT_KEY: &str = "measurementUnit";

/// Owner of the measurement unit preference
///
/// The active unit is also published on a watch channel so that open
/// detail views reformat as soon as the preference changes. Reads and
/// writes run one at a time, so a read never publishes a value older than
/// a write that started before it finished.
pub struct PreferenceRepository {
    store: PersistentStore,
    active: watch::Sender<MeasurementUnit>,
    access: Mutex<()>,
}

impl PreferenceRepository {
    pub fn new(store: PersistentStore) -> Self {
        let (active, _) = watch::channel(MeasurementUnit::default());
        PreferenceRepository {
            store,
            active,
            access: Mutex::new(()),
        }
    }

    /// Stored unit, `Metric` when absent, malformed or unreadable
    pub async fn get_measurement_unit(&self) -> MeasurementUnit {
        let _access = self.access.lock().await;
        let unit = match self.store.init().await {
            Ok(store) => match store.get(MEASUREMENT_UNIT_KEY).await {
                Some(Value::String(raw)) => raw.parse().unwrap_or_else(|_| {
                    warn!("Ignoring unknown stored measurement unit {:?}", raw);
                    MeasurementUnit::default()
                }),
                Some(other) => {
                    warn!("Ignoring malformed stored measurement unit {}", other);
                    MeasurementUnit::default()
                }
                None => MeasurementUnit::default(),
            },
            // Whatever was chosen earlier in this session still applies
            Err(_) => *self.active.borrow(),
        };

        self.publish(unit);
        unit
    }

    /// Persist `unit` and make it the active unit
    ///
    /// When the store is unavailable the unit still becomes active for the
    /// rest of the session and `StorageUnavailable` is returned.
    pub async fn set_measurement_unit(&self, unit: MeasurementUnit) -> Result<()> {
        let _access = self.access.lock().await;
        self.publish(unit);
        let store = self.store.init().await?;
        store
            .set(MEASUREMENT_UNIT_KEY, Value::String(unit.as_str().to_string()))
            .await?;
        debug!("Measurement unit set to {}", unit);
        Ok(())
    }

    /// Validate raw input (e.g. from a settings form) before storing it
    pub async fn set_measurement_unit_str(&self, raw: &str) -> Result<MeasurementUnit> {
        let unit: MeasurementUnit = raw.parse()?;
        self.set_measurement_unit(unit).await?;
        Ok(unit)
    }

    /// Follow the active unit
    pub fn subscribe(&self) -> watch::Receiver<MeasurementUnit> {
        self.active.subscribe()
    }

    fn publish(&self, unit: MeasurementUnit) {
        self.active.send_if_modified(|current| {
            let changed = *current != unit;
            *current = unit;
            changed
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecipeError;
    use crate::storage::{Entries, MemoryBackend, StorageBackend, StorageError};
    use async_trait::async_trait;
    use serde_json::json;

    /// Memory backend whose `open` suspends once before answering
    #[derive(Clone, Default)]
    struct YieldingBackend {
        inner: MemoryBackend,
    }

    #[async_trait]
    impl StorageBackend for YieldingBackend {
        fn name(&self) -> &str {
            "yielding"
        }

        async fn open(&self) -> std::result::Result<Entries, StorageError> {
            tokio::task::yield_now().await;
            self.inner.open().await
        }

        async fn persist(&self, entries: &Entries) -> std::result::Result<(), StorageError> {
            self.inner.persist(entries).await
        }
    }

    #[tokio::test]
    async fn test_fresh_store_defaults_to_metric() {
        let prefs = PreferenceRepository::new(PersistentStore::in_memory());
        assert_eq!(prefs.get_measurement_unit().await, MeasurementUnit::Metric);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let prefs = PreferenceRepository::new(PersistentStore::in_memory());
        prefs.set_measurement_unit(MeasurementUnit::Us).await.unwrap();
        assert_eq!(prefs.get_measurement_unit().await, MeasurementUnit::Us);
    }

    #[tokio::test]
    async fn test_persisted_as_lowercase_string() {
        let backend = MemoryBackend::default();
        let prefs = PreferenceRepository::new(PersistentStore::new(backend.clone()));
        prefs.set_measurement_unit(MeasurementUnit::Us).await.unwrap();
        assert_eq!(backend.snapshot().get(MEASUREMENT_UNIT_KEY), Some(&json!("us")));
    }

    #[tokio::test]
    async fn test_malformed_value_defaults_to_metric() {
        for stored in [json!("imperial"), json!(7), json!({"unit": "us"})] {
            let mut entries = Entries::new();
            entries.insert(MEASUREMENT_UNIT_KEY.to_string(), stored);
            let store = PersistentStore::new(MemoryBackend::with_entries(entries));
            let prefs = PreferenceRepository::new(store);
            assert_eq!(prefs.get_measurement_unit().await, MeasurementUnit::Metric);
        }
    }

    #[tokio::test]
    async fn test_rejects_unknown_unit() {
        let backend = MemoryBackend::default();
        let prefs = PreferenceRepository::new(PersistentStore::new(backend.clone()));

        let err = prefs.set_measurement_unit_str("imperial").await.unwrap_err();
        assert!(matches!(err, RecipeError::InvalidPreference(_)));
        assert!(backend.snapshot().is_empty());
        assert_eq!(
            prefs.set_measurement_unit_str("US").await.unwrap(),
            MeasurementUnit::Us
        );
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let prefs = PreferenceRepository::new(PersistentStore::in_memory());
        let mut rx = prefs.subscribe();
        assert_eq!(*rx.borrow_and_update(), MeasurementUnit::Metric);

        prefs.set_measurement_unit(MeasurementUnit::Us).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), MeasurementUnit::Us);
    }

    #[tokio::test]
    async fn test_read_racing_first_write_keeps_written_unit_active() {
        let backend = YieldingBackend::default();
        let prefs = PreferenceRepository::new(PersistentStore::new(backend.clone()));
        let rx = prefs.subscribe();

        let (read, written) = tokio::join!(
            prefs.get_measurement_unit(),
            prefs.set_measurement_unit(MeasurementUnit::Us),
        );
        written.unwrap();

        assert_eq!(read, MeasurementUnit::Metric);
        assert_eq!(*rx.borrow(), MeasurementUnit::Us);
        assert_eq!(backend.inner.snapshot().get(MEASUREMENT_UNIT_KEY), Some(&json!("us")));
        assert_eq!(prefs.get_measurement_unit().await, MeasurementUnit::Us);
    }

    #[tokio::test]
    async fn test_write_racing_first_read_is_visible_to_the_read() {
        let prefs = PreferenceRepository::new(PersistentStore::new(YieldingBackend::default()));
        let rx = prefs.subscribe();

        let (written, read) = tokio::join!(
            prefs.set_measurement_unit(MeasurementUnit::Us),
            prefs.get_measurement_unit(),
        );
        written.unwrap();

        assert_eq!(read, MeasurementUnit::Us);
        assert_eq!(*rx.borrow(), MeasurementUnit::Us);
    }
}
