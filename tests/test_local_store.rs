use async_trait::async_trait;
use recipe_finder::storage::{Entries, StorageError};
use recipe_finder::{
    FavouritesRepository, FileBackend, MeasurementUnit, MemoryBackend, PersistentStore,
    PreferenceRepository, RecipeSummary, StorageBackend,
};
use std::sync::Arc;
use std::time::Duration;

fn summary(id: i64) -> RecipeSummary {
    RecipeSummary::new(id, format!("Recipe {id}"), format!("{id}.jpg"))
}

/// Backend that takes a while to open and slows down every flush
#[derive(Clone, Default)]
struct SlowBackend {
    inner: MemoryBackend,
}

#[async_trait]
impl StorageBackend for SlowBackend {
    fn name(&self) -> &str {
        "slow"
    }

    async fn open(&self) -> Result<Entries, StorageError> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.inner.open().await
    }

    async fn persist(&self, entries: &Entries) -> Result<(), StorageError> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.inner.persist(entries).await
    }
}

#[tokio::test]
async fn test_concurrent_adds_both_survive() {
    let backend = SlowBackend::default();
    let favourites = FavouritesRepository::new(PersistentStore::new(backend.clone()));

    let (a, b) = tokio::join!(favourites.add(summary(7)), favourites.add(summary(9)));
    a.unwrap();
    b.unwrap();

    let ids: Vec<i64> = favourites.list().await.iter().map(|f| f.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&7));
    assert!(ids.contains(&9));

    // And what reached the medium agrees
    let flushed = backend.inner.snapshot();
    assert_eq!(flushed["favourites"].as_array().map(|a| a.len()), Some(2));
}

#[tokio::test]
async fn test_many_concurrent_toggles_from_tasks() {
    let favourites = Arc::new(FavouritesRepository::new(PersistentStore::new(
        SlowBackend::default(),
    )));

    let mut tasks = Vec::new();
    for id in 1..=10 {
        let favourites = Arc::clone(&favourites);
        tasks.push(tokio::spawn(async move {
            favourites.add(summary(id)).await.unwrap();
            if id % 2 == 0 {
                favourites.remove(id).await.unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let mut ids: Vec<i64> = favourites.list().await.iter().map(|f| f.id).collect();
    ids.sort();
    assert_eq!(ids, vec![1, 3, 5, 7, 9]);
}

#[tokio::test]
async fn test_write_issued_during_init_is_not_lost() {
    let backend = SlowBackend::default();
    let store = PersistentStore::new(backend.clone());
    let preferences = PreferenceRepository::new(store.clone());
    let favourites = FavouritesRepository::new(store);

    // Both calls race the slow open; neither may be dropped
    let (set, add) = tokio::join!(
        preferences.set_measurement_unit(MeasurementUnit::Us),
        favourites.add(summary(3)),
    );
    set.unwrap();
    add.unwrap();

    assert_eq!(preferences.get_measurement_unit().await, MeasurementUnit::Us);
    assert!(favourites.contains(3).await);
    let flushed = backend.inner.snapshot();
    assert_eq!(flushed["measurementUnit"], "us");
}

#[tokio::test]
async fn test_file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    {
        let store = PersistentStore::new(FileBackend::new(&path));
        let favourites = FavouritesRepository::new(store.clone());
        let preferences = PreferenceRepository::new(store);

        let mut stew = summary(1);
        stew.image_format = Some("jpg".to_string());
        stew.ready_in_minutes = Some(90);
        favourites.add(stew).await.unwrap();
        favourites.add(summary(2)).await.unwrap();
        preferences
            .set_measurement_unit(MeasurementUnit::Us)
            .await
            .unwrap();
    }

    let store = PersistentStore::new(FileBackend::new(&path));
    let favourites = FavouritesRepository::new(store.clone());
    let preferences = PreferenceRepository::new(store);

    let list = favourites.list().await;
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].image_format.as_deref(), Some("jpg"));
    assert_eq!(list[0].ready_in_minutes, Some(90));
    assert_eq!(list[1], summary(2));
    assert_eq!(preferences.get_measurement_unit().await, MeasurementUnit::Us);
}

#[tokio::test]
async fn test_corrupt_file_degrades_to_memory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "not json at all").unwrap();

    let store = PersistentStore::new(FileBackend::new(&path));
    let favourites = FavouritesRepository::new(store.clone());
    let preferences = PreferenceRepository::new(store);

    assert!(favourites.list().await.is_empty());
    assert_eq!(preferences.get_measurement_unit().await, MeasurementUnit::Metric);

    assert!(favourites.add(summary(5)).await.is_err());
    assert!(favourites.contains(5).await);

    // The unreadable file is left untouched
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json at all");
}

#[tokio::test]
async fn test_add_twice_then_remove_round_trip() {
    let favourites = FavouritesRepository::new(PersistentStore::in_memory());
    favourites.add(summary(1)).await.unwrap();
    let before = favourites.list().await;

    favourites.add(summary(2)).await.unwrap();
    favourites.add(summary(2)).await.unwrap();
    assert_eq!(favourites.list().await.iter().filter(|f| f.id == 2).count(), 1);

    favourites.remove(2).await.unwrap();
    assert_eq!(favourites.list().await, before);
}
