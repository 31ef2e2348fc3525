//! Favorite cities
//!
//! The user's ordered list of cities, persisted as one postcard-encoded record
//! in a fjall keyspace. Every successful mutation bumps a revision on a watch
//! channel so views know when to reload; nothing else is shared.
//!
//! Store access blocks on disk I/O and runs on the blocking thread pool.

use std::path::Path;
use std::sync::Arc;

use fjall::{Database, Keyspace, PersistMode};
use tokio::sync::watch;
use tokio::task;
use tracing::{debug, info, instrument, warn};

use crate::city_lookup::CityService;
use crate::models::Location;
use crate::{Result, WeatherError};

const FAVORITES_KEY: &str = "favorite_cities";

/// Storage for the whole favorites list; calls may block
pub trait CityStore: Send + Sync + 'static {
    fn load(&self) -> Result<Vec<Location>>;
    fn store(&self, cities: &[Location]) -> Result<()>;
}

/// [`CityStore`] on a local fjall database
pub struct FjallCityStore {
    db: Database,
    items: Keyspace,
}

impl FjallCityStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = Database::builder(path)
            .open()
            .map_err(|e| WeatherError::storage(format!("cannot open {}", path.display()), e))?;
        let items = db
            .keyspace("favorites", fjall::KeyspaceCreateOptions::default)
            .map_err(|e| WeatherError::storage("cannot open favorites keyspace", e))?;
        debug!("Opened favorites store at {}", path.display());
        Ok(Self { db, items })
    }
}

impl CityStore for FjallCityStore {
    fn load(&self) -> Result<Vec<Location>> {
        let Some(bytes) = self
            .items
            .get(FAVORITES_KEY)
            .map_err(|e| WeatherError::storage("cannot read favorites", e))?
        else {
            return Ok(Vec::new());
        };

        postcard::from_bytes(&bytes)
            .map_err(|e| WeatherError::storage("stored favorites are corrupt", e))
    }

    fn store(&self, cities: &[Location]) -> Result<()> {
        let bytes = postcard::to_stdvec(cities)
            .map_err(|e| WeatherError::storage("cannot encode favorites", e))?;
        self.items
            .insert(FAVORITES_KEY, bytes)
            .map_err(|e| WeatherError::storage("cannot write favorites", e))?;
        self.db
            .persist(PersistMode::SyncAll)
            .map_err(|e| WeatherError::storage("cannot flush favorites", e))?;
        Ok(())
    }
}

/// The favorites list with its change notifications
pub struct FavoriteCities<S: CityStore> {
    store: Arc<S>,
    revision: watch::Sender<u64>,
}

impl<S: CityStore> FavoriteCities<S> {
    pub fn new(store: S) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            store: Arc::new(store),
            revision,
        }
    }

    /// Receiver whose value increments after every change to the list
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub async fn get_cities(&self) -> Result<Vec<Location>> {
        self.load().await
    }

    /// Append a city; a city with the same name is rejected
    #[instrument(skip(self, city), fields(city = %city.name))]
    pub async fn save_city(&self, city: Location) -> Result<()> {
        let mut cities = self.load().await?;
        if cities.iter().any(|c| c.is_same_city(&city)) {
            warn!("'{}' is already a favorite", city.name);
            return Err(WeatherError::DuplicateCity { name: city.name });
        }

        cities.push(city);
        self.commit(cities).await
    }

    /// Remove and return the city at `index`
    #[instrument(skip(self))]
    pub async fn remove_city(&self, index: usize) -> Result<Location> {
        let mut cities = self.load().await?;
        check_index(index, cities.len())?;

        let removed = cities.remove(index);
        self.commit(cities).await?;
        Ok(removed)
    }

    /// Move the city at `from` so that it ends up at index `to`
    #[instrument(skip(self))]
    pub async fn move_city(&self, from: usize, to: usize) -> Result<()> {
        let mut cities = self.load().await?;
        check_index(from, cities.len())?;
        check_index(to, cities.len())?;

        if from == to {
            return Ok(());
        }

        let city = cities.remove(from);
        cities.insert(to, city);
        self.commit(cities).await
    }

    /// Resolve a search result to a city with coordinates and save it
    #[instrument(skip(self, lookup, candidate), fields(city = %candidate.name))]
    pub async fn add_from_search(
        &self,
        lookup: &dyn CityService,
        candidate: &Location,
    ) -> Result<Location> {
        if self
            .load()
            .await?
            .iter()
            .any(|c| c.is_same_city(candidate))
        {
            return Err(WeatherError::DuplicateCity {
                name: candidate.name.clone(),
            });
        }

        let resolved = lookup
            .find_coordinate(&candidate.name)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::CityNotFound {
                query: candidate.name.clone(),
            })?;

        self.save_city(resolved.clone()).await?;
        Ok(resolved)
    }

    async fn load(&self) -> Result<Vec<Location>> {
        let store = Arc::clone(&self.store);
        task::spawn_blocking(move || store.load())
            .await
            .map_err(|e| WeatherError::storage("favorites read task failed", e))?
    }

    async fn commit(&self, cities: Vec<Location>) -> Result<()> {
        let count = cities.len();
        let store = Arc::clone(&self.store);
        task::spawn_blocking(move || store.store(&cities))
            .await
            .map_err(|e| WeatherError::storage("favorites write task failed", e))??;

        self.revision.send_modify(|revision| *revision += 1);
        info!("Favorites updated ({count} cities)");
        Ok(())
    }
}

fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(WeatherError::IndexOutOfRange { index, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore(Mutex<Vec<Location>>);

    impl CityStore for MemoryStore {
        fn load(&self) -> Result<Vec<Location>> {
            Ok(self.0.lock().unwrap().clone())
        }

        fn store(&self, cities: &[Location]) -> Result<()> {
            *self.0.lock().unwrap() = cities.to_vec();
            Ok(())
        }
    }

    struct FixedLookup(Vec<Location>);

    #[async_trait]
    impl CityService for FixedLookup {
        async fn find_city(&self, _query: &str) -> Result<Vec<Location>> {
            Ok(self.0.clone())
        }

        async fn find_coordinate(&self, _query: &str) -> Result<Vec<Location>> {
            Ok(self.0.clone())
        }
    }

    /// Fails loudly if called on a runtime worker instead of the blocking pool
    #[derive(Default)]
    struct BlockingOnlyStore(MemoryStore);

    impl CityStore for BlockingOnlyStore {
        fn load(&self) -> Result<Vec<Location>> {
            tokio::runtime::Handle::current().block_on(async {});
            self.0.load()
        }

        fn store(&self, cities: &[Location]) -> Result<()> {
            tokio::runtime::Handle::current().block_on(async {});
            self.0.store(cities)
        }
    }

    async fn names(favorites: &FavoriteCities<MemoryStore>) -> Vec<String> {
        favorites
            .get_cities()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect()
    }

    async fn with_cities(list: &[&str]) -> FavoriteCities<MemoryStore> {
        let favorites = FavoriteCities::new(MemoryStore::default());
        for name in list {
            favorites
                .save_city(Location::new(*name, "Turkey"))
                .await
                .unwrap();
        }
        favorites
    }

    #[tokio::test]
    async fn test_save_keeps_insertion_order() {
        let favorites = with_cities(&["Izmir", "Ankara", "Bursa"]).await;
        assert_eq!(names(&favorites).await, vec!["Izmir", "Ankara", "Bursa"]);
    }

    #[tokio::test]
    async fn test_duplicate_names_are_rejected() {
        let favorites = with_cities(&["Izmir"]).await;
        let err = favorites
            .save_city(Location::with_position("Izmir", "Turkey", 38.4, 27.1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateCity);
        assert_eq!(names(&favorites).await, vec!["Izmir"]);
    }

    #[tokio::test]
    async fn test_remove_city() {
        let favorites = with_cities(&["Izmir", "Ankara", "Bursa"]).await;
        let removed = favorites.remove_city(1).await.unwrap();
        assert_eq!(removed.name, "Ankara");
        assert_eq!(names(&favorites).await, vec!["Izmir", "Bursa"]);

        let err = favorites.remove_city(2).await.unwrap_err();
        assert!(matches!(err, WeatherError::IndexOutOfRange { index: 2, len: 2 }));
    }

    #[tokio::test]
    async fn test_move_city() {
        let favorites = with_cities(&["A", "B", "C", "D"]).await;

        favorites.move_city(0, 2).await.unwrap();
        assert_eq!(names(&favorites).await, vec!["B", "C", "A", "D"]);

        favorites.move_city(3, 0).await.unwrap();
        assert_eq!(names(&favorites).await, vec!["D", "B", "C", "A"]);

        assert!(favorites.move_city(0, 4).await.is_err());
    }

    #[tokio::test]
    async fn test_mutations_bump_revision() {
        let favorites = FavoriteCities::new(MemoryStore::default());
        let rx = favorites.subscribe();
        assert_eq!(*rx.borrow(), 0);

        favorites.save_city(Location::new("Izmir", "Turkey")).await.unwrap();
        favorites.save_city(Location::new("Ankara", "Turkey")).await.unwrap();
        favorites.move_city(0, 1).await.unwrap();
        assert_eq!(*rx.borrow(), 3);

        // failed mutations do not notify
        let _ = favorites.save_city(Location::new("Izmir", "Turkey")).await;
        let _ = favorites.remove_city(9).await;
        assert_eq!(*rx.borrow(), 3);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_store_runs_on_blocking_pool() {
        let favorites = FavoriteCities::new(BlockingOnlyStore::default());

        favorites.save_city(Location::new("Izmir", "Turkey")).await.unwrap();
        favorites.move_city(0, 0).await.unwrap();
        assert_eq!(favorites.get_cities().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_from_search_resolves_coordinates() {
        let favorites = FavoriteCities::new(MemoryStore::default());
        let lookup = FixedLookup(vec![Location::with_position("Izmir", "Turkey", 38.42, 27.14)]);

        let added = favorites
            .add_from_search(&lookup, &Location::new("Izmir", "Turkey"))
            .await
            .unwrap();

        assert!(added.position.is_some());
        assert_eq!(favorites.get_cities().await.unwrap(), vec![added]);
    }

    #[tokio::test]
    async fn test_add_from_search_without_results() {
        let favorites = FavoriteCities::new(MemoryStore::default());
        let err = favorites
            .add_from_search(&FixedLookup(Vec::new()), &Location::new("Atlantis", "-"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CityNotFound);
        assert!(favorites.get_cities().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_from_search_rejects_duplicates_before_lookup() {
        let favorites = with_cities(&["Izmir"]).await;
        let err = favorites
            .add_from_search(&FixedLookup(Vec::new()), &Location::new("Izmir", "Turkey"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateCity);
    }
}
