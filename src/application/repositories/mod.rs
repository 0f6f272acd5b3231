//! Repository facades composed from storage and the catalog cache.

mod coffees;
mod transactions;
mod users;

use std::{sync::Arc, time::Duration};

pub use coffees::CachedCoffeeRepository;
pub use transactions::StoredTransactionsRepository;
pub use users::StoredUserRepository;

use crate::application::repos::{CoffeeRepository, TransactionsRepository, UserRepository};
use crate::application::storage::{CoffeeStorage, TransactionStorage, UserStorage};
use crate::cache::CacheStore;

/// The repositories a service needs, sharing one transaction handle type.
pub struct RepositorySet<Tx: Send> {
    pub coffees: Arc<dyn CoffeeRepository<Tx>>,
    pub transactions: Arc<dyn TransactionsRepository<Tx>>,
    pub users: Arc<dyn UserRepository<Tx>>,
}

impl<Tx: Send> Clone for RepositorySet<Tx> {
    fn clone(&self) -> Self {
        Self {
            coffees: self.coffees.clone(),
            transactions: self.transactions.clone(),
            users: self.users.clone(),
        }
    }
}

impl<Tx: Send + 'static> RepositorySet<Tx> {
    /// Wire the facades over one storage backend and the catalog cache.
    pub fn new<S>(storage: Arc<S>, cache: Arc<dyn CacheStore>, cache_ttl: Duration) -> Self
    where
        S: CoffeeStorage<Tx> + TransactionStorage<Tx> + UserStorage<Tx> + 'static,
    {
        Self {
            coffees: Arc::new(CachedCoffeeRepository::new(
                storage.clone(),
                cache,
                cache_ttl,
            )),
            transactions: Arc::new(StoredTransactionsRepository::new(storage.clone())),
            users: Arc::new(StoredUserRepository::new(storage)),
        }
    }
}
