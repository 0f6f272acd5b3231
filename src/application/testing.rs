//! In-memory storage and unit of work used by service and facade tests.
//!
//! A transaction works on a private copy of the state that replaces the shared
//! state only on commit, so rollbacks leave no trace.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use bytes::Bytes;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::accounts::{AccountError, CredentialHasher};
use crate::application::repos::{
    CoffeePageQuery, RepoError, TransactionPageQuery, UserPageQuery,
};
use crate::application::storage::{CoffeeStorage, TransactionStorage, UserStorage};
use crate::application::uow::UnitOfWork;
use crate::cache::{CacheError, CacheStore};
use crate::domain::entities::{
    CoffeeRecord, NewCoffee, NewTransaction, NewUser, PurchaseItemRecord, TransactionRecord,
    UserRecord,
};
use crate::domain::types::{SortDirection, UserRole};

#[derive(Debug, Clone)]
struct StoredCoffee {
    record: CoffeeRecord,
    deleted: bool,
}

#[derive(Debug, Clone, Default)]
struct State {
    coffees: BTreeMap<i64, StoredCoffee>,
    transactions: BTreeMap<i64, TransactionRecord>,
    users: BTreeMap<Uuid, UserRecord>,
    next_coffee_id: i64,
    next_transaction_id: i64,
    next_item_id: i64,
    clock: i64,
}

impl State {
    fn tick(&mut self) -> OffsetDateTime {
        self.clock += 1;
        OffsetDateTime::UNIX_EPOCH + time::Duration::seconds(self.clock)
    }

    fn live_coffee(&self, id: i64) -> Option<&CoffeeRecord> {
        self.coffees
            .get(&id)
            .filter(|stored| !stored.deleted)
            .map(|stored| &stored.record)
    }

    fn name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.coffees.values().any(|stored| {
            !stored.deleted && stored.record.name == name && Some(stored.record.id) != except
        })
    }

    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && Some(user.id) != except)
    }
}

fn violation(constraint: &str) -> RepoError {
    RepoError::ConstraintViolation {
        constraint: constraint.to_string(),
    }
}

pub struct MemoryTx {
    state: State,
}

#[derive(Default)]
pub struct InMemoryDatabase {
    state: Mutex<State>,
    begins: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
    storage_calls: AtomicUsize,
    coffee_list_calls: AtomicUsize,
    fail_transaction_inserts: AtomicBool,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn committed(&self) -> std::sync::MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn touch(&self) {
        self.storage_calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn begins(&self) -> usize {
        self.begins.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }

    pub fn storage_calls(&self) -> usize {
        self.storage_calls.load(Ordering::SeqCst)
    }

    pub fn coffee_list_calls(&self) -> usize {
        self.coffee_list_calls.load(Ordering::SeqCst)
    }

    pub fn fail_transaction_inserts(&self, fail: bool) {
        self.fail_transaction_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn transaction_count(&self) -> usize {
        self.committed().transactions.len()
    }

    pub fn purchase_item_count(&self) -> usize {
        self.committed()
            .transactions
            .values()
            .map(|transaction| transaction.items.len())
            .sum()
    }

    pub fn committed_transaction(&self, id: i64) -> Option<TransactionRecord> {
        self.committed().transactions.get(&id).cloned()
    }

    pub fn committed_coffee(&self, id: i64) -> Option<CoffeeRecord> {
        self.committed().live_coffee(id).cloned()
    }

    pub fn seed_coffee(&self, name: &str, cents: i64) -> CoffeeRecord {
        let mut state = self.committed();
        state.next_coffee_id += 1;
        let now = state.tick();
        let record = CoffeeRecord {
            id: state.next_coffee_id,
            name: name.to_string(),
            price: Decimal::new(cents, 2),
            description: format!("{name} from the seed catalog"),
            in_stock: true,
            created_at: now,
            updated_at: now,
        };
        state.coffees.insert(
            record.id,
            StoredCoffee {
                record: record.clone(),
                deleted: false,
            },
        );
        record
    }

    pub fn seed_user(&self, email: &str, role: UserRole) -> UserRecord {
        let mut state = self.committed();
        let now = state.tick();
        let record = UserRecord {
            id: Uuid::new_v4(),
            first_name: "Test".to_string(),
            last_name: "Customer".to_string(),
            email: email.to_string(),
            phone_number: None,
            password_hash: "hashed".to_string(),
            role,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(record.id, record.clone());
        record
    }
}

#[async_trait]
impl UnitOfWork for InMemoryDatabase {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, RepoError> {
        self.begins.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryTx {
            state: self.committed().clone(),
        })
    }

    async fn commit(&self, tx: MemoryTx) -> Result<(), RepoError> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        *self.committed() = tx.state;
        Ok(())
    }

    async fn rollback(&self, _tx: MemoryTx) -> Result<(), RepoError> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl CoffeeStorage<MemoryTx> for InMemoryDatabase {
    async fn insert_coffee(
        &self,
        tx: &mut MemoryTx,
        coffee: &NewCoffee,
    ) -> Result<CoffeeRecord, RepoError> {
        self.touch();
        let state = &mut tx.state;
        if state.name_taken(&coffee.name, None) {
            return Err(violation("coffees_name_active_key"));
        }
        if coffee.price.is_sign_negative() {
            return Err(violation("coffees_price_check"));
        }
        state.next_coffee_id += 1;
        let now = state.tick();
        let record = CoffeeRecord {
            id: state.next_coffee_id,
            name: coffee.name.clone(),
            price: coffee.price,
            description: coffee.description.clone(),
            in_stock: coffee.in_stock,
            created_at: now,
            updated_at: now,
        };
        state.coffees.insert(
            record.id,
            StoredCoffee {
                record: record.clone(),
                deleted: false,
            },
        );
        Ok(record)
    }

    async fn coffees_by_ids(
        &self,
        tx: &mut MemoryTx,
        ids: &[i64],
    ) -> Result<HashMap<i64, CoffeeRecord>, RepoError> {
        self.touch();
        Ok(ids
            .iter()
            .filter_map(|id| tx.state.live_coffee(*id).cloned())
            .map(|coffee| (coffee.id, coffee))
            .collect())
    }

    async fn list_coffees(
        &self,
        tx: &mut MemoryTx,
        query: &CoffeePageQuery,
    ) -> Result<Vec<CoffeeRecord>, RepoError> {
        self.touch();
        self.coffee_list_calls.fetch_add(1, Ordering::SeqCst);
        let mut coffees: Vec<CoffeeRecord> = tx
            .state
            .coffees
            .values()
            .filter(|stored| !stored.deleted)
            .filter(|stored| query.in_stock.is_none_or(|flag| stored.record.in_stock == flag))
            .map(|stored| stored.record.clone())
            .collect();
        coffees.sort_by_key(|coffee| (coffee.updated_at, coffee.id));
        Ok(query.page.slice(&coffees))
    }

    async fn update_coffee(
        &self,
        tx: &mut MemoryTx,
        coffee: &CoffeeRecord,
    ) -> Result<CoffeeRecord, RepoError> {
        self.touch();
        let state = &mut tx.state;
        if state.live_coffee(coffee.id).is_none() {
            return Err(RepoError::NotFound);
        }
        if state.name_taken(&coffee.name, Some(coffee.id)) {
            return Err(violation("coffees_name_active_key"));
        }
        let now = state.tick();
        let stored = state.coffees.get_mut(&coffee.id).ok_or(RepoError::NotFound)?;
        stored.record = CoffeeRecord {
            created_at: stored.record.created_at,
            updated_at: now,
            ..coffee.clone()
        };
        Ok(stored.record.clone())
    }

    async fn soft_delete_coffee(&self, tx: &mut MemoryTx, id: i64) -> Result<(), RepoError> {
        self.touch();
        match tx.state.coffees.get_mut(&id) {
            Some(stored) if !stored.deleted => {
                stored.deleted = true;
                Ok(())
            }
            _ => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl TransactionStorage<MemoryTx> for InMemoryDatabase {
    async fn insert_transaction(
        &self,
        tx: &mut MemoryTx,
        transaction: &NewTransaction,
    ) -> Result<TransactionRecord, RepoError> {
        self.touch();
        if self.fail_transaction_inserts.load(Ordering::SeqCst) {
            return Err(RepoError::from_persistence("injected insert failure"));
        }
        let state = &mut tx.state;
        if !state.users.contains_key(&transaction.user_id) {
            return Err(violation("transactions_user_id_fkey"));
        }
        if transaction
            .items
            .iter()
            .any(|item| !state.coffees.contains_key(&item.coffee_id))
        {
            return Err(violation("purchase_items_coffee_id_fkey"));
        }

        state.next_transaction_id += 1;
        let id = state.next_transaction_id;
        let now = state.tick();
        let mut items = Vec::with_capacity(transaction.items.len());
        for item in &transaction.items {
            state.next_item_id += 1;
            items.push(PurchaseItemRecord {
                id: state.next_item_id,
                transaction_id: id,
                coffee_id: item.coffee_id,
                price: item.price,
                type_option: item.type_option.clone(),
            });
        }
        let record = TransactionRecord {
            id,
            user_id: transaction.user_id,
            total: transaction.total,
            amount_paid: transaction.amount_paid,
            items,
            created_at: now,
            updated_at: now,
        };
        state.transactions.insert(id, record.clone());
        Ok(record)
    }

    async fn transactions_by_ids(
        &self,
        tx: &mut MemoryTx,
        ids: &[i64],
    ) -> Result<HashMap<i64, TransactionRecord>, RepoError> {
        self.touch();
        Ok(ids
            .iter()
            .filter_map(|id| tx.state.transactions.get(id).cloned())
            .map(|transaction| (transaction.id, transaction))
            .collect())
    }

    async fn list_transactions(
        &self,
        tx: &mut MemoryTx,
        query: &TransactionPageQuery,
    ) -> Result<Vec<TransactionRecord>, RepoError> {
        self.touch();
        let mut transactions: Vec<TransactionRecord> = tx
            .state
            .transactions
            .values()
            .filter(|transaction| query.user_id.is_none_or(|user| transaction.user_id == user))
            .cloned()
            .collect();
        let key = query.sort_key.unwrap_or_default();
        transactions.sort_by(|left, right| {
            use crate::domain::types::TransactionSortKey as Key;
            let ordering = match key {
                Key::CreatedAt => left.created_at.cmp(&right.created_at),
                Key::UpdatedAt => left.updated_at.cmp(&right.updated_at),
                Key::Total => left.total.cmp(&right.total),
                Key::AmountPaid => left.amount_paid.cmp(&right.amount_paid),
            }
            .then(left.id.cmp(&right.id));
            match query.sort_direction.unwrap_or_default() {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        Ok(query.page.slice(&transactions))
    }

    async fn update_transaction(
        &self,
        tx: &mut MemoryTx,
        transaction: &TransactionRecord,
    ) -> Result<TransactionRecord, RepoError> {
        self.touch();
        let state = &mut tx.state;
        let now = state.tick();
        let stored = state
            .transactions
            .get_mut(&transaction.id)
            .ok_or(RepoError::NotFound)?;
        stored.amount_paid = transaction.amount_paid;
        stored.updated_at = now;
        Ok(stored.clone())
    }

    async fn delete_transaction(&self, tx: &mut MemoryTx, id: i64) -> Result<(), RepoError> {
        self.touch();
        tx.state
            .transactions
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserStorage<MemoryTx> for InMemoryDatabase {
    async fn insert_user(
        &self,
        tx: &mut MemoryTx,
        user: &NewUser,
    ) -> Result<UserRecord, RepoError> {
        self.touch();
        let state = &mut tx.state;
        if state.email_taken(&user.email, None) {
            return Err(violation("users_email_key"));
        }
        let now = state.tick();
        let record = UserRecord {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn user_by_email(&self, tx: &mut MemoryTx, email: &str) -> Result<UserRecord, RepoError> {
        self.touch();
        tx.state
            .users
            .values()
            .find(|user| user.email == email)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn users_by_ids(
        &self,
        tx: &mut MemoryTx,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, UserRecord>, RepoError> {
        self.touch();
        Ok(ids
            .iter()
            .filter_map(|id| tx.state.users.get(id).cloned())
            .map(|user| (user.id, user))
            .collect())
    }

    async fn list_users(
        &self,
        tx: &mut MemoryTx,
        query: &UserPageQuery,
    ) -> Result<Vec<UserRecord>, RepoError> {
        self.touch();
        let mut users: Vec<UserRecord> = tx
            .state
            .users
            .values()
            .filter(|user| query.role.is_none_or(|role| user.role == role))
            .cloned()
            .collect();
        users.sort_by_key(|user| (user.created_at, user.id));
        Ok(query.page.slice(&users))
    }

    async fn update_user(
        &self,
        tx: &mut MemoryTx,
        user: &UserRecord,
    ) -> Result<UserRecord, RepoError> {
        self.touch();
        let state = &mut tx.state;
        if !state.users.contains_key(&user.id) {
            return Err(RepoError::NotFound);
        }
        if state.email_taken(&user.email, Some(user.id)) {
            return Err(violation("users_email_key"));
        }
        let now = state.tick();
        let stored = state.users.get_mut(&user.id).ok_or(RepoError::NotFound)?;
        *stored = UserRecord {
            created_at: stored.created_at,
            updated_at: now,
            ..user.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_user(&self, tx: &mut MemoryTx, id: Uuid) -> Result<(), RepoError> {
        self.touch();
        let state = &mut tx.state;
        if state
            .transactions
            .values()
            .any(|transaction| transaction.user_id == id)
        {
            return Err(violation("transactions_user_id_fkey"));
        }
        state.users.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

/// Cache whose backend is permanently unreachable.
pub struct UnreachableCache;

#[async_trait]
impl CacheStore for UnreachableCache {
    async fn get(&self, _namespace: &str, _key: &str) -> Result<Option<Bytes>, CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn put(
        &self,
        _namespace: &str,
        _key: &str,
        _value: Bytes,
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }

    async fn invalidate(&self, _namespace: &str) -> Result<(), CacheError> {
        Err(CacheError::unavailable("connection refused"))
    }
}

/// Cache that answers every read with bytes that are not a valid page.
pub struct GarbageCache;

#[async_trait]
impl CacheStore for GarbageCache {
    async fn get(&self, _namespace: &str, _key: &str) -> Result<Option<Bytes>, CacheError> {
        Ok(Some(Bytes::from_static(b"\x00not-json")))
    }

    async fn put(
        &self,
        _namespace: &str,
        _key: &str,
        _value: Bytes,
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        Ok(())
    }

    async fn invalidate(&self, _namespace: &str) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Stand-in hasher that stores passwords reversed behind a marker prefix.
pub struct ReversingHasher;

impl CredentialHasher for ReversingHasher {
    fn hash(&self, password: &str) -> Result<String, AccountError> {
        Ok(format!("rev${}", password.chars().rev().collect::<String>()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AccountError> {
        let stored = hash
            .strip_prefix("rev$")
            .ok_or_else(|| AccountError::Hashing("unknown hash format".to_string()))?;
        Ok(stored.chars().rev().eq(password.chars()))
    }
}
