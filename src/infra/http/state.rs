use std::sync::Arc;

use crate::application::{
    accounts::{AccountService, CredentialHasher},
    admin::{
        coffees::AdminCoffeeService, purchases::AdminPurchaseService, users::AdminUserService,
    },
    menu::MenuService,
    orders::OrderService,
    repositories::RepositorySet,
    uow::UnitOfWork,
};

/// Services shared by every request handler.
pub struct HttpState<U: UnitOfWork> {
    pub uow: Arc<U>,
    pub menu: Arc<MenuService<U>>,
    pub orders: Arc<OrderService<U>>,
    pub admin_coffees: Arc<AdminCoffeeService<U>>,
    pub admin_purchases: Arc<AdminPurchaseService<U>>,
    pub admin_users: Arc<AdminUserService<U>>,
    pub accounts: Arc<AccountService<U>>,
    pub page_size: u32,
}

impl<U: UnitOfWork> Clone for HttpState<U> {
    fn clone(&self) -> Self {
        Self {
            uow: self.uow.clone(),
            menu: self.menu.clone(),
            orders: self.orders.clone(),
            admin_coffees: self.admin_coffees.clone(),
            admin_purchases: self.admin_purchases.clone(),
            admin_users: self.admin_users.clone(),
            accounts: self.accounts.clone(),
            page_size: self.page_size,
        }
    }
}

impl<U: UnitOfWork> HttpState<U> {
    pub fn new(
        uow: Arc<U>,
        repositories: &RepositorySet<U::Tx>,
        hasher: Arc<dyn CredentialHasher>,
        page_size: u32,
    ) -> Self {
        Self {
            menu: Arc::new(MenuService::new(uow.clone(), repositories, page_size)),
            orders: Arc::new(OrderService::new(uow.clone(), repositories, page_size)),
            admin_coffees: Arc::new(AdminCoffeeService::new(uow.clone(), repositories)),
            admin_purchases: Arc::new(AdminPurchaseService::new(uow.clone(), repositories)),
            admin_users: Arc::new(AdminUserService::new(uow.clone(), repositories, page_size)),
            accounts: Arc::new(AccountService::new(uow.clone(), repositories, hasher)),
            uow,
            page_size,
        }
    }
}
