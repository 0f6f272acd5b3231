pub mod accounts;
pub mod admin;
pub mod error;
pub mod menu;
pub mod orders;
pub mod pagination;
pub mod repos;
pub mod repositories;
pub mod storage;
pub mod uow;

#[cfg(test)]
pub(crate) mod testing;
