/*
 * Responsibility
 * - user store (collaborator) の公開インターフェース
 */
pub mod error;
pub mod memory;
pub mod user_repo;

pub use memory::MemoryUserStore;
pub use user_repo::{NewUser, PgUserStore, User, UserRole, UserStore};
