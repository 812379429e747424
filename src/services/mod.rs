/*
 * Responsibility
 * - ドメインサービス (token 発行/検証、ユーザー管理、パスワードハッシュ)
 */
pub mod auth;
pub mod password;
pub mod users;
