/*
 * Responsibility
 * - signup / login / profile の request/response DTO
 * - validation (形式チェック) 用の validate() を持たせる
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::{User, UserRole};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub nickname: String,
    #[serde(default, alias = "isAdmin")]
    pub is_admin: bool,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.username.len() > 64 {
            return Err("username must be <= 64 chars");
        }
        if self.password.is_empty() {
            return Err("password is required");
        }
        if self.nickname.trim().is_empty() {
            return Err("nickname is required");
        }
        Ok(())
    }

    pub fn role(&self) -> UserRole {
        if self.is_admin {
            UserRole::Admin
        } else {
            UserRole::User
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.password.is_empty() {
            return Err("password is required");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub nickname: String,
    pub role: UserRole,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            nickname: u.nickname,
            role: u.role,
        }
    }
}
