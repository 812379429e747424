/*
 * Responsibility
 * - middleware の公開インターフェース
 * - http: request id / trace / limit / timeout
 * - auth: cookie token gate + authorization policy
 */
pub mod auth;
pub mod http;
