/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - request ごとに生成され、request と一緒に破棄される (プロセス共有の状態は持たない)
 */

/// Authenticated principal of the current request.
///
/// - `username` is the token subject
/// - `authority` is the token's `role` claim, copied verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub authority: String,
}

impl Identity {
    pub fn new(username: impl Into<String>, authority: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            authority: authority.into(),
        }
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authority == authority
    }
}
