/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - session middleware が request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - token の読み取りは middleware/services 側の責務
 * - extensions のキーはこの型そのもの (外から同じキーで上書きできない)
 */
use axum::http::Extensions;

/// Identity attached to a request that passed the session middleware.
///
/// - `user_id` is the raw `sub` claim of the session JWT (unverified)
/// - set once per request, never mutated afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    user_id: String,
}

impl AuthCtx {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Look up the identity stored by the session middleware, if any.
    pub fn from_extensions(extensions: &Extensions) -> Option<&AuthCtx> {
        extensions.get::<AuthCtx>()
    }

    pub fn is_present(extensions: &Extensions) -> bool {
        Self::from_extensions(extensions).is_some()
    }

    /// Store the identity. Returns `false` (and keeps the old value) if one is already set.
    pub(crate) fn attach(self, extensions: &mut Extensions) -> bool {
        if Self::is_present(extensions) {
            return false;
        }
        extensions.insert(self);
        true
    }
}
