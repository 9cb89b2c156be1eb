/*
 * Responsibility
 * - 認証スキーム (primary / one-time-token) の種類と判定ロジック
 * - 判定は非同期ステージとして表現する (async pipeline に合成できるように)
 *
 * Notes
 * - 現状はリテラル prefix 一致のみ。署名検証などは行わない
 */
use std::borrow::Cow;
use std::fmt;

use async_trait::async_trait;

pub const PRIMARY_PREFIX: &str = "abc";
pub const OTT_PREFIX: &str = "ott";

/// Which credential form authenticated the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeKind {
    /// Scheme A, always attempted first.
    Primary,
    /// Scheme B, one-time token fallback.
    Ott,
}

impl SchemeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeKind::Primary => "primary",
            SchemeKind::Ott => "ott",
        }
    }
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single step of the fallback chain.
///
/// `recognizes` returning `false` means "not mine, try the next scheme",
/// never "reject".
#[async_trait]
pub trait CredentialScheme: Send + Sync + fmt::Debug {
    fn kind(&self) -> SchemeKind;

    async fn recognizes(&self, credential: &str) -> bool;
}

/// Classifies a credential by literal prefix.
#[derive(Debug, Clone)]
pub struct PrefixScheme {
    kind: SchemeKind,
    prefix: Cow<'static, str>,
}

impl PrefixScheme {
    pub fn new(kind: SchemeKind, prefix: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            prefix: prefix.into(),
        }
    }

    pub fn primary() -> Self {
        Self::new(SchemeKind::Primary, PRIMARY_PREFIX)
    }

    pub fn ott() -> Self {
        Self::new(SchemeKind::Ott, OTT_PREFIX)
    }
}

#[async_trait]
impl CredentialScheme for PrefixScheme {
    fn kind(&self) -> SchemeKind {
        self.kind
    }

    async fn recognizes(&self, credential: &str) -> bool {
        credential.starts_with(self.prefix.as_ref())
    }
}
