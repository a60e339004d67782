//! Domain identifiers (strongly-typed IDs).
//!
//! Store が払い出す ID は不透明な文字列として扱います（UUID でも ULID でもよい）。
//! Phantom type パターンで TaskId / SubtaskId / UserId を型レベルで区別し、
//! 取り違えをコンパイル時に防ぎます。
//!
//! 保存前のサブタスクは ID を持ちません。代わりに [`LocalKey`] を相関トークンとして
//! 使い、[`SubtaskKey`] のタグで「保存済みかどうか」を表現します。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
pub trait IdMarker: Send + Sync + 'static {
    /// Debug 出力で使う名前（例: "TaskId"）
    fn kind() -> &'static str;
}

/// ジェネリック ID 型
///
/// `T` は PhantomData なので実行時のコストはなく、`String` と同じサイズです。
#[derive(Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct Id<T: IdMarker> {
    value: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    /// Store から受け取った文字列をそのまま ID にする
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    /// ULID から Id を作成（InMemory store 用）
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self::new(ulid.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

// derive だと `T: Clone` などの境界が付いてしまうので手で書く
impl<T: IdMarker> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T: IdMarker> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: IdMarker> Eq for Id<T> {}

impl<T: IdMarker> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: IdMarker> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: IdMarker> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T: IdMarker> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", T::kind(), self.value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl<T: IdMarker> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ========================================
// マーカー型の定義
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {}

impl IdMarker for Task {
    fn kind() -> &'static str {
        "TaskId"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subtask {}

impl IdMarker for Subtask {
    fn kind() -> &'static str {
        "SubtaskId"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum User {}

impl IdMarker for User {
    fn kind() -> &'static str {
        "UserId"
    }
}

/// Identifier of a task row (assigned by the store on insert).
pub type TaskId = Id<Task>;

/// Identifier of a persisted subtask row.
pub type SubtaskId = Id<Subtask>;

/// Identifier of the authenticated owner.
pub type UserId = Id<User>;

/// Client-side correlation token for a subtask that has not been saved yet.
///
/// Never sent to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalKey(Ulid);

impl LocalKey {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl fmt::Display for LocalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "local-{}", self.0)
    }
}

/// Either a store-assigned identifier or a pending local key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubtaskKey {
    Pending { local_key: LocalKey },
    Persisted { id: SubtaskId },
}

impl SubtaskKey {
    pub fn persisted_id(&self) -> Option<&SubtaskId> {
        match self {
            SubtaskKey::Persisted { id } => Some(id),
            SubtaskKey::Pending { .. } => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SubtaskKey::Pending { .. })
    }
}

impl From<SubtaskId> for SubtaskKey {
    fn from(id: SubtaskId) -> Self {
        SubtaskKey::Persisted { id }
    }
}

impl From<LocalKey> for SubtaskKey {
    fn from(local_key: LocalKey) -> Self {
        SubtaskKey::Pending { local_key }
    }
}
