//! IdGenerator port - ID 生成の抽象化
//!
//! - 編集セッション中の未保存サブタスク用 LocalKey
//! - InMemory store が払い出す TaskId / SubtaskId
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース

use crate::domain::ids::{LocalKey, SubtaskId, TaskId};
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は衝突しない ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数タスクから使える）
pub trait IdGenerator: Send + Sync {
    /// 未保存サブタスクの相関キーを生成
    fn generate_local_key(&self) -> LocalKey;

    /// Task ID を生成（store 側で使う）
    fn generate_task_id(&self) -> TaskId;

    /// Subtask ID を生成（store 側で使う）
    fn generate_subtask_id(&self) -> SubtaskId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
/// テスト時に FixedClock を渡すと timestamp 部分が固定されます。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_local_key(&self) -> LocalKey {
        LocalKey::from_ulid(self.next_ulid())
    }

    fn generate_task_id(&self) -> TaskId {
        TaskId::from_ulid(self.next_ulid())
    }

    fn generate_subtask_id(&self) -> SubtaskId {
        SubtaskId::from_ulid(self.next_ulid())
    }
}
