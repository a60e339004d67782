//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryTaskStore**: 開発用の正本（cascade 削除・失敗注入つき）
//! - **TracingNotifier / ChannelNotifier / RecordingNotifier**: トースト通知
//!
//! # 本番用実装
//! ホスト型バックエンドへのクライアントは別クレートに配置する想定です。

pub mod inmem_store;
pub mod notifiers;

// 主要な型を再エクスポート
pub use self::inmem_store::{InMemoryTaskStore, StoreOp};
pub use self::notifiers::{ChannelNotifier, RecordingNotifier, TracingNotifier};
