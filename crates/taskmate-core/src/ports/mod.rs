//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部（ホスト型ストア、時計、UI のトースト）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - リモートストアが source of truth（正本）
//! - ボードはストアへの書き込みが成功した後にだけ更新する
//! - 現在のユーザーや通知先はグローバルに引かず、注入する

pub mod clock;
pub mod id_generator;
pub mod notifier;
pub mod task_store;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::notifier::Notifier;
pub use self::task_store::TaskStore;
