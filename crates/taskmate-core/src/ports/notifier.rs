//! Notifier port - トースト通知の抽象化
//!
//! 以前はグローバルな toast フックを参照していましたが、
//! サービスのコンストラクタで受け取る形にしています。
//!
//! # 実装
//! - TracingNotifier: ログに流すだけ
//! - ChannelNotifier: UI スレッドへ mpsc で送る
//! - RecordingNotifier: テスト用

use std::sync::Arc;

use crate::domain::Notification;

/// Notifier はユーザー向けの成功/失敗バナーを届ける
///
/// 通知は戻り値とは独立したサイドチャネルです。失敗しても操作結果には影響しません。
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}
