//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: アプリケーションの構築とワイヤリング
//! - **BoardState**: ボードの正本（watch チャネル）
//! - **TaskMutationService**: create / update / move / delete
//! - **SubtaskReconciler**: サブタスク一覧の差分反映
//! - **DragController**: 列間のドラッグ＆ドロップ
//! - **TaskDialog**: 作成・編集ダイアログと削除確認
//! - **BoardLoader**: ボード・カレンダー・統計の読み込み

pub mod board_state;
pub mod builder;
pub mod dialog;
pub mod drag;
pub mod loader;
pub mod mutation;
pub mod reconciler;

// 主要な型を再エクスポート
pub use self::board_state::BoardState;
pub use self::builder::{AppBuilder, BuildError, TaskMateApp};
pub use self::dialog::{DialogError, EditSession, TaskDialog, TaskForm};
pub use self::drag::{DragController, DragState, DropOutcome};
pub use self::loader::BoardLoader;
pub use self::mutation::TaskMutationService;
pub use self::reconciler::{ReconcileMode, ReconcileReport, SubtaskReconciler};
