//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 依存（store / clock / notifier / session）はすべて注入する

use std::sync::Arc;

use crate::config::TaskMateConfig;
use crate::domain::{Session, TaskMateError, TaskStatus};
use crate::impls::TracingNotifier;
use crate::ports::{Clock, IdGenerator, Notifier, SystemClock, TaskStore, UlidGenerator};

use super::board_state::BoardState;
use super::dialog::TaskDialog;
use super::drag::DragController;
use super::loader::BoardLoader;
use super::mutation::TaskMutationService;
use super::reconciler::{ReconcileMode, SubtaskReconciler};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::from_config(&config)
///     .store(Arc::new(InMemoryTaskStore::new()))
///     .build()?;
/// app.reload().await?;
/// ```
///
/// # Fail-fast 設計
/// - store が未設定なら build() が BuildError を返す
pub struct AppBuilder {
    store: Option<Arc<dyn TaskStore>>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    ids: Option<Arc<dyn IdGenerator>>,
    session: Session,
    reconcile_mode: ReconcileMode,
    default_status: TaskStatus,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("No task store configured. Call AppBuilder::store() before build().")]
    MissingStore,
}

impl AppBuilder {
    /// 新しい AppBuilder を作成（匿名セッション・壁時計・ログ通知）
    pub fn new() -> Self {
        Self {
            store: None,
            clock: Arc::new(SystemClock),
            notifier: Arc::new(TracingNotifier),
            ids: None,
            session: Session::anonymous(),
            reconcile_mode: ReconcileMode::default(),
            default_status: TaskStatus::default(),
        }
    }

    /// 設定ファイルの値（セッション・同期モード・既定の列）を反映
    pub fn from_config(config: &TaskMateConfig) -> Self {
        Self::new()
            .session(config.session())
            .reconcile_mode(config.reconcile.mode)
            .default_status(config.board.default_status)
    }

    pub fn store(mut self, store: Arc<dyn TaskStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// 未保存サブタスク用の LocalKey 生成器（省略時は clock ベースの ULID）
    pub fn ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    pub fn reconcile_mode(mut self, mode: ReconcileMode) -> Self {
        self.reconcile_mode = mode;
        self
    }

    pub fn default_status(mut self, status: TaskStatus) -> Self {
        self.default_status = status;
        self
    }

    /// AppBuilder を構築して TaskMateApp を生成
    ///
    /// ボードは空の状態で始まります。`reload()` で読み込んでください。
    pub fn build(self) -> Result<TaskMateApp, BuildError> {
        let store = self.store.ok_or(BuildError::MissingStore)?;
        let ids: Arc<dyn IdGenerator> = match self.ids {
            Some(ids) => ids,
            None => Arc::new(UlidGenerator::new(Arc::clone(&self.clock))),
        };

        let board = BoardState::default();
        let reconciler = SubtaskReconciler::new(
            Arc::clone(&store),
            Arc::clone(&self.clock),
            self.reconcile_mode,
        );
        let mutations = Arc::new(TaskMutationService::new(
            Arc::clone(&store),
            Arc::clone(&self.clock),
            Arc::clone(&self.notifier),
            self.session.clone(),
            board.clone(),
            reconciler,
        ));
        let loader = BoardLoader::new(store, self.clock, self.notifier, self.session);

        Ok(TaskMateApp {
            board,
            mutations,
            loader,
            ids,
            default_status: self.default_status,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// TaskMateApp は組み立て済みのアプリケーション
pub struct TaskMateApp {
    pub board: BoardState,
    pub mutations: Arc<TaskMutationService>,
    pub loader: BoardLoader,
    ids: Arc<dyn IdGenerator>,
    default_status: TaskStatus,
}

impl TaskMateApp {
    /// ストアから全件を読み直してボードを置き換える
    pub async fn reload(&self) -> Result<(), TaskMateError> {
        let board = self.loader.load_board().await?;
        self.mutations.replace_board(board);
        Ok(())
    }

    pub fn drag_controller(&self) -> DragController {
        DragController::new(Arc::clone(&self.mutations))
    }

    pub fn dialog(&self) -> TaskDialog {
        TaskDialog::new(
            Arc::clone(&self.mutations),
            Arc::clone(&self.ids),
            self.default_status,
        )
    }
}
