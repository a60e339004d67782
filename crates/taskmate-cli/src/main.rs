use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use taskmate_core::app::DropOutcome;
use taskmate_core::config::LoggingConfig;
use taskmate_core::domain::{NotificationLevel, Task, TaskId, TaskStatus};
use taskmate_core::impls::{ChannelNotifier, InMemoryTaskStore};
use taskmate_core::{AppBuilder, TaskMateApp, TaskMateConfig};

const DEMO_USER: &str = "demo-user";

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    if !logging.console {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(&logging.level).context("invalid log level")?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("tracing already initialized")?;
    Ok(())
}

fn board_task(app: &TaskMateApp, id: &TaskId) -> anyhow::Result<Task> {
    app.board
        .find_task(id)
        .with_context(|| format!("task {id} missing from the board"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // (A) 設定とログ
    let mut config = TaskMateConfig::load_default()?;
    init_tracing(&config.logging)?;
    if config.session.user_id.is_none() {
        config.session.user_id = Some(DEMO_USER.to_string());
    }

    // (B) InMemory store でアプリを組み立てる。通知はチャネル経由で表示
    let (notifier, mut banners) = ChannelNotifier::new();
    let printer = tokio::spawn(async move {
        while let Some(n) = banners.recv().await {
            let mark = match n.level {
                NotificationLevel::Success => "ok",
                NotificationLevel::Failure => "!!",
            };
            println!("[{mark}] {}: {}", n.title, n.description.unwrap_or_default());
        }
    });

    let app = AppBuilder::from_config(&config)
        .store(Arc::new(InMemoryTaskStore::new()))
        .notifier(Arc::new(notifier))
        .build()?;
    app.reload().await?;

    // (C) ダイアログからタスクを作成（サブタスク 2 件）
    let mut dialog = app.dialog();
    let session = dialog.open_create(None)?;
    session.form.title = "Write spec".to_string();
    session.form.description = "Board sync rules".to_string();
    session.add_subtask("Outline");
    session.add_subtask("Review");
    let created = dialog.submit().await?;

    let mut dialog_b = app.dialog();
    dialog_b.open_create(Some(TaskStatus::Todo))?.form.title = "Throwaway".to_string();
    let throwaway = dialog_b.submit().await?;

    // 保存済みのサブタスク ID を得るため読み直す
    app.reload().await?;

    // (D) ドラッグで In Progress へ。未完了のサブタスクがあるので Completed は拒否される
    let mut drag = app.drag_controller();
    drag.start(board_task(&app, &created.id)?);
    drag.end(Some("progress")).await?;

    drag.start(board_task(&app, &created.id)?);
    match drag.end(Some("completed")).await {
        Err(e) => warn!(error = %e, "drop rejected"),
        Ok(outcome) => info!(?outcome, "unexpected drop outcome"),
    }

    // (E) サブタスクを完了にしてから Completed へ
    let current = board_task(&app, &created.id)?;
    let session = dialog.open_edit(&current)?;
    let keys: Vec<_> = session.form.subtasks.iter().map(|s| s.key.clone()).collect();
    for key in &keys {
        session.toggle_subtask(key);
    }
    dialog.submit().await?;

    drag.start(board_task(&app, &created.id)?);
    if let DropOutcome::Moved(task) = drag.end(Some("completed")).await? {
        info!(task_id = %task.id, status = %task.status, "task completed");
    }

    // (F) 削除の確認ダイアログ
    dialog.request_delete(&throwaway)?;
    dialog.confirm_delete().await?;

    // (G) ボード・カレンダー・統計を表示
    println!("{}", serde_json::to_string_pretty(&app.board.snapshot())?);
    let month = app.loader.load_month(Utc::now().date_naive()).await?;
    println!("calendar: {} task(s) this month or undated", month.len());
    let stats = app.loader.load_stats().await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    // 送信側をすべて閉じてから表示タスクを待つ
    drop(drag);
    drop(dialog);
    drop(dialog_b);
    drop(app);
    printer.await?;
    Ok(())
}
