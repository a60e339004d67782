//! taskmate-core
//!
//! Core building blocks for the TaskMate board: tasks, subtasks, and the
//! sync rules that keep a local board consistent with a remote task store.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task, subtask, board, state, errors, events, stats, calendar）
//! - **ports**: 抽象化レイヤー（TaskStore, Clock, IdGenerator, Notifier）
//! - **app**: アプリケーションロジック（builder, mutation, reconciler, drag, dialog, loader）
//! - **impls**: 実装（InMemoryTaskStore, 通知の実装）
//! - **config**: taskmate.toml と環境変数

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{AppBuilder, TaskMateApp};
pub use config::{ConfigError, TaskMateConfig};
pub use domain::TaskMateError;
