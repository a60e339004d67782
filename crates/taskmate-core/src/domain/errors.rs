//! Errors - エラー型と分類
//!
//! - `StoreError`: Remote Task Store の 1 回の呼び出しの失敗
//! - `TaskMateError`: 操作（create / update / move / delete / reconcile）単位の失敗
//!
//! ローカル検証エラーはネットワークに出る前に返ります。

use thiserror::Error;

use super::ids::TaskId;

/// A failed call against the remote task store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Constraint(String),

    #[error("row not found: {0}")]
    NotFound(String),
}

impl StoreError {
    /// Message suitable for a notification banner. Empty when the backend gave
    /// no detail.
    pub fn message(&self) -> &str {
        match self {
            StoreError::Transport(m) | StoreError::Constraint(m) | StoreError::NotFound(m) => m,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskMateError {
    /// Rejected locally; nothing was sent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Completion prerequisite failed; nothing was sent.
    #[error("{0}")]
    BusinessRule(String),

    /// A single remote write (or the read preceding it) failed before anything
    /// was persisted by this operation.
    #[error("remote write failed: {0}")]
    RemoteWrite(#[source] StoreError),

    /// A multi-call sequence failed after `completed_writes` calls had already
    /// succeeded. No rollback is attempted.
    #[error("partially applied after {completed_writes} write(s): {source}")]
    PartialReconciliation {
        completed_writes: usize,
        #[source]
        source: StoreError,
    },

    /// A load (board, calendar, stats) could not read from the store.
    #[error("remote read failed: {0}")]
    RemoteRead(#[source] StoreError),

    #[error("task {0} is not on the board")]
    TaskNotFound(TaskId),

    #[error("user not authenticated")]
    Unauthenticated,
}

impl TaskMateError {
    /// Build the error for a failed remote call given how many writes of the
    /// same operation already went through.
    pub fn remote(source: StoreError, completed_writes: usize) -> Self {
        if completed_writes == 0 {
            TaskMateError::RemoteWrite(source)
        } else {
            TaskMateError::PartialReconciliation {
                completed_writes,
                source,
            }
        }
    }

    /// Text for the failure banner: the store's own message when present,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            TaskMateError::RemoteWrite(source)
            | TaskMateError::RemoteRead(source)
            | TaskMateError::PartialReconciliation { source, .. } => {
                let message = source.message();
                if message.trim().is_empty() {
                    fallback.to_string()
                } else {
                    message.to_string()
                }
            }
            TaskMateError::Validation(m) | TaskMateError::BusinessRule(m) => m.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            TaskMateError::RemoteWrite(_)
                | TaskMateError::RemoteRead(_)
                | TaskMateError::PartialReconciliation { .. }
        )
    }

    /// Re-base a failure of a later step onto `prior` writes that already
    /// succeeded in the enclosing operation.
    pub fn after_writes(self, prior: usize) -> Self {
        match self {
            TaskMateError::RemoteWrite(source) => TaskMateError::remote(source, prior),
            TaskMateError::PartialReconciliation {
                completed_writes,
                source,
            } => TaskMateError::PartialReconciliation {
                completed_writes: completed_writes + prior,
                source,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_failure_is_a_plain_remote_error() {
        let err = TaskMateError::remote(StoreError::Transport("offline".into()), 0);
        assert!(matches!(err, TaskMateError::RemoteWrite(_)));
        assert!(err.is_remote());
    }

    #[test]
    fn later_failure_is_partial() {
        let err = TaskMateError::remote(StoreError::Constraint("fk".into()), 2);
        assert!(matches!(
            err,
            TaskMateError::PartialReconciliation { completed_writes: 2, .. }
        ));
    }

    #[test]
    fn later_step_failures_count_earlier_writes() {
        let inner = TaskMateError::remote(StoreError::Transport("x".into()), 0);
        assert!(matches!(
            inner.after_writes(1),
            TaskMateError::PartialReconciliation { completed_writes: 1, .. }
        ));

        let inner = TaskMateError::remote(StoreError::Transport("x".into()), 2);
        assert!(matches!(
            inner.after_writes(1),
            TaskMateError::PartialReconciliation { completed_writes: 3, .. }
        ));
    }

    #[test]
    fn user_message_prefers_store_text() {
        let err = TaskMateError::RemoteWrite(StoreError::Transport("timeout".into()));
        assert_eq!(err.user_message("Failed to save task"), "timeout");
    }

    #[test]
    fn user_message_falls_back_when_store_is_silent() {
        let err = TaskMateError::RemoteWrite(StoreError::Transport(String::new()));
        assert_eq!(err.user_message("Failed to save task"), "Failed to save task");
    }
}
