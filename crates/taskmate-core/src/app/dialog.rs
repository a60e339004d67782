//! TaskDialog - 作成・編集ダイアログと削除確認
//!
//! # 学習ポイント
//! - 同時に開けるのは 1 つだけ（Busy を返す）
//! - `submit(&mut self)` は保存の完了を待ってから閉じる
//!   （借用規則により、保存中に close を呼ぶことはできない）
//! - 保存に失敗した場合はダイアログを開いたままにする
//! - 未保存のサブタスクは LocalKey で識別する

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::domain::{
    LocalKey, Priority, Subtask, SubtaskKey, Task, TaskDraft, TaskMateError, TaskPatch, TaskStatus,
};
use crate::ports::IdGenerator;

use super::mutation::TaskMutationService;

#[derive(Debug, Error)]
pub enum DialogError {
    #[error("another dialog is already open")]
    Busy,

    #[error("no matching dialog is open")]
    NotOpen,

    #[error(transparent)]
    Save(#[from] TaskMateError),
}

/// Editable form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub tags: Vec<String>,
    pub subtasks: Vec<Subtask>,
}

impl TaskForm {
    fn blank(status: TaskStatus) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status,
            due_date: None,
            priority: None,
            tags: Vec::new(),
            subtasks: Vec::new(),
        }
    }

    fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            due_date: task.due_date,
            priority: task.priority,
            tags: task.tags.clone().unwrap_or_default(),
            subtasks: task.subtasks().to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
enum Target {
    Create { column: TaskStatus },
    Edit { original: Task },
}

/// An open create or edit dialog.
pub struct EditSession {
    target: Target,
    pub form: TaskForm,
    ids: Arc<dyn IdGenerator>,
}

impl EditSession {
    pub fn is_edit(&self) -> bool {
        matches!(self.target, Target::Edit { .. })
    }

    /// Append a subtask. Blank titles are ignored.
    pub fn add_subtask(&mut self, title: &str) -> Option<LocalKey> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let key = self.ids.generate_local_key();
        self.form.subtasks.push(Subtask::pending(key, title));
        Some(key)
    }

    pub fn rename_subtask(&mut self, key: &SubtaskKey, title: &str) -> bool {
        match self.subtask_mut(key) {
            Some(subtask) => {
                subtask.title = title.to_string();
                true
            }
            None => false,
        }
    }

    pub fn toggle_subtask(&mut self, key: &SubtaskKey) -> bool {
        match self.subtask_mut(key) {
            Some(subtask) => {
                subtask.completed = !subtask.completed;
                true
            }
            None => false,
        }
    }

    pub fn remove_subtask(&mut self, key: &SubtaskKey) -> bool {
        let before = self.form.subtasks.len();
        self.form.subtasks.retain(|s| &s.key != key);
        self.form.subtasks.len() != before
    }

    fn subtask_mut(&mut self, key: &SubtaskKey) -> Option<&mut Subtask> {
        self.form.subtasks.iter_mut().find(|s| &s.key == key)
    }

    fn draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.form.title.clone(),
            description: self.form.description.clone(),
            status: Some(self.form.status),
            due_date: self.form.due_date,
            priority: self.form.priority,
            tags: self.form.tags.clone(),
            subtasks: self.form.subtasks.clone(),
        }
    }

    /// Only fields that differ from `original` are patched. Subtasks are
    /// always sent so the stored list follows the form.
    fn patch(&self, original: &Task) -> TaskPatch {
        let form = &self.form;
        let tags = (!form.tags.is_empty()).then(|| form.tags.clone());
        TaskPatch {
            title: (form.title != original.title).then(|| form.title.clone()),
            description: (form.description != original.description)
                .then(|| form.description.clone()),
            status: (form.status != original.status).then_some(form.status),
            due_date: (form.due_date != original.due_date).then_some(form.due_date),
            priority: (form.priority != original.priority).then_some(form.priority),
            tags: (tags.as_deref().unwrap_or(&[]) != original.tags.as_deref().unwrap_or(&[]))
                .then_some(tags),
            subtasks: Some(form.subtasks.clone()),
        }
    }
}

enum DialogState {
    Closed,
    Editing(EditSession),
    ConfirmingDelete { task: Task },
}

pub struct TaskDialog {
    service: Arc<TaskMutationService>,
    ids: Arc<dyn IdGenerator>,
    default_status: TaskStatus,
    state: DialogState,
}

impl TaskDialog {
    pub fn new(
        service: Arc<TaskMutationService>,
        ids: Arc<dyn IdGenerator>,
        default_status: TaskStatus,
    ) -> Self {
        Self {
            service,
            ids,
            default_status,
            state: DialogState::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, DialogState::Closed)
    }

    pub fn session(&self) -> Option<&EditSession> {
        match &self.state {
            DialogState::Editing(session) => Some(session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut EditSession> {
        match &mut self.state {
            DialogState::Editing(session) => Some(session),
            _ => None,
        }
    }

    /// Task awaiting delete confirmation.
    pub fn pending_delete(&self) -> Option<&Task> {
        match &self.state {
            DialogState::ConfirmingDelete { task } => Some(task),
            _ => None,
        }
    }

    /// Open a blank dialog for `column`, or for the default column.
    pub fn open_create(
        &mut self,
        column: Option<TaskStatus>,
    ) -> Result<&mut EditSession, DialogError> {
        let column = column.unwrap_or(self.default_status);
        let session = EditSession {
            target: Target::Create { column },
            form: TaskForm::blank(column),
            ids: Arc::clone(&self.ids),
        };
        self.open(session)
    }

    pub fn open_edit(&mut self, task: &Task) -> Result<&mut EditSession, DialogError> {
        let session = EditSession {
            target: Target::Edit {
                original: task.clone(),
            },
            form: TaskForm::from_task(task),
            ids: Arc::clone(&self.ids),
        };
        self.open(session)
    }

    pub fn request_delete(&mut self, task: &Task) -> Result<(), DialogError> {
        self.ensure_closed()?;
        self.state = DialogState::ConfirmingDelete { task: task.clone() };
        Ok(())
    }

    /// Save the form. Closes only when the save succeeded.
    pub async fn submit(&mut self) -> Result<Task, DialogError> {
        let DialogState::Editing(session) = &self.state else {
            return Err(DialogError::NotOpen);
        };
        let saved = match &session.target {
            Target::Create { column } => self.service.create(*column, session.draft()).await,
            Target::Edit { original } => {
                self.service
                    .update(&original.id, session.patch(original))
                    .await
            }
        };
        let task = saved?;
        debug!(task_id = %task.id, "dialog saved");
        self.state = DialogState::Closed;
        Ok(task)
    }

    /// Delete the task awaiting confirmation. Closes only on success.
    pub async fn confirm_delete(&mut self) -> Result<(), DialogError> {
        let DialogState::ConfirmingDelete { task } = &self.state else {
            return Err(DialogError::NotOpen);
        };
        self.service.delete(&task.id).await?;
        self.state = DialogState::Closed;
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), DialogError> {
        if !self.is_open() {
            return Err(DialogError::NotOpen);
        }
        self.state = DialogState::Closed;
        Ok(())
    }

    fn ensure_closed(&self) -> Result<(), DialogError> {
        if self.is_open() {
            return Err(DialogError::Busy);
        }
        Ok(())
    }

    fn open(&mut self, session: EditSession) -> Result<&mut EditSession, DialogError> {
        self.ensure_closed()?;
        self.state = DialogState::Editing(session);
        self.session_mut().ok_or(DialogError::NotOpen)
    }
}
