//! Form/modal state for creating and editing records.
//!
//! Holds a draft copy of a record while the modal is open. Nothing reaches
//! the store until `submit`, and a submit that fails keeps the modal open
//! with its draft and error message so the user can retry.

use chrono::Local;
use log::{info, warn};
use shared::{EntityKind, FieldValue, Fields, Record};
use std::collections::BTreeSet;

use crate::backend::domain::record_service::RecordService;
use crate::backend::error::DashboardError;
use crate::backend::storage::RecordStorage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Closed,
    Create,
    Edit { id: String },
}

/// Successful submit; the list should be refreshed afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSubmission {
    Created { id: String },
    Updated { id: String },
}

impl FormSubmission {
    pub fn id(&self) -> &str {
        match self {
            FormSubmission::Created { id } | FormSubmission::Updated { id } => id,
        }
    }
}

/// Required fields of `kind` that are missing or blank in `draft`
pub fn missing_required_fields(kind: EntityKind, draft: &Fields) -> BTreeSet<String> {
    kind.required_fields()
        .iter()
        .filter(|key| draft.get(**key).map_or(true, FieldValue::is_blank))
        .map(|key| key.to_string())
        .collect()
}

#[derive(Debug)]
pub struct FormController {
    kind: EntityKind,
    mode: FormMode,
    draft: Fields,
    error: Option<String>,
    is_saving: bool,
}

impl FormController {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            mode: FormMode::Closed,
            draft: Fields::new(),
            error: None,
            is_saving: false,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn is_open(&self) -> bool {
        self.mode != FormMode::Closed
    }

    pub fn draft(&self) -> &Fields {
        &self.draft
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    /// Open the modal: blank draft for `None`, a copy of the record otherwise
    pub fn open(&mut self, existing: Option<&Record>) {
        match existing {
            Some(record) => {
                self.draft = record.fields.clone();
                self.mode = FormMode::Edit {
                    id: record.id.clone(),
                };
            }
            None => {
                self.draft = self
                    .kind
                    .form_fields()
                    .into_iter()
                    .map(|key| (key.to_string(), FieldValue::Text(String::new())))
                    .collect();
                self.mode = FormMode::Create;
            }
        }
        self.error = None;
        self.is_saving = false;
    }

    pub fn close(&mut self) {
        self.mode = FormMode::Closed;
        self.draft.clear();
        self.error = None;
        self.is_saving = false;
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<FieldValue>) {
        self.draft.insert(key.to_string(), value.into());
    }

    pub fn validate(&self) -> BTreeSet<String> {
        missing_required_fields(self.kind, &self.draft)
    }

    /// Save the draft: `add` in create mode, `update` in edit mode.
    ///
    /// Closes the modal on success. On failure the draft stays as it was and
    /// the message is kept in `error`.
    pub async fn submit<S: RecordStorage>(
        &mut self,
        service: &RecordService<S>,
    ) -> Result<FormSubmission, DashboardError> {
        if self.mode == FormMode::Closed {
            return Err(DashboardError::FormNotOpen);
        }

        let missing = self.validate();
        if !missing.is_empty() {
            let error = DashboardError::Validation {
                missing: missing.into_iter().collect(),
            };
            warn!("⚠️ FORM: {}", error);
            self.error = Some(error.to_string());
            return Err(error);
        }

        self.is_saving = true;
        self.error = None;
        let result = match self.mode.clone() {
            FormMode::Create => {
                let mut fields = self.draft.clone();
                if let Some(created) = self.kind.created_field() {
                    let today = Local::now().format("%Y-%m-%d").to_string();
                    fields.insert(created.to_string(), FieldValue::Text(today));
                }
                service
                    .add(self.kind, fields)
                    .await
                    .map(|id| FormSubmission::Created { id })
            }
            FormMode::Edit { id } => service
                .update(self.kind, &id, self.draft.clone())
                .await
                .map(|_| FormSubmission::Updated { id }),
            FormMode::Closed => Err(DashboardError::FormNotOpen),
        };

        match result {
            Ok(submission) => {
                info!("💾 FORM: {} saved ({:?})", self.kind, submission);
                self.close();
                Ok(submission)
            }
            Err(e) => {
                self.is_saving = false;
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
