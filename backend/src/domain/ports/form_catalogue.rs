//! Driving port for dynamic form definitions.

use async_trait::async_trait;

use crate::domain::{Actor, Error, Form, FormDraft, FormId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FormCatalogue: Send + Sync {
    /// Staff only: validate and store a new form.
    async fn define(&self, actor: &Actor, draft: FormDraft) -> Result<Form, Error>;

    /// Active forms; staff may ask for inactive ones too.
    async fn list(&self, actor: &Actor, include_inactive: bool) -> Result<Vec<Form>, Error>;

    async fn get(&self, actor: &Actor, id: FormId) -> Result<Form, Error>;

    /// Staff only: open or close a form for submissions.
    async fn set_active(&self, actor: &Actor, id: FormId, is_active: bool)
    -> Result<Form, Error>;
}
