//! Staff-managed catalogue of dynamic form definitions.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{FormCatalogue, FormRepository};
use crate::domain::service_support::{fetch_form, map_form_error, require_staff};
use crate::domain::{Actor, Error, Form, FormDefinitionInput, FormDraft, FormId};

/// Catalogue service implementing [`FormCatalogue`].
#[derive(Clone)]
pub struct FormCatalogueService<F> {
    forms: Arc<F>,
    clock: Arc<dyn Clock>,
}

impl<F> FormCatalogueService<F> {
    pub fn new(forms: Arc<F>, clock: Arc<dyn Clock>) -> Self {
        Self { forms, clock }
    }
}

#[async_trait]
impl<F> FormCatalogue for FormCatalogueService<F>
where
    F: FormRepository,
{
    async fn define(&self, actor: &Actor, draft: FormDraft) -> Result<Form, Error> {
        require_staff(actor)?;
        let input = FormDefinitionInput::try_from(draft).map_err(Error::validation)?;
        let form = input.into_form(FormId::random(), actor.user_id, self.clock.utc());
        self.forms.create(&form).await.map_err(map_form_error)?;
        info!(
            form_id = %form.id,
            fields = form.fields.len(),
            created_by = %actor.user_id,
            "form defined"
        );
        Ok(form)
    }

    async fn list(&self, actor: &Actor, include_inactive: bool) -> Result<Vec<Form>, Error> {
        // Inactive forms stay hidden from non-staff listings.
        self.forms
            .list(include_inactive && actor.is_staff)
            .await
            .map_err(map_form_error)
    }

    async fn get(&self, _actor: &Actor, id: FormId) -> Result<Form, Error> {
        fetch_form(self.forms.as_ref(), &id).await
    }

    async fn set_active(
        &self,
        actor: &Actor,
        id: FormId,
        is_active: bool,
    ) -> Result<Form, Error> {
        require_staff(actor)?;
        let found = self
            .forms
            .set_active(&id, is_active, self.clock.utc())
            .await
            .map_err(map_form_error)?;
        if !found {
            return Err(Error::not_found("Form not found"));
        }
        info!(form_id = %id, is_active, "form availability changed");
        fetch_form(self.forms.as_ref(), &id).await
    }
}
