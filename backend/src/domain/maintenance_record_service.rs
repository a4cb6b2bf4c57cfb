//! Wheel specification and bogie checksheet records.
//!
//! Form number uniqueness is left to the store: the losing writer of a race
//! receives [`MaintenanceRepositoryError::DuplicateFormNumber`], reported as a
//! 409 on `formNumber`.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{
    BogieChecksheetRepository, MaintenanceRecords, MaintenanceRepositoryError, UserRepository,
    WheelSpecificationRepository,
};
use crate::domain::service_support::{STAFF_ONLY, map_user_error};
use crate::domain::{
    Actor, BogieChecksheet, BogieChecksheetDraft, BogieChecksheetFilter, Error,
    FORM_NUMBER_TAKEN, FieldErrors, FormNumber, NewBogieChecksheet, NewWheelSpecification,
    RecordStatus, USER_NOT_FOUND, UserId, WheelSpecification, WheelSpecificationDraft,
    WheelSpecificationFilter,
};

fn map_record_error(error: MaintenanceRepositoryError) -> Error {
    match error {
        MaintenanceRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("maintenance repository unavailable: {message}"))
        }
        MaintenanceRepositoryError::Query { message } => {
            Error::internal(format!("maintenance repository error: {message}"))
        }
        MaintenanceRepositoryError::DuplicateFormNumber { form_number } => {
            warn!(%form_number, "duplicate form number rejected");
            Error::conflict(FORM_NUMBER_TAKEN).with_field_error("formNumber", FORM_NUMBER_TAKEN)
        }
    }
}

/// Decide whether `actor` may move a record owned by `owner`.
///
/// Staff may make any move the workflow allows; the attributed user may only
/// submit their own saved draft.
fn authorize_transition(
    actor: &Actor,
    owner: UserId,
    from: RecordStatus,
    to: RecordStatus,
) -> Result<(), Error> {
    let owner_submits_draft =
        actor.user_id == owner && from == RecordStatus::Saved && to == RecordStatus::Submitted;
    if !actor.is_staff && !owner_submits_draft {
        return Err(Error::forbidden(STAFF_ONLY));
    }
    if !from.can_transition_to(to) {
        let message = format!("Cannot move a record from {from} to {to}.");
        return Err(Error::invalid_request(message.clone()).with_field_error("status", message));
    }
    Ok(())
}

fn lost_race(form_number: &FormNumber) -> Error {
    warn!(%form_number, "concurrent status change lost the race");
    Error::conflict("The record was updated by someone else. Reload and try again.")
}

/// Maintenance record service implementing [`MaintenanceRecords`].
#[derive(Clone)]
pub struct MaintenanceRecordService<U, W, B> {
    users: Arc<U>,
    wheels: Arc<W>,
    bogies: Arc<B>,
    clock: Arc<dyn Clock>,
}

impl<U, W, B> MaintenanceRecordService<U, W, B> {
    pub fn new(users: Arc<U>, wheels: Arc<W>, bogies: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            wheels,
            bogies,
            clock,
        }
    }
}

impl<U, W, B> MaintenanceRecordService<U, W, B>
where
    U: UserRepository,
    W: WheelSpecificationRepository,
    B: BogieChecksheetRepository,
{
    /// Resolve the attributed user: the caller when omitted, otherwise an
    /// existing account. `key` names the request field in errors.
    async fn attribute(
        &self,
        actor: &Actor,
        requested: Option<UserId>,
        key: &str,
    ) -> Result<UserId, Error> {
        let Some(id) = requested else {
            return Ok(actor.user_id);
        };
        self.require_user(id, key).await?;
        Ok(id)
    }

    async fn require_user(&self, id: UserId, key: &str) -> Result<(), Error> {
        let found = self.users.find_by_id(&id).await.map_err(map_user_error)?;
        if found.is_none() {
            return Err(Error::validation(FieldErrors::single(key, USER_NOT_FOUND)));
        }
        Ok(())
    }

    async fn wheel(&self, form_number: &FormNumber) -> Result<WheelSpecification, Error> {
        self.wheels
            .find_by_form_number(form_number)
            .await
            .map_err(map_record_error)?
            .ok_or_else(|| Error::not_found("Wheel specification not found"))
    }

    async fn bogie(&self, form_number: &FormNumber) -> Result<BogieChecksheet, Error> {
        self.bogies
            .find_by_form_number(form_number)
            .await
            .map_err(map_record_error)?
            .ok_or_else(|| Error::not_found("Bogie checksheet not found"))
    }
}

#[async_trait]
impl<U, W, B> MaintenanceRecords for MaintenanceRecordService<U, W, B>
where
    U: UserRepository,
    W: WheelSpecificationRepository,
    B: BogieChecksheetRepository,
{
    async fn create_wheel_specification(
        &self,
        actor: &Actor,
        draft: WheelSpecificationDraft,
    ) -> Result<WheelSpecification, Error> {
        let new = NewWheelSpecification::try_from(draft).map_err(Error::validation)?;
        let submitted_by = self
            .attribute(actor, new.submitted_by, "submittedBy")
            .await?;
        let record = new.into_record(submitted_by, self.clock.utc());
        self.wheels.create(&record).await.map_err(map_record_error)?;
        info!(
            form_number = %record.form_number,
            submitted_by = %record.submitted_by,
            status = %record.status,
            "wheel specification stored"
        );
        Ok(record)
    }

    async fn list_wheel_specifications(
        &self,
        _actor: &Actor,
        filter: WheelSpecificationFilter,
    ) -> Result<Vec<WheelSpecification>, Error> {
        if let Some(id) = filter.submitted_by {
            self.require_user(id, "submitted_by").await?;
        }
        self.wheels.list(&filter).await.map_err(map_record_error)
    }

    async fn set_wheel_specification_status(
        &self,
        actor: &Actor,
        form_number: FormNumber,
        status: RecordStatus,
    ) -> Result<WheelSpecification, Error> {
        let mut record = self.wheel(&form_number).await?;
        authorize_transition(actor, record.submitted_by, record.status, status)?;
        let now = self.clock.utc();
        let applied = self
            .wheels
            .transition(&form_number, record.status, status, now)
            .await
            .map_err(map_record_error)?;
        if !applied {
            return Err(lost_race(&form_number));
        }
        info!(%form_number, from = %record.status, to = %status, "wheel specification status changed");
        record.status = status;
        record.updated_at = now;
        Ok(record)
    }

    async fn create_bogie_checksheet(
        &self,
        actor: &Actor,
        draft: BogieChecksheetDraft,
    ) -> Result<BogieChecksheet, Error> {
        let new = NewBogieChecksheet::try_from(draft).map_err(Error::validation)?;
        let inspection_by = self
            .attribute(actor, new.inspection_by, "inspectionBy")
            .await?;
        let record = new.into_record(inspection_by, self.clock.utc());
        self.bogies.create(&record).await.map_err(map_record_error)?;
        info!(
            form_number = %record.form_number,
            inspection_by = %record.inspection_by,
            status = %record.status,
            "bogie checksheet stored"
        );
        Ok(record)
    }

    async fn list_bogie_checksheets(
        &self,
        _actor: &Actor,
        filter: BogieChecksheetFilter,
    ) -> Result<Vec<BogieChecksheet>, Error> {
        if let Some(id) = filter.inspection_by {
            self.require_user(id, "inspection_by").await?;
        }
        self.bogies.list(&filter).await.map_err(map_record_error)
    }

    async fn set_bogie_checksheet_status(
        &self,
        actor: &Actor,
        form_number: FormNumber,
        status: RecordStatus,
    ) -> Result<BogieChecksheet, Error> {
        let mut record = self.bogie(&form_number).await?;
        authorize_transition(actor, record.inspection_by, record.status, status)?;
        let now = self.clock.utc();
        let applied = self
            .bogies
            .transition(&form_number, record.status, status, now)
            .await
            .map_err(map_record_error)?;
        if !applied {
            return Err(lost_race(&form_number));
        }
        info!(%form_number, from = %record.status, to = %status, "bogie checksheet status changed");
        record.status = status;
        record.updated_at = now;
        Ok(record)
    }
}

#[cfg(test)]
#[path = "maintenance_record_service_tests.rs"]
mod tests;
