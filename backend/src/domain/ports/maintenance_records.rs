//! Driving port for wheel specifications and bogie checksheets.

use async_trait::async_trait;

use crate::domain::{
    Actor, BogieChecksheet, BogieChecksheetDraft, BogieChecksheetFilter, Error, FormNumber,
    RecordStatus, WheelSpecification, WheelSpecificationDraft, WheelSpecificationFilter,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MaintenanceRecords: Send + Sync {
    /// Store a wheel specification; attribution defaults to the caller.
    async fn create_wheel_specification(
        &self,
        actor: &Actor,
        draft: WheelSpecificationDraft,
    ) -> Result<WheelSpecification, Error>;

    async fn list_wheel_specifications(
        &self,
        actor: &Actor,
        filter: WheelSpecificationFilter,
    ) -> Result<Vec<WheelSpecification>, Error>;

    /// Advance the workflow. Staff may make any allowed move; the attributed
    /// user may submit their own saved draft.
    async fn set_wheel_specification_status(
        &self,
        actor: &Actor,
        form_number: FormNumber,
        status: RecordStatus,
    ) -> Result<WheelSpecification, Error>;

    /// Store a bogie checksheet; attribution defaults to the caller.
    async fn create_bogie_checksheet(
        &self,
        actor: &Actor,
        draft: BogieChecksheetDraft,
    ) -> Result<BogieChecksheet, Error>;

    async fn list_bogie_checksheets(
        &self,
        actor: &Actor,
        filter: BogieChecksheetFilter,
    ) -> Result<Vec<BogieChecksheet>, Error>;

    /// Same rules as [`Self::set_wheel_specification_status`].
    async fn set_bogie_checksheet_status(
        &self,
        actor: &Actor,
        form_number: FormNumber,
        status: RecordStatus,
    ) -> Result<BogieChecksheet, Error>;
}
