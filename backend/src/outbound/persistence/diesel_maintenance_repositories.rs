//! PostgreSQL-backed wheel specification and bogie checksheet records.
//!
//! The form number is each table's primary key. A clash on insert is reported
//! as [`MaintenanceRepositoryError::DuplicateFormNumber`]; status changes are
//! compare-and-set updates guarded by the expected status.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    BogieChecksheetRepository, MaintenanceRepositoryError, WheelSpecificationRepository,
};
use crate::domain::{
    BogieChecksheet, BogieChecksheetFilter, FormNumber, RecordStatus, UserId, WheelSpecification,
    WheelSpecificationFilter,
};

use super::diesel_basic_error_mapping::{
    ConstraintViolation, constraint_violation, contains_pattern, map_basic_diesel_error,
    map_basic_pool_error,
};
use super::json_serializers::{from_json, to_json};
use super::models::{
    BogieChecksheetRow, NewBogieChecksheetRow, NewWheelSpecificationRow, WheelSpecificationRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{bogie_checksheets, wheel_specifications};

fn map_pool_error(error: PoolError) -> MaintenanceRepositoryError {
    map_basic_pool_error(error, MaintenanceRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> MaintenanceRepositoryError {
    map_basic_diesel_error(
        error,
        MaintenanceRepositoryError::query,
        MaintenanceRepositoryError::connection,
    )
}

/// Map an insert failure, reporting a key clash against `form_number`.
fn map_insert_error(
    form_number: &FormNumber,
) -> impl FnOnce(diesel::result::Error) -> MaintenanceRepositoryError + '_ {
    move |error| {
        if let Some(ConstraintViolation::Unique(_)) = constraint_violation(&error) {
            return MaintenanceRepositoryError::duplicate_form_number(form_number.as_str());
        }
        map_diesel_error(error)
    }
}

fn encode(
    value: &impl serde::Serialize,
    what: &str,
) -> Result<serde_json::Value, MaintenanceRepositoryError> {
    to_json(value, what).map_err(MaintenanceRepositoryError::query)
}

fn decode<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    what: &str,
) -> Result<T, MaintenanceRepositoryError> {
    from_json(value, what).map_err(MaintenanceRepositoryError::query)
}

fn decode_header(
    form_number: &str,
    status: &str,
) -> Result<(FormNumber, RecordStatus), MaintenanceRepositoryError> {
    let form_number = FormNumber::new(form_number).map_err(|err| {
        MaintenanceRepositoryError::query(format!("invalid form number in database: {err}"))
    })?;
    let status = RecordStatus::from_str(status).map_err(|err| {
        MaintenanceRepositoryError::query(format!("invalid record status in database: {err}"))
    })?;
    Ok((form_number, status))
}

fn row_to_wheel_specification(
    row: WheelSpecificationRow,
) -> Result<WheelSpecification, MaintenanceRepositoryError> {
    let (form_number, status) = decode_header(&row.form_number, &row.status)?;
    Ok(WheelSpecification {
        form_number,
        submitted_by: UserId::from_uuid(row.submitted_by),
        submitted_date: row.submitted_date,
        status,
        measurements: decode(row.fields, "wheel measurements")?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn row_to_bogie_checksheet(
    row: BogieChecksheetRow,
) -> Result<BogieChecksheet, MaintenanceRepositoryError> {
    let (form_number, status) = decode_header(&row.form_number, &row.status)?;
    Ok(BogieChecksheet {
        form_number,
        inspection_by: UserId::from_uuid(row.inspection_by),
        inspection_date: row.inspection_date,
        status,
        details: decode(row.bogie_details, "bogie details")?,
        conditions: decode(row.bogie_checksheet, "bogie checksheet")?,
        bmbc: decode(row.bmbc_checksheet, "bmbc checksheet")?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Diesel-backed implementation of [`WheelSpecificationRepository`].
#[derive(Clone)]
pub struct DieselWheelSpecificationRepository {
    pool: DbPool,
}

impl DieselWheelSpecificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WheelSpecificationRepository for DieselWheelSpecificationRepository {
    async fn create(&self, record: &WheelSpecification) -> Result<(), MaintenanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewWheelSpecificationRow {
            form_number: record.form_number.as_str(),
            submitted_by: *record.submitted_by.as_uuid(),
            submitted_date: record.submitted_date,
            status: record.status.as_str(),
            fields: encode(&record.measurements, "wheel measurements")?,
            created_at: record.created_at,
            updated_at: record.updated_at,
        };
        diesel::insert_into(wheel_specifications::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_insert_error(&record.form_number))
    }

    async fn find_by_form_number(
        &self,
        form_number: &FormNumber,
    ) -> Result<Option<WheelSpecification>, MaintenanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = wheel_specifications::table
            .filter(wheel_specifications::form_number.eq(form_number.as_str()))
            .select(WheelSpecificationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_wheel_specification).transpose()
    }

    async fn list(
        &self,
        filter: &WheelSpecificationFilter,
    ) -> Result<Vec<WheelSpecification>, MaintenanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = wheel_specifications::table.into_boxed();
        if let Some(needle) = &filter.form_number {
            query = query.filter(wheel_specifications::form_number.ilike(contains_pattern(needle)));
        }
        if let Some(submitted_by) = filter.submitted_by {
            query = query.filter(wheel_specifications::submitted_by.eq(*submitted_by.as_uuid()));
        }
        if let Some(date) = filter.submitted_date {
            query = query.filter(wheel_specifications::submitted_date.eq(date));
        }
        if let Some(status) = filter.status {
            query = query.filter(wheel_specifications::status.eq(status.as_str()));
        }
        let rows: Vec<WheelSpecificationRow> = query
            .order((
                wheel_specifications::created_at.desc(),
                wheel_specifications::form_number,
            ))
            .select(WheelSpecificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_wheel_specification).collect()
    }

    async fn transition(
        &self,
        form_number: &FormNumber,
        expected: RecordStatus,
        next: RecordStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, MaintenanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(
            wheel_specifications::table.filter(
                wheel_specifications::form_number
                    .eq(form_number.as_str())
                    .and(wheel_specifications::status.eq(expected.as_str())),
            ),
        )
        .set((
            wheel_specifications::status.eq(next.as_str()),
            wheel_specifications::updated_at.eq(at),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}

/// Diesel-backed implementation of [`BogieChecksheetRepository`].
#[derive(Clone)]
pub struct DieselBogieChecksheetRepository {
    pool: DbPool,
}

impl DieselBogieChecksheetRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BogieChecksheetRepository for DieselBogieChecksheetRepository {
    async fn create(&self, record: &BogieChecksheet) -> Result<(), MaintenanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewBogieChecksheetRow {
            form_number: record.form_number.as_str(),
            inspection_by: *record.inspection_by.as_uuid(),
            inspection_date: record.inspection_date,
            status: record.status.as_str(),
            bogie_no: &record.details.bogie_no,
            bogie_details: encode(&record.details, "bogie details")?,
            bogie_checksheet: encode(&record.conditions, "bogie checksheet")?,
            bmbc_checksheet: encode(&record.bmbc, "bmbc checksheet")?,
            created_at: record.created_at,
            updated_at: record.updated_at,
        };
        diesel::insert_into(bogie_checksheets::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_insert_error(&record.form_number))
    }

    async fn find_by_form_number(
        &self,
        form_number: &FormNumber,
    ) -> Result<Option<BogieChecksheet>, MaintenanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = bogie_checksheets::table
            .filter(bogie_checksheets::form_number.eq(form_number.as_str()))
            .select(BogieChecksheetRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_bogie_checksheet).transpose()
    }

    async fn list(
        &self,
        filter: &BogieChecksheetFilter,
    ) -> Result<Vec<BogieChecksheet>, MaintenanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = bogie_checksheets::table.into_boxed();
        if let Some(needle) = &filter.form_number {
            query = query.filter(bogie_checksheets::form_number.ilike(contains_pattern(needle)));
        }
        if let Some(inspection_by) = filter.inspection_by {
            query = query.filter(bogie_checksheets::inspection_by.eq(*inspection_by.as_uuid()));
        }
        if let Some(date) = filter.inspection_date {
            query = query.filter(bogie_checksheets::inspection_date.eq(date));
        }
        if let Some(needle) = &filter.bogie_no {
            query = query.filter(bogie_checksheets::bogie_no.ilike(contains_pattern(needle)));
        }
        if let Some(status) = filter.status {
            query = query.filter(bogie_checksheets::status.eq(status.as_str()));
        }
        let rows: Vec<BogieChecksheetRow> = query
            .order((
                bogie_checksheets::created_at.desc(),
                bogie_checksheets::form_number,
            ))
            .select(BogieChecksheetRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_bogie_checksheet).collect()
    }

    async fn transition(
        &self,
        form_number: &FormNumber,
        expected: RecordStatus,
        next: RecordStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, MaintenanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(
            bogie_checksheets::table.filter(
                bogie_checksheets::form_number
                    .eq(form_number.as_str())
                    .and(bogie_checksheets::status.eq(expected.as_str())),
            ),
        )
        .set((
            bogie_checksheets::status.eq(next.as_str()),
            bogie_checksheets::updated_at.eq(at),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}
