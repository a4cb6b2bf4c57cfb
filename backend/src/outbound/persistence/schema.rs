//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Phone-identified accounts.
    ///
    /// `phone_number`, `email`, and `employee_id` carry the unique
    /// constraints `users_*_key`; adapters map violations back to the column.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Login identifier, unique.
        phone_number -> Varchar,
        /// Optional, unique when present.
        email -> Nullable<Varchar>,
        /// Argon2id PHC string.
        password_hash -> Text,
        first_name -> Varchar,
        last_name -> Varchar,
        bio -> Text,
        date_of_birth -> Nullable<Date>,
        address_line_1 -> Varchar,
        address_line_2 -> Varchar,
        city -> Varchar,
        state -> Varchar,
        postal_code -> Varchar,
        country -> Varchar,
        /// Optional, unique when present.
        employee_id -> Nullable<Varchar>,
        department -> Varchar,
        position -> Varchar,
        /// Self-reference; never equal to `id`.
        manager_id -> Nullable<Uuid>,
        is_staff -> Bool,
        /// Soft-delete flag.
        is_active -> Bool,
        date_joined -> Timestamptz,
        last_login -> Nullable<Timestamptz>,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Issued refresh tokens. A token is usable while `revoked_at` is null
    /// and `expires_at` lies in the future.
    refresh_tokens (jti) {
        /// Token identifier carried in the `jti` claim.
        jti -> Uuid,
        user_id -> Uuid,
        issued_at -> Timestamptz,
        expires_at -> Timestamptz,
        /// Set when the token is rotated or revoked.
        revoked_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Dynamic form definitions.
    forms (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Text,
        /// One of `contact`, `feedback`, `survey`, `application`, `other`.
        form_type -> Varchar,
        is_active -> Bool,
        created_by -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Fields of a form, keyed by the form and the field's payload name.
    form_fields (form_id, name) {
        form_id -> Uuid,
        name -> Varchar,
        label -> Varchar,
        field_type -> Varchar,
        placeholder -> Varchar,
        help_text -> Text,
        required -> Bool,
        display_order -> Int4,
        position -> Int4,
        /// Array of `{value, label}` objects.
        options -> Jsonb,
        /// Open rule map for the field type.
        validation_rules -> Jsonb,
    }
}

diesel::table! {
    /// Form responses and their review state.
    submissions (id) {
        id -> Uuid,
        form_id -> Uuid,
        submitted_by -> Uuid,
        payload -> Jsonb,
        /// One of `pending`, `reviewed`, `approved`, `rejected`.
        status -> Varchar,
        submitted_at -> Timestamptz,
        reviewed_by -> Nullable<Uuid>,
        reviewed_at -> Nullable<Timestamptz>,
        review_notes -> Text,
    }
}

diesel::table! {
    /// Wheel specification records keyed by their form number.
    wheel_specifications (form_number) {
        form_number -> Varchar,
        submitted_by -> Uuid,
        submitted_date -> Date,
        /// One of `saved`, `submitted`, `reviewed`, `approved`, `rejected`.
        status -> Varchar,
        /// The fifteen measurements keyed by their camelCase names.
        fields -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Bogie checksheets keyed by their form number.
    bogie_checksheets (form_number) {
        form_number -> Varchar,
        inspection_by -> Uuid,
        inspection_date -> Date,
        status -> Varchar,
        /// Copy of `bogie_details.bogieNo` for filtering.
        bogie_no -> Varchar,
        bogie_details -> Jsonb,
        bogie_checksheet -> Jsonb,
        bmbc_checksheet -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(refresh_tokens -> users (user_id));
diesel::joinable!(form_fields -> forms (form_id));
diesel::joinable!(submissions -> forms (form_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    refresh_tokens,
    forms,
    form_fields,
    submissions,
    wheel_specifications,
    bogie_checksheets,
);
