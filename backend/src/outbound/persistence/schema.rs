//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly; regenerate
//! with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Accounts and their bearer tokens.
    users (id) {
        id -> Int8,
        email -> Varchar,
        username -> Varchar,
        password_hash -> Text,
        token -> Text,
        is_admin -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Zone apexes; `serial` holds an unsigned 32-bit value.
    domains (id) {
        id -> Int8,
        owner_id -> Int8,
        fqdn -> Varchar,
        description -> Text,
        serial -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Resource records; at most one row per domain has `record_type = 6`.
    records (id) {
        id -> Int8,
        domain_id -> Int8,
        fqdn -> Varchar,
        content -> Text,
        record_type -> Int4,
        ttl -> Int8,
    }
}

diesel::joinable!(records -> domains (domain_id));
diesel::allow_tables_to_appear_in_same_query!(domains, records, users);
