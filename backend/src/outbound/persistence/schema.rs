//! Diesel table definitions matching `backend/migrations`.

diesel::table! {
    /// Local identity records.
    ///
    /// `email` is stored normalised and carries a unique index.
    identities (id) {
        id -> Uuid,
        email -> Varchar,
        /// Argon2id PHC string; absent for identities created without a password.
        password_hash -> Nullable<Text>,
        email_confirmed -> Bool,
        created_at -> Timestamptz,
    }
}
