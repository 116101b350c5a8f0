use serde::Deserialize;
use std::num::{NonZeroU32, NonZeroU64};

use crate::util::Sensitive;

/// Configuration for connecting to the Postgres database. The whole
/// section is optional: when no connection URL is configured the record
/// store falls back to the JSON-file backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    /// Connection URL.
    ///
    /// **Environment variables**:
    /// - `KINESA_DB_URL` or `DATABASE_URL`
    pub url: Sensitive<String>,
    /// Maximum amount of pool connections the database can handle.
    ///
    /// **Environment variables**:
    /// - `KINESA_DB_POOL_SIZE`
    #[serde(default = "Database::default_pool_size")]
    pub pool_size: NonZeroU32,
    /// Minimum idle database connections kept around to avoid wasting
    /// resources on the database server.
    ///
    /// **Environment variables**:
    /// - `KINESA_DB_MIN_IDLE`
    #[serde(default)]
    pub min_idle: Option<NonZeroU32>,
    /// How long to wait for a connection to be acknowledged or
    /// successfully established.
    ///
    /// **Environment variables**:
    /// - `KINESA_DB_TIMEOUT_SECS`
    #[serde(default = "Database::default_timeout_secs")]
    pub timeout_secs: NonZeroU64,
    /// Forces database connections to be encrypted with TLS
    /// (if possible).
    ///
    /// **Environment variables**:
    /// - `KINESA_DB_ENFORCE_TLS`
    #[serde(default = "Database::default_enforce_tls")]
    pub enforce_tls: bool,
}

impl Database {
    const DEFAULT_POOL_SIZE: u32 = 5;
    const DEFAULT_TIMEOUT_SECS: u64 = 5;

    // Required by serde
    const fn default_pool_size() -> NonZeroU32 {
        match NonZeroU32::new(Self::DEFAULT_POOL_SIZE) {
            Some(n) => n,
            None => panic!("DEFAULT_POOL_SIZE is accidentally set to 0"),
        }
    }

    const fn default_timeout_secs() -> NonZeroU64 {
        match NonZeroU64::new(Self::DEFAULT_TIMEOUT_SECS) {
            Some(n) => n,
            None => panic!("DEFAULT_TIMEOUT_SECS is accidentally set to 0"),
        }
    }

    const fn default_enforce_tls() -> bool {
        true
    }
}
