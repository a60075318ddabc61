//! Operator settings loaded via OrthoConfig from flags, `ZONE_API_*`
//! environment variables and config files.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageBounds, PageBoundsError};
use serde::Deserialize;

use crate::domain::{
    DEFAULT_SOA_EXPIRE, DEFAULT_SOA_MINIMUM, DEFAULT_SOA_REFRESH, DEFAULT_SOA_RETRY, Fqdn,
    FqdnValidationError, RecordValidationError, SoaPolicy, Ttl, UserDraft, UserValidationError,
    ZonePolicy,
};
use crate::outbound::security::{
    BcryptPasswordHasher, DEFAULT_PASSWORD_COST, MAX_PASSWORD_COST, MIN_PASSWORD_COST,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Settings that could not be turned into a runnable configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address {value}: {message}")]
    BindAddr { value: String, message: String },
    /// An entry of `nameservers` is not a fully qualified name.
    #[error("invalid nameserver {value}: {source}")]
    Nameserver {
        value: String,
        source: FqdnValidationError,
    },
    /// A TTL setting is zero.
    #[error("invalid {field}: {source}")]
    Ttl {
        field: &'static str,
        source: RecordValidationError,
    },
    /// `page_size_max` is zero.
    #[error("invalid page_size_max: {0}")]
    PageBounds(#[from] PageBoundsError),
    /// `password_cost` is outside bcrypt's range.
    #[error("password_cost {value} is outside {MIN_PASSWORD_COST}..={MAX_PASSWORD_COST}")]
    PasswordCost { value: u32 },
    /// Only some of the `admin_*` settings are present.
    #[error("admin_email, admin_username and admin_password must be set together")]
    IncompleteAdmin,
    /// The `admin_*` settings do not form a valid account.
    #[error("invalid bootstrap administrator: {0}")]
    AdminAccount(#[from] UserValidationError),
}

/// Raw operator settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ZONE_API")]
pub struct ServerSettings {
    /// Listen address; defaults to `0.0.0.0:8080`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Nameservers announced in new zones; comma separated in the environment.
    #[serde(default)]
    #[ortho_config(default = vec![], merge_strategy = "append")]
    pub nameservers: Vec<String>,
    /// SOA refresh timer in seconds.
    pub soa_refresh: Option<u32>,
    /// SOA retry timer in seconds.
    pub soa_retry: Option<u32>,
    /// SOA expire timer in seconds.
    pub soa_expire: Option<u32>,
    /// SOA negative-caching TTL in seconds.
    pub soa_minimum: Option<u32>,
    /// TTL of the SOA record.
    pub soa_ttl: Option<u32>,
    /// TTL of the NS records created with each zone.
    pub ns_ttl: Option<u32>,
    /// Largest page a list endpoint returns.
    pub page_size_max: Option<u32>,
    /// bcrypt work factor for stored passwords; defaults to 14.
    pub password_cost: Option<u32>,
    /// Email of the administrator seeded into the in-memory store.
    pub admin_email: Option<String>,
    /// Login name of the seeded administrator.
    pub admin_username: Option<String>,
    /// Password of the seeded administrator.
    pub admin_password: Option<String>,
    /// Apply pending migrations before serving.
    #[ortho_config(default = false)]
    pub migrate: bool,
}

fn ttl(field: &'static str, value: Option<u32>, fallback: Ttl) -> Result<Ttl, SettingsError> {
    value.map_or(Ok(fallback), |seconds| {
        Ttl::new(seconds).map_err(|source| SettingsError::Ttl { field, source })
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|entry| !entry.trim().is_empty())
}

impl ServerSettings {
    /// Parsed listen address.
    ///
    /// # Errors
    ///
    /// [`SettingsError::BindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: value.to_owned(),
            message: err.to_string(),
        })
    }

    /// Configured database URL, if any.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// Validated nameserver list; blank entries are skipped.
    ///
    /// # Errors
    ///
    /// [`SettingsError::Nameserver`] for the first invalid entry.
    pub fn nameservers(&self) -> Result<Vec<Fqdn>, SettingsError> {
        self.nameservers
            .iter()
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                Fqdn::new(entry).map_err(|source| SettingsError::Nameserver {
                    value: entry.to_owned(),
                    source,
                })
            })
            .collect()
    }

    /// Password hasher at the configured work factor.
    ///
    /// # Errors
    ///
    /// [`SettingsError::PasswordCost`] when bcrypt would reject the cost.
    pub fn password_hasher(&self) -> Result<BcryptPasswordHasher, SettingsError> {
        let cost = self.password_cost.unwrap_or(DEFAULT_PASSWORD_COST);
        if (MIN_PASSWORD_COST..=MAX_PASSWORD_COST).contains(&cost) {
            Ok(BcryptPasswordHasher::new(cost))
        } else {
            Err(SettingsError::PasswordCost { value: cost })
        }
    }

    /// Administrator account to seed at startup, if configured.
    ///
    /// # Errors
    ///
    /// [`SettingsError::IncompleteAdmin`] when only some `admin_*` values are
    /// present, [`SettingsError::AdminAccount`] when they do not validate.
    pub fn bootstrap_admin(&self) -> Result<Option<UserDraft>, SettingsError> {
        match (
            non_blank(self.admin_email.as_deref()),
            non_blank(self.admin_username.as_deref()),
            non_blank(self.admin_password.as_deref()),
        ) {
            (None, None, None) => Ok(None),
            (Some(email), Some(username), Some(password)) => Ok(Some(
                UserDraft::try_from_parts(email, username, Some(password), true)?,
            )),
            _ => Err(SettingsError::IncompleteAdmin),
        }
    }

    /// Build the policy consumed by the zone coordinator.
    ///
    /// # Errors
    ///
    /// Any invalid nameserver, zero TTL or zero page size.
    pub fn zone_policy(&self) -> Result<ZonePolicy, SettingsError> {
        let soa = SoaPolicy::new(
            self.soa_refresh.unwrap_or(DEFAULT_SOA_REFRESH),
            self.soa_retry.unwrap_or(DEFAULT_SOA_RETRY),
            self.soa_expire.unwrap_or(DEFAULT_SOA_EXPIRE),
            self.soa_minimum.unwrap_or(DEFAULT_SOA_MINIMUM),
            ttl("soa_ttl", self.soa_ttl, Ttl::SOA_DEFAULT)?,
        );
        let max = self.page_size_max.unwrap_or(MAX_PAGE_SIZE);
        let bounds = PageBounds::new(DEFAULT_PAGE_SIZE.min(max), max)?;
        Ok(ZonePolicy::default()
            .with_nameservers(self.nameservers()?)
            .with_ns_ttl(ttl("ns_ttl", self.ns_ttl, Ttl::NS_DEFAULT)?)
            .with_soa(soa)
            .with_page_bounds(bounds))
    }
}
