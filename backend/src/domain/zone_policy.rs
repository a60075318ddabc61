//! Read-only operator configuration consumed by the zone coordinator.

use pagination::PageBounds;

use super::{Fqdn, SoaPolicy, Ttl};

/// Nameservers, timers and page limits fixed at startup.
///
/// # Examples
/// ```
/// use zone_api::domain::{Fqdn, ZonePolicy};
///
/// let policy = ZonePolicy::default()
///     .with_nameservers(vec![Fqdn::new("ns1.example.net.").unwrap()]);
/// assert_eq!(policy.nameservers().len(), 1);
/// assert_eq!(policy.ns_ttl().seconds(), 9600);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonePolicy {
    nameservers: Vec<Fqdn>,
    ns_ttl: Ttl,
    soa: SoaPolicy,
    page_bounds: PageBounds,
}

impl Default for ZonePolicy {
    fn default() -> Self {
        Self {
            nameservers: Vec::new(),
            ns_ttl: Ttl::NS_DEFAULT,
            soa: SoaPolicy::default(),
            page_bounds: PageBounds::default(),
        }
    }
}

impl ZonePolicy {
    /// Nameservers announced in every new zone.
    #[must_use]
    pub fn with_nameservers(mut self, nameservers: Vec<Fqdn>) -> Self {
        self.nameservers = nameservers;
        self
    }

    /// TTL of the synthesised NS records.
    #[must_use]
    pub fn with_ns_ttl(mut self, ttl: Ttl) -> Self {
        self.ns_ttl = ttl;
        self
    }

    /// SOA timers.
    #[must_use]
    pub fn with_soa(mut self, soa: SoaPolicy) -> Self {
        self.soa = soa;
        self
    }

    /// Limits applied to list endpoints.
    #[must_use]
    pub fn with_page_bounds(mut self, bounds: PageBounds) -> Self {
        self.page_bounds = bounds;
        self
    }

    pub fn nameservers(&self) -> &[Fqdn] {
        &self.nameservers
    }

    pub fn ns_ttl(&self) -> Ttl {
        self.ns_ttl
    }

    pub fn soa(&self) -> SoaPolicy {
        self.soa
    }

    pub fn page_bounds(&self) -> PageBounds {
        self.page_bounds
    }
}
