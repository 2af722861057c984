// src/core/scanner/dns_scanner.rs

use tracing::{debug, info, warn};

use crate::config::ReconConfig;
use crate::core::models::{DnsRecords, LookupResult};
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::lookup::Lookup;
use hickory_resolver::proto::rr::RecordType;
use strum::{Display, EnumIter, IntoEnumIterator};

/// The record types enumerated for every target, in lookup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum DnsRecordKind {
    A,
    #[strum(serialize = "AAAA")]
    Aaaa,
    #[strum(serialize = "NS")]
    Ns,
    #[strum(serialize = "MX")]
    Mx,
    #[strum(serialize = "TXT")]
    Txt,
    #[strum(serialize = "CNAME")]
    Cname,
    #[strum(serialize = "SOA")]
    Soa,
}

impl From<DnsRecordKind> for RecordType {
    fn from(kind: DnsRecordKind) -> Self {
        match kind {
            DnsRecordKind::A => RecordType::A,
            DnsRecordKind::Aaaa => RecordType::AAAA,
            DnsRecordKind::Ns => RecordType::NS,
            DnsRecordKind::Mx => RecordType::MX,
            DnsRecordKind::Txt => RecordType::TXT,
            DnsRecordKind::Cname => RecordType::CNAME,
            DnsRecordKind::Soa => RecordType::SOA,
        }
    }
}

/// Resolves the common record types of a domain.
pub struct DnsScanner {
    resolver: TokioAsyncResolver,
}

impl DnsScanner {
    /// Builds a resolver from the system configuration, or the library
    /// defaults if it cannot be read. Each lookup gets a single attempt
    /// bounded by `dns_timeout`.
    pub fn new(config: &ReconConfig) -> Self {
        let (resolver_config, mut opts) = match hickory_resolver::system_conf::read_system_conf() {
            Ok(conf) => conf,
            Err(e) => {
                warn!(error = %e, "Could not read system resolver configuration, using defaults.");
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };
        opts.timeout = config.dns_timeout;
        opts.attempts = 1;
        opts.preserve_intermediates = false;

        Self { resolver: TokioAsyncResolver::tokio(resolver_config, opts) }
    }

    /// Runs a lookup for every `DnsRecordKind`, one after another.
    ///
    /// A failed lookup only empties the list for its own record type.
    ///
    /// # Arguments
    /// * `target` - The domain name to be resolved.
    ///
    /// # Returns
    /// A map from record type name to the record values found.
    pub async fn run_dns_scan(&self, target: &str) -> DnsRecords {
        info!(target, "Starting DNS enumeration.");
        let mut records = DnsRecords::new();

        for kind in DnsRecordKind::iter() {
            let result = self.lookup(target, kind).await;
            records.insert(kind.to_string(), flatten_lookup(kind, result));
        }

        let found: usize = records.values().map(Vec::len).sum();
        info!(target, records = found, "DNS enumeration finished.");
        records
    }

    async fn lookup(&self, target: &str, kind: DnsRecordKind) -> LookupResult {
        debug!(target, record_type = %kind, "Looking up records.");
        match self.resolver.lookup(target, RecordType::from(kind)).await {
            Ok(lookup) => Ok(record_values(&lookup, kind)),
            Err(e) => Err(format!("DNS Error: {}", e)),
        }
    }
}

/// Values of the records of the requested type only; CNAME hops the
/// resolver walked through to reach them are left out.
fn record_values(lookup: &Lookup, kind: DnsRecordKind) -> Vec<String> {
    let wanted = RecordType::from(kind);
    lookup
        .record_iter()
        .filter(|record| record.record_type() == wanted)
        .filter_map(|record| record.data())
        .map(|rdata| rdata.to_string().trim().to_string())
        .collect()
}

/// Collapses a lookup failure into an empty record list, logging the reason.
fn flatten_lookup(kind: DnsRecordKind, result: LookupResult) -> Vec<String> {
    match result {
        Ok(values) => {
            debug!(record_type = %kind, count = values.len(), "Records found.");
            values
        }
        Err(e) => {
            warn!(record_type = %kind, error = %e, "Lookup failed, recording no values.");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_kinds_use_wire_names_in_order() {
        let names: Vec<String> = DnsRecordKind::iter().map(|k| k.to_string()).collect();
        assert_eq!(names, vec!["A", "AAAA", "NS", "MX", "TXT", "CNAME", "SOA"]);
    }

    #[test]
    fn record_kinds_map_to_resolver_types() {
        assert_eq!(RecordType::from(DnsRecordKind::Aaaa), RecordType::AAAA);
        assert_eq!(RecordType::from(DnsRecordKind::Soa), RecordType::SOA);
    }

    #[test]
    fn failed_lookup_becomes_empty_list() {
        assert!(flatten_lookup(DnsRecordKind::Mx, Err("DNS Error: no records".into())).is_empty());
        assert_eq!(
            flatten_lookup(DnsRecordKind::A, Ok(vec!["93.184.216.34".into()])),
            vec!["93.184.216.34".to_string()]
        );
    }

    #[test]
    fn aliased_name_keeps_only_requested_type() {
        use hickory_resolver::proto::op::Query;
        use hickory_resolver::proto::rr::rdata::{A, CNAME};
        use hickory_resolver::proto::rr::{Name, RData, Record};
        use std::net::Ipv4Addr;
        use std::str::FromStr;
        use std::sync::Arc;

        let alias = Name::from_str("www.example.test.").unwrap();
        let canonical = Name::from_str("example.test.").unwrap();
        let records: Arc<[Record]> = Arc::from(vec![
            Record::from_rdata(alias.clone(), 300, RData::CNAME(CNAME(canonical.clone()))),
            Record::from_rdata(canonical, 300, RData::A(A(Ipv4Addr::new(192, 0, 2, 7)))),
        ]);
        let lookup = Lookup::new_with_max_ttl(Query::query(alias, RecordType::A), records);

        assert_eq!(record_values(&lookup, DnsRecordKind::A), vec!["192.0.2.7".to_string()]);
        assert!(record_values(&lookup, DnsRecordKind::Aaaa).is_empty());
        assert_eq!(record_values(&lookup, DnsRecordKind::Cname), vec!["example.test.".to_string()]);
    }

    #[tokio::test]
    #[ignore = "needs a working resolver"]
    async fn every_record_type_is_present_in_result() {
        let scanner = DnsScanner::new(&ReconConfig::default());
        let records = scanner.run_dns_scan("example.com").await;
        assert_eq!(records.len(), 7);
        assert!(!records["A"].is_empty());
    }
}
