//! Tests for the zone coordinator.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use pagination::{PageQuery, PageRequest};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockZoneRepository, ZoneMutation};
use crate::domain::{
    ApiToken, Email, ErrorCode, Fqdn, PasswordHash, Serial, Ttl, UserId, UserProfile, Username,
};

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0)
            .single()
            .expect("valid fixture timestamp")
    }
}

fn user(id: i64, is_admin: bool) -> User {
    User::new(
        UserId::new(id),
        UserProfile {
            email: Email::new(format!("host.master{id}@example.org")).expect("email"),
            username: Username::new(format!("user{id}")).expect("username"),
            is_admin,
        },
        PasswordHash::new("digest"),
        ApiToken::new(format!("token-{id}")),
    )
}

fn fqdn(name: &str) -> Fqdn {
    Fqdn::new(name).expect("valid fqdn")
}

fn domain(id: i64, owner: i64, name: &str, serial: u32) -> Domain {
    Domain::new(
        DomainId::new(id),
        UserId::new(owner),
        fqdn(name),
        "zone",
        Serial::new(serial),
    )
}

fn record_data(name: &str, code: u16) -> RecordData {
    RecordData::try_new(
        fqdn(name),
        "192.0.2.1",
        RecordType::new(code).expect("record type"),
        Ttl::new(300).expect("ttl"),
    )
    .expect("record data")
}

fn record(id: i64, domain_id: i64, name: &str, code: u16) -> Record {
    Record::new(
        RecordId::new(id),
        DomainId::new(domain_id),
        record_data(name, code),
    )
}

#[fixture]
fn policy() -> ZonePolicy {
    ZonePolicy::default().with_nameservers(vec![fqdn("ns1.example.net."), fqdn("ns2.example.net.")])
}

fn make_service(repo: MockZoneRepository, policy: ZonePolicy) -> ZoneService<MockZoneRepository> {
    ZoneService::new(Arc::new(repo), policy, Arc::new(FixtureClock))
}

fn expect_domain(repo: &mut MockZoneRepository, found: Option<Domain>) {
    repo.expect_find_domain()
        .times(1)
        .return_once(move |_| Ok(found));
}

#[rstest]
#[tokio::test]
async fn list_domains_scopes_non_admins_to_their_own(policy: ZonePolicy) {
    let mut repo = MockZoneRepository::new();
    repo.expect_list_domains()
        .withf(|owner, page| *owner == Some(UserId::new(7)) && page.count() == 10)
        .times(1)
        .return_once(|_, _| Ok(vec![domain(1, 7, "example.org.", 0)]));

    let service = make_service(repo, policy);
    let domains = service
        .list_domains(&user(7, false), PageQuery::default())
        .await
        .expect("list succeeds");
    assert_eq!(domains.len(), 1);
}

#[rstest]
#[tokio::test]
async fn list_domains_is_unscoped_and_clamped_for_admins(policy: ZonePolicy) {
    let mut repo = MockZoneRepository::new();
    repo.expect_list_domains()
        .withf(|owner, page: &PageRequest| owner.is_none() && page.count() == 10 && page.start() == 0)
        .times(1)
        .return_once(|_, _| Ok(Vec::new()));

    let service = make_service(repo, policy);
    let query = PageQuery {
        count: Some(999),
        start: Some(-4),
    };
    service
        .list_domains(&user(1, true), query)
        .await
        .expect("list succeeds");
}

#[rstest]
#[case::missing(None, ErrorCode::NotFound)]
#[case::foreign(Some(domain(3, 1, "example.org.", 0)), ErrorCode::Forbidden)]
#[tokio::test]
async fn get_domain_checks_existence_before_access(
    policy: ZonePolicy,
    #[case] found: Option<Domain>,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockZoneRepository::new();
    expect_domain(&mut repo, found);

    let service = make_service(repo, policy);
    let error = service
        .get_domain(&user(2, false), DomainId::new(3))
        .await
        .expect_err("access refused");
    assert_eq!(error.code(), expected);
}

#[rstest]
#[tokio::test]
async fn admin_reads_any_domain(policy: ZonePolicy) {
    let mut repo = MockZoneRepository::new();
    expect_domain(&mut repo, Some(domain(3, 1, "example.org.", 4)));

    let service = make_service(repo, policy);
    let found = service
        .get_domain(&user(9, true), DomainId::new(3))
        .await
        .expect("admin access");
    assert_eq!(found.serial(), Serial::new(4));
}

#[rstest]
#[tokio::test]
async fn create_domain_normalises_owner_and_adds_nameservers(policy: ZonePolicy) {
    let mut repo = MockZoneRepository::new();
    repo.expect_fqdn_exists()
        .times(1)
        .return_once(|_| Ok(false));
    repo.expect_create_domain()
        .withf(|new_domain, records| {
            new_domain.owner_id == UserId::new(5)
                && records.len() == 2
                && records.iter().all(|r| {
                    r.record_type == RecordType::NS
                        && r.ttl == Ttl::NS_DEFAULT
                        && r.fqdn.as_ref() == "example.org."
                })
                && records.first().map(|r| r.content.as_str()) == Some("ns1.example.net.")
        })
        .times(1)
        .return_once(|new_domain, _| {
            Ok(Domain::new(
                DomainId::new(1),
                new_domain.owner_id,
                new_domain.fqdn.clone(),
                new_domain.description.clone(),
                Serial::default(),
            ))
        });

    let service = make_service(repo, policy);
    let draft = DomainDraft {
        owner_id: Some(UserId::new(99)),
        fqdn: fqdn("example.org."),
        description: "primary".to_owned(),
    };
    let created = service
        .create_domain(&user(5, false), draft)
        .await
        .expect("domain created");
    assert_eq!(created.owner_id(), UserId::new(5));
    assert_eq!(created.serial(), Serial::default());
}

#[rstest]
#[tokio::test]
async fn create_domain_rejects_duplicate_fqdn(policy: ZonePolicy) {
    let mut repo = MockZoneRepository::new();
    repo.expect_fqdn_exists().times(1).return_once(|_| Ok(true));

    let service = make_service(repo, policy);
    let draft = DomainDraft {
        owner_id: None,
        fqdn: fqdn("example.org."),
        description: String::new(),
    };
    let error = service
        .create_domain(&user(1, true), draft)
        .await
        .expect_err("duplicate");
    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), DUPLICATE_FQDN_MESSAGE);
}

#[rstest]
#[tokio::test]
async fn create_domain_maps_racing_unique_violation_to_conflict(policy: ZonePolicy) {
    let mut repo = MockZoneRepository::new();
    repo.expect_fqdn_exists().times(1).return_once(|_| Ok(false));
    repo.expect_create_domain()
        .times(1)
        .return_once(|_, _| Err(ZoneRepositoryError::duplicate_fqdn("example.org.")));

    let service = make_service(repo, policy);
    let draft = DomainDraft {
        owner_id: None,
        fqdn: fqdn("example.org."),
        description: String::new(),
    };
    let error = service
        .create_domain(&user(1, true), draft)
        .await
        .expect_err("duplicate");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn update_domain_keeps_identity_fields(policy: ZonePolicy) {
    let mut repo = MockZoneRepository::new();
    expect_domain(&mut repo, Some(domain(3, 2, "example.org.", 8)));
    repo.expect_update_domain()
        .withf(|d| {
            d.id() == DomainId::new(3)
                && d.owner_id() == UserId::new(2)
                && d.fqdn().as_ref() == "example.org."
                && d.serial() == Serial::new(8)
                && d.description() == "zone"
        })
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(repo, policy);
    let changes = DomainChanges {
        owner_id: Some(UserId::new(40)),
        description: None,
    };
    service
        .update_domain(&user(2, false), DomainId::new(3), changes)
        .await
        .expect("update succeeds");
}

#[rstest]
#[tokio::test]
async fn delete_domain_requires_access(policy: ZonePolicy) {
    let mut repo = MockZoneRepository::new();
    expect_domain(&mut repo, Some(domain(3, 1, "example.org.", 0)));

    let service = make_service(repo, policy);
    let error = service
        .delete_domain(&user(2, false), DomainId::new(3))
        .await
        .expect_err("foreign domain");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn delete_domain_removes_owned_zone(policy: ZonePolicy) {
    let mut repo = MockZoneRepository::new();
    expect_domain(&mut repo, Some(domain(3, 2, "example.org.", 0)));
    repo.expect_delete_domain()
        .withf(|id| *id == DomainId::new(3))
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(repo, policy);
    service
        .delete_domain(&user(2, false), DomainId::new(3))
        .await
        .expect("delete succeeds");
}

#[rstest]
#[tokio::test]
async fn create_record_refreshes_soa_with_acting_user(policy: ZonePolicy) {
    let mut repo = MockZoneRepository::new();
    expect_domain(&mut repo, Some(domain(3, 2, "example.org.", 0)));
    repo.expect_mutate_zone()
        .withf(|id, mutation, stamp| {
            *id == DomainId::new(3)
                && matches!(mutation, RecordMutation::Create(data) if data.fqdn.as_ref() == "www.example.org.")
                && stamp.date_stamp() == "20261018"
                && stamp.contact() == r"host\.master2.example.org."
        })
        .times(1)
        .return_once(|_, _, _| {
            Ok(ZoneMutation {
                record: Some(record(10, 3, "www.example.org.", 1)),
                domain: domain(3, 2, "example.org.", 1),
            })
        });

    let service = make_service(repo, policy);
    let draft = RecordDraft {
        domain_id: DomainId::new(3),
        data: record_data("www.example.org.", 1),
    };
    let created = service
        .create_record(&user(2, false), draft)
        .await
        .expect("record created");
    assert_eq!(created.id(), RecordId::new(10));
}

#[rstest]
#[tokio::test]
async fn create_record_outside_zone_is_rejected_before_writing(policy: ZonePolicy) {
    let mut repo = MockZoneRepository::new();
    expect_domain(&mut repo, Some(domain(3, 2, "example.org.", 0)));

    let service = make_service(repo, policy);
    let draft = RecordDraft {
        domain_id: DomainId::new(3),
        data: record_data("evil.com.", 1),
    };
    let error = service
        .create_record(&user(2, false), draft)
        .await
        .expect_err("containment");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), CONTAINMENT_MESSAGE);
}

#[rstest]
#[tokio::test]
async fn create_record_with_suffix_but_no_label_boundary_is_rejected(policy: ZonePolicy) {
    let mut repo = MockZoneRepository::new();
    expect_domain(&mut repo, Some(domain(3, 2, "example.org.", 0)));

    let service = make_service(repo, policy);
    let draft = RecordDraft {
        domain_id: DomainId::new(3),
        data: record_data("badexample.org.", 1),
    };
    let error = service
        .create_record(&user(2, false), draft)
        .await
        .expect_err("containment");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn create_record_refuses_direct_soa(policy: ZonePolicy) {
    let service = make_service(MockZoneRepository::new(), policy);
    let draft = RecordDraft {
        domain_id: DomainId::new(3),
        data: record_data("example.org.", RecordType::SOA.code()),
    };
    let error = service
        .create_record(&user(1, true), draft)
        .await
        .expect_err("soa is engine-owned");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn create_record_in_foreign_zone_is_forbidden(policy: ZonePolicy) {
    let mut repo = MockZoneRepository::new();
    expect_domain(&mut repo, Some(domain(3, 1, "example.org.", 0)));

    let service = make_service(repo, policy);
    let draft = RecordDraft {
        domain_id: DomainId::new(3),
        data: record_data("www.example.org.", 1),
    };
    let error = service
        .create_record(&user(2, false), draft)
        .await
        .expect_err("foreign zone");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn update_record_refuses_the_soa_record(policy: ZonePolicy) {
    let mut repo = MockZoneRepository::new();
    repo.expect_find_record()
        .times(1)
        .return_once(|_| Ok(Some(record(4, 3, "example.org.", RecordType::SOA.code()))));
    expect_domain(&mut repo, Some(domain(3, 2, "example.org.", 1)));

    let service = make_service(repo, policy);
    let error = service
        .update_record(
            &user(2, false),
            RecordId::new(4),
            record_data("example.org.", 1),
        )
        .await
        .expect_err("soa is engine-owned");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn update_record_keeps_the_record_identity(policy: ZonePolicy) {
    let mut repo = MockZoneRepository::new();
    repo.expect_find_record()
        .times(1)
        .return_once(|_| Ok(Some(record(4, 3, "www.example.org.", 1))));
    expect_domain(&mut repo, Some(domain(3, 2, "example.org.", 1)));
    repo.expect_mutate_zone()
        .withf(|id, mutation, _| {
            *id == DomainId::new(3)
                && matches!(mutation, RecordMutation::Update { id, .. } if *id == RecordId::new(4))
        })
        .times(1)
        .return_once(|_, _, _| {
            Ok(ZoneMutation {
                record: Some(record(4, 3, "mail.example.org.", 1)),
                domain: domain(3, 2, "example.org.", 2),
            })
        });

    let service = make_service(repo, policy);
    let updated = service
        .update_record(
            &user(2, false),
            RecordId::new(4),
            record_data("mail.example.org.", 1),
        )
        .await
        .expect("update succeeds");
    assert_eq!(updated.domain_id(), DomainId::new(3));
}

#[rstest]
#[case("evil.com.")]
#[case("badexample.org.")]
#[tokio::test]
async fn update_record_cannot_move_a_name_out_of_its_zone(
    policy: ZonePolicy,
    #[case] target: &str,
) {
    let mut repo = MockZoneRepository::new();
    repo.expect_find_record()
        .times(1)
        .return_once(|_| Ok(Some(record(4, 3, "www.example.org.", 1))));
    expect_domain(&mut repo, Some(domain(3, 2, "example.org.", 1)));
    repo.expect_mutate_zone().times(0);

    let service = make_service(repo, policy);
    let error = service
        .update_record(&user(2, false), RecordId::new(4), record_data(target, 1))
        .await
        .expect_err("containment");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), CONTAINMENT_MESSAGE);
}

#[rstest]
#[case::update(true)]
#[case::delete(false)]
#[tokio::test]
async fn record_writes_in_foreign_zones_are_forbidden(policy: ZonePolicy, #[case] update: bool) {
    let mut repo = MockZoneRepository::new();
    repo.expect_find_record()
        .times(1)
        .return_once(|_| Ok(Some(record(4, 3, "www.example.org.", 1))));
    expect_domain(&mut repo, Some(domain(3, 1, "example.org.", 1)));
    repo.expect_mutate_zone().times(0);

    let service = make_service(repo, policy);
    let stranger = user(2, false);
    let error = if update {
        service
            .update_record(&stranger, RecordId::new(4), record_data("www.example.org.", 1))
            .await
            .map(|_| ())
    } else {
        service.delete_record(&stranger, RecordId::new(4)).await
    }
    .expect_err("foreign zone");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn delete_record_with_missing_parent_is_not_found(policy: ZonePolicy) {
    let mut repo = MockZoneRepository::new();
    repo.expect_find_record()
        .times(1)
        .return_once(|_| Ok(Some(record(4, 3, "www.example.org.", 1))));
    expect_domain(&mut repo, None);

    let service = make_service(repo, policy);
    let error = service
        .delete_record(&user(1, true), RecordId::new(4))
        .await
        .expect_err("orphan");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), DOMAIN_NOT_FOUND_MESSAGE);
}

#[rstest]
#[tokio::test]
async fn delete_record_refreshes_the_zone(policy: ZonePolicy) {
    let mut repo = MockZoneRepository::new();
    repo.expect_find_record()
        .times(1)
        .return_once(|_| Ok(Some(record(4, 3, "www.example.org.", 1))));
    expect_domain(&mut repo, Some(domain(3, 2, "example.org.", 1)));
    repo.expect_mutate_zone()
        .withf(|_, mutation, _| matches!(mutation, RecordMutation::Delete { .. }))
        .times(1)
        .return_once(|_, _, _| {
            Ok(ZoneMutation {
                record: None,
                domain: domain(3, 2, "example.org.", 2),
            })
        });

    let service = make_service(repo, policy);
    service
        .delete_record(&user(2, false), RecordId::new(4))
        .await
        .expect("delete succeeds");
}

#[rstest]
#[case::connection(ZoneRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case::query(ZoneRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[case::vanished(ZoneRepositoryError::domain_not_found(3_i64), ErrorCode::NotFound)]
#[tokio::test]
async fn store_failures_map_to_error_codes(
    policy: ZonePolicy,
    #[case] failure: ZoneRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockZoneRepository::new();
    repo.expect_find_domain()
        .times(1)
        .return_once(move |_| Err(failure));

    let service = make_service(repo, policy);
    let error = service
        .get_domain(&user(1, true), DomainId::new(3))
        .await
        .expect_err("store failure");
    assert_eq!(error.code(), expected);
}
