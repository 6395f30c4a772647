//! Repository tests against an in-memory sqlite database
//!
//! Exercises the typed CRUD surface with the real migrations applied:
//! org scoping, transaction parameterisation, search filters, and the
//! replace-all semantics of attributes and purpose mappings.

use consent_db::entities::{
    consent, consent_auth_resource, consent_purpose, consent_purpose_mapping, consent_status_audit,
};
use consent_db::repositories::{
    AuthResourceRepository, ConsentAttributeRepository, ConsentFileRepository, ConsentRepository,
    ConsentSearchFilter, PurposeMappingRepository, PurposeRepository, StatusAuditRepository,
};
use consent_db::{establish_connection, run_migrations, DatabaseConfig, DatabaseUrl};
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::collections::BTreeMap;

const ORG: &str = "org-a";
const OTHER_ORG: &str = "org-b";

async fn test_db() -> DatabaseConnection {
    let url = DatabaseUrl::new("sqlite::memory:".to_string()).unwrap();
    let mut config = DatabaseConfig::new(url);
    // a single pooled connection keeps the in-memory database shared
    config.max_connections = 1;
    config.min_connections = 1;

    let db = establish_connection(&config).await.unwrap();
    run_migrations(&db).await.unwrap();
    db
}

fn consent_row(id: &str, org: &str, status: &str, consent_type: &str) -> consent::Model {
    consent::Model {
        consent_id: id.to_string(),
        org_id: org.to_string(),
        client_id: "client-1".to_string(),
        consent_type: consent_type.to_string(),
        current_status: status.to_string(),
        consent_frequency: None,
        validity_time: None,
        recurring_indicator: None,
        data_access_validity_duration: None,
        receipt: None,
        created_time: 1_000,
        updated_time: 1_000,
    }
}

fn auth_row(id: &str, consent_id: &str, user: Option<&str>, status: &str) -> consent_auth_resource::Model {
    consent_auth_resource::Model {
        auth_id: id.to_string(),
        org_id: ORG.to_string(),
        consent_id: consent_id.to_string(),
        auth_type: "authorization_code".to_string(),
        user_id: user.map(str::to_string),
        auth_status: status.to_string(),
        resources: None,
        updated_time: 1_000,
    }
}

#[tokio::test]
async fn test_consent_crud_and_org_scoping() {
    let db = test_db().await;
    let consents = ConsentRepository;

    consents
        .create(&db, &consent_row("c1", ORG, "CREATED", "accounts"))
        .await
        .unwrap();

    let loaded = consents.get_by_id(&db, ORG, "c1").await.unwrap().unwrap();
    assert_eq!(loaded.consent_type, "accounts");
    assert_eq!(loaded.current_status, "CREATED");

    // org mismatch is indistinguishable from absence
    assert!(consents.get_by_id(&db, OTHER_ORG, "c1").await.unwrap().is_none());
    assert!(!consents.exists(&db, OTHER_ORG, "c1").await.unwrap());
    assert!(consents.exists(&db, ORG, "c1").await.unwrap());

    consents
        .update_status(&db, ORG, "c1", "ACTIVE", 2_000)
        .await
        .unwrap();
    let loaded = consents.get_by_id(&db, ORG, "c1").await.unwrap().unwrap();
    assert_eq!(loaded.current_status, "ACTIVE");
    assert_eq!(loaded.updated_time, 2_000);

    // a scoped status update from the wrong org touches nothing
    consents
        .update_status(&db, OTHER_ORG, "c1", "REVOKED", 3_000)
        .await
        .unwrap();
    let loaded = consents.get_by_id(&db, ORG, "c1").await.unwrap().unwrap();
    assert_eq!(loaded.current_status, "ACTIVE");

    consents.delete(&db, ORG, "c1").await.unwrap();
    assert!(consents.get_by_id(&db, ORG, "c1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_consent_update_refreshes_all_but_ids_and_created_time() {
    let db = test_db().await;
    let consents = ConsentRepository;

    consents
        .create(&db, &consent_row("c1", ORG, "CREATED", "accounts"))
        .await
        .unwrap();

    let mut updated = consent_row("c1", ORG, "ACTIVE", "payments");
    updated.consent_frequency = Some(4);
    updated.validity_time = Some(9_999);
    updated.recurring_indicator = Some(true);
    updated.receipt = Some(r#"{"hash":"r1"}"#.to_string());
    updated.updated_time = 5_000;
    consents.update(&db, &updated).await.unwrap();

    let loaded = consents.get_by_id(&db, ORG, "c1").await.unwrap().unwrap();
    assert_eq!(loaded.consent_type, "payments");
    assert_eq!(loaded.current_status, "ACTIVE");
    assert_eq!(loaded.consent_frequency, Some(4));
    assert_eq!(loaded.validity_time, Some(9_999));
    assert_eq!(loaded.receipt.as_deref(), Some(r#"{"hash":"r1"}"#));
    assert_eq!(loaded.updated_time, 5_000);
    assert_eq!(loaded.created_time, 1_000, "created_time never changes");
}

#[tokio::test]
async fn test_search_filters_and_default_paging() {
    let db = test_db().await;
    let consents = ConsentRepository;

    for i in 0..25 {
        let consent_type = if i % 2 == 0 { "accounts" } else { "payments" };
        let status = if i < 5 { "ACTIVE" } else { "CREATED" };
        let mut row = consent_row(&format!("c{}", i), ORG, status, consent_type);
        row.updated_time = 1_000 + i as i64;
        consents.create(&db, &row).await.unwrap();
    }
    consents
        .create(&db, &consent_row("other", OTHER_ORG, "ACTIVE", "accounts"))
        .await
        .unwrap();

    // limit <= 0 falls back to 20, offset < 0 to 0
    let filter = ConsentSearchFilter::default();
    let (rows, total) = consents.search(&db, ORG, &filter).await.unwrap();
    assert_eq!(total, 25);
    assert_eq!(rows.len(), 20);

    let filter = ConsentSearchFilter {
        limit: -7,
        offset: -3,
        ..Default::default()
    };
    let (rows, total) = consents.search(&db, ORG, &filter).await.unwrap();
    assert_eq!(total, 25);
    assert_eq!(rows.len(), 20);

    // IN-list filters compose
    let filter = ConsentSearchFilter {
        consent_types: vec!["accounts".to_string()],
        consent_statuses: vec!["ACTIVE".to_string()],
        ..Default::default()
    };
    let (rows, total) = consents.search(&db, ORG, &filter).await.unwrap();
    assert_eq!(total, 3); // c0, c2, c4
    assert!(rows.iter().all(|r| r.consent_type == "accounts"));
    assert!(rows.iter().all(|r| r.current_status == "ACTIVE"));

    // paging walks newest-first
    let filter = ConsentSearchFilter {
        limit: 10,
        offset: 20,
        ..Default::default()
    };
    let (rows, total) = consents.search(&db, ORG, &filter).await.unwrap();
    assert_eq!(total, 25);
    assert_eq!(rows.len(), 5);

    // tenant isolation
    let (rows, total) = consents
        .search(&db, OTHER_ORG, &ConsentSearchFilter::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].consent_id, "other");
}

#[tokio::test]
async fn test_attribute_replace_all_semantics() {
    let db = test_db().await;
    let attributes = ConsentAttributeRepository;

    let mut first = BTreeMap::new();
    first.insert("channel".to_string(), "mobile".to_string());
    first.insert("locale".to_string(), "en".to_string());
    attributes.replace_all(&db, ORG, "c1", &first).await.unwrap();

    let loaded = attributes.get_all(&db, ORG, "c1").await.unwrap();
    assert_eq!(loaded, first);

    // a replacement drops keys that are absent from the new set
    let mut second = BTreeMap::new();
    second.insert("channel".to_string(), "web".to_string());
    attributes.replace_all(&db, ORG, "c1", &second).await.unwrap();

    let loaded = attributes.get_all(&db, ORG, "c1").await.unwrap();
    assert_eq!(loaded, second);

    // replacing with an empty set clears everything
    attributes
        .replace_all(&db, ORG, "c1", &BTreeMap::new())
        .await
        .unwrap();
    assert!(attributes.get_all(&db, ORG, "c1").await.unwrap().is_empty());

    // other orgs never see the rows
    attributes.replace_all(&db, ORG, "c2", &second).await.unwrap();
    assert!(attributes.get_all(&db, OTHER_ORG, "c2").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_auth_resource_lifecycle() {
    let db = test_db().await;
    let auths = AuthResourceRepository;

    auths
        .create(&db, &auth_row("a1", "c1", Some("u1"), "approved"))
        .await
        .unwrap();
    auths
        .create(&db, &auth_row("a2", "c1", Some("u2"), "created"))
        .await
        .unwrap();
    auths
        .create(&db, &auth_row("a3", "c2", Some("u1"), "approved"))
        .await
        .unwrap();

    assert!(auths.exists(&db, ORG, "a1").await.unwrap());
    assert!(!auths.exists(&db, OTHER_ORG, "a1").await.unwrap());

    let by_consent = auths.get_by_consent_id(&db, ORG, "c1").await.unwrap();
    assert_eq!(by_consent.len(), 2);

    let by_user = auths.get_by_user_id(&db, ORG, "u1").await.unwrap();
    assert_eq!(by_user.len(), 2);
    assert!(by_user.iter().all(|a| a.user_id.as_deref() == Some("u1")));

    // full update keeps ids and parent
    let mut updated = auth_row("a1", "c1", Some("u1"), "rejected");
    updated.resources = Some(r#"{"accounts":["x"]}"#.to_string());
    updated.updated_time = 2_000;
    auths.update(&db, &updated).await.unwrap();

    let loaded = auths.get_by_id(&db, ORG, "a1").await.unwrap().unwrap();
    assert_eq!(loaded.auth_status, "rejected");
    assert_eq!(loaded.resources.as_deref(), Some(r#"{"accounts":["x"]}"#));

    // status fast path
    auths
        .update_status(&db, ORG, "a1", "approved", 3_000)
        .await
        .unwrap();
    let loaded = auths.get_by_id(&db, ORG, "a1").await.unwrap().unwrap();
    assert_eq!(loaded.auth_status, "approved");
    assert_eq!(loaded.updated_time, 3_000);

    // bulk set stays consent-scoped
    auths
        .update_all_status_by_consent_id(&db, ORG, "c1", "sys_revoked", 4_000)
        .await
        .unwrap();
    let by_consent = auths.get_by_consent_id(&db, ORG, "c1").await.unwrap();
    assert!(by_consent.iter().all(|a| a.auth_status == "sys_revoked"));
    let untouched = auths.get_by_id(&db, ORG, "a3").await.unwrap().unwrap();
    assert_eq!(untouched.auth_status, "approved");

    auths.delete(&db, ORG, "a2").await.unwrap();
    assert!(auths.get_by_id(&db, ORG, "a2").await.unwrap().is_none());

    auths.delete_by_consent_id(&db, ORG, "c1").await.unwrap();
    assert!(auths.get_by_consent_id(&db, ORG, "c1").await.unwrap().is_empty());
    assert!(auths.exists(&db, ORG, "a3").await.unwrap());
}

#[tokio::test]
async fn test_status_audit_trail_ordering() {
    let db = test_db().await;
    let audits = StatusAuditRepository;

    for (i, (prev, curr)) in [("", "CREATED"), ("CREATED", "ACTIVE"), ("ACTIVE", "REVOKED")]
        .iter()
        .enumerate()
    {
        audits
            .create(
                &db,
                &consent_status_audit::Model {
                    status_audit_id: format!("s{}", i),
                    org_id: ORG.to_string(),
                    consent_id: "c1".to_string(),
                    previous_status: prev.to_string(),
                    current_status: curr.to_string(),
                    action_time: 1_000 + i as i64,
                    reason: "transition".to_string(),
                    action_by: None,
                },
            )
            .await
            .unwrap();
    }

    let trail = audits.get_by_consent_id(&db, ORG, "c1").await.unwrap();
    assert_eq!(trail.len(), 3);
    assert_eq!(trail[0].current_status, "REVOKED", "newest first");
    assert_eq!(trail[2].current_status, "CREATED");

    let latest = audits.get_latest(&db, ORG, "c1").await.unwrap().unwrap();
    assert_eq!(latest.current_status, "REVOKED");

    assert!(audits.get_latest(&db, OTHER_ORG, "c1").await.unwrap().is_none());

    audits.delete_by_consent_id(&db, ORG, "c1").await.unwrap();
    assert!(audits.get_by_consent_id(&db, ORG, "c1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_purpose_catalog_and_mappings() {
    let db = test_db().await;
    let purposes = PurposeRepository;
    let mappings = PurposeMappingRepository;

    purposes
        .create(
            &db,
            &consent_purpose::Model {
                purpose_id: "p1".to_string(),
                org_id: ORG.to_string(),
                name: "data_access".to_string(),
                description: Some("read account data".to_string()),
                purpose_type: Some("read".to_string()),
                attributes: Some(serde_json::json!({"scope": "accounts"})),
            },
        )
        .await
        .unwrap();

    let found = purposes.get_by_name(&db, ORG, "data_access").await.unwrap();
    assert_eq!(found.unwrap().purpose_id, "p1");

    // names resolve per tenant
    assert!(purposes
        .get_by_name(&db, OTHER_ORG, "data_access")
        .await
        .unwrap()
        .is_none());

    let found = purposes
        .get_by_names(&db, ORG, &["data_access".to_string(), "missing".to_string()])
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert!(purposes.get_by_names(&db, ORG, &[]).await.unwrap().is_empty());

    mappings
        .link(
            &db,
            &consent_purpose_mapping::Model {
                mapping_id: "m1".to_string(),
                consent_id: "c1".to_string(),
                org_id: ORG.to_string(),
                purpose_id: "p1".to_string(),
                purpose_name: "data_access".to_string(),
                purpose_value: Some("X".to_string()),
                is_user_approved: true,
                is_mandatory: true,
            },
        )
        .await
        .unwrap();

    let linked = mappings.get_by_consent(&db, ORG, "c1").await.unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].purpose_name, "data_access");
    assert!(linked[0].is_mandatory);

    mappings.delete_all(&db, ORG, "c1").await.unwrap();
    assert!(mappings.get_by_consent(&db, ORG, "c1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_consent_file_store_overwrites() {
    let db = test_db().await;
    let files = ConsentFileRepository;

    assert!(files.get(&db, ORG, "c1").await.unwrap().is_none());

    files.store(&db, ORG, "c1", "first version").await.unwrap();
    let loaded = files.get(&db, ORG, "c1").await.unwrap().unwrap();
    assert_eq!(loaded.file_content, "first version");

    files.store(&db, ORG, "c1", "second version").await.unwrap();
    let loaded = files.get(&db, ORG, "c1").await.unwrap().unwrap();
    assert_eq!(loaded.file_content, "second version");

    files.delete(&db, ORG, "c1").await.unwrap();
    assert!(files.get(&db, ORG, "c1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_writes_respect_the_caller_transaction() {
    let db = test_db().await;
    let consents = ConsentRepository;

    // rolled-back work is invisible
    let txn = db.begin().await.unwrap();
    consents
        .create(&txn, &consent_row("c1", ORG, "CREATED", "accounts"))
        .await
        .unwrap();
    txn.rollback().await.unwrap();
    assert!(consents.get_by_id(&db, ORG, "c1").await.unwrap().is_none());

    // committed work is visible, and the locked read sees in-flight rows
    let txn = db.begin().await.unwrap();
    consents
        .create(&txn, &consent_row("c1", ORG, "CREATED", "accounts"))
        .await
        .unwrap();
    let in_flight = consents.get_for_update(&txn, ORG, "c1").await.unwrap();
    assert!(in_flight.is_some());
    consents
        .update_status(&txn, ORG, "c1", "ACTIVE", 2_000)
        .await
        .unwrap();
    txn.commit().await.unwrap();

    let loaded = consents.get_by_id(&db, ORG, "c1").await.unwrap().unwrap();
    assert_eq!(loaded.current_status, "ACTIVE");
}
