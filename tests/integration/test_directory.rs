//! Directory and user management over the in-memory backend.

use std::sync::Arc;

use alumni_hub::acl::Principal;
use alumni_hub::model::{NewUserAccount, UserAccountUpdate};
use alumni_hub::views::{CandidateBuffer, ListingQuery, ReportRequest};
use alumni_hub::{
    AccessError, AlumniError, BatchmateData, BatchmatePatch, CmsError, CriteriaKey, Directory,
    EngineeringField, FilterCriteria, MemoryBackend, UserManager,
};

use super::fixtures;

fn directory() -> Directory<MemoryBackend> {
    Directory::new(Arc::new(MemoryBackend::with_batchmates(
        fixtures::batchmates(),
    )))
}

fn civil_admin() -> Principal {
    Principal::field_admin(EngineeringField::Civil)
}

fn names(rows: &[alumni_hub::Batchmate]) -> Vec<&str> {
    rows.iter().map(|r| r.calling_name.as_str()).collect()
}

#[tokio::test]
async fn test_super_admin_sees_every_record() {
    let dir = directory();
    let rows = dir.load(Some(&Principal::SuperAdmin)).await.unwrap();
    assert_eq!(rows.len(), 8);
}

#[tokio::test]
async fn test_field_admin_sees_own_field_only() {
    let dir = directory();
    let rows = dir.load(Some(&civil_admin())).await.unwrap();
    assert_eq!(names(&rows), vec!["Ben", "Gus"]);
    assert!(rows.iter().all(|r| r.field == EngineeringField::Civil));
}

#[tokio::test]
async fn test_no_principal_sees_nothing() {
    let dir = directory();
    assert!(dir.load(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_field_admin_cannot_widen_scope_with_criteria() {
    let dir = directory();
    let criteria = FilterCriteria::new().with_field(EngineeringField::Computer);
    let rows = dir
        .search(Some(&civil_admin()), &criteria, None)
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_criteria_combine_conjunctively() {
    let dir = directory();
    let criteria = FilterCriteria::new()
        .with(CriteriaKey::FullName, "smith")
        .with_country("Sri Lanka");
    let rows = dir
        .search(Some(&Principal::SuperAdmin), &criteria, None)
        .await
        .unwrap();
    assert_eq!(names(&rows), vec!["Gus"]);
}

#[tokio::test]
async fn test_sentinels_from_form_match_everything() {
    let dir = directory();
    let criteria = FilterCriteria::from_form([("country", "all"), ("field", "all")]);
    let rows = dir
        .search(Some(&Principal::SuperAdmin), &criteria, None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 8);
}

#[tokio::test]
async fn test_free_text_query() {
    let dir = directory();
    let rows = dir
        .search(
            Some(&Principal::SuperAdmin),
            &FilterCriteria::default(),
            Some("LEE"),
        )
        .await
        .unwrap();
    assert_eq!(names(&rows), vec!["Ann", "Ben"]);
}

#[tokio::test]
async fn test_phone_criteria_are_substring_matches() {
    let dir = directory();
    let criteria = FilterCriteria::new().with(CriteriaKey::WhatsappMobile, "0003");
    let rows = dir
        .search(Some(&Principal::SuperAdmin), &criteria, None)
        .await
        .unwrap();
    assert_eq!(names(&rows), vec!["Dev"]);
}

#[tokio::test]
async fn test_candidate_buffer_keeps_latest_fetch() {
    let dir = directory();
    let mut buffer = CandidateBuffer::new();

    let early = buffer.begin();
    let late = buffer.begin();

    let civil = dir.load(Some(&civil_admin())).await.unwrap();
    let all = dir.load(Some(&Principal::SuperAdmin)).await.unwrap();

    assert!(buffer.complete(late, civil));
    assert!(!buffer.complete(early, all));
    assert_eq!(names(buffer.records()), vec!["Ben", "Gus"]);
    assert!(!buffer.is_loading());
}

#[tokio::test]
async fn test_listing_marks_rows_and_offers_scoped_countries() {
    let dir = directory();
    let query = ListingQuery {
        free_text: Some("smith".to_string()),
        ..Default::default()
    };
    let listing = dir.listing(Some(&civil_admin()), &query, 10).await.unwrap();

    assert_eq!(listing.results.total, 1);
    assert_eq!(listing.results.rows[0].record.calling_name, "Gus");
    assert!(listing.results.rows[0].can_edit);
    assert_eq!(listing.countries, vec!["Sri Lanka", "UK"]);
}

#[tokio::test]
async fn test_full_view_checks_scope() {
    let dir = directory();
    let criteria = FilterCriteria::new().with_country("Australia");

    let view = dir
        .full_view(Some(&Principal::SuperAdmin), EngineeringField::Mining, &criteria)
        .await
        .unwrap();
    assert_eq!(names(&view.results), vec!["Hal"]);
    assert_eq!(view.countries, vec!["Australia", "India"]);

    let err = dir
        .full_view(Some(&civil_admin()), EngineeringField::Mining, &criteria)
        .await
        .unwrap_err();
    assert!(matches!(err, AlumniError::Access(AccessError::Forbidden(_))));

    let err = dir
        .full_view(None, EngineeringField::Civil, &FilterCriteria::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AlumniError::Access(AccessError::Unauthenticated)));
}

#[tokio::test]
async fn test_dashboard_counts_whole_directory() {
    let dir = directory();
    let stats = dir.dashboard(Some(&civil_admin()), 5).await.unwrap();

    assert_eq!(stats.total_alumni, 2);
    assert_eq!(stats.countries, 2);
    assert_eq!(stats.workplaces, 2);

    let count = |field| {
        stats
            .field_counts
            .iter()
            .find(|c| c.field == field)
            .map(|c| c.count)
            .unwrap()
    };
    assert_eq!(count(EngineeringField::Computer), 3);
    assert_eq!(count(EngineeringField::Civil), 2);
    assert_eq!(count(EngineeringField::Textile), 0);

    // Newest first, inside scope only.
    let recent: Vec<&str> = stats.recent.iter().map(|r| r.calling_name.as_str()).collect();
    assert_eq!(recent, vec!["Gus", "Ben"]);
}

#[tokio::test]
async fn test_dashboard_requires_principal() {
    let dir = directory();
    let err = dir.dashboard(None, 5).await.unwrap_err();
    assert!(matches!(
        err,
        AlumniError::Access(AccessError::Unauthenticated)
    ));
}

#[tokio::test]
async fn test_countries_follow_scope() {
    let dir = directory();
    let countries = dir.countries(Some(&civil_admin())).await.unwrap();
    assert_eq!(countries, vec!["Sri Lanka".to_string(), "UK".to_string()]);
}

#[tokio::test]
async fn test_report_by_country() {
    let dir = directory();
    let request = ReportRequest::ByCountry {
        country: "UK".to_string(),
    };
    let report = dir
        .report(Some(&Principal::SuperAdmin), &request, 10)
        .await
        .unwrap();

    assert_eq!(report.title, "Country: UK");
    assert_eq!(names(&report.rows).len(), 2);
    assert!(report
        .rows
        .iter()
        .all(|r| r.country.as_deref() == Some("UK")));
}

#[tokio::test]
async fn test_report_fields_outside_scope_are_empty() {
    let dir = directory();
    let request = ReportRequest::ByFields {
        fields: vec![EngineeringField::Mining],
    };
    let report = dir.report(Some(&civil_admin()), &request, 10).await.unwrap();
    assert!(report.rows.is_empty());
}

#[tokio::test]
async fn test_get_outside_scope_is_not_found() {
    let dir = directory();
    // Record 1 is Computer.
    let err = dir.get(Some(&civil_admin()), "1").await.unwrap_err();
    assert!(matches!(err, AlumniError::Cms(CmsError::NotFound(_))));

    let own = dir.get(Some(&civil_admin()), "2").await.unwrap();
    assert_eq!(own.calling_name, "Ben");
}

#[tokio::test]
async fn test_create_and_search_roundtrip() {
    let dir = directory();
    let data = BatchmateData::new(
        "Ivy",
        "Ivy Perera",
        "ivy@alumni.test",
        "+94 77 555 0000",
        EngineeringField::Civil,
    )
    .with_country("Japan");

    let created = dir.create(Some(&civil_admin()), &data).await.unwrap();
    assert_eq!(created.field, EngineeringField::Civil);
    assert_eq!(dir.backend().len().await, 9);

    let rows = dir
        .search(
            Some(&civil_admin()),
            &FilterCriteria::new().with_country("Japan"),
            None,
        )
        .await
        .unwrap();
    assert_eq!(names(&rows), vec!["Ivy"]);
}

#[tokio::test]
async fn test_create_outside_scope_is_forbidden() {
    let dir = directory();
    let data = BatchmateData::new(
        "Jo",
        "Jo Silva",
        "jo@alumni.test",
        "+94 77 555 0001",
        EngineeringField::Textile,
    );
    let err = dir.create(Some(&civil_admin()), &data).await.unwrap_err();
    assert!(matches!(err, AlumniError::Access(AccessError::Forbidden(_))));
    assert_eq!(dir.backend().len().await, 8);
}

#[tokio::test]
async fn test_create_rejects_invalid_payload() {
    let dir = directory();
    let data = BatchmateData::new("", "Jo Silva", "not-an-email", "", EngineeringField::Civil);
    match dir.create(Some(&civil_admin()), &data).await.unwrap_err() {
        AlumniError::Validation(errors) => {
            assert_eq!(errors.get("callingName"), Some("Calling name is required"));
            assert_eq!(errors.get("email"), Some("Invalid email format"));
            assert!(errors.get("whatsappMobile").is_some());
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_moving_record_needs_both_fields() {
    let dir = directory();
    let patch = BatchmatePatch {
        field: Some(EngineeringField::Computer),
        ..Default::default()
    };
    let err = dir
        .update(Some(&civil_admin()), "2", &patch)
        .await
        .unwrap_err();
    assert!(matches!(err, AlumniError::Access(AccessError::Forbidden(_))));

    let moved = dir
        .update(Some(&Principal::SuperAdmin), "2", &patch)
        .await
        .unwrap();
    assert_eq!(moved.field, EngineeringField::Computer);
}

#[tokio::test]
async fn test_update_and_delete_in_scope() {
    let dir = directory();
    let patch = BatchmatePatch {
        working_place: Some("Harbour Works".to_string()),
        ..Default::default()
    };
    let updated = dir.update(Some(&civil_admin()), "7", &patch).await.unwrap();
    assert_eq!(updated.working_place.as_deref(), Some("Harbour Works"));

    dir.delete(Some(&civil_admin()), "7").await.unwrap();
    assert_eq!(dir.backend().len().await, 7);

    let err = dir.delete(Some(&civil_admin()), "1").await.unwrap_err();
    assert!(matches!(err, AlumniError::Access(AccessError::Forbidden(_))));
}

fn user_manager() -> UserManager<MemoryBackend> {
    UserManager::new(Arc::new(
        MemoryBackend::new().with_users(fixtures::users(), fixtures::roles()),
    ))
}

#[tokio::test]
async fn test_user_management_is_super_admin_only() {
    let manager = user_manager();
    let err = manager.list(Some(&civil_admin())).await.unwrap_err();
    assert!(matches!(err, AlumniError::Access(AccessError::Forbidden(_))));

    let err = manager.list(None).await.unwrap_err();
    assert!(matches!(
        err,
        AlumniError::Access(AccessError::Unauthenticated)
    ));

    let users = manager.list(Some(&Principal::SuperAdmin)).await.unwrap();
    assert_eq!(users.len(), 2);
}

#[tokio::test]
async fn test_one_field_admin_per_field() {
    let manager = user_manager();
    let taken = NewUserAccount {
        username: "civil2".to_string(),
        email: "civil2@alumni.edu".to_string(),
        password: "secret".to_string(),
        role: 4,
        assigned_field: Some(EngineeringField::Civil),
    };
    match manager
        .create(Some(&Principal::SuperAdmin), &taken)
        .await
        .unwrap_err()
    {
        AlumniError::Validation(errors) => {
            assert_eq!(
                errors.get("assignedField"),
                Some("Civil already has a field admin")
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    let free = NewUserAccount {
        assigned_field: Some(EngineeringField::Mining),
        username: "miningadmin".to_string(),
        email: "miningadmin@alumni.edu".to_string(),
        ..taken
    };
    let created = manager
        .create(Some(&Principal::SuperAdmin), &free)
        .await
        .unwrap();
    assert_eq!(created.assigned_field, Some(EngineeringField::Mining));

    let coverage = manager.coverage(Some(&Principal::SuperAdmin)).await.unwrap();
    let held: Vec<EngineeringField> = coverage
        .iter()
        .filter(|a| a.admin.is_some())
        .map(|a| a.field)
        .collect();
    assert_eq!(
        held,
        vec![EngineeringField::Civil, EngineeringField::Mining]
    );
}

#[tokio::test]
async fn test_field_admin_keeps_own_field_on_update() {
    let manager = user_manager();
    let update = UserAccountUpdate {
        username: Some("civil-lead".to_string()),
        assigned_field: Some(EngineeringField::Civil),
        ..Default::default()
    };
    let updated = manager
        .update(Some(&Principal::SuperAdmin), 2, &update)
        .await
        .unwrap();
    assert_eq!(updated.username, "civil-lead");
}
