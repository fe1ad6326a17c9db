use super::*;

fn draft() -> PropertyDraft {
    PropertyDraft {
        title: "Harbour View Loft".into(),
        description: "Two-level loft with roof terrace".into(),
        price: 450_000.0,
        location: "Cape Town".into(),
        property_type: "Apartment".into(),
        bedrooms: 2,
        bathrooms: 1,
        area: 96.5,
    }
}

fn listing(id: u64, title: &str, location: &str, price: f64) -> Property {
    Property {
        id,
        title: title.into(),
        description: format!("{title} description"),
        price,
        location: location.into(),
        property_type: "House".into(),
        bedrooms: 3,
        bathrooms: 2,
        area: 120.0,
        status: PropertyStatus::Available,
        created_at: None,
        updated_at: None,
        developer_name: None,
        developer_email: None,
    }
}

fn validation_message(draft: &PropertyDraft) -> String {
    match draft.validate() {
        Err(AuthError::Validation(message)) => message,
        other => panic!("expected validation error, got {other:?}"),
    }
}

// =============================================================================
// PropertyDraft::validate
// =============================================================================

#[test]
fn valid_draft_passes() {
    assert!(draft().validate().is_ok());
}

#[test]
fn blank_title_is_rejected() {
    let mut d = draft();
    d.title = "  ".into();
    assert_eq!(validation_message(&d), "Title is required");
}

#[test]
fn long_fields_are_rejected() {
    let mut d = draft();
    d.title = "x".repeat(201);
    assert_eq!(validation_message(&d), "Title must not exceed 200 characters");

    let mut d = draft();
    d.location = "x".repeat(101);
    assert_eq!(validation_message(&d), "Location must not exceed 100 characters");

    let mut d = draft();
    d.property_type = "x".repeat(51);
    assert_eq!(validation_message(&d), "Property type must not exceed 50 characters");
}

#[test]
fn non_positive_numbers_are_rejected() {
    let mut d = draft();
    d.price = 0.0;
    assert_eq!(validation_message(&d), "Price must be greater than 0");

    let mut d = draft();
    d.price = f64::NAN;
    assert_eq!(validation_message(&d), "Price must be greater than 0");

    let mut d = draft();
    d.bedrooms = 0;
    assert_eq!(validation_message(&d), "Bedrooms must be positive");

    let mut d = draft();
    d.area = -1.0;
    assert_eq!(validation_message(&d), "Area must be positive");
}

#[test]
fn draft_serializes_camel_case() {
    let value = serde_json::to_value(draft()).unwrap();
    assert_eq!(value["propertyType"], "Apartment");
    assert!(value.get("property_type").is_none());
}

#[test]
fn property_deserializes_backend_shape() {
    let json = serde_json::json!({
        "id": 12,
        "title": "Garden Cottage",
        "description": "Quiet street",
        "price": 1250000.00,
        "location": "Stellenbosch",
        "propertyType": "House",
        "bedrooms": 3,
        "bathrooms": 2,
        "area": 180.0,
        "status": "SOLD",
        "createdAt": "2024-03-01T10:15:30",
        "updatedAt": null,
        "developerName": "Developer User",
        "developerEmail": "developer@prime.com"
    });
    let property: Property = serde_json::from_value(json).unwrap();
    assert_eq!(property.id, 12);
    assert_eq!(property.status, PropertyStatus::Sold);
    assert_eq!(property.developer_name.as_deref(), Some("Developer User"));
    assert_eq!(property.updated_at, None);
}

// =============================================================================
// PropertyFilter
// =============================================================================

#[test]
fn empty_filter_keeps_everything() {
    let all = vec![listing(1, "A", "X", 1.0), listing(2, "B", "Y", 2.0)];
    assert_eq!(PropertyFilter::default().apply(&all).len(), 2);
}

#[test]
fn search_matches_title_description_or_location_case_insensitively() {
    let all = vec![
        listing(1, "Seaside Villa", "Durban", 900.0),
        listing(2, "City Flat", "Johannesburg", 300.0),
        listing(3, "Farm House", "Seaside Road", 500.0),
    ];
    let filter = PropertyFilter { search: Some("SEASIDE".into()), ..PropertyFilter::default() };
    let ids: Vec<u64> = filter.apply(&all).iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn blank_search_is_ignored() {
    let all = vec![listing(1, "A", "X", 1.0)];
    let filter = PropertyFilter { search: Some("   ".into()), ..PropertyFilter::default() };
    assert_eq!(filter.apply(&all).len(), 1);
}

#[test]
fn location_filter_only_checks_location() {
    let all = vec![listing(1, "Durban Dream", "Cape Town", 1.0), listing(2, "Flat", "Durban North", 1.0)];
    let filter = PropertyFilter { location: Some("durban".into()), ..PropertyFilter::default() };
    let ids: Vec<u64> = filter.apply(&all).iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![2]);
}

#[test]
fn price_range_is_inclusive() {
    let all = vec![listing(1, "A", "X", 100.0), listing(2, "B", "X", 200.0), listing(3, "C", "X", 300.0)];
    let filter = PropertyFilter { min_price: Some(200.0), max_price: Some(300.0), ..PropertyFilter::default() };
    let ids: Vec<u64> = filter.apply(&all).iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![2, 3]);
}

// =============================================================================
// Client
// =============================================================================

#[tokio::test]
async fn authorized_calls_without_session_fail_locally() {
    let config = ClientConfig::new("http://127.0.0.1:9").unwrap().with_retry(crate::net::retry::RetryPolicy::no_retry());
    let client = PropertyClient::new(config, TokenStore::in_memory()).unwrap();
    assert!(matches!(client.mine().await, Err(AuthError::SessionInvalid)));
    assert!(matches!(client.delete(4).await, Err(AuthError::SessionInvalid)));
}

#[tokio::test]
async fn invalid_draft_fails_before_request() {
    let config = ClientConfig::new("http://127.0.0.1:9").unwrap();
    let client = PropertyClient::new(config, TokenStore::in_memory()).unwrap();
    let mut d = draft();
    d.bathrooms = 0;
    assert!(matches!(client.create(&d).await, Err(AuthError::Validation(_))));
}
