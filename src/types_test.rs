use super::*;

// =============================================================================
// Role
// =============================================================================

#[test]
fn role_deserializes_known_values() {
    let role: Role = serde_json::from_str("\"CUSTOMER\"").unwrap();
    assert_eq!(role, Role::Customer);
    let role: Role = serde_json::from_str("\"DEVELOPER\"").unwrap();
    assert_eq!(role, Role::Developer);
}

#[test]
fn role_unrecognized_value_becomes_unknown() {
    let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
    assert_eq!(role, Role::Unknown);
    assert_eq!(role.dashboard_path(), None);
}

#[test]
fn role_dashboard_paths() {
    assert_eq!(Role::Customer.dashboard_path(), Some("/customer/dashboard"));
    assert_eq!(Role::Developer.dashboard_path(), Some("/developer/dashboard"));
}

#[test]
fn role_from_str_is_case_insensitive() {
    assert_eq!("developer".parse::<Role>(), Ok(Role::Developer));
    assert_eq!(" Customer ".parse::<Role>(), Ok(Role::Customer));
    assert!("admin".parse::<Role>().is_err());
}

// =============================================================================
// UserProfile / Registration
// =============================================================================

#[test]
fn profile_ignores_extra_backend_fields() {
    let json = serde_json::json!({
        "id": 7,
        "username": "demo.user@gmail.com",
        "name": "Demo User",
        "email": "demo.user@gmail.com",
        "role": "CUSTOMER",
        "provider": "GOOGLE"
    });
    let profile: UserProfile = serde_json::from_value(json).unwrap();
    assert_eq!(profile.username, "demo.user@gmail.com");
    assert_eq!(profile.role, Role::Customer);
}

#[test]
fn registration_debug_hides_password() {
    let registration = Registration {
        username: "alice".into(),
        name: "Alice".into(),
        email: "alice@example.com".into(),
        password: "hunter22".into(),
        role: Role::Customer,
    };
    let debug = format!("{registration:?}");
    assert!(!debug.contains("hunter22"));
    assert!(debug.contains("<redacted>"));
}

#[test]
fn registration_serializes_role_uppercase() {
    let registration = Registration {
        username: "bob".into(),
        name: "Bob".into(),
        email: "bob@example.com".into(),
        password: "secret1".into(),
        role: Role::Developer,
    };
    let value = serde_json::to_value(&registration).unwrap();
    assert_eq!(value["role"], "DEVELOPER");
    assert_eq!(value["password"], "secret1");
}
