//! Tests for the session property-array codec, plain and encrypted.

use shopify_app_auth::auth::session::codec::{
    from_encrypted_property_array, from_property_array, to_encrypted_property_array,
    to_property_array, CodecError, PropertyValue,
};
use shopify_app_auth::auth::{AccessTokenResponse, AssociatedUser, Session};
use shopify_app_auth::ShopDomain;

const KEY: &[u8] = &[7u8; 32];

fn offline_session() -> Session {
    let response = AccessTokenResponse {
        access_token: "shpat_offline".to_string(),
        scope: "read_products,write_orders".to_string(),
        expires_in: None,
        associated_user_scope: None,
        associated_user: None,
        refresh_token: None,
        refresh_token_expires_in: None,
    };
    Session::from_access_token_response(
        ShopDomain::new("test-shop").unwrap(),
        "nonce",
        &response,
    )
}

fn online_session() -> Session {
    let user = AssociatedUser {
        id: 4321,
        first_name: "Jo".to_string(),
        last_name: "Smith".to_string(),
        email: "jo@example.com".to_string(),
        email_verified: true,
        account_owner: true,
        locale: "en".to_string(),
        collaborator: false,
    };
    let response = AccessTokenResponse {
        access_token: "shpat_online".to_string(),
        scope: "read_products".to_string(),
        expires_in: Some(86400),
        associated_user_scope: Some("read_products".to_string()),
        associated_user: Some(user),
        refresh_token: None,
        refresh_token_expires_in: None,
    };
    Session::from_access_token_response(
        ShopDomain::new("test-shop").unwrap(),
        "nonce",
        &response,
    )
}

fn get<'a>(entries: &'a [(String, PropertyValue)], key: &str) -> Option<&'a PropertyValue> {
    entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

#[test]
fn test_offline_session_round_trips_through_property_array() {
    let session = offline_session();
    let entries = to_property_array(&session, true);

    assert_eq!(
        get(&entries, "id").unwrap(),
        &PropertyValue::String("offline_test-shop.myshopify.com".to_string())
    );
    assert_eq!(get(&entries, "isOnline").unwrap(), &PropertyValue::Bool(false));
    // Absent optionals produce no pair at all
    assert!(get(&entries, "expires").is_none());
    assert!(get(&entries, "refreshToken").is_none());
    assert!(get(&entries, "userId").is_none());

    let restored = from_property_array(&entries, true).unwrap();
    assert_eq!(restored.id, session.id);
    assert_eq!(restored.access_token, session.access_token);
    assert_eq!(restored.scope, session.scope);
    assert!(!restored.is_online());
}

#[test]
fn test_online_session_flattens_user_fields() {
    let session = online_session();
    let entries = to_property_array(&session, true);

    assert_eq!(get(&entries, "userId").unwrap(), &PropertyValue::Number(4321));
    assert_eq!(
        get(&entries, "firstName").unwrap(),
        &PropertyValue::String("Jo".to_string())
    );
    assert_eq!(
        get(&entries, "emailVerified").unwrap(),
        &PropertyValue::Bool(true)
    );

    let restored = from_property_array(&entries, true).unwrap();
    assert_eq!(restored.id, "test-shop.myshopify.com_4321");
    let user = restored.associated_user().unwrap();
    assert_eq!(user.email, "jo@example.com");
    assert!(user.account_owner);
}

#[test]
fn test_online_session_without_user_data_keeps_only_the_id() {
    let session = online_session();
    let entries = to_property_array(&session, false);

    assert_eq!(
        get(&entries, "onlineAccessInfo").unwrap(),
        &PropertyValue::Number(4321)
    );
    assert!(get(&entries, "firstName").is_none());
    assert!(get(&entries, "email").is_none());

    // The round trip is lossy: only the numeric id comes back
    let restored = from_property_array(&entries, false).unwrap();
    let user = restored.associated_user().unwrap();
    assert_eq!(user.id, 4321);
    assert!(user.first_name.is_empty());
}

#[test]
fn test_expiry_serializes_as_epoch_seconds() {
    let session = online_session();
    let entries = to_property_array(&session, true);

    let Some(PropertyValue::Number(secs)) = get(&entries, "expires") else {
        panic!("expires should be a number");
    };
    let expected = session.expires.unwrap().timestamp();
    assert_eq!(*secs, expected);

    let restored = from_property_array(&entries, true).unwrap();
    // Sub-second precision is dropped on the wire
    assert_eq!(restored.expires.unwrap().timestamp(), expected);
}

#[test]
fn test_unknown_keys_are_ignored() {
    let session = offline_session();
    let mut entries = to_property_array(&session, true);
    entries.push((
        "someFutureField".to_string(),
        PropertyValue::String("whatever".to_string()),
    ));

    let restored = from_property_array(&entries, true).unwrap();
    assert_eq!(restored.id, session.id);
}

#[test]
fn test_missing_required_field_fails() {
    let session = offline_session();
    let entries: Vec<_> = to_property_array(&session, true)
        .into_iter()
        .filter(|(k, _)| k != "shop")
        .collect();

    let result = from_property_array(&entries, true);
    assert!(matches!(
        result,
        Err(CodecError::MissingField { field: "shop" })
    ));
}

#[test]
fn test_encrypted_array_hides_sensitive_values() {
    let session = online_session();
    let entries = to_encrypted_property_array(&session, true, KEY, None).unwrap();

    // Default-encrypted fields carry the marker prefix
    for field in ["shop", "accessToken", "userId", "email"] {
        let Some(PropertyValue::String(value)) = get(&entries, field) else {
            panic!("{field} should be an encrypted string");
        };
        assert!(value.starts_with("encrypted#"), "{field}: {value}");
        assert!(!value.contains("test-shop"), "{field} leaked plaintext");
    }

    // Structural fields stay plain
    assert_eq!(
        get(&entries, "id").unwrap(),
        &PropertyValue::String("test-shop.myshopify.com_4321".to_string())
    );
    assert_eq!(get(&entries, "isOnline").unwrap(), &PropertyValue::Bool(true));
    assert!(matches!(
        get(&entries, "expires").unwrap(),
        PropertyValue::Number(_)
    ));
}

#[test]
fn test_encrypted_array_round_trips() {
    let session = online_session();
    let entries = to_encrypted_property_array(&session, true, KEY, None).unwrap();
    let restored = from_encrypted_property_array(&entries, true, KEY).unwrap();

    assert_eq!(restored.id, session.id);
    assert_eq!(restored.shop.as_ref(), "test-shop.myshopify.com");
    assert_eq!(restored.access_token.as_deref(), Some("shpat_online"));
    // userId decrypts back to a number, so the online id reconstructs
    assert_eq!(restored.associated_user().unwrap().id, 4321);
}

#[test]
fn test_explicit_field_list_limits_encryption() {
    let session = offline_session();
    let entries =
        to_encrypted_property_array(&session, true, KEY, Some(&["accessToken"])).unwrap();

    let Some(PropertyValue::String(token)) = get(&entries, "accessToken") else {
        panic!("accessToken should be a string");
    };
    assert!(token.starts_with("encrypted#"));

    // Everything else stays readable
    assert_eq!(
        get(&entries, "shop").unwrap(),
        &PropertyValue::String("test-shop.myshopify.com".to_string())
    );
}

#[test]
fn test_forbidden_fields_reject_the_whole_operation() {
    let session = offline_session();
    let result = to_encrypted_property_array(&session, true, KEY, Some(&["id", "accessToken"]));

    match result {
        Err(CodecError::UnencryptableFields(fields)) => {
            assert_eq!(fields, vec!["id".to_string()]);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_wrong_key_fails_decryption() {
    let session = offline_session();
    let entries = to_encrypted_property_array(&session, true, KEY, None).unwrap();

    let wrong_key = &[8u8; 32];
    let result = from_encrypted_property_array(&entries, true, wrong_key);
    assert!(matches!(result, Err(CodecError::Crypto(_))));
}

#[test]
fn test_plain_arrays_pass_through_the_encrypted_decoder() {
    let session = offline_session();
    let entries = to_property_array(&session, true);

    let restored = from_encrypted_property_array(&entries, true, KEY).unwrap();
    assert_eq!(restored.id, session.id);
}

#[test]
fn test_fresh_iv_per_encryption() {
    let session = offline_session();
    let a = to_encrypted_property_array(&session, true, KEY, None).unwrap();
    let b = to_encrypted_property_array(&session, true, KEY, None).unwrap();

    // Same plaintext, different ciphertext every time
    assert_ne!(get(&a, "accessToken"), get(&b, "accessToken"));
}
