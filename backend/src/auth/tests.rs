use super::*;
use jsonwebtoken::{EncodingKey, Header, encode};

const TEST_SECRET: &str = "supersecretjwtsecretforunittesting123";

fn sample_claims(exp: usize) -> SupabaseClaims {
    SupabaseClaims {
        sub: "123e4567-e89b-12d3-a456-426614174000".to_string(),
        aud: "authenticated".to_string(),
        role: "authenticated".to_string(),
        email: Some("seller@example.com".to_string()),
        exp,
    }
}

fn sign(claims: &SupabaseClaims, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[test]
fn validate_supabase_jwt_success() {
    let my_claims = sample_claims(9999999999);
    let token = sign(&my_claims, TEST_SECRET);

    let claims = validate_supabase_jwt(&token, TEST_SECRET).expect("Valid token should pass");
    assert_eq!(claims.sub, my_claims.sub);
    assert_eq!(claims.email, my_claims.email);
}

#[test]
fn validate_supabase_jwt_expired() {
    let token = sign(&sample_claims(1), TEST_SECRET);

    let result = validate_supabase_jwt(&token, TEST_SECRET);
    assert!(result.is_err());
}

#[test]
fn validate_supabase_jwt_invalid_signature() {
    let token = sign(&sample_claims(9999999999), "wrongsecret");

    let result = validate_supabase_jwt(&token, TEST_SECRET);
    assert!(result.is_err());
}

#[test]
fn validate_supabase_jwt_wrong_audience() {
    let mut claims = sample_claims(9999999999);
    claims.aud = "anon".to_string();
    let token = sign(&claims, TEST_SECRET);

    let result = validate_supabase_jwt(&token, TEST_SECRET);
    assert!(result.is_err());
}

#[test]
fn service_role_guard() {
    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        email: None,
        role: SERVICE_ROLE.to_string(),
    };
    assert!(admin.require_service_role().is_ok());

    let seller = AuthUser {
        user_id: Uuid::new_v4(),
        email: None,
        role: "authenticated".to_string(),
    };
    assert!(seller.require_service_role().is_err());
}
