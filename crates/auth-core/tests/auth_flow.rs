//! End-to-end register/login flows against the in-memory store

use std::sync::Arc;
use std::time::Duration;

use auth_core::{
    Argon2Hasher, AuthError, Authenticator, CredentialStore, MemoryCredentialStore, SigningKey,
    TokenIssuer,
};
use pretty_assertions::assert_eq;

fn setup() -> (Arc<MemoryCredentialStore>, Authenticator) {
    let store = Arc::new(MemoryCredentialStore::new());
    let issuer = TokenIssuer::new(
        SigningKey::from_bytes(b"integration-test-signing-key-0123456789".to_vec()).unwrap(),
        Duration::from_secs(900),
    );
    let auth = Authenticator::new(
        store.clone(),
        Arc::new(Argon2Hasher::with_params(1024, 1, 1).unwrap()),
        Arc::new(issuer),
    );
    (store, auth)
}

#[tokio::test]
async fn account_lifecycle_scenario() {
    let (_, auth) = setup();

    let token = auth.register("a@x.com", "pw1").await.unwrap();
    let claims = auth.verify_token(&token).unwrap();
    assert_eq!(claims.sub, "a@x.com");
    assert_eq!(claims.exp - claims.iat, 900);

    assert_eq!(
        auth.register("a@x.com", "pw2").await,
        Err(AuthError::AccountAlreadyExists)
    );

    let token = auth.login("a@x.com", "pw1").await.unwrap();
    assert_eq!(auth.verify_token(&token).unwrap().sub, "a@x.com");

    assert_eq!(
        auth.login("a@x.com", "wrong").await,
        Err(AuthError::InvalidCredentials)
    );
    assert_eq!(
        auth.login("b@x.com", "pw1").await,
        Err(AuthError::AccountNotFound)
    );
}

#[tokio::test]
async fn duplicate_registration_keeps_original_secret() {
    let (_, auth) = setup();

    auth.register("a@x.com", "pw1").await.unwrap();
    let _ = auth.register("a@x.com", "pw2").await;

    assert!(auth.login("a@x.com", "pw1").await.is_ok());
    assert_eq!(
        auth.login("a@x.com", "pw2").await,
        Err(AuthError::InvalidCredentials)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_have_one_winner() {
    let (store, auth) = setup();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let auth = auth.clone();
            tokio::spawn(async move { auth.register("race@x.com", &format!("pw{}", i)).await })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(token) => {
                winners += 1;
                assert_eq!(auth.verify_token(&token).unwrap().sub, "race@x.com");
            }
            Err(e) => assert_eq!(e, AuthError::AccountAlreadyExists),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(store.len().await, 1);
    assert!(store
        .find_by_identifier("race@x.com")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn tampered_token_is_rejected() {
    let (_, auth) = setup();
    let token = auth.register("a@x.com", "pw1").await.unwrap();

    let (head, sig) = token.rsplit_once('.').unwrap();
    let forged = format!("{}.{}", head, sig.chars().rev().collect::<String>());

    assert_eq!(auth.verify_token(&forged), Err(AuthError::BadSignature));

    let joined = token.replacen('.', "x", 1);
    assert_eq!(auth.verify_token(&joined), Err(AuthError::BadSignature));
    assert!(matches!(
        auth.verify_token("garbage"),
        Err(AuthError::Malformed(_))
    ));
}
