use super::*;

use std::sync::Arc;

use storage::MemoryKeyValueStore;

fn ada() -> RegistrationForm {
    RegistrationForm {
        first_name: " Ada ".into(),
        last_name: "Lovelace".into(),
        email: "ada@example.com".into(),
        birth_date: "1815-12-10".into(),
        interest: "painting".into(),
    }
}

#[tokio::test]
async fn unregistered_page_shows_form_only() {
    let mut page = RegistrationPage::new(MemoryKeyValueStore::new());
    let view = page.load().await.expect("load");
    assert_eq!(
        view,
        RegistrationView {
            greeting: None,
            show_signout: false,
            show_form: true,
            notice: None,
        }
    );
}

#[tokio::test]
async fn submit_persists_user_and_hides_form() {
    let backing = Arc::new(MemoryKeyValueStore::new());
    let mut page = RegistrationPage::new(backing.clone());

    let view = page.submit(&ada()).await.expect("submit");
    assert_eq!(view.greeting.as_deref(), Some("Welcome, Ada"));
    assert!(view.show_signout);
    assert!(!view.show_form);
    assert_eq!(view.notice, Some(ALREADY_REGISTERED_NOTICE));

    let raw = backing
        .get(DEFAULT_REGISTRATION_KEY)
        .await
        .expect("get")
        .expect("stored");
    let stored: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(stored["firstName"], "Ada");
    assert_eq!(stored["birthDate"], "1815-12-10");

    let mut reopened = RegistrationPage::new(backing);
    let view = reopened.load().await.expect("reload");
    assert_eq!(view.greeting.as_deref(), Some("Welcome, Ada"));
}

#[tokio::test]
async fn submit_with_blank_email_persists_nothing() {
    let backing = Arc::new(MemoryKeyValueStore::new());
    let mut page = RegistrationPage::new(backing.clone());
    let mut form = ada();
    form.email = "   ".into();

    let err = page.submit(&form).await.expect_err("rejected");
    assert!(matches!(
        err,
        RegistrationError::Validation(ValidationError::MissingField("email"))
    ));
    assert!(backing
        .get(DEFAULT_REGISTRATION_KEY)
        .await
        .expect("get")
        .is_none());
    assert!(page.view().show_form);
}

#[tokio::test]
async fn submit_rejects_malformed_birth_date_but_allows_blank() {
    let mut page = RegistrationPage::new(MemoryKeyValueStore::new());

    let mut form = ada();
    form.birth_date = "12/10/1815".into();
    assert!(matches!(
        page.submit(&form).await,
        Err(RegistrationError::Validation(ValidationError::InvalidDate(_)))
    ));

    form.birth_date = String::new();
    page.submit(&form).await.expect("blank date is fine");
    assert_eq!(page.user().and_then(|u| u.birth_date), None);
}

#[tokio::test]
async fn unreadable_stored_user_counts_as_unregistered() {
    let backing = MemoryKeyValueStore::with_entries([(DEFAULT_REGISTRATION_KEY, "{oops")]);
    let mut page = RegistrationPage::new(backing);
    let view = page.load().await.expect("load");
    assert!(view.show_form);
    assert!(view.greeting.is_none());
}

#[tokio::test]
async fn stored_user_without_first_name_counts_as_unregistered() {
    let backing = MemoryKeyValueStore::with_entries([(
        DEFAULT_REGISTRATION_KEY,
        r#"{"firstName":"","lastName":"X","email":"x@y.z"}"#,
    )]);
    let mut page = RegistrationPage::new(backing);
    assert!(page.load().await.expect("load").show_form);
}

#[tokio::test]
async fn sign_out_removes_user_and_restores_form() {
    let backing = Arc::new(MemoryKeyValueStore::new());
    let mut page = RegistrationPage::new(backing.clone());
    page.submit(&ada()).await.expect("submit");

    let view = page.sign_out().await.expect("sign out");
    assert!(view.show_form);
    assert!(!view.show_signout);
    assert!(page.user().is_none());
    assert!(backing
        .get(DEFAULT_REGISTRATION_KEY)
        .await
        .expect("get")
        .is_none());
}
