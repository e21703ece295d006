mod common;

use common::{RecordingReporter, ScriptedProvider};
use mergefield_core::{Config, MergeFieldError, ModalOutcome, Refresh, WizardSessions};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn sessions() -> (WizardSessions, Arc<ScriptedProvider>) {
    let provider = Arc::new(ScriptedProvider::fixture());
    let sessions = WizardSessions::new(
        provider.clone(),
        Arc::new(RecordingReporter::default()),
        Config::default(),
    );
    (sessions, provider)
}

#[tokio::test]
async fn test_open_uses_configured_root() {
    let (sessions, provider) = sessions();

    let (_, refresh) = sessions.open(None).await;

    assert_eq!(refresh, Refresh::Failed);
    assert_eq!(provider.calls()[0].0, "TREX1__Contract_and_Form__c");
    assert_eq!(sessions.len(), 1);
}

#[tokio::test]
async fn test_insert_with_fallback_closes_session() {
    let (sessions, _) = sessions();
    let (id, refresh) = sessions.open(Some("Contract")).await;
    assert_eq!(refresh, Refresh::Applied);

    let wizard = sessions.get(&id).unwrap();
    wizard.navigator().select_option("Account").await;
    wizard.navigator().select_option("{!Account.Name}").await;
    wizard.set_fallback("N/A");
    assert!(wizard.can_insert());

    assert_eq!(
        sessions.insert(&id).unwrap(),
        Some(ModalOutcome::Selected("{!Account.Name, \"N/A\"}".to_string()))
    );
    assert!(sessions.is_empty());
    assert!(matches!(
        sessions.get(&id),
        Err(MergeFieldError::SessionNotFound { .. })
    ));
}

#[tokio::test]
async fn test_insert_disabled_keeps_session_open() {
    let (sessions, _) = sessions();
    let (id, _) = sessions.open(Some("Contract")).await;
    let wizard = sessions.get(&id).unwrap();

    assert!(!wizard.can_insert());
    assert_eq!(sessions.insert(&id).unwrap(), None);

    // A relationship that was just collapsed is selected but not insertable.
    wizard.navigator().select_option("Account").await;
    wizard.navigator().back().await;
    assert!(!wizard.can_insert());
    assert_eq!(sessions.insert(&id).unwrap(), None);
    assert_eq!(sessions.len(), 1);
}

#[tokio::test]
async fn test_empty_fallback_is_omitted() {
    let (sessions, _) = sessions();
    let (id, _) = sessions.open(Some("Contract")).await;
    let wizard = sessions.get(&id).unwrap();
    wizard.navigator().select_option("{!StartDate}").await;
    wizard.set_fallback("");

    assert_eq!(
        wizard.insert(),
        Some(ModalOutcome::Selected("{!StartDate}".to_string()))
    );
}

#[tokio::test]
async fn test_cancel_resolves_cancelled() {
    let (sessions, _) = sessions();
    let (id, _) = sessions.open(Some("Contract")).await;

    assert_eq!(sessions.cancel(&id).unwrap(), ModalOutcome::Cancelled);
    assert!(sessions.is_empty());
    assert!(sessions.cancel(&id).is_err());
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let (sessions, _) = sessions();
    let (first, _) = sessions.open(Some("Contract")).await;
    let (second, _) = sessions.open(Some("Account")).await;
    assert_ne!(first, second);

    sessions
        .get(&first)
        .unwrap()
        .navigator()
        .select_option("Account")
        .await;

    assert_eq!(sessions.get(&first).unwrap().navigator().state().depth(), 1);
    let other = sessions.get(&second).unwrap().navigator().state();
    assert_eq!(other.depth(), 0);
    assert_eq!(other.current_object_api_name, "Account");
}
