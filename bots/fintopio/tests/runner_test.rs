mod common;

use common::{
    credential, happy_path, http_error, millis_from_now, test_config, token_for, ScriptedGateway,
    StaticLoader,
};
use core_logic::AccountCredential;
use fintopio_bot::api::Endpoint;
use fintopio_bot::{AccountOrchestrator, BotRunner, FintopioConfig, IdentityProvider};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn runner(
    gateway: Arc<ScriptedGateway>,
    accounts: Vec<AccountCredential>,
    config: FintopioConfig,
) -> BotRunner {
    let identities = IdentityProvider::new(vec![
        "Mozilla/5.0 (Linux; Android 12; SM-G991B) Mobile Safari/537.36".to_string(),
        "Mozilla/5.0 (Linux; Android 13; Pixel 7) Mobile Safari/537.36".to_string(),
    ])
    .unwrap();
    BotRunner::new(
        Box::new(StaticLoader::new(accounts)),
        AccountOrchestrator::new(gateway, Arc::new(config)),
        identities,
    )
}

#[tokio::test]
async fn test_first_account_auth_failure_does_not_affect_second() {
    let first = credential("Ann");
    let second = credential("Ben");
    let failing = first.clone();
    let gateway = ScriptedGateway::new(move |endpoint, _| match endpoint {
        Endpoint::Auth(c) if *c == failing => Err(http_error(endpoint, 401)),
        other => Ok(happy_path(other)),
    });
    let mut runner = runner(
        gateway.clone(),
        vec![first.clone(), second.clone()],
        test_config(),
    );

    let summary = runner.run_pass().await.unwrap();

    assert_eq!(summary.accounts, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.processed, 1);

    // Nothing but the auth attempt for the first account
    assert_eq!(gateway.count(&Endpoint::Auth(first.clone())), 1);
    assert!(gateway.calls_for(&first).is_empty());

    let second_calls: Vec<Endpoint> = gateway
        .calls_for(&second)
        .into_iter()
        .map(|c| c.endpoint)
        .collect();
    for expected in [
        Endpoint::Profile,
        Endpoint::DailyCheckIn,
        Endpoint::FarmingState,
        Endpoint::DiamondState,
        Endpoint::TaskList,
        Endpoint::GameSettings,
    ] {
        assert!(second_calls.contains(&expected), "missing {:?}", expected);
    }

    // Account 1 failed, so nobody wrote the wake time
    assert!(summary.next_wake.is_none());
    assert!(runner.state().next_wake.is_none());
}

#[tokio::test]
async fn test_only_first_account_sets_next_wake() {
    let first = credential("Ann");
    let second = credential("Ben");
    let first_token = token_for(&first);
    let first_next = millis_from_now(1);
    let second_next = millis_from_now(2);
    let gateway = ScriptedGateway::new(move |endpoint, token| match endpoint {
        Endpoint::DiamondState => {
            let next_at = if token == Some(first_token.as_str()) {
                first_next
            } else {
                second_next
            };
            Ok(json!({ "state": "unavailable", "timings": { "nextAt": next_at } }))
        }
        other => Ok(happy_path(other)),
    });
    let mut runner = runner(gateway, vec![first, second], test_config());

    let summary = runner.run_pass().await.unwrap();

    assert_eq!(
        summary.next_wake.map(|at| at.timestamp_millis()),
        Some(first_next)
    );
    assert_eq!(runner.state().next_wake, summary.next_wake);
}

#[tokio::test]
async fn test_next_wake_is_cleared_by_a_later_pass() {
    let first = credential("Ann");
    let diamond_calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = Arc::clone(&diamond_calls);
    let gateway = ScriptedGateway::new(move |endpoint, _| match endpoint {
        Endpoint::DiamondState => {
            let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if n == 0 {
                Ok(json!({ "state": "unavailable", "timings": { "nextAt": millis_from_now(1) } }))
            } else {
                Ok(json!({}))
            }
        }
        other => Ok(happy_path(other)),
    });
    let mut runner = runner(gateway, vec![first], test_config());

    assert!(runner.run_pass().await.unwrap().next_wake.is_some());
    assert!(runner.run_pass().await.unwrap().next_wake.is_none());
    assert_eq!(runner.metrics().snapshot().passes, 2);
}

#[tokio::test]
async fn test_unreadable_account_list_is_fatal() {
    let gateway = ScriptedGateway::happy();
    let mut runner = BotRunner::new(
        Box::new(StaticLoader::failing()),
        AccountOrchestrator::new(gateway.clone(), Arc::new(test_config())),
        IdentityProvider::new(vec!["Mozilla/5.0 (Linux; Android 12) Mobile".to_string()])
            .unwrap(),
    );

    assert!(runner.run(CancellationToken::new(), true).await.is_err());
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_run_once_performs_a_single_pass() {
    let gateway = ScriptedGateway::happy();
    let mut runner = runner(gateway.clone(), vec![credential("Ann")], test_config());

    runner.run(CancellationToken::new(), true).await.unwrap();

    assert_eq!(runner.metrics().snapshot().passes, 1);
    assert_eq!(gateway.count(&Endpoint::Auth(credential("Ann"))), 1);
}

#[tokio::test]
async fn test_cancelled_token_stops_before_any_pass() {
    let gateway = ScriptedGateway::happy();
    let mut runner = runner(gateway.clone(), vec![credential("Ann")], test_config());
    let token = CancellationToken::new();
    token.cancel();

    runner.run(token, false).await.unwrap();

    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_cancel_during_countdown_ends_the_loop() {
    let gateway = ScriptedGateway::happy();
    let mut config = test_config();
    config.schedule.default_wait_secs = 3600;
    config.schedule.min_wait_secs = 3600;
    let mut runner = runner(gateway.clone(), vec![credential("Ann")], config);

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        canceller.cancel();
    });

    tokio::time::timeout(std::time::Duration::from_secs(10), runner.run(token, false))
        .await
        .expect("run loop did not stop after cancellation")
        .unwrap();

    assert_eq!(runner.metrics().snapshot().passes, 1);
}
