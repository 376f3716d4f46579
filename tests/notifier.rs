use std::time::Duration;

use anyhow::Result;
use block_notifier::{
    config::Config,
    notifier::{self, Cycle, Notifier, StartupError},
    pool_client::FetchError,
    test_utils::{MockMessenger, MockStatsSource},
};
use clap::Parser;
use tokio_util::sync::CancellationToken;

const CHAT_ID: i64 = -1001234567890;

async fn new_notifier(
    source: &MockStatsSource,
    messenger: &MockMessenger,
) -> Result<Notifier<MockStatsSource, MockMessenger>> {
    Ok(Notifier::start(source.clone(), messenger.clone(), "@pool_blocks").await?)
}

#[tokio::test]
async fn test_same_height_twice_sends_once() -> Result<()> {
    let source = MockStatsSource::new();
    let messenger = MockMessenger::new(CHAT_ID);
    source.push_block(100);
    source.push_block(100);

    let mut notifier = new_notifier(&source, &messenger).await?;
    assert_eq!(notifier.chat_id(), CHAT_ID);
    assert_eq!(notifier.poll_once().await, Cycle::Notified { height: 100 });
    assert_eq!(notifier.poll_once().await, Cycle::Unchanged { height: 100 });

    let sent = messenger.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, notifier.chat_id());
    assert!(sent[0].1.contains("Height: 100"));
    assert!(sent[0].1.starts_with("New block found.\nCoin: ETC-SOLO\n"));

    Ok(())
}

#[tokio::test]
async fn test_first_fetch_always_notifies() -> Result<()> {
    for height in [-1, 0, 1, i64::MAX] {
        let source = MockStatsSource::new();
        let messenger = MockMessenger::new(CHAT_ID);
        source.push_block(height);

        let mut notifier = new_notifier(&source, &messenger).await?;
        assert_eq!(notifier.last_height(), None);
        assert_eq!(notifier.poll_once().await, Cycle::Notified { height });
        assert_eq!(messenger.sent().len(), 1);
    }

    Ok(())
}

#[tokio::test]
async fn test_new_height_sends_again() -> Result<()> {
    let source = MockStatsSource::new();
    let messenger = MockMessenger::new(CHAT_ID);
    source.push_block(100);
    source.push_block(101);

    let mut notifier = new_notifier(&source, &messenger).await?;
    notifier.poll_once().await;
    assert_eq!(notifier.poll_once().await, Cycle::Notified { height: 101 });

    let sent = messenger.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].1.contains("Height: 101"));

    Ok(())
}

#[tokio::test]
async fn test_fetch_failure_keeps_last_height() -> Result<()> {
    let source = MockStatsSource::new();
    let messenger = MockMessenger::new(CHAT_ID);
    source.push_block(100);
    source.push(Err(FetchError::NoMaturedBlocks));
    source.push(Err(FetchError::MalformedField("height")));
    source.push_block(100);

    let mut notifier = new_notifier(&source, &messenger).await?;
    notifier.poll_once().await;
    assert_eq!(notifier.poll_once().await, Cycle::FetchFailed);
    assert_eq!(notifier.poll_once().await, Cycle::FetchFailed);
    assert_eq!(notifier.last_height(), Some(100));
    assert_eq!(notifier.poll_once().await, Cycle::Unchanged { height: 100 });
    assert_eq!(messenger.sent().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_empty_matured_on_first_poll_sends_nothing() -> Result<()> {
    let source = MockStatsSource::new();
    let messenger = MockMessenger::new(CHAT_ID);
    source.push(Err(FetchError::NoMaturedBlocks));

    let mut notifier = new_notifier(&source, &messenger).await?;
    assert_eq!(notifier.poll_once().await, Cycle::FetchFailed);
    assert_eq!(notifier.last_height(), None);
    assert!(messenger.sent().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_send_failure_commits_height() -> Result<()> {
    let source = MockStatsSource::new();
    let messenger = MockMessenger::new(CHAT_ID);
    messenger.fail_next_sends(1);
    source.push_block(100);
    source.push_block(100);
    source.push_block(101);

    let mut notifier = new_notifier(&source, &messenger).await?;
    assert_eq!(notifier.poll_once().await, Cycle::SendFailed { height: 100 });
    assert_eq!(notifier.last_height(), Some(100));
    assert_eq!(notifier.poll_once().await, Cycle::Unchanged { height: 100 });
    assert_eq!(notifier.poll_once().await, Cycle::Notified { height: 101 });

    let sent = messenger.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("Height: 101"));

    Ok(())
}

#[tokio::test]
async fn test_unresolvable_channel_is_fatal() -> Result<()> {
    let source = MockStatsSource::new();
    let messenger = MockMessenger::unresolvable();
    source.push_block(100);

    let result = Notifier::start(source.clone(), messenger.clone(), "@nobody").await;
    match result {
        Err(StartupError::ResolveChannel { channel, .. }) => assert_eq!(channel, "@nobody"),
        Ok(_) => panic!("expected startup failure"),
    }
    assert_eq!(source.fetches(), 0);
    assert!(messenger.sent().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_run_polls_until_cancelled() -> Result<()> {
    let source = MockStatsSource::new();
    let messenger = MockMessenger::new(CHAT_ID);
    source.push_block(100);
    source.push_block(100);
    source.push_block(101);

    let notifier = new_notifier(&source, &messenger).await?;
    let cancel_token = CancellationToken::new();
    let handle = tokio::spawn(notifier.run(Duration::from_millis(10), cancel_token.clone()));

    for _ in 0..200 {
        if source.fetches() >= 4 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cancel_token.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle).await??;

    assert!(source.fetches() >= 4);
    let heights: Vec<bool> = messenger
        .sent()
        .iter()
        .map(|(_, text)| text.contains("Height: 101"))
        .collect();
    assert_eq!(heights, vec![false, true]);

    Ok(())
}

#[tokio::test]
async fn test_cancel_interrupts_sleep() -> Result<()> {
    let source = MockStatsSource::new();
    let messenger = MockMessenger::new(CHAT_ID);
    source.push_block(100);

    let notifier = new_notifier(&source, &messenger).await?;
    let cancel_token = CancellationToken::new();
    let handle = tokio::spawn(notifier.run(Duration::from_secs(600), cancel_token.clone()));

    for _ in 0..200 {
        if source.fetches() >= 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cancel_token.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle).await??;

    assert_eq!(source.fetches(), 1);
    assert_eq!(messenger.sent().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_run_returns_startup_error_without_polling() -> Result<()> {
    let config = Config::try_parse_from([
        "block-notifier",
        "--stats-url",
        "http://127.0.0.1:1/api/blocks",
        "--telegram-bot-token",
        "123:abc",
        "--channel",
        "@nobody",
    ])?;
    let source = MockStatsSource::new();
    let messenger = MockMessenger::unresolvable();
    source.push_block(100);

    let result = notifier::run(&config, source.clone(), messenger.clone(), CancellationToken::new()).await;

    let err = result.expect_err("channel resolution must fail");
    assert!(matches!(err, StartupError::ResolveChannel { ref channel, .. } if channel == "@nobody"));
    assert!(err.to_string().contains("chat not found"));
    assert_eq!(source.fetches(), 0);

    Ok(())
}
