use super::*;
use crate::test_helpers::{member, message, rank_query, MemoryDirectory, RecordingMessenger};
use crate::domain::GroupMember;

const INTERVAL: Duration = Duration::from_secs(180);

fn service(members: Vec<GroupMember>, messenger: Arc<RecordingMessenger>) -> ScoreboardService {
    let directory = Arc::new(MemoryDirectory::with_members(members));
    ScoreboardService::new(
        Arc::new(ScoreboardRegistry::new()),
        rank_query(directory),
        messenger,
        INTERVAL,
    )
}

fn instance() -> ChatInstance {
    ChatInstance("chat-instance-1".into())
}

#[tokio::test(start_paused = true)]
async fn ranks_renders_and_excludes_banned_members() {
    let messenger = Arc::new(RecordingMessenger::default());
    let members = vec![
        GroupMember { handle: Some("a".into()), ..member(1, "A", 10, false) },
        GroupMember { handle: Some("b".into()), ..member(2, "B", 5, false) },
        GroupMember { handle: Some("c".into()), ..member(3, "C", 20, true) },
    ];
    let scoreboards = service(members, messenger.clone());

    scoreboards.turn_into_scoreboard(instance(), message(1), -1001).await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    let pushes = messenger.pushes();
    assert_eq!(pushes.len(), 1);
    let text = &pushes[0].1;
    let a = text.find("1. A (@a) — <b>10 days</b>").expect("A ranked first");
    let b = text.find("2. B (@b) — <b>5 days</b>").expect("B ranked second");
    assert!(a < b);
    assert!(!text.contains("@c"));

    scoreboards.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn new_message_supersedes_old_loop() {
    let messenger = Arc::new(RecordingMessenger::default());
    let scoreboards = service(vec![member(1, "A", 1, false)], messenger.clone());

    scoreboards.turn_into_scoreboard(instance(), message(1), -1001).await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(messenger.pushes_to(message(1)), 1);

    scoreboards.turn_into_scoreboard(instance(), message(2), -1001).await;
    assert!(!scoreboards.registry().is_current(&instance(), message(1)).await);
    assert!(scoreboards.registry().is_current(&instance(), message(2)).await);

    tokio::time::sleep(INTERVAL * 3 + Duration::from_secs(1)).await;
    assert_eq!(messenger.pushes_to(message(1)), 1);
    assert_eq!(messenger.pushes_to(message(2)), 4);

    scoreboards.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn different_instances_refresh_independently() {
    let messenger = Arc::new(RecordingMessenger::default());
    let scoreboards = service(vec![member(1, "A", 1, false)], messenger.clone());

    scoreboards.turn_into_scoreboard(ChatInstance("one".into()), message(1), -1001).await;
    scoreboards.turn_into_scoreboard(ChatInstance("two".into()), message(2), -1002).await;
    tokio::time::sleep(INTERVAL + Duration::from_secs(1)).await;

    assert_eq!(messenger.pushes_to(message(1)), 2);
    assert_eq!(messenger.pushes_to(message(2)), 2);
    assert_eq!(scoreboards.registry().active_count().await, 2);

    scoreboards.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_every_loop() {
    let messenger = Arc::new(RecordingMessenger::default());
    let scoreboards = service(vec![member(1, "A", 1, false)], messenger.clone());

    scoreboards.turn_into_scoreboard(ChatInstance("one".into()), message(1), -1001).await;
    scoreboards.turn_into_scoreboard(ChatInstance("two".into()), message(2), -1002).await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    scoreboards.shutdown().await;
    let pushed = messenger.pushes().len();

    tokio::time::sleep(INTERVAL * 4).await;
    assert_eq!(messenger.pushes().len(), pushed);
    assert_eq!(scoreboards.registry().active_count().await, 0);
}
