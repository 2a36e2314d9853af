use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use triviavisor::{
    Catalog, Config, Event, EventKind, MemoryPublisher, RuntimeError, Supervisor, TallyMode,
};

fn single_question() -> Catalog {
    Catalog::from_pairs([("2+2?", ["3", "4", "5", "6"])]).unwrap()
}

fn config(players: usize, max_rounds: u64) -> Config {
    Config {
        players,
        interval: Duration::from_secs(10),
        max_rounds,
        seed: Some(2024),
        ..Config::default()
    }
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        events.push(ev);
    }
    events
}

fn count(events: &[Event], kind: EventKind) -> usize {
    events.iter().filter(|e| e.kind == kind).count()
}

#[tokio::test(start_paused = true)]
async fn two_players_answer_a_single_round() {
    let sink = Arc::new(MemoryPublisher::new());
    let sup = Supervisor::builder(config(2, 1))
        .with_catalog(single_question())
        .with_publisher(sink.clone())
        .build()
        .unwrap();
    let mut rx = sup.subscribe();

    sup.run().await.unwrap();
    let events = drain(&mut rx);

    let delivered: Vec<&Event> = events
        .iter()
        .filter(|e| e.kind == EventKind::RoundDelivered)
        .collect();
    assert_eq!(delivered.len(), 2);
    assert!(delivered.iter().all(|e| e.question.as_deref() == Some("2+2?")));
    let mut players: Vec<u32> = delivered.iter().filter_map(|e| e.player).collect();
    players.sort_unstable();
    assert_eq!(players, vec![1, 2]);

    assert_eq!(count(&events, EventKind::AnswerTallied), 2);
    assert_eq!(sink.len(), 2);
    let last = sink.latest().unwrap();
    assert_eq!(last.total(), 2);
    assert!(last.counts().keys().all(|choice| *choice < 4));
}

#[tokio::test(start_paused = true)]
async fn zero_players_produce_no_answers() {
    let sink = Arc::new(MemoryPublisher::new());
    let sup = Supervisor::builder(config(0, 2))
        .with_publisher(sink.clone())
        .build()
        .unwrap();
    let mut rx = sup.subscribe();

    sup.run().await.unwrap();
    let events = drain(&mut rx);

    assert_eq!(count(&events, EventKind::RoundGenerated), 2);
    assert_eq!(count(&events, EventKind::RoundDelivered), 0);
    assert_eq!(count(&events, EventKind::AnswerSubmitted), 0);
    assert!(sink.is_empty());
    assert_eq!(count(&events, EventKind::WorkerFailed), 0);
}

#[tokio::test(start_paused = true)]
async fn zero_players_stop_cleanly_on_shutdown() {
    let sink = Arc::new(MemoryPublisher::new());
    let sup = Supervisor::builder(config(0, 0))
        .with_publisher(sink.clone())
        .build()
        .unwrap();
    let mut rx = sup.subscribe();

    sup.run_until(tokio::time::sleep(Duration::from_secs(25)))
        .await
        .unwrap();
    let events = drain(&mut rx);

    assert_eq!(count(&events, EventKind::RoundGenerated), 2);
    assert_eq!(count(&events, EventKind::RoundDelivered), 0);
    assert_eq!(count(&events, EventKind::AnswerSubmitted), 0);
    assert!(sink.is_empty());
    assert_eq!(count(&events, EventKind::ShutdownRequested), 1);
    assert_eq!(count(&events, EventKind::AllStoppedWithin), 1);
    assert_eq!(count(&events, EventKind::WorkerFailed), 0);
    // source, broadcaster, tally, publisher
    assert_eq!(count(&events, EventKind::WorkerStopped), 4);
}

#[tokio::test(start_paused = true)]
async fn cancellation_before_the_first_round_emits_nothing() {
    let sink = Arc::new(MemoryPublisher::new());
    let sup = Supervisor::builder(config(3, 0))
        .with_publisher(sink.clone())
        .build()
        .unwrap();
    let mut rx = sup.subscribe();

    sup.run_until(async {}).await.unwrap();
    let events = drain(&mut rx);

    assert_eq!(count(&events, EventKind::RoundGenerated), 0);
    assert_eq!(count(&events, EventKind::AnswerSubmitted), 0);
    assert!(sink.is_empty());
    assert_eq!(count(&events, EventKind::AllStoppedWithin), 1);
    assert_eq!(count(&events, EventKind::WorkerFailed), 0);
    // source, broadcaster, tally, 3 players, publisher
    assert_eq!(count(&events, EventKind::WorkerStopped), 7);
}

#[tokio::test(start_paused = true)]
async fn shutdown_requested_before_run_stops_immediately() {
    let sup = Supervisor::builder(config(2, 0))
        .with_publisher(Arc::new(MemoryPublisher::new()))
        .build()
        .unwrap();
    let handle = sup.shutdown_handle();
    assert!(handle.trigger());

    let started = tokio::time::Instant::now();
    sup.run().await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn triggering_twice_equals_triggering_once() {
    let sup = Supervisor::builder(config(1, 0))
        .with_publisher(Arc::new(MemoryPublisher::new()))
        .build()
        .unwrap();
    let mut rx = sup.subscribe();
    let handle = sup.shutdown_handle();

    let stopper = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(25)).await;
        let first = handle.trigger();
        let second = handle.trigger();
        (first, second)
    });

    sup.run().await.unwrap();
    assert_eq!(stopper.await.unwrap(), (true, false));
    assert!(!sup.shutdown());

    let events = drain(&mut rx);
    assert_eq!(count(&events, EventKind::ShutdownRequested), 1);
}

#[tokio::test(start_paused = true)]
async fn every_player_sees_every_round_in_order() {
    let sup = Supervisor::builder(config(3, 4))
        .with_publisher(Arc::new(MemoryPublisher::new()))
        .build()
        .unwrap();
    let mut rx = sup.subscribe();

    sup.run().await.unwrap();

    let mut seen: BTreeMap<u32, Vec<u64>> = BTreeMap::new();
    for ev in drain(&mut rx) {
        if ev.kind == EventKind::RoundDelivered {
            seen.entry(ev.player.unwrap())
                .or_default()
                .push(ev.round.unwrap());
        }
    }
    assert_eq!(seen.len(), 3);
    for rounds in seen.values() {
        assert_eq!(rounds, &vec![1, 2, 3, 4]);
    }
}

#[tokio::test(start_paused = true)]
async fn per_round_mode_only_counts_the_current_round() {
    let sink = Arc::new(MemoryPublisher::new());
    let sup = Supervisor::builder(Config {
        tally_mode: TallyMode::PerRound,
        ..config(2, 3)
    })
    .with_publisher(sink.clone())
    .build()
    .unwrap();

    sup.run().await.unwrap();

    let snapshots = sink.snapshots();
    assert_eq!(snapshots.len(), 6);
    for snap in &snapshots {
        assert!(snap.total() <= 2, "round {} leaked into the next", snap.round());
    }
    assert_eq!(sink.latest().map(|s| (s.round(), s.total())), Some((3, 2)));
}

#[tokio::test(start_paused = true)]
async fn run_can_only_be_called_once() {
    let sup = Supervisor::builder(config(1, 1))
        .with_publisher(Arc::new(MemoryPublisher::new()))
        .build()
        .unwrap();

    sup.run().await.unwrap();
    assert!(matches!(sup.run().await, Err(RuntimeError::AlreadyStarted)));
}
