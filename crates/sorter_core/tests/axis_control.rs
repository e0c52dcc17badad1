use sorter_core::{
    AxisRegister, AxisStatePatch, CommandPatch, CommandQueue, Fanout, HomingMode, MotionState,
    PendingCommands, Topic,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const HOMING_DELAY: Duration = Duration::from_secs(2);

fn register(mode: HomingMode) -> (Arc<AxisRegister>, Fanout) {
    let fanout = Fanout::new(32);
    let register = Arc::new(AxisRegister::new(fanout.clone(), mode, HOMING_DELAY));
    (register, fanout)
}

#[test]
fn queue_drains_both_slots_then_reports_empty() {
    let queue = CommandQueue::new();
    queue.enqueue(&CommandPatch {
        jog_mm: Some(10.0),
        home: None,
    });
    queue.enqueue(&CommandPatch {
        jog_mm: None,
        home: Some(true),
    });

    assert_eq!(
        queue.drain(),
        PendingCommands {
            jog_mm: Some(10.0),
            home: true
        }
    );
    assert_eq!(
        queue.drain(),
        PendingCommands {
            jog_mm: None,
            home: false
        }
    );
}

#[test]
fn queue_keeps_only_latest_jog() {
    let queue = CommandQueue::new();
    queue.enqueue(&CommandPatch {
        jog_mm: Some(10.0),
        home: None,
    });
    queue.enqueue(&CommandPatch {
        jog_mm: Some(-4.5),
        home: None,
    });

    assert_eq!(queue.peek().jog_mm, Some(-4.5));
    assert_eq!(queue.drain().jog_mm, Some(-4.5));
}

#[test]
fn drain_never_erases_a_later_enqueue() {
    let queue = Arc::new(CommandQueue::new());
    let rounds = 5_000;

    let producer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            for n in 1..=rounds {
                queue.enqueue(&CommandPatch {
                    jog_mm: Some(f64::from(n)),
                    home: None,
                });
            }
        })
    };

    let mut drained = Vec::new();
    while !producer.is_finished() {
        drained.extend(queue.drain().jog_mm);
    }
    producer.join().unwrap();
    drained.extend(queue.drain().jog_mm);

    // Each drain returns the latest value, so values only grow, and the
    // final enqueue must surface in some drain.
    assert!(drained.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(drained.last(), Some(&f64::from(rounds)));
    assert_eq!(queue.drain(), PendingCommands::default());
}

#[test]
fn jog_from_idle_moves_and_stays_moving() {
    let (register, fanout) = register(HomingMode::Latest);
    let mut session = fanout.subscribe();

    let state = register.jog(15.0);
    assert_eq!(state.state, MotionState::Moving);
    assert_eq!(state.pos_mm, 15.0);
    assert!(state.homed);
    assert!(state.ts.is_some());

    let second = register.jog(-5.0);
    assert_eq!(second.pos_mm, 10.0);
    assert_eq!(second.state, MotionState::Moving);

    let pushed = session.try_recv().unwrap();
    assert_eq!(pushed.event, Topic::Axis);
    assert_eq!(pushed.data["pos_mm"], 15.0);
    assert_eq!(session.try_recv().unwrap().data["pos_mm"], 10.0);
}

#[test]
fn set_state_only_changes_present_fields() {
    let (register, fanout) = register(HomingMode::Latest);
    let mut session = fanout.subscribe();

    let state = register.set_state(AxisStatePatch {
        pos_mm: Some(42.0),
        ts: Some("2024-05-01T10:00:00Z".to_string()),
        ..AxisStatePatch::default()
    });
    assert_eq!(state.state, MotionState::Idle);
    assert!(state.homed);
    assert_eq!(state.pos_mm, 42.0);
    assert_eq!(state.ts.as_deref(), Some("2024-05-01T10:00:00Z"));

    let state = register.set_state(AxisStatePatch {
        state: Some("CALIBRATING".to_string()),
        homed: Some(false),
        ..AxisStatePatch::default()
    });
    assert_eq!(state.state, MotionState::Other("CALIBRATING".to_string()));
    assert_eq!(state.pos_mm, 42.0);
    assert_ne!(state.ts.as_deref(), Some("2024-05-01T10:00:00Z"));

    assert_eq!(session.try_recv().unwrap().data["pos_mm"], 42.0);
    assert_eq!(session.try_recv().unwrap().data["state"], "CALIBRATING");
}

#[tokio::test(start_paused = true)]
async fn home_enters_homing_then_completes_after_delay() {
    let (register, fanout) = register(HomingMode::Latest);
    register.jog(30.0);
    let mut session = fanout.subscribe();

    let (state, completion) = register.home();
    assert_eq!(state.state, MotionState::Homing);
    assert!(!state.homed);
    assert_eq!(state.pos_mm, 30.0);

    tokio::time::sleep(HOMING_DELAY - Duration::from_millis(1)).await;
    assert_eq!(register.snapshot().state, MotionState::Homing);

    let finished = completion.await.unwrap().expect("completion should apply");
    assert_eq!(finished.state, MotionState::Idle);
    assert!(finished.homed);
    assert_eq!(finished.pos_mm, 0.0);
    assert_eq!(register.snapshot(), finished);

    let pushed = std::iter::from_fn(|| session.try_recv())
        .map(|message| message.data["state"].clone())
        .collect::<Vec<_>>();
    assert_eq!(pushed, ["HOMING", "IDLE"]);
}

#[tokio::test(start_paused = true)]
async fn superseded_homing_completion_is_ignored() {
    let (register, fanout) = register(HomingMode::Latest);
    let mut session = fanout.subscribe();

    let (_, first) = register.home();
    tokio::time::sleep(Duration::from_secs(1)).await;
    let (_, second) = register.home();

    assert_eq!(first.await.unwrap(), None);
    assert_eq!(register.snapshot().state, MotionState::Homing);

    let finished = second.await.unwrap().expect("latest completion should apply");
    assert_eq!(finished.state, MotionState::Idle);

    let states = std::iter::from_fn(|| session.try_recv())
        .map(|message| message.data["state"].clone())
        .collect::<Vec<_>>();
    assert_eq!(states, ["HOMING", "HOMING", "IDLE"]);
}

#[tokio::test(start_paused = true)]
async fn every_mode_applies_each_completion() {
    let (register, _fanout) = register(HomingMode::Every);

    let (_, first) = register.home();
    tokio::time::sleep(Duration::from_secs(1)).await;
    let (_, second) = register.home();

    let early = first.await.unwrap().expect("every completion applies");
    assert_eq!(early.state, MotionState::Idle);
    assert!(second.await.unwrap().is_some());
}

#[test]
fn homing_mode_parses_known_values() {
    assert_eq!("LATEST".parse::<HomingMode>().unwrap(), HomingMode::Latest);
    assert_eq!(" every ".parse::<HomingMode>().unwrap(), HomingMode::Every);
    assert!("sometimes".parse::<HomingMode>().is_err());
}
