//! Capture triggering tests
//!
//! Drive the dispatcher against a synthetic frame source with the
//! completion call held open by a gate.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::Notify;

use narrator::capture::{ANALYZING_STATUS, CaptureDispatcher, CaptureState};
use narrator::{Error, FrameSource, TestPattern};

mod common;
use common::{EventLog, MockCompletion, MockSpeaker};

struct Harness {
    dir: tempfile::TempDir,
    state: Arc<CaptureState>,
    completion: Arc<MockCompletion>,
    speaker: Arc<MockSpeaker>,
    dispatcher: CaptureDispatcher,
    frames: FrameSource,
}

fn harness(completion: MockCompletion) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(CaptureState::new());
    let completion = Arc::new(completion);
    let speaker = Arc::new(MockSpeaker::new(completion.log.clone()).observing(Arc::clone(&state)));
    let narrator = common::narrator(&completion, &speaker, dir.path());
    let dispatcher = CaptureDispatcher::new(Arc::clone(&state), narrator, Handle::current());

    let mut frames = FrameSource::open(|| Ok(TestPattern::new(640, 480, 0))).unwrap();
    frames.start();

    Harness {
        dir,
        state,
        completion,
        speaker,
        dispatcher,
        frames,
    }
}

#[tokio::test]
async fn test_single_trigger_runs_one_narration() {
    let gate = Arc::new(Notify::new());
    let mut h = harness(MockCompletion::new("A fine specimen.", EventLog::default()).gated(Arc::clone(&gate)));

    assert!(h.dispatcher.on_trigger(&h.frames.read()));
    assert!(h.state.is_busy());
    assert_eq!(h.state.status_text(), ANALYZING_STATUS);

    gate.notify_one();
    let outcome = h.dispatcher.wait().await.unwrap();
    assert!(outcome.is_ok());

    assert!(!h.state.is_busy());
    assert_eq!(h.state.status_text(), "");
    assert_eq!(h.completion.calls(), 1);
    assert_eq!(h.dispatcher.scheduled(), 1);

    h.frames.stop();
}

#[tokio::test]
async fn test_second_trigger_while_busy_is_ignored() {
    let gate = Arc::new(Notify::new());
    let mut h = harness(MockCompletion::new("ok", EventLog::default()).gated(Arc::clone(&gate)));

    assert!(h.dispatcher.on_trigger(&h.frames.read()));
    let before = h.state.snapshot();

    assert!(!h.dispatcher.on_trigger(&h.frames.read()));
    assert!(!h.dispatcher.on_trigger(&h.frames.read()));

    assert_eq!(h.state.snapshot(), before);
    assert_eq!(h.dispatcher.scheduled(), 1);
    assert_eq!(h.dispatcher.pending(), 1);

    gate.notify_one();
    h.dispatcher.wait().await.unwrap().unwrap();
    assert_eq!(h.completion.calls(), 1);

    h.frames.stop();
}

#[tokio::test]
async fn test_capture_released_before_speech() {
    let mut h = harness(MockCompletion::new("Observe the subject.", EventLog::default()));

    assert!(h.dispatcher.on_trigger(&h.frames.read()));
    h.dispatcher.wait().await.unwrap().unwrap();

    assert_eq!(*h.speaker.busy_when_speaking.lock().unwrap(), vec![false]);
    assert_eq!(
        h.completion.log.events(),
        vec!["complete".to_string(), "speak".to_string()]
    );

    h.frames.stop();
}

#[tokio::test]
async fn test_trigger_accepted_again_after_finish() {
    let mut h = harness(MockCompletion::new("ok", EventLog::default()));

    assert!(h.dispatcher.on_trigger(&h.frames.read()));
    h.dispatcher.wait().await.unwrap().unwrap();

    assert!(h.dispatcher.on_trigger(&h.frames.read()));
    h.dispatcher.wait().await.unwrap().unwrap();

    assert_eq!(h.dispatcher.scheduled(), 2);
    assert_eq!(h.completion.calls(), 2);
    assert_eq!(h.speaker.spoken.lock().unwrap().len(), 2);

    h.frames.stop();
}

#[tokio::test]
async fn test_failed_completion_keeps_capture_blocked() {
    let mut h = harness(MockCompletion::new("unused", EventLog::default()).failing());

    assert!(h.dispatcher.on_trigger(&h.frames.read()));
    let outcome = h.dispatcher.wait().await.unwrap();
    assert!(matches!(outcome, Err(Error::Vision(_))));

    assert!(h.state.is_busy());
    assert_eq!(h.state.status_text(), ANALYZING_STATUS);
    assert!(!h.dispatcher.on_trigger(&h.frames.read()));
    assert_eq!(h.dispatcher.scheduled(), 1);
    assert!(h.speaker.spoken.lock().unwrap().is_empty());

    h.frames.stop();
}

#[tokio::test]
async fn test_requests_are_stateless_by_default() {
    let mut h = harness(MockCompletion::new("First look.", EventLog::default()));

    h.dispatcher.on_trigger(&h.frames.read());
    h.dispatcher.wait().await.unwrap().unwrap();
    h.dispatcher.on_trigger(&h.frames.read());
    h.dispatcher.wait().await.unwrap().unwrap();

    let requests = h.completion.requests.lock().unwrap().clone();
    assert_eq!(requests[0].len(), 2);
    assert_eq!(requests[1].len(), 2);
    assert!(h.dispatcher.script().is_empty());

    h.frames.stop();
}

#[tokio::test]
async fn test_keep_context_threads_replies() {
    let mut h = harness(MockCompletion::new("Another look.", EventLog::default()));
    h.dispatcher = CaptureDispatcher::new(
        Arc::clone(&h.state),
        common::narrator(&h.completion, &h.speaker, h.dir.path()),
        Handle::current(),
    )
    .keep_context(true);

    h.dispatcher.on_trigger(&h.frames.read());
    h.dispatcher.wait().await.unwrap().unwrap();
    h.dispatcher.on_trigger(&h.frames.read());
    h.dispatcher.wait().await.unwrap().unwrap();

    let requests = h.completion.requests.lock().unwrap().clone();
    // system + user, then system + assistant + user
    assert_eq!(requests[0].len(), 2);
    assert_eq!(requests[1].len(), 3);
    assert_eq!(requests[1][1].text(), "Another look.");
    assert_eq!(h.dispatcher.script().len(), 2);

    h.frames.stop();
}

#[tokio::test]
async fn test_busy_state_is_observable() {
    let gate = Arc::new(Notify::new());
    let mut h = harness(MockCompletion::new("ok", EventLog::default()).gated(Arc::clone(&gate)));
    let mut status = h.state.subscribe();

    h.dispatcher.on_trigger(&h.frames.read());
    assert!(status.borrow_and_update().busy);

    gate.notify_one();
    status.wait_for(|s| !s.busy).await.unwrap();
    assert_eq!(status.borrow().text, "");

    h.dispatcher.wait().await.unwrap().unwrap();
    h.frames.stop();
}

#[tokio::test]
async fn test_keep_context_while_previous_reply_is_spoken() {
    let dir = tempfile::tempdir().unwrap();
    let log = EventLog::default();
    let state = Arc::new(CaptureState::new());
    let playback = Arc::new(Notify::new());
    let completion = Arc::new(MockCompletion::new("Still watching.", log.clone()));
    let speaker = Arc::new(MockSpeaker::new(log).gated(Arc::clone(&playback)));
    let narrator = common::narrator(&completion, &speaker, dir.path());
    let mut dispatcher =
        CaptureDispatcher::new(Arc::clone(&state), narrator, Handle::current()).keep_context(true);

    let mut frames = FrameSource::open(|| Ok(TestPattern::new(640, 480, 0))).unwrap();
    frames.start();

    // First narration is described, then held in playback
    assert!(dispatcher.on_trigger(&frames.read()));
    state.wait_idle().await;
    assert_eq!(dispatcher.script().len(), 1);

    // Second capture while the first is still speaking
    assert!(dispatcher.on_trigger(&frames.read()));
    state.wait_idle().await;
    assert_eq!(dispatcher.pending(), 2);

    playback.notify_one();
    let first = dispatcher.wait().await.unwrap().unwrap();
    playback.notify_one();
    let second = dispatcher.wait().await.unwrap().unwrap();

    let requests = completion.requests.lock().unwrap().clone();
    assert_eq!(requests[0].len(), 2);
    assert_eq!(requests[1].len(), 3);
    assert_eq!(requests[1][1].text(), "Still watching.");

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 2);
    assert_eq!(dispatcher.script().len(), 2);

    frames.stop();
}
