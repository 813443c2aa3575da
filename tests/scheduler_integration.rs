/*
 *  tests/scheduler_integration.rs
 *
 *  Task switching and sink failure handling against a mock sink
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 */

use std::time::{Duration, Instant};

use pixeldeck::display::components::{ClockMode, TimeFormat};
use pixeldeck::display::drivers::MockSink;
use pixeldeck::display::font::FontTable;
use pixeldeck::display::generators::{AnimationKind, AnimationParams, GeneratorState};
use pixeldeck::display::scheduler::{Scheduler, SchedulerEvent, SchedulerPolicy};
use pixeldeck::display::task::{AnimationTask, ClockTask, StockTask, TaskKind, TaskSpec, TextTask};
use pixeldeck::display::traits::{PanelCommand, PanelGeometry};
use pixeldeck::vframebuf::Frame;

fn geometry() -> PanelGeometry {
    PanelGeometry::new(48, 12).unwrap()
}

fn scheduler(sink: &MockSink, policy: SchedulerPolicy) -> Scheduler {
    Scheduler::new(geometry(), FontTable::new(), policy, Box::new(sink.clone()))
}

fn animation(kind: AnimationKind, seed: u64) -> TaskSpec {
    TaskSpec::Animation(AnimationTask {
        kind,
        params: AnimationParams { fps: 10, seed: Some(seed), ..Default::default() },
    })
}

fn dedup(frames: Vec<Frame>) -> Vec<Frame> {
    let mut out: Vec<Frame> = Vec::new();
    for f in frames {
        if out.last() != Some(&f) {
            out.push(f);
        }
    }
    out
}

#[test]
fn switching_leaves_no_tick_from_previous_task() {
    let sink = MockSink::new();
    let state = sink.state();
    let mut s = scheduler(&sink, SchedulerPolicy::default());
    let t0 = Instant::now();

    s.switch_to_at(animation(AnimationKind::Fire, 1), t0);
    for i in 0..5 {
        s.poll(t0 + Duration::from_millis(100 * i));
    }
    let before = state.lock().unwrap().frames.len();
    assert!(before > 0);

    let t1 = t0 + Duration::from_millis(450);
    s.switch_to_at(animation(AnimationKind::Plasma, 2), t1);
    for i in 0..20 {
        s.poll(t1 + Duration::from_millis(100 * i));
    }

    // every frame after the switch is what a fresh plasma run produces
    let g = geometry();
    let params = AnimationParams { fps: 10, seed: Some(2), ..Default::default() }.normalized();
    let mut plasma = GeneratorState::new(AnimationKind::Plasma, g, &params);
    let expected = dedup((0..20).map(|_| plasma.step(g, &params)).collect());
    let after: Vec<Frame> = state.lock().unwrap().frames[before..].to_vec();
    assert_eq!(after, expected);
}

#[test]
fn ticker_to_text_sends_only_the_command() {
    let sink = MockSink::new();
    let state = sink.state();
    let mut s = scheduler(&sink, SchedulerPolicy::default());
    let t0 = Instant::now();

    s.switch_to_at(TaskSpec::Stock(StockTask { ticker: "MSFT".into(), ..Default::default() }), t0);
    s.poll(t0);
    let frames = state.lock().unwrap().frames.len();

    s.switch_to_at(TaskSpec::Text(TextTask { text: "hello".into(), ..Default::default() }), t0);
    for i in 0..50 {
        s.poll(t0 + Duration::from_millis(100 * i));
    }
    let st = state.lock().unwrap();
    assert_eq!(st.frames.len(), frames);
    assert_eq!(st.commands.len(), 1);
    assert!(matches!(&st.commands[0], PanelCommand::Text { text, .. } if text == "hello"));
    drop(st);
    assert!(s.is_active(TaskKind::Text));
    assert!(s.take_fetch_requests().is_empty());
}

#[test]
fn clock_then_stop_is_idle() {
    let sink = MockSink::new();
    let mut s = scheduler(&sink, SchedulerPolicy::default());
    let t0 = Instant::now();
    s.switch_to_at(
        TaskSpec::Clock(ClockTask { clock: ClockMode::Custom { format: TimeFormat::Hms24 }, ..Default::default() }),
        t0,
    );
    s.poll(t0);
    s.stop();
    assert_eq!(s.job_count(), 0);
    assert_eq!(s.current_kind(), None);
    assert!(!s.is_active(TaskKind::Clock));
    let events = s.drain_events();
    assert_eq!(
        events.last(),
        Some(&SchedulerEvent::Switched { from: Some(TaskKind::Clock), to: None })
    );
}

#[test]
fn stop_when_idle_is_quiet() {
    let sink = MockSink::new();
    let mut s = scheduler(&sink, SchedulerPolicy::default());
    s.stop();
    s.stop();
    assert!(s.drain_events().is_empty());
    assert_eq!(s.next_deadline(), None);
}

#[test]
fn transient_failures_do_not_stop() {
    let sink = MockSink::new();
    let state = sink.state();
    state.lock().unwrap().fail_next = 4;
    let mut s = scheduler(&sink, SchedulerPolicy { sink_failure_threshold: 5, ..Default::default() });
    let t0 = Instant::now();
    s.switch_to_at(animation(AnimationKind::Plasma, 4), t0);
    for i in 0..10 {
        s.poll(t0 + Duration::from_millis(100 * i));
    }
    assert!(s.is_active(TaskKind::Animation(AnimationKind::Plasma)));
    assert_eq!(s.consecutive_failures(), 0);
    assert_eq!(state.lock().unwrap().frames.len(), 6);
}

#[test]
fn zero_threshold_never_auto_stops() {
    let sink = MockSink::new();
    sink.state().lock().unwrap().simulate_send_failure = true;
    let mut s = scheduler(&sink, SchedulerPolicy { sink_failure_threshold: 0, ..Default::default() });
    let t0 = Instant::now();
    s.switch_to_at(animation(AnimationKind::Matrix, 4), t0);
    for i in 0..50 {
        s.poll(t0 + Duration::from_millis(100 * i));
    }
    assert!(s.current_kind().is_some());
    assert_eq!(s.consecutive_failures(), 50);
}

#[test]
fn failure_threshold_auto_stops() {
    let sink = MockSink::new();
    sink.state().lock().unwrap().simulate_send_failure = true;
    let mut s = scheduler(&sink, SchedulerPolicy { sink_failure_threshold: 5, ..Default::default() });
    let t0 = Instant::now();
    s.switch_to_at(animation(AnimationKind::Starfield, 4), t0);
    for i in 0..10 {
        s.poll(t0 + Duration::from_millis(100 * i));
    }
    assert_eq!(s.current_kind(), None);
    assert_eq!(s.job_count(), 0);
    let events = s.drain_events();
    assert!(events.contains(&SchedulerEvent::AutoStopped {
        kind: TaskKind::Animation(AnimationKind::Starfield),
        failures: 5
    }));
    // a fresh switch starts with a clean count
    sink.state().lock().unwrap().simulate_send_failure = false;
    s.switch_to_at(animation(AnimationKind::Plasma, 1), t0);
    s.poll(t0);
    assert_eq!(s.consecutive_failures(), 0);
}
