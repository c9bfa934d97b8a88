//! Integration tests for playback: scheduling, rendering and transport dedup

mod common;
use common::*;

use segment_sequencer::protocol::{FRAME_MARKER, PACKET_LEN};
use segment_sequencer::{
    Button, Hardware, PressKind, Segment, SegmentName, Sequencer, Tick, Timestamp,
    TransportAction, Trigger, resolve_step,
};

#[test]
fn resolve_step_follows_half_open_intervals() {
    let mut project = new_project();
    let (seq, _) = current_ids(&project);
    let ids = set_durations(&mut project, seq, &[500, 300, 200]);
    let sequence = project.sequence(seq).unwrap();

    let at = |elapsed: u64| {
        resolve_step(sequence, Timestamp(0), Timestamp(elapsed))
            .unwrap()
            .index
    };
    assert_eq!(at(0), ids[0]);
    assert_eq!(at(499), ids[0]);
    assert_eq!(at(500), ids[1]);
    assert_eq!(at(799), ids[1]);
    assert_eq!(at(800), ids[2]);
    assert_eq!(at(999), ids[2]);
    assert_eq!(at(1000), ids[0]);
    assert_eq!(at(2650), ids[1]);
}

#[test]
fn clock_behind_start_wraps_backwards() {
    let mut project = new_project();
    let (seq, _) = current_ids(&project);
    let ids = set_durations(&mut project, seq, &[500, 300, 200]);
    let sequence = project.sequence(seq).unwrap();

    // 100ms before start is 900ms into the loop
    let step = resolve_step(sequence, Timestamp(1000), Timestamp(900)).unwrap();
    assert_eq!(step.index, ids[2]);
}

#[test]
fn same_frame_twice_is_sent_once() {
    let mut project = new_project();
    let (seq, _) = current_ids(&project);
    let ids = set_durations(&mut project, seq, &[100, 100]);
    project.play(Timestamp(0));

    let timer = MockTimeSource::new();
    let mut sequencer = Sequencer::new(MockTransport::new(), MockRenderer::new(), &timer);

    assert!(matches!(sequencer.tick(&project), Tick::Showing { sent: true, .. }));
    timer.set_time(150);
    // Second step is also blank: preview updates, transport stays quiet
    assert_eq!(
        sequencer.tick(&project),
        Tick::Showing {
            sequence: seq,
            step: ids[1],
            sent: false,
            remaining_ms: 50
        }
    );

    assert_eq!(sequencer.transport().packets().len(), 1);
    assert_eq!(sequencer.renderer().frames().len(), 2);
}

#[test]
fn each_step_change_sends_one_packet() {
    let mut project = new_project();
    let (seq, _) = current_ids(&project);
    let ids = set_durations(&mut project, seq, &[100, 100, 100]);
    project
        .toggle_segment(seq, ids[1], Segment::digit(5, SegmentName::B))
        .unwrap();
    project
        .set_hardware(
            seq,
            ids[2],
            Hardware {
                led_1: true,
                buzzer: 440,
                ..Hardware::default()
            },
        )
        .unwrap();
    project.play(Timestamp(0));

    let timer = MockTimeSource::new();
    let mut sequencer = Sequencer::new(MockTransport::new(), MockRenderer::new(), &timer);
    for t in (0..300).step_by(20) {
        timer.set_time(t);
        sequencer.tick(&project);
    }

    let packets = sequencer.transport().packets();
    assert_eq!(packets.len(), 3);
    assert!(packets.iter().all(|p| p[0] == FRAME_MARKER));
    assert_eq!(packets[2][PACKET_LEN - 1], b'G');
    assert_eq!(sequencer.renderer().frames().len(), 15);
    assert_eq!(sequencer.renderer().last_frame().unwrap().hardware().buzzer, 440);
}

#[test]
fn editing_the_showing_step_resends() {
    let mut project = new_project();
    let (seq, step) = current_ids(&project);
    project.play(Timestamp(0));

    let timer = MockTimeSource::new();
    let mut sequencer = Sequencer::new(MockTransport::new(), MockRenderer::new(), &timer);
    sequencer.tick(&project);

    let colon = Segment::special(SegmentName::Colon);
    project.toggle_segment(seq, step, colon).unwrap();
    timer.advance(16);
    assert!(matches!(sequencer.tick(&project), Tick::Showing { sent: true, .. }));
    assert!(sequencer.last_sent().unwrap().is_on(colon));
    assert!(project.is_playing());
}

#[test]
fn paused_project_is_silenced_once() {
    let mut project = new_project();
    project.play(Timestamp(0));

    let timer = MockTimeSource::new();
    let mut sequencer = Sequencer::new(MockTransport::new(), MockRenderer::new(), &timer);
    sequencer.tick(&project);

    project.pause();
    project.pause();
    assert_eq!(sequencer.tick(&project), Tick::Stopped);
    assert_eq!(sequencer.tick(&project), Tick::Stopped);
    assert_eq!(sequencer.renderer().silenced(), 1);
    assert_eq!(sequencer.renderer().frames().len(), 1);
    assert_eq!(sequencer.showing(), None);
}

#[test]
fn selecting_another_sequence_while_playing_restarts_it() {
    let mut project = new_project();
    let (first, _) = current_ids(&project);
    set_durations(&mut project, first, &[500, 300]);
    let second = project.add_sequence();
    let second_step = project.sequence(second).unwrap().steps()[0].index;
    project.play(Timestamp(0));

    let timer = MockTimeSource::new();
    let mut sequencer = Sequencer::new(MockTransport::new(), MockRenderer::new(), &timer);
    timer.set_time(700);
    sequencer.tick(&project);

    project.select_sequence(second, sequencer.now()).unwrap();
    assert_eq!(project.animation().start_time, Timestamp(700));
    assert_eq!(
        sequencer.tick(&project),
        Tick::Showing {
            sequence: second,
            step: second_step,
            sent: false,
            remaining_ms: 500
        }
    );
}

#[test]
fn play_pause_button_drives_playback() {
    let mut project = new_project();
    let (seq, _) = current_ids(&project);
    project
        .set_trigger(seq, Button::Light, Trigger::Transport(TransportAction::PlayPause))
        .unwrap();

    let timer = MockTimeSource::new();
    let mut sequencer = Sequencer::new(MockTransport::new(), MockRenderer::new(), &timer);
    assert_eq!(sequencer.tick(&project), Tick::Stopped);

    timer.set_time(40);
    project.handle_button(Button::Light, PressKind::Single, sequencer.now());
    assert!(matches!(sequencer.tick(&project), Tick::Showing { sent: true, .. }));

    project.handle_button(Button::Light, PressKind::Release, sequencer.now());
    assert!(project.is_playing());

    project.handle_button(Button::Light, PressKind::Long, sequencer.now());
    assert_eq!(sequencer.tick(&project), Tick::Stopped);
    assert_eq!(sequencer.transport().packets().len(), 1);
}
