//! Integration tests for tumble-telemetry.

use tumble_telemetry::{EventBus, EventKind, SimulationEvent, VecSink};

#[test]
fn disabled_bus_drops_events() {
    let mut bus = EventBus::new();
    assert!(!bus.is_enabled());

    bus.emit(SimulationEvent::new(0, EventKind::StepBegin { dt: 0.016 }));
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));
    bus.flush();

    // The event was emitted before the sink existed while disabled.
    assert!(sink.is_empty());
}

#[test]
fn flush_delivers_to_all_sinks() {
    let mut bus = EventBus::new();
    let sink_a = VecSink::new();
    let sink_b = VecSink::new();
    bus.add_sink(Box::new(sink_a.clone()));
    bus.add_sink(Box::new(sink_b.clone()));
    assert_eq!(bus.sink_count(), 2);

    bus.emit(SimulationEvent::new(1, EventKind::StepBegin { dt: 0.016 }));
    bus.emit(SimulationEvent::new(
        1,
        EventKind::ContactDetection {
            arbiter_count: 3,
            contact_count: 7,
        },
    ));

    // Nothing reaches sinks until flush.
    assert!(sink_a.is_empty());
    bus.flush();

    assert_eq!(sink_a.len(), 2);
    assert_eq!(sink_b.len(), 2);
    assert_eq!(sink_a.events()[0].step, 1);
}

#[test]
fn set_enabled_gates_emission() {
    let mut bus = EventBus::new();
    let sink = VecSink::new();
    bus.add_sink(Box::new(sink.clone()));

    bus.set_enabled(false);
    bus.emit(SimulationEvent::new(2, EventKind::StepEnd { wall_time: 0.001 }));
    bus.set_enabled(true);
    bus.emit(SimulationEvent::new(3, EventKind::StepEnd { wall_time: 0.001 }));
    bus.flush();

    assert_eq!(sink.len(), 1);
    assert_eq!(sink.events()[0].step, 3);
}

#[test]
fn events_serialize() {
    let event = SimulationEvent::new(
        7,
        EventKind::Islands {
            active_bodies: 5,
            sleeping_bodies: 2,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    let back: SimulationEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(back.step, 7);
    match back.kind {
        EventKind::Islands {
            active_bodies,
            sleeping_bodies,
        } => {
            assert_eq!(active_bodies, 5);
            assert_eq!(sleeping_bodies, 2);
        }
        _ => panic!("wrong event kind"),
    }
}
