use crate::arq::{ArqConfig, ArqVariant};
use crate::channel::{message_body, run_scenario, ChannelConfig, Scenario};
use crate::sim::SimTime;

fn scenario(variant: ArqVariant, loss: f64, corrupt: f64, seed: u64) -> Scenario {
    Scenario {
        arq: ArqConfig::for_variant(variant),
        channel: ChannelConfig {
            loss,
            corrupt,
            avg_delay: 5.0,
            reorder: false,
            seed,
        },
        num_messages: 20,
        message_interval: 30.0,
        until: None,
    }
}

/// 交付序列必须是消息序列的有序子序列，且每条被接受的消息恰好交付一次
fn assert_in_order_exactly_once(delivered: &[String], generated: u64, accepted: u64) {
    let bodies: Vec<String> = (0..generated).map(message_body).collect();
    let mut cursor = 0;
    for payload in delivered {
        let pos = bodies[cursor..]
            .iter()
            .position(|b| b == payload)
            .unwrap_or_else(|| panic!("{payload} delivered out of order or twice"));
        cursor += pos + 1;
    }
    assert_eq!(delivered.len() as u64, accepted);
}

#[test]
fn perfect_channel_delivers_every_message_with_go_back_n() {
    let out = run_scenario(&scenario(ArqVariant::GoBackN, 0.0, 0.0, 1), false);
    let s = &out.summary;

    assert_eq!(s.messages_generated, 20);
    assert_eq!(s.sender.transmitted, 20);
    assert_eq!(s.sender.dropped, 0);
    assert_eq!(s.sender.retransmissions, 0);
    let expected: Vec<String> = (0..20).map(message_body).collect();
    assert_eq!(out.delivered, expected);
    assert_eq!(s.channel.timer_violations, 0);
    assert!(s.average_rtt > 0.0);
}

#[test]
fn lossy_channel_still_delivers_in_order_for_every_variant() {
    for variant in [
        ArqVariant::StopAndWait,
        ArqVariant::AlternatingBit,
        ArqVariant::GoBackN,
    ] {
        for seed in [1, 2, 3] {
            let out = run_scenario(&scenario(variant, 0.2, 0.2, seed), false);
            let s = &out.summary;
            assert_in_order_exactly_once(
                &out.delivered,
                s.messages_generated,
                s.sender.transmitted,
            );
            assert_eq!(s.sender.transmitted + s.sender.dropped, s.messages_generated);
            assert_eq!(s.receiver.delivered, s.sender.transmitted);
            assert_eq!(s.channel.timer_violations, 0, "{variant:?} seed {seed}");
        }
    }
}

#[test]
fn faults_cause_retransmissions() {
    let out = run_scenario(&scenario(ArqVariant::GoBackN, 0.3, 0.3, 11), false);
    assert!(out.summary.channel.lost + out.summary.channel.corrupted > 0);
    assert!(out.summary.sender.retransmissions > 0);
}

#[test]
fn same_seed_reproduces_the_same_run() {
    let sc = scenario(ArqVariant::AlternatingBit, 0.2, 0.1, 99);
    let a = run_scenario(&sc, false);
    let b = run_scenario(&sc, false);
    assert_eq!(a.delivered, b.delivered);
    assert_eq!(a.summary.to_string(), b.summary.to_string());
}

#[test]
fn until_bounds_a_run_that_can_never_finish() {
    let mut sc = scenario(ArqVariant::GoBackN, 1.0, 0.0, 5);
    sc.until = Some(SimTime::from_units(2_000.0));
    let out = run_scenario(&sc, false);

    assert!(out.delivered.is_empty());
    assert_eq!(out.summary.sim_time, 2_000.0);
    assert!(out.summary.sender.retransmissions > 0);
}

#[test]
fn summary_report_lists_final_statistics() {
    let out = run_scenario(&scenario(ArqVariant::StopAndWait, 0.0, 0.0, 4), false);
    let text = out.summary.to_string();
    assert!(text.starts_with("Statistics\n"));
    for line in [
        "Number of packets transmitted:",
        "Number of re-transmissions: 0",
        "Number of ACK packets:",
        "Number of corrupt packets: 0",
        "Number of packets dropped:",
        "Average RTT:",
    ] {
        assert!(text.contains(line), "missing {line:?} in\n{text}");
    }
}
