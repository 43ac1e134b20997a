use super::support::{ack, msg, RecordingChannel};
use crate::arq::{ArqConfig, ArqVariant, Packet, Receiver, SendOutcome, Sender};
use crate::channel::Side;
use crate::sim::SimTime;

fn gbn(window_size: usize) -> ArqConfig {
    ArqConfig {
        window_size,
        ..ArqConfig::for_variant(ArqVariant::GoBackN)
    }
}

fn new_sender(window_size: usize) -> Sender {
    let mut s = Sender::new(gbn(window_size));
    s.init();
    s
}

#[test]
fn init_resets_counters() {
    let s = new_sender(4);
    assert_eq!(s.base(), 0);
    assert_eq!(s.next_seq(), 0);
    assert_eq!(s.in_flight(), 0);
    assert!(!s.is_timer_armed());
    assert_eq!(s.stats().transmitted, 0);
}

#[test]
fn first_send_starts_single_timer() {
    let mut s = new_sender(4);
    let mut ch = RecordingChannel::default();

    assert_eq!(s.on_app_message(msg("m0"), &mut ch), SendOutcome::Sent(0));
    assert_eq!(s.on_app_message(msg("m1"), &mut ch), SendOutcome::Sent(1));

    assert_eq!(ch.sent_seqs(), vec![0, 1]);
    assert!(ch.sent.iter().all(|(side, _)| *side == Side::A));
    assert_eq!(ch.timer_starts, 1);
    assert!(ch.timer_running(Side::A));
    assert_eq!(ch.timers[0], Some(SimTime::from_units(50.0)));
    assert_eq!(s.stats().transmitted, 2);
}

#[test]
fn window_of_two_holds_third_message_until_first_ack() {
    let mut sender = new_sender(2);
    let mut receiver = Receiver::new(gbn(2));
    let mut a = RecordingChannel::default();
    let mut b = RecordingChannel::default();

    assert_eq!(sender.on_app_message(msg("m0"), &mut a), SendOutcome::Sent(0));
    assert_eq!(sender.on_app_message(msg("m1"), &mut a), SendOutcome::Sent(1));
    assert_eq!(sender.on_app_message(msg("m2"), &mut a), SendOutcome::Dropped);
    assert_eq!(sender.stats().dropped, 1);
    assert_eq!(a.sent_seqs(), vec![0, 1]);
    assert!(sender.next_seq() - sender.base() <= 2);

    for pkt in a.take_sent() {
        receiver.on_packet(pkt, &mut b);
    }
    let acks = b.take_sent();
    assert_eq!(acks.iter().map(|p| p.seq).collect::<Vec<_>>(), vec![1, 2]);

    // 第一个 ACK 到达后窗口腾出一个位置
    sender.on_packet(acks[0].clone(), &mut a);
    assert_eq!(sender.base(), 1);
    assert_eq!(sender.on_app_message(msg("m2"), &mut a), SendOutcome::Sent(2));
    assert_eq!(a.sent_seqs(), vec![2]);

    sender.on_packet(acks[1].clone(), &mut a);
    for pkt in a.take_sent() {
        receiver.on_packet(pkt, &mut b);
    }
    for pkt in b.take_sent() {
        sender.on_packet(pkt, &mut a);
    }

    assert_eq!(b.delivered, vec!["m0", "m1", "m2"]);
    assert_eq!(sender.base(), 3);
    assert_eq!(sender.in_flight(), 0);
    assert!(!a.timer_running(Side::A));
    assert_eq!(a.violations, 0);
}

#[test]
fn cumulative_ack_evicts_everything_below_it() {
    let mut s = new_sender(8);
    let mut ch = RecordingChannel::default();
    for i in 0..5 {
        s.on_app_message(msg(&format!("m{i}")), &mut ch);
    }

    s.on_packet(ack(3), &mut ch);

    assert_eq!(s.base(), 3);
    assert_eq!(s.next_seq(), 5);
    assert_eq!(s.in_flight(), 2);
    assert!(s.cached().all(|p| p.seq >= 3));
    assert_eq!(s.cached().map(|p| p.seq).collect::<Vec<_>>(), vec![3, 4]);
    assert_eq!(s.stats().acks_received, 1);
    // 停止后为剩余报文重新启动
    assert_eq!(ch.timer_stops, 1);
    assert_eq!(ch.timer_starts, 2);
    assert!(ch.timer_running(Side::A));
}

#[test]
fn full_ack_stops_timer_without_restart() {
    let mut s = new_sender(4);
    let mut ch = RecordingChannel::default();
    s.on_app_message(msg("m0"), &mut ch);
    s.on_packet(ack(1), &mut ch);

    assert_eq!(s.in_flight(), 0);
    assert!(!s.is_timer_armed());
    assert!(!ch.timer_running(Side::A));
}

#[test]
fn stale_and_out_of_range_acks_are_ignored() {
    let mut s = new_sender(4);
    let mut ch = RecordingChannel::default();
    s.on_app_message(msg("m0"), &mut ch);
    s.on_app_message(msg("m1"), &mut ch);

    // 接收端尚未确认任何报文时的重复 ACK
    s.on_packet(ack(-1), &mut ch);
    // 等于 base：不推进
    s.on_packet(ack(0), &mut ch);
    // 超出已发送范围
    s.on_packet(ack(9), &mut ch);

    assert_eq!(s.base(), 0);
    assert_eq!(s.in_flight(), 2);
    assert_eq!(s.stats().stale_acks, 3);
    assert_eq!(s.stats().acks_received, 0);
    assert_eq!(ch.timer_stops, 0);
}

#[test]
fn corrupt_ack_is_ignored_and_left_to_timeout() {
    let mut s = new_sender(4);
    let mut ch = RecordingChannel::default();
    s.on_app_message(msg("m0"), &mut ch);
    ch.sent.clear();

    let good = ack(1);
    let bad = Packet::with_checksum(good.seq, good.ack, good.checksum + 1, "");
    s.on_packet(bad, &mut ch);

    assert_eq!(s.base(), 0);
    assert_eq!(s.stats().corrupt_received, 1);
    assert_eq!(s.stats().retransmissions, 0);
    assert!(ch.sent.is_empty());
}

#[test]
fn timeout_resends_whole_window_in_order() {
    let mut s = new_sender(4);
    let mut ch = RecordingChannel::default();
    s.on_app_message(msg("m0"), &mut ch);
    s.on_app_message(msg("m1"), &mut ch);
    ch.sent.clear();

    ch.expire(Side::A);
    s.on_timer(&mut ch);

    assert_eq!(ch.sent_seqs(), vec![0, 1]);
    assert_eq!(s.stats().retransmissions, 2);
    assert_eq!(s.stats().transmitted, 2);
    assert!(ch.timer_running(Side::A));
    assert_eq!(ch.timer_starts, 2);
    assert_eq!(ch.violations, 0);
}

#[test]
fn timeout_with_empty_window_does_not_restart_timer() {
    let mut s = new_sender(4);
    let mut ch = RecordingChannel::default();
    s.on_timer(&mut ch);
    assert!(ch.sent.is_empty());
    assert!(!ch.timer_running(Side::A));
}

#[test]
fn rtt_samples_use_last_send_time() {
    let mut s = new_sender(4);
    let mut ch = RecordingChannel::default();
    ch.now = SimTime::from_units(10.0);
    s.on_app_message(msg("m0"), &mut ch);
    ch.now = SimTime::from_units(16.0);
    s.on_packet(ack(1), &mut ch);

    assert_eq!(s.stats().rtt_samples, 1);
    assert_eq!(s.stats().average_rtt(), 6.0);
}

#[test]
fn window_bound_holds_under_arbitrary_interleaving() {
    let mut s = new_sender(3);
    let mut ch = RecordingChannel::default();
    let mut acked = 0;
    for i in 0..30 {
        s.on_app_message(msg(&format!("m{i}")), &mut ch);
        assert!(s.next_seq() - s.base() <= 3);
        if i % 4 == 3 {
            acked = s.next_seq().min(acked + 2);
            s.on_packet(ack(acked), &mut ch);
        }
        if i % 7 == 6 && s.is_timer_armed() {
            ch.expire(Side::A);
            s.on_timer(&mut ch);
        }
        assert_eq!(s.in_flight() as i32, s.next_seq() - s.base());
    }
    assert!(s.stats().dropped > 0);
    assert_eq!(ch.violations, 0);
}
