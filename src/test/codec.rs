use crate::arq::{checksum, is_corrupt, Message, MessageError, Packet, ACK, MAX_DATA_SIZE, NAK};

#[test]
fn checksum_sums_seq_ack_and_payload_bytes() {
    assert_eq!(checksum(0, 0, ""), 0);
    assert_eq!(checksum(1, 1, "ab"), 1 + 1 + 97 + 98);
    assert_eq!(checksum(-1, ACK, ""), 0);
}

#[test]
fn checksum_wraps_on_overflow() {
    assert_eq!(checksum(i32::MAX, 1, ""), i32::MIN);
}

#[test]
fn freshly_built_packets_are_not_corrupt() {
    for (seq, ack, payload) in [(0, ACK, "aaaaaaaaaaaaaaaaaaaa"), (7, NAK, ""), (-1, ACK, "x")] {
        let pkt = Packet::new(seq, ack, payload);
        assert_eq!(pkt.checksum, checksum(seq, ack, payload));
        assert!(!is_corrupt(&pkt));
    }
}

#[test]
fn changing_any_payload_byte_is_detected() {
    let payload = "abcdefghijklmnopqrst";
    let pkt = Packet::new(3, ACK, payload);
    for i in 0..payload.len() {
        let mut bytes = payload.as_bytes().to_vec();
        bytes[i] = b'?';
        let tampered = Packet::with_checksum(
            pkt.seq,
            pkt.ack,
            pkt.checksum,
            String::from_utf8(bytes).expect("ascii"),
        );
        assert!(is_corrupt(&tampered), "byte {i} flip not detected");
    }
}

#[test]
fn changing_header_fields_is_detected() {
    let pkt = Packet::new(3, ACK, "hello");
    let bad_seq = Packet::with_checksum(999_999, pkt.ack, pkt.checksum, pkt.payload.clone());
    let bad_ack = Packet::with_checksum(pkt.seq, 999_999, pkt.checksum, pkt.payload.clone());
    assert!(is_corrupt(&bad_seq));
    assert!(is_corrupt(&bad_ack));
}

#[test]
fn message_rejects_oversized_payload() {
    assert!(Message::new("a".repeat(MAX_DATA_SIZE)).is_ok());
    assert_eq!(
        Message::new("a".repeat(MAX_DATA_SIZE + 1)),
        Err(MessageError::TooLong {
            len: MAX_DATA_SIZE + 1,
            max: MAX_DATA_SIZE
        })
    );
}

#[test]
fn data_packet_from_message_carries_ack_flag() {
    let m = Message::new("hi").expect("fits");
    let pkt = Packet::from_message(4, &m);
    assert_eq!(pkt.seq, 4);
    assert!(pkt.is_ack());
    assert_eq!(pkt.payload, "hi");
    assert_eq!(
        pkt.to_string(),
        format!("seq=4 ack=1 checksum={} payload=\"hi\"", pkt.checksum)
    );
}
