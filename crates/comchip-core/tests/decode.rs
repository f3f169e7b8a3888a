use comchip_core::{
    FrameError, FrameLayout, StatusBits, Variant, compute_checksum, decode, parse_hex_frame,
};
use proptest::prelude::*;

#[test]
fn nominal_compact_frame_decodes() {
    let frame = [0x55, 0x81, 0x00, 0x96, 0xFE, 0xE8];
    assert_eq!(compute_checksum(frame[1], &frame[2..5]), frame[5]);

    let status = Variant::Compact.decode(&frame).unwrap();
    assert_eq!(status.voltage, 0x96FE);
    assert_eq!(status.voltage, 38654);
    assert!(!status.has_error && !status.under_voltage && status.supported);
}

#[test]
fn under_voltage_extended_frame_decodes() {
    let frame = [0x55, 0x81, 0x40, 0x96, 0xFE, 0x00, 0xA8];
    let status = Variant::Extended.decode(&frame).unwrap();
    assert!(status.under_voltage);
    assert!(!status.voltage_ok());
}

#[test]
fn hand_computed_sample_checksums_are_rejected() {
    let cases: [(&[u8], u8, u8); 3] = [
        (&[0x55, 0x81, 0x00, 0x96, 0xFE, 0x3F], 0xE8, 0x3F),
        (&[0x55, 0x81, 0x00, 0x6D, 0x60, 0xD2], 0xB0, 0xD2),
        (&[0x55, 0x81, 0x40, 0x96, 0xFE, 0x00, 0xFF], 0xA8, 0xFF),
    ];
    for (frame, calculated, received) in cases {
        let variant = if frame.len() == 6 {
            Variant::Compact
        } else {
            Variant::Extended
        };
        assert_eq!(
            variant.decode(frame).unwrap_err(),
            FrameError::ChecksumMismatch {
                calculated,
                received,
            }
        );
    }
}

#[test]
fn truncated_frame_is_a_length_mismatch() {
    let frame = [0x55, 0x81, 0x00, 0x96, 0xFE];
    for variant in Variant::ALL {
        let err = variant.decode(&frame).unwrap_err();
        assert_eq!(
            err,
            FrameError::LengthMismatch {
                expected: variant.layout().frame_len,
                actual: 5,
            }
        );
    }
}

#[test]
fn custom_layout_moves_status_bits() {
    let layout = FrameLayout::from_json(
        r#"{
            "frame_len": 6,
            "status": { "error": 1, "under_voltage": 2, "not_supported": 4 },
            "checksum_span": { "start": 2, "end": 5 }
        }"#,
    )
    .unwrap();
    assert_eq!(
        layout.status,
        StatusBits {
            error: 0x01,
            under_voltage: 0x02,
            not_supported: 0x04,
            discharge_inhibit: None,
        }
    );

    let mut frame = vec![0x55, 0x81, 0x05, 0x96, 0xFE];
    frame.push(compute_checksum(frame[1], &frame[2..5]));
    let status = decode(&frame, &layout).unwrap();
    assert!(status.has_error);
    assert!(!status.under_voltage);
    assert!(!status.supported);
    assert_eq!(status.discharge_allowed, None);
}

#[test]
fn hex_text_feeds_the_decoder() {
    let frame = parse_hex_frame("0x55,0x81,0x00,0x96,0xFE,0x00,0xE8").unwrap();
    assert!(Variant::Extended.decode(&frame).is_ok());
}

fn compact_frame(cid: u8, status: u8, voltage: u16) -> Vec<u8> {
    let [high, low] = voltage.to_be_bytes();
    let mut frame = vec![0x55, cid, status, high, low];
    frame.push(compute_checksum(cid, &frame[2..]));
    frame
}

proptest! {
    #[test]
    fn well_formed_frames_always_decode(cid in any::<u8>(), status in any::<u8>(), voltage in any::<u16>()) {
        let frame = compact_frame(cid, status, voltage);
        let decoded = Variant::Compact.decode(&frame).unwrap();
        prop_assert_eq!(decoded.command_id, cid);
        prop_assert_eq!(decoded.voltage, voltage);
        prop_assert_eq!(decoded.has_error, status & 0x80 != 0);
        prop_assert_eq!(decoded.under_voltage, status & 0x40 != 0);
        prop_assert_eq!(decoded.supported, status & 0x20 == 0);
        prop_assert_eq!(decoded.discharge_allowed, Some(status & 0x01 == 0));
    }

    #[test]
    fn wrong_checksum_byte_is_always_rejected(cid in any::<u8>(), status in any::<u8>(), voltage in any::<u16>(), delta in 1u8..=255) {
        let mut frame = compact_frame(cid, status, voltage);
        frame[5] = frame[5].wrapping_add(delta);
        let is_checksum_mismatch = matches!(
            Variant::Compact.decode(&frame),
            Err(FrameError::ChecksumMismatch { .. })
        );
        prop_assert!(is_checksum_mismatch);
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..16)) {
        for variant in Variant::ALL {
            let first = variant.decode(&bytes);
            prop_assert_eq!(first, variant.decode(&bytes));
        }
    }
}
