//! Property tests for write reassembly and command decoding

use herald_protocol::{
    Command, Framing, NotificationCategory, NotificationPayload, OverflowError, Reassembler,
    MAX_MESSAGE_SIZE,
};
use proptest::prelude::*;

fn payload_strategy() -> impl Strategy<Value = Command> {
    (0u8..6, "[a-zA-Z ]{0,31}", "[a-zA-Z ]{0,63}", "[a-zA-Z .,!]{0,255}", any::<u32>()).prop_map(
        |(category, app, title, body, ts)| {
            Command::AddNotification(NotificationPayload::new(
                NotificationCategory::from_byte(category),
                &app,
                &title,
                &body,
                ts,
            ))
        },
    )
}

fn command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        payload_strategy(),
        any::<u32>().prop_map(|unix_timestamp| Command::TimeSync { unix_timestamp }),
        Just(Command::ClearAll),
    ]
}

/// Feed a message as the given writes, then complete it with the next message's first write
fn deliver(writes: &[(u32, &[u8])]) -> Vec<u8> {
    let mut r = Reassembler::new();
    for &(offset, chunk) in writes {
        assert_eq!(r.ingest(offset, chunk).unwrap(), None);
    }
    r.ingest(0, &[0x03]).unwrap().unwrap().to_vec()
}

proptest! {
    #[test]
    fn split_delivery_matches_single_write(cmd in command_strategy(), split in 1usize..512) {
        let bytes = cmd.encode_to_vec().unwrap();
        prop_assume!(bytes.len() > 1);
        let k = 1 + split % (bytes.len() - 1);

        let whole = deliver(&[(0, &bytes[..])]);
        let split = deliver(&[(0, &bytes[..k]), (k as u32, &bytes[k..])]);

        prop_assert_eq!(&whole, &split);
        prop_assert_eq!(Command::decode(&whole).unwrap(), Command::decode(&split).unwrap());
        prop_assert_eq!(Command::decode(&whole).unwrap(), cmd);
    }

    #[test]
    fn overflowing_write_never_changes_fill(
        prefix in 0usize..=MAX_MESSAGE_SIZE,
        offset in 0u32..2048,
        len in 0usize..600,
    ) {
        prop_assume!(offset as usize + len > MAX_MESSAGE_SIZE);

        let mut r = Reassembler::new();
        if prefix > 0 {
            r.ingest(0, &vec![0xAB; prefix]).unwrap();
        }
        let before = r.filled_len();

        let chunk = vec![0u8; len];
        prop_assert_eq!(r.ingest(offset, &chunk), Err(OverflowError { offset, len }));
        prop_assert_eq!(r.filled_len(), before);
    }

    #[test]
    fn decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..600)) {
        let _ = Command::decode(&bytes);
    }
}
