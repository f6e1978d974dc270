//! Property tests for the string ABI

use proptest::prelude::*;
use webworks_transport::{Command, EncodedEvent, PluginEvent};

proptest! {
    #[test]
    fn command_parse_preserves_name_and_args(
        name in "[A-Za-z][A-Za-z0-9.]{0,24}",
        args in "[ -~]{0,64}",
    ) {
        let raw = format!("{} {}", name, args);

        let command = Command::parse(&raw).unwrap();

        prop_assert_eq!(command.name(), name.as_str());
        prop_assert_eq!(command.args(), args.as_str());
    }

    #[test]
    fn event_line_parses_back(
        object_id in "[0-9]{1,6}",
        name in "[a-z][a-zA-Z.]{0,32}",
        args in proptest::collection::vec("[A-Za-z0-9_-]{1,12}", 0..4),
    ) {
        let mut event = PluginEvent::new(name.clone());
        for arg in &args {
            event = event.arg(arg);
        }
        let line = format!("{} {}", object_id, event);

        let parsed = EncodedEvent::parse(&line).unwrap();

        prop_assert_eq!(&parsed.object_id, &object_id);
        prop_assert_eq!(&parsed.name, &name);
        prop_assert_eq!(parsed.payload_args(), args.iter().map(String::as_str).collect::<Vec<_>>());
    }
}
