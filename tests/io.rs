mod common;

use common::{MockTransport, addr, notification, open};
use sctplane::event::{AssocChangeState, NotificationKind};
use sctplane::sys::{
	MSG_NOTIFICATION, SCTP_ADAPTATION_LAYER, SCTP_ASSOC_CHANGE, SCTP_SHUTDOWN_EVENT, SOL_SCTP,
};
use sctplane::{
	AssocId, Destination, Event, Family, Features, MessageMetadata, Notification, RawMessage,
	RecvFlags, SctpError, SctpSocket, SendFlags, SendOptions, Style,
};

fn shutdown_record(id: i32) -> Vec<u8> {
	notification(SCTP_SHUTDOWN_EVENT, 0, &id.to_ne_bytes())
}

fn notification_message(data: Vec<u8>) -> RawMessage {
	RawMessage { from: None, flags: MSG_NOTIFICATION, data, info: None }
}

#[test]
fn empty_payload_needs_eof_or_abort() {
	let (mock, socket) = open(Style::MultiAssociation);

	let err = socket.send(b"", Destination::Association(AssocId(4)), &SendOptions::new());
	assert!(matches!(err, Err(SctpError::EmptyMessage)));
	assert!(mock.calls().is_empty());

	let opts = SendOptions::new().ppid(0).flags(SendFlags::ABORT);
	assert_eq!(socket.send(b"", Destination::Association(AssocId(4)), &opts).unwrap(), 0);
}

#[test]
fn eof_to_association_is_followed_by_shutdown_event() {
	let (mock, socket) = open(Style::MultiAssociation);

	let opts = SendOptions::new().ppid(0).flags(SendFlags::EOF);
	socket.send(&[], Destination::Association(AssocId(21)), &opts).unwrap();

	let sent = mock.sent();
	assert_eq!(sent.len(), 1);
	let (payload, to, info) = &sent[0];
	assert!(payload.is_empty());
	assert_eq!(*to, None);
	assert_eq!(info.assoc_id, AssocId(21));
	assert_eq!(info.flags, SendFlags::EOF.bits());

	mock.push_message(notification_message(shutdown_record(21)));
	let received = socket.receive(1024).unwrap();
	assert!(received.is_notification());
	assert!(received.payload.is_empty());
	match received.notification() {
		Some(Notification::Shutdown(ev)) => assert_eq!(ev.assoc_id, AssocId(21)),
		other => panic!("expected shutdown, got {other:?}"),
	}
}

#[test]
fn unset_options_fall_back_to_socket_defaults() {
	let (mock, mut socket) = open(Style::SingleAssociation);
	mock.put_option(SOL_SCTP, SCTP_ADAPTATION_LAYER, 0x2a_i32.to_ne_bytes().to_vec());
	socket.set_ttl(750);
	socket.set_stream_id(2);

	socket.send(b"hello", Destination::Connected, &SendOptions::new().context(9)).unwrap();
	socket
		.send(b"world", Destination::Connected, &SendOptions::new().ppid(46).stream(5).ttl(0))
		.unwrap();

	let sent = mock.sent();
	let first = sent[0].2;
	assert_eq!((first.ppid, first.stream, first.time_to_live, first.context), (0x2a, 2, 750, 9));
	let second = sent[1].2;
	assert_eq!((second.ppid, second.stream, second.time_to_live), (46, 5, 0));
}

#[test]
fn send_to_address_passes_the_address_through() {
	let (mock, socket) = open(Style::MultiAssociation);
	let peer = addr("192.0.2.1", 2905);
	let opts = SendOptions::new().ppid(18).flags(SendFlags::UNORDERED);

	assert_eq!(socket.send(b"abc", Destination::Address(peer), &opts).unwrap(), 3);
	let (_, to, info) = mock.sent().remove(0);
	assert_eq!(to, Some(peer));
	assert_eq!(info.assoc_id, AssocId::NONE);
	assert_eq!(info.flags, SendFlags::UNORDERED.bits());
}

#[test]
fn send_to_association_is_style_and_feature_bound() {
	let (mock, single) = open(Style::SingleAssociation);
	let opts = SendOptions::new().ppid(0);
	assert!(matches!(
		single.send(b"x", Destination::Association(AssocId(1)), &opts),
		Err(SctpError::UnsupportedOperation { .. })
	));
	assert!(mock.calls().is_empty());

	let (_, multi) = open(Style::MultiAssociation);
	assert!(matches!(
		multi.send(b"x", Destination::Association(AssocId::NONE), &opts),
		Err(SctpError::InvalidAssociation { .. })
	));

	let mock = MockTransport::with_features(Features { send_to_association: false, ..Features::default() });
	let limited = SctpSocket::open(mock.clone(), Family::Inet, Style::MultiAssociation).unwrap();
	assert!(matches!(
		limited.send(b"x", Destination::Association(AssocId(1)), &opts),
		Err(SctpError::UnsupportedOperation { .. })
	));
	assert!(mock.sent().is_empty());
}

#[test]
fn native_send_failure_is_a_transmission_error() {
	let (mock, socket) = open(Style::SingleAssociation);
	mock.fail("send", libc::EPIPE);

	let err = socket.send(b"x", Destination::Connected, &SendOptions::new().ppid(0)).unwrap_err();
	assert!(matches!(err, SctpError::Transmission { errno } if errno.0 == libc::EPIPE));
}

#[test]
fn failed_default_ppid_lookup_is_a_transmission_error() {
	let (mock, socket) = open(Style::SingleAssociation);
	mock.fail(&format!("get:{SCTP_ADAPTATION_LAYER}"), libc::EBADF);

	let err = socket.send(b"x", Destination::Connected, &SendOptions::new()).unwrap_err();
	assert!(matches!(err, SctpError::Transmission { errno } if errno.0 == libc::EBADF));
	assert!(mock.sent().is_empty());
}

#[test]
fn data_arrives_with_metadata() {
	let (mock, socket) = open(Style::MultiAssociation);
	let info = MessageMetadata { stream: 3, ssn: 7, ppid: 46, assoc_id: AssocId(2), ..MessageMetadata::default() };
	mock.push_message(RawMessage {
		from: Some(addr("198.51.100.4", 3868)),
		flags: libc::MSG_EOR,
		data: b"payload".to_vec(),
		info: Some(info),
	});

	let received = socket.receive(1500).unwrap();
	assert_eq!(received.from, Some(addr("198.51.100.4", 3868)));
	assert_eq!(received.payload, b"payload");
	assert!(received.is_complete());
	assert!(!received.is_teardown());
	assert_eq!(received.event, Event::Data(info));
}

#[test]
fn data_without_subscription_has_zero_metadata() {
	let (mock, socket) = open(Style::SingleAssociation);
	mock.push_message(RawMessage { from: None, flags: libc::MSG_EOR, data: vec![1, 2, 3], info: None });

	let received = socket.receive(64).unwrap();
	assert_eq!(received.metadata(), Some(&MessageMetadata::default()));
}

#[test]
fn empty_data_message_signals_teardown() {
	let (mock, socket) = open(Style::SingleAssociation);
	mock.push_message(RawMessage::default());

	let received = socket.receive(64).unwrap();
	assert!(received.is_teardown());
	assert!(!received.is_notification());
	assert_eq!(received.event, Event::Data(MessageMetadata::default()));

	let stale = MessageMetadata { stream: 4, ppid: 7, assoc_id: AssocId(9), ..MessageMetadata::default() };
	mock.push_message(RawMessage { from: None, flags: 0, data: Vec::new(), info: Some(stale) });
	let received = socket.receive(64).unwrap();
	assert!(received.is_teardown());
	assert_eq!(received.metadata(), Some(&MessageMetadata::default()));
}

#[test]
fn fragments_are_reported_separately_and_concatenated_by_caller() {
	let (mock, socket) = open(Style::MultiAssociation);
	mock.push_message(RawMessage {
		from: None,
		flags: libc::MSG_EOR,
		data: b"0123456789".to_vec(),
		info: Some(MessageMetadata { stream: 1, ..MessageMetadata::default() }),
	});

	let first = socket.receive(6).unwrap();
	assert!(!first.is_complete());
	assert_eq!(first.payload, b"012345");

	let second = socket.receive(6).unwrap();
	assert!(second.is_complete());

	let mut message = first.payload;
	message.extend_from_slice(&second.payload);
	assert_eq!(message, b"0123456789");
}

#[test]
fn association_change_notification_decodes() {
	let (mock, socket) = open(Style::MultiAssociation);
	let mut body = Vec::new();
	body.extend_from_slice(&0u16.to_ne_bytes()); // COMM_UP
	body.extend_from_slice(&0u16.to_ne_bytes());
	body.extend_from_slice(&10u16.to_ne_bytes());
	body.extend_from_slice(&5u16.to_ne_bytes());
	body.extend_from_slice(&17i32.to_ne_bytes());
	mock.push_message(notification_message(notification(SCTP_ASSOC_CHANGE, 0, &body)));

	let received = socket.receive(512).unwrap();
	assert_eq!(received.flags, RecvFlags::NOTIFICATION);
	let Some(Notification::AssociationChange(change)) = received.notification() else {
		panic!("expected association change");
	};
	assert_eq!(change.state, AssocChangeState::CommUp);
	assert_eq!((change.outbound_streams, change.inbound_streams), (10, 5));
	assert_eq!(change.assoc_id, AssocId(17));
}

#[test]
fn unknown_notifications_follow_socket_policy() {
	let (mock, mut socket) = open(Style::MultiAssociation);
	mock.push_message(notification_message(notification(0x80ff, 3, &[])));
	mock.push_message(notification_message(notification(0x80ff, 3, &[])));

	let lenient = socket.receive(64).unwrap();
	assert_eq!(lenient.event, Event::Notification(Notification::Unknown { kind: 0x80ff, flags: 3 }));
	assert_eq!(lenient.notification().map(|n| n.kind()), Some(NotificationKind::Other(0x80ff)));

	socket.set_raise_on_unknown(true);
	assert!(matches!(
		socket.receive(64),
		Err(SctpError::UnrecognizedEvent { kind: 0x80ff, flags: 3 })
	));
}

#[test]
fn truncated_notification_is_malformed() {
	let (mock, socket) = open(Style::MultiAssociation);
	let mut record = shutdown_record(1);
	record.truncate(10);
	mock.push_message(notification_message(record));

	assert!(matches!(socket.receive(64), Err(SctpError::MalformedRecord { .. })));
}

#[test]
fn native_receive_failure_is_a_receive_error() {
	let (_mock, socket) = open(Style::SingleAssociation);

	let err = socket.receive(64).unwrap_err();
	assert!(matches!(err, SctpError::Receive { errno } if errno.0 == libc::EAGAIN));
	let io: std::io::Error = err.into();
	assert_eq!(io.kind(), std::io::ErrorKind::WouldBlock);
}
