//! Round trips through the host kernel. Needs SCTP support (`modprobe sctp`),
//! so these are opt-in: `cargo test --test loopback -- --ignored`.

use sctplane::{
	AssocId, Destination, Event, EventSubscription, Family, Kernel, Notification, Received,
	SctpError, SctpSocket, SendOptions, SocketBuilder, Style, Transport,
};

fn kernel() -> Option<Kernel> {
	match Kernel::probe() {
		Ok(kernel) => Some(kernel),
		Err(SctpError::UnsupportedOperation { .. }) => None,
		Err(e) => panic!("probe failed: {e}"),
	}
}

fn server(kernel: Kernel) -> (SctpSocket, u16) {
	let server = SocketBuilder::new(kernel, Family::Inet, Style::MultiAssociation)
		.events(EventSubscription { data_io: true, association: true, shutdown: true, ..EventSubscription::default() })
		.listen(&[("127.0.0.1", 0u16)])
		.unwrap();
	let port = server.local_addresses(AssocId::NONE).unwrap()[0].port();
	(server, port)
}

fn next_data(socket: &SctpSocket) -> Received {
	loop {
		let msg = socket.receive(4096).unwrap();
		if !msg.is_notification() {
			return msg;
		}
	}
}

#[test]
#[ignore]
fn one_to_many_echo() {
	let Some(kernel) = kernel() else { return };
	let (server, port) = server(kernel);

	let client = SocketBuilder::new(kernel, Family::Inet, Style::SingleAssociation)
		.events(EventSubscription { data_io: true, ..EventSubscription::default() })
		.connect(&[("127.0.0.1", port)])
		.unwrap();
	client.send(b"ping", Destination::Connected, &SendOptions::new().ppid(46).stream(1)).unwrap();

	let request = next_data(&server);
	assert_eq!(request.payload, b"ping");
	assert!(request.is_complete());
	let meta = *request.metadata().unwrap();
	assert_eq!((meta.ppid, meta.stream), (46, 1));
	assert_ne!(meta.assoc_id, AssocId::NONE);

	server.send(b"pong", Destination::Association(meta.assoc_id), &SendOptions::new().ppid(46)).unwrap();
	assert_eq!(next_data(&client).payload, b"pong");

	let status = server.status(meta.assoc_id).unwrap();
	assert!(status.is_established());
}

#[test]
#[ignore]
fn association_change_announces_new_peer() {
	let Some(kernel) = kernel() else { return };
	let (server, port) = server(kernel);

	let client = SctpSocket::open(kernel, Family::Inet, Style::SingleAssociation).unwrap();
	client.connect(("127.0.0.1", port)).unwrap();
	client.send(b"hello", Destination::Connected, &SendOptions::new().ppid(0)).unwrap();

	let first = server.receive(4096).unwrap();
	let Event::Notification(Notification::AssociationChange(change)) = first.event else {
		panic!("expected association change, got {:?}", first.event);
	};
	assert_ne!(change.assoc_id, AssocId::NONE);
	assert_eq!(next_data(&server).payload, b"hello");
}

#[test]
#[ignore]
fn peeloff_moves_association_to_its_own_socket() {
	let Some(kernel) = kernel() else { return };
	if !kernel.features().peeloff {
		return;
	}
	let (server, port) = server(kernel);

	let client = SctpSocket::open(kernel, Family::Inet, Style::SingleAssociation).unwrap();
	client.connect(("127.0.0.1", port)).unwrap();
	client.send(b"one", Destination::Connected, &SendOptions::new().ppid(0)).unwrap();
	let id = next_data(&server).metadata().unwrap().assoc_id;

	let peeled = server.peeloff(id).unwrap();
	assert_eq!(peeled.style(), Style::SingleAssociation);
	peeled.send(b"two", Destination::Connected, &SendOptions::new().ppid(0)).unwrap();
	assert_eq!(next_data(&client).payload, b"two");
}
