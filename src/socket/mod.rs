mod builder;
mod io;
mod multihome;
mod options;
mod sctp;
mod style;

pub use self::builder::{BufferConfig, ReuseConfig, SocketBuilder};
pub use self::io::{Destination, Event, Received, RecvFlags, SendFlags, SendOptions};
pub use self::multihome::BindAction;
pub use self::options::{set_recv_buffer_size, set_reuse_addr, set_reuse_port, set_send_buffer_size};
pub use self::sctp::{Association, SctpSocket};
pub use self::style::{AssocId, Operation, Scope, Style};

/*
  Which association ids each call accepts:
  ┌──────────────────────────────────┬────────────────────┬──────────────────────────┐
  │ Call                             │ SingleAssociation  │ MultiAssociation         │
  ├──────────────────────────────────┼────────────────────┼──────────────────────────┤
  │ assoc_params, rto_info,          │ 0 only             │ 0 = endpoint defaults,   │
  │ local_addresses                  │                    │ else that association    │
  ├──────────────────────────────────┼────────────────────┼──────────────────────────┤
  │ status, peer_address_*,          │ 0 only             │ non-zero only            │
  │ remote_addresses, set_primary_*, │                    │                          │
  │ association, peeloff             │                    │                          │
  ├──────────────────────────────────┼────────────────────┼──────────────────────────┤
  │ accept                           │ yes                │ UnsupportedOperation     │
  ├──────────────────────────────────┼────────────────────┼──────────────────────────┤
  │ peeloff, autoclose,              │ UnsupportedOp.     │ yes                      │
  │ send to association id           │                    │                          │
  └──────────────────────────────────┴────────────────────┴──────────────────────────┘
*/
