use std::sync::Arc;

use crate::{
	dispatch::DispatchContext, error::Error, object::ObjectPath, table::DispatchTable,
};

/// One message travelling through the transport.
///
/// The transport owns the concrete representation; this crate only needs the
/// routing pair carried by inbound messages, reply construction and the
/// outgoing send primitive. Payload access stays between the transport and
/// the user callbacks, which both know the concrete type.
pub trait Message {
	/// Interface the message is addressed to.
	fn interface_name(&self) -> &str;

	/// Member (method, property or signal name) the message is addressed to.
	fn member_name(&self) -> &str;

	/// Construct an empty reply to this message.
	fn create_reply(&self) -> Self
	where
		Self: Sized;

	/// Hand the message to the transport's outgoing queue.
	fn send(self)
	where
		Self: Sized;
}

/// The transport seam: everything this crate consumes from the underlying
/// bus connection.
///
/// A transport activates a [`DispatchTable`] for an `(object path,
/// interface)` pair and later drives inbound traffic through the entry
/// points found in the table's slots, passing back the [`DispatchContext`]
/// it was handed at activation. Wrapping an inbound frame into
/// [`Self::Message`] before invoking an entry point is the transport's job.
///
/// When a method entry point returns `Err`, the transport must send the
/// error back to the remote caller as the call's one reply; on `Ok` the
/// reply has already been sent through [`Message::send`]. For property
/// reads the transport completes the reply from whatever the entry point
/// wrote into it, error or not.
pub trait Connection {
	/// The transport's message container.
	type Message: Message;

	/// Opaque token identifying one activated dispatch table.
	type Token;

	/// Activate `table` for `(path, interface)`, returning the token that
	/// deactivates it again.
	fn add_dispatch_table(
		&self,
		path: &ObjectPath,
		interface: &str,
		table: Arc<DispatchTable<Self::Message>>,
		context: DispatchContext<Self::Message>,
	) -> Result<Self::Token, Error>;

	/// Deactivate a previously activated dispatch table.
	fn remove_dispatch_table(&self, token: Self::Token);

	/// Allocate an outgoing signal message addressed to
	/// `(path, interface, signal)`.
	fn create_signal_message(
		&self,
		path: &ObjectPath,
		interface: &str,
		signal: &str,
	) -> Result<Self::Message, Error>;
}
