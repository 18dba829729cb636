//! In-memory stand-ins for the transport collaborators, driving activated
//! dispatch tables the way a real bus event loop would.

// Each test binary uses its own slice of this harness.
#![allow(dead_code)]

use std::{
	collections::HashMap,
	sync::{
		atomic::{AtomicU64, Ordering},
		Arc, Mutex, PoisonError, RwLock,
	},
};

use wirebus_object::{
	CallError, Connection, DispatchContext, DispatchEntry, DispatchTable, Error, Message,
	ObjectPath,
};

/// What a loopback message is for; mirrors the kinds a real bus
/// distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
	MethodCall,
	Reply,
	Signal,
	PropertyValue,
}

type Outbox = Arc<Mutex<Vec<TestMessage>>>;

/// Loopback message container: routing header plus a flat integer payload.
#[derive(Debug, Clone)]
pub struct TestMessage {
	pub kind: MessageKind,
	pub path: String,
	pub interface: String,
	pub member: String,
	pub body: Vec<i64>,
	outbox: Outbox,
}

impl TestMessage {
	fn new(
		kind: MessageKind,
		path: &str,
		interface: &str,
		member: &str,
		body: Vec<i64>,
		outbox: Outbox,
	) -> Self {
		Self {
			kind,
			path: path.to_owned(),
			interface: interface.to_owned(),
			member: member.to_owned(),
			body,
			outbox,
		}
	}

	pub fn push(&mut self, value: i64) {
		self.body.push(value);
	}
}

impl Message for TestMessage {
	fn interface_name(&self) -> &str {
		&self.interface
	}

	fn member_name(&self) -> &str {
		&self.member
	}

	fn create_reply(&self) -> Self {
		Self::new(
			MessageKind::Reply,
			&self.path,
			&self.interface,
			&self.member,
			Vec::new(),
			Arc::clone(&self.outbox),
		)
	}

	fn send(self) {
		let outbox = Arc::clone(&self.outbox);
		outbox
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(self);
	}
}

struct Activation {
	path: ObjectPath,
	interface: String,
	table: Arc<DispatchTable<TestMessage>>,
	context: DispatchContext<TestMessage>,
}

/// In-memory transport: activations keyed by token, every sent message
/// collected in an outbox the tests inspect.
#[derive(Default)]
pub struct LoopbackConnection {
	activations: RwLock<HashMap<u64, Activation>>,
	next_token: AtomicU64,
	outbox: Outbox,
	fail_interface: Mutex<Option<String>>,
}

impl LoopbackConnection {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Make the next activation of `interface` fail, as a bus would refuse a
	/// conflicting registration.
	pub fn refuse_interface(&self, interface: &str) {
		*self
			.fail_interface
			.lock()
			.unwrap_or_else(PoisonError::into_inner) = Some(interface.to_owned());
	}

	fn activation<R>(
		&self,
		path: &str,
		interface: &str,
		f: impl FnOnce(&Activation) -> R,
	) -> Option<R> {
		let activations = self
			.activations
			.read()
			.unwrap_or_else(PoisonError::into_inner);
		activations
			.values()
			.find(|a| a.path.as_str() == path && a.interface == interface)
			.map(f)
	}

	/// True while a dispatch table is activated for `(path, interface)`.
	pub fn has_dispatch_table(&self, path: &str, interface: &str) -> bool {
		self.activation(path, interface, |_| ()).is_some()
	}

	/// The context handle the object registered for `(path, interface)`.
	pub fn activation_context(
		&self,
		path: &str,
		interface: &str,
	) -> Option<DispatchContext<TestMessage>> {
		self.activation(path, interface, |a| a.context.clone())
	}

	/// Number of messages handed to the transport so far.
	pub fn sent_count(&self) -> usize {
		self.outbox
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.len()
	}

	/// Drain every message sent so far.
	pub fn take_sent(&self) -> Vec<TestMessage> {
		std::mem::take(
			&mut *self
				.outbox
				.lock()
				.unwrap_or_else(PoisonError::into_inner),
		)
	}

	/// Drive an inbound method call the way a real bus would: resolve the
	/// method slot in the activated table, wrap the payload as a method-call
	/// message and invoke the slot's entry point. On success the reply the
	/// entry point sent is popped from the outbox and its payload returned.
	pub fn call_method(
		&self,
		path: &str,
		interface: &str,
		member: &str,
		args: Vec<i64>,
	) -> Result<Vec<i64>, CallError> {
		let outcome = self
			.activation(path, interface, |activation| {
				let handler = activation
					.table
					.entries()
					.iter()
					.find_map(|entry| match entry {
						DispatchEntry::Method { name, handler, .. } if name == member => {
							Some(*handler)
						}
						_ => None,
					})
					.expect("no method slot in activated dispatch table");

				let request = TestMessage::new(
					MessageKind::MethodCall,
					path,
					interface,
					member,
					args,
					Arc::clone(&self.outbox),
				);
				handler(&activation.context, &request)
			})
			.expect("no dispatch table activated for interface");

		outcome.map(|()| {
			let reply = self
				.outbox
				.lock()
				.unwrap_or_else(PoisonError::into_inner)
				.pop()
				.expect("successful method call sent no reply");
			assert_eq!(reply.kind, MessageKind::Reply);
			reply.body
		})
	}

	/// Drive a property read: the reply under construction is handed to the
	/// get entry point and its payload returned as the read value.
	pub fn get_property(
		&self,
		path: &str,
		interface: &str,
		member: &str,
	) -> Result<Vec<i64>, CallError> {
		self.activation(path, interface, |activation| {
			let get = activation
				.table
				.entries()
				.iter()
				.find_map(|entry| match entry {
					DispatchEntry::Property { name, get, .. } if name == member => Some(*get),
					_ => None,
				})
				.expect("no property slot in activated dispatch table");

			let mut reply = TestMessage::new(
				MessageKind::Reply,
				path,
				interface,
				member,
				Vec::new(),
				Arc::clone(&self.outbox),
			);
			get(&activation.context, interface, member, &mut reply).map(|()| reply.body)
		})
		.expect("no dispatch table activated for interface")
	}

	/// Attempt a property write. Returns `None` when the activated table
	/// carries no set entry point for the property; a real bus refuses the
	/// write itself in that case, without entering this crate at all.
	pub fn set_property(
		&self,
		path: &str,
		interface: &str,
		member: &str,
		value: Vec<i64>,
	) -> Option<Result<(), CallError>> {
		self.activation(path, interface, |activation| {
			let set = activation
				.table
				.entries()
				.iter()
				.find_map(|entry| match entry {
					DispatchEntry::Property { name, set, .. } if name == member => Some(*set),
					_ => None,
				})
				.expect("no property slot in activated dispatch table")?;

			let value = TestMessage::new(
				MessageKind::PropertyValue,
				path,
				interface,
				member,
				value,
				Arc::clone(&self.outbox),
			);
			Some(set(&activation.context, interface, member, &value))
		})
		.expect("no dispatch table activated for interface")
	}
}

impl Connection for LoopbackConnection {
	type Message = TestMessage;
	type Token = u64;

	fn add_dispatch_table(
		&self,
		path: &ObjectPath,
		interface: &str,
		table: Arc<DispatchTable<TestMessage>>,
		context: DispatchContext<TestMessage>,
	) -> Result<u64, Error> {
		let refused = self
			.fail_interface
			.lock()
			.unwrap_or_else(PoisonError::into_inner);
		if refused.as_deref() == Some(interface) {
			return Err(Error::Transport(format!(
				"interface '{interface}' refused by bus"
			)));
		}
		drop(refused);

		let token = self.next_token.fetch_add(1, Ordering::Relaxed);
		self.activations
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.insert(
				token,
				Activation {
					path: path.clone(),
					interface: interface.to_owned(),
					table,
					context,
				},
			);
		Ok(token)
	}

	fn remove_dispatch_table(&self, token: u64) {
		self.activations
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.remove(&token);
	}

	fn create_signal_message(
		&self,
		path: &ObjectPath,
		interface: &str,
		signal: &str,
	) -> Result<TestMessage, Error> {
		Ok(TestMessage::new(
			MessageKind::Signal,
			path.as_str(),
			interface,
			signal,
			Vec::new(),
			Arc::clone(&self.outbox),
		))
	}
}
