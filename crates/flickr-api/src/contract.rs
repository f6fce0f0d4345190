//! Turns a raw `(status, body)` pair into a typed payload or a typed failure.
//!
//! Every Flickr REST response shares the same envelope: a top level `stat` field that is `"ok"`
//! on success, plus one operation specific payload key. Failures carry `code` and `message`
//! instead of the payload.

use serde::de::{DeserializeOwned, Error as _};
use serde_json::{Map, Value};

use crate::error::{Error, TransportError};

const STAT_KEY: &str = "stat";
const STAT_OK: &str = "ok";
const CODE_KEY: &str = "code";
const MESSAGE_KEY: &str = "message";

const MISSING_CODE: i64 = -1;
const MISSING_MESSAGE: &str = "null";

/// Describes where an operation's payload lives in the envelope and what it decodes into.
pub trait Contract {
	const PAYLOAD_KEY: &'static str;
	const ENTITY: &'static str;

	type Payload: DeserializeOwned;
}

pub fn parse<C: Contract>(status: u16, body: &[u8]) -> Result<C::Payload, Error> {
	if !(200..300).contains(&status) {
		return Err(TransportError::Status(status).into());
	}

	let format_error = |source| Error::Format {
		entity: C::ENTITY,
		source,
	};

	// A top level array carries no envelope fields and fails as an unexplained remote failure
	let mut envelope = match serde_json::from_slice::<Value>(body).map_err(format_error)? {
		Value::Object(envelope) => envelope,
		Value::Array(_) => Map::new(),
		_ => {
			return Err(format_error(serde_json::Error::custom(
				"expected a JSON object or array at the top level",
			)));
		}
	};

	if envelope.get(STAT_KEY).and_then(Value::as_str) != Some(STAT_OK) {
		return Err(Error::RemoteApi {
			code: envelope
				.get(CODE_KEY)
				.and_then(Value::as_i64)
				.unwrap_or(MISSING_CODE),
			message: envelope
				.get(MESSAGE_KEY)
				.and_then(Value::as_str)
				.unwrap_or(MISSING_MESSAGE)
				.to_string(),
		});
	}

	match envelope.remove(C::PAYLOAD_KEY) {
		None | Some(Value::Null) => Err(Error::Schema {
			key: C::PAYLOAD_KEY,
			entity: C::ENTITY,
		}),
		Some(payload) => serde_json::from_value(payload).map_err(format_error),
	}
}
