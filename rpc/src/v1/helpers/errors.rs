//! RPC error codes and error objects, following the bitcoind conventions.

use std::fmt;
use jsonrpc_core::{Error, ErrorCode, Value};

const INVALID_ADDRESS_OR_KEY: i64 = -5;
const OUT_OF_MEMORY: i64 = -7;
const INVALID_PARAMETER: i64 = -8;
const MISC_ERROR: i64 = -1;
const CLIENT_NOT_CONNECTED: i64 = -9;
const CLIENT_IN_INITIAL_DOWNLOAD: i64 = -10;
const DESERIALIZATION_ERROR: i64 = -22;
const VERIFY_ERROR: i64 = -25;
const INTERNAL_ERROR: i64 = -32603;

fn error<T>(code: i64, message: &str, details: Option<T>) -> Error where T: fmt::Display {
	Error {
		code: ErrorCode::ServerError(code),
		message: message.into(),
		data: details.map(|details| Value::String(details.to_string())),
	}
}

pub fn invalid_params<T>(message: &str, details: T) -> Error where T: fmt::Display {
	error(INVALID_PARAMETER, message, Some(details))
}

pub fn invalid_address_or_key<T>(details: T) -> Error where T: fmt::Display {
	error(INVALID_ADDRESS_OR_KEY, &details.to_string(), None::<String>)
}

pub fn deserialization<T>(details: T) -> Error where T: fmt::Display {
	error(DESERIALIZATION_ERROR, &details.to_string(), None::<String>)
}

pub fn verify<T>(details: T) -> Error where T: fmt::Display {
	error(VERIFY_ERROR, &details.to_string(), None::<String>)
}

pub fn internal<T>(details: T) -> Error where T: fmt::Display {
	error(INTERNAL_ERROR, "Internal error", Some(details))
}

pub fn out_of_memory() -> Error {
	error(OUT_OF_MEMORY, "Out of memory", None::<String>)
}

pub fn misc<T>(details: T) -> Error where T: fmt::Display {
	error(MISC_ERROR, &details.to_string(), None::<String>)
}

pub fn client_not_connected() -> Error {
	error(CLIENT_NOT_CONNECTED, "pmint is not connected!", None::<String>)
}

pub fn client_in_initial_download() -> Error {
	error(CLIENT_IN_INITIAL_DOWNLOAD, "pmint is in initial sync and waiting for blocks...", None::<String>)
}
