use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the node's adjusted time. The network offset estimation lives
/// with the p2p layer; block production only consumes the result.
pub trait TimeSource: Send + Sync {
	fn adjusted_now(&self) -> u32;
}

#[derive(Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
	fn adjusted_now(&self) -> u32 {
		SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.expect("system time is past the epoch; qed")
			.as_secs() as u32
	}
}

#[cfg(test)]
pub struct FixedTimeSource(pub u32);

#[cfg(test)]
impl TimeSource for FixedTimeSource {
	fn adjusted_now(&self) -> u32 {
		self.0
	}
}
