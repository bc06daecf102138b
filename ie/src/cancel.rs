use std::sync::{
	Arc,
	atomic::{AtomicBool, Ordering},
};

/// Cooperative cancellation flag for a single match call.
///
/// Clones share the same flag; separate tokens are fully independent.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.0.store(true, Ordering::Release);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::Acquire)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clones_share_state_but_tokens_do_not() {
		let a = CancelToken::new();
		let a2 = a.clone();
		let b = CancelToken::new();
		a2.cancel();
		assert!(a.is_cancelled());
		assert!(!b.is_cancelled());
	}
}
