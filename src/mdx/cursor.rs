/// Forward-only cursor over the bytes of one MDX line.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return true once every byte was consumed.
	pub fn is_at_end(&self) -> bool {
		self.pos >= self.bytes.len()
	}

	/// Peek at the current byte without consuming it.
	pub fn peek(&self) -> Option<u8> {
		self.bytes.get(self.pos).copied()
	}

	/// Peek `offset` bytes past the current position.
	pub fn peek_at(&self, offset: usize) -> Option<u8> {
		self.bytes.get(self.pos + offset).copied()
	}

	/// Return the byte right before the current position.
	pub fn prev(&self) -> Option<u8> {
		self.pos.checked_sub(1).and_then(|idx| self.bytes.get(idx).copied())
	}

	/// Consume and return the current byte.
	pub fn bump(&mut self) -> Option<u8> {
		let byte = self.peek()?;
		self.pos += 1;
		Some(byte)
	}

	/// Consume the current byte when it equals `byte`.
	pub fn eat(&mut self, byte: u8) -> bool {
		if self.peek() == Some(byte) {
			self.pos += 1;
			true
		} else {
			false
		}
	}

	/// Consume `prefix` when the remaining bytes start with it.
	pub fn eat_prefix(&mut self, prefix: &[u8]) -> bool {
		if self.rest().starts_with(prefix) {
			self.pos += prefix.len();
			true
		} else {
			false
		}
	}

	/// Return the unread bytes.
	pub fn rest(&self) -> &'a [u8] {
		&self.bytes[self.pos.min(self.bytes.len())..]
	}

	/// Return the bytes consumed since offset `start`.
	pub fn since(&self, start: usize) -> &'a [u8] {
		&self.bytes[start.min(self.pos)..self.pos]
	}
}
