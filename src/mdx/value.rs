use crate::mdx::{Cursor, MdxError, Result};

#[cfg(test)]
mod tests;

/// Significant digits written for floating point values.
pub const FLOAT_PRECISION: usize = 10;

/// A type with an MDX text encoding.
///
/// `load` consumes exactly the encoded term from the cursor and leaves the
/// cursor on the first byte after it. `save` appends the encoding and returns
/// false when nothing needs to be written, in which case the caller rolls back
/// anything it already emitted for the enclosing field.
pub trait MdxValue {
	/// Decode one term into `self`.
	fn load(&mut self, cur: &mut Cursor<'_>) -> Result<()>;

	/// Append the encoded term to `out`.
	fn save(&self, out: &mut String) -> bool;

	/// Return true when `self` may be omitted given the reference value.
	fn is_default(&self, reference: &Self) -> bool;

	/// Return true for values below zero.
	fn is_negative(&self) -> bool {
		false
	}
}

macro_rules! signed_value {
	($($ty:ty => $kind:literal),+ $(,)?) => {$(
		impl MdxValue for $ty {
			fn load(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
				let negative = cur.peek() == Some(b'-');
				if negative {
					if !cur.peek_at(1).is_some_and(|byte| byte.is_ascii_digit()) {
						return Err(MdxError::MalformedTerm { detail: concat!("bad ", $kind) });
					}
					cur.bump();
				}

				let start = cur.pos();
				let mut value: $ty = 0;
				while let Some(byte) = cur.peek().filter(u8::is_ascii_digit) {
					let digit = <$ty>::from(byte - b'0');
					value = value
						.checked_mul(10)
						.and_then(|acc| if negative { acc.checked_sub(digit) } else { acc.checked_add(digit) })
						.ok_or(MdxError::NumericOverflow { kind: $kind })?;
					cur.bump();
				}

				if cur.pos() == start {
					return Err(MdxError::MalformedTerm { detail: concat!("bad ", $kind) });
				}

				*self = value;
				Ok(())
			}

			fn save(&self, out: &mut String) -> bool {
				out.push_str(&self.to_string());
				true
			}

			fn is_default(&self, reference: &Self) -> bool {
				self == reference
			}

			fn is_negative(&self) -> bool {
				*self < 0
			}
		}
	)+};
}

macro_rules! unsigned_value {
	($($ty:ty => $kind:literal),+ $(,)?) => {$(
		impl MdxValue for $ty {
			fn load(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
				let start = cur.pos();
				let mut value: $ty = 0;
				while let Some(byte) = cur.peek().filter(u8::is_ascii_digit) {
					value = value
						.checked_mul(10)
						.and_then(|acc| acc.checked_add(<$ty>::from(byte - b'0')))
						.ok_or(MdxError::NumericOverflow { kind: $kind })?;
					cur.bump();
				}

				if cur.pos() == start {
					return Err(MdxError::MalformedTerm { detail: concat!("bad ", $kind) });
				}

				*self = value;
				Ok(())
			}

			fn save(&self, out: &mut String) -> bool {
				out.push_str(&self.to_string());
				true
			}

			fn is_default(&self, reference: &Self) -> bool {
				self == reference
			}
		}
	)+};
}

signed_value!(i32 => "int", i64 => "long");
unsigned_value!(u32 => "uint", u64 => "ulong");

impl MdxValue for f64 {
	fn load(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
		*self = load_double(cur, "bad double", "double")?;
		Ok(())
	}

	fn save(&self, out: &mut String) -> bool {
		format_float(*self, out);
		true
	}

	fn is_default(&self, reference: &Self) -> bool {
		self == reference
	}

	fn is_negative(&self) -> bool {
		*self < 0.0
	}
}

impl MdxValue for f32 {
	fn load(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
		let value = load_double(cur, "bad float", "float")?;
		if value.abs() > f64::from(f32::MAX) {
			return Err(MdxError::NumericOverflow { kind: "float" });
		}
		*self = value as f32;
		Ok(())
	}

	fn save(&self, out: &mut String) -> bool {
		format_float(f64::from(*self), out);
		true
	}

	fn is_default(&self, reference: &Self) -> bool {
		self == reference
	}

	fn is_negative(&self) -> bool {
		*self < 0.0
	}
}

impl MdxValue for bool {
	fn load(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
		*self = match cur.peek() {
			Some(b'1') => true,
			Some(b'0') => false,
			_ => return Err(MdxError::MalformedTerm { detail: "bad bool" }),
		};
		cur.bump();
		Ok(())
	}

	fn save(&self, out: &mut String) -> bool {
		out.push(if *self { '1' } else { '0' });
		true
	}

	fn is_default(&self, reference: &Self) -> bool {
		self == reference
	}
}

impl MdxValue for String {
	fn load(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
		if !cur.eat(b'"') {
			return Err(MdxError::MissingDelimiter { expected: '"' });
		}

		let mut buf = Vec::new();
		loop {
			match cur.bump() {
				None => return Err(MdxError::MissingDelimiter { expected: '"' }),
				Some(b'"') => break,
				Some(b'\\') => match cur.bump() {
					None => return Err(MdxError::MissingDelimiter { expected: '"' }),
					Some(b'n') => buf.push(b'\n'),
					Some(b'r') => buf.push(b'\r'),
					Some(other) => buf.push(other),
				},
				Some(byte @ (b';' | b':')) => {
					return Err(MdxError::UnexpectedCharacter { found: char::from(byte) });
				}
				Some(byte) => buf.push(byte),
			}
		}

		*self = match String::from_utf8(buf) {
			Ok(text) => text,
			Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
		};
		Ok(())
	}

	fn save(&self, out: &mut String) -> bool {
		escape_into(out, self);
		true
	}

	fn is_default(&self, reference: &Self) -> bool {
		self == reference
	}
}

/// Ordered list `[a,b,c]` of any encodable item type.
///
/// A list counts as default only when it is empty, so an empty list is never
/// written. Items whose own save reports nothing are dropped from the output.
impl<T: MdxValue + Default> MdxValue for Vec<T> {
	fn load(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
		self.clear();
		if !cur.eat(b'[') {
			return Err(MdxError::MissingDelimiter { expected: '[' });
		}

		while !cur.is_at_end() && cur.peek() != Some(b']') {
			let index = self.len();
			let mut item = T::default();
			load_item(&mut item, cur).map_err(|err| err.in_item(index))?;
			self.push(item);
		}

		if cur.prev() == Some(b',') {
			return Err(MdxError::UnexpectedCharacter { found: ']' });
		}
		if !cur.eat(b']') {
			return Err(MdxError::MissingDelimiter { expected: ']' });
		}
		Ok(())
	}

	fn save(&self, out: &mut String) -> bool {
		let start = out.len();
		out.push('[');

		let mut wrote_any = false;
		for item in self {
			let mark = out.len();
			if item.save(out) {
				out.push(',');
				wrote_any = true;
			} else {
				out.truncate(mark);
			}
		}

		if !wrote_any {
			out.truncate(start);
			return false;
		}

		out.pop();
		out.push(']');
		true
	}

	fn is_default(&self, _reference: &Self) -> bool {
		self.is_empty()
	}
}

fn load_item<T: MdxValue>(item: &mut T, cur: &mut Cursor<'_>) -> Result<()> {
	item.load(cur)?;
	match cur.peek() {
		Some(b']') => Ok(()),
		Some(b',') => {
			cur.bump();
			Ok(())
		}
		_ => Err(MdxError::MissingDelimiter { expected: ',' }),
	}
}

/// Append `text` as a quoted MDX string, escaping structural characters.
pub fn escape_into(out: &mut String, text: &str) {
	out.reserve(text.len() + 2);
	out.push('"');
	for ch in text.chars() {
		match ch {
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			'"' | ';' | ':' | '[' | ']' | ',' | '%' | '\\' => {
				out.push('\\');
				out.push(ch);
			}
			other => out.push(other),
		}
	}
	out.push('"');
}

/// Decode a decimal floating point term.
///
/// Digits are accumulated by hand, so pathological inputs may round
/// differently from `str::parse::<f64>`.
fn load_double(cur: &mut Cursor<'_>, detail: &'static str, kind: &'static str) -> Result<f64> {
	let bad = || MdxError::MalformedTerm { detail };

	let negative = cur.eat(b'-');
	if !cur.peek().is_some_and(|byte| byte.is_ascii_digit() || byte == b'.') {
		return Err(bad());
	}

	let mut value = 0.0_f64;
	let mut digits = 0_usize;
	while let Some(byte) = cur.peek().filter(u8::is_ascii_digit) {
		if value >= f64::MAX / 10.0 {
			return Err(MdxError::NumericOverflow { kind });
		}
		value = value * 10.0 + f64::from(byte - b'0');
		digits += 1;
		cur.bump();
	}

	if cur.eat(b'.') {
		let mut scale = 0.1_f64;
		while let Some(byte) = cur.peek().filter(u8::is_ascii_digit) {
			value += scale * f64::from(byte - b'0');
			scale *= 0.1;
			digits += 1;
			cur.bump();
		}
	}

	if digits == 0 {
		return Err(bad());
	}

	if matches!(cur.peek(), Some(b'e' | b'E')) {
		cur.bump();
		if cur.peek() == Some(b'+') && cur.peek_at(1) != Some(b'-') {
			cur.bump();
		}

		let limit = if cur.peek() == Some(b'-') { 5 } else { 4 };
		let start = cur.pos();
		let mut exponent = 0_i32;
		exponent.load(cur).map_err(|_| bad())?;
		if cur.pos() - start > limit {
			return Err(bad());
		}
		if exponent > f64::MAX_10_EXP {
			return Err(MdxError::NumericOverflow { kind });
		}
		value *= 10_f64.powi(exponent);
		if !value.is_finite() {
			return Err(MdxError::NumericOverflow { kind });
		}
	}

	Ok(if negative { -value } else { value })
}

/// Append `value` using `%.10g` rules: ten significant digits, trailing zeros
/// removed, scientific notation outside the `1e-4 ..= 1e10` window.
pub fn format_float(value: f64, out: &mut String) {
	if value.is_nan() {
		out.push_str("nan");
		return;
	}
	if value.is_infinite() {
		out.push_str(if value < 0.0 { "-inf" } else { "inf" });
		return;
	}
	if value == 0.0 {
		out.push_str(if value.is_sign_negative() { "-0" } else { "0" });
		return;
	}

	let scientific = format!("{:.*e}", FLOAT_PRECISION - 1, value);
	let Some((mantissa, exponent)) = scientific.split_once('e') else {
		out.push_str(&scientific);
		return;
	};
	let exponent: i32 = exponent.parse().unwrap_or(0);

	if exponent < -4 || exponent >= FLOAT_PRECISION as i32 {
		out.push_str(trim_fraction(mantissa));
		out.push('e');
		out.push(if exponent < 0 { '-' } else { '+' });
		let magnitude = exponent.unsigned_abs();
		if magnitude < 10 {
			out.push('0');
		}
		out.push_str(&magnitude.to_string());
	} else {
		let decimals = (FLOAT_PRECISION as i32 - 1 - exponent) as usize;
		let fixed = format!("{value:.decimals$}");
		out.push_str(trim_fraction(&fixed));
	}
}

fn trim_fraction(text: &str) -> &str {
	if text.contains('.') { text.trim_end_matches('0').trim_end_matches('.') } else { text }
}
