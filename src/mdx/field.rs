use crate::mdx::{Cursor, MdxError, MdxValue, Result};


/// How a field takes part in default suppression on save.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SaveMode {
	/// Omitted when equal to the reference value.
	#[default]
	Normal,
	/// Always written, even when equal to the reference value.
	AlwaysStore,
	/// Written like `Normal`, but never enough on its own to emit the object.
	NotOnly,
}

/// Typed getter pair into one member of an owning record.
pub struct FieldAccessor<O, V> {
	get: fn(&O) -> &V,
	get_mut: fn(&mut O) -> &mut V,
}

impl<O, V> FieldAccessor<O, V> {
	/// Create an accessor from a shared and a mutable projection.
	pub fn new(get: fn(&O) -> &V, get_mut: fn(&mut O) -> &mut V) -> Self {
		Self { get, get_mut }
	}

	/// Borrow the member.
	pub fn get<'o>(&self, owner: &'o O) -> &'o V {
		(self.get)(owner)
	}

	/// Mutably borrow the member.
	pub fn get_mut<'o>(&self, owner: &'o mut O) -> &'o mut V {
		(self.get_mut)(owner)
	}
}

/// Build a [`FieldAccessor`] into `Self` from a dotted member path, e.g. `access!(timer.count)`.
macro_rules! access {
	($($member:ident).+) => {
		$crate::mdx::FieldAccessor::new(
			|owner: &Self| &owner.$($member).+,
			|owner: &mut Self| &mut owner.$($member).+,
		)
	};
}
pub(crate) use access;

/// Load hook of a custom field.
pub type LoadHook<O> = fn(&mut O, &mut Cursor<'_>) -> Result<()>;

/// Save hook of a custom field.
pub type SaveHook<O> = fn(&mut String, &O) -> bool;

/// One named slot of an object schema.
pub trait Field<O>: Send + Sync {
	/// Token name written before `:`.
	fn name(&self) -> &'static str;

	/// Save participation of this field.
	fn mode(&self) -> SaveMode;

	/// Decode the value that follows `NAME:`.
	fn load_value(&self, dest: &mut O, cur: &mut Cursor<'_>) -> Result<()>;

	/// Return true when the value differs from `reference` and should be written.
	fn can_save(&self, src: &O, reference: &O) -> bool;

	/// Append the encoded value; false means nothing to write.
	fn save_value(&self, out: &mut String, src: &O) -> bool;
}

/// Try to decode `NAME:value;` at the cursor.
///
/// Returns `Ok(false)` and leaves the cursor untouched when the token name
/// does not match.
pub fn try_load<O>(field: &dyn Field<O>, dest: &mut O, cur: &mut Cursor<'_>) -> Result<bool> {
	let name = field.name().as_bytes();
	let rest = cur.rest();
	if rest.len() <= name.len() || !rest.starts_with(name) || rest[name.len()] != b':' {
		return Ok(false);
	}

	cur.eat_prefix(name);
	cur.bump();
	load_terminated(field, dest, cur).map_err(|err| err.in_field(field.name()))?;
	Ok(true)
}

fn load_terminated<O>(field: &dyn Field<O>, dest: &mut O, cur: &mut Cursor<'_>) -> Result<()> {
	field.load_value(dest, cur)?;
	if !cur.eat(b';') {
		return Err(MdxError::MissingDelimiter { expected: ';' });
	}
	Ok(())
}

/// Append `NAME:value;` unless the value is suppressed.
pub fn try_save<O>(field: &dyn Field<O>, out: &mut String, src: &O, reference: &O) -> bool {
	if field.mode() != SaveMode::AlwaysStore && !field.can_save(src, reference) {
		return false;
	}

	let start = out.len();
	out.push_str(field.name());
	out.push(':');
	if !field.save_value(out, src) {
		out.truncate(start);
		return false;
	}
	out.push(';');
	true
}

/// Field bound to a member whose type has an MDX encoding.
pub struct ValueField<O, V> {
	name: &'static str,
	mode: SaveMode,
	non_negative: bool,
	access: FieldAccessor<O, V>,
}

impl<O, V> ValueField<O, V> {
	/// Create a field; `non_negative` rejects negative input on load.
	pub fn new(name: &'static str, mode: SaveMode, non_negative: bool, access: FieldAccessor<O, V>) -> Self {
		Self {
			name,
			mode,
			non_negative,
			access,
		}
	}
}

impl<O, V: MdxValue> Field<O> for ValueField<O, V> {
	fn name(&self) -> &'static str {
		self.name
	}

	fn mode(&self) -> SaveMode {
		self.mode
	}

	fn load_value(&self, dest: &mut O, cur: &mut Cursor<'_>) -> Result<()> {
		if self.non_negative && cur.peek() == Some(b'-') {
			return Err(MdxError::IllegalNegative);
		}

		let value = self.access.get_mut(dest);
		value.load(cur)?;
		if self.non_negative && value.is_negative() {
			return Err(MdxError::IllegalNegative);
		}
		Ok(())
	}

	fn can_save(&self, src: &O, reference: &O) -> bool {
		!self.access.get(src).is_default(self.access.get(reference))
	}

	fn save_value(&self, out: &mut String, src: &O) -> bool {
		self.access.get(src).save(out)
	}
}

/// Field with hand-written load and save hooks.
///
/// Without a save hook the field is load-only.
pub struct CustomField<O> {
	name: &'static str,
	mode: SaveMode,
	load: LoadHook<O>,
	save: Option<SaveHook<O>>,
}

impl<O> CustomField<O> {
	/// Create a field from its hooks.
	pub fn new(name: &'static str, mode: SaveMode, load: LoadHook<O>, save: Option<SaveHook<O>>) -> Self {
		Self { name, mode, load, save }
	}
}

impl<O> Field<O> for CustomField<O> {
	fn name(&self) -> &'static str {
		self.name
	}

	fn mode(&self) -> SaveMode {
		self.mode
	}

	fn load_value(&self, dest: &mut O, cur: &mut Cursor<'_>) -> Result<()> {
		(self.load)(dest, cur)
	}

	fn can_save(&self, _src: &O, _reference: &O) -> bool {
		self.save.is_some()
	}

	fn save_value(&self, out: &mut String, src: &O) -> bool {
		self.save.is_some_and(|save| save(out, src))
	}
}

/// The `XTRA` field: a free-form custom-properties string carried per record.
pub struct XtraField<O> {
	access: FieldAccessor<O, String>,
}

impl<O> XtraField<O> {
	/// Token name of the custom-properties field.
	pub const NAME: &'static str = "XTRA";

	/// Bind the field to a record's custom-properties string.
	pub fn new(access: FieldAccessor<O, String>) -> Self {
		Self { access }
	}
}

impl<O> Field<O> for XtraField<O> {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn mode(&self) -> SaveMode {
		SaveMode::Normal
	}

	fn load_value(&self, dest: &mut O, cur: &mut Cursor<'_>) -> Result<()> {
		self.access.get_mut(dest).load(cur)
	}

	fn can_save(&self, src: &O, _reference: &O) -> bool {
		!self.access.get(src).is_empty()
	}

	fn save_value(&self, out: &mut String, src: &O) -> bool {
		self.access.get(src).save(out)
	}
}

/// Skip one unknown `NAME:value;` token, honoring backslash escapes.
pub fn skip_field(cur: &mut Cursor<'_>) -> Result<()> {
	let start = cur.pos();
	skip_token(cur).map_err(|err| {
		let tag = String::from_utf8_lossy(cur.since(start));
		let tag = tag.split(':').next().unwrap_or_default().to_owned();
		err.in_field(tag)
	})
}

fn skip_token(cur: &mut Cursor<'_>) -> Result<()> {
	loop {
		match cur.bump() {
			None => return Err(MdxError::MissingDelimiter { expected: ':' }),
			Some(b'\\') => return Err(MdxError::UnexpectedCharacter { found: '\\' }),
			Some(b':') => break,
			Some(_) => {}
		}
	}

	loop {
		match cur.bump() {
			None => return Err(MdxError::MissingDelimiter { expected: ';' }),
			Some(b'\\') => {
				if cur.bump().is_none() {
					return Err(MdxError::MissingDelimiter { expected: ';' });
				}
			}
			Some(b':') => return Err(MdxError::UnexpectedCharacter { found: ':' }),
			Some(b';') => return Ok(()),
			Some(_) => {}
		}
	}
}
