use crate::mdx::field::{CustomField, LoadHook, SaveHook, ValueField, XtraField, skip_field, try_load, try_save};
use crate::mdx::value::escape_into;
use crate::mdx::{Cursor, Field, FieldAccessor, MdxValue, Result, SaveMode};


/// Record type with a static MDX schema.
pub trait MdxObject: Default + 'static {
	/// Return the process-wide schema for this type.
	fn schema() -> &'static ObjectSchema<Self>;
}

/// Ordered field list describing one record type.
pub struct ObjectSchema<O> {
	fields: Vec<Box<dyn Field<O>>>,
}

impl<O: 'static> ObjectSchema<O> {
	/// Start building a schema.
	pub fn builder() -> SchemaBuilder<O> {
		SchemaBuilder { fields: Vec::new() }
	}

	/// Return the fields in declaration order.
	pub fn fields(&self) -> impl Iterator<Item = &dyn Field<O>> {
		self.fields.iter().map(|field| field.as_ref())
	}

	/// Decode a complete `NAME:value;NAME:value;` sequence into `dest`.
	///
	/// Unknown tokens are skipped. Fields are matched starting from the one
	/// after the previous match, wrapping around the whole list.
	pub fn load(&self, dest: &mut O, text: &[u8]) -> Result<()> {
		let mut cur = Cursor::new(text);
		let count = self.fields.len();
		let mut next_field = 0;

		while !cur.is_at_end() {
			let mut matched = None;
			for step in 0..count {
				let idx = (next_field + step) % count;
				if try_load(self.fields[idx].as_ref(), dest, &mut cur)? {
					matched = Some(idx);
					break;
				}
			}

			match matched {
				Some(idx) => next_field = (idx + 1) % count,
				None => {
					let start = cur.pos();
					skip_field(&mut cur)?;
					log::trace!("skipped unknown field {}", String::from_utf8_lossy(cur.since(start)));
				}
			}
		}

		Ok(())
	}

	/// Append every non-suppressed field of `src`.
	///
	/// Returns false and leaves `out` unchanged when no field other than
	/// not-only fields was written.
	pub fn save(&self, out: &mut String, src: &O, reference: &O) -> bool {
		let start = out.len();
		let mut any_field = false;
		for field in &self.fields {
			let saved = try_save(field.as_ref(), out, src, reference);
			any_field |= saved && field.mode() != SaveMode::NotOnly;
		}

		if !any_field {
			out.truncate(start);
		}
		any_field
	}
}

/// Incremental constructor for [`ObjectSchema`].
pub struct SchemaBuilder<O> {
	fields: Vec<Box<dyn Field<O>>>,
}

impl<O: 'static> SchemaBuilder<O> {
	/// Add a normal field.
	pub fn field<V: MdxValue + 'static>(self, name: &'static str, access: FieldAccessor<O, V>) -> Self {
		self.field_with(name, SaveMode::Normal, access)
	}

	/// Add a field with an explicit save mode.
	pub fn field_with<V: MdxValue + 'static>(mut self, name: &'static str, mode: SaveMode, access: FieldAccessor<O, V>) -> Self {
		self.fields.push(Box::new(ValueField::new(name, mode, false, access)));
		self
	}

	/// Add a field that rejects negative input.
	pub fn non_negative<V: MdxValue + 'static>(mut self, name: &'static str, mode: SaveMode, access: FieldAccessor<O, V>) -> Self {
		self.fields.push(Box::new(ValueField::new(name, mode, true, access)));
		self
	}

	/// Add a field with hand-written hooks; `save: None` makes it load-only.
	pub fn custom(mut self, name: &'static str, load: LoadHook<O>, save: Option<SaveHook<O>>) -> Self {
		self.fields.push(Box::new(CustomField::new(name, SaveMode::Normal, load, save)));
		self
	}

	/// Add the `XTRA` custom-properties field.
	pub fn xtra(mut self, access: FieldAccessor<O, String>) -> Self {
		self.fields.push(Box::new(XtraField::new(access)));
		self
	}

	/// Finish the schema.
	pub fn build(self) -> ObjectSchema<O> {
		debug_assert!(
			self.fields.iter().enumerate().all(|(idx, field)| self.fields[..idx].iter().all(|prev| prev.name() != field.name())),
			"field names must be unique within a schema"
		);
		ObjectSchema { fields: self.fields }
	}
}

/// Decode an object stored as an escaped string value.
pub fn load_sub_object<T: MdxObject>(dest: &mut T, cur: &mut Cursor<'_>) -> Result<()> {
	*dest = T::default();
	let mut text = String::new();
	text.load(cur)?;
	T::schema().load(dest, text.as_bytes())
}

/// Encode an object as an escaped string value; false when no field was written.
pub fn save_sub_object<T: MdxObject>(src: &T, out: &mut String) -> bool {
	let reference = T::default();
	let mut inner = String::new();
	if !T::schema().save(&mut inner, src, &reference) {
		return false;
	}
	escape_into(out, &inner);
	true
}

/// Implement [`MdxValue`](crate::mdx::MdxValue) for record types so they can
/// be embedded as sub-objects or lists of sub-objects.
///
/// Sub-objects are never treated as default, so a field holding one is always
/// offered for saving; it still disappears when the object itself writes nothing.
#[macro_export]
macro_rules! sub_object_value {
	($($ty:ty),+ $(,)?) => {$(
		impl $crate::mdx::MdxValue for $ty {
			fn load(&mut self, cur: &mut $crate::mdx::Cursor<'_>) -> $crate::mdx::Result<()> {
				$crate::mdx::load_sub_object(self, cur)
			}

			fn save(&self, out: &mut String) -> bool {
				$crate::mdx::save_sub_object(self, out)
			}

			fn is_default(&self, _reference: &Self) -> bool {
				false
			}
		}
	)+};
}
