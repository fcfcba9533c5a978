use std::sync::OnceLock;

use serde::Serialize;

use crate::mdx::{Cursor, MdxError, MdxObject, MdxValue, ObjectSchema, Result, SaveMode, access};

/// Element kind a custom item setup applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomItemKind {
	/// Not set; rejected on load.
	#[default]
	Unknown,
	/// Block setup.
	Block,
	/// Background object setup.
	Bgo,
	/// Effect setup.
	Effect,
}

impl CustomItemKind {
	fn code(self) -> i32 {
		match self {
			Self::Unknown => -1,
			Self::Block => 0,
			Self::Bgo => 1,
			Self::Effect => 2,
		}
	}
}

impl MdxValue for CustomItemKind {
	fn load(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
		let mut code = 0_i32;
		code.load(cur)?;
		*self = match code {
			-1 => Self::Unknown,
			0 => Self::Block,
			1 => Self::Bgo,
			2 => Self::Effect,
			_ => return Err(MdxError::MalformedTerm { detail: "Bad type" }),
		};
		Ok(())
	}

	fn save(&self, out: &mut String) -> bool {
		self.code().save(out)
	}

	fn is_default(&self, reference: &Self) -> bool {
		self == reference
	}

	fn is_negative(&self) -> bool {
		self.code() < 0
	}
}

/// One `key=value` property of a custom item setup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CustomItemEntry {
	/// Property number.
	pub key: i32,
	/// Property value.
	pub value: i64,
}

/// Stored as the quoted string `"key=value"`.
impl MdxValue for CustomItemEntry {
	fn load(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
		let mut text = String::new();
		text.load(cur)?;

		let mut inner = Cursor::new(text.as_bytes());
		let mut key = 0_i32;
		key.load(&mut inner)?;
		if key < 0 || text.starts_with('-') {
			return Err(MdxError::MalformedTerm { detail: "Negative value" });
		}
		if !inner.eat(b'=') {
			return Err(MdxError::MissingDelimiter { expected: '=' });
		}

		let mut value = 0_i64;
		value.load(&mut inner)?;
		if !inner.is_at_end() {
			return Err(MdxError::MissingDelimiter { expected: '"' });
		}

		*self = Self { key, value };
		Ok(())
	}

	fn save(&self, out: &mut String) -> bool {
		out.push('"');
		self.key.save(out);
		out.push('=');
		self.value.save(out);
		out.push('"');
		true
	}

	fn is_default(&self, reference: &Self) -> bool {
		self == reference
	}
}

/// Per-item property overrides kept from SMBX-38A levels (`CUSTOM_ITEMS_38A`).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LevelItemSetup38A {
	/// Element kind.
	pub kind: CustomItemKind,
	/// Element id within its kind.
	pub id: i64,
	/// Property overrides.
	pub data: Vec<CustomItemEntry>,
}

impl MdxObject for LevelItemSetup38A {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<LevelItemSetup38A>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.non_negative("T", SaveMode::AlwaysStore, access!(kind))
				.non_negative("ID", SaveMode::Normal, access!(id))
				.field("D", access!(data))
				.build()
		})
	}
}
