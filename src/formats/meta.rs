use std::sync::OnceLock;

use serde::Serialize;

use crate::formats::{FileFormatMeta, FormatData, copy_nth, record_error};
use crate::mdx::{FileError, MdxObject, ObjectSchema, Result, SaveMode, TextInput, TextOutput, access};


/// Saved camera position in the editor.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Bookmark {
	/// Display name.
	pub name: String,
	/// Camera X.
	pub x: f64,
	/// Camera Y.
	pub y: f64,
}

impl MdxObject for Bookmark {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<Bookmark>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field("BM", access!(name))
				.field_with("X", SaveMode::AlwaysStore, access!(x))
				.field("Y", access!(y))
				.build()
		})
	}
}

/// Editor state written on crash so the session can be restored.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CrashData {
	/// True when the record was loaded or should be saved.
	pub used: bool,
	/// The crashed document had never been saved.
	pub untitled: bool,
	/// The crashed document had unsaved changes.
	pub modified: bool,
	/// Format identifier of the recent file.
	pub format_id: i32,
	/// Format version of the recent file.
	pub format_version: u32,
	/// File name.
	pub filename: String,
	/// Directory.
	pub path: String,
	/// Full file path.
	pub full_path: String,
}

impl MdxObject for CrashData {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<CrashData>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field("UT", access!(untitled))
				.field("MD", access!(modified))
				.field("FF", access!(format_id))
				.field("FV", access!(format_version))
				.field("N", access!(filename))
				.field("P", access!(path))
				.field("FP", access!(full_path))
				.build()
		})
	}
}

/// Bookmarks and crash state, stored alone in `.meta` files or embedded in
/// level and world files.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MetaData {
	/// Editor bookmarks.
	pub bookmarks: Vec<Bookmark>,
	/// Crash recovery record.
	pub crash: CrashData,
	/// Load status of a standalone `.meta` file.
	pub meta: FileFormatMeta,
}

impl FormatData for MetaData {
	fn format_meta(&self) -> &FileFormatMeta {
		&self.meta
	}

	fn format_meta_mut(&mut self) -> &mut FileFormatMeta {
		&mut self.meta
	}
}

/// Aggregate that embeds a [`MetaData`].
pub(crate) trait CarriesMetaData {
	fn meta_data(&self) -> &MetaData;
	fn meta_data_mut(&mut self) -> &mut MetaData;
}

impl CarriesMetaData for MetaData {
	fn meta_data(&self) -> &MetaData {
		self
	}

	fn meta_data_mut(&mut self) -> &mut MetaData {
		self
	}
}

pub(crate) fn load_bookmark<U: CarriesMetaData>(user: &mut U, bookmark: &mut Bookmark) -> Result<bool> {
	user.meta_data_mut().bookmarks.push(std::mem::take(bookmark));
	Ok(true)
}

pub(crate) fn save_bookmark<U: CarriesMetaData>(user: &U, dest: &mut Bookmark, index: usize) -> Result<bool> {
	Ok(copy_nth(&user.meta_data().bookmarks, dest, index))
}

pub(crate) fn load_crash_data<U: CarriesMetaData>(user: &mut U, crash: &mut CrashData) -> Result<bool> {
	let stored = &mut user.meta_data_mut().crash;
	*stored = std::mem::take(crash);
	stored.used = true;
	Ok(true)
}

pub(crate) fn save_crash_data<U: CarriesMetaData>(user: &U, dest: &mut CrashData, index: usize) -> Result<bool> {
	let crash = &user.meta_data().crash;
	if !crash.used || index != 0 {
		return Ok(false);
	}
	dest.clone_from(crash);
	Ok(true)
}

crate::mdx_file_callbacks! {
	/// Load callbacks of a `.meta` file.
	load MetaLoadCallbacks;
	/// Save callbacks of a `.meta` file.
	save MetaSaveCallbacks;
	/// Editor bookmarks.
	bookmark: Bookmark = "META_BOOKMARKS";
}

/// Load a `.meta` file through caller-supplied callbacks.
pub fn load_meta_with<U>(input: &mut dyn TextInput, user: &mut U, callbacks: &MetaLoadCallbacks<U>) -> std::result::Result<(), FileError> {
	callbacks.load(input, user)
}

/// Save a `.meta` file through caller-supplied callbacks.
pub fn save_meta_with<U>(output: &mut dyn TextOutput, user: &U, callbacks: &MetaSaveCallbacks<U>) -> std::result::Result<(), FileError> {
	callbacks.save(output, user)
}

/// Callbacks filling a [`MetaData`].
pub fn meta_load_callbacks() -> MetaLoadCallbacks<MetaData> {
	MetaLoadCallbacks {
		on_error: Some(record_error),
		bookmark: Some(load_bookmark),
	}
}

/// Callbacks writing a [`MetaData`].
pub fn meta_save_callbacks() -> MetaSaveCallbacks<MetaData> {
	MetaSaveCallbacks {
		on_error: None,
		bookmark: Some(save_bookmark),
	}
}

/// Replace `data` with the contents of a `.meta` file.
pub fn read_meta(input: &mut dyn TextInput, data: &mut MetaData) -> std::result::Result<(), FileError> {
	*data = MetaData::default();
	data.meta.begin_read(input.file_path());
	load_meta_with(input, data, &meta_load_callbacks())
}

/// Write `data` as a `.meta` file.
pub fn write_meta(output: &mut dyn TextOutput, data: &MetaData) -> std::result::Result<(), FileError> {
	save_meta_with(output, data, &meta_save_callbacks())
}
