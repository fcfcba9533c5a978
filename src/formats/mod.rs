mod document;
mod gamesave;
mod level;
mod meta;
mod world;

use std::path::Path;

use serde::Serialize;

use crate::mdx::FileError;

/// Whole-file document dispatch by kind.
pub use document::{Document, LoadOptions};
/// Game-save file kind.
pub use gamesave::{
	CharacterState, DataEntry, GamesaveData, GamesaveHead, GamesaveLoadCallbacks, GamesaveSaveCallbacks, LevelInfo, PlayerState, StarOnLevel,
	UserDataSection, VisibleItem, gamesave_load_callbacks, gamesave_save_callbacks, load_gamesave_with, read_gamesave, save_gamesave_with,
	write_gamesave,
};
/// Level file kind.
pub use level::{
	AutoscrollStop, CustomItemEntry, CustomItemKind, EventControls, EventMoveLayer, EventSectionSettings, EventSpawnEffect, EventSpawnNpc, EventTimer, EventUpdateVariable, LevelArray,
	LevelBgo, LevelBlock, LevelData, LevelDoor, LevelEvent, LevelHead, LevelLayer, LevelLoadCallbacks, LevelNpc, LevelPhysEnv, LevelSaveCallbacks,
	LevelItemSetup38A, LevelScript, LevelSection, LevelVariable, PlayerPoint, level_header_callbacks, level_load_callbacks, level_save_callbacks, load_level_with,
	read_level, read_level_header, save_level_with, write_level,
};
/// Shared meta objects and the meta file kind.
pub use meta::{
	Bookmark, CrashData, MetaData, MetaLoadCallbacks, MetaSaveCallbacks, load_meta_with, meta_load_callbacks, meta_save_callbacks, read_meta, save_meta_with,
	write_meta,
};
/// World map file kind.
pub use world::{
	WorldAreaRect, WorldData, WorldHead, WorldLevelTile, WorldLoadCallbacks, WorldMusicBox, WorldPathTile, WorldSaveCallbacks, WorldScenery, WorldTerrainTile,
	load_world_with, read_world, read_world_header, save_world_with, world_header_callbacks, world_load_callbacks, world_save_callbacks, write_world,
};

/// Layer every placed element belongs to unless told otherwise.
pub const DEFAULT_LAYER: &str = "Default";

/// File kinds built on the MDX engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
	/// `.lvlx` level.
	Level,
	/// `.wldx` world map.
	World,
	/// `.savx` game save.
	Gamesave,
	/// `.meta` editor bookmarks.
	Meta,
}

impl FileKind {
	/// Pick the kind from a file extension, ignoring case.
	pub fn from_path(path: &Path) -> Option<Self> {
		let ext = path.extension()?.to_str()?.to_ascii_lowercase();
		match ext.as_str() {
			"lvlx" => Some(Self::Level),
			"wldx" => Some(Self::World),
			"savx" => Some(Self::Gamesave),
			"meta" => Some(Self::Meta),
			_ => None,
		}
	}

	/// Return the canonical extension.
	pub fn extension(self) -> &'static str {
		match self {
			Self::Level => "lvlx",
			Self::World => "wldx",
			Self::Gamesave => "savx",
			Self::Meta => "meta",
		}
	}
}

/// Load status and origin of a file aggregate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FileFormatMeta {
	/// False once a load failed.
	pub read_valid: bool,
	/// Rendered failure chain of the last load.
	pub error_info: String,
	/// One-based failing line; -1 when unknown.
	pub error_line_number: i64,
	/// Text of the failing line.
	pub error_line_data: String,
	/// File name without extension.
	pub filename: String,
	/// Directory holding the file.
	pub path: String,
	/// True for aggregates not read from disk.
	pub untitled: bool,
	/// True for aggregates changed since load.
	pub modified: bool,
	/// Config pack identifier stored in the header.
	pub config_pack_id: String,
}

impl Default for FileFormatMeta {
	fn default() -> Self {
		Self {
			read_valid: true,
			error_info: String::new(),
			error_line_number: -1,
			error_line_data: String::new(),
			filename: String::new(),
			path: String::new(),
			untitled: true,
			modified: true,
			config_pack_id: String::new(),
		}
	}
}

impl FileFormatMeta {
	/// Mark the aggregate as freshly read from `path`.
	pub fn begin_read(&mut self, path: Option<&Path>) {
		if let Some(path) = path {
			self.filename = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default();
			self.path = path.parent().map(|dir| dir.to_string_lossy().into_owned()).unwrap_or_default();
		}
		self.untitled = false;
		self.modified = false;
		self.read_valid = true;
	}

	/// Store a load failure.
	pub fn record_error(&mut self, err: &FileError) {
		self.read_valid = false;
		self.error_info = err.engine_error().chain();
		if let FileError::Load { line_number, line, .. } = err {
			self.error_line_number = i64::try_from(*line_number).unwrap_or(i64::MAX);
			self.error_line_data.clone_from(line);
		}
	}
}

/// Bookkeeping shared by every placed element.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ElementMeta {
	/// Stable per-kind identifier assigned on load, starting at 1.
	pub array_id: u32,
	/// Position in its list at load time.
	pub index: u32,
	/// Free-form custom properties (`XTRA`).
	pub custom_params: String,
}

/// Aggregate that carries a [`FileFormatMeta`].
pub trait FormatData {
	/// Borrow the load status.
	fn format_meta(&self) -> &FileFormatMeta;

	/// Mutably borrow the load status.
	fn format_meta_mut(&mut self) -> &mut FileFormatMeta;
}

/// Record that carries an [`ElementMeta`].
pub trait Element {
	/// Mutably borrow the element bookkeeping.
	fn element_meta_mut(&mut self) -> &mut ElementMeta;
}

macro_rules! impl_element {
	($($ty:ty),+ $(,)?) => {$(
		impl $crate::formats::Element for $ty {
			fn element_meta_mut(&mut self) -> &mut $crate::formats::ElementMeta {
				&mut self.meta
			}
		}
	)+};
}
pub(crate) use impl_element;

/// Generate the load/save callback pair of a plain list section.
///
/// With a counter name, loaded elements are numbered through [`append_element`].
macro_rules! list_section {
	($load:ident, $save:ident: $data:ty, $item:ty => $list:ident) => {
		fn $load(data: &mut $data, item: &mut $item) -> $crate::mdx::Result<bool> {
			data.$list.push(::std::mem::take(item));
			Ok(true)
		}

		fn $save(data: &$data, dest: &mut $item, index: usize) -> $crate::mdx::Result<bool> {
			Ok($crate::formats::copy_nth(&data.$list, dest, index))
		}
	};
	($load:ident, $save:ident: $data:ty, $item:ty => $list:ident, $counter:ident) => {
		fn $load(data: &mut $data, item: &mut $item) -> $crate::mdx::Result<bool> {
			$crate::formats::append_element(&mut data.$list, &mut data.$counter, item);
			Ok(true)
		}

		fn $save(data: &$data, dest: &mut $item, index: usize) -> $crate::mdx::Result<bool> {
			Ok($crate::formats::copy_nth(&data.$list, dest, index))
		}
	};
}
pub(crate) use list_section;

/// Error callback storing the failure in the aggregate.
pub(crate) fn record_error<U: FormatData>(user: &mut U, err: &FileError) {
	user.format_meta_mut().record_error(err);
}

/// Per-kind `array_id` counter; the first element gets 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NextId(pub(crate) u32);

impl Default for NextId {
	fn default() -> Self {
		Self(1)
	}
}

impl NextId {
	pub(crate) fn take(&mut self) -> u32 {
		let id = self.0;
		self.0 += 1;
		id
	}
}

/// Append a loaded element, numbering it from `next_id`.
pub(crate) fn append_element<T: Element + Default>(list: &mut Vec<T>, next_id: &mut NextId, item: &mut T) {
	let mut item = std::mem::take(item);
	let meta = item.element_meta_mut();
	meta.array_id = next_id.take();
	meta.index = u32::try_from(list.len()).unwrap_or(u32::MAX);
	list.push(item);
}

/// Copy record `index` of `list` into `dest`; false past the end.
pub(crate) fn copy_nth<T: Clone>(list: &[T], dest: &mut T, index: usize) -> bool {
	match list.get(index) {
		Some(item) => {
			dest.clone_from(item);
			true
		}
		None => false,
	}
}

#[cfg(test)]
mod tests;
