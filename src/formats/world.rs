use std::sync::OnceLock;

use serde::Serialize;

use crate::formats::meta::{CarriesMetaData, load_bookmark, load_crash_data, save_bookmark, save_crash_data};
use crate::formats::{DEFAULT_LAYER, ElementMeta, FileFormatMeta, FormatData, MetaData, NextId, impl_element, list_section, record_error};
use crate::formats::{Bookmark, CrashData};
use crate::mdx::{FileError, MdxError, MdxObject, ObjectSchema, Result, SaveMode, TextInput, TextOutput, access};


/// Episode settings stored in `HEAD`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorldHead {
	/// Episode title.
	pub title: String,
	/// Per-character lock flags; `true` disables the character.
	pub no_character: Vec<bool>,
	/// Level played before the map opens.
	pub intro_level_file: String,
	/// Level played on game over.
	pub game_over_level_file: String,
	/// Map is replaced by a hub level.
	pub hub_styled: bool,
	/// Restart the level after losing a life.
	pub restart_level: bool,
	/// Total stars in the episode.
	pub stars: u32,
	/// Credits text.
	pub authors: String,
	/// Credits music.
	pub authors_music: String,
	/// Star counter display policy; -1 means engine default.
	pub stars_show_policy: i32,
	/// Free-form custom properties (`XTRA`).
	pub custom_params: String,
	/// Config pack identifier.
	pub config_pack_id: String,
}

impl Default for WorldHead {
	fn default() -> Self {
		Self {
			title: String::new(),
			no_character: Vec::new(),
			intro_level_file: String::new(),
			game_over_level_file: String::new(),
			hub_styled: false,
			restart_level: false,
			stars: 0,
			authors: String::new(),
			authors_music: String::new(),
			stars_show_policy: -1,
			custom_params: String::new(),
			config_pack_id: String::new(),
		}
	}
}

impl MdxObject for WorldHead {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<WorldHead>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field("TL", access!(title))
				.field("DC", access!(no_character))
				.field("IT", access!(intro_level_file))
				.field("GO", access!(game_over_level_file))
				.field("HB", access!(hub_styled))
				.field("RL", access!(restart_level))
				.field("SZ", access!(stars))
				.field("CD", access!(authors))
				.field("CM", access!(authors_music))
				.field("SSS", access!(stars_show_policy))
				.xtra(access!(custom_params))
				.field("CPID", access!(config_pack_id))
				.build()
		})
	}
}

/// Terrain tile.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WorldTerrainTile {
	/// Tile type.
	pub id: u64,
	/// Left edge.
	pub x: i64,
	/// Top edge.
	pub y: i64,
	/// Bookkeeping.
	pub meta: ElementMeta,
}

impl MdxObject for WorldTerrainTile {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<WorldTerrainTile>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("ID", SaveMode::AlwaysStore, access!(id))
				.field("X", access!(x))
				.field("Y", access!(y))
				.xtra(access!(meta.custom_params))
				.build()
		})
	}
}

/// Scenery decoration.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WorldScenery {
	/// Scenery type.
	pub id: u64,
	/// Left edge.
	pub x: i64,
	/// Top edge.
	pub y: i64,
	/// Bookkeeping.
	pub meta: ElementMeta,
}

impl MdxObject for WorldScenery {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<WorldScenery>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("ID", SaveMode::AlwaysStore, access!(id))
				.field("X", access!(x))
				.field("Y", access!(y))
				.xtra(access!(meta.custom_params))
				.build()
		})
	}
}

/// Walkable path tile.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WorldPathTile {
	/// Path type.
	pub id: u64,
	/// Left edge.
	pub x: i64,
	/// Top edge.
	pub y: i64,
	/// Bookkeeping.
	pub meta: ElementMeta,
}

impl MdxObject for WorldPathTile {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<WorldPathTile>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("ID", SaveMode::AlwaysStore, access!(id))
				.field("X", access!(x))
				.field("Y", access!(y))
				.xtra(access!(meta.custom_params))
				.build()
		})
	}
}

/// Music box switching the map music.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WorldMusicBox {
	/// Music id.
	pub id: u64,
	/// Left edge.
	pub x: i64,
	/// Top edge.
	pub y: i64,
	/// Custom music file.
	pub music_file: String,
	/// Bookkeeping.
	pub meta: ElementMeta,
}

impl MdxObject for WorldMusicBox {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<WorldMusicBox>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("ID", SaveMode::AlwaysStore, access!(id))
				.field("X", access!(x))
				.field("Y", access!(y))
				.field("MF", access!(music_file))
				.xtra(access!(meta.custom_params))
				.build()
		})
	}
}

/// Rectangle area with music and event triggers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorldAreaRect {
	/// Behavior flags.
	pub flags: u32,
	/// Left edge.
	pub x: i64,
	/// Top edge.
	pub y: i64,
	/// Width.
	pub w: i64,
	/// Height.
	pub h: i64,
	/// Music id.
	pub music_id: u32,
	/// Custom music file.
	pub music_file: String,
	/// Owning layer.
	pub layer: String,
	/// Event on break.
	pub event_break: String,
	/// Event on warp.
	pub event_warp: String,
	/// Event on anchor.
	pub event_anchor: String,
	/// Event on touch.
	pub event_touch: String,
	/// When the touch event fires.
	pub event_touch_policy: u32,
	/// Bookkeeping.
	pub meta: ElementMeta,
}

impl Default for WorldAreaRect {
	fn default() -> Self {
		Self {
			flags: 0,
			x: 0,
			y: 0,
			w: 32,
			h: 32,
			music_id: 0,
			music_file: String::new(),
			layer: DEFAULT_LAYER.to_owned(),
			event_break: String::new(),
			event_warp: String::new(),
			event_anchor: String::new(),
			event_touch: String::new(),
			event_touch_policy: 0,
			meta: ElementMeta::default(),
		}
	}
}

impl MdxObject for WorldAreaRect {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<WorldAreaRect>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("F", SaveMode::AlwaysStore, access!(flags))
				.field("X", access!(x))
				.field("Y", access!(y))
				.non_negative("W", SaveMode::Normal, access!(w))
				.non_negative("H", SaveMode::Normal, access!(h))
				.field("MI", access!(music_id))
				.field("MF", access!(music_file))
				.field("LR", access!(layer))
				.field("EB", access!(event_break))
				.field("EW", access!(event_warp))
				.field("EA", access!(event_anchor))
				.field("ET", access!(event_touch))
				.field("TP", access!(event_touch_policy))
				.xtra(access!(meta.custom_params))
				.build()
		})
	}
}

/// Level entrance on the map.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorldLevelTile {
	/// Level image.
	pub id: u64,
	/// Left edge.
	pub x: i64,
	/// Top edge.
	pub y: i64,
	/// Target level file.
	pub level_file: String,
	/// Level title.
	pub title: String,
	/// Entrance warp; 0 starts from the level's start points.
	pub entrance_warp: u64,
	/// Exit code opening the top path; -1 for any.
	pub top_exit: i32,
	/// Exit code opening the left path.
	pub left_exit: i32,
	/// Exit code opening the right path.
	pub right_exit: i32,
	/// Exit code opening the bottom path.
	pub bottom_exit: i32,
	/// Map X to teleport to; -1 to stay.
	pub goto_x: i64,
	/// Map Y to teleport to; -1 to stay.
	pub goto_y: i64,
	/// Shown without an opened path.
	pub always_visible: bool,
	/// Player starts the episode here.
	pub game_start: bool,
	/// Draw path background.
	pub path_background: bool,
	/// Draw big path background.
	pub big_path_background: bool,
	/// Star counter display policy; -1 means episode default.
	pub stars_show_policy: i32,
	/// Bookkeeping.
	pub meta: ElementMeta,
}

impl Default for WorldLevelTile {
	fn default() -> Self {
		Self {
			id: 0,
			x: 0,
			y: 0,
			level_file: String::new(),
			title: String::new(),
			entrance_warp: 0,
			top_exit: -1,
			left_exit: -1,
			right_exit: -1,
			bottom_exit: -1,
			goto_x: -1,
			goto_y: -1,
			always_visible: false,
			game_start: false,
			path_background: false,
			big_path_background: false,
			stars_show_policy: -1,
			meta: ElementMeta::default(),
		}
	}
}

impl MdxObject for WorldLevelTile {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<WorldLevelTile>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("ID", SaveMode::AlwaysStore, access!(id))
				.field("X", access!(x))
				.field("Y", access!(y))
				.field("LF", access!(level_file))
				.field("LT", access!(title))
				.field("EI", access!(entrance_warp))
				.field("ET", access!(top_exit))
				.field("EL", access!(left_exit))
				.field("ER", access!(right_exit))
				.field("EB", access!(bottom_exit))
				.field("WX", access!(goto_x))
				.field("WY", access!(goto_y))
				.field("AV", access!(always_visible))
				.field("SP", access!(game_start))
				.field("BP", access!(path_background))
				.field("BG", access!(big_path_background))
				.field("SSS", access!(stars_show_policy))
				.xtra(access!(meta.custom_params))
				.build()
		})
	}
}

impl_element!(WorldTerrainTile, WorldScenery, WorldPathTile, WorldMusicBox, WorldAreaRect, WorldLevelTile);

/// Contents of a `.wldx` world map file.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WorldData {
	/// Episode settings.
	pub head: WorldHead,
	/// Editor bookmarks and crash state.
	pub meta_data: MetaData,
	/// Terrain tiles.
	pub tiles: Vec<WorldTerrainTile>,
	/// Scenery.
	pub scenery: Vec<WorldScenery>,
	/// Path tiles.
	pub paths: Vec<WorldPathTile>,
	/// Music boxes.
	pub music_boxes: Vec<WorldMusicBox>,
	/// Area rectangles.
	pub area_rects: Vec<WorldAreaRect>,
	/// Level entrances.
	pub levels: Vec<WorldLevelTile>,
	/// Load status.
	pub meta: FileFormatMeta,
	#[serde(skip)]
	pub(crate) tile_ids: NextId,
	#[serde(skip)]
	pub(crate) scenery_ids: NextId,
	#[serde(skip)]
	pub(crate) path_ids: NextId,
	#[serde(skip)]
	pub(crate) music_box_ids: NextId,
	#[serde(skip)]
	pub(crate) area_rect_ids: NextId,
	#[serde(skip)]
	pub(crate) level_ids: NextId,
}

impl FormatData for WorldData {
	fn format_meta(&self) -> &FileFormatMeta {
		&self.meta
	}

	fn format_meta_mut(&mut self) -> &mut FileFormatMeta {
		&mut self.meta
	}
}

impl CarriesMetaData for WorldData {
	fn meta_data(&self) -> &MetaData {
		&self.meta_data
	}

	fn meta_data_mut(&mut self) -> &mut MetaData {
		&mut self.meta_data
	}
}

crate::mdx_file_callbacks! {
	/// Load callbacks of a `.wldx` file.
	load WorldLoadCallbacks;
	/// Save callbacks of a `.wldx` file.
	save WorldSaveCallbacks;
	/// Episode settings.
	head: WorldHead = "HEAD", single;
	/// Crash recovery record.
	crash_data: CrashData = "META_SYS_CRASH", single;
	/// Editor bookmarks.
	bookmark: Bookmark = "META_BOOKMARKS";
	/// Terrain tiles.
	tile: WorldTerrainTile = "TILES";
	/// Scenery.
	scenery: WorldScenery = "SCENERY";
	/// Path tiles.
	path: WorldPathTile = "PATHS";
	/// Music boxes.
	music_box: WorldMusicBox = "MUSICBOXES";
	/// Area rectangles.
	area_rect: WorldAreaRect = "AREARECTS";
	/// Level entrances.
	level: WorldLevelTile = "LEVELS";
}

fn load_head(data: &mut WorldData, head: &mut WorldHead) -> Result<bool> {
	data.head = std::mem::take(head);
	data.meta.config_pack_id.clone_from(&data.head.config_pack_id);
	Ok(true)
}

fn load_head_only(data: &mut WorldData, head: &mut WorldHead) -> Result<bool> {
	load_head(data, head)?;
	Err(MdxError::Interrupt)
}

fn save_head(data: &WorldData, head: &mut WorldHead, index: usize) -> Result<bool> {
	if index != 0 {
		return Ok(false);
	}
	head.clone_from(&data.head);
	head.config_pack_id.clone_from(&data.meta.config_pack_id);
	if !head.no_character.iter().any(|&locked| locked) {
		head.no_character.clear();
	}
	Ok(true)
}

list_section!(load_tile, save_tile: WorldData, WorldTerrainTile => tiles, tile_ids);
list_section!(load_scenery, save_scenery: WorldData, WorldScenery => scenery, scenery_ids);
list_section!(load_path, save_path: WorldData, WorldPathTile => paths, path_ids);
list_section!(load_music_box, save_music_box: WorldData, WorldMusicBox => music_boxes, music_box_ids);
list_section!(load_area_rect, save_area_rect: WorldData, WorldAreaRect => area_rects, area_rect_ids);
list_section!(load_level, save_level: WorldData, WorldLevelTile => levels, level_ids);

/// Load a `.wldx` file through caller-supplied callbacks.
pub fn load_world_with<U>(input: &mut dyn TextInput, user: &mut U, callbacks: &WorldLoadCallbacks<U>) -> std::result::Result<(), FileError> {
	callbacks.load(input, user)
}

/// Save a `.wldx` file through caller-supplied callbacks.
pub fn save_world_with<U>(output: &mut dyn TextOutput, user: &U, callbacks: &WorldSaveCallbacks<U>) -> std::result::Result<(), FileError> {
	callbacks.save(output, user)
}

/// Callbacks filling a [`WorldData`].
pub fn world_load_callbacks() -> WorldLoadCallbacks<WorldData> {
	WorldLoadCallbacks {
		on_error: Some(record_error),
		head: Some(load_head),
		crash_data: Some(load_crash_data),
		bookmark: Some(load_bookmark),
		tile: Some(load_tile),
		scenery: Some(load_scenery),
		path: Some(load_path),
		music_box: Some(load_music_box),
		area_rect: Some(load_area_rect),
		level: Some(load_level),
	}
}

/// Callbacks reading only the `HEAD` section of a world file.
pub fn world_header_callbacks() -> WorldLoadCallbacks<WorldData> {
	WorldLoadCallbacks {
		on_error: Some(record_error),
		head: Some(load_head_only),
		..WorldLoadCallbacks::default()
	}
}

/// Callbacks writing a [`WorldData`].
pub fn world_save_callbacks() -> WorldSaveCallbacks<WorldData> {
	WorldSaveCallbacks {
		on_error: None,
		head: Some(save_head),
		crash_data: Some(save_crash_data),
		bookmark: Some(save_bookmark),
		tile: Some(save_tile),
		scenery: Some(save_scenery),
		path: Some(save_path),
		music_box: Some(save_music_box),
		area_rect: Some(save_area_rect),
		level: Some(save_level),
	}
}

/// Replace `data` with the contents of a `.wldx` file.
pub fn read_world(input: &mut dyn TextInput, data: &mut WorldData) -> std::result::Result<(), FileError> {
	*data = WorldData::default();
	data.meta.begin_read(input.file_path());
	load_world_with(input, data, &world_load_callbacks())
}

/// Replace `data` with the episode settings of a `.wldx` file, stopping after `HEAD`.
pub fn read_world_header(input: &mut dyn TextInput, data: &mut WorldData) -> std::result::Result<(), FileError> {
	*data = WorldData::default();
	data.meta.begin_read(input.file_path());
	load_world_with(input, data, &world_header_callbacks())
}

/// Write `data` as a `.wldx` file.
pub fn write_world(output: &mut dyn TextOutput, data: &WorldData) -> std::result::Result<(), FileError> {
	save_world_with(output, data, &world_save_callbacks())
}
