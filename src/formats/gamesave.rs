use std::sync::OnceLock;

use serde::Serialize;

use crate::formats::{FileFormatMeta, FormatData, list_section, record_error};
use crate::mdx::{Cursor, FileError, MdxError, MdxObject, MdxValue, ObjectSchema, Result, SaveMode, TextInput, TextOutput, access, escape_into};


/// Episode-wide counters stored in `SAVE_HEADER`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GamesaveHead {
	/// Remaining lives.
	pub lives: i32,
	/// Lives counter overflow.
	pub hundreds: i32,
	/// Collected coins.
	pub coins: u32,
	/// Score.
	pub points: u32,
	/// Stars in the whole episode.
	pub total_stars: u32,
	/// Player X on the world map.
	pub world_pos_x: i64,
	/// Player Y on the world map.
	pub world_pos_y: i64,
	/// Warp used to leave the hub level.
	pub last_hub_warp: u64,
	/// Hub level the player was last in.
	pub last_hub_level_file: String,
	/// World map music.
	pub music_id: u32,
	/// Custom world map music file.
	pub music_file: String,
	/// Episode finished at least once.
	pub game_completed: bool,
	/// Layers forced visible.
	pub saved_layers_visible: Vec<String>,
	/// Layers forced hidden.
	pub saved_layers_hidden: Vec<String>,
}

impl MdxObject for GamesaveHead {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<GamesaveHead>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field("LV", access!(lives))
				.field("HN", access!(hundreds))
				.field("CN", access!(coins))
				.field("PT", access!(points))
				.field("TS", access!(total_stars))
				.field("WX", access!(world_pos_x))
				.field("WY", access!(world_pos_y))
				.field("HW", access!(last_hub_warp))
				.field("HL", access!(last_hub_level_file))
				.field("MI", access!(music_id))
				.field("MF", access!(music_file))
				.field("GC", access!(game_completed))
				.field("SLV", access!(saved_layers_visible))
				.field("SLH", access!(saved_layers_hidden))
				.build()
		})
	}
}

/// Last state of one playable character.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CharacterState {
	/// Playable character.
	pub id: u64,
	/// Power-up state.
	pub state: u64,
	/// Reserve item.
	pub item_id: u64,
	/// Mount type.
	pub mount_type: u32,
	/// Mount variant.
	pub mount_id: u32,
	/// Hit points.
	pub health: u32,
}

impl Default for CharacterState {
	fn default() -> Self {
		Self {
			id: 1,
			state: 1,
			item_id: 0,
			mount_type: 0,
			mount_id: 0,
			health: 1,
		}
	}
}

impl MdxObject for CharacterState {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<CharacterState>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("ID", SaveMode::AlwaysStore, access!(id))
				.field("ST", access!(state))
				.field("IT", access!(item_id))
				.field("MT", access!(mount_type))
				.field("MI", access!(mount_id))
				.field("HL", access!(health))
				.build()
		})
	}
}

/// Character picked by one player.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PlayerState {
	/// Playable character.
	pub character_id: i32,
}

impl MdxObject for PlayerState {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<PlayerState>> = OnceLock::new();
		SCHEMA.get_or_init(|| ObjectSchema::builder().non_negative("ID", SaveMode::AlwaysStore, access!(character_id)).build())
	}
}

/// Visibility of one world map element.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct VisibleItem {
	/// Element array id.
	pub id: u32,
	/// Shown on the map.
	pub visible: bool,
}

impl MdxObject for VisibleItem {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<VisibleItem>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("ID", SaveMode::AlwaysStore, access!(id))
				.field("V", access!(visible))
				.build()
		})
	}
}

/// Star collected in a level.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StarOnLevel {
	/// Level file name.
	pub level_file: String,
	/// Section the star was in.
	pub section: i32,
}

impl MdxObject for StarOnLevel {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<StarOnLevel>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("L", SaveMode::AlwaysStore, access!(level_file))
				.field("S", access!(section))
				.build()
		})
	}
}

/// Per-level progress.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LevelInfo {
	/// Level file name.
	pub level_filename: String,
	/// Stars available in the level.
	pub max_stars: u32,
	/// Medals available in the level.
	pub max_medals: u32,
	/// Medals taken in any run.
	pub medals_got: Vec<bool>,
	/// Medals taken in the best run.
	pub medals_best: Vec<bool>,
	/// Exit codes already used.
	pub exits_got: Vec<i32>,
}

impl MdxObject for LevelInfo {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<LevelInfo>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("L", SaveMode::AlwaysStore, access!(level_filename))
				.field("S", access!(max_stars))
				.field("M", access!(max_medals))
				.field("MG", access!(medals_got))
				.field("MB", access!(medals_best))
				.field("E", access!(exits_got))
				.build()
		})
	}
}

/// One `key=value` pair of script user data.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DataEntry {
	/// Entry key.
	pub key: String,
	/// Entry value.
	pub value: String,
}

fn decode_entry_part(part: &str) -> Result<String> {
	let mut text = String::new();
	text.load(&mut Cursor::new(part.as_bytes()))?;
	Ok(text.replace("\\q", "="))
}

/// Stored as one string holding `"key"="value"`, with `=` inside either side
/// written as `\q`.
impl MdxValue for DataEntry {
	fn load(&mut self, cur: &mut Cursor<'_>) -> Result<()> {
		let mut packed = String::new();
		packed.load(cur)?;

		let mut parts = packed.split('=');
		let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
			return Err(MdxError::MissingDelimiter { expected: '=' });
		};
		self.key = decode_entry_part(key)?;
		self.value = decode_entry_part(value)?;
		Ok(())
	}

	fn save(&self, out: &mut String) -> bool {
		let mut packed = String::new();
		escape_into(&mut packed, &self.key.replace('=', "\\q"));
		packed.push('=');
		escape_into(&mut packed, &self.value.replace('=', "\\q"));
		escape_into(out, &packed);
		true
	}

	fn is_default(&self, reference: &Self) -> bool {
		self == reference
	}
}

/// Named block of script user data.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UserDataSection {
	/// Storage location, optionally tagged with [`Self::VOLATILE_FLAG`].
	pub location: i32,
	/// Section name.
	pub name: String,
	/// Location qualifier, such as a level file name.
	pub location_name: String,
	/// Stored entries.
	pub data: Vec<DataEntry>,
}

impl UserDataSection {
	/// World-wide data.
	pub const LOCATION_WORLD: i32 = 0;
	/// Per-level data.
	pub const LOCATION_LEVEL: i32 = 1;
	/// Data shared by every episode.
	pub const LOCATION_GLOBAL: i32 = 2;
	/// Bits holding the location kind.
	pub const LOCATION_MASK: i32 = 0xFFFF;
	/// Marks a section that is never written back.
	pub const VOLATILE_FLAG: i32 = 0x10000;

	/// Return true for sections dropped on save.
	pub fn is_volatile(&self) -> bool {
		self.location & Self::VOLATILE_FLAG != 0
	}
}

fn load_location(section: &mut UserDataSection, cur: &mut Cursor<'_>) -> Result<()> {
	section.location.load(cur)
}

fn save_location(out: &mut String, section: &UserDataSection) -> bool {
	if section.is_volatile() {
		return false;
	}
	(section.location & UserDataSection::LOCATION_MASK).save(out)
}

impl MdxObject for UserDataSection {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<UserDataSection>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.custom("L", load_location, Some(save_location))
				.field_with("SN", SaveMode::NotOnly, access!(name))
				.field_with("LN", SaveMode::NotOnly, access!(location_name))
				.field_with("D", SaveMode::NotOnly, access!(data))
				.build()
		})
	}
}

/// Contents of a `.savx` game-save file.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GamesaveData {
	/// Episode counters.
	pub head: GamesaveHead,
	/// Per-character state.
	pub characters: Vec<CharacterState>,
	/// Character picked by each player.
	pub current_character: Vec<u64>,
	/// World map level visibility.
	pub visible_levels: Vec<VisibleItem>,
	/// World map path visibility.
	pub visible_paths: Vec<VisibleItem>,
	/// World map scenery visibility.
	pub visible_scenery: Vec<VisibleItem>,
	/// Collected stars.
	pub gotten_stars: Vec<StarOnLevel>,
	/// Per-level progress.
	pub level_info: Vec<LevelInfo>,
	/// Script user data.
	pub user_data: Vec<UserDataSection>,
	/// Load status.
	pub meta: FileFormatMeta,
}

impl Default for GamesaveData {
	fn default() -> Self {
		Self {
			head: GamesaveHead {
				lives: 3,
				..GamesaveHead::default()
			},
			characters: Vec::new(),
			current_character: Vec::new(),
			visible_levels: Vec::new(),
			visible_paths: Vec::new(),
			visible_scenery: Vec::new(),
			gotten_stars: Vec::new(),
			level_info: Vec::new(),
			user_data: Vec::new(),
			meta: FileFormatMeta::default(),
		}
	}
}

impl FormatData for GamesaveData {
	fn format_meta(&self) -> &FileFormatMeta {
		&self.meta
	}

	fn format_meta_mut(&mut self) -> &mut FileFormatMeta {
		&mut self.meta
	}
}

crate::mdx_file_callbacks! {
	/// Load callbacks of a `.savx` file.
	load GamesaveLoadCallbacks;
	/// Save callbacks of a `.savx` file.
	save GamesaveSaveCallbacks;
	/// Episode counters.
	head: GamesaveHead = "SAVE_HEADER", single;
	/// Per-character state.
	character: CharacterState = "CHARACTERS";
	/// Character picked by each player.
	player: PlayerState = "CHARACTERS_PER_PLAYERS";
	/// World map level visibility.
	visible_level: VisibleItem = "VIZ_LEVELS";
	/// World map path visibility.
	visible_path: VisibleItem = "VIZ_PATHS";
	/// World map scenery visibility.
	visible_scenery: VisibleItem = "VIZ_SCENERY";
	/// Collected stars.
	star: StarOnLevel = "STARS";
	/// Per-level progress.
	level_info: LevelInfo = "LEVEL_INFO";
	/// Script user data.
	user_data: UserDataSection = "USERDATA";
}

fn load_head(data: &mut GamesaveData, head: &mut GamesaveHead) -> Result<bool> {
	data.head = std::mem::take(head);
	Ok(true)
}

fn save_head(data: &GamesaveData, head: &mut GamesaveHead, index: usize) -> Result<bool> {
	if index != 0 {
		return Ok(false);
	}
	head.clone_from(&data.head);
	Ok(true)
}

fn load_player(data: &mut GamesaveData, player: &mut PlayerState) -> Result<bool> {
	let id = u64::try_from(player.character_id).map_err(|_| MdxError::callback("negative character id"))?;
	data.current_character.push(id);
	Ok(true)
}

fn save_player(data: &GamesaveData, player: &mut PlayerState, index: usize) -> Result<bool> {
	let Some(&id) = data.current_character.get(index) else {
		return Ok(false);
	};
	player.character_id = i32::try_from(id).map_err(|_| MdxError::callback("character id out of range"))?;
	Ok(true)
}

list_section!(load_character, save_character: GamesaveData, CharacterState => characters);
list_section!(load_visible_level, save_visible_level: GamesaveData, VisibleItem => visible_levels);
list_section!(load_visible_path, save_visible_path: GamesaveData, VisibleItem => visible_paths);
list_section!(load_visible_scenery, save_visible_scenery: GamesaveData, VisibleItem => visible_scenery);
list_section!(load_star, save_star: GamesaveData, StarOnLevel => gotten_stars);
list_section!(load_level_info, save_level_info: GamesaveData, LevelInfo => level_info);
list_section!(load_user_data, save_user_data: GamesaveData, UserDataSection => user_data);

/// Load a `.savx` file through caller-supplied callbacks.
pub fn load_gamesave_with<U>(input: &mut dyn TextInput, user: &mut U, callbacks: &GamesaveLoadCallbacks<U>) -> std::result::Result<(), FileError> {
	callbacks.load(input, user)
}

/// Save a `.savx` file through caller-supplied callbacks.
pub fn save_gamesave_with<U>(output: &mut dyn TextOutput, user: &U, callbacks: &GamesaveSaveCallbacks<U>) -> std::result::Result<(), FileError> {
	callbacks.save(output, user)
}

/// Callbacks filling a [`GamesaveData`].
pub fn gamesave_load_callbacks() -> GamesaveLoadCallbacks<GamesaveData> {
	GamesaveLoadCallbacks {
		on_error: Some(record_error),
		head: Some(load_head),
		character: Some(load_character),
		player: Some(load_player),
		visible_level: Some(load_visible_level),
		visible_path: Some(load_visible_path),
		visible_scenery: Some(load_visible_scenery),
		star: Some(load_star),
		level_info: Some(load_level_info),
		user_data: Some(load_user_data),
	}
}

/// Callbacks writing a [`GamesaveData`].
pub fn gamesave_save_callbacks() -> GamesaveSaveCallbacks<GamesaveData> {
	GamesaveSaveCallbacks {
		on_error: None,
		head: Some(save_head),
		character: Some(save_character),
		player: Some(save_player),
		visible_level: Some(save_visible_level),
		visible_path: Some(save_visible_path),
		visible_scenery: Some(save_visible_scenery),
		star: Some(save_star),
		level_info: Some(save_level_info),
		user_data: Some(save_user_data),
	}
}

/// Replace `data` with the contents of a `.savx` file.
///
/// A file without `SAVE_HEADER` keeps the fresh three lives.
pub fn read_gamesave(input: &mut dyn TextInput, data: &mut GamesaveData) -> std::result::Result<(), FileError> {
	*data = GamesaveData::default();
	data.meta.begin_read(input.file_path());
	load_gamesave_with(input, data, &gamesave_load_callbacks())
}

/// Write `data` as a `.savx` file.
pub fn write_gamesave(output: &mut dyn TextOutput, data: &GamesaveData) -> std::result::Result<(), FileError> {
	save_gamesave_with(output, data, &gamesave_save_callbacks())
}
