use serde::Serialize;

use crate::formats::{
	FileFormatMeta, FileKind, FormatData, GamesaveData, LevelData, MetaData, WorldData, read_gamesave, read_level, read_level_header, read_meta, read_world,
	read_world_header, write_gamesave, write_level, write_meta, write_world,
};
use crate::mdx::{FileError, TextInput, TextOutput};

/// Options for [`Document::read`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
	/// Stop after the `HEAD` section; ignored by kinds without one.
	pub header_only: bool,
}

/// A loaded file of any supported kind.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Document {
	/// Level file.
	Level(LevelData),
	/// World map file.
	World(WorldData),
	/// Game save file.
	Gamesave(GamesaveData),
	/// Editor meta file.
	Meta(MetaData),
}

impl Document {
	/// Read `input` as a file of `kind`.
	pub fn read(kind: FileKind, input: &mut dyn TextInput, options: &LoadOptions) -> Result<Self, FileError> {
		match kind {
			FileKind::Level => {
				let mut data = LevelData::default();
				if options.header_only {
					read_level_header(input, &mut data)?;
				} else {
					read_level(input, &mut data)?;
				}
				Ok(Self::Level(data))
			}
			FileKind::World => {
				let mut data = WorldData::default();
				if options.header_only {
					read_world_header(input, &mut data)?;
				} else {
					read_world(input, &mut data)?;
				}
				Ok(Self::World(data))
			}
			FileKind::Gamesave => {
				let mut data = GamesaveData::default();
				read_gamesave(input, &mut data)?;
				Ok(Self::Gamesave(data))
			}
			FileKind::Meta => {
				let mut data = MetaData::default();
				read_meta(input, &mut data)?;
				Ok(Self::Meta(data))
			}
		}
	}

	/// Write the document in its own format.
	pub fn write(&self, output: &mut dyn TextOutput) -> Result<(), FileError> {
		match self {
			Self::Level(data) => write_level(output, data),
			Self::World(data) => write_world(output, data),
			Self::Gamesave(data) => write_gamesave(output, data),
			Self::Meta(data) => write_meta(output, data),
		}
	}

	/// Return the file kind.
	pub fn kind(&self) -> FileKind {
		match self {
			Self::Level(_) => FileKind::Level,
			Self::World(_) => FileKind::World,
			Self::Gamesave(_) => FileKind::Gamesave,
			Self::Meta(_) => FileKind::Meta,
		}
	}

	/// Borrow the load status.
	pub fn format_meta(&self) -> &FileFormatMeta {
		match self {
			Self::Level(data) => data.format_meta(),
			Self::World(data) => data.format_meta(),
			Self::Gamesave(data) => data.format_meta(),
			Self::Meta(data) => data.format_meta(),
		}
	}

	/// Return the level or episode title.
	pub fn title(&self) -> Option<&str> {
		match self {
			Self::Level(data) => Some(data.head.name.as_str()),
			Self::World(data) => Some(data.head.title.as_str()),
			Self::Gamesave(_) | Self::Meta(_) => None,
		}
	}

	/// Return `(section name, record count)` pairs describing the contents.
	pub fn section_counts(&self) -> Vec<(&'static str, usize)> {
		match self {
			Self::Level(data) => vec![
				("SECTION", data.sections.len()),
				("STARTPOINT", data.players.len()),
				("BLOCK", data.blocks.len()),
				("BGO", data.bgo.len()),
				("NPC", data.npc.len()),
				("PHYSICS", data.physics.len()),
				("DOORS", data.doors.len()),
				("LAYERS", data.layers.len()),
				("EVENTS_CLASSIC", data.events.len()),
				("VARIABLES", data.variables.len()),
				("ARRAYS", data.arrays.len()),
				("SCRIPTS", data.scripts.len()),
				("CUSTOM_ITEMS_38A", data.custom_items.len()),
				("META_BOOKMARKS", data.meta_data.bookmarks.len()),
			],
			Self::World(data) => vec![
				("TILES", data.tiles.len()),
				("SCENERY", data.scenery.len()),
				("PATHS", data.paths.len()),
				("MUSICBOXES", data.music_boxes.len()),
				("AREARECTS", data.area_rects.len()),
				("LEVELS", data.levels.len()),
				("META_BOOKMARKS", data.meta_data.bookmarks.len()),
			],
			Self::Gamesave(data) => vec![
				("CHARACTERS", data.characters.len()),
				("CHARACTERS_PER_PLAYERS", data.current_character.len()),
				("VIZ_LEVELS", data.visible_levels.len()),
				("VIZ_PATHS", data.visible_paths.len()),
				("VIZ_SCENERY", data.visible_scenery.len()),
				("STARS", data.gotten_stars.len()),
				("LEVEL_INFO", data.level_info.len()),
				("USERDATA", data.user_data.len()),
			],
			Self::Meta(data) => vec![("META_BOOKMARKS", data.bookmarks.len())],
		}
	}
}
