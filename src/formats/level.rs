use std::sync::OnceLock;

use serde::Serialize;

use crate::formats::meta::{CarriesMetaData, load_bookmark, load_crash_data, save_bookmark, save_crash_data};
use crate::formats::{
	Bookmark, CrashData, DEFAULT_LAYER, Element, ElementMeta, FileFormatMeta, FormatData, MetaData, NextId, copy_nth, impl_element, list_section,
	record_error,
};
use crate::mdx::{FileError, MdxError, MdxObject, ObjectSchema, Result, SaveMode, TextInput, TextOutput, access};

mod custom_items;
mod events;

#[cfg(test)]
mod tests;

pub use events::{
	AutoscrollStop, EventControls, EventMoveLayer, EventSectionSettings, EventSpawnEffect, EventSpawnNpc, EventTimer, EventUpdateVariable, LevelEvent,
};
pub use custom_items::{CustomItemEntry, CustomItemKind, LevelItemSetup38A};
use events::{DEFAULT_SECTION_COUNT, MAX_SECTION_ID, pad_section_settings};

/// Level-wide settings stored in `HEAD`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LevelHead {
	/// Level title.
	pub name: String,
	/// Stars available in the level.
	pub stars: i32,
	/// Level opened when the player fails.
	pub open_level_on_fail: String,
	/// Entrance warp of `open_level_on_fail`.
	pub open_level_on_fail_warp_id: u32,
	/// Replacement player names.
	pub player_names_overrides: Vec<String>,
	/// Free-form custom properties (`XTRA`).
	pub custom_params: String,
	/// Config pack identifier.
	pub config_pack_id: String,
	/// External music files referenced by sections.
	pub music_files: Vec<String>,
}

impl MdxObject for LevelHead {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<LevelHead>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field("TL", access!(name))
				.non_negative("SZ", SaveMode::Normal, access!(stars))
				.field("DL", access!(open_level_on_fail))
				.field("DE", access!(open_level_on_fail_warp_id))
				.field("NO", access!(player_names_overrides))
				.xtra(access!(custom_params))
				.field("CPID", access!(config_pack_id))
				.field("MUS", access!(music_files))
				.build()
		})
	}
}

/// Playable area with its own bounds, music and background.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LevelSection {
	/// Section index.
	pub id: i32,
	/// Left bound.
	pub size_left: i64,
	/// Right bound.
	pub size_right: i64,
	/// Top bound.
	pub size_top: i64,
	/// Bottom bound.
	pub size_bottom: i64,
	/// Editor camera X, derived from the left bound on load; not stored in the file.
	pub position_x: i64,
	/// Editor camera Y, derived from the top bound on load; not stored in the file.
	pub position_y: i64,
	/// Built-in music.
	pub music_id: u32,
	/// External music file.
	pub music_file: String,
	/// Built-in background.
	pub background: u32,
	/// Lighting value.
	pub lighting_value: f64,
	/// External music entry of the level music list.
	pub music_file_idx: i64,
	/// Wrap horizontally.
	pub wrap_h: bool,
	/// Wrap vertically.
	pub wrap_v: bool,
	/// Leaving the screen exits the level.
	pub off_screen_exit: bool,
	/// Scroll right only.
	pub lock_left_scroll: bool,
	/// Scroll left only.
	pub lock_right_scroll: bool,
	/// Scroll down only.
	pub lock_up_scroll: bool,
	/// Scroll up only.
	pub lock_down_scroll: bool,
	/// Whole section is underwater.
	pub underwater: bool,
	/// Free-form custom properties (`XTRA`).
	pub custom_params: String,
}

impl LevelSection {
	/// Empty section with index `id`.
	pub fn with_id(id: usize) -> Self {
		Self {
			id: i32::try_from(id).unwrap_or(i32::MAX),
			..Self::default()
		}
	}
}

impl MdxObject for LevelSection {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<LevelSection>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.non_negative("SC", SaveMode::NotOnly, access!(id))
				.field("L", access!(size_left))
				.field("R", access!(size_right))
				.field("T", access!(size_top))
				.field("B", access!(size_bottom))
				.field("MZ", access!(music_id))
				.field("MF", access!(music_file))
				.field("BG", access!(background))
				.field("LT", access!(lighting_value))
				.field("ME", access!(music_file_idx))
				.field("CS", access!(wrap_h))
				.field("CSV", access!(wrap_v))
				.field("OE", access!(off_screen_exit))
				.field("SR", access!(lock_left_scroll))
				.field("SL", access!(lock_right_scroll))
				.field("SD", access!(lock_up_scroll))
				.field("SU", access!(lock_down_scroll))
				.field("UW", access!(underwater))
				.xtra(access!(custom_params))
				.build()
		})
	}
}

/// Player start point.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PlayerPoint {
	/// Player number.
	pub id: u32,
	/// Left edge.
	pub x: i64,
	/// Top edge.
	pub y: i64,
	/// Hitbox width; not stored in the file.
	pub w: i64,
	/// Hitbox height; not stored in the file.
	pub h: i64,
	/// Facing direction.
	pub direction: i32,
}

impl PlayerPoint {
	/// Start point for player `id` with its default hitbox.
	pub fn new(id: u32) -> Self {
		let h = match id {
			1 => 54,
			2 => 60,
			_ => 32,
		};
		Self {
			id,
			w: 24,
			h,
			..Self::default()
		}
	}
}

impl MdxObject for PlayerPoint {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<PlayerPoint>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("ID", SaveMode::AlwaysStore, access!(id))
				.field("X", access!(x))
				.field("Y", access!(y))
				.field("D", access!(direction))
				.build()
		})
	}
}

/// Placed block.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LevelBlock {
	/// Block type.
	pub id: u64,
	/// Left edge.
	pub x: i64,
	/// Top edge.
	pub y: i64,
	/// Width.
	pub w: i64,
	/// Height.
	pub h: i64,
	/// Contained coins (negative) or NPC.
	pub npc_id: i64,
	/// Invisible until hit.
	pub invisible: bool,
	/// Slippery surface.
	pub slippery: bool,
	/// Owning layer.
	pub layer: String,
	/// Event on destroy.
	pub event_destroy: String,
	/// Event on hit.
	pub event_hit: String,
	/// Event when the layer becomes empty.
	pub event_empty_layer: String,
	/// Special value 1.
	pub special_data: i64,
	/// Special value 2.
	pub special_data2: i64,
	/// Scale graphics to the block size.
	pub autoscale: bool,
	/// Graphics override name.
	pub gfx_name: String,
	/// Graphics extension X.
	pub gfx_dx: i64,
	/// Graphics extension Y.
	pub gfx_dy: i64,
	/// Special value of the contained NPC.
	pub npc_special_value: i64,
	/// Motion AI type.
	pub motion_ai_id: i64,
	/// Bookkeeping.
	pub meta: ElementMeta,
}

impl Default for LevelBlock {
	fn default() -> Self {
		Self {
			id: 0,
			x: 0,
			y: 0,
			w: 0,
			h: 0,
			npc_id: 0,
			invisible: false,
			slippery: false,
			layer: DEFAULT_LAYER.to_owned(),
			event_destroy: String::new(),
			event_hit: String::new(),
			event_empty_layer: String::new(),
			special_data: 0,
			special_data2: 0,
			autoscale: false,
			gfx_name: String::new(),
			gfx_dx: 0,
			gfx_dy: 0,
			npc_special_value: 0,
			motion_ai_id: 0,
			meta: ElementMeta::default(),
		}
	}
}

impl MdxObject for LevelBlock {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<LevelBlock>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("ID", SaveMode::AlwaysStore, access!(id))
				.field("X", access!(x))
				.field("Y", access!(y))
				.non_negative("W", SaveMode::Normal, access!(w))
				.non_negative("H", SaveMode::Normal, access!(h))
				.field("CN", access!(npc_id))
				.field("IV", access!(invisible))
				.field("SL", access!(slippery))
				.field("LR", access!(layer))
				.field("ED", access!(event_destroy))
				.field("EH", access!(event_hit))
				.field("EE", access!(event_empty_layer))
				.field("S1", access!(special_data))
				.field("S2", access!(special_data2))
				.field("AS", access!(autoscale))
				.field("GXN", access!(gfx_name))
				.field("GXX", access!(gfx_dx))
				.field("GXY", access!(gfx_dy))
				.field("CS", access!(npc_special_value))
				.field("MA", access!(motion_ai_id))
				.xtra(access!(meta.custom_params))
				.build()
		})
	}
}

/// Placed background object.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LevelBgo {
	/// Background object type.
	pub id: u64,
	/// Left edge.
	pub x: i64,
	/// Top edge.
	pub y: i64,
	/// Z offset within the layer.
	pub z_offset: f64,
	/// Z layer.
	pub z_mode: i32,
	/// Legacy sorting priority; -1 means unset.
	pub smbx64_sp: i64,
	/// Owning layer.
	pub layer: String,
	/// Graphics extension X.
	pub gfx_dx: i64,
	/// Graphics extension Y.
	pub gfx_dy: i64,
	/// Bookkeeping.
	pub meta: ElementMeta,
}

impl Default for LevelBgo {
	fn default() -> Self {
		Self {
			id: 0,
			x: 0,
			y: 0,
			z_offset: 0.0,
			z_mode: 0,
			smbx64_sp: -1,
			layer: DEFAULT_LAYER.to_owned(),
			gfx_dx: 0,
			gfx_dy: 0,
			meta: ElementMeta::default(),
		}
	}
}

impl MdxObject for LevelBgo {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<LevelBgo>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("ID", SaveMode::AlwaysStore, access!(id))
				.field("X", access!(x))
				.field("Y", access!(y))
				.field("ZO", access!(z_offset))
				.field("ZP", access!(z_mode))
				.field("SP", access!(smbx64_sp))
				.field("LR", access!(layer))
				.field("GXX", access!(gfx_dx))
				.field("GXY", access!(gfx_dy))
				.xtra(access!(meta.custom_params))
				.build()
		})
	}
}

/// Placed NPC.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LevelNpc {
	/// NPC type.
	pub id: u64,
	/// Left edge.
	pub x: i64,
	/// Top edge.
	pub y: i64,
	/// Facing direction.
	pub direction: i32,
	/// Contents of a container NPC.
	pub contents: i64,
	/// Special value 1.
	pub special_data: i64,
	/// Special value 2.
	pub special_data2: i64,
	/// Acts as a generator.
	pub generator: bool,
	/// Generator kind.
	pub generator_type: i32,
	/// Generator direction.
	pub generator_direction: i32,
	/// Generator period.
	pub generator_period: i32,
	/// Talk message.
	pub message: String,
	/// Harmless to the player.
	pub friendly: bool,
	/// Stands still.
	pub no_move: bool,
	/// Boss mode.
	pub is_boss: bool,
	/// Owning layer.
	pub layer: String,
	/// Layer attached to this NPC.
	pub attach_layer: String,
	/// Event on activation.
	pub event_activate: String,
	/// Event on death.
	pub event_die: String,
	/// Event on talk.
	pub event_talk: String,
	/// Event when the layer becomes empty.
	pub event_empty_layer: String,
	/// Event on grab.
	pub event_grab: String,
	/// Event on touch.
	pub event_touch: String,
	/// Event every frame.
	pub event_next_frame: String,
	/// Variable receiving this NPC's id.
	pub send_id_to_variable: String,
	/// Graphics override name.
	pub gfx_name: String,
	/// Graphics extension X.
	pub gfx_dx: i64,
	/// Graphics extension Y.
	pub gfx_dy: i64,
	/// Width override.
	pub override_width: i64,
	/// Height override.
	pub override_height: i64,
	/// Scale graphics to the overridden size.
	pub gfx_autoscale: bool,
	/// Wings type.
	pub wings_type: i32,
	/// Wings style.
	pub wings_style: i32,
	/// Generator custom angle.
	pub generator_custom_angle: f64,
	/// Generator branch count.
	pub generator_branches: i32,
	/// Generator angle range.
	pub generator_angle_range: f64,
	/// Generator initial speed.
	pub generator_initial_speed: f64,
	/// Bookkeeping.
	pub meta: ElementMeta,
}

impl Default for LevelNpc {
	fn default() -> Self {
		Self {
			id: 0,
			x: 0,
			y: 0,
			direction: 0,
			contents: 0,
			special_data: 0,
			special_data2: 0,
			generator: false,
			generator_type: 0,
			generator_direction: 0,
			generator_period: 0,
			message: String::new(),
			friendly: false,
			no_move: false,
			is_boss: false,
			layer: DEFAULT_LAYER.to_owned(),
			attach_layer: String::new(),
			event_activate: String::new(),
			event_die: String::new(),
			event_talk: String::new(),
			event_empty_layer: String::new(),
			event_grab: String::new(),
			event_touch: String::new(),
			event_next_frame: String::new(),
			send_id_to_variable: String::new(),
			gfx_name: String::new(),
			gfx_dx: 0,
			gfx_dy: 0,
			override_width: 0,
			override_height: 0,
			gfx_autoscale: false,
			wings_type: 0,
			wings_style: 0,
			generator_custom_angle: 0.0,
			generator_branches: 0,
			generator_angle_range: 0.0,
			generator_initial_speed: 0.0,
			meta: ElementMeta::default(),
		}
	}
}

impl MdxObject for LevelNpc {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<LevelNpc>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("ID", SaveMode::AlwaysStore, access!(id))
				.field("X", access!(x))
				.field("Y", access!(y))
				.field("D", access!(direction))
				.field("CN", access!(contents))
				.field("S1", access!(special_data))
				.field("S2", access!(special_data2))
				.field("GE", access!(generator))
				.field("GT", access!(generator_type))
				.field("GD", access!(generator_direction))
				.non_negative("GM", SaveMode::Normal, access!(generator_period))
				.field("MG", access!(message))
				.field("FD", access!(friendly))
				.field("NM", access!(no_move))
				.field("BS", access!(is_boss))
				.field("LR", access!(layer))
				.field("LA", access!(attach_layer))
				.field("EA", access!(event_activate))
				.field("ED", access!(event_die))
				.field("ET", access!(event_talk))
				.field("EE", access!(event_empty_layer))
				.field("EG", access!(event_grab))
				.field("EO", access!(event_touch))
				.field("EF", access!(event_next_frame))
				.field("SV", access!(send_id_to_variable))
				.field("GXN", access!(gfx_name))
				.field("GXX", access!(gfx_dx))
				.field("GXY", access!(gfx_dy))
				.field("OW", access!(override_width))
				.field("OH", access!(override_height))
				.field("GAS", access!(gfx_autoscale))
				.field("WGT", access!(wings_type))
				.field("WGS", access!(wings_style))
				.field("GA", access!(generator_custom_angle))
				.non_negative("GB", SaveMode::Normal, access!(generator_branches))
				.field("GR", access!(generator_angle_range))
				.field("GS", access!(generator_initial_speed))
				.xtra(access!(meta.custom_params))
				.build()
		})
	}
}

/// Physical environment zone such as water or quicksand.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LevelPhysEnv {
	/// Environment type.
	pub env_type: i32,
	/// Left edge.
	pub x: i64,
	/// Top edge.
	pub y: i64,
	/// Width.
	pub w: i64,
	/// Height.
	pub h: i64,
	/// Owning layer.
	pub layer: String,
	/// Surface friction.
	pub friction: f64,
	/// Custom acceleration direction.
	pub accel_direction: f64,
	/// Custom acceleration.
	pub accel: f64,
	/// Maximum velocity.
	pub max_velocity: f64,
	/// Event on touch.
	pub touch_event: String,
	/// Bookkeeping.
	pub meta: ElementMeta,
}

impl Default for LevelPhysEnv {
	fn default() -> Self {
		Self {
			env_type: 0,
			x: 0,
			y: 0,
			w: 0,
			h: 0,
			layer: DEFAULT_LAYER.to_owned(),
			friction: 0.0,
			accel_direction: 0.0,
			accel: 0.0,
			max_velocity: 0.0,
			touch_event: String::new(),
			meta: ElementMeta::default(),
		}
	}
}

impl MdxObject for LevelPhysEnv {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<LevelPhysEnv>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.non_negative("ET", SaveMode::Normal, access!(env_type))
				.field_with("X", SaveMode::AlwaysStore, access!(x))
				.field("Y", access!(y))
				.non_negative("W", SaveMode::Normal, access!(w))
				.non_negative("H", SaveMode::Normal, access!(h))
				.field("LR", access!(layer))
				.field("FR", access!(friction))
				.field("AD", access!(accel_direction))
				.field("AC", access!(accel))
				.field("MV", access!(max_velocity))
				.field("EO", access!(touch_event))
				.xtra(access!(meta.custom_params))
				.build()
		})
	}
}

/// Warp between two points, levels or the world map.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LevelDoor {
	/// Entrance X.
	pub ix: i64,
	/// Entrance Y.
	pub iy: i64,
	/// Exit X.
	pub ox: i64,
	/// Exit Y.
	pub oy: i64,
	/// Entrance length.
	pub length_i: i64,
	/// Exit length.
	pub length_o: i64,
	/// Warp type.
	pub warp_type: i32,
	/// Entrance direction.
	pub input_direction: i32,
	/// Exit direction.
	pub output_direction: i32,
	/// Target world map X; -1 for none.
	pub world_x: i64,
	/// Target world map Y; -1 for none.
	pub world_y: i64,
	/// Target level file.
	pub level_file: String,
	/// Entrance warp in the target level.
	pub warp_to: i64,
	/// Entrance of the level from another level.
	pub lvl_i: bool,
	/// Exit to another level or the map.
	pub lvl_o: bool,
	/// Stars required.
	pub stars: i32,
	/// Message shown when stars are missing.
	pub stars_msg: String,
	/// Vehicles are not allowed.
	pub no_vehicles: bool,
	/// Hide the star count.
	pub star_num_hide: bool,
	/// Carried items may pass.
	pub allow_npc: bool,
	/// Needs a key.
	pub locked: bool,
	/// Needs a bomb.
	pub need_a_bomb: bool,
	/// Skip the entering scene.
	pub hide_entering_scene: bool,
	/// Carried items may pass between levels.
	pub allow_npc_interlevel: bool,
	/// Requires a special state.
	pub special_state_required: bool,
	/// Requires standing.
	pub stood_state_required: bool,
	/// Transition effect.
	pub transition_effect: i32,
	/// Exit shoots the player out.
	pub cannon_exit: bool,
	/// Cannon exit speed.
	pub cannon_exit_speed: f64,
	/// Owning layer.
	pub layer: String,
	/// Event on enter.
	pub event_enter: String,
	/// Usable in both directions.
	pub two_way: bool,
	/// Entrance point is placed; derived on load.
	pub is_set_in: bool,
	/// Exit point is placed; derived on load.
	pub is_set_out: bool,
	/// Bookkeeping.
	pub meta: ElementMeta,
}

impl Default for LevelDoor {
	fn default() -> Self {
		Self {
			ix: 0,
			iy: 0,
			ox: 0,
			oy: 0,
			length_i: 0,
			length_o: 0,
			warp_type: 0,
			input_direction: 0,
			output_direction: 0,
			world_x: -1,
			world_y: -1,
			level_file: String::new(),
			warp_to: 0,
			lvl_i: false,
			lvl_o: false,
			stars: 0,
			stars_msg: String::new(),
			no_vehicles: false,
			star_num_hide: false,
			allow_npc: false,
			locked: false,
			need_a_bomb: false,
			hide_entering_scene: false,
			allow_npc_interlevel: false,
			special_state_required: false,
			stood_state_required: false,
			transition_effect: 0,
			cannon_exit: false,
			cannon_exit_speed: 0.0,
			layer: DEFAULT_LAYER.to_owned(),
			event_enter: String::new(),
			two_way: false,
			is_set_in: false,
			is_set_out: false,
			meta: ElementMeta::default(),
		}
	}
}

impl LevelDoor {
	/// Derive which ends are placed and copy the placed end over a missing one.
	pub fn resolve_ends(&mut self) {
		self.is_set_in = !self.lvl_i;
		self.is_set_out = !self.lvl_o || self.lvl_i;

		if !self.is_set_in && self.is_set_out {
			self.ix = self.ox;
			self.iy = self.oy;
		}
		if !self.is_set_out && self.is_set_in {
			self.ox = self.ix;
			self.oy = self.iy;
		}
	}
}

impl MdxObject for LevelDoor {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<LevelDoor>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("IX", SaveMode::AlwaysStore, access!(ix))
				.field("IY", access!(iy))
				.field("OX", access!(ox))
				.field("OY", access!(oy))
				.field("IL", access!(length_i))
				.field("OL", access!(length_o))
				.non_negative("DT", SaveMode::Normal, access!(warp_type))
				.non_negative("ID", SaveMode::Normal, access!(input_direction))
				.non_negative("OD", SaveMode::Normal, access!(output_direction))
				.field("WX", access!(world_x))
				.field("WY", access!(world_y))
				.field("LF", access!(level_file))
				.non_negative("LI", SaveMode::Normal, access!(warp_to))
				.field("ET", access!(lvl_i))
				.field("EX", access!(lvl_o))
				.non_negative("SL", SaveMode::Normal, access!(stars))
				.field("SM", access!(stars_msg))
				.field("NV", access!(no_vehicles))
				.field("SH", access!(star_num_hide))
				.field("AI", access!(allow_npc))
				.field("LC", access!(locked))
				.field("LB", access!(need_a_bomb))
				.field("HS", access!(hide_entering_scene))
				.field("AL", access!(allow_npc_interlevel))
				.field("SR", access!(special_state_required))
				.field("STR", access!(stood_state_required))
				.field("TE", access!(transition_effect))
				.field("PT", access!(cannon_exit))
				.field("PS", access!(cannon_exit_speed))
				.field("LR", access!(layer))
				.field("EE", access!(event_enter))
				.field("TW", access!(two_way))
				.xtra(access!(meta.custom_params))
				.build()
		})
	}
}

/// Named group of elements that can be shown, hidden or moved together.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LevelLayer {
	/// Layer name, unique within the level.
	pub name: String,
	/// Hidden on level start.
	pub hidden: bool,
	/// Locked in the editor.
	pub locked: bool,
	/// Bookkeeping.
	pub meta: ElementMeta,
}

impl LevelLayer {
	fn system(name: &str, hidden: bool, array_id: u32) -> Self {
		Self {
			name: name.to_owned(),
			hidden,
			locked: false,
			meta: ElementMeta {
				array_id,
				..ElementMeta::default()
			},
		}
	}
}

impl MdxObject for LevelLayer {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<LevelLayer>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("LR", SaveMode::AlwaysStore, access!(name))
				.field("HD", access!(hidden))
				.field("LC", access!(locked))
				.build()
		})
	}
}

/// Script variable.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LevelVariable {
	/// Variable name.
	pub name: String,
	/// Initial value.
	pub value: String,
	/// Shared across levels.
	pub is_global: bool,
}

impl MdxObject for LevelVariable {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<LevelVariable>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("N", SaveMode::AlwaysStore, access!(name))
				.field("V", access!(value))
				.field("G", access!(is_global))
				.build()
		})
	}
}

/// Script array.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LevelArray {
	/// Array name.
	pub name: String,
}

impl MdxObject for LevelArray {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<LevelArray>> = OnceLock::new();
		SCHEMA.get_or_init(|| ObjectSchema::builder().field_with("N", SaveMode::AlwaysStore, access!(name)).build())
	}
}

/// Embedded script.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LevelScript {
	/// Script name.
	pub name: String,
	/// Script language.
	pub language: i32,
	/// Script source.
	pub script: String,
}

impl MdxObject for LevelScript {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<LevelScript>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("N", SaveMode::AlwaysStore, access!(name))
				.field("L", access!(language))
				.field("S", access!(script))
				.build()
		})
	}
}

impl_element!(LevelBlock, LevelBgo, LevelNpc, LevelPhysEnv, LevelDoor, LevelLayer);

/// Contents of a `.lvlx` level file.
///
/// [`Default`] yields a fresh level: 21 empty sections, the `Default`,
/// `Destroyed Blocks` and `Spawned NPCs` layers, and the `Level - Start`,
/// `P Switch - Start` and `P Switch - End` events.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LevelData {
	/// Level-wide settings.
	pub head: LevelHead,
	/// Editor bookmarks and crash state.
	pub meta_data: MetaData,
	/// Sections, indexed by id.
	pub sections: Vec<LevelSection>,
	/// Player start points.
	pub players: Vec<PlayerPoint>,
	/// Blocks.
	pub blocks: Vec<LevelBlock>,
	/// Background objects.
	pub bgo: Vec<LevelBgo>,
	/// NPCs.
	pub npc: Vec<LevelNpc>,
	/// Warps.
	pub doors: Vec<LevelDoor>,
	/// Physical environment zones.
	pub physics: Vec<LevelPhysEnv>,
	/// Layers.
	pub layers: Vec<LevelLayer>,
	/// Events.
	pub events: Vec<LevelEvent>,
	/// Script variables.
	pub variables: Vec<LevelVariable>,
	/// Script arrays.
	pub arrays: Vec<LevelArray>,
	/// Embedded scripts.
	pub scripts: Vec<LevelScript>,
	/// SMBX-38A per-item property overrides.
	pub custom_items: Vec<LevelItemSetup38A>,
	/// Load status.
	pub meta: FileFormatMeta,
	#[serde(skip)]
	pub(crate) block_ids: NextId,
	#[serde(skip)]
	pub(crate) bgo_ids: NextId,
	#[serde(skip)]
	pub(crate) npc_ids: NextId,
	#[serde(skip)]
	pub(crate) door_ids: NextId,
	#[serde(skip)]
	pub(crate) physics_ids: NextId,
	#[serde(skip)]
	pub(crate) layer_ids: NextId,
	#[serde(skip)]
	pub(crate) event_ids: NextId,
}

impl Default for LevelData {
	fn default() -> Self {
		let mut layer_ids = NextId::default();
		let layers = vec![
			LevelLayer::system(DEFAULT_LAYER, false, layer_ids.take()),
			LevelLayer::system("Destroyed Blocks", true, layer_ids.take()),
			LevelLayer::system("Spawned NPCs", false, layer_ids.take()),
		];

		let mut event_ids = NextId::default();
		let events = ["Level - Start", "P Switch - Start", "P Switch - End"]
			.into_iter()
			.map(|name| {
				let mut event = LevelEvent::new(name);
				event.meta.array_id = event_ids.take();
				event
			})
			.collect();

		Self {
			head: LevelHead::default(),
			meta_data: MetaData::default(),
			sections: (0..DEFAULT_SECTION_COUNT).map(LevelSection::with_id).collect(),
			players: Vec::new(),
			blocks: Vec::new(),
			bgo: Vec::new(),
			npc: Vec::new(),
			doors: Vec::new(),
			physics: Vec::new(),
			layers,
			events,
			variables: Vec::new(),
			arrays: Vec::new(),
			scripts: Vec::new(),
			custom_items: Vec::new(),
			meta: FileFormatMeta::default(),
			block_ids: NextId::default(),
			bgo_ids: NextId::default(),
			npc_ids: NextId::default(),
			door_ids: NextId::default(),
			physics_ids: NextId::default(),
			layer_ids,
			event_ids,
		}
	}
}

impl FormatData for LevelData {
	fn format_meta(&self) -> &FileFormatMeta {
		&self.meta
	}

	fn format_meta_mut(&mut self) -> &mut FileFormatMeta {
		&mut self.meta
	}
}

impl CarriesMetaData for LevelData {
	fn meta_data(&self) -> &MetaData {
		&self.meta_data
	}

	fn meta_data_mut(&mut self) -> &mut MetaData {
		&mut self.meta_data
	}
}

crate::mdx_file_callbacks! {
	/// Load callbacks of a `.lvlx` file.
	load LevelLoadCallbacks;
	/// Save callbacks of a `.lvlx` file.
	save LevelSaveCallbacks;
	/// Level-wide settings.
	head: LevelHead = "HEAD", single;
	/// Crash recovery record.
	crash_data: CrashData = "META_SYS_CRASH", single;
	/// Editor bookmarks.
	bookmark: Bookmark = "META_BOOKMARKS";
	/// Sections.
	section: LevelSection = "SECTION";
	/// Player start points.
	startpoint: PlayerPoint = "STARTPOINT";
	/// Blocks.
	block: LevelBlock = "BLOCK";
	/// Background objects.
	bgo: LevelBgo = "BGO";
	/// NPCs.
	npc: LevelNpc = "NPC";
	/// Physical environment zones.
	physics: LevelPhysEnv = "PHYSICS";
	/// Warps.
	door: LevelDoor = "DOORS";
	/// Layers.
	layer: LevelLayer = "LAYERS";
	/// Events.
	event: LevelEvent = "EVENTS_CLASSIC";
	/// Script variables.
	variable: LevelVariable = "VARIABLES";
	/// Script arrays.
	array: LevelArray = "ARRAYS";
	/// Embedded scripts.
	script: LevelScript = "SCRIPTS";
	/// SMBX-38A per-item property overrides.
	custom_item: LevelItemSetup38A = "CUSTOM_ITEMS_38A";
}

fn load_head(data: &mut LevelData, head: &mut LevelHead) -> Result<bool> {
	data.head = std::mem::take(head);
	data.meta.config_pack_id.clone_from(&data.head.config_pack_id);
	Ok(true)
}

fn load_head_only(data: &mut LevelData, head: &mut LevelHead) -> Result<bool> {
	load_head(data, head)?;
	Err(MdxError::Interrupt)
}

fn save_head(data: &LevelData, head: &mut LevelHead, index: usize) -> Result<bool> {
	if index != 0 {
		return Ok(false);
	}
	head.clone_from(&data.head);
	head.config_pack_id.clone_from(&data.meta.config_pack_id);
	Ok(true)
}

fn load_section(data: &mut LevelData, section: &mut LevelSection) -> Result<bool> {
	section.position_x = section.size_left.saturating_sub(10);
	section.position_y = section.size_top.saturating_sub(10);

	let id = usize::try_from(section.id)
		.ok()
		.filter(|&id| id <= MAX_SECTION_ID)
		.ok_or_else(|| MdxError::callback("Invalid section ID"))?;
	while data.sections.len() <= id {
		let next = data.sections.len();
		data.sections.push(LevelSection::with_id(next));
	}
	data.sections[id] = std::mem::take(section);
	Ok(true)
}

fn save_section(data: &LevelData, section: &mut LevelSection, index: usize) -> Result<bool> {
	Ok(copy_nth(&data.sections, section, index))
}

fn load_startpoint(data: &mut LevelData, point: &mut PlayerPoint) -> Result<bool> {
	let mut point = std::mem::take(point);
	let sized = PlayerPoint::new(point.id);
	if point.w == 0 {
		point.w = sized.w;
	}
	if point.h == 0 {
		point.h = sized.h;
	}

	match data.players.iter_mut().find(|known| known.id == point.id) {
		Some(known) => *known = point,
		None => data.players.push(point),
	}
	Ok(true)
}

fn save_startpoint(data: &LevelData, point: &mut PlayerPoint, index: usize) -> Result<bool> {
	Ok(copy_nth(&data.players, point, index))
}

fn load_door(data: &mut LevelData, door: &mut LevelDoor) -> Result<bool> {
	door.resolve_ends();
	crate::formats::append_element(&mut data.doors, &mut data.door_ids, door);
	Ok(true)
}

fn save_door(data: &LevelData, door: &mut LevelDoor, index: usize) -> Result<bool> {
	Ok(copy_nth(&data.doors, door, index))
}

/// Replace the element `same` matches, keeping its bookkeeping ids, or append a new one.
fn upsert_element<T: Element>(list: &mut Vec<T>, next_id: &mut NextId, mut item: T, same: impl Fn(&T, &T) -> bool) {
	match list.iter_mut().find(|known| same(&**known, &item)) {
		Some(known) => {
			let kept = known.element_meta_mut();
			let (array_id, index) = (kept.array_id, kept.index);
			let meta = item.element_meta_mut();
			meta.array_id = array_id;
			meta.index = index;
			*known = item;
		}
		None => {
			let meta = item.element_meta_mut();
			meta.array_id = next_id.take();
			meta.index = u32::try_from(list.len()).unwrap_or(u32::MAX);
			list.push(item);
		}
	}
}

fn load_layer(data: &mut LevelData, layer: &mut LevelLayer) -> Result<bool> {
	let layer = std::mem::take(layer);
	upsert_element(&mut data.layers, &mut data.layer_ids, layer, |known, new| known.name == new.name);
	Ok(true)
}

fn load_event(data: &mut LevelData, event: &mut LevelEvent) -> Result<bool> {
	let mut event = std::mem::take(event);
	event.sets = pad_section_settings(std::mem::take(&mut event.sets))?;
	upsert_element(&mut data.events, &mut data.event_ids, event, |known, new| known.name == new.name);
	Ok(true)
}

fn save_layer(data: &LevelData, layer: &mut LevelLayer, index: usize) -> Result<bool> {
	Ok(copy_nth(&data.layers, layer, index))
}

fn save_event(data: &LevelData, event: &mut LevelEvent, index: usize) -> Result<bool> {
	Ok(copy_nth(&data.events, event, index))
}

fn load_custom_item(data: &mut LevelData, item: &mut LevelItemSetup38A) -> Result<bool> {
	if item.kind == CustomItemKind::Unknown {
		return Err(MdxError::callback("Invalid 38A ID"));
	}
	data.custom_items.push(std::mem::take(item));
	Ok(true)
}

fn save_custom_item(data: &LevelData, item: &mut LevelItemSetup38A, index: usize) -> Result<bool> {
	Ok(copy_nth(&data.custom_items, item, index))
}

list_section!(load_block, save_block: LevelData, LevelBlock => blocks, block_ids);
list_section!(load_bgo, save_bgo: LevelData, LevelBgo => bgo, bgo_ids);
list_section!(load_npc, save_npc: LevelData, LevelNpc => npc, npc_ids);
list_section!(load_physics, save_physics: LevelData, LevelPhysEnv => physics, physics_ids);
list_section!(load_variable, save_variable: LevelData, LevelVariable => variables);
list_section!(load_array, save_array: LevelData, LevelArray => arrays);
list_section!(load_script, save_script: LevelData, LevelScript => scripts);

/// Load a `.lvlx` file through caller-supplied callbacks.
pub fn load_level_with<U>(input: &mut dyn TextInput, user: &mut U, callbacks: &LevelLoadCallbacks<U>) -> std::result::Result<(), FileError> {
	callbacks.load(input, user)
}

/// Save a `.lvlx` file through caller-supplied callbacks.
pub fn save_level_with<U>(output: &mut dyn TextOutput, user: &U, callbacks: &LevelSaveCallbacks<U>) -> std::result::Result<(), FileError> {
	callbacks.save(output, user)
}

/// Callbacks filling a [`LevelData`].
pub fn level_load_callbacks() -> LevelLoadCallbacks<LevelData> {
	LevelLoadCallbacks {
		on_error: Some(record_error),
		head: Some(load_head),
		crash_data: Some(load_crash_data),
		bookmark: Some(load_bookmark),
		section: Some(load_section),
		startpoint: Some(load_startpoint),
		block: Some(load_block),
		bgo: Some(load_bgo),
		npc: Some(load_npc),
		physics: Some(load_physics),
		door: Some(load_door),
		layer: Some(load_layer),
		event: Some(load_event),
		variable: Some(load_variable),
		array: Some(load_array),
		script: Some(load_script),
		custom_item: Some(load_custom_item),
	}
}

/// Callbacks reading only the `HEAD` section of a level file.
pub fn level_header_callbacks() -> LevelLoadCallbacks<LevelData> {
	LevelLoadCallbacks {
		on_error: Some(record_error),
		head: Some(load_head_only),
		..LevelLoadCallbacks::default()
	}
}

/// Callbacks writing a [`LevelData`].
pub fn level_save_callbacks() -> LevelSaveCallbacks<LevelData> {
	LevelSaveCallbacks {
		on_error: None,
		head: Some(save_head),
		crash_data: Some(save_crash_data),
		bookmark: Some(save_bookmark),
		section: Some(save_section),
		startpoint: Some(save_startpoint),
		block: Some(save_block),
		bgo: Some(save_bgo),
		npc: Some(save_npc),
		physics: Some(save_physics),
		door: Some(save_door),
		layer: Some(save_layer),
		event: Some(save_event),
		variable: Some(save_variable),
		array: Some(save_array),
		script: Some(save_script),
		custom_item: Some(save_custom_item),
	}
}

/// Replace `data` with a fresh level and merge in the contents of a `.lvlx` file.
pub fn read_level(input: &mut dyn TextInput, data: &mut LevelData) -> std::result::Result<(), FileError> {
	*data = LevelData::default();
	data.meta.begin_read(input.file_path());
	load_level_with(input, data, &level_load_callbacks())
}

/// Replace `data` with a fresh level carrying only the `HEAD` of a `.lvlx` file.
pub fn read_level_header(input: &mut dyn TextInput, data: &mut LevelData) -> std::result::Result<(), FileError> {
	*data = LevelData::default();
	data.meta.begin_read(input.file_path());
	load_level_with(input, data, &level_header_callbacks())
}

/// Write `data` as a `.lvlx` file.
pub fn write_level(output: &mut dyn TextOutput, data: &LevelData) -> std::result::Result<(), FileError> {
	save_level_with(output, data, &level_save_callbacks())
}
