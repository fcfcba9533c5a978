use std::sync::OnceLock;

use serde::Serialize;

use crate::formats::{ElementMeta, impl_element};
use crate::mdx::{Cursor, MdxError, MdxObject, MdxValue, ObjectSchema, Result, SaveMode, access};

/// Number of section settings a new event carries.
pub(super) const DEFAULT_SECTION_COUNT: usize = 21;

/// Highest section index accepted from a file.
pub(super) const MAX_SECTION_ID: usize = 1000;

/// One stop of a section autoscroll path.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AutoscrollStop {
	/// Camera X.
	pub x: i64,
	/// Camera Y.
	pub y: i64,
	/// Stop behavior.
	pub kind: i32,
	/// Travel speed towards this stop.
	pub speed: i64,
}

/// Per-section changes applied by an event.
///
/// `-1` in `position_left`, `music_id` or `background_id` leaves that
/// property alone.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventSectionSettings {
	/// Section index.
	pub id: i64,
	/// New left bound; -1 keeps it, -2 resets it.
	pub position_left: i64,
	/// New top bound.
	pub position_top: i64,
	/// New bottom bound.
	pub position_bottom: i64,
	/// New right bound.
	pub position_right: i64,
	/// Expression for the X position.
	pub expression_pos_x: String,
	/// Expression for the Y position.
	pub expression_pos_y: String,
	/// Expression for the width.
	pub expression_pos_w: String,
	/// Expression for the height.
	pub expression_pos_h: String,
	/// New music; -1 keeps it.
	pub music_id: i64,
	/// New custom music file.
	pub music_file: String,
	/// New music entry of the level music list.
	pub music_file_idx: i64,
	/// New background; -1 keeps it.
	pub background_id: i64,
	/// Enable autoscroll.
	pub autoscroll: bool,
	/// Autoscroll style.
	pub autoscroll_style: i32,
	/// Autoscroll path, read but never written back.
	pub autoscroll_path: Vec<AutoscrollStop>,
	/// Autoscroll speed X.
	pub autoscroll_x: f64,
	/// Autoscroll speed Y.
	pub autoscroll_y: f64,
	/// Expression for autoscroll speed X.
	pub expression_autoscroll_x: String,
	/// Expression for autoscroll speed Y.
	pub expression_autoscroll_y: String,
	/// Filled from the legacy `SM`/`SB`/`SS` event fields.
	#[serde(skip)]
	legacy: bool,
}

impl Default for EventSectionSettings {
	fn default() -> Self {
		Self {
			id: 0,
			position_left: -1,
			position_top: 0,
			position_bottom: 0,
			position_right: 0,
			expression_pos_x: String::new(),
			expression_pos_y: String::new(),
			expression_pos_w: String::new(),
			expression_pos_h: String::new(),
			music_id: -1,
			music_file: String::new(),
			music_file_idx: 0,
			background_id: -1,
			autoscroll: false,
			autoscroll_style: 0,
			autoscroll_path: Vec::new(),
			autoscroll_x: 0.0,
			autoscroll_y: 0.0,
			expression_autoscroll_x: String::new(),
			expression_autoscroll_y: String::new(),
			legacy: false,
		}
	}
}

impl EventSectionSettings {
	/// Settings for section `id` that change nothing.
	pub fn unchanged(id: usize) -> Self {
		Self {
			id: i64::try_from(id).unwrap_or(i64::MAX),
			..Self::default()
		}
	}
}

fn load_autoscroll_path(settings: &mut EventSectionSettings, cur: &mut Cursor<'_>) -> Result<()> {
	let mut raw: Vec<i64> = Vec::new();
	raw.load(cur)?;
	if raw.len() % 4 != 0 {
		return Err(MdxError::MalformedTerm {
			detail: "autoscroll path length is not a multiple of 4",
		});
	}

	settings.autoscroll_path = raw
		.chunks_exact(4)
		.map(|stop| {
			Ok(AutoscrollStop {
				x: stop[0],
				y: stop[1],
				kind: i32::try_from(stop[2]).map_err(|_| MdxError::NumericOverflow { kind: "int" })?,
				speed: stop[3],
			})
		})
		.collect::<Result<_>>()?;
	Ok(())
}

impl MdxObject for EventSectionSettings {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<EventSectionSettings>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.non_negative("ID", SaveMode::NotOnly, access!(id))
				.field("SL", access!(position_left))
				.field("ST", access!(position_top))
				.field("SB", access!(position_bottom))
				.field("SR", access!(position_right))
				.field("SXX", access!(expression_pos_x))
				.field("SYX", access!(expression_pos_y))
				.field("SWX", access!(expression_pos_w))
				.field("SHX", access!(expression_pos_h))
				.field("MI", access!(music_id))
				.field("MF", access!(music_file))
				.field("ME", access!(music_file_idx))
				.field("BG", access!(background_id))
				.field("AS", access!(autoscroll))
				.non_negative("AST", SaveMode::Normal, access!(autoscroll_style))
				.custom("ASP", load_autoscroll_path, None)
				.field("AX", access!(autoscroll_x))
				.field("AY", access!(autoscroll_y))
				.field("AXX", access!(expression_autoscroll_x))
				.field("AYX", access!(expression_autoscroll_y))
				.build()
		})
	}
}

/// Layer motion started by an event.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EventMoveLayer {
	/// Layer to move.
	pub name: String,
	/// Speed X.
	pub speed_x: f64,
	/// Expression for speed X.
	pub expression_x: String,
	/// Speed Y.
	pub speed_y: f64,
	/// Expression for speed Y.
	pub expression_y: String,
	/// Motion algorithm.
	pub way: i32,
}

impl MdxObject for EventMoveLayer {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<EventMoveLayer>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field("LN", access!(name))
				.field_with("SX", SaveMode::NotOnly, access!(speed_x))
				.field_with("SXX", SaveMode::NotOnly, access!(expression_x))
				.field_with("SY", SaveMode::NotOnly, access!(speed_y))
				.field_with("SYX", SaveMode::NotOnly, access!(expression_y))
				.non_negative("MW", SaveMode::NotOnly, access!(way))
				.build()
		})
	}
}

/// NPC spawned by an event.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EventSpawnNpc {
	/// NPC type.
	pub id: i64,
	/// Spawn X.
	pub x: i64,
	/// Expression for spawn X.
	pub expression_x: String,
	/// Spawn Y.
	pub y: i64,
	/// Expression for spawn Y.
	pub expression_y: String,
	/// Initial speed X.
	pub speed_x: f64,
	/// Expression for speed X.
	pub expression_sx: String,
	/// Initial speed Y.
	pub speed_y: f64,
	/// Expression for speed Y.
	pub expression_sy: String,
	/// NPC special value.
	pub special: i64,
}

impl MdxObject for EventSpawnNpc {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<EventSpawnNpc>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.non_negative("ID", SaveMode::AlwaysStore, access!(id))
				.field("SX", access!(x))
				.field("SXX", access!(expression_x))
				.field("SY", access!(y))
				.field("SYX", access!(expression_y))
				.field("SSX", access!(speed_x))
				.field("SSXX", access!(expression_sx))
				.field("SSY", access!(speed_y))
				.field("SSYX", access!(expression_sy))
				.non_negative("SSS", SaveMode::Normal, access!(special))
				.build()
		})
	}
}

/// Effect spawned by an event.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EventSpawnEffect {
	/// Effect type.
	pub id: i64,
	/// Spawn X.
	pub x: i64,
	/// Expression for spawn X.
	pub expression_x: String,
	/// Spawn Y.
	pub y: i64,
	/// Expression for spawn Y.
	pub expression_y: String,
	/// Initial speed X.
	pub speed_x: f64,
	/// Expression for speed X.
	pub expression_sx: String,
	/// Initial speed Y.
	pub speed_y: f64,
	/// Expression for speed Y.
	pub expression_sy: String,
	/// Animation frame rate.
	pub fps: i32,
	/// Lifetime in ticks.
	pub max_life_time: i32,
	/// Apply gravity.
	pub gravity: bool,
}

impl MdxObject for EventSpawnEffect {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<EventSpawnEffect>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.non_negative("ID", SaveMode::AlwaysStore, access!(id))
				.field("SX", access!(x))
				.field("SXX", access!(expression_x))
				.field("SY", access!(y))
				.field("SYX", access!(expression_y))
				.field("SSX", access!(speed_x))
				.field("SSXX", access!(expression_sx))
				.field("SSY", access!(speed_y))
				.field("SSYX", access!(expression_sy))
				.field("FP", access!(fps))
				.field("TTL", access!(max_life_time))
				.field("GT", access!(gravity))
				.build()
		})
	}
}

/// Variable assignment performed by an event.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EventUpdateVariable {
	/// Variable name.
	pub name: String,
	/// Assigned expression.
	pub new_value: String,
}

impl MdxObject for EventUpdateVariable {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<EventUpdateVariable>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("N", SaveMode::AlwaysStore, access!(name))
				.field_with("V", SaveMode::AlwaysStore, access!(new_value))
				.build()
		})
	}
}

crate::sub_object_value!(EventSectionSettings, EventMoveLayer, EventSpawnNpc, EventSpawnEffect, EventUpdateVariable);

/// Timer started by an event.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EventTimer {
	/// Start the timer.
	pub enable: bool,
	/// Initial unit count.
	pub count: i64,
	/// Tick interval.
	pub interval: f64,
	/// Count direction.
	pub count_dir: i32,
	/// Show the timer on screen.
	pub show: bool,
}

/// Player input forced while an event runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EventControls {
	/// Hold up.
	pub up: bool,
	/// Hold down.
	pub down: bool,
	/// Hold left.
	pub left: bool,
	/// Hold right.
	pub right: bool,
	/// Hold run.
	pub run: bool,
	/// Hold jump.
	pub jump: bool,
	/// Hold drop.
	pub drop: bool,
	/// Hold start.
	pub start: bool,
	/// Hold alt-run.
	pub alt_run: bool,
	/// Hold alt-jump.
	pub alt_jump: bool,
	/// Apply the forced input.
	pub enable: bool,
	/// Ignore the keyboard while forced.
	pub lock_keyboard: bool,
}

impl EventControls {
	fn to_flags(&self) -> [bool; 12] {
		[
			self.up,
			self.down,
			self.left,
			self.right,
			self.run,
			self.jump,
			self.drop,
			self.start,
			self.alt_run,
			self.alt_jump,
			self.enable,
			self.lock_keyboard,
		]
	}

	fn from_flags(flags: [bool; 12]) -> Self {
		let [up, down, left, right, run, jump, drop, start, alt_run, alt_jump, enable, lock_keyboard] = flags;
		Self {
			up,
			down,
			left,
			right,
			run,
			jump,
			drop,
			start,
			alt_run,
			alt_jump,
			enable,
			lock_keyboard,
		}
	}
}

/// Classic level event.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LevelEvent {
	/// Event name, unique within the level.
	pub name: String,
	/// Message box text.
	pub msg: String,
	/// Sound to play.
	pub sound_id: i64,
	/// End-of-game behavior.
	pub end_game: i32,
	/// Layers to hide.
	pub layers_hide: Vec<String>,
	/// Layers to show.
	pub layers_show: Vec<String>,
	/// Layers to toggle.
	pub layers_toggle: Vec<String>,
	/// Per-section settings, indexed by section id.
	pub sets: Vec<EventSectionSettings>,
	/// Layers set in motion.
	pub moving_layers: Vec<EventMoveLayer>,
	/// NPCs to spawn.
	pub spawn_npc: Vec<EventSpawnNpc>,
	/// Effects to spawn.
	pub spawn_effects: Vec<EventSpawnEffect>,
	/// Variables to update.
	pub update_variable: Vec<EventUpdateVariable>,
	/// Script to trigger.
	pub trigger_script: String,
	/// Script API entry to trigger.
	pub trigger_api_id: i32,
	/// Timer to start.
	pub timer: EventTimer,
	/// Event to trigger afterwards.
	pub trigger: String,
	/// Delay before `trigger`, in tenths of a second.
	pub trigger_timer: i64,
	/// Suppress the smoke effect on layer changes.
	pub no_smoke: bool,
	/// Auto start mode.
	pub autostart: i32,
	/// Auto start condition expression.
	pub autostart_condition: String,
	/// Forced player input.
	pub controls: EventControls,
	/// Layer moved by the legacy motion fields.
	pub move_layer: String,
	/// Legacy layer speed X.
	pub layer_speed_x: f64,
	/// Legacy layer speed Y.
	pub layer_speed_y: f64,
	/// Section scrolled by the legacy camera fields.
	pub scroll_section: i64,
	/// Legacy camera speed X.
	pub move_camera_x: f64,
	/// Legacy camera speed Y.
	pub move_camera_y: f64,
	/// Bookkeeping.
	pub meta: ElementMeta,
}

impl LevelEvent {
	/// A new event with one unchanged settings entry per default section.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			sets: (0..DEFAULT_SECTION_COUNT).map(EventSectionSettings::unchanged).collect(),
			..Self::default()
		}
	}
}

fn expect_end(cur: &Cursor<'_>) -> Result<()> {
	match cur.peek() {
		Some(byte) => Err(MdxError::UnexpectedCharacter { found: char::from(byte) }),
		None => Ok(()),
	}
}

fn parse_legacy_id(text: &str) -> Result<i64> {
	let mut cur = Cursor::new(text.as_bytes());
	let mut value = 0_i64;
	value.load(&mut cur)?;
	expect_end(&cur)?;
	Ok(value)
}

/// Parse `left,top,bottom,right`.
fn parse_legacy_bounds(text: &str) -> Result<[i64; 4]> {
	let mut cur = Cursor::new(text.as_bytes());
	let mut bounds = [0_i64; 4];
	for (idx, bound) in bounds.iter_mut().enumerate() {
		if idx > 0 && !cur.eat(b',') {
			return Err(MdxError::MissingDelimiter { expected: ',' });
		}
		bound.load(&mut cur)?;
	}
	expect_end(&cur)?;
	Ok(bounds)
}

/// Legacy values only apply while no `SSS` list has been read for the event.
fn legacy_ignored(event: &LevelEvent) -> bool {
	event.sets.first().is_some_and(|set| !set.legacy)
}

/// Borrow the settings entry for section `idx`, growing the list by one when needed.
fn legacy_entry(event: &mut LevelEvent, idx: usize) -> Option<&mut EventSectionSettings> {
	if idx >= DEFAULT_SECTION_COUNT {
		return None;
	}
	if idx == event.sets.len() {
		event.sets.push(EventSectionSettings::default());
	}
	let set = event.sets.get_mut(idx)?;
	set.id = i64::try_from(idx).unwrap_or(i64::MAX);
	set.legacy = true;
	Some(set)
}

fn load_legacy_ids(event: &mut LevelEvent, cur: &mut Cursor<'_>, field: fn(&mut EventSectionSettings) -> &mut i64) -> Result<()> {
	let mut raw: Vec<String> = Vec::new();
	raw.load(cur)?;

	let ignored = legacy_ignored(event);
	for (idx, text) in raw.iter().enumerate() {
		let value = parse_legacy_id(text)?;
		if ignored {
			continue;
		}
		if let Some(set) = legacy_entry(event, idx) {
			*field(set) = value;
		}
	}

	if !ignored {
		for set in event.sets.iter_mut().skip(raw.len()) {
			*field(set) = -1;
		}
	}
	Ok(())
}

fn load_legacy_music(event: &mut LevelEvent, cur: &mut Cursor<'_>) -> Result<()> {
	load_legacy_ids(event, cur, |set| &mut set.music_id)
}

fn load_legacy_background(event: &mut LevelEvent, cur: &mut Cursor<'_>) -> Result<()> {
	load_legacy_ids(event, cur, |set| &mut set.background_id)
}

fn load_legacy_bounds(event: &mut LevelEvent, cur: &mut Cursor<'_>) -> Result<()> {
	let mut raw: Vec<String> = Vec::new();
	raw.load(cur)?;

	let ignored = legacy_ignored(event);
	for (idx, text) in raw.iter().enumerate() {
		let [left, top, bottom, right] = parse_legacy_bounds(text)?;
		if ignored {
			continue;
		}
		if let Some(set) = legacy_entry(event, idx) {
			set.position_left = left;
			set.position_top = top;
			set.position_bottom = bottom;
			set.position_right = right;
		}
	}

	if !ignored {
		for set in event.sets.iter_mut().skip(raw.len()) {
			set.position_left = -1;
			set.position_top = 0;
			set.position_bottom = 0;
			set.position_right = 0;
		}
	}
	Ok(())
}

fn load_controls(event: &mut LevelEvent, cur: &mut Cursor<'_>) -> Result<()> {
	let mut raw: Vec<bool> = Vec::new();
	raw.load(cur)?;
	let mut flags = [false; 12];
	for (flag, value) in flags.iter_mut().zip(raw) {
		*flag = value;
	}
	event.controls = EventControls::from_flags(flags);
	Ok(())
}

fn save_controls(out: &mut String, event: &LevelEvent) -> bool {
	let flags = event.controls.to_flags();
	if !flags.contains(&true) {
		return false;
	}
	flags.to_vec().save(out)
}

impl MdxObject for LevelEvent {
	fn schema() -> &'static ObjectSchema<Self> {
		static SCHEMA: OnceLock<ObjectSchema<LevelEvent>> = OnceLock::new();
		SCHEMA.get_or_init(|| {
			ObjectSchema::builder()
				.field_with("ET", SaveMode::AlwaysStore, access!(name))
				.field("MG", access!(msg))
				.non_negative("SD", SaveMode::Normal, access!(sound_id))
				.non_negative("EG", SaveMode::Normal, access!(end_game))
				.field("LH", access!(layers_hide))
				.field("LS", access!(layers_show))
				.field("LT", access!(layers_toggle))
				.custom("SM", load_legacy_music, None)
				.custom("SB", load_legacy_background, None)
				.custom("SS", load_legacy_bounds, None)
				.field("SSS", access!(sets))
				.field("MLA", access!(moving_layers))
				.field("SNPC", access!(spawn_npc))
				.field("SEF", access!(spawn_effects))
				.field("UV", access!(update_variable))
				.field("TSCR", access!(trigger_script))
				.non_negative("TAPI", SaveMode::Normal, access!(trigger_api_id))
				.field("TMR", access!(timer.enable))
				.non_negative("TMC", SaveMode::Normal, access!(timer.count))
				.field("TMI", access!(timer.interval))
				.non_negative("TMD", SaveMode::Normal, access!(timer.count_dir))
				.field("TMV", access!(timer.show))
				.field("TE", access!(trigger))
				.non_negative("TD", SaveMode::Normal, access!(trigger_timer))
				.field("DS", access!(no_smoke))
				.non_negative("AU", SaveMode::Normal, access!(autostart))
				.field("AUC", access!(autostart_condition))
				.custom("PC", load_controls, Some(save_controls))
				.field("ML", access!(move_layer))
				.field("MX", access!(layer_speed_x))
				.field("MY", access!(layer_speed_y))
				.field("AS", access!(scroll_section))
				.field("AX", access!(move_camera_x))
				.field("AY", access!(move_camera_y))
				.build()
		})
	}
}

impl_element!(LevelEvent);

/// Place every settings entry at the index named by its id, filling gaps
/// with unchanged entries.
pub(super) fn pad_section_settings(sets: Vec<EventSectionSettings>) -> Result<Vec<EventSectionSettings>> {
	let mut padded: Vec<EventSectionSettings> = Vec::with_capacity(sets.len());
	for set in sets {
		let id = usize::try_from(set.id)
			.ok()
			.filter(|&id| id <= MAX_SECTION_ID)
			.ok_or_else(|| MdxError::callback("Invalid section ID"))?;
		while padded.len() <= id {
			padded.push(EventSectionSettings::unchanged(padded.len()));
		}
		padded[id] = set;
	}
	Ok(padded)
}
