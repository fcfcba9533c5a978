#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use pgex::formats::{LevelData, read_level, read_level_header, write_level};
use pgex::mdx::{LineReader, MdxError};
use pretty_assertions::assert_eq;

#[test]
fn intro_level_loads_every_section() {
	let data = load("intro.lvlx");

	assert!(data.meta.read_valid, "{}", data.meta.error_info);
	assert_eq!(data.meta.filename, "intro");
	assert_eq!(data.meta.config_pack_id, "smbx13");
	assert_eq!(data.head.name, "Intro Hills");
	assert_eq!(data.head.open_level_on_fail_warp_id, 1);

	assert_eq!(data.sections.len(), 21);
	assert_eq!(data.sections[1].music_id, 6);
	assert!(data.sections[1].underwater);
	assert_eq!(data.players.len(), 2);
	assert_eq!(data.blocks.len(), 4);
	assert_eq!(data.bgo.len(), 2);
	assert_eq!(data.npc.len(), 2);
	assert_eq!(data.npc[1].message, "Hello, traveller!");
	assert_eq!(data.physics.len(), 1);
	assert_eq!(data.doors.len(), 2);
	assert_eq!(data.layers.len(), 4);
	assert_eq!(data.events.len(), 4);
	assert_eq!(data.variables.len(), 1);
	assert_eq!(data.meta_data.bookmarks.len(), 1);
}

#[test]
fn intro_level_entrance_door_takes_exit_position() {
	let data = load("intro.lvlx");
	let door = &data.doors[1];
	assert!(!door.is_set_in);
	assert_eq!((door.ix, door.iy), (door.ox, door.oy));
	assert_eq!(door.level_file, "castle.lvlx");
}

#[test]
fn intro_level_events_merge_with_system_events() {
	let data = load("intro.lvlx");

	let start = &data.events[0];
	assert_eq!(start.name, "Level - Start");
	assert_eq!(start.msg, "Welcome!");
	assert_eq!(start.sets[0].music_id, 1);

	let bridge = &data.events[3];
	assert_eq!(bridge.name, "Drop Bridge");
	assert_eq!(bridge.layers_hide, vec!["Bridge".to_owned()]);
	assert_eq!(bridge.trigger_timer, 5);
	assert_eq!(bridge.meta.array_id, 4);
}

#[test]
fn intro_level_resave_is_stable() {
	let first = save(&load("intro.lvlx"));

	let mut reread = LevelData::default();
	read_level(&mut LineReader::from_bytes(first.as_bytes()), &mut reread).expect("saved level parses");
	let second = save(&reread);

	assert_eq!(first, second);
	assert!(first.starts_with("HEAD\nTL:\"Intro Hills\";SZ:1;DL:\"intro.lvlx\";DE:1;CPID:\"smbx13\";\nHEAD_END\n"), "{first}");
}

#[test]
fn level_header_stops_before_body() {
	let mut data = LevelData::default();
	let mut input = LineReader::open(fixture_path("intro.lvlx")).expect("fixture opens");
	read_level_header(&mut input, &mut data).expect("header parses");

	assert_eq!(data.head.name, "Intro Hills");
	assert!(data.blocks.is_empty());
	assert_eq!(data.layers.len(), 3);
}

#[test]
fn broken_level_reports_failing_line() {
	let mut data = LevelData::default();
	let mut input = LineReader::open(fixture_path("broken.lvlx")).expect("fixture opens");
	let err = read_level(&mut input, &mut data).expect_err("broken fixture fails");

	assert_eq!(err.line_number(), Some(6));
	assert!(matches!(err.engine_error().root(), MdxError::MalformedTerm { .. }));
	assert!(!data.meta.read_valid);
	assert_eq!(data.meta.error_line_data, "ID:2;X:oops;Y:0;");
	assert_eq!(data.meta.error_info, "bad field X: bad long");
	assert_eq!(data.blocks.len(), 1);
}

fn load(name: &str) -> LevelData {
	let mut data = LevelData::default();
	let mut input = LineReader::open(fixture_path(name)).expect("fixture opens");
	read_level(&mut input, &mut data).expect("fixture parses");
	data
}

fn save(data: &LevelData) -> String {
	let mut out = String::new();
	write_level(&mut out, data).expect("level saves");
	out
}

fn fixture_path(name: &str) -> PathBuf {
	Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}
