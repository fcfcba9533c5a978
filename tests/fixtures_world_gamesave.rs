#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use pgex::formats::{Document, FileKind, GamesaveData, LoadOptions, MetaData, WorldData, read_gamesave, read_meta, read_world, write_gamesave, write_world};
use pgex::mdx::{LineReader, TextWriter};
use pretty_assertions::assert_eq;

#[test]
fn grassland_world_skips_unknown_section() {
	let mut data = WorldData::default();
	let mut input = LineReader::open(fixture_path("grassland.wldx")).expect("fixture opens");
	read_world(&mut input, &mut data).expect("world parses");

	assert_eq!(data.head.title, "Grass Land");
	assert_eq!(data.head.authors, "The Team");
	assert_eq!(data.tiles.len(), 3);
	assert_eq!(data.scenery.len(), 1);
	assert_eq!(data.paths.len(), 1);
	assert_eq!(data.music_boxes.len(), 1);
	assert_eq!(data.levels.len(), 2);
	assert!(data.levels[0].game_start);
	assert_eq!(data.levels[1].left_exit, 1);
	assert_eq!(data.tiles[2].meta.array_id, 3);

	let mut out = String::new();
	write_world(&mut out, &data).expect("world saves");
	assert!(!out.contains("THIS_SECTION_IS_UNKNOWN"), "{out}");
	assert!(out.contains("LEVELS\nID:1;Y:64;LF:\"intro.lvlx\";LT:\"Intro Hills\";ER:1;SP:1;\n"), "{out}");
}

#[test]
fn slot_save_drops_volatile_user_data() {
	let mut data = GamesaveData::default();
	let mut input = LineReader::open(fixture_path("slot1.savx")).expect("fixture opens");
	read_gamesave(&mut input, &mut data).expect("save parses");

	assert_eq!(data.head.lives, 4);
	assert_eq!(data.head.points, 12500);
	assert_eq!(data.characters.len(), 2);
	assert_eq!(data.current_character, vec![1]);
	assert_eq!(data.visible_levels.len(), 2);
	assert_eq!(data.user_data.len(), 2);
	assert!(data.user_data[1].is_volatile());
	assert_eq!(data.user_data[0].data[0].key, "secret");

	let dir = tempfile::tempdir().expect("temp dir");
	let path = dir.path().join("slot1.savx");
	let mut writer = TextWriter::create(&path).expect("output opens");
	write_gamesave(&mut writer, &data).expect("save writes");
	drop(writer);

	let mut reread = GamesaveData::default();
	let mut input = LineReader::open(&path).expect("saved file opens");
	read_gamesave(&mut input, &mut reread).expect("saved file parses");
	assert_eq!(reread.user_data.len(), 1);
	assert_eq!(reread.user_data[0].name, "progress");
	assert_eq!(reread.head, data.head);
}

#[test]
fn meta_sidecar_is_picked_by_extension() {
	let path = fixture_path("intro.lvlx.meta");
	let kind = FileKind::from_path(&path).expect("known extension");
	assert_eq!(kind, FileKind::Meta);

	let mut input = LineReader::open(&path).expect("fixture opens");
	let doc = Document::read(kind, &mut input, &LoadOptions::default()).expect("meta parses");
	let Document::Meta(meta) = doc else {
		panic!("expected meta document");
	};
	let names: Vec<_> = meta.bookmarks.iter().map(|bookmark| bookmark.name.as_str()).collect();
	assert_eq!(names, vec!["Start", "Underground"]);
}

#[test]
fn meta_reader_reports_path() {
	let mut data = MetaData::default();
	let mut input = LineReader::open(fixture_path("intro.lvlx.meta")).expect("fixture opens");
	read_meta(&mut input, &mut data).expect("meta parses");
	assert_eq!(data.meta.filename, "intro.lvlx");
	assert!(data.meta.path.ends_with("fixtures"));
}

fn fixture_path(name: &str) -> PathBuf {
	Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}
