mod unit_file_kind {

	use std::path::Path;

	use crate::formats::FileKind;

	#[test]
	fn picks_kind_from_extension_ignoring_case() {
		assert_eq!(FileKind::from_path(Path::new("worlds/intro.LVLX")), Some(FileKind::Level));
		assert_eq!(FileKind::from_path(Path::new("map.wldx")), Some(FileKind::World));
		assert_eq!(FileKind::from_path(Path::new("save1.savx")), Some(FileKind::Gamesave));
		assert_eq!(FileKind::from_path(Path::new("intro.lvlx.meta")), Some(FileKind::Meta));
	}

	#[test]
	fn unknown_or_missing_extension_has_no_kind() {
		assert_eq!(FileKind::from_path(Path::new("level.lvl")), None);
		assert_eq!(FileKind::from_path(Path::new("README")), None);
	}

	#[test]
	fn extension_round_trips_through_from_path() {
		for kind in [FileKind::Level, FileKind::World, FileKind::Gamesave, FileKind::Meta] {
			let name = format!("file.{}", kind.extension());
			assert_eq!(FileKind::from_path(Path::new(&name)), Some(kind));
		}
	}
}

mod unit_format_meta {

	use std::path::Path;

	use crate::formats::FileFormatMeta;
	use crate::mdx::{FileError, MdxError};

	#[test]
	fn fresh_meta_is_untitled_and_valid() {
		let meta = FileFormatMeta::default();
		assert!(meta.read_valid);
		assert!(meta.untitled);
		assert!(meta.modified);
		assert_eq!(meta.error_line_number, -1);
	}

	#[test]
	fn begin_read_splits_path() {
		let mut meta = FileFormatMeta::default();
		meta.begin_read(Some(Path::new("episodes/one/start.lvlx")));
		assert_eq!(meta.filename, "start");
		assert_eq!(meta.path, "episodes/one");
		assert!(!meta.untitled);
		assert!(!meta.modified);
	}

	#[test]
	fn record_error_keeps_line_and_chain() {
		let mut meta = FileFormatMeta::default();
		let err = FileError::Load {
			line_number: 7,
			line: "ID:x;".to_owned(),
			source: MdxError::MalformedTerm { detail: "bad ulong" }.in_field("ID"),
		};
		meta.record_error(&err);

		assert!(!meta.read_valid);
		assert_eq!(meta.error_line_number, 7);
		assert_eq!(meta.error_line_data, "ID:x;");
		assert!(meta.error_info.contains("ID"), "{}", meta.error_info);
		assert!(meta.error_info.contains("bad ulong"), "{}", meta.error_info);
	}
}

mod unit_element_lists {

	use crate::formats::{LevelBlock, NextId, append_element, copy_nth};

	#[test]
	fn append_numbers_elements_from_one() {
		let mut list = Vec::new();
		let mut ids = NextId::default();
		for id in [5, 6, 7] {
			let mut block = LevelBlock { id, ..LevelBlock::default() };
			append_element(&mut list, &mut ids, &mut block);
			assert_eq!(block, LevelBlock::default(), "source record is taken");
		}

		let numbered: Vec<_> = list.iter().map(|block| (block.id, block.meta.array_id, block.meta.index)).collect();
		assert_eq!(numbered, vec![(5, 1, 0), (6, 2, 1), (7, 3, 2)]);
		assert_eq!(ids, NextId(4));
	}

	#[test]
	fn copy_nth_stops_past_the_end() {
		let list = vec![1_i32, 2];
		let mut dest = 0;
		assert!(copy_nth(&list, &mut dest, 1));
		assert_eq!(dest, 2);
		assert!(!copy_nth(&list, &mut dest, 2));
	}
}

mod unit_document {

	use crate::formats::{Document, FileKind, LoadOptions};
	use crate::mdx::LineReader;

	const LEVEL: &str = "HEAD\nTL:\"Intro\";\nHEAD_END\nBLOCK\nID:1;X:0;Y:0;\nID:2;X:32;Y:0;\nBLOCK_END\n";

	#[test]
	fn reads_by_kind_and_reports_counts() {
		let mut input = LineReader::from_bytes(LEVEL.as_bytes());
		let doc = Document::read(FileKind::Level, &mut input, &LoadOptions::default()).expect("level parses");

		assert_eq!(doc.kind(), FileKind::Level);
		assert!(doc.format_meta().read_valid);
		let counts = doc.section_counts();
		assert!(counts.contains(&("BLOCK", 2)), "{counts:?}");
		assert!(counts.contains(&("LAYERS", 3)), "{counts:?}");
	}

	#[test]
	fn header_only_skips_the_body() {
		let mut input = LineReader::from_bytes(LEVEL.as_bytes());
		let options = LoadOptions { header_only: true };
		let doc = Document::read(FileKind::Level, &mut input, &options).expect("header parses");

		let Document::Level(level) = doc else {
			panic!("expected a level");
		};
		assert_eq!(level.head.name, "Intro");
		assert!(level.blocks.is_empty());
	}

	#[test]
	fn write_uses_the_document_kind() {
		let mut input = LineReader::from_bytes(b"META_BOOKMARKS\nBM:\"spawn\";X:16;Y:-32;\nMETA_BOOKMARKS_END\n");
		let doc = Document::read(FileKind::Meta, &mut input, &LoadOptions::default()).expect("meta parses");

		let mut out = String::new();
		doc.write(&mut out).expect("meta saves");
		assert_eq!(out, "META_BOOKMARKS\nBM:\"spawn\";X:16;Y:-32;\nMETA_BOOKMARKS_END\n");
	}

	#[test]
	fn json_is_tagged_by_kind() {
		let mut input = LineReader::from_bytes(b"");
		let doc = Document::read(FileKind::Gamesave, &mut input, &LoadOptions::default()).expect("empty save parses");

		let json = serde_json::to_value(&doc).expect("serializes");
		assert_eq!(json["kind"], "gamesave");
		assert_eq!(json["data"]["head"]["lives"], 3);
	}
}
