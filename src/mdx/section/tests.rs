mod unit_section_lines {

	use std::sync::OnceLock;

	use crate::mdx::{LineReader, MdxError, MdxObject, ObjectSchema, Section, SectionOps, TextInput, access, is_blank, is_section_end};

	#[derive(Default)]
	struct Tile {
		id: u64,
	}

	impl MdxObject for Tile {
		fn schema() -> &'static ObjectSchema<Self> {
			static SCHEMA: OnceLock<ObjectSchema<Tile>> = OnceLock::new();
			SCHEMA.get_or_init(|| ObjectSchema::builder().field("ID", access!(id)).build())
		}
	}

	fn collect(ids: &mut Vec<u64>, tile: &mut Tile) -> crate::mdx::Result<bool> {
		ids.push(tile.id);
		Ok(true)
	}

	fn tiles() -> Section<Vec<u64>, Tile> {
		Section::new("TILES", Some(collect), None)
	}

	fn first_line(input: &mut dyn TextInput) -> Vec<u8> {
		let mut line = Vec::new();
		assert!(input.read_line(&mut line).expect("line reads"));
		line
	}

	#[test]
	fn blank_and_end_markers() {
		assert!(is_blank(b""));
		assert!(is_blank(b"   "));
		assert!(!is_blank(b" x "));

		assert!(is_section_end(b"TILES_END", b"TILES"));
		assert!(!is_section_end(b"TILES", b"TILES"));
		assert!(!is_section_end(b"TILESX_END", b"TILES"));
		assert!(!is_section_end(b"TILES_ENDX", b"TILES"));
	}

	#[test]
	fn consumes_records_through_end_marker() {
		let mut input = LineReader::from_bytes(b"TILES\nID:1;\n   \nID:2;\nTILES_END\nNEXT\n");
		let mut section = tiles();
		let mut ids = Vec::new();

		let mut line = first_line(&mut input);
		assert!(section.try_load(&mut ids, &mut input, &mut line).expect("section parses"));
		assert_eq!(ids, vec![1, 2]);
		assert_eq!(first_line(&mut input), b"NEXT");
	}

	#[test]
	fn ignores_other_names_and_unsubscribed_sections() {
		let mut ids = Vec::new();

		let mut input = LineReader::from_bytes(b"LEVELS\nLEVELS_END\n");
		let mut section = tiles();
		let mut line = first_line(&mut input);
		assert!(!section.try_load(&mut ids, &mut input, &mut line).expect("other section is not an error"));

		let mut input = LineReader::from_bytes(b"TILES\nID:1;\nTILES_END\n");
		let mut section = Section::<Vec<u64>, Tile>::new("TILES", None, None);
		let mut line = first_line(&mut input);
		assert!(!section.try_load(&mut ids, &mut input, &mut line).expect("unsubscribed section is not an error"));
		assert!(ids.is_empty());
	}

	#[test]
	fn line_without_terminator_is_rejected() {
		let mut input = LineReader::from_bytes(b"TILES\nID:1\nTILES_END\n");
		let mut section = tiles();
		let mut ids = Vec::new();

		let mut line = first_line(&mut input);
		let err = section.try_load(&mut ids, &mut input, &mut line).expect_err("missing semicolon");
		assert!(matches!(err, MdxError::MissingDelimiter { expected: ';' }));
		assert_eq!(input.line_number(), 2);
	}

	#[test]
	fn name_is_reported() {
		let section = Section::<Vec<u64>, Tile>::new("TILES", None, None);
		assert_eq!(section.name(), "TILES");
	}
}
