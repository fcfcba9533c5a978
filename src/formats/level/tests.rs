mod unit_fresh_level {

	use pretty_assertions::assert_eq;

	use crate::formats::{LevelData, write_level};

	#[test]
	fn has_system_layers_and_events() {
		let data = LevelData::default();

		assert_eq!(data.sections.len(), 21);
		assert!(data.sections.iter().enumerate().all(|(idx, section)| section.id as usize == idx));

		let layers: Vec<_> = data.layers.iter().map(|layer| (layer.name.as_str(), layer.hidden, layer.meta.array_id)).collect();
		assert_eq!(layers, vec![("Default", false, 1), ("Destroyed Blocks", true, 2), ("Spawned NPCs", false, 3)]);

		let events: Vec<_> = data.events.iter().map(|event| (event.name.as_str(), event.sets.len(), event.meta.array_id)).collect();
		assert_eq!(events, vec![("Level - Start", 21, 1), ("P Switch - Start", 21, 2), ("P Switch - End", 21, 3)]);
	}

	#[test]
	fn saves_only_system_records() {
		let mut out = String::new();
		write_level(&mut out, &LevelData::default()).expect("level saves");
		assert_eq!(
			out,
			"\
LAYERS
LR:\"Default\";
LR:\"Destroyed Blocks\";HD:1;
LR:\"Spawned NPCs\";
LAYERS_END
EVENTS_CLASSIC
ET:\"Level - Start\";
ET:\"P Switch - Start\";
ET:\"P Switch - End\";
EVENTS_CLASSIC_END
"
		);
	}
}

mod unit_level_sections {

	use crate::formats::{LevelData, read_level, read_level_header, write_level};
	use crate::mdx::{LineReader, MdxError};

	fn read(text: &str) -> LevelData {
		let mut data = LevelData::default();
		read_level(&mut LineReader::from_bytes(text.as_bytes()), &mut data).expect("level parses");
		data
	}

	#[test]
	fn section_replaces_slot_by_id() {
		let data = read("SECTION\nSC:3;L:-200000;R:-199200;MZ:5;UW:1;\nSECTION_END\n");
		assert_eq!(data.sections.len(), 21);
		let section = &data.sections[3];
		assert_eq!((section.id, section.size_left, section.size_right), (3, -200000, -199200));
		assert_eq!(section.music_id, 5);
		assert!(section.underwater);
	}

	#[test]
	fn section_camera_follows_top_left_bound() {
		let data = read("SECTION\nSC:2;L:-200000;T:-200600;R:-199200;B:-200000;\nSECTION_END\n");
		let section = &data.sections[2];
		assert_eq!((section.position_x, section.position_y), (-200010, -200610));

		let mut out = String::new();
		write_level(&mut out, &data).expect("level saves");
		assert!(out.contains("SECTION\nSC:2;L:-200000;R:-199200;T:-200600;B:-200000;\nSECTION_END\n"), "{out}");
	}

	#[test]
	fn head_saves_config_pack_from_load_status() {
		let mut data = read("HEAD\nTL:\"Castle\";CPID:\"smbx\";\nHEAD_END\n");
		data.meta.config_pack_id = String::from("moondust");

		let mut out = String::new();
		write_level(&mut out, &data).expect("level saves");
		assert!(out.starts_with("HEAD\nTL:\"Castle\";CPID:\"moondust\";\nHEAD_END\n"), "{out}");
	}

	#[test]
	fn section_past_the_defaults_pads_the_list() {
		let data = read("SECTION\nSC:25;MZ:1;\nSECTION_END\n");
		assert_eq!(data.sections.len(), 26);
		assert_eq!(data.sections[22].id, 22);
		assert_eq!(data.sections[25].music_id, 1);
	}

	#[test]
	fn section_id_above_limit_is_rejected() {
		let text = "SECTION\nSC:1001;\nSECTION_END\n";
		let mut data = LevelData::default();
		let err = read_level(&mut LineReader::from_bytes(text.as_bytes()), &mut data).expect_err("invalid id");
		assert!(matches!(err.engine_error(), MdxError::Callback { .. }));
		assert_eq!(data.meta.error_info, "Invalid section ID");
		assert_eq!(data.meta.error_line_number, 2);
		assert!(!data.meta.read_valid);
	}

	#[test]
	fn startpoints_get_player_sizes_and_upsert_by_id() {
		let text = "STARTPOINT\nID:1;X:10;Y:20;\nID:2;X:50;Y:20;D:1;\nID:3;\nID:1;X:99;\nSTARTPOINT_END\n";
		let data = read(text);

		let points: Vec<_> = data.players.iter().map(|point| (point.id, point.x, point.w, point.h)).collect();
		assert_eq!(points, vec![(1, 99, 24, 54), (2, 50, 24, 60), (3, 0, 24, 32)]);
		assert_eq!(data.players[1].direction, 1);
	}

	#[test]
	fn header_only_read_ignores_the_body() {
		let text = "HEAD\nTL:\"Castle\";SZ:3;CPID:\"smbx\";\nHEAD_END\nSECTION\nSC:1001;\nSECTION_END\n";
		let mut data = LevelData::default();
		read_level_header(&mut LineReader::from_bytes(text.as_bytes()), &mut data).expect("header parses");
		assert_eq!(data.head.name, "Castle");
		assert_eq!(data.head.stars, 3);
		assert_eq!(data.meta.config_pack_id, "smbx");
		assert!(data.meta.read_valid);
	}
}

mod unit_level_elements {

	use pretty_assertions::assert_eq;

	use crate::formats::{LevelBlock, LevelData, read_level, write_level};
	use crate::mdx::LineReader;

	fn read(text: &str) -> LevelData {
		let mut data = LevelData::default();
		read_level(&mut LineReader::from_bytes(text.as_bytes()), &mut data).expect("level parses");
		data
	}

	#[test]
	fn blocks_are_numbered_and_keep_their_layer() {
		let data = read("BLOCK\nID:5;X:32;Y:64;W:32;H:32;LR:\"Bridge\";\nID:6;X:64;Y:64;W:32;H:32;\nBLOCK_END\n");

		let blocks: Vec<_> = data.blocks.iter().map(|block| (block.id, block.layer.as_str(), block.meta.array_id, block.meta.index)).collect();
		assert_eq!(blocks, vec![(5, "Bridge", 1, 0), (6, "Default", 2, 1)]);
	}

	#[test]
	fn block_save_omits_default_layer() {
		let data = LevelData {
			blocks: vec![LevelBlock {
				id: 1,
				w: 32,
				h: 32,
				..LevelBlock::default()
			}],
			..LevelData::default()
		};
		let mut out = String::new();
		write_level(&mut out, &data).expect("level saves");
		assert!(out.starts_with("BLOCK\nID:1;W:32;H:32;\nBLOCK_END\n"), "{out}");
	}

	#[test]
	fn bgo_and_npc_defaults() {
		let data = read("BGO\nID:10;ZO:-0.5;\nBGO_END\nNPC\nID:89;D:-1;GE:1;GM:25;\nNPC_END\n");
		assert_eq!(data.bgo[0].smbx64_sp, -1);
		assert_eq!(data.bgo[0].z_offset, -0.5);
		let npc = &data.npc[0];
		assert_eq!((npc.id, npc.direction, npc.generator, npc.generator_period), (89, -1, true, 25));
		assert_eq!(npc.layer, "Default");
	}

	#[test]
	fn door_copies_exit_to_missing_entrance() {
		let data = read("DOORS\nIX:5;IY:6;OX:100;OY:200;ET:1;\nDOORS_END\n");
		let door = &data.doors[0];
		assert!(!door.is_set_in);
		assert!(door.is_set_out);
		assert_eq!((door.ix, door.iy), (100, 200));
		assert_eq!((door.world_x, door.world_y), (-1, -1));
		assert_eq!(door.meta.array_id, 1);
	}

	#[test]
	fn door_copies_entrance_to_missing_exit() {
		let data = read("DOORS\nIX:5;IY:6;OX:100;OY:200;EX:1;\nDOORS_END\n");
		let door = &data.doors[0];
		assert!(door.is_set_in);
		assert!(!door.is_set_out);
		assert_eq!((door.ox, door.oy), (5, 6));
	}

	#[test]
	fn layers_upsert_by_name() {
		let data = read("LAYERS\nLR:\"Default\";LC:1;\nLR:\"Bridge\";HD:1;\nLAYERS_END\n");

		let layers: Vec<_> = data.layers.iter().map(|layer| (layer.name.as_str(), layer.locked, layer.meta.array_id, layer.meta.index)).collect();
		assert_eq!(
			layers,
			vec![("Default", true, 1, 0), ("Destroyed Blocks", false, 2, 1), ("Spawned NPCs", false, 3, 2), ("Bridge", false, 4, 3)]
		);
		assert!(data.layers[3].hidden);
	}

	#[test]
	fn script_lists_are_plain() {
		let data = read("VARIABLES\nN:\"lives\";V:\"3\";G:1;\nVARIABLES_END\nARRAYS\nN:\"coins\";\nARRAYS_END\nSCRIPTS\nN:\"main\";L:1;S:\"x = 1\\nprint(x)\";\nSCRIPTS_END\n");
		assert_eq!(data.variables[0].value, "3");
		assert!(data.variables[0].is_global);
		assert_eq!(data.arrays[0].name, "coins");
		assert_eq!(data.scripts[0].script, "x = 1\nprint(x)");
	}
}

mod unit_level_events {

	use pretty_assertions::assert_eq;

	use crate::formats::{AutoscrollStop, EventControls, LevelData, LevelEvent, read_level, write_level};
	use crate::mdx::{LineReader, MdxError};

	fn read(text: &str) -> LevelData {
		let mut data = LevelData::default();
		read_level(&mut LineReader::from_bytes(text.as_bytes()), &mut data).expect("level parses");
		data
	}

	fn event<'a>(data: &'a LevelData, name: &str) -> &'a LevelEvent {
		data.events.iter().find(|event| event.name == name).expect("event exists")
	}

	#[test]
	fn section_settings_are_padded_by_id() {
		let data = read("EVENTS_CLASSIC\nET:\"Boss\";SSS:[\"ID\\:2\\;MI\\:4\\;\"];\nEVENTS_CLASSIC_END\n");
		let boss = event(&data, "Boss");

		assert_eq!(boss.sets.len(), 3);
		assert_eq!(boss.sets[0].id, 0);
		assert_eq!(boss.sets[1].id, 1);
		assert_eq!(boss.sets[1].music_id, -1);
		assert_eq!((boss.sets[2].id, boss.sets[2].music_id), (2, 4));
		assert_eq!(boss.meta.array_id, 4);
	}

	#[test]
	fn section_settings_with_bad_id_are_rejected() {
		let text = "EVENTS_CLASSIC\nET:\"Boss\";SSS:[\"ID\\:1001\\;\"];\nEVENTS_CLASSIC_END\n";
		let mut data = LevelData::default();
		let err = read_level(&mut LineReader::from_bytes(text.as_bytes()), &mut data).expect_err("invalid id");
		assert!(matches!(err.engine_error(), MdxError::Callback { .. }));
	}

	#[test]
	fn system_event_is_replaced_in_place() {
		let data = read("EVENTS_CLASSIC\nET:\"Level - Start\";MG:\"Welcome\";\nEVENTS_CLASSIC_END\n");
		assert_eq!(data.events.len(), 3);
		let start = &data.events[0];
		assert_eq!(start.msg, "Welcome");
		assert_eq!(start.meta.array_id, 1);
		assert!(start.sets.is_empty());
	}

	#[test]
	fn controls_are_padded_and_saved_only_when_set() {
		let data = read("EVENTS_CLASSIC\nET:\"Hold\";PC:[1,0,1];\nET:\"Idle\";PC:[0];\nEVENTS_CLASSIC_END\n");
		assert_eq!(
			event(&data, "Hold").controls,
			EventControls {
				up: true,
				left: true,
				..EventControls::default()
			}
		);

		let mut out = String::new();
		write_level(&mut out, &data).expect("level saves");
		assert!(out.contains("ET:\"Hold\";PC:[1,0,1,0,0,0,0,0,0,0,0,0];\n"), "{out}");
		assert!(out.contains("ET:\"Idle\";\n"), "{out}");
	}

	#[test]
	fn timer_fields_reach_the_nested_timer() {
		let data = read("EVENTS_CLASSIC\nET:\"Clock\";TMR:1;TMC:300;TMI:1.5;TMV:1;\nEVENTS_CLASSIC_END\n");
		let timer = &event(&data, "Clock").timer;
		assert!(timer.enable);
		assert_eq!(timer.count, 300);
		assert_eq!(timer.interval, 1.5);
		assert!(timer.show);
	}

	#[test]
	fn autoscroll_path_is_read_in_stops() {
		let data = read("EVENTS_CLASSIC\nET:\"Scroll\";SSS:[\"ID\\:0\\;AS\\:1\\;ASP\\:[0\\,0\\,1\\,2\\,640\\,32\\,0\\,4]\\;\"];\nEVENTS_CLASSIC_END\n");
		let set = &event(&data, "Scroll").sets[0];
		assert!(set.autoscroll);
		assert_eq!(
			set.autoscroll_path,
			vec![
				AutoscrollStop { x: 0, y: 0, kind: 1, speed: 2 },
				AutoscrollStop {
					x: 640,
					y: 32,
					kind: 0,
					speed: 4,
				},
			]
		);

		let mut out = String::new();
		write_level(&mut out, &data).expect("level saves");
		assert!(!out.contains("ASP"), "{out}");
	}

	#[test]
	fn autoscroll_path_must_hold_whole_stops() {
		let text = "EVENTS_CLASSIC\nET:\"Scroll\";SSS:[\"ASP\\:[1\\,2\\,3]\\;\"];\nEVENTS_CLASSIC_END\n";
		let mut data = LevelData::default();
		let err = read_level(&mut LineReader::from_bytes(text.as_bytes()), &mut data).expect_err("partial stop");
		assert!(matches!(err.engine_error().root(), MdxError::MalformedTerm { .. }));
		assert!(data.meta.error_info.starts_with("bad field SSS: bad array item 0: bad field ASP"), "{}", data.meta.error_info);
	}

	#[test]
	fn legacy_music_and_background_fill_section_settings() {
		let data = read("EVENTS_CLASSIC\nET:\"Boss\";SM:[\"7\",\"3\"];SB:[\"2\"];\nEVENTS_CLASSIC_END\n");
		let sets: Vec<_> = event(&data, "Boss").sets.iter().map(|set| (set.id, set.music_id, set.background_id)).collect();
		assert_eq!(sets, vec![(0, 7, 2), (1, 3, -1)]);

		let mut out = String::new();
		write_level(&mut out, &data).expect("level saves");
		assert!(out.contains("ET:\"Boss\";SSS:[\"ID\\:0\\;MI\\:7\\;BG\\:2\\;\",\"ID\\:1\\;MI\\:3\\;\"];\n"), "{out}");
		assert!(!out.contains("SM:"), "{out}");
	}

	#[test]
	fn legacy_bounds_fill_section_positions() {
		let data = read("EVENTS_CLASSIC\nET:\"Resize\";SM:[\"1\",\"1\",\"1\"];SS:[\"-1,0,0,0\",\"100,200,300,400\"];\nEVENTS_CLASSIC_END\n");
		let sets = &event(&data, "Resize").sets;
		assert_eq!(sets.len(), 3);

		let bounds: Vec<_> = sets
			.iter()
			.map(|set| (set.position_left, set.position_top, set.position_bottom, set.position_right))
			.collect();
		assert_eq!(bounds, vec![(-1, 0, 0, 0), (100, 200, 300, 400), (-1, 0, 0, 0)]);
		assert!(sets.iter().all(|set| set.music_id == 1));
	}

	#[test]
	fn legacy_fields_after_section_settings_are_ignored() {
		let data = read("EVENTS_CLASSIC\nET:\"New\";SSS:[\"ID\\:0\\;MI\\:4\\;\"];SM:[\"9\",\"9\"];\nEVENTS_CLASSIC_END\n");
		let sets: Vec<_> = event(&data, "New").sets.iter().map(|set| (set.id, set.music_id)).collect();
		assert_eq!(sets, vec![(0, 4)]);
	}

	#[test]
	fn legacy_settings_stop_at_default_section_count() {
		let ids: Vec<String> = (0..25).map(|n| format!("\"{n}\"")).collect();
		let text = format!("EVENTS_CLASSIC\nET:\"Many\";SB:[{}];\nEVENTS_CLASSIC_END\n", ids.join(","));
		let data = read(&text);
		let sets = &event(&data, "Many").sets;
		assert_eq!(sets.len(), 21);
		assert_eq!(sets[20].background_id, 20);
	}

	#[test]
	fn legacy_values_must_be_whole_numbers() {
		let text = "EVENTS_CLASSIC\nET:\"Boss\";SM:[\"7x\"];\nEVENTS_CLASSIC_END\n";
		let mut data = LevelData::default();
		let err = read_level(&mut LineReader::from_bytes(text.as_bytes()), &mut data).expect_err("trailing letter");
		assert!(matches!(err.engine_error().root(), MdxError::UnexpectedCharacter { found: 'x' }));
		assert!(data.meta.error_info.starts_with("bad field SM"), "{}", data.meta.error_info);

		let text = "EVENTS_CLASSIC\nET:\"Boss\";SS:[\"1,2,3\"];\nEVENTS_CLASSIC_END\n";
		let err = read_level(&mut LineReader::from_bytes(text.as_bytes()), &mut data).expect_err("three bounds");
		assert!(matches!(err.engine_error().root(), MdxError::MissingDelimiter { expected: ',' }));
	}

	#[test]
	fn changed_section_settings_are_saved_as_sub_objects() {
		let mut data = LevelData::default();
		data.events[0].sets[2].music_id = 4;

		let mut out = String::new();
		write_level(&mut out, &data).expect("level saves");
		assert!(out.contains("ET:\"Level - Start\";SSS:[\"ID\\:2\\;MI\\:4\\;\"];\n"), "{out}");
	}
}

mod unit_custom_items {

	use pretty_assertions::assert_eq;

	use crate::formats::{CustomItemEntry, CustomItemKind, LevelData, read_level, write_level};
	use crate::mdx::{FileError, LineReader, MdxError};

	fn read(text: &str) -> (LevelData, Result<(), FileError>) {
		let mut data = LevelData::default();
		let result = read_level(&mut LineReader::from_bytes(text.as_bytes()), &mut data);
		(data, result)
	}

	fn section(records: &str) -> String {
		format!("CUSTOM_ITEMS_38A\n{records}\nCUSTOM_ITEMS_38A_END\n")
	}

	#[test]
	fn item_setups_are_read_and_written_back() {
		let text = section("T:1;ID:5;D:[\"1=2\",\"3=-4\"];\nT:0;ID:7;");
		let (data, result) = read(&text);
		result.expect("level parses");

		assert_eq!(data.custom_items.len(), 2);
		let bgo = &data.custom_items[0];
		assert_eq!((bgo.kind, bgo.id), (CustomItemKind::Bgo, 5));
		assert_eq!(bgo.data, vec![CustomItemEntry { key: 1, value: 2 }, CustomItemEntry { key: 3, value: -4 }]);
		assert_eq!(data.custom_items[1].kind, CustomItemKind::Block);

		let mut out = String::new();
		write_level(&mut out, &data).expect("level saves");
		assert!(out.ends_with(&text), "{out}");
	}

	#[test]
	fn item_without_kind_is_rejected() {
		let (data, result) = read(&section("ID:5;"));
		let err = result.expect_err("missing kind");
		assert!(matches!(err.engine_error(), MdxError::Callback { .. }));
		assert_eq!(data.meta.error_info, "Invalid 38A ID");
	}

	#[test]
	fn unknown_kind_is_rejected() {
		let (_, result) = read(&section("T:3;"));
		let err = result.expect_err("kind out of range");
		assert!(matches!(err.engine_error().root(), MdxError::MalformedTerm { detail: "Bad type" }));

		let (_, result) = read(&section("T:-1;"));
		let err = result.expect_err("negative kind");
		assert!(matches!(err.engine_error().root(), MdxError::IllegalNegative));
	}

	#[test]
	fn malformed_entries_are_rejected() {
		let cases = [
			("\"-1=2\"", MdxError::MalformedTerm { detail: "Negative value" }),
			("\"1-2\"", MdxError::MissingDelimiter { expected: '=' }),
			("\"1=2x\"", MdxError::MissingDelimiter { expected: '"' }),
		];
		for (entry, expected) in cases {
			let (_, result) = read(&section(&format!("T:0;D:[{entry}];")));
			let err = result.expect_err("bad entry");
			assert_eq!(err.engine_error().root().to_string(), expected.to_string(), "{entry}");
		}
	}
}
