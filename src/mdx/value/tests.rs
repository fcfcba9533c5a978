mod unit_scalar_terms {

	use crate::mdx::{Cursor, MdxError, MdxValue};

	fn load<V: MdxValue + Default>(text: &str) -> crate::mdx::Result<V> {
		let mut cur = Cursor::new(text.as_bytes());
		let mut value = V::default();
		value.load(&mut cur)?;
		assert!(cur.is_at_end(), "term {text:?} left unread bytes");
		Ok(value)
	}

	fn save<V: MdxValue>(value: &V) -> String {
		let mut out = String::new();
		assert!(value.save(&mut out), "value should write something");
		out
	}

	#[test]
	fn integers_decode_sign_and_limits() {
		assert_eq!(load::<i32>("123").expect("int parses"), 123);
		assert_eq!(load::<i32>("-5").expect("negative int parses"), -5);
		assert_eq!(load::<i32>("-2147483648").expect("min int parses"), i32::MIN);
		assert_eq!(load::<i64>("9223372036854775807").expect("max long parses"), i64::MAX);
		assert_eq!(load::<u64>("18446744073709551615").expect("max ulong parses"), u64::MAX);
	}

	#[test]
	fn integer_overflow_is_reported() {
		let err = load::<i32>("2147483648").expect_err("int overflows");
		assert!(matches!(err, MdxError::NumericOverflow { kind: "int" }));

		let err = load::<u32>("4294967296").expect_err("uint overflows");
		assert!(matches!(err, MdxError::NumericOverflow { kind: "uint" }));
	}

	#[test]
	fn double_overflowing_after_exponent_is_reported() {
		let err = load::<f64>("9e308").expect_err("product leaves double range");
		assert!(matches!(err, MdxError::NumericOverflow { kind: "double" }));

		let err = load::<f64>("-9e308").expect_err("negative product leaves double range");
		assert!(matches!(err, MdxError::NumericOverflow { kind: "double" }));

		let value = load::<f64>("1e308").expect("largest power of ten parses");
		assert!(value.is_finite());
	}

	#[test]
	fn malformed_integers_are_rejected() {
		assert!(matches!(load::<i32>("-").expect_err("bare sign"), MdxError::MalformedTerm { detail: "bad int" }));
		assert!(matches!(load::<i64>("x1").expect_err("letter"), MdxError::MalformedTerm { detail: "bad long" }));
		assert!(matches!(load::<u32>("-1").expect_err("signed uint"), MdxError::MalformedTerm { detail: "bad uint" }));
	}

	#[test]
	fn integer_stops_at_first_non_digit() {
		let mut cur = Cursor::new(b"42;rest");
		let mut value = 0_i32;
		value.load(&mut cur).expect("int parses");
		assert_eq!(value, 42);
		assert_eq!(cur.peek(), Some(b';'));
	}

	#[test]
	fn doubles_decode_fraction_and_exponent() {
		let value = load::<f64>("1.5").expect("double parses");
		assert!((value - 1.5).abs() < 1e-12);

		let value = load::<f64>("-0.25").expect("negative double parses");
		assert!((value + 0.25).abs() < 1e-12);

		let value = load::<f64>("2e3").expect("exponent parses");
		assert!((value - 2000.0).abs() < 1e-9);

		let value = load::<f64>("2E+3").expect("explicit plus exponent parses");
		assert!((value - 2000.0).abs() < 1e-9);

		let value = load::<f64>(".5").expect("leading dot parses");
		assert!((value - 0.5).abs() < 1e-12);
	}

	#[test]
	fn doubles_reject_bad_terms() {
		assert!(matches!(load::<f64>("abc").expect_err("letters"), MdxError::MalformedTerm { detail: "bad double" }));
		assert!(matches!(load::<f64>("-.").expect_err("no digits"), MdxError::MalformedTerm { detail: "bad double" }));
		assert!(matches!(load::<f64>("1e12345").expect_err("long exponent"), MdxError::MalformedTerm { detail: "bad double" }));
		assert!(matches!(load::<f64>("1e400").expect_err("huge exponent"), MdxError::NumericOverflow { kind: "double" }));
		assert!(matches!(load::<f32>("1e39").expect_err("float range"), MdxError::NumericOverflow { kind: "float" }));
	}

	#[test]
	fn floats_format_like_ten_digit_general() {
		assert_eq!(save(&0.5_f64), "0.5");
		assert_eq!(save(&100.0_f64), "100");
		assert_eq!(save(&12345.678_f64), "12345.678");
		assert_eq!(save(&(1.0_f64 / 3.0)), "0.3333333333");
		assert_eq!(save(&0.0001_f64), "0.0001");
		assert_eq!(save(&0.00001_f64), "1e-05");
		assert_eq!(save(&1e10_f64), "1e+10");
		assert_eq!(save(&-2.5_f32), "-2.5");
		assert_eq!(save(&f64::NAN), "nan");
		assert_eq!(save(&f64::INFINITY), "inf");
	}

	#[test]
	fn bools_are_single_digits() {
		assert!(load::<bool>("1").expect("true parses"));
		assert!(!load::<bool>("0").expect("false parses"));
		assert!(matches!(load::<bool>("2").expect_err("bad bool"), MdxError::MalformedTerm { detail: "bad bool" }));
		assert_eq!(save(&true), "1");
	}

	#[test]
	fn strings_unescape_structural_characters() {
		let text = load::<String>(r#""a\;b\:c\nd\"e\\f""#).expect("string parses");
		assert_eq!(text, "a;b:c\nd\"e\\f");
	}

	#[test]
	fn strings_reject_raw_structural_characters() {
		let err = load::<String>(r#""a;b""#).expect_err("raw semicolon");
		assert!(matches!(err, MdxError::UnexpectedCharacter { found: ';' }));

		let err = load::<String>(r#""a:b""#).expect_err("raw colon");
		assert!(matches!(err, MdxError::UnexpectedCharacter { found: ':' }));

		let err = load::<String>("abc").expect_err("missing quote");
		assert!(matches!(err, MdxError::MissingDelimiter { expected: '"' }));

		let err = load::<String>(r#""abc"#).expect_err("unterminated");
		assert!(matches!(err, MdxError::MissingDelimiter { expected: '"' }));
	}

	#[test]
	fn strings_escape_on_save() {
		assert_eq!(save(&String::from("x;y:z,[1]%\n")), r#""x\;y\:z\,\[1\]\%\n""#);
		assert_eq!(save(&String::new()), r#""""#);
	}
}

mod unit_list_terms {

	use crate::mdx::{Cursor, MdxError, MdxValue};

	fn load_list(text: &str) -> crate::mdx::Result<Vec<i32>> {
		let mut cur = Cursor::new(text.as_bytes());
		let mut list = vec![99];
		list.load(&mut cur)?;
		Ok(list)
	}

	#[test]
	fn lists_decode_items_in_order() {
		assert_eq!(load_list("[1,2,3]").expect("list parses"), vec![1, 2, 3]);
		assert_eq!(load_list("[]").expect("empty list parses"), Vec::<i32>::new());
	}

	#[test]
	fn dangling_comma_is_rejected() {
		let err = load_list("[1,2,]").expect_err("dangling comma");
		assert!(matches!(err, MdxError::UnexpectedCharacter { found: ']' }));
	}

	#[test]
	fn bad_item_reports_zero_based_index() {
		let err = load_list("[1,x]").expect_err("bad item");
		let MdxError::BadArrayItem { index, source } = err else {
			panic!("expected array item error");
		};
		assert_eq!(index, 1);
		assert!(matches!(*source, MdxError::MalformedTerm { detail: "bad int" }));
	}

	#[test]
	fn missing_separator_is_reported() {
		let err = load_list("[1;2]").expect_err("bad separator");
		assert!(matches!(err.root(), MdxError::MissingDelimiter { expected: ',' }));
		assert!(matches!(load_list("1,2]").expect_err("no bracket"), MdxError::MissingDelimiter { expected: '[' }));
	}

	#[test]
	fn empty_list_writes_nothing() {
		let mut out = String::from("KEEP");
		assert!(!Vec::<i32>::new().save(&mut out));
		assert_eq!(out, "KEEP");
		assert!(Vec::<i32>::new().is_default(&vec![1]));
	}

	#[test]
	fn list_of_strings_round_trips() {
		let list = vec![String::from("a,b"), String::from("]")];
		let mut out = String::new();
		assert!(list.save(&mut out));
		assert_eq!(out, r#"["a\,b","\]"]"#);

		let mut cur = Cursor::new(out.as_bytes());
		let mut loaded = Vec::<String>::new();
		loaded.load(&mut cur).expect("list parses");
		assert_eq!(loaded, list);
	}
}

mod prop_value_round_trip {

	use proptest::prelude::*;

	use crate::mdx::{Cursor, MdxValue};

	fn round_trip<V: MdxValue + Default>(value: &V) -> V {
		let mut out = String::new();
		assert!(value.save(&mut out));
		let mut cur = Cursor::new(out.as_bytes());
		let mut loaded = V::default();
		loaded.load(&mut cur).expect("saved term parses");
		assert!(cur.is_at_end());
		loaded
	}

	proptest! {
		#[test]
		fn any_string_survives_escaping(text in any::<String>()) {
			prop_assert_eq!(round_trip(&text), text);
		}

		#[test]
		fn any_long_survives(value in any::<i64>()) {
			prop_assert_eq!(round_trip(&value), value);
		}

		#[test]
		fn any_uint_survives(value in any::<u32>()) {
			prop_assert_eq!(round_trip(&value), value);
		}
	}
}
