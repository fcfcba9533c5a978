mod cursor;
mod error;
mod field;
mod file;
mod io;
mod object;
mod section;
mod value;

/// Byte cursor used by value decoders.
pub use cursor::Cursor;
/// Engine and whole-file error types.
pub use error::{FileError, MdxError, Result};
pub(crate) use field::access;
/// Field descriptors and helpers.
pub use field::{CustomField, Field, FieldAccessor, LoadHook, SaveHook, SaveMode, ValueField, XtraField, skip_field, try_load, try_save};
/// File driver and error callback types.
pub use file::{ErrorFn, MdxFile, SaveErrorFn};
/// Line input and text output abstractions.
pub use io::{LineReader, TextInput, TextOutput, TextWriter};
/// Object schemas and sub-object helpers.
pub use object::{MdxObject, ObjectSchema, SchemaBuilder, load_sub_object, save_sub_object};
/// Sections and record callbacks.
pub use section::{FLUSH_THRESHOLD, LoadFn, SaveFn, Section, SectionOps, is_blank, is_section_end, skip_section};
/// Value codecs.
pub use value::{FLOAT_PRECISION, MdxValue, escape_into, format_float};
