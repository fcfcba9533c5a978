use crate::mdx::{MdxError, MdxObject, Result, TextInput, TextOutput};

#[cfg(test)]
mod tests;

/// Buffered output is handed to the stream once it grows past this size.
pub const FLUSH_THRESHOLD: usize = 2048;

/// Receives one decoded record; returning false skips the rest of the section.
pub type LoadFn<U, T> = fn(&mut U, &mut T) -> Result<bool>;

/// Fills record `index`; returning false ends the section.
pub type SaveFn<U, T> = fn(&U, &mut T, usize) -> Result<bool>;

/// Named `NAME` ... `NAME_END` block of records of type `T`.
pub struct Section<U, T> {
	name: &'static str,
	combine: bool,
	obj: T,
	reference: T,
	load: Option<LoadFn<U, T>>,
	save: Option<SaveFn<U, T>>,
}

impl<U, T: MdxObject> Section<U, T> {
	/// Section holding one record per line.
	pub fn new(name: &'static str, load: Option<LoadFn<U, T>>, save: Option<SaveFn<U, T>>) -> Self {
		Self::with_mode(name, false, load, save)
	}

	/// Section whose lines all accumulate into a single record.
	pub fn single(name: &'static str, load: Option<LoadFn<U, T>>, save: Option<SaveFn<U, T>>) -> Self {
		Self::with_mode(name, true, load, save)
	}

	fn with_mode(name: &'static str, combine: bool, load: Option<LoadFn<U, T>>, save: Option<SaveFn<U, T>>) -> Self {
		Self {
			name,
			combine,
			obj: T::default(),
			reference: T::default(),
			load,
			save,
		}
	}
}

/// Type-erased section interface driven by [`MdxFile`](crate::mdx::MdxFile).
pub trait SectionOps<U> {
	/// Literal line opening the section.
	fn name(&self) -> &str;

	/// Return the working record to its default state.
	fn reset(&mut self);

	/// Consume the section starting at `line` if it is ours and subscribed.
	///
	/// On `Ok(true)` every line up to and including `NAME_END` was read.
	fn try_load(&mut self, user: &mut U, input: &mut dyn TextInput, line: &mut Vec<u8>) -> Result<bool>;

	/// Write the section through `out`, flushing into `output` in chunks.
	fn save(&mut self, user: &U, out: &mut String, output: &mut dyn TextOutput) -> Result<()>;
}

impl<U, T: MdxObject> SectionOps<U> for Section<U, T> {
	fn name(&self) -> &str {
		self.name
	}

	fn reset(&mut self) {
		self.obj = T::default();
	}

	fn try_load(&mut self, user: &mut U, input: &mut dyn TextInput, line: &mut Vec<u8>) -> Result<bool> {
		if line.as_slice() != self.name.as_bytes() {
			return Ok(false);
		}
		let Some(load) = self.load else {
			return Ok(false);
		};

		loop {
			if !input.read_line(line)? {
				return Err(MdxError::UnterminatedSection { section: self.name.to_owned() });
			}
			if is_blank(line) {
				continue;
			}

			if line.last() == Some(&b';') {
				if !self.combine {
					self.obj = T::default();
				}
				T::schema().load(&mut self.obj, line)?;
				if !self.combine && !load(user, &mut self.obj)? {
					log::debug!("load callback ended section {} early", self.name);
					skip_section(input, self.name.as_bytes(), line)?;
					return Ok(true);
				}
			} else if is_section_end(line, self.name.as_bytes()) {
				if self.combine {
					load(user, &mut self.obj)?;
				}
				return Ok(true);
			} else {
				return Err(MdxError::MissingDelimiter { expected: ';' });
			}
		}
	}

	fn save(&mut self, user: &U, out: &mut String, output: &mut dyn TextOutput) -> Result<()> {
		let Some(save) = self.save else {
			return Ok(());
		};

		let start = out.len();
		out.push_str(self.name);
		out.push('\n');

		let mut written = 0_usize;
		let mut index = 0_usize;
		loop {
			self.obj = T::default();
			if !save(user, &mut self.obj, index)? {
				break;
			}
			index += 1;

			if T::schema().save(out, &self.obj, &self.reference) {
				out.push('\n');
				written += 1;
				if out.len() > FLUSH_THRESHOLD {
					output.write(out)?;
					out.clear();
				}
			}
		}

		if written == 0 {
			out.truncate(start);
			return Ok(());
		}

		out.push_str(self.name);
		out.push_str("_END\n");
		output.write(out)?;
		out.clear();
		log::debug!("saved section {} with {written} records", self.name);
		Ok(())
	}
}

/// Return true for empty lines and lines made of spaces only.
pub fn is_blank(line: &[u8]) -> bool {
	line.iter().all(|&byte| byte == b' ')
}

/// Return true when `line` is exactly `name` followed by `_END`.
pub fn is_section_end(line: &[u8], name: &[u8]) -> bool {
	line.len() == name.len() + 4 && line.starts_with(name) && line.ends_with(b"_END")
}

/// Read and discard lines up to and including the `NAME_END` marker.
pub fn skip_section(input: &mut dyn TextInput, name: &[u8], line: &mut Vec<u8>) -> Result<()> {
	while input.read_line(line)? {
		if is_section_end(line, name) {
			return Ok(());
		}
	}
	Err(MdxError::UnterminatedSection {
		section: String::from_utf8_lossy(name).into_owned(),
	})
}
