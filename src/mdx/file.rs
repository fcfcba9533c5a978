use crate::mdx::section::{is_blank, skip_section};
use crate::mdx::{FileError, MdxError, MdxObject, Result, Section, SectionOps, TextInput, TextOutput};


/// Called once with the failure report before a failed load returns.
pub type ErrorFn<U> = fn(&mut U, &FileError);

/// Called once with the failure report before a failed save returns.
///
/// The save source is only borrowed shared, so state the callback wants to
/// keep has to live behind interior mutability.
pub type SaveErrorFn<U> = fn(&U, &FileError);

/// Ordered set of sections making up one file kind.
///
/// `U` is the caller's load target (or save source) handed to every callback.
pub struct MdxFile<'a, U> {
	sections: Vec<Box<dyn SectionOps<U> + 'a>>,
}

impl<U> Default for MdxFile<'_, U> {
	fn default() -> Self {
		Self { sections: Vec::new() }
	}
}

impl<'a, U: 'a> MdxFile<'a, U> {
	/// Create a file with no sections.
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a section; order here is the order sections are saved in.
	pub fn section<T: MdxObject>(mut self, section: Section<U, T>) -> Self {
		self.sections.push(Box::new(section));
		self
	}

	/// Return the section names in save order.
	pub fn section_names(&self) -> impl Iterator<Item = &str> {
		self.sections.iter().map(|section| section.name())
	}

	/// Read every section of `input`, dispatching records to the load callbacks.
	///
	/// An [`MdxError::Interrupt`] raised by a callback ends the load early and
	/// counts as success. Any other failure is reported to `on_error` and
	/// returned with the failing line attached.
	pub fn load(&mut self, input: &mut dyn TextInput, user: &mut U, on_error: Option<ErrorFn<U>>) -> std::result::Result<(), FileError> {
		let mut line = Vec::new();
		match self.load_lines(input, user, &mut line) {
			Ok(()) => Ok(()),
			Err(MdxError::Interrupt) => {
				log::debug!("load interrupted at line {}", input.line_number());
				Ok(())
			}
			Err(source) => {
				let err = FileError::Load {
					line_number: input.line_number(),
					line: String::from_utf8_lossy(&line).into_owned(),
					source,
				};
				log::debug!("{err}");
				if let Some(on_error) = on_error {
					on_error(user, &err);
				}
				Err(err)
			}
		}
	}

	fn load_lines(&mut self, input: &mut dyn TextInput, user: &mut U, line: &mut Vec<u8>) -> Result<()> {
		for section in &mut self.sections {
			section.reset();
		}
		input.rewind()?;

		'lines: while input.read_line(line)? {
			for section in &mut self.sections {
				if section.try_load(user, input, line)? {
					continue 'lines;
				}
			}

			if is_blank(line) {
				continue;
			}
			if line.contains(&0) {
				return Err(MdxError::BadSectionName);
			}

			let name = std::mem::take(line);
			log::debug!("skipping section {}", String::from_utf8_lossy(&name));
			skip_section(input, &name, line)?;
		}
		Ok(())
	}

	/// Write every section that has a save callback, in declaration order.
	///
	/// A failure is reported to `on_error` and returned.
	pub fn save(&mut self, output: &mut dyn TextOutput, user: &U, on_error: Option<SaveErrorFn<U>>) -> std::result::Result<(), FileError> {
		let mut out = String::new();
		let result = self
			.sections
			.iter_mut()
			.try_for_each(|section| section.save(user, &mut out, output))
			.and_then(|()| output.flush());

		let Err(source) = result else {
			return Ok(());
		};
		let err = FileError::Save { source };
		log::debug!("{err}");
		if let Some(on_error) = on_error {
			on_error(user, &err);
		}
		Err(err)
	}
}

/// Declare a file kind as a pair of callback tables.
///
/// Every `slot: Type = "NAME"` line declares one section, saved in the order
/// listed. Append `, single` for sections that collect all their lines into
/// one record. Both tables get an `on_error` slot; the load table gets a
/// `load` method and the save table a `save` method. Unset slots skip their
/// section.
#[macro_export]
macro_rules! mdx_file_callbacks {
	(@section $name:literal, $load:expr, $save:expr) => {
		$crate::mdx::Section::new($name, $load, $save)
	};
	(@section $name:literal, $load:expr, $save:expr, single) => {
		$crate::mdx::Section::single($name, $load, $save)
	};
	(
		$(#[$load_meta:meta])*
		load $load:ident;
		$(#[$save_meta:meta])*
		save $save:ident;
		$(
			$(#[$slot_meta:meta])*
			$slot:ident: $ty:ty = $name:literal $(, $single:ident)?;
		)+
	) => {
		$(#[$load_meta])*
		pub struct $load<U> {
			/// Receives the failure report when loading fails.
			pub on_error: ::core::option::Option<$crate::mdx::ErrorFn<U>>,
			$(
				$(#[$slot_meta])*
				pub $slot: ::core::option::Option<$crate::mdx::LoadFn<U, $ty>>,
			)+
		}

		impl<U> ::core::default::Default for $load<U> {
			fn default() -> Self {
				Self {
					on_error: None,
					$($slot: None,)+
				}
			}
		}

		impl<U> $load<U> {
			/// Load `input` into `user` through the subscribed slots.
			pub fn load(&self, input: &mut dyn $crate::mdx::TextInput, user: &mut U) -> ::core::result::Result<(), $crate::mdx::FileError> {
				let mut file = $crate::mdx::MdxFile::new();
				$(
					file = file.section($crate::mdx_file_callbacks!(@section $name, self.$slot, None $(, $single)?));
				)+
				file.load(input, user, self.on_error)
			}
		}

		$(#[$save_meta])*
		pub struct $save<U> {
			/// Receives the failure report when saving fails.
			pub on_error: ::core::option::Option<$crate::mdx::SaveErrorFn<U>>,
			$(
				$(#[$slot_meta])*
				pub $slot: ::core::option::Option<$crate::mdx::SaveFn<U, $ty>>,
			)+
		}

		impl<U> ::core::default::Default for $save<U> {
			fn default() -> Self {
				Self {
					on_error: None,
					$($slot: None,)+
				}
			}
		}

		impl<U> $save<U> {
			/// Save `user` into `output` through the populated slots.
			pub fn save(&self, output: &mut dyn $crate::mdx::TextOutput, user: &U) -> ::core::result::Result<(), $crate::mdx::FileError> {
				let mut file = $crate::mdx::MdxFile::new();
				$(
					file = file.section($crate::mdx_file_callbacks!(@section $name, None, self.$slot $(, $single)?));
				)+
				file.save(output, user, self.on_error)
			}
		}
	};
}
