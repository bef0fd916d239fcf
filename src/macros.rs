/// Declares a named enumeration over a raw kernel code.
///
/// Values outside the table are kept as `Other(raw)` so decoding stays
/// total. Every generated type shares [`describe`](crate::describe) for
/// display.
macro_rules! named_codes {
	(
		$(#[$meta:meta])*
		$name:ident: $repr:ty {
			$($variant:ident = $value:expr => $label:literal,)*
		}
	) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		pub enum $name {
			$($variant,)*
			Other($repr),
		}

		impl $name {
			/// Known codes and their kernel names.
			pub const TABLE: &'static [($repr, &'static str)] = &[$(($value, $label),)*];

			pub fn from_raw(raw: $repr) -> Self {
				match raw {
					$(v if v == $value => $name::$variant,)*
					other => $name::Other(other),
				}
			}

			pub fn raw(self) -> $repr {
				match self {
					$($name::$variant => $value,)*
					$name::Other(v) => v,
				}
			}

			/// Kernel name of this code, if it is a known one.
			pub fn name(self) -> Option<&'static str> {
				crate::describe(Self::TABLE, self.raw())
			}
		}

		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				match self.name() {
					Some(name) => f.write_str(name),
					None => write!(f, "unknown ({})", self.raw()),
				}
			}
		}
	};
}
