//! Conversions between rust strings and the modified UTF-8 used by class files.
//!
//! The format stores `\0` using two bytes and encodes each UTF-16 code unit separately, so characters outside the
//! basic multilingual plane take six bytes.
//!
//! See <https://docs.oracle.com/javase/specs/jvms/se22/html/jvms-4.html#jvms-4.4.7>.

use java_string::{JavaStr, JavaString};

/// Encodes a string in modified UTF-8.
pub(crate) fn to_modified_utf8(string: &str) -> Vec<u8> {
	JavaStr::from_str(string).to_modified_utf8().into_owned()
}

/// Decodes modified UTF-8 into a rust string, if that string encodes back to exactly the same bytes.
///
/// This fails for invalid data, for unpaired surrogates and for non-canonical encodings.
pub(crate) fn to_printable_string(bytes: &[u8]) -> Option<String> {
	let string = JavaString::from_modified_utf8(bytes.to_vec()).ok()?;
	let string = string.as_str().ok()?.to_owned();

	(to_modified_utf8(&string) == bytes).then_some(string)
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::jstring::{to_modified_utf8, to_printable_string};

	fn round_trip(raw: &[u8], string: &str) {
		assert_eq!(to_modified_utf8(string), raw);
		assert_eq!(to_printable_string(raw).as_deref(), Some(string));
	}

	#[test]
	fn zero() {
		round_trip(&[0b1100_0000, 0b1000_0000], "\0");
	}

	#[test]
	fn one_byte() {
		round_trip(b"java/lang/Object", "java/lang/Object");
	}

	#[test]
	fn two_bytes() {
		round_trip(&[0b1100_0010, 0b1000_0000, 0b1101_1111, 0b1011_1111], "\u{0080}\u{07ff}");
	}

	#[test]
	fn three_bytes() {
		round_trip(&[0b1110_0000, 0b1010_0000, 0b1000_0000, 0b1110_1111, 0b1011_1111, 0b1011_1111], "\u{0800}\u{ffff}");
	}

	#[test]
	fn six_bytes() {
		round_trip(&[0b1110_1101, 0b1010_0000, 0b1000_0000, 0b1110_1101, 0b1011_0000, 0b1000_0000], "\u{010000}");
	}

	#[test]
	fn not_printable() {
		// an unpaired surrogate
		assert_eq!(to_printable_string(&[0b1110_1101, 0b1010_0000, 0b1000_0000]), None);
		// truncated
		assert_eq!(to_printable_string(&[0b1100_0010]), None);
	}
}
