//! A crate for translating between the textual `JCOD` notation and binary
//! [Java Class Files](https://docs.oracle.com/javase/specs/jvms/se22/html/jvms-4.html).
//!
//! The [`encoder`] parses `JCOD` source and writes the class file bytes while parsing, the
//! [`decoder`] reads class file bytes and prints them back as `JCOD`. Both work purely on
//! the structure of the class file: nothing is verified or resolved.
//!
//! ```
//! use jcod::decoder::{Decoder, DecoderOptions};
//! use jcod::encoder::{Encoder, EncoderOptions};
//! use jcod::source::SourceFile;
//! use jcod::tokens::Grammar;
//!
//! let grammar = Grammar::new();
//! let source = SourceFile::new("Test.jcod", "class Test {
//!     0xCAFEBABE; 0; 52;
//!     [3] { ; Utf8 \"Test\"; class #1; }
//!     0x0021; #2; #0;
//!     [0] { } [0] { } [0] { } [0] { }
//! }");
//!
//! let encoded = Encoder::new(&grammar, EncoderOptions::default()).encode(source);
//! assert_eq!(encoded.errors, 0);
//! let bytes = &encoded.units[0].bytes;
//! assert_eq!(&bytes[..4], &[0xCA, 0xFE, 0xBA, 0xBE]);
//!
//! let decoded = Decoder::new(&grammar, DecoderOptions::default()).decode("Test.class", bytes);
//! assert!(decoded.text.starts_with("class Test {"));
//! ```

pub mod buffer;
pub mod decoder;
pub mod encoder;
pub mod model;
pub mod scanner;
pub mod source;
pub mod tokens;

mod jstring;
