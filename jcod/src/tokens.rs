//! The lookup tables of the `JCOD` grammar.
//!
//! A [`Grammar`] is built once and then shared by reference between the scanner, the encoder and the decoder.
use std::collections::HashMap;

/// The grammatical role of a token.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Category {
	/// Anything carrying a value, like numbers, strings and identifiers.
	Value,
	Keyword,
	Punctuation,
	/// End of input and scanning errors.
	Marker,
}

/// The kind of the token the scanner produced.
///
/// The discriminant is the numeric tag of the token in [`Grammar::token`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
	Eof = 0,
	Error,
	/// A numeric literal, also produced for constant pool tag names.
	Number,
	/// A constant pool index, written as `#12`.
	CpIndex,
	String,
	/// A `'...'` literal, already encoded in modified UTF-8.
	Chars,
	/// A hex literal too long for a number.
	HexBytes,
	Ident,
	/// An identifier containing `/`, `.` or `-`.
	Compound,
	LBrace,
	RBrace,
	LBracket,
	RBracket,
	LParen,
	RParen,
	Comma,
	Semicolon,
	Class,
	Interface,
	Module,
	File,
	Attr,
	Bytes,
}

impl TokenKind {
	/// Whether this keyword starts a compilation unit.
	pub fn starts_unit(self) -> bool {
		matches!(self, TokenKind::Class | TokenKind::Interface | TokenKind::Module | TokenKind::File)
	}
}

/// The static description of a [`TokenKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	pub kind: TokenKind,
	/// The numeric tag, equal to the discriminant of `kind`.
	pub tag: u8,
	/// The name used in messages.
	pub name: &'static str,
	/// The text the scanner recognizes, empty for tokens without fixed spelling.
	pub key: &'static str,
	pub category: Category,
}

const fn token(kind: TokenKind, name: &'static str, key: &'static str, category: Category) -> Token {
	Token { kind, tag: kind as u8, name, key, category }
}

const TOKENS: &[Token] = &[
	token(TokenKind::Eof, "end of input", "", Category::Marker),
	token(TokenKind::Error, "error", "", Category::Marker),
	token(TokenKind::Number, "number", "", Category::Value),
	token(TokenKind::CpIndex, "constant pool index", "", Category::Value),
	token(TokenKind::String, "string", "", Category::Value),
	token(TokenKind::Chars, "character array", "", Category::Value),
	token(TokenKind::HexBytes, "byte string", "", Category::Value),
	token(TokenKind::Ident, "identifier", "", Category::Value),
	token(TokenKind::Compound, "compound name", "", Category::Value),
	token(TokenKind::LBrace, "'{'", "{", Category::Punctuation),
	token(TokenKind::RBrace, "'}'", "}", Category::Punctuation),
	token(TokenKind::LBracket, "'['", "[", Category::Punctuation),
	token(TokenKind::RBracket, "']'", "]", Category::Punctuation),
	token(TokenKind::LParen, "'('", "(", Category::Punctuation),
	token(TokenKind::RParen, "')'", ")", Category::Punctuation),
	token(TokenKind::Comma, "','", ",", Category::Punctuation),
	token(TokenKind::Semicolon, "';'", ";", Category::Punctuation),
	token(TokenKind::Class, "class", "class", Category::Keyword),
	token(TokenKind::Interface, "interface", "interface", Category::Keyword),
	token(TokenKind::Module, "module", "module", Category::Keyword),
	token(TokenKind::File, "file", "file", Category::Keyword),
	token(TokenKind::Attr, "Attr", "Attr", Category::Keyword),
	token(TokenKind::Bytes, "Bytes", "Bytes", Category::Keyword),
];

/// Additional spellings of keywords.
const KEYWORD_ALIASES: &[(&str, TokenKind)] = &[
	("attr", TokenKind::Attr),
	("bytes", TokenKind::Bytes),
];

/// A constant pool tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstType {
	pub tag: u8,
	/// The name the decoder prints.
	pub name: &'static str,
	/// An alternative name the scanner accepts.
	pub key: &'static str,
}

const fn const_type(tag: u8, name: &'static str, key: &'static str) -> ConstType {
	ConstType { tag, name, key }
}

pub mod pool {
	pub const UTF8: u8 = 1;
	pub const INTEGER: u8 = 3;
	pub const FLOAT: u8 = 4;
	pub const LONG: u8 = 5;
	pub const DOUBLE: u8 = 6;
	pub const CLASS: u8 = 7;
	pub const STRING: u8 = 8;
	pub const FIELD_REF: u8 = 9;
	pub const METHOD_REF: u8 = 10;
	pub const INTERFACE_METHOD_REF: u8 = 11;
	pub const NAME_AND_TYPE: u8 = 12;
	pub const METHOD_HANDLE: u8 = 15;
	pub const METHOD_TYPE: u8 = 16;
	pub const DYNAMIC: u8 = 17;
	pub const INVOKE_DYNAMIC: u8 = 18;
	pub const MODULE: u8 = 19;
	pub const PACKAGE: u8 = 20;
}

const CONST_TYPES: &[ConstType] = &[
	const_type(pool::UTF8, "Utf8", "Utf8"),
	const_type(pool::INTEGER, "int", "Integer"),
	const_type(pool::FLOAT, "float", "Float"),
	const_type(pool::LONG, "long", "Long"),
	const_type(pool::DOUBLE, "double", "Double"),
	// `class` itself is a keyword, the encoder turns it into this tag inside a struct
	const_type(pool::CLASS, "class", "Class"),
	const_type(pool::STRING, "String", "String"),
	const_type(pool::FIELD_REF, "Field", "Fieldref"),
	const_type(pool::METHOD_REF, "Method", "Methodref"),
	const_type(pool::INTERFACE_METHOD_REF, "InterfaceMethod", "InterfaceMethodref"),
	const_type(pool::NAME_AND_TYPE, "NameAndType", "NameAndType"),
	const_type(pool::METHOD_HANDLE, "MethodHandle", "MethodHandle"),
	const_type(pool::METHOD_TYPE, "MethodType", "MethodType"),
	const_type(pool::DYNAMIC, "Dynamic", "ConstantDynamic"),
	const_type(pool::INVOKE_DYNAMIC, "InvokeDynamic", "InvokeDynamic"),
	const_type(pool::MODULE, "Module", "Module"),
	const_type(pool::PACKAGE, "Package", "Package"),
];

/// The immutable lookup tables for tokens, keywords and constant pool tags.
#[derive(Debug, Clone)]
pub struct Grammar {
	/// Indexed by [`Token::tag`].
	tokens: Vec<Token>,
	keywords: HashMap<&'static str, TokenKind>,
	/// Indexed by the constant pool tag.
	const_types: Vec<Option<ConstType>>,
	const_names: HashMap<&'static str, u8>,
}

impl Grammar {
	pub fn new() -> Grammar {
		let tokens = TOKENS.to_vec();
		debug_assert!(tokens.iter().enumerate().all(|(i, token)| token.tag as usize == i));

		let keywords = tokens.iter()
			.filter(|token| token.category == Category::Keyword)
			.map(|token| (token.key, token.kind))
			.chain(KEYWORD_ALIASES.iter().copied())
			.collect();

		let mut const_types = vec![None; 1 + CONST_TYPES.iter().map(|c| c.tag as usize).max().unwrap_or(0)];
		let mut const_names = HashMap::new();
		for c in CONST_TYPES {
			const_names.insert(c.name, c.tag);
			const_names.insert(c.key, c.tag);
			const_types[c.tag as usize] = Some(c.clone());
		}

		Grammar { tokens, keywords, const_types, const_names }
	}

	pub fn token(&self, kind: TokenKind) -> &Token {
		&self.tokens[kind as usize]
	}

	/// Finds the token with the given name, as used in messages.
	pub fn token_by_name(&self, name: &str) -> Option<&Token> {
		self.tokens.iter().find(|token| token.name == name)
	}

	pub fn keyword(&self, ident: &str) -> Option<TokenKind> {
		self.keywords.get(ident).copied()
	}

	pub fn const_type(&self, tag: u8) -> Option<&ConstType> {
		self.const_types.get(tag as usize)?.as_ref()
	}

	/// Looks up a constant pool tag by its printed name or its alternative name.
	pub fn const_tag(&self, name: &str) -> Option<u8> {
		self.const_names.get(name).copied()
	}
}

impl Default for Grammar {
	fn default() -> Self {
		Grammar::new()
	}
}
