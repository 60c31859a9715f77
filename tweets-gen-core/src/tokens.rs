/// Splits a corpus into tokens on ASCII whitespace.
///
/// Tokens are returned verbatim: no case folding, no punctuation stripping,
/// no Unicode segmentation. `"the cat sat.\nthe"` yields
/// `["the", "cat", "sat.", "the"]`.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
	text.split_ascii_whitespace()
}

/// Returns the number of tokens `tokenize` would yield.
pub fn count_tokens(text: &str) -> usize {
	tokenize(text).count()
}
