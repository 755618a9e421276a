use std::borrow::Cow;

const ELLIPSIS: char = '…';

/// Convenience methods for string slices.
///
/// Lengths are counted in `char`s, so slicing never splits a code point.
///
/// # Examples
///
/// ```
/// use nlib::ext::StrExt;
///
/// assert!("  \t".is_blank());
/// assert_eq!("héllo".left(2), "hé");
/// assert_eq!("héllo".right(3), "llo");
/// assert_eq!("a long sentence".truncate_with_ellipsis(6), "a lon…");
/// assert_eq!("UserAccountId".split_camel_case(), "User Account Id");
/// ```
pub trait StrExt {
    /// Returns true if the string is empty or only whitespace.
    fn is_blank(&self) -> bool;

    /// Returns at most the first `n` chars.
    fn left(&self, n: usize) -> &str;

    /// Returns at most the last `n` chars.
    fn right(&self, n: usize) -> &str;

    /// Shortens the string to at most `max` chars, ending in `…` when cut.
    fn truncate_with_ellipsis(&self, max: usize) -> Cow<'_, str>;

    /// Returns `default` if the string is blank, otherwise the string itself.
    fn or_if_blank<'a>(&'a self, default: &'a str) -> &'a str;

    /// Inserts a space at each word boundary of a camel-case identifier.
    ///
    /// Runs of capitals are kept together: `"HTTPServer"` becomes `"HTTP Server"`.
    fn split_camel_case(&self) -> String;
}

impl StrExt for str {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }

    fn left(&self, n: usize) -> &str {
        match self.char_indices().nth(n) {
            Some((end, _)) => &self[..end],
            None => self,
        }
    }

    fn right(&self, n: usize) -> &str {
        if n == 0 {
            return &self[self.len()..];
        }
        match self.char_indices().rev().nth(n - 1) {
            Some((start, _)) => &self[start..],
            None => self,
        }
    }

    fn truncate_with_ellipsis(&self, max: usize) -> Cow<'_, str> {
        if self.chars().count() <= max {
            return Cow::Borrowed(self);
        }
        if max == 0 {
            return Cow::Borrowed("");
        }
        let mut shortened = self.left(max - 1).to_string();
        shortened.push(ELLIPSIS);
        Cow::Owned(shortened)
    }

    fn or_if_blank<'a>(&'a self, default: &'a str) -> &'a str {
        if self.is_blank() {
            default
        } else {
            self
        }
    }

    fn split_camel_case(&self) -> String {
        let chars: Vec<char> = self.chars().collect();
        let mut out = String::with_capacity(self.len() + chars.len() / 4);

        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && c.is_uppercase() {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|next| next.is_lowercase());
                if prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next_is_lower)
                {
                    out.push(' ');
                }
            }
            out.push(c);
        }
        out
    }
}
