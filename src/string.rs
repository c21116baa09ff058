//! CompactString: small-buffer string with a shared copy-on-write heap block.
//!
//! Content of up to [`INLINE_CAPACITY`] bytes lives inside the value
//! itself. Longer content moves to a heap block behind an `Rc`; cloning a
//! heap string only bumps the count, and the first mutation through a
//! shared block clones it (`Rc::make_mut`). Growth past the inline limit
//! promotes Inline to heap; a mutation never demotes on its own, only
//! `clear` and `shrink` return to the inline form.
//!
//! Both forms keep a NUL after the content so C consumers can borrow the
//! bytes directly (`as_bytes_with_nul`, `as_c_str`).
//!
//! Byte offsets taken by `insert`, `remove`, `trim`, `find_from` and the
//! substring helpers are UTF-8 byte positions, as with `str`.

use core::borrow::Borrow;
use core::cmp::Ordering;
use core::ffi::CStr;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{Add, AddAssign, Deref};
use std::rc::Rc;

/// Longest content kept inline.
pub const INLINE_CAPACITY: usize = 14;

/// Inline block: content, zero fill through byte 14, length in byte 15.
const BLOCK: usize = 16;
const LEN_AT: usize = BLOCK - 1;

#[derive(Clone)]
enum Repr {
    Inline([u8; BLOCK]),
    /// Content followed by one NUL byte.
    Shared(Rc<Vec<u8>>),
}

#[derive(Clone)]
pub struct CompactString {
    repr: Repr,
}

fn inline_block(bytes: &[u8]) -> [u8; BLOCK] {
    debug_assert!(bytes.len() <= INLINE_CAPACITY);
    let mut buf = [0u8; BLOCK];
    buf[..bytes.len()].copy_from_slice(bytes);
    buf[LEN_AT] = bytes.len() as u8;
    buf
}

fn heap_block(bytes: &[u8], capacity: usize) -> Vec<u8> {
    let mut v = Vec::with_capacity(capacity.max(bytes.len()) + 1);
    v.extend_from_slice(bytes);
    v.push(0);
    v
}

impl CompactString {
    pub const fn new() -> Self {
        Self {
            repr: Repr::Inline([0; BLOCK]),
        }
    }

    /// `bytes` must be valid UTF-8.
    fn from_utf8_bytes(bytes: &[u8]) -> Self {
        if bytes.len() <= INLINE_CAPACITY {
            Self {
                repr: Repr::Inline(inline_block(bytes)),
            }
        } else {
            Self {
                repr: Repr::Shared(Rc::new(heap_block(bytes, 0))),
            }
        }
    }

    pub fn from_utf8(bytes: &[u8]) -> Result<Self, core::str::Utf8Error> {
        core::str::from_utf8(bytes)?;
        Ok(Self::from_utf8_bytes(bytes))
    }

    /// `n` copies of `c`.
    pub fn repeat_char(c: char, n: usize) -> Self {
        let mut s = Self::new();
        s.cat_n(c, n);
        s
    }

    #[inline]
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Inline(buf) => buf[LEN_AT] as usize,
            Repr::Shared(v) => v.len() - 1,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_inline(&self) -> bool {
        matches!(self.repr, Repr::Inline(_))
    }

    /// True when the content lives in a heap block, whether or not other
    /// strings share it.
    #[inline]
    pub fn is_shared(&self) -> bool {
        matches!(self.repr, Repr::Shared(_))
    }

    /// Number of strings sharing the heap block; 0 for inline content.
    pub fn ref_count(&self) -> usize {
        match &self.repr {
            Repr::Inline(_) => 0,
            Repr::Shared(v) => Rc::strong_count(v),
        }
    }

    /// Bytes that fit without reallocating.
    pub fn capacity(&self) -> usize {
        match &self.repr {
            Repr::Inline(_) => INLINE_CAPACITY,
            Repr::Shared(v) => v.capacity() - 1,
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.repr {
            Repr::Inline(buf) => &buf[..buf[LEN_AT] as usize],
            Repr::Shared(v) => &v[..v.len() - 1],
        }
    }

    /// Content plus its terminating NUL.
    #[inline]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        match &self.repr {
            Repr::Inline(buf) => &buf[..buf[LEN_AT] as usize + 1],
            Repr::Shared(v) => &v[..],
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        // SAFETY: every constructor and edit only stores UTF-8 and only
        // splits content at char boundaries.
        unsafe { core::str::from_utf8_unchecked(self.as_bytes()) }
    }

    /// `None` if the content holds an interior NUL.
    pub fn as_c_str(&self) -> Option<&CStr> {
        CStr::from_bytes_with_nul(self.as_bytes_with_nul()).ok()
    }

    /// Replace `remove` bytes at `at` with `insert`. Offsets must be char
    /// boundaries and in range; callers check.
    fn splice(&mut self, at: usize, remove: usize, insert: &[u8]) {
        let len = self.len();
        debug_assert!(at + remove <= len);
        let new_len = len - remove + insert.len();
        let promoted = match &mut self.repr {
            Repr::Inline(buf) if new_len <= INLINE_CAPACITY => {
                buf.copy_within(at + remove..len, at + insert.len());
                buf[at..at + insert.len()].copy_from_slice(insert);
                buf[new_len..LEN_AT].fill(0);
                buf[LEN_AT] = new_len as u8;
                None
            }
            Repr::Inline(buf) => {
                let mut v = Vec::with_capacity(new_len + 1);
                v.extend_from_slice(&buf[..at]);
                v.extend_from_slice(insert);
                v.extend_from_slice(&buf[at + remove..len]);
                v.push(0);
                Some(v)
            }
            Repr::Shared(rc) => {
                if Rc::strong_count(rc) > 1 {
                    log::trace!("CompactString: copy-on-write split of {} bytes", len);
                }
                let v = Rc::make_mut(rc);
                v.pop();
                v.splice(at..at + remove, insert.iter().copied());
                v.push(0);
                None
            }
        };
        if let Some(v) = promoted {
            log::trace!("CompactString: promoted to heap at {} bytes", new_len);
            self.repr = Repr::Shared(Rc::new(v));
        }
    }

    /// Append `s`.
    pub fn cat(&mut self, s: &str) -> &mut Self {
        let len = self.len();
        self.splice(len, 0, s.as_bytes());
        self
    }

    pub fn cat_char(&mut self, c: char) -> &mut Self {
        let mut tmp = [0u8; 4];
        self.cat(c.encode_utf8(&mut tmp))
    }

    /// Append `n` copies of `c`.
    pub fn cat_n(&mut self, c: char, n: usize) -> &mut Self {
        if n == 0 {
            return self;
        }
        let mut tmp = [0u8; 4];
        let unit = c.encode_utf8(&mut tmp).as_bytes();
        let total = self.len() + unit.len() * n;
        self.reserve(total);
        let bytes = unit.repeat(n);
        let len = self.len();
        self.splice(len, 0, &bytes);
        self
    }

    /// Insert `s` at byte offset `at`; false if `at` is past the end or
    /// not on a char boundary.
    pub fn insert(&mut self, at: usize, s: &str) -> bool {
        if !self.as_str().is_char_boundary(at) {
            return false;
        }
        self.splice(at, 0, s.as_bytes());
        true
    }

    /// Remove `count` bytes starting at `at`. Panics if the range is out
    /// of bounds or splits a character.
    pub fn remove(&mut self, at: usize, count: usize) {
        let len = self.len();
        let end = at.checked_add(count);
        assert!(
            matches!(end, Some(e) if e <= len),
            "CompactString::remove: range {}+{} out of bounds (len {})",
            at,
            count,
            len
        );
        let end = at + count;
        let s = self.as_str();
        assert!(
            s.is_char_boundary(at) && s.is_char_boundary(end),
            "CompactString::remove: range {}..{} splits a character",
            at,
            end
        );
        if count > 0 {
            self.splice(at, count, &[]);
        }
    }

    /// Cut the content down to `len` bytes. Panics past the end or inside
    /// a character.
    pub fn trim(&mut self, len: usize) {
        let cur = self.len();
        assert!(len <= cur, "CompactString::trim: {} exceeds length {}", len, cur);
        self.remove(len, cur - len);
    }

    /// Back to the empty inline form, releasing any heap block.
    pub fn clear(&mut self) {
        self.repr = Repr::Inline([0; BLOCK]);
    }

    /// Make room for `total` bytes of content. Moves to the heap when
    /// `total` exceeds the inline capacity.
    pub fn reserve(&mut self, total: usize) {
        let unique = match &self.repr {
            Repr::Inline(_) => true,
            Repr::Shared(rc) => Rc::strong_count(rc) == 1,
        };
        if unique && total <= self.capacity() {
            return;
        }
        let promoted = match &mut self.repr {
            Repr::Inline(_) if total <= INLINE_CAPACITY => None,
            Repr::Inline(buf) => Some(heap_block(&buf[..buf[LEN_AT] as usize], total)),
            Repr::Shared(rc) => {
                let v = Rc::make_mut(rc);
                if total + 1 > v.len() {
                    v.reserve_exact(total + 1 - v.len());
                }
                None
            }
        };
        if let Some(v) = promoted {
            self.repr = Repr::Shared(Rc::new(v));
        }
    }

    /// Drop spare heap capacity; content that fits inline is moved back
    /// inline. A block shared with other strings is left alone.
    pub fn shrink(&mut self) {
        let len = self.len();
        let demote = match &mut self.repr {
            Repr::Inline(_) => false,
            Repr::Shared(rc) => match Rc::get_mut(rc) {
                Some(v) if len > INLINE_CAPACITY => {
                    v.shrink_to_fit();
                    false
                }
                Some(_) => true,
                None => false,
            },
        };
        if demote {
            self.repr = Repr::Inline(inline_block(self.as_bytes()));
        }
    }

    pub fn find(&self, pat: &str) -> Option<usize> {
        self.as_str().find(pat)
    }

    /// First match of `pat` at or after byte offset `from`.
    pub fn find_from(&self, pat: &str, from: usize) -> Option<usize> {
        let tail = self.as_str().get(from..)?;
        tail.find(pat).map(|i| i + from)
    }

    pub fn reverse_find(&self, pat: &str) -> Option<usize> {
        self.as_str().rfind(pat)
    }

    #[inline]
    pub fn starts_with(&self, pat: &str) -> bool {
        self.as_str().starts_with(pat)
    }

    #[inline]
    pub fn ends_with(&self, pat: &str) -> bool {
        self.as_str().ends_with(pat)
    }

    /// Replace every occurrence of `from` with `to`; returns the count.
    /// An empty `from` matches nothing.
    pub fn replace(&mut self, from: &str, to: &str) -> usize {
        if from.is_empty() {
            return 0;
        }
        let n = self.as_str().matches(from).count();
        if n == 0 {
            return 0;
        }
        let replaced = self.as_str().replace(from, to);
        match &mut self.repr {
            Repr::Shared(rc) if Rc::strong_count(rc) == 1 => {
                if let Some(v) = Rc::get_mut(rc) {
                    v.clear();
                    v.extend_from_slice(replaced.as_bytes());
                    v.push(0);
                }
            }
            Repr::Shared(rc) => {
                log::trace!("CompactString: copy-on-write split of {} bytes", rc.len() - 1);
                let mut v = replaced.into_bytes();
                v.push(0);
                *rc = Rc::new(v);
            }
            Repr::Inline(_) => *self = Self::from(replaced),
        }
        n
    }

    /// Up to `count` bytes starting at `from`, clamped to the content.
    /// Empty when the clamped range does not fall on char boundaries.
    pub fn mid(&self, from: usize, count: usize) -> CompactString {
        let len = self.len();
        let start = from.min(len);
        let end = start.saturating_add(count).min(len);
        CompactString::from(self.as_str().get(start..end).unwrap_or(""))
    }

    pub fn left(&self, n: usize) -> CompactString {
        self.mid(0, n)
    }

    /// The last `n` bytes (all of them if `n` exceeds the length).
    pub fn right(&self, n: usize) -> CompactString {
        let len = self.len();
        self.mid(len - n.min(len), n)
    }

    /// Content equality. Two inline strings compare as one 16-byte block.
    #[inline]
    pub fn is_equal(&self, other: &CompactString) -> bool {
        match (&self.repr, &other.repr) {
            (Repr::Inline(a), Repr::Inline(b)) => a == b,
            (Repr::Shared(a), Repr::Shared(b)) if Rc::ptr_eq(a, b) => true,
            _ => self.as_bytes() == other.as_bytes(),
        }
    }

    /// Byte-wise ordering.
    pub fn compare(&self, other: &CompactString) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Default for CompactString {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for CompactString {
    fn from(s: &str) -> Self {
        Self::from_utf8_bytes(s.as_bytes())
    }
}

impl From<&String> for CompactString {
    fn from(s: &String) -> Self {
        Self::from(s.as_str())
    }
}

/// Long strings keep their allocation; only the NUL is appended.
impl From<String> for CompactString {
    fn from(s: String) -> Self {
        if s.len() <= INLINE_CAPACITY {
            return Self::from(s.as_str());
        }
        let mut v = s.into_bytes();
        v.push(0);
        Self {
            repr: Repr::Shared(Rc::new(v)),
        }
    }
}

impl From<char> for CompactString {
    fn from(c: char) -> Self {
        let mut tmp = [0u8; 4];
        Self::from(&*c.encode_utf8(&mut tmp))
    }
}

impl From<CompactString> for String {
    fn from(s: CompactString) -> Self {
        s.as_str().to_owned()
    }
}

impl Deref for CompactString {
    type Target = str;
    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for CompactString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<[u8]> for CompactString {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Borrow<str> for CompactString {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for CompactString {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other)
    }
}

impl Eq for CompactString {}

impl PartialEq<str> for CompactString {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for CompactString {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<String> for CompactString {
    fn eq(&self, other: &String) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<CompactString> for &str {
    fn eq(&self, other: &CompactString) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialOrd for CompactString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CompactString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

/// Hashes exactly like `str`, so a `CompactString` key can be looked up by `&str`.
impl Hash for CompactString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for CompactString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl fmt::Debug for CompactString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Write for CompactString {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.cat(s);
        Ok(())
    }

    fn write_char(&mut self, c: char) -> fmt::Result {
        self.cat_char(c);
        Ok(())
    }
}

impl Add<&str> for CompactString {
    type Output = CompactString;
    fn add(mut self, rhs: &str) -> CompactString {
        self.cat(rhs);
        self
    }
}

impl AddAssign<&str> for CompactString {
    fn add_assign(&mut self, rhs: &str) {
        self.cat(rhs);
    }
}

impl FromIterator<char> for CompactString {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        let mut s = CompactString::new();
        s.extend(iter);
        s
    }
}

impl<'a> FromIterator<&'a str> for CompactString {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut s = CompactString::new();
        s.extend(iter);
        s
    }
}

impl Extend<char> for CompactString {
    fn extend<I: IntoIterator<Item = char>>(&mut self, iter: I) {
        for c in iter {
            self.cat_char(c);
        }
    }
}

impl<'a> Extend<&'a str> for CompactString {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        for s in iter {
            self.cat(s);
        }
    }
}
