//! Glob wildcard detection.
//!
//! A glob without any of these characters only matches a name that is equal
//! to it (ignoring case), which is rarely what a user typing `/espg goblin`
//! expects. `{` is included because the glob engine treats brace groups as
//! alternation.

#[inline]
pub fn has_wildcards(s: &str) -> bool {
    s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b']' | b'{'))
}
