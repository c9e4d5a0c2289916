//! Three-state boolean properties.
//!
//! WordprocessingML toggles such as `<w:b/>` distinguish three cases: the element is
//! absent (inherit from the style hierarchy), present without a value or with a
//! true-ish value (on), or present with a false-ish value (explicitly off).

use crate::ooxml::error::Result;
use crate::ooxml::xml::writer::PrefixedWriter;
use std::fmt;
use std::io::Write;

/// A toggle property value with inheritance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriState {
    /// Not specified; the effective value comes from context
    #[default]
    Unset,
    True,
    False,
}

impl TriState {
    /// Read a toggle from element presence and its optional `val` attribute.
    ///
    /// A missing element is `Unset`. A present element with no `val` (or an empty one)
    /// is `True`. `false`/`0`/`off` give `False`; `true`/`1`/`on` and any other
    /// non-empty token give `True`.
    pub fn read(present: bool, value: Option<&str>) -> Self {
        if !present {
            return TriState::Unset;
        }
        match value.map(str::trim) {
            Some("false") | Some("0") | Some("off") => TriState::False,
            _ => TriState::True,
        }
    }

    /// Read a toggle from the `val` attribute of an element known to be present.
    #[inline]
    pub fn from_val(value: Option<&str>) -> Self {
        Self::read(true, value)
    }

    /// Resolve to a plain boolean, using `default` when unset.
    ///
    /// # Examples
    ///
    /// ```
    /// use ooxml_opc::ooxml::xml::tristate::TriState;
    ///
    /// assert!(TriState::Unset.as_bool(true));
    /// assert!(!TriState::Unset.as_bool(false));
    /// assert!(!TriState::False.as_bool(true));
    /// ```
    #[inline]
    pub fn as_bool(self, default: bool) -> bool {
        match self {
            TriState::Unset => default,
            TriState::True => true,
            TriState::False => false,
        }
    }

    #[inline]
    pub fn is_set(self) -> bool {
        self != TriState::Unset
    }

    /// The `val` attribute written for this state.
    ///
    /// `True` is written in compact form without a value, `False` carries `"0"`.
    /// `Unset` writes no element at all, so it also has no attribute.
    #[inline]
    pub fn val_attr(self) -> Option<&'static str> {
        match self {
            TriState::False => Some("0"),
            TriState::True | TriState::Unset => None,
        }
    }

    /// Write the toggle element `name`, or nothing when unset.
    pub fn write_into<W: Write>(self, writer: &mut PrefixedWriter<W>, name: &str) -> Result<()> {
        writer.tri_state(name, self)
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value { TriState::True } else { TriState::False }
    }
}

impl From<Option<bool>> for TriState {
    fn from(value: Option<bool>) -> Self {
        value.map_or(TriState::Unset, TriState::from)
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TriState::Unset => "unset",
            TriState::True => "true",
            TriState::False => "false",
        };
        f.write_str(s)
    }
}
