//! Deterministic color assignment for record types
//!
//! Every type string maps to one entry of a fixed 30-color palette. `PP` and
//! `DL` are pinned to the first two entries; anything else is placed by a
//! string hash, so the same type always gets the same color.

use colored::Color;
use serde::Serialize;

/// Style classes for one palette entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeColors {
    pub background: &'static str,
    pub border: &'static str,
    pub text: &'static str,
    pub badge: &'static str,
}

impl TypeColors {
    const fn new(
        background: &'static str,
        border: &'static str,
        text: &'static str,
        badge: &'static str,
    ) -> Self {
        Self {
            background,
            border,
            text,
            badge,
        }
    }

    /// Color family, e.g. `pink` for `bg-pink-50`
    pub fn family(&self) -> &'static str {
        let rest = self.background.strip_prefix("bg-").unwrap_or(self.background);
        rest.rsplit_once('-').map_or(rest, |(family, _)| family)
    }

    /// Closest terminal color for the family
    pub fn terminal_color(&self) -> Color {
        match self.family() {
            "pink" | "rose" | "fuchsia" => Color::BrightMagenta,
            "purple" | "violet" => Color::Magenta,
            "blue" | "indigo" => Color::Blue,
            "sky" | "cyan" => Color::Cyan,
            "teal" | "emerald" | "green" => Color::Green,
            "lime" => Color::BrightGreen,
            "yellow" | "amber" => Color::Yellow,
            "orange" => Color::BrightYellow,
            "red" => Color::Red,
            _ => Color::BrightBlack,
        }
    }
}

/// Colors for records without a type
pub const UNTYPED: TypeColors = TypeColors::new(
    "bg-gray-50",
    "border-gray-200",
    "text-gray-800",
    "bg-gray-100 text-gray-700",
);

pub const PALETTE: [TypeColors; 30] = [
    TypeColors::new("bg-pink-50", "border-pink-200", "text-pink-800", "bg-pink-100 text-pink-700"),
    TypeColors::new("bg-purple-50", "border-purple-200", "text-purple-800", "bg-purple-100 text-purple-700"),
    TypeColors::new("bg-blue-50", "border-blue-200", "text-blue-800", "bg-blue-100 text-blue-700"),
    TypeColors::new("bg-green-50", "border-green-200", "text-green-800", "bg-green-100 text-green-700"),
    TypeColors::new("bg-yellow-50", "border-yellow-200", "text-yellow-800", "bg-yellow-100 text-yellow-700"),
    TypeColors::new("bg-orange-50", "border-orange-200", "text-orange-800", "bg-orange-100 text-orange-700"),
    TypeColors::new("bg-red-50", "border-red-200", "text-red-800", "bg-red-100 text-red-700"),
    TypeColors::new("bg-indigo-50", "border-indigo-200", "text-indigo-800", "bg-indigo-100 text-indigo-700"),
    TypeColors::new("bg-teal-50", "border-teal-200", "text-teal-800", "bg-teal-100 text-teal-700"),
    TypeColors::new("bg-cyan-50", "border-cyan-200", "text-cyan-800", "bg-cyan-100 text-cyan-700"),
    TypeColors::new("bg-emerald-50", "border-emerald-200", "text-emerald-800", "bg-emerald-100 text-emerald-700"),
    TypeColors::new("bg-lime-50", "border-lime-200", "text-lime-800", "bg-lime-100 text-lime-700"),
    TypeColors::new("bg-amber-50", "border-amber-200", "text-amber-800", "bg-amber-100 text-amber-700"),
    TypeColors::new("bg-rose-50", "border-rose-200", "text-rose-800", "bg-rose-100 text-rose-700"),
    TypeColors::new("bg-violet-50", "border-violet-200", "text-violet-800", "bg-violet-100 text-violet-700"),
    TypeColors::new("bg-fuchsia-50", "border-fuchsia-200", "text-fuchsia-800", "bg-fuchsia-100 text-fuchsia-700"),
    TypeColors::new("bg-sky-50", "border-sky-200", "text-sky-800", "bg-sky-100 text-sky-700"),
    TypeColors::new("bg-slate-50", "border-slate-200", "text-slate-800", "bg-slate-100 text-slate-700"),
    TypeColors::new("bg-zinc-50", "border-zinc-200", "text-zinc-800", "bg-zinc-100 text-zinc-700"),
    TypeColors::new("bg-neutral-50", "border-neutral-200", "text-neutral-800", "bg-neutral-100 text-neutral-700"),
    TypeColors::new("bg-stone-50", "border-stone-200", "text-stone-800", "bg-stone-100 text-stone-700"),
    TypeColors::new("bg-slate-100", "border-slate-300", "text-slate-900", "bg-slate-200 text-slate-800"),
    TypeColors::new("bg-zinc-100", "border-zinc-300", "text-zinc-900", "bg-zinc-200 text-zinc-800"),
    TypeColors::new("bg-neutral-100", "border-neutral-300", "text-neutral-900", "bg-neutral-200 text-neutral-800"),
    TypeColors::new("bg-stone-100", "border-stone-300", "text-stone-900", "bg-stone-200 text-stone-800"),
    TypeColors::new("bg-gray-100", "border-gray-300", "text-gray-900", "bg-gray-200 text-gray-800"),
    TypeColors::new("bg-blue-100", "border-blue-300", "text-blue-900", "bg-blue-200 text-blue-800"),
    TypeColors::new("bg-green-100", "border-green-300", "text-green-900", "bg-green-200 text-green-800"),
    TypeColors::new("bg-yellow-100", "border-yellow-300", "text-yellow-900", "bg-yellow-200 text-yellow-800"),
    TypeColors::new("bg-orange-100", "border-orange-300", "text-orange-900", "bg-orange-200 text-orange-800"),
];

/// Palette index for a type name
pub fn color_index(record_type: &str) -> usize {
    match record_type {
        "PP" => 0,
        "DL" => 1,
        other => (string_hash(other).unsigned_abs() % PALETTE.len() as u32) as usize,
    }
}

/// Colors for an optional type; absent or empty types get [`UNTYPED`]
pub fn type_colors(record_type: Option<&str>) -> TypeColors {
    match record_type {
        Some(ty) if !ty.is_empty() => PALETTE[color_index(ty)],
        _ => UNTYPED,
    }
}

/// 32-bit `h * 31 + unit` hash over UTF-16 code units.
///
/// Matches the hash the published site uses, so the CLI and the web view
/// agree on colors.
fn string_hash(s: &str) -> i32 {
    s.encode_utf16().fold(0i32, |hash, unit| {
        (hash << 5).wrapping_sub(hash).wrapping_add(i32::from(unit))
    })
}
