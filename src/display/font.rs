/*
 *  display/font.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Sprite fonts: a glyph order string mapped onto a grid of mask cells
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle, iso_8859_1::{FONT_4X6, FONT_6X10}},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Triangle},
    text::{Baseline, Text},
};
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::display::error::FontError;
use crate::vframebuf::Mask;

/// Name every lookup falls back to
pub const DEFAULT_FONT: &str = "default";

pub const ARROW_UP: char = '▲';
pub const ARROW_DOWN: char = '▼';

/// Characters lit by the `rows` text format
const LIT_MARKS: [char; 4] = ['#', 'X', '1', '@'];

/// A bitmap font laid out as one row of equal cells.
///
/// Cell `i` holds the glyph at position `i` of `glyph_order`.
#[derive(Debug, Clone)]
pub struct SpriteFont {
    name: String,
    glyph_order: Vec<char>,
    index: HashMap<char, usize>,
    sheet: Mask,
    columns: u32,
    spacing: u32,
    fallback: char,
}

/// Borrowed view of one glyph's cell in the sheet
#[derive(Debug, Clone, Copy)]
pub struct GlyphCell<'a> {
    sheet: &'a Mask,
    x0: u32,
    width: u32,
    height: u32,
}

impl GlyphCell<'_> {
    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }

    /// Mask bit at (x, y) inside the cell
    pub fn is_lit(&self, x: u32, y: u32) -> bool {
        x < self.width && self.sheet.get(self.x0 + x, y) == Some(BinaryColor::On)
    }
}

impl SpriteFont {
    /// Assemble a font; nothing is checked until [`SpriteFont::validate`]
    /// or [`FontTable::register`].
    pub fn new(
        name: impl Into<String>,
        glyph_order: &str,
        sheet: Mask,
        columns: u32,
        spacing: u32,
        fallback: char,
    ) -> Self {
        let glyph_order: Vec<char> = glyph_order.chars().collect();
        let mut index = HashMap::with_capacity(glyph_order.len());
        for (i, ch) in glyph_order.iter().enumerate() {
            index.entry(*ch).or_insert(i);
        }
        Self {
            name: name.into(),
            glyph_order,
            index,
            sheet,
            columns,
            spacing,
            fallback,
        }
    }

    /// Build from text rows, see [`LIT_MARKS`]
    pub fn from_rows(
        name: &str,
        glyph_order: &str,
        columns: u32,
        spacing: u32,
        fallback: char,
        rows: &[String],
    ) -> Result<Self, FontError> {
        let invalid = |reason: String| FontError::InvalidFont { name: name.to_string(), reason };
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if rows.is_empty() || width == 0 {
            return Err(invalid("sheet is empty".into()));
        }
        if let Some((i, r)) = rows.iter().enumerate().find(|(_, r)| r.chars().count() != width) {
            return Err(invalid(format!(
                "row {} has {} pixels, expected {}",
                i,
                r.chars().count(),
                width
            )));
        }
        let mut sheet = Mask::new(width as u32, rows.len() as u32, BinaryColor::Off);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if LIT_MARKS.contains(&ch) {
                    sheet.set(x as u32, y as u32, BinaryColor::On);
                }
            }
        }
        let font = Self::new(name, glyph_order, sheet, columns, spacing, fallback);
        font.validate()?;
        Ok(font)
    }

    /// Rasterize an embedded-graphics mono font into a sprite sheet. The
    /// trend arrows are drawn as triangles since no mono font carries them.
    pub fn from_mono_font(name: &str, font: &MonoFont<'_>, glyph_order: &str) -> Self {
        let cell = font.character_size;
        let chars: Vec<char> = glyph_order.chars().collect();
        let mut sheet = Mask::new(cell.width * chars.len() as u32, cell.height, BinaryColor::Off);
        let style = MonoTextStyle::new(font, BinaryColor::On);
        let mut buf = [0u8; 4];

        for (i, ch) in chars.iter().enumerate() {
            let x0 = (i as u32 * cell.width) as i32;
            match *ch {
                ARROW_UP | ARROW_DOWN => {
                    let w = cell.width.saturating_sub(2) as i32;
                    let top = (cell.height / 4) as i32;
                    let bottom = (cell.height * 3 / 4) as i32;
                    let (base, tip) = if *ch == ARROW_UP { (bottom, top) } else { (top, bottom) };
                    let _ = Triangle::new(
                        Point::new(x0, base),
                        Point::new(x0 + w, base),
                        Point::new(x0 + w / 2, tip),
                    )
                    .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                    .draw(&mut sheet);
                }
                ' ' => {}
                _ => {
                    let s: &str = ch.encode_utf8(&mut buf);
                    let _ = Text::with_baseline(s, Point::new(x0, 0), style, Baseline::Top)
                        .draw(&mut sheet);
                }
            }
        }

        Self::new(name, glyph_order, sheet, chars.len() as u32, font.character_spacing, ' ')
    }

    /// Sheet geometry must be a whole grid holding every glyph
    pub fn validate(&self) -> Result<(), FontError> {
        let invalid = |reason: String| FontError::InvalidFont { name: self.name.clone(), reason };
        if self.name.trim().is_empty() {
            return Err(invalid("font name is empty".into()));
        }
        if self.sheet.is_empty() {
            return Err(invalid("sheet is empty".into()));
        }
        if self.columns == 0 {
            return Err(invalid("columns must be > 0".into()));
        }
        let width = self.sheet.width() as u32;
        if width % self.columns != 0 {
            return Err(invalid(format!(
                "sheet width {} not divisible by {} columns",
                width, self.columns
            )));
        }
        if self.glyph_order.is_empty() {
            return Err(invalid("glyph order is empty".into()));
        }
        if self.glyph_order.len() > self.columns as usize {
            return Err(invalid(format!(
                "{} glyphs but only {} cells",
                self.glyph_order.len(),
                self.columns
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.glyph_order.iter().find(|c| !seen.insert(**c)) {
            return Err(invalid(format!("duplicate glyph {:?}", dup)));
        }
        Ok(())
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn spacing(&self) -> u32 { self.spacing }
    pub fn fallback(&self) -> char { self.fallback }
    pub fn columns(&self) -> u32 { self.columns }

    pub fn glyph_order(&self) -> String {
        self.glyph_order.iter().collect()
    }

    pub fn cell_width(&self) -> u32 {
        if self.columns == 0 { 0 } else { self.sheet.width() as u32 / self.columns }
    }

    pub fn cell_height(&self) -> u32 {
        self.sheet.height() as u32
    }

    pub fn contains(&self, ch: char) -> bool {
        self.index.contains_key(&ch)
    }

    pub fn glyph_cell(&self, ch: char) -> Result<GlyphCell<'_>, FontError> {
        let i = *self.index.get(&ch).ok_or_else(|| FontError::GlyphNotFound {
            font: self.name.clone(),
            ch,
        })?;
        let width = self.cell_width();
        Ok(GlyphCell {
            sheet: &self.sheet,
            x0: i as u32 * width,
            width,
            height: self.cell_height(),
        })
    }

    /// The glyph for `ch`, else the fallback glyph, else nothing (blank cell)
    pub fn cell_or_fallback(&self, ch: char) -> Option<GlyphCell<'_>> {
        self.glyph_cell(ch)
            .or_else(|_| self.glyph_cell(self.fallback))
            .ok()
    }
}

/// ASCII printable range plus degree sign and trend arrows
fn builtin_glyph_order() -> String {
    let mut s: String = (' '..='~').collect();
    s.push('°');
    s.push(ARROW_UP);
    s.push(ARROW_DOWN);
    s
}

/// Named fonts available to text tasks
#[derive(Debug, Clone)]
pub struct FontTable {
    fonts: HashMap<String, Arc<SpriteFont>>,
}

impl FontTable {
    /// Table holding the built-in "default" (6x10) and "small" (4x6) fonts
    pub fn new() -> Self {
        let order = builtin_glyph_order();
        let mut fonts = HashMap::new();
        for font in [
            SpriteFont::from_mono_font(DEFAULT_FONT, &FONT_6X10, &order),
            SpriteFont::from_mono_font("small", &FONT_4X6, &order),
        ] {
            fonts.insert(font.name().to_string(), Arc::new(font));
        }
        Self { fonts }
    }

    /// Validate and insert, replacing any font of the same name. On
    /// failure the table is untouched.
    pub fn register(&mut self, font: SpriteFont) -> Result<(), FontError> {
        font.validate()?;
        let name = font.name().to_string();
        let replaced = self.fonts.insert(name.clone(), Arc::new(font)).is_some();
        if replaced {
            info!("Font '{}' replaced", name);
        } else {
            debug!("Font '{}' registered", name);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<SpriteFont>, FontError> {
        self.fonts
            .get(name)
            .cloned()
            .ok_or_else(|| FontError::UnknownFont(name.to_string()))
    }

    /// Named font, else the default font
    pub fn resolve(&self, name: Option<&str>) -> Arc<SpriteFont> {
        if let Some(n) = name {
            match self.fonts.get(n) {
                Some(f) => return Arc::clone(f),
                None => debug!("Font '{}' not registered, using default", n),
            }
        }
        match self.fonts.get(DEFAULT_FONT) {
            Some(f) => Arc::clone(f),
            None => Arc::new(SpriteFont::from_mono_font(DEFAULT_FONT, &FONT_6X10, &builtin_glyph_order())),
        }
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.fonts.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for FontTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    /// "AB" in 4x2 cells: A is the left column lit, B all lit
    fn ab_font() -> SpriteFont {
        SpriteFont::from_rows("ab", "AB", 2, 0, ' ', &rows(&["#...####", "#...####"])).unwrap()
    }

    #[test]
    fn test_glyph_cell_lookup() {
        let f = ab_font();
        assert_eq!(f.cell_width(), 4);
        assert_eq!(f.cell_height(), 2);
        let a = f.glyph_cell('A').unwrap();
        assert!(a.is_lit(0, 0));
        assert!(!a.is_lit(1, 0));
        let b = f.glyph_cell('B').unwrap();
        assert!((0..4).all(|x| b.is_lit(x, 1)));
    }

    #[test]
    fn test_glyph_not_found() {
        let f = ab_font();
        assert_eq!(
            f.glyph_cell('C').err(),
            Some(FontError::GlyphNotFound { font: "ab".into(), ch: 'C' })
        );
        // fallback is space which the font lacks, so the cell is blank
        assert!(f.cell_or_fallback('C').is_none());
    }

    #[test]
    fn test_rejects_indivisible_sheet() {
        let err = SpriteFont::from_rows("bad", "AB", 3, 0, ' ', &rows(&["########"]));
        assert!(matches!(err, Err(FontError::InvalidFont { .. })));
    }

    #[test]
    fn test_rejects_ragged_rows_and_duplicates() {
        assert!(SpriteFont::from_rows("r", "AB", 2, 0, ' ', &rows(&["####", "###"])).is_err());
        assert!(SpriteFont::from_rows("d", "AA", 2, 0, ' ', &rows(&["####"])).is_err());
        assert!(SpriteFont::from_rows("e", "", 2, 0, ' ', &rows(&["####"])).is_err());
    }

    #[test]
    fn test_register_failure_keeps_previous() {
        let mut table = FontTable::new();
        table.register(ab_font()).unwrap();
        let broken = SpriteFont::new("ab", "AB", Mask::new(5, 2, BinaryColor::Off), 2, 0, ' ');
        assert!(table.register(broken).is_err());
        assert_eq!(table.get("ab").unwrap().cell_width(), 4);
    }

    #[test]
    fn test_register_replaces_whole_entry() {
        let mut table = FontTable::new();
        table.register(ab_font()).unwrap();
        let wider = SpriteFont::from_rows("ab", "AB", 2, 1, ' ', &rows(&["#.....######"])).unwrap();
        table.register(wider).unwrap();
        let f = table.get("ab").unwrap();
        assert_eq!(f.cell_width(), 6);
        assert_eq!(f.spacing(), 1);
    }

    #[test]
    fn test_builtin_fonts() {
        let table = FontTable::new();
        assert_eq!(table.names(), vec!["default".to_string(), "small".to_string()]);
        let f = table.resolve(None);
        assert_eq!(f.cell_width(), 6);
        assert_eq!(f.cell_height(), 10);
        assert!(f.validate().is_ok());
        for ch in ['A', '0', '°', ARROW_UP, ARROW_DOWN] {
            let cell = f.glyph_cell(ch).unwrap();
            let lit = (0..6).flat_map(|x| (0..10).map(move |y| (x, y))).filter(|&(x, y)| cell.is_lit(x, y)).count();
            assert!(lit > 0, "glyph {ch:?} is blank");
        }
        assert!(table.resolve(Some("nope")).name() == DEFAULT_FONT);
    }
}
