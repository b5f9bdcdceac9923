//! Sequential page composition over raw lopdf objects.
//!
//! The composer keeps a cursor that walks down the page; text and image
//! helpers consume vertical space and a new page is opened whenever the next
//! block would cross the bottom margin. Coordinates follow PDF conventions
//! (origin bottom-left, points).

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use super::images::EmbeddedImage;
use super::RenderError;

pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;
pub const MARGIN: f32 = 50.0;

/// Name of the regular font resource on every page.
const FONT_REGULAR: &str = "F1";
/// Name of the bold font resource on every page.
const FONT_BOLD: &str = "F2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontKind {
    Regular,
    Bold,
}

impl FontKind {
    fn resource_name(&self) -> &'static str {
        match self {
            FontKind::Regular => FONT_REGULAR,
            FontKind::Bold => FONT_BOLD,
        }
    }
}

#[derive(Default)]
struct PageDraft {
    operations: Vec<Operation>,
    xobjects: Vec<(String, ObjectId)>,
}

pub struct PageComposer {
    doc: Document,
    font_regular_id: ObjectId,
    font_bold_id: ObjectId,
    finished: Vec<PageDraft>,
    current: PageDraft,
    cursor_y: f32,
    image_counter: u32,
}

impl PageComposer {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");

        let font_regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let font_bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });

        Self {
            doc,
            font_regular_id,
            font_bold_id,
            finished: Vec::new(),
            current: PageDraft::default(),
            cursor_y: PAGE_HEIGHT - MARGIN,
            image_counter: 0,
        }
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn cursor_y(&self) -> f32 {
        self.cursor_y
    }

    pub fn set_cursor_y(&mut self, y: f32) {
        self.cursor_y = y;
    }

    pub fn advance(&mut self, dy: f32) {
        self.cursor_y -= dy;
    }

    /// Usable width between the margins.
    pub fn content_width(&self) -> f32 {
        PAGE_WIDTH - 2.0 * MARGIN
    }

    /// Open a new page if `needed` points would cross the bottom margin.
    pub fn ensure_space(&mut self, needed: f32) {
        if self.cursor_y - needed < MARGIN {
            self.new_page();
        }
    }

    pub fn new_page(&mut self) {
        let draft = std::mem::take(&mut self.current);
        self.finished.push(draft);
        self.cursor_y = PAGE_HEIGHT - MARGIN;
    }

    /// One line of text at the cursor; advances by a size-derived leading.
    pub fn text_line(&mut self, font: FontKind, size: f32, text: &str) {
        let leading = size * 1.4;
        self.ensure_space(leading);
        self.cursor_y -= leading;
        self.draw_text_at(font, size, MARGIN, self.cursor_y, text, 0.0);
    }

    /// Bold label followed by wrapped, justified body text. Empty values
    /// render as a placeholder dash.
    pub fn labeled_paragraph(&mut self, label: &str, body: &str, size: f32) {
        self.text_line(FontKind::Bold, size + 1.0, label);

        let body = body.trim();
        if body.is_empty() {
            self.text_line(FontKind::Regular, size, "-");
            self.advance(4.0);
            return;
        }

        let max_width = self.content_width();
        let lines = wrap_text(body, size, max_width);
        let line_count = lines.len();
        for (i, line) in lines.into_iter().enumerate() {
            let leading = size * 1.4;
            self.ensure_space(leading);
            self.cursor_y -= leading;

            // Justify by stretching inter-word spaces; the last line of a
            // paragraph stays ragged.
            let gaps = line.matches(' ').count() as f32;
            let word_spacing = if i + 1 < line_count && gaps > 0.0 {
                (max_width - text_width(&line, size)) / gaps
            } else {
                0.0
            };
            self.draw_text_at(FontKind::Regular, size, MARGIN, self.cursor_y, &line, word_spacing);
        }
        self.advance(4.0);
    }

    /// Absolute-position text, used for captions next to images.
    pub fn text_at(&mut self, font: FontKind, size: f32, x: f32, y: f32, text: &str) {
        self.draw_text_at(font, size, x, y, text, 0.0);
    }

    fn draw_text_at(
        &mut self,
        font: FontKind,
        size: f32,
        x: f32,
        y: f32,
        text: &str,
        word_spacing: f32,
    ) {
        let ops = &mut self.current.operations;
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![
                Object::Name(font.resource_name().as_bytes().to_vec()),
                Object::Real(size),
            ],
        ));
        // Word spacing is part of the persistent text state; always set it so
        // a justified line cannot leak its stretch into the next block.
        ops.push(Operation::new("Tw", vec![Object::Real(word_spacing)]));
        ops.push(Operation::new("Td", vec![Object::Real(x), Object::Real(y)]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(
                encode_win_ansi(text),
                lopdf::StringFormat::Literal,
            )],
        ));
        ops.push(Operation::new("ET", vec![]));
    }

    /// Draw an embedded image with its bottom-left corner at (x, y).
    pub fn place_image(&mut self, image: EmbeddedImage, x: f32, y: f32, w: f32, h: f32) {
        self.image_counter += 1;
        let name = format!("Im{}", self.image_counter);

        let ops = &mut self.current.operations;
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![
                Object::Real(w),
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(h),
                Object::Real(x),
                Object::Real(y),
            ],
        ));
        ops.push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
        ops.push(Operation::new("Q", vec![]));

        self.current.xobjects.push((name, image.object_id));
    }

    /// Horizontal rule across the content width at the cursor.
    pub fn separator(&mut self) {
        self.ensure_space(10.0);
        self.cursor_y -= 8.0;
        let ops = &mut self.current.operations;
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("w", vec![Object::Real(0.5)]));
        ops.push(Operation::new(
            "m",
            vec![Object::Real(MARGIN), Object::Real(self.cursor_y)],
        ));
        ops.push(Operation::new(
            "l",
            vec![Object::Real(PAGE_WIDTH - MARGIN), Object::Real(self.cursor_y)],
        ));
        ops.push(Operation::new("S", vec![]));
        ops.push(Operation::new("Q", vec![]));
        self.cursor_y -= 6.0;
    }

    /// Assemble the page tree and serialize the document.
    pub fn finish(mut self) -> Result<Vec<u8>, RenderError> {
        self.finished.push(std::mem::take(&mut self.current));

        let pages_id = self.doc.new_object_id();
        let mut kids: Vec<Object> = Vec::new();

        for draft in self.finished {
            let content = Content {
                operations: draft.operations,
            };
            let content_id = self
                .doc
                .add_object(Stream::new(dictionary! {}, content.encode()?));

            let mut xobject_dict = lopdf::Dictionary::new();
            for (name, object_id) in draft.xobjects {
                xobject_dict.set(name.into_bytes(), Object::Reference(object_id));
            }

            let resources = dictionary! {
                "Font" => dictionary! {
                    FONT_REGULAR => Object::Reference(self.font_regular_id),
                    FONT_BOLD => Object::Reference(self.font_bold_id),
                },
                "XObject" => Object::Dictionary(xobject_dict),
            };

            let page_id = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(PAGE_WIDTH as i64),
                    Object::Integer(PAGE_HEIGHT as i64),
                ],
                "Resources" => resources,
                "Contents" => Object::Reference(content_id),
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        self.doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        self.doc.compress();
        let mut out = Vec::new();
        self.doc.save_to(&mut out)?;
        Ok(out)
    }
}

impl Default for PageComposer {
    fn default() -> Self {
        Self::new()
    }
}

/// Approximate advance width of a string in Helvetica at `size`.
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().map(|c| char_width(c) * size).sum()
}

// Coarse Helvetica metrics; close enough for wrapping and justification.
fn char_width(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.28,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' | ' ' | '/' => 0.35,
        'm' | 'M' | 'W' | 'w' => 0.82,
        'A'..='Z' | '0'..='9' | 'Ñ' | 'Á' | 'É' | 'Í' | 'Ó' | 'Ú' => 0.66,
        _ => 0.52,
    }
}

/// Greedy word wrap against an approximate width limit.
pub fn wrap_text(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", line, word)
        };
        if text_width(&candidate, size) > max_width && !line.is_empty() {
            lines.push(line);
            line = word.to_string();
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Map text to WinAnsi (cp1252) bytes; characters outside the map become '?'.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E => c as u8,
            0xA0..=0xFF => c as u8,
            _ => b'?',
        })
        .collect()
}
