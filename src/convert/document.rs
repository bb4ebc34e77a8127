//! Markdown to Google Docs batch edits.
//!
//! The builder is a fold over the top-level blocks: each block takes the
//! edits produced so far plus the cursor, appends its own edits, and hands
//! back the advanced cursor. Every offset is computed as if all earlier
//! edits in the batch had already been applied, so the order of the
//! returned sequence is part of its meaning.

use super::markdown::{self, plain_text, Block, EmphasisLevel, Inline, ListItem, Row};

/// Next insertion offset in a document body, in UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor(u32);

impl Cursor {
    /// Offset 0 is the document-start sentinel; body text begins at 1.
    pub const START: Cursor = Cursor(1);

    pub fn at(index: u32) -> Self {
        Cursor(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }

    pub fn advanced_by(self, text: &str) -> Self {
        Cursor(self.0 + utf16_len(text))
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor::START
    }
}

/// Length of `text` in the index space of the Docs API.
pub fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}

/// Half-open range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub start: u32,
    pub end: u32,
}

impl TextRange {
    pub fn new(start: Cursor, end: Cursor) -> Self {
        Self {
            start: start.index(),
            end: end.index(),
        }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextStyle {
    Bold,
    Italic,
    Link(String),
}

impl TextStyle {
    /// The one field this style touches, so overlapping styles don't reset each other.
    pub fn field_mask(&self) -> &'static str {
        match self {
            TextStyle::Bold => "bold",
            TextStyle::Italic => "italic",
            TextStyle::Link(_) => "link",
        }
    }

    fn for_emphasis(level: EmphasisLevel) -> Self {
        match level {
            EmphasisLevel::Single => TextStyle::Italic,
            EmphasisLevel::Double => TextStyle::Bold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletPreset {
    Disc,
    Numbered,
}

impl BulletPreset {
    pub fn as_api_str(self) -> &'static str {
        match self {
            BulletPreset::Disc => "BULLET_DISC_CIRCLE_SQUARE",
            BulletPreset::Numbered => "NUMBERED_DECIMAL_ALPHA_ROMAN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEdit {
    InsertText { at: u32, text: String },
    /// `level` is a heading level, 1 through 6.
    SetParagraphStyle { range: TextRange, level: u8 },
    ApplyTextStyle { range: TextRange, style: TextStyle },
    CreateBullets { range: TextRange, preset: BulletPreset },
    InsertTable { at: u32, rows: u32, columns: u32 },
}

/// Edits produced so far and the cursor after the last of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEdits {
    pub edits: Vec<DocumentEdit>,
    pub cursor: Cursor,
}

impl DocumentEdits {
    pub fn starting_at(cursor: Cursor) -> Self {
        Self {
            edits: Vec::new(),
            cursor,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    fn push_block(mut self, block: &Block) -> Self {
        match block {
            Block::Heading { level, children } => self.push_heading(*level, children),
            Block::Paragraph(children) => self.push_paragraph(children),
            Block::List { ordered, items } => self.push_list(*ordered, items),
            Block::Table { rows } => self.push_table(rows),
        }
        self
    }

    fn push_heading(&mut self, level: u8, children: &[Inline]) {
        let text = plain_text(children);
        let start = self.cursor;
        self.insert(format!("{text}\n"));
        if !text.is_empty() {
            self.edits.push(DocumentEdit::SetParagraphStyle {
                range: TextRange::new(start, start.advanced_by(&text)),
                level,
            });
        }
    }

    fn push_paragraph(&mut self, children: &[Inline]) {
        for inline in children {
            let (text, styles) = render_inlines(std::slice::from_ref(inline), self.cursor);
            self.insert(text);
            self.edits.extend(styles);
        }
        self.insert("\n".to_string());
    }

    fn push_list(&mut self, ordered: bool, items: &[ListItem]) {
        let preset = if ordered {
            BulletPreset::Numbered
        } else {
            BulletPreset::Disc
        };

        for ListItem(children) in items {
            let start = self.cursor;
            let (text, styles) = render_inlines(children, start);
            if text.is_empty() {
                continue;
            }
            let end = start.advanced_by(&text);
            self.insert(format!("{text}\n"));
            self.edits.push(DocumentEdit::CreateBullets {
                range: TextRange::new(start, end),
                preset,
            });
            self.edits.extend(styles);
        }
    }

    // The cell structure InsertTable creates is not tracked here. The
    // table text goes in as one tab/newline separated block at the same
    // offset and the cursor moves past that block only.
    fn push_table(&mut self, rows: &[Row]) {
        let columns = rows.first().map_or(0, |row| row.cells.len());
        if columns == 0 {
            return;
        }

        self.edits.push(DocumentEdit::InsertTable {
            at: self.cursor.index(),
            rows: rows.len() as u32,
            columns: columns as u32,
        });

        let text: String = rows
            .iter()
            .map(|row| {
                let cells: Vec<String> = row.cells.iter().map(|cell| plain_text(cell)).collect();
                format!("{}\n", cells.join("\t"))
            })
            .collect();
        self.insert(text);
    }

    fn insert(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        let at = self.cursor;
        self.cursor = at.advanced_by(&text);
        self.edits.push(DocumentEdit::InsertText {
            at: at.index(),
            text,
        });
    }
}

/// Flattens `inlines` as if inserted at `at`, returning the text and the
/// style edits for its emphasis and links. An enclosing style precedes the
/// styles nested inside it.
fn render_inlines(inlines: &[Inline], at: Cursor) -> (String, Vec<DocumentEdit>) {
    let mut text = String::new();
    let mut styles = Vec::new();
    for inline in inlines {
        render_inline(inline, at, &mut text, &mut styles);
    }
    (text, styles)
}

fn render_inline(inline: &Inline, at: Cursor, text: &mut String, styles: &mut Vec<DocumentEdit>) {
    let (style, children) = match inline {
        Inline::Text(value) => {
            text.push_str(value);
            return;
        }
        Inline::Emphasis { level, children } => (TextStyle::for_emphasis(*level), children),
        Inline::Link {
            destination,
            children,
        } => (TextStyle::Link(destination.clone()), children),
    };

    let start = at.advanced_by(text);
    let slot = styles.len();
    for child in children {
        render_inline(child, at, text, styles);
    }
    let range = TextRange::new(start, at.advanced_by(text));
    if !range.is_empty() {
        styles.insert(slot, DocumentEdit::ApplyTextStyle { range, style });
    }
}

/// Turns Markdown into the ordered edits that recreate it in a document body.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentEditBuilder {
    start: Cursor,
}

impl DocumentEditBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds edits for a body whose next free offset is `start` rather than 1.
    pub fn starting_at(start: Cursor) -> Self {
        Self { start }
    }

    pub fn build(&self, markdown_text: &str) -> DocumentEdits {
        markdown::parse(markdown_text)
            .iter()
            .fold(DocumentEdits::starting_at(self.start), DocumentEdits::push_block)
    }
}
