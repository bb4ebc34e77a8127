//! Markdown front end: folds pulldown-cmark events into a small, closed
//! block/inline tree that the edit builders walk.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, children: Vec<Inline> },
    Paragraph(Vec<Inline>),
    List { ordered: bool, items: Vec<ListItem> },
    Table { rows: Vec<Row> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem(pub Vec<Inline>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Vec<Inline>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmphasisLevel {
    /// `*text*`
    Single,
    /// `**text**`
    Double,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Emphasis {
        level: EmphasisLevel,
        children: Vec<Inline>,
    },
    Link {
        destination: String,
        children: Vec<Inline>,
    },
}

impl Inline {
    pub fn text(value: impl Into<String>) -> Self {
        Inline::Text(value.into())
    }

    fn write_plain(&self, out: &mut String) {
        match self {
            Inline::Text(text) => out.push_str(text),
            Inline::Emphasis { children, .. } | Inline::Link { children, .. } => {
                children.iter().for_each(|child| child.write_plain(out))
            }
        }
    }
}

/// Flattened text of a run of inlines, styles dropped.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    inlines.iter().for_each(|inline| inline.write_plain(&mut out));
    out
}

/// Parses Markdown into top-level blocks. CommonMark accepts every input,
/// so this never fails.
pub fn parse(markdown: &str) -> Vec<Block> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut tree = TreeBuilder::default();
    for event in Parser::new_ext(markdown, options) {
        tree.handle(event);
    }
    tree.blocks
}

#[derive(Default)]
struct TreeBuilder {
    blocks: Vec<Block>,
    inline_stack: Vec<Vec<Inline>>,
    link_destinations: Vec<String>,
    list: Option<(bool, Vec<ListItem>)>,
    list_depth: usize,
    item_depth: usize,
    rows: Vec<Row>,
    current_row: Vec<Vec<Inline>>,
    code: Option<String>,
}

impl TreeBuilder {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => match self.code.as_mut() {
                Some(code) => code.push_str(&text),
                None => self.push_text(&text),
            },
            Event::Code(text)
            | Event::InlineHtml(text)
            | Event::InlineMath(text)
            | Event::DisplayMath(text)
            | Event::FootnoteReference(text) => self.push_text(&text),
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.push_text("\n"),
            Event::Html(_) | Event::Rule | Event::TaskListMarker(_) => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph
            | Tag::Heading { .. }
            | Tag::TableCell
            | Tag::Emphasis
            | Tag::Strong
            | Tag::Strikethrough
            | Tag::Image { .. } => self.inline_stack.push(Vec::new()),
            Tag::Link { dest_url, .. } => {
                self.link_destinations.push(dest_url.to_string());
                self.inline_stack.push(Vec::new());
            }
            Tag::CodeBlock(_) => self.code = Some(String::new()),
            Tag::List(first_number) => {
                if self.list_depth == 0 {
                    self.list = Some((first_number.is_some(), Vec::new()));
                } else {
                    // Nested list: what the parent item has so far becomes its own item.
                    self.flush_item();
                }
                self.list_depth += 1;
            }
            Tag::Item => {
                self.item_depth += 1;
                self.inline_stack.push(Vec::new());
            }
            Tag::Table(_) => self.rows.clear(),
            Tag::TableHead | Tag::TableRow => self.current_row.clear(),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(level) => {
                let children = self.pop_inlines();
                if self.item_depth > 0 {
                    self.merge_into_item(children);
                } else {
                    self.blocks.push(Block::Heading {
                        level: heading_level(level),
                        children,
                    });
                }
            }
            TagEnd::Paragraph => {
                let children = self.pop_inlines();
                if self.item_depth > 0 {
                    self.merge_into_item(children);
                } else if !children.is_empty() {
                    self.blocks.push(Block::Paragraph(children));
                }
            }
            TagEnd::CodeBlock => {
                let code = self.code.take().unwrap_or_default();
                let code = code.trim_end_matches('\n').to_string();
                if self.item_depth > 0 {
                    self.merge_into_item(vec![Inline::Text(code)]);
                } else if !code.is_empty() {
                    self.blocks.push(Block::Paragraph(vec![Inline::Text(code)]));
                }
            }
            TagEnd::Emphasis | TagEnd::Strong => {
                let level = if tag == TagEnd::Strong {
                    EmphasisLevel::Double
                } else {
                    EmphasisLevel::Single
                };
                let children = self.pop_inlines();
                self.push_inline(Inline::Emphasis { level, children });
            }
            TagEnd::Link => {
                let children = self.pop_inlines();
                let destination = self.link_destinations.pop().unwrap_or_default();
                self.push_inline(Inline::Link {
                    destination,
                    children,
                });
            }
            TagEnd::Strikethrough | TagEnd::Image => {
                for inline in self.pop_inlines() {
                    self.push_inline(inline);
                }
            }
            TagEnd::Item => {
                self.flush_item();
                self.inline_stack.pop();
                self.item_depth = self.item_depth.saturating_sub(1);
            }
            TagEnd::List(_) => {
                self.list_depth = self.list_depth.saturating_sub(1);
                if self.list_depth == 0 {
                    if let Some((ordered, items)) = self.list.take() {
                        self.blocks.push(Block::List { ordered, items });
                    }
                }
            }
            TagEnd::TableCell => {
                let cell = self.pop_inlines();
                self.current_row.push(cell);
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                let cells = std::mem::take(&mut self.current_row);
                self.rows.push(Row { cells });
            }
            TagEnd::Table => {
                let rows = std::mem::take(&mut self.rows);
                if self.item_depth > 0 {
                    // List items hold inlines only, so a nested table is flattened into the item.
                    for cell in rows.into_iter().flat_map(|row| row.cells) {
                        self.merge_into_item(cell);
                    }
                } else {
                    self.blocks.push(Block::Table { rows });
                }
            }
            _ => {}
        }
    }

    fn pop_inlines(&mut self) -> Vec<Inline> {
        self.inline_stack.pop().unwrap_or_default()
    }

    fn push_inline(&mut self, inline: Inline) {
        let Some(current) = self.inline_stack.last_mut() else {
            return;
        };
        if let (Some(Inline::Text(previous)), Inline::Text(text)) = (current.last_mut(), &inline) {
            previous.push_str(text);
            return;
        }
        current.push(inline);
    }

    fn push_text(&mut self, text: &str) {
        if !text.is_empty() {
            self.push_inline(Inline::text(text));
        }
    }

    /// Appends a finished paragraph to the open list item, space separated.
    fn merge_into_item(&mut self, children: Vec<Inline>) {
        if children.is_empty() {
            return;
        }
        if self.inline_stack.last().is_some_and(|item| !item.is_empty()) {
            self.push_text(" ");
        }
        for inline in children {
            self.push_inline(inline);
        }
    }

    fn flush_item(&mut self) {
        let Some(current) = self.inline_stack.last_mut() else {
            return;
        };
        let content = std::mem::take(current);
        if content.is_empty() {
            return;
        }
        if let Some((_, items)) = self.list.as_mut() {
            items.push(ListItem(content));
        }
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
