//! # Document Pane
//!
//! The window's document view. egui has no HTML engine, so the pane renders the
//! shown document's markdown natively and hands the full HTML document to the
//! system browser on request.

use crate::controller::HtmlView;
use crate::error::ViewerError;
use crate::markdown::{parser_options, RenderedDocument};
use egui::text::LayoutJob;
use egui::*;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag, TagEnd};
use std::fs;
use std::path::{Path, PathBuf};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

const PREVIEW_FILE: &str = "mdpane-preview.html";

/// Holds the document last handed over by the controller and draws it.
pub struct DocumentPane {
    document: Option<RenderedDocument>,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    base_font_size: f32,
}

/// Inline formatting in effect for the next run of text.
#[derive(Default)]
struct InlineStyle {
    heading: Option<u8>,
    emphasis: bool,
    strong: bool,
    strikethrough: bool,
    link: Option<String>,
}

/// Inline content collected for the block being built.
struct PendingBlock {
    job: LayoutJob,
    link: Option<String>,
    indent: f32,
}

impl Default for DocumentPane {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlView for DocumentPane {
    fn show(&mut self, document: &RenderedDocument) {
        self.document = Some(document.clone());
    }
}

impl DocumentPane {
    pub fn new() -> Self {
        Self {
            document: None,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            base_font_size: 14.0,
        }
    }

    pub fn document(&self) -> Option<&RenderedDocument> {
        self.document.as_ref()
    }

    /// Writes the HTML document to a temp file and opens it in the default browser.
    pub fn open_in_browser(&self) -> Result<PathBuf, ViewerError> {
        let path = self.write_preview(&std::env::temp_dir())?;
        webbrowser::open(&path.to_string_lossy()).map_err(|source| ViewerError::Preview {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    fn write_preview(&self, dir: &Path) -> Result<PathBuf, ViewerError> {
        let path = dir.join(PREVIEW_FILE);
        let html = self.document().map(|d| d.html.as_str()).unwrap_or_default();
        fs::write(&path, html).map_err(|source| ViewerError::Preview {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Draws the current document into `ui`.
    pub fn ui(&self, ui: &mut Ui) {
        if let Some(document) = &self.document {
            self.render_markdown(ui, &document.source);
        }
    }

    fn render_markdown(&self, ui: &mut Ui, markdown: &str) {
        let mut style = InlineStyle::default();
        let mut block = self.new_block(0.0);
        let mut quote_depth = 0usize;
        let mut lists: Vec<Option<u64>> = Vec::new();
        let mut code_block: Option<(String, String)> = None;
        let mut table: Option<Vec<Vec<String>>> = None;
        let mut table_count = 0usize;

        for event in Parser::new_ext(markdown, parser_options()) {
            if code_block.is_some() {
                match event {
                    Event::Text(text) => {
                        if let Some((_, content)) = code_block.as_mut() {
                            content.push_str(&text);
                        }
                    }
                    Event::End(TagEnd::CodeBlock) => {
                        if let Some((language, content)) = code_block.take() {
                            self.render_code_block(ui, &content, &language);
                            ui.add_space(8.0);
                        }
                    }
                    _ => {}
                }
                continue;
            }

            if table.is_some() {
                let rows = table.as_mut();
                match event {
                    Event::Start(Tag::TableHead) | Event::Start(Tag::TableRow) => {
                        if let Some(rows) = rows {
                            rows.push(Vec::new());
                        }
                    }
                    Event::Start(Tag::TableCell) => {
                        if let Some(row) = rows.and_then(|r| r.last_mut()) {
                            row.push(String::new());
                        }
                    }
                    Event::Text(text) | Event::Code(text) => {
                        if let Some(cell) = rows.and_then(|r| r.last_mut()).and_then(|r| r.last_mut()) {
                            cell.push_str(&text);
                        }
                    }
                    Event::End(TagEnd::Table) => {
                        if let Some(rows) = table.take() {
                            self.render_table(ui, &rows, table_count);
                            table_count += 1;
                            ui.add_space(8.0);
                        }
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::Paragraph) => {}
                Event::End(TagEnd::Paragraph) => {
                    self.flush(ui, &mut block, quote_depth > 0);
                    if lists.is_empty() {
                        ui.add_space(8.0);
                    }
                }
                Event::Start(Tag::Heading { level, .. }) => {
                    self.flush(ui, &mut block, quote_depth > 0);
                    style.heading = Some(heading_number(level));
                }
                Event::End(TagEnd::Heading(_)) => {
                    self.flush(ui, &mut block, quote_depth > 0);
                    style.heading = None;
                    ui.add_space(12.0);
                }
                Event::Start(Tag::BlockQuote(_)) => {
                    self.flush(ui, &mut block, quote_depth > 0);
                    quote_depth += 1;
                }
                Event::End(TagEnd::BlockQuote(_)) => {
                    self.flush(ui, &mut block, true);
                    quote_depth = quote_depth.saturating_sub(1);
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    self.flush(ui, &mut block, quote_depth > 0);
                    let language = match kind {
                        CodeBlockKind::Fenced(lang) => lang.split_whitespace().next().unwrap_or("").to_string(),
                        CodeBlockKind::Indented => String::new(),
                    };
                    code_block = Some((language, String::new()));
                }
                Event::Start(Tag::List(start)) => {
                    self.flush(ui, &mut block, quote_depth > 0);
                    lists.push(start);
                }
                Event::End(TagEnd::List(_)) => {
                    self.flush(ui, &mut block, quote_depth > 0);
                    lists.pop();
                    block.indent = 16.0 * lists.len().saturating_sub(1) as f32;
                    if lists.is_empty() {
                        ui.add_space(8.0);
                    }
                }
                Event::Start(Tag::Item) => {
                    self.flush(ui, &mut block, quote_depth > 0);
                    let depth = lists.len().saturating_sub(1);
                    block.indent = 16.0 * depth as f32;
                    let marker = match lists.last_mut() {
                        Some(Some(n)) => {
                            let marker = format!("{n}. ");
                            *n += 1;
                            marker
                        }
                        _ => "• ".to_string(),
                    };
                    self.append_text(ui, &mut block, &marker, &InlineStyle::default());
                }
                Event::End(TagEnd::Item) => self.flush(ui, &mut block, quote_depth > 0),
                Event::TaskListMarker(done) => {
                    let marker = if done { "☑ " } else { "☐ " };
                    self.append_text(ui, &mut block, marker, &InlineStyle::default());
                }
                Event::Start(Tag::Table(_)) => {
                    self.flush(ui, &mut block, quote_depth > 0);
                    table = Some(Vec::new());
                }
                Event::Start(Tag::Emphasis) => style.emphasis = true,
                Event::End(TagEnd::Emphasis) => style.emphasis = false,
                Event::Start(Tag::Strong) => style.strong = true,
                Event::End(TagEnd::Strong) => style.strong = false,
                Event::Start(Tag::Strikethrough) => style.strikethrough = true,
                Event::End(TagEnd::Strikethrough) => style.strikethrough = false,
                Event::Start(Tag::Link { dest_url, .. }) => {
                    if block.link.is_none() {
                        block.link = Some(dest_url.to_string());
                    }
                    style.link = Some(dest_url.to_string());
                }
                Event::End(TagEnd::Link) => style.link = None,
                Event::Start(Tag::Image { dest_url, .. }) => {
                    // Images are not fetched; the alt text that follows stands in.
                    self.append_text(ui, &mut block, "🖼 ", &style);
                    style.link = Some(dest_url.to_string());
                }
                Event::End(TagEnd::Image) => style.link = None,
                Event::Text(text) => self.append_text(ui, &mut block, &text, &style),
                Event::Code(text) => self.append_code(ui, &mut block, &text),
                Event::Start(Tag::HtmlBlock) | Event::End(TagEnd::HtmlBlock) => {
                    self.flush(ui, &mut block, quote_depth > 0);
                }
                Event::Html(text) | Event::InlineHtml(text) => self.append_code(ui, &mut block, &text),
                Event::FootnoteReference(label) => {
                    self.append_text(ui, &mut block, &format!("[{label}]"), &style)
                }
                Event::SoftBreak => self.append_text(ui, &mut block, " ", &style),
                Event::HardBreak => self.append_text(ui, &mut block, "\n", &style),
                Event::Rule => {
                    self.flush(ui, &mut block, quote_depth > 0);
                    ui.separator();
                    ui.add_space(8.0);
                }
                _ => {}
            }
        }

        self.flush(ui, &mut block, quote_depth > 0);
    }

    fn new_block(&self, indent: f32) -> PendingBlock {
        PendingBlock {
            job: LayoutJob {
                halign: egui::Align::LEFT,
                ..Default::default()
            },
            link: None,
            indent,
        }
    }

    fn text_format(&self, ui: &Ui, style: &InlineStyle) -> TextFormat {
        let font_size = match style.heading {
            Some(1) => self.base_font_size * 2.0,
            Some(2) => self.base_font_size * 1.7,
            Some(3) => self.base_font_size * 1.4,
            Some(4) => self.base_font_size * 1.2,
            Some(5) => self.base_font_size * 1.1,
            _ => self.base_font_size,
        };
        let color = if style.link.is_some() {
            ui.visuals().hyperlink_color
        } else if style.strong || style.heading.is_some() {
            ui.visuals().strong_text_color()
        } else {
            ui.visuals().text_color()
        };

        TextFormat {
            font_id: FontId::proportional(font_size),
            color,
            italics: style.emphasis,
            underline: if style.link.is_some() {
                Stroke::new(1.0, color)
            } else {
                Stroke::NONE
            },
            strikethrough: if style.strikethrough {
                Stroke::new(1.0, color)
            } else {
                Stroke::NONE
            },
            ..Default::default()
        }
    }

    fn append_text(&self, ui: &Ui, block: &mut PendingBlock, text: &str, style: &InlineStyle) {
        block.job.append(text, 0.0, self.text_format(ui, style));
    }

    fn append_code(&self, ui: &Ui, block: &mut PendingBlock, text: &str) {
        block.job.append(
            text,
            0.0,
            TextFormat {
                font_id: FontId::monospace(self.base_font_size * 0.9),
                color: ui.visuals().text_color(),
                background: ui.visuals().code_bg_color,
                ..Default::default()
            },
        );
    }

    /// Lays out the collected inline content, if any, and starts a new block.
    fn flush(&self, ui: &mut Ui, block: &mut PendingBlock, quoted: bool) {
        let indent = block.indent;
        let finished = std::mem::replace(block, self.new_block(indent));
        if finished.job.text.is_empty() {
            return;
        }

        let PendingBlock {
            mut job,
            link,
            indent,
        } = finished;
        let max_width = (ui.available_width() - indent - if quoted { 40.0 } else { 0.0 }).max(50.0);
        job.wrap.max_width = max_width;
        job.wrap.break_anywhere = false;

        let response = ui
            .horizontal(|ui| {
                ui.add_space(indent);
                if quoted {
                    egui::Frame::none()
                        .fill(ui.visuals().faint_bg_color)
                        .inner_margin(egui::Margin::same(12.0))
                        .outer_margin(egui::Margin::same(4.0))
                        .stroke(egui::Stroke::new(4.0, ui.visuals().weak_text_color()))
                        .show(ui, |ui| ui.add(egui::Label::new(job).wrap()))
                        .inner
                } else {
                    ui.add(egui::Label::new(job).wrap().sense(Sense::click()))
                }
            })
            .inner;

        if let Some(url) = link.filter(|u| u.starts_with("http://") || u.starts_with("https://")) {
            if response.hovered() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }
            if response.clicked() {
                if let Err(e) = webbrowser::open(&url) {
                    log::warn!("Could not open {url}: {e}");
                }
            }
        }
    }

    fn render_table(&self, ui: &mut Ui, rows: &[Vec<String>], index: usize) {
        egui::Frame::none()
            .stroke(egui::Stroke::new(1.0, ui.visuals().weak_text_color()))
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(("markdown_table", index))
                    .striped(true)
                    .spacing([16.0, 4.0])
                    .show(ui, |ui| {
                        for (row_index, row) in rows.iter().enumerate() {
                            for cell in row {
                                let text = RichText::new(cell).size(self.base_font_size);
                                ui.label(if row_index == 0 { text.strong() } else { text });
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    fn render_code_block(&self, ui: &mut Ui, content: &str, language: &str) {
        let max_width = ui.available_width();
        egui::Frame::none()
            .fill(ui.visuals().code_bg_color)
            .inner_margin(10.0)
            .rounding(3.0)
            .show(ui, |ui| {
                let mut job = if language.is_empty() {
                    LayoutJob::single_section(
                        content.to_string(),
                        TextFormat {
                            font_id: FontId::monospace(self.base_font_size * 0.9),
                            color: ui.visuals().text_color(),
                            ..Default::default()
                        },
                    )
                } else {
                    self.highlight(ui, content, language)
                };
                job.wrap.max_width = max_width;
                job.halign = egui::Align::LEFT;
                ui.set_min_width(max_width - 20.0);
                ui.add(egui::Label::new(job).wrap());
            });
    }

    fn highlight(&self, ui: &Ui, content: &str, language: &str) -> LayoutJob {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(language)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        let theme_name = if ui.visuals().dark_mode {
            "base16-ocean.dark"
        } else {
            "InspiredGitHub"
        };
        let mut job = LayoutJob::default();
        let Some(theme) = self.theme_set.themes.get(theme_name) else {
            return job;
        };
        let mut highlighter = HighlightLines::new(syntax, theme);

        for line in LinesWithEndings::from(content) {
            let ranges = highlighter
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_else(|_| vec![(syntect::highlighting::Style::default(), line)]);

            for (style, text) in ranges {
                let color =
                    Color32::from_rgb(style.foreground.r, style.foreground.g, style.foreground.b);
                job.append(
                    text,
                    0.0,
                    TextFormat {
                        font_id: FontId::monospace(self.base_font_size * 0.9),
                        color,
                        ..Default::default()
                    },
                );
            }
        }
        job
    }
}

fn heading_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
