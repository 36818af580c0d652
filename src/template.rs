//! Export templates: which sizes to produce and what to call them.
//!
//! An [`ExportTemplate`] is an ordered list of [`Item`]s (width, height,
//! optional naming pattern) plus a fallback pattern and an output
//! subdirectory. Templates are persisted as namespaced XML:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <template name="iOS" outputDirectory="iOS" fallbackNamingPattern="Icon-%w"
//!           xmlns="http://www.cenobiteelf.com/ns/icolib">
//!   <items>
//!     <item namingPattern="Icon-20">
//!       <width>20</width>
//!       <height>20</height>
//!     </item>
//!   </items>
//! </template>
//! ```
//!
//! ## Schema
//!
//! Loading checks the document against this shape explicitly instead of
//! mapping it by reflection:
//!
//! - the root is `<template>` in [`SCHEMA_NAMESPACE`], with a required `name`
//!   and optional `outputDirectory` / `fallbackNamingPattern` attributes
//! - at most one `<items>`, containing only `<item>` elements
//! - each `<item>` has an optional `namingPattern` attribute and exactly one
//!   `<width>` and one `<height>`, each a non-negative integer
//!
//! Namespace declarations and prefixed attributes (`xmlns:xsi`, `xsi:type`) are
//! ignored. Anything else (unknown elements or attributes, stray text,
//! duplicated fields) is a [`TemplateError::Schema`] and the whole load fails.

use crate::naming;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::{NsReader, Writer};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// XML namespace every template element lives in.
pub const SCHEMA_NAMESPACE: &str = "http://www.cenobiteelf.com/ns/icolib";

const TEMPLATE_EXTENSION: &str = "xml";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("XML attribute error: {0}")]
    Attr(#[from] AttrError),
    #[error("Template does not match schema: {0}")]
    Schema(String),
    #[error("No naming pattern for {width}x{height} item and the template has no fallback")]
    UnresolvedPattern { width: u32, height: u32 },
    #[error("Template '{name}' not found at {}", path.display())]
    MissingTemplate { name: String, path: PathBuf },
}

impl TemplateError {
    /// True for failures that mean the document itself is malformed.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            TemplateError::Xml(_) | TemplateError::Attr(_) | TemplateError::Schema(_)
        )
    }
}

fn schema(message: impl Into<String>) -> TemplateError {
    TemplateError::Schema(message.into())
}

/// One output file: a size and, optionally, its own naming pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub width: u32,
    pub height: u32,
    /// `None` (or blank) means "use the template's fallback".
    pub naming_pattern: Option<String>,
}

impl Item {
    pub fn new(width: u32, height: u32, naming_pattern: Option<&str>) -> Self {
        Self {
            width,
            height,
            naming_pattern: naming_pattern.map(str::to_string),
        }
    }

    /// A `side` x `side` item.
    pub fn square(side: u32, naming_pattern: Option<&str>) -> Self {
        Self::new(side, side, naming_pattern)
    }
}

/// A named, ordered set of icon sizes.
///
/// Build it up front (or load it), then hand it to the exporter by shared
/// reference; nothing mutates it during an export.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportTemplate {
    pub name: String,
    /// Subdirectory of the export root that all items are written under.
    pub output_directory: String,
    /// Pattern for items without one of their own. May be empty.
    pub fallback_naming_pattern: String,
    items: Vec<Item>,
}

impl ExportTemplate {
    pub fn new(
        name: impl Into<String>,
        output_directory: impl Into<String>,
        fallback_naming_pattern: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            output_directory: output_directory.into(),
            fallback_naming_pattern: fallback_naming_pattern.into(),
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.items.extend(items);
        self
    }

    pub fn push_item(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Items in template order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Output base name for `item`: its own pattern if it has a non-blank one,
    /// otherwise the fallback, with `%w`/`%h` expanded.
    pub fn resolve_name(&self, item: &Item) -> Result<String, TemplateError> {
        let pattern = match item.naming_pattern.as_deref() {
            Some(own) if !naming::is_blank(Some(own)) => own,
            _ if !naming::is_blank(Some(&self.fallback_naming_pattern)) => {
                self.fallback_naming_pattern.as_str()
            }
            _ => {
                return Err(TemplateError::UnresolvedPattern {
                    width: item.width,
                    height: item.height,
                });
            }
        };
        Ok(naming::expand_pattern(pattern, item.width, item.height))
    }

    /// Read and validate a template file.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let xml = fs::read_to_string(path)?;
        Self::from_xml(&xml)
    }

    /// Write the template to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), TemplateError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_xml()?)?;
        Ok(())
    }

    pub fn to_xml(&self) -> Result<String, TemplateError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let mut root = BytesStart::new("template");
        root.push_attribute(("name", self.name.as_str()));
        root.push_attribute(("outputDirectory", self.output_directory.as_str()));
        if !self.fallback_naming_pattern.is_empty() {
            root.push_attribute((
                "fallbackNamingPattern",
                self.fallback_naming_pattern.as_str(),
            ));
        }
        root.push_attribute(("xmlns", SCHEMA_NAMESPACE));
        writer.write_event(Event::Start(root))?;

        writer.write_event(Event::Start(BytesStart::new("items")))?;
        for item in &self.items {
            let mut element = BytesStart::new("item");
            if let Some(pattern) = &item.naming_pattern {
                element.push_attribute(("namingPattern", pattern.as_str()));
            }
            writer.write_event(Event::Start(element))?;
            write_number(&mut writer, "width", item.width)?;
            write_number(&mut writer, "height", item.height)?;
            writer.write_event(Event::End(BytesEnd::new("item")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("items")))?;
        writer.write_event(Event::End(BytesEnd::new("template")))?;

        let mut xml = String::from_utf8(writer.into_inner())
            .map_err(|e| schema(format!("writer produced invalid UTF-8: {e}")))?;
        xml.push('\n');
        Ok(xml)
    }

    /// Parse and validate a template document.
    pub fn from_xml(xml: &str) -> Result<Self, TemplateError> {
        let mut reader = NsReader::from_str(xml);
        reader.config_mut().trim_text(true);

        let template = loop {
            let (in_ns, event) = next_event(&mut reader)?;
            match event {
                Event::Start(e) => {
                    let mut template = read_root(in_ns, &e)?;
                    template.items = read_root_children(&mut reader)?;
                    break template;
                }
                Event::Empty(e) => break read_root(in_ns, &e)?,
                Event::Text(_) | Event::CData(_) => {
                    return Err(schema("text outside the <template> element"));
                }
                Event::Eof => return Err(schema("document has no <template> element")),
                _ => {}
            }
        };

        loop {
            match next_event(&mut reader)?.1 {
                Event::Eof => break,
                Event::Start(_) | Event::Empty(_) | Event::Text(_) | Event::CData(_) => {
                    return Err(schema("content after the </template> element"));
                }
                _ => {}
            }
        }

        Ok(template)
    }
}

fn write_number(writer: &mut Writer<Vec<u8>>, tag: &str, value: u32) -> Result<(), TemplateError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(&value.to_string())))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Next event plus whether its element name resolved to our namespace.
fn next_event<'i>(reader: &mut NsReader<&'i [u8]>) -> Result<(bool, Event<'i>), TemplateError> {
    let (ns, event) = reader.read_resolved_event()?;
    let in_ns = matches!(ns, ResolveResult::Bound(Namespace(uri)) if uri == SCHEMA_NAMESPACE.as_bytes());
    Ok((in_ns, event))
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn expect_element(in_ns: bool, e: &BytesStart, expected: &str) -> Result<(), TemplateError> {
    let found = local_name(e);
    if found != expected {
        return Err(schema(format!("expected <{expected}>, found <{found}>")));
    }
    if !in_ns {
        return Err(schema(format!(
            "<{found}> is not in the {SCHEMA_NAMESPACE} namespace"
        )));
    }
    Ok(())
}

/// Unprefixed, non-namespace attributes as `(name, unescaped value)`.
fn attributes(e: &BytesStart) -> Result<Vec<(String, String)>, TemplateError> {
    let mut out = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if key == "xmlns" || key.contains(':') {
            continue;
        }
        out.push((key, attr.unescape_value()?.into_owned()));
    }
    Ok(out)
}

fn read_root(in_ns: bool, e: &BytesStart) -> Result<ExportTemplate, TemplateError> {
    expect_element(in_ns, e, "template")?;
    let mut name = None;
    let mut template = ExportTemplate::default();
    for (key, value) in attributes(e)? {
        match key.as_str() {
            "name" => name = Some(value),
            "outputDirectory" => template.output_directory = value,
            "fallbackNamingPattern" => template.fallback_naming_pattern = value,
            other => return Err(schema(format!("unknown attribute '{other}' on <template>"))),
        }
    }
    template.name = name.ok_or_else(|| schema("<template> is missing the 'name' attribute"))?;
    Ok(template)
}

fn read_root_children(reader: &mut NsReader<&[u8]>) -> Result<Vec<Item>, TemplateError> {
    let mut items: Option<Vec<Item>> = None;
    loop {
        let (in_ns, event) = next_event(reader)?;
        match event {
            Event::Start(e) | Event::Empty(e) if items.is_some() => {
                return Err(schema(format!(
                    "unexpected <{}> after <items>",
                    local_name(&e)
                )));
            }
            Event::Start(e) => {
                expect_element(in_ns, &e, "items")?;
                reject_attributes(&e)?;
                items = Some(read_items(reader)?);
            }
            Event::Empty(e) => {
                expect_element(in_ns, &e, "items")?;
                reject_attributes(&e)?;
                items = Some(Vec::new());
            }
            Event::End(_) => return Ok(items.unwrap_or_default()),
            Event::Text(_) | Event::CData(_) => {
                return Err(schema("unexpected text inside <template>"));
            }
            Event::Eof => return Err(schema("document ends inside <template>")),
            _ => {}
        }
    }
}

fn reject_attributes(e: &BytesStart) -> Result<(), TemplateError> {
    match attributes(e)?.first() {
        Some((key, _)) => Err(schema(format!(
            "unknown attribute '{key}' on <{}>",
            local_name(e)
        ))),
        None => Ok(()),
    }
}

fn read_items(reader: &mut NsReader<&[u8]>) -> Result<Vec<Item>, TemplateError> {
    let mut items = Vec::new();
    loop {
        let (in_ns, event) = next_event(reader)?;
        match event {
            Event::Start(e) => {
                expect_element(in_ns, &e, "item")?;
                let index = items.len();
                let naming_pattern = item_pattern(&e, index)?;
                let (width, height) = read_item_size(reader, index)?;
                items.push(Item {
                    width,
                    height,
                    naming_pattern,
                });
            }
            Event::Empty(e) => {
                expect_element(in_ns, &e, "item")?;
                return Err(schema(format!(
                    "item {} has no <width> or <height>",
                    items.len() + 1
                )));
            }
            Event::End(_) => return Ok(items),
            Event::Text(_) | Event::CData(_) => {
                return Err(schema("unexpected text inside <items>"));
            }
            Event::Eof => return Err(schema("document ends inside <items>")),
            _ => {}
        }
    }
}

fn item_pattern(e: &BytesStart, index: usize) -> Result<Option<String>, TemplateError> {
    let mut pattern = None;
    for (key, value) in attributes(e)? {
        match key.as_str() {
            "namingPattern" => pattern = Some(value),
            other => {
                return Err(schema(format!(
                    "unknown attribute '{other}' on item {}",
                    index + 1
                )));
            }
        }
    }
    Ok(pattern)
}

fn read_item_size(reader: &mut NsReader<&[u8]>, index: usize) -> Result<(u32, u32), TemplateError> {
    let mut width = None;
    let mut height = None;
    loop {
        let (in_ns, event) = next_event(reader)?;
        match event {
            Event::Start(e) => {
                let field = local_name(&e);
                let slot = match field.as_str() {
                    "width" => &mut width,
                    "height" => &mut height,
                    _ => {
                        return Err(schema(format!(
                            "unexpected <{field}> in item {}",
                            index + 1
                        )));
                    }
                };
                expect_element(in_ns, &e, &field)?;
                reject_attributes(&e)?;
                if slot.is_some() {
                    return Err(schema(format!(
                        "item {} has more than one <{field}>",
                        index + 1
                    )));
                }
                *slot = Some(read_number(reader, &field, index)?);
            }
            Event::Empty(e) => {
                return Err(schema(format!(
                    "<{}> in item {} is empty",
                    local_name(&e),
                    index + 1
                )));
            }
            Event::End(_) => break,
            Event::Text(_) | Event::CData(_) => {
                return Err(schema(format!("unexpected text in item {}", index + 1)));
            }
            Event::Eof => return Err(schema("document ends inside <item>")),
            _ => {}
        }
    }
    match (width, height) {
        (Some(w), Some(h)) => Ok((w, h)),
        (None, _) => Err(schema(format!("item {} has no <width>", index + 1))),
        (_, None) => Err(schema(format!("item {} has no <height>", index + 1))),
    }
}

fn read_number(reader: &mut NsReader<&[u8]>, field: &str, index: usize) -> Result<u32, TemplateError> {
    let text = match next_event(reader)?.1 {
        Event::Text(t) => t.unescape()?.into_owned(),
        _ => {
            return Err(schema(format!(
                "<{field}> in item {} has no value",
                index + 1
            )));
        }
    };
    let value = text.trim().parse::<u32>().map_err(|_| {
        schema(format!(
            "<{field}> in item {} is not a non-negative integer: '{text}'",
            index + 1
        ))
    })?;
    match next_event(reader)?.1 {
        Event::End(_) => Ok(value),
        _ => Err(schema(format!(
            "<{field}> in item {} must contain only a number",
            index + 1
        ))),
    }
}

/// A template file found by [`TemplateStore::list`].
#[derive(Debug)]
pub struct StoredTemplate {
    pub path: PathBuf,
    pub template: Result<ExportTemplate, TemplateError>,
}

/// A directory of `<name>.xml` template files.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a template with this name is stored in (name lowercased).
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{TEMPLATE_EXTENSION}", name.to_lowercase()))
    }

    pub fn load(&self, name: &str) -> Result<ExportTemplate, TemplateError> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(TemplateError::MissingTemplate {
                name: name.to_string(),
                path,
            });
        }
        log::debug!("loading template '{}' from {}", name, path.display());
        ExportTemplate::load(&path)
    }

    /// Save under [`path_for`](Self::path_for)`(template.name)` and return the path.
    pub fn save(&self, template: &ExportTemplate) -> Result<PathBuf, TemplateError> {
        let path = self.path_for(&template.name);
        template.save(&path)?;
        log::info!("saved template '{}' to {}", template.name, path.display());
        Ok(path)
    }

    /// Every `.xml` file directly inside the store, sorted by file name.
    ///
    /// Files that fail to load are returned with their error rather than
    /// skipped. A missing directory lists as empty.
    pub fn list(&self) -> Vec<StoredTemplate> {
        if !self.dir.is_dir() {
            return Vec::new();
        }
        WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(TEMPLATE_EXTENSION))
            })
            .map(|entry| StoredTemplate {
                path: entry.path().to_path_buf(),
                template: ExportTemplate::load(entry.path()),
            })
            .collect()
    }
}
