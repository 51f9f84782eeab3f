//! Minimal element tree for remote XML responses.
//!
//! Only element names (namespace prefixes stripped) and text content are kept;
//! attributes are not consumed by any response field we read.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::error::ResponseFormatError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Parsed response document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDocument {
    root: Element,
}

impl ResponseDocument {
    pub fn parse(xml: &str) -> Result<Self, ResponseFormatError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => stack.push(Element {
                    name: local_name(&e)?,
                    ..Default::default()
                }),
                Ok(Event::Empty(e)) => {
                    let element = Element {
                        name: local_name(&e)?,
                        ..Default::default()
                    };
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack.pop().ok_or_else(|| {
                        ResponseFormatError::Malformed("unbalanced end tag".to_string())
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(t)) => {
                    let text = t
                        .unescape()
                        .map_err(|e| ResponseFormatError::Malformed(e.to_string()))?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text);
                    }
                }
                Ok(Event::CData(c)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(ResponseFormatError::Malformed(format!(
                        "at byte {}: {}",
                        reader.error_position(),
                        e
                    )));
                }
            }
        }

        if !stack.is_empty() {
            return Err(ResponseFormatError::Malformed(
                "unclosed element at end of document".to_string(),
            ));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| ResponseFormatError::Malformed("empty document".to_string()))
    }

    pub fn root_name(&self) -> &str {
        &self.root.name
    }

    /// Text of the element at `path` (e.g. `Status/errorCode`) below the root.
    /// Absent elements and empty text both yield `None`.
    pub fn text(&self, path: &str) -> Option<&str> {
        let mut node = &self.root;
        for segment in path.split('/') {
            node = node.child(segment)?;
        }
        let text = node.text.trim();
        if text.is_empty() { None } else { Some(text) }
    }
}

fn local_name(e: &BytesStart<'_>) -> Result<String, ResponseFormatError> {
    std::str::from_utf8(e.name().local_name().as_ref())
        .map(str::to_string)
        .map_err(|e| ResponseFormatError::Malformed(e.to_string()))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), ResponseFormatError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(ResponseFormatError::Malformed(
                "multiple root elements".to_string(),
            ));
        }
    }
    Ok(())
}
