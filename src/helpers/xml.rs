//! XML parsing utilities for OpenDocument Spreadsheet (ODS) format
//! Provides the XML reader wrapper, the token source adapter and helper traits
//! for attribute and text processing

use crate::error::RustyOdsError;
use crate::spreadsheet::Attributes;
use crate::spreadsheet::Token;
use crate::spreadsheet::TokenSource;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::name::LocalName;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use thiserror::Error;

/// Errors specific to XML parsing operations
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Parse entity '{0}' failed")]
    ParseEntityError(String),
}

/// XML reader wrapper with optimized configuration for spreadsheet parsing
pub struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    /// Creates a new XML reader with optimized configuration for spreadsheet parsing
    pub fn new(buf_reader: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(buf_reader);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        config.expand_empty_elements = true;
        config.trim_text(false);

        let buffer = Vec::with_capacity(1024);
        XmlReader { reader, buffer }
    }

    /// Reads the next XML event from the reader
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, RustyOdsError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer) {
            Ok(Event::Eof) => Ok(None),
            Ok(event) => Ok(Some(event)),
            Err(error) => Err(RustyOdsError::XmlError(error)),
        }
    }
}

impl<R: BufRead> TokenSource for XmlReader<R> {
    /// Converts borrowed quick-xml events into owned tokens.
    /// Comments, declarations, processing instructions and doctype are dropped.
    fn next_token(&mut self) -> Result<Option<Token>, RustyOdsError> {
        loop {
            let token = match self.next()? {
                None => return Ok(None),
                Some(Event::Start(event)) => Token::Start {
                    name: to_name(event.local_name())?,
                    attributes: event.to_attributes()?,
                },
                Some(Event::End(event)) => Token::End {
                    name: to_name(event.local_name())?,
                },
                Some(Event::Text(event)) => {
                    let mut text = String::new();
                    text.push_bytes_text(&event)?;
                    Token::Text(text)
                }
                Some(Event::GeneralRef(event)) => {
                    let mut text = String::new();
                    text.push_bytes_ref(&event)?;
                    Token::Text(text)
                }
                Some(Event::CData(event)) => Token::Text(std::str::from_utf8(&event)?.to_owned()),
                Some(_) => continue,
            };
            return Ok(Some(token));
        }
    }
}

/// Decodes a namespace-stripped element or attribute name
fn to_name(name: LocalName) -> Result<String, RustyOdsError> {
    Ok(std::str::from_utf8(name.as_ref())?.to_owned())
}

/// Helper trait for XML attributes providing convenient value extraction
pub(crate) trait XmlAttributeHelper<'a> {
    /// Gets the unescaped attribute value as a string
    fn get_value(&self) -> Result<Cow<'a, str>, RustyOdsError>;
}

impl<'a> XmlAttributeHelper<'a> for Attribute<'a> {
    /// Gets the unescaped attribute value
    fn get_value(&self) -> Result<Cow<'a, str>, RustyOdsError> {
        Ok(self.unescape_value()?)
    }
}

/// Helper trait for XML nodes providing attribute access methods
pub(crate) trait XmlNodeHelper {
    /// Collects all attributes keyed by their local name
    fn to_attributes(&self) -> Result<Attributes, RustyOdsError>;
}

impl XmlNodeHelper for BytesStart<'_> {
    fn to_attributes(&self) -> Result<Attributes, RustyOdsError> {
        let mut attributes = Attributes::new();
        for attribute in self.attributes() {
            let attribute = attribute?;
            let name = to_name(attribute.key.local_name())?;
            attributes.insert(name, attribute.get_value()?.into_owned());
        }
        Ok(attributes)
    }
}

/// Helper trait for building text content from XML events
pub(crate) trait XmlTextContextHelper {
    /// Appends text content from BytesText event
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), RustyOdsError>;

    /// Appends text content from BytesRef event (handles entities and character references)
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), RustyOdsError>;
}

impl XmlTextContextHelper for String {
    /// Appends text content from BytesText event
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), RustyOdsError> {
        self.push_str(&text.xml_content()?);
        Ok(())
    }

    /// Appends text content from BytesRef event, handling XML entities and character references
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), RustyOdsError> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = if let Some(hex) = number.strip_prefix('x') {
                u32::from_str_radix(hex, 16)?
            } else {
                number.parse::<u32>()?
            };
            if let Some(character) = std::char::from_u32(code) {
                self.push(character);
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else {
            Err(XmlError::ParseEntityError(raw.to_string()))?;
        }

        Ok(())
    }
}

#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(result) = $reader.next()? {
            match result {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}
