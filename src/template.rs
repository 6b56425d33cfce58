//! Templates: a source file with every translatable text replaced by a named
//! placeholder.
//!
//! Text form:
//!
//! * `$$` is a literal `$`,
//! * `${name}` is a placeholder,
//! * `${name:index:width}` is part `index` of a text that spans several source
//!   lines; `width` is the character length of that part in the source file.

use std::{fmt, str::FromStr};

use crate::error::Error;

/// Placeholder name used for files translated as a single block of text.
pub const WHOLE_TEXT_KEY: &str = "text";

/// Turns a raw key into a placeholder name.
///
/// `.` becomes `-`; `{`, `}`, `$`, `:` and whitespace become `_`. Every other
/// character is kept.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '.' => '-',
            '{' | '}' | '$' | ':' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

/// Position of a fragment within a multi-line text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Part {
    pub index: usize,
    /// Characters the fragment occupied in the source.
    pub width: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placeholder {
    pub name: String,
    pub part: Option<Part>,
}

impl Placeholder {
    pub fn whole(name: impl Into<String>) -> Self {
        Placeholder {
            name: name.into(),
            part: None,
        }
    }

    pub fn part(name: impl Into<String>, index: usize, width: usize) -> Self {
        Placeholder {
            name: name.into(),
            part: Some(Part { index, width }),
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.part {
            Some(Part { index, width }) => write!(f, "${{{}:{}:{}}}", self.name, index, width),
            None => write!(f, "${{{}}}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// Ordered literal and placeholder segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// A template made of one whole-text placeholder.
    pub fn whole_text() -> Self {
        let mut template = Self::new();
        template.push_placeholder(Placeholder::whole(WHOLE_TEXT_KEY));
        template
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Appends literal text, merging it into a preceding literal.
    pub fn push_literal(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Literal(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Literal(text.to_string()));
        }
    }

    pub fn push_placeholder(&mut self, placeholder: Placeholder) {
        self.segments.push(Segment::Placeholder(placeholder));
    }

    /// Source widths of the parts of one occurrence of a multi-line text,
    /// starting with the part placeholder at segment `position`.
    ///
    /// A key can be assigned several times with a different number of lines
    /// each time, so the parts of each occurrence are collected separately.
    pub fn occurrence_widths(&self, position: usize) -> Vec<usize> {
        let Some(Segment::Placeholder(Placeholder { name, part: Some(first) })) =
            self.segments.get(position)
        else {
            return Vec::new();
        };
        let mut widths = vec![0; first.index];
        widths.push(first.width);
        for segment in &self.segments[position + 1..] {
            let Segment::Placeholder(placeholder) = segment else {
                continue;
            };
            if placeholder.name != *name {
                continue;
            }
            match placeholder.part {
                Some(part) if part.index == widths.len() => widths.push(part.width),
                _ => break,
            }
        }
        widths
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => f.write_str(&text.replace('$', "$$"))?,
                Segment::Placeholder(placeholder) => write!(f, "{}", placeholder)?,
            }
        }
        Ok(())
    }
}

impl FromStr for Template {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut template = Template::new();
        let mut literal_start = 0;
        let mut cursor = 0;

        while let Some(found) = text[cursor..].find('$') {
            let dollar = cursor + found;
            template.push_literal(&text[literal_start..dollar]);
            let rest = &text[dollar + 1..];
            if rest.starts_with('$') {
                template.push_literal("$");
                cursor = dollar + 2;
            } else if rest.starts_with('{') {
                let close = rest
                    .find('}')
                    .ok_or_else(|| Error::template(dollar, "unterminated placeholder"))?;
                let placeholder = parse_placeholder(&rest[1..close], dollar)?;
                template.push_placeholder(placeholder);
                cursor = dollar + 1 + close + 1;
            } else {
                return Err(Error::template(dollar, "`$` must be followed by `$` or `{`"));
            }
            literal_start = cursor;
        }
        template.push_literal(&text[literal_start..]);
        Ok(template)
    }
}

fn parse_placeholder(body: &str, offset: usize) -> Result<Placeholder, Error> {
    let mut fields = body.split(':');
    let name = fields.next().unwrap_or_default();
    if name.is_empty() {
        return Err(Error::template(offset, "empty placeholder name"));
    }
    let mut number = |what: &str| -> Result<Option<usize>, Error> {
        fields
            .next()
            .map(|field| {
                field
                    .parse::<usize>()
                    .map_err(|_| Error::template(offset, format!("invalid part {what} `{field}`")))
            })
            .transpose()
    };
    let index = number("index")?;
    let width = number("width")?;
    if fields.next().is_some() {
        return Err(Error::template(offset, "too many placeholder fields"));
    }
    match (index, width) {
        (None, _) => Ok(Placeholder::whole(name)),
        (Some(index), Some(width)) => Ok(Placeholder::part(name, index, width)),
        (Some(_), None) => Err(Error::template(offset, "part width missing")),
    }
}
