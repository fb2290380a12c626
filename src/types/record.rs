use std::io::BufRead;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::identifiers::GroupId;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("line {line}: expected {expected} tab-separated fields for {shape:?}, found {found}")]
    FieldCount {
        line: usize,
        shape: RecordShape,
        expected: &'static str,
        found: usize,
    },
    #[error("line {line}: field `{field}` is not a non-negative integer: {value:?}")]
    InvalidInteger {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("line {line}: empty word")]
    EmptyWord { line: usize },
    #[error("record for `{word}` has no `{field}` required by {shape:?}")]
    MissingField {
        word: String,
        field: &'static str,
        shape: RecordShape,
    },
    #[error("IO error reading records: {0}")]
    Io(#[from] std::io::Error),
}

/// Tab-separated layouts exchanged between pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordShape {
    /// `word, left, right`
    Plain,
    /// `word, left, right, sentence`
    WithSentence,
    /// `word, left, right, sentence, group_id[, frequency]`
    Grouped,
    /// `word, left, right, frequency`
    WithFrequency,
}

/// One pipeline line. Which optional fields are set depends on the shape
/// it was read with or produced for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRecord {
    pub word: String,
    pub left: String,
    pub right: String,
    pub sentence: Option<String>,
    pub group_id: Option<GroupId>,
    pub frequency: Option<u64>,
}

impl ContextRecord {
    pub fn new(word: impl Into<String>, left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            left: left.into(),
            right: right.into(),
            sentence: None,
            group_id: None,
            frequency: None,
        }
    }

    pub fn with_sentence(mut self, sentence: impl Into<String>) -> Self {
        self.sentence = Some(sentence.into());
        self
    }

    /// Parse one line. `line_no` is only used for error reporting.
    pub fn parse(line: &str, shape: RecordShape, line_no: usize) -> Result<Self, RecordError> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        let fields: Vec<&str> = line.split('\t').collect();

        let field_count_ok = match shape {
            RecordShape::Plain => fields.len() == 3,
            RecordShape::WithSentence | RecordShape::WithFrequency => fields.len() == 4,
            RecordShape::Grouped => fields.len() == 5 || fields.len() == 6,
        };
        if !field_count_ok {
            return Err(RecordError::FieldCount {
                line: line_no,
                shape,
                expected: shape.expected_fields(),
                found: fields.len(),
            });
        }
        if fields[0].is_empty() {
            return Err(RecordError::EmptyWord { line: line_no });
        }

        let mut record = ContextRecord::new(fields[0], fields[1], fields[2]);
        match shape {
            RecordShape::Plain => {}
            RecordShape::WithSentence => {
                record.sentence = Some(fields[3].to_string());
            }
            RecordShape::Grouped => {
                record.sentence = Some(fields[3].to_string());
                record.group_id = Some(GroupId(parse_integer(fields[4], "group_id", line_no)?));
                if let Some(freq) = fields.get(5) {
                    record.frequency = Some(parse_integer(freq, "frequency", line_no)?);
                }
            }
            RecordShape::WithFrequency => {
                record.frequency = Some(parse_integer(fields[3], "frequency", line_no)?);
            }
        }
        Ok(record)
    }

    /// Render as a tab-separated line (without terminator).
    pub fn to_line(&self, shape: RecordShape) -> Result<String, RecordError> {
        let mut fields: Vec<String> =
            vec![self.word.clone(), self.left.clone(), self.right.clone()];
        match shape {
            RecordShape::Plain => {}
            RecordShape::WithSentence => {
                fields.push(self.require_sentence(shape)?.to_string());
            }
            RecordShape::Grouped => {
                fields.push(self.require_sentence(shape)?.to_string());
                let group_id = self.group_id.ok_or_else(|| self.missing("group_id", shape))?;
                fields.push(group_id.0.to_string());
                if let Some(freq) = self.frequency {
                    fields.push(freq.to_string());
                }
            }
            RecordShape::WithFrequency => {
                let freq = self.frequency.ok_or_else(|| self.missing("frequency", shape))?;
                fields.push(freq.to_string());
            }
        }
        Ok(fields.join("\t"))
    }

    fn require_sentence(&self, shape: RecordShape) -> Result<&str, RecordError> {
        self.sentence
            .as_deref()
            .ok_or_else(|| self.missing("sentence", shape))
    }

    fn missing(&self, field: &'static str, shape: RecordShape) -> RecordError {
        RecordError::MissingField {
            word: self.word.clone(),
            field,
            shape,
        }
    }
}

impl RecordShape {
    fn expected_fields(self) -> &'static str {
        match self {
            RecordShape::Plain => "3",
            RecordShape::WithSentence | RecordShape::WithFrequency => "4",
            RecordShape::Grouped => "5 or 6",
        }
    }
}

fn parse_integer(value: &str, field: &'static str, line: usize) -> Result<u64, RecordError> {
    // u64::from_str accepts a leading '+', which no stage ever writes
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RecordError::InvalidInteger {
            line,
            field,
            value: value.to_string(),
        });
    }
    value.parse().map_err(|_| RecordError::InvalidInteger {
        line,
        field,
        value: value.to_string(),
    })
}

/// Streaming reader over tab-separated records.
pub struct Records<R> {
    reader: R,
    shape: RecordShape,
    line_no: usize,
    buf: String,
}

pub fn read_records<R: BufRead>(reader: R, shape: RecordShape) -> Records<R> {
    Records {
        reader,
        shape,
        line_no: 0,
        buf: String::new(),
    }
}

impl<R: BufRead> Iterator for Records<R> {
    type Item = Result<ContextRecord, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_line(&mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line_no += 1;
                Some(ContextRecord::parse(&self.buf, self.shape, self.line_no))
            }
            Err(e) => Some(Err(RecordError::Io(e))),
        }
    }
}
