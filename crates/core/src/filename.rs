use crate::rating::Rating;
use crate::style::Style;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub const DELIMITER: char = '-';
pub const DATE_TIME_FORMAT: &str = "%Y%m%d-%H%M%S";
pub const STYLE_TAG: char = 'S';
pub const RATING_TAG: char = 'R';
pub const MAX_SEQUENCE: u8 = 99;

const MIN_CHUNKS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileNameChunk {
    Initials,
    #[serde(rename = "datetime")]
    DateTime,
    Sequence,
    Style,
    Rating,
    Original,
}

impl FileNameChunk {
    pub const ALL: [FileNameChunk; 6] = [
        FileNameChunk::Initials,
        FileNameChunk::DateTime,
        FileNameChunk::Sequence,
        FileNameChunk::Style,
        FileNameChunk::Rating,
        FileNameChunk::Original,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FileNameChunk::Initials => "initials",
            FileNameChunk::DateTime => "datetime",
            FileNameChunk::Sequence => "sequence",
            FileNameChunk::Style => "style",
            FileNameChunk::Rating => "rating",
            FileNameChunk::Original => "original",
        }
    }

    pub fn from_name(name: &str) -> Option<FileNameChunk> {
        FileNameChunk::ALL
            .into_iter()
            .find(|chunk| chunk.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn expected_len(self) -> usize {
        match self {
            FileNameChunk::Initials => 0,
            FileNameChunk::DateTime => 15,
            FileNameChunk::Sequence => 2,
            FileNameChunk::Style => 3,
            FileNameChunk::Rating => 2,
            FileNameChunk::Original => 0,
        }
    }
}

impl fmt::Display for FileNameChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FileNameError {
    #[error("ファイル名のチャンクが不足しています: [{0}]")]
    MissingChunks(String),
    #[error("{chunk} チャンク [{value}] の長さが不正です: 期待値 [{expected}] 実際 [{actual}]")]
    UnexpectedLength {
        chunk: FileNameChunk,
        value: String,
        expected: usize,
        actual: usize,
    },
    #[error("イニシャル [{0}] が不正です (英数字2〜10文字)")]
    Initials(String),
    #[error("日時 [{0}] が形式 [%Y%m%d-%H%M%S] に一致しません")]
    DateTime(String),
    #[error("連番 [{0}] が2桁の数値ではありません")]
    Sequence(String),
    #[error("連番 {0} は上限 99 を超えています")]
    SequenceOverflow(u32),
    #[error("スタイル [{0}] が不正です: [S##] 形式の既知のスタイルを指定してください")]
    Style(String),
    #[error("評価 [{0}] が不正です: [R#] 形式の既知の評価を指定してください")]
    Rating(String),
    #[error("元ファイル名が空です")]
    EmptyOriginal,
}

impl FileNameError {
    pub fn chunk(&self) -> Option<FileNameChunk> {
        match self {
            FileNameError::MissingChunks(_) => None,
            FileNameError::UnexpectedLength { chunk, .. } => Some(*chunk),
            FileNameError::Initials(_) => Some(FileNameChunk::Initials),
            FileNameError::DateTime(_) => Some(FileNameChunk::DateTime),
            FileNameError::Sequence(_) | FileNameError::SequenceOverflow(_) => {
                Some(FileNameChunk::Sequence)
            }
            FileNameError::Style(_) => Some(FileNameChunk::Style),
            FileNameError::Rating(_) => Some(FileNameChunk::Rating),
            FileNameError::EmptyOriginal => Some(FileNameChunk::Original),
        }
    }
}

/// A file name in the canonical `INITIALS-YYYYMMDD-HHMMSS-SS-Sxx-Ry-ORIGINAL` form.
///
/// `original` keeps the pre-rename file name including its extension, so it
/// may contain the delimiter. Encoding is recomputed by `Display` on every
/// call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalName {
    initials: String,
    date_time: String,
    sequence: u8,
    style: Style,
    rating: Rating,
    original: String,
}

impl CanonicalName {
    pub fn new(
        initials: &str,
        date_time: &str,
        sequence: u32,
        style: Style,
        rating: Rating,
        original: &str,
    ) -> Result<Self, FileNameError> {
        let sequence = u8::try_from(sequence)
            .ok()
            .filter(|value| *value <= MAX_SEQUENCE)
            .ok_or(FileNameError::SequenceOverflow(sequence))?;

        Ok(Self {
            initials: validate_initials(initials)?,
            date_time: validate_date_time(date_time)?,
            sequence,
            style,
            rating,
            original: validate_original(original)?,
        })
    }

    pub fn decode(raw: &str) -> Result<Self, FileNameError> {
        let chunks: Vec<&str> = raw.split(DELIMITER).collect();
        if chunks.len() < MIN_CHUNKS {
            return Err(FileNameError::MissingChunks(raw.to_string()));
        }

        let initials = validate_initials(chunks[0])?;
        let date_time = validate_date_time(&chunks[1..3].join("-"))?;
        let sequence = validate_sequence(chunks[3])?;

        let mut cursor = 4;
        let mut style = Style::None;
        let mut rating = Rating::None;

        // Style and rating are optional for names written before they existed.
        // A tag chunk is only taken when an original chunk still follows it.
        if cursor + 1 < chunks.len() && looks_like_tag(chunks[cursor], STYLE_TAG) {
            style = validate_style(chunks[cursor])?;
            cursor += 1;
        }
        if cursor + 1 < chunks.len() && looks_like_tag(chunks[cursor], RATING_TAG) {
            rating = validate_rating(chunks[cursor])?;
            cursor += 1;
        }

        let original = validate_original(&chunks[cursor..].join("-"))?;

        Ok(Self {
            initials,
            date_time,
            sequence,
            style,
            rating,
            original,
        })
    }

    pub fn initials(&self) -> &str {
        &self.initials
    }

    pub fn date_time(&self) -> &str {
        &self.date_time
    }

    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn original_stem(&self) -> &str {
        Path::new(&self.original)
            .file_stem()
            .and_then(|v| v.to_str())
            .unwrap_or(&self.original)
    }

    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.original)
            .extension()
            .and_then(|v| v.to_str())
    }

    pub fn set_initials(&mut self, initials: &str) -> Result<(), FileNameError> {
        self.initials = validate_initials(initials)?;
        Ok(())
    }

    pub fn set_date_time(&mut self, date_time: &str) -> Result<(), FileNameError> {
        self.date_time = validate_date_time(date_time)?;
        Ok(())
    }

    pub fn set_sequence(&mut self, sequence: &str) -> Result<(), FileNameError> {
        self.sequence = validate_sequence(sequence)?;
        Ok(())
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn set_rating(&mut self, rating: Rating) {
        self.rating = rating;
    }

    pub fn set_original(&mut self, original: &str) -> Result<(), FileNameError> {
        self.original = validate_original(original)?;
        Ok(())
    }

    pub fn update(&mut self, chunk: FileNameChunk, value: &str) -> Result<(), FileNameError> {
        match chunk {
            FileNameChunk::Initials => self.set_initials(value),
            FileNameChunk::DateTime => self.set_date_time(value),
            FileNameChunk::Sequence => self.set_sequence(value),
            FileNameChunk::Style => {
                self.style = parse_style_input(value)?;
                Ok(())
            }
            FileNameChunk::Rating => {
                self.rating = parse_rating_input(value)?;
                Ok(())
            }
            FileNameChunk::Original => self.set_original(value),
        }
    }

    pub fn value_of(&self, chunk: FileNameChunk) -> String {
        match chunk {
            FileNameChunk::Initials => self.initials.clone(),
            FileNameChunk::DateTime => self.date_time.clone(),
            FileNameChunk::Sequence => format!("{:02}", self.sequence),
            FileNameChunk::Style => self.style.name().to_string(),
            FileNameChunk::Rating => self.rating.name().to_string(),
            FileNameChunk::Original => self.original.clone(),
        }
    }

    pub fn describe(&self) -> NameDescription {
        let extension = self
            .extension()
            .map(|ext| format!(".{}", ext.to_ascii_uppercase()))
            .unwrap_or_default();
        let date_time = parse_date_time(&self.date_time)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.date_time.clone());

        NameDescription {
            original: self.original_stem().to_string(),
            extension,
            date_time,
            sequence: self.sequence.to_string(),
            style: pretty_enum_name(self.style.name()),
            rating: pretty_enum_name(self.rating.name()),
            initials: self.initials.clone(),
        }
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{initials}{d}{date_time}{d}{sequence:02}{d}{STYLE_TAG}{style:02}{d}{RATING_TAG}{rating:1}{d}{original}",
            initials = self.initials,
            date_time = self.date_time,
            sequence = self.sequence,
            style = self.style.id(),
            rating = self.rating.id(),
            original = self.original,
            d = DELIMITER,
        )
    }
}

impl FromStr for CanonicalName {
    type Err = FileNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CanonicalName::decode(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameDescription {
    pub original: String,
    pub extension: String,
    pub date_time: String,
    pub sequence: String,
    pub style: String,
    pub rating: String,
    pub initials: String,
}

pub fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT).ok()
}

pub fn validate_initials(initials: &str) -> Result<String, FileNameError> {
    check_length(FileNameChunk::Initials, initials)?;
    let len = initials.chars().count();
    if !(2..=10).contains(&len) || !initials.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return Err(FileNameError::Initials(initials.to_string()));
    }
    Ok(initials.to_ascii_uppercase())
}

pub fn validate_date_time(date_time: &str) -> Result<String, FileNameError> {
    check_length(FileNameChunk::DateTime, date_time)?;
    parse_date_time(date_time)
        .map(|_| date_time.to_string())
        .ok_or_else(|| FileNameError::DateTime(date_time.to_string()))
}

pub fn validate_sequence(sequence: &str) -> Result<u8, FileNameError> {
    check_length(FileNameChunk::Sequence, sequence)?;
    if !sequence.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FileNameError::Sequence(sequence.to_string()));
    }
    sequence
        .parse::<u8>()
        .map_err(|_| FileNameError::Sequence(sequence.to_string()))
}

pub fn validate_style(style: &str) -> Result<Style, FileNameError> {
    check_length(FileNameChunk::Style, style)?;
    parse_tagged_id(style, STYLE_TAG)
        .and_then(Style::from_id)
        .ok_or_else(|| FileNameError::Style(style.to_string()))
}

pub fn validate_rating(rating: &str) -> Result<Rating, FileNameError> {
    check_length(FileNameChunk::Rating, rating)?;
    parse_tagged_id(rating, RATING_TAG)
        .and_then(Rating::from_id)
        .ok_or_else(|| FileNameError::Rating(rating.to_string()))
}

pub fn validate_original(original: &str) -> Result<String, FileNameError> {
    if original.trim().is_empty() {
        return Err(FileNameError::EmptyOriginal);
    }
    Ok(original.to_string())
}

pub fn parse_style_input(value: &str) -> Result<Style, FileNameError> {
    match Style::from_name(value) {
        Some(style) => Ok(style),
        None if looks_like_tag(value, STYLE_TAG) => validate_style(value),
        None => Err(FileNameError::Style(value.to_string())),
    }
}

pub fn parse_rating_input(value: &str) -> Result<Rating, FileNameError> {
    match Rating::from_name(value) {
        Some(rating) => Ok(rating),
        None if looks_like_tag(value, RATING_TAG) => validate_rating(value),
        None => Err(FileNameError::Rating(value.to_string())),
    }
}

fn check_length(chunk: FileNameChunk, value: &str) -> Result<(), FileNameError> {
    let expected = chunk.expected_len();
    let actual = value.chars().count();
    if expected != 0 && expected != actual {
        return Err(FileNameError::UnexpectedLength {
            chunk,
            value: value.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn looks_like_tag(chunk: &str, tag: char) -> bool {
    chunk
        .strip_prefix(tag)
        .map(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

fn parse_tagged_id(chunk: &str, tag: char) -> Option<u8> {
    let digits = chunk.strip_prefix(tag)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn pretty_enum_name(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
