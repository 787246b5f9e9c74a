use crate::config::ChunkDefaults;
use crate::filename::{
    parse_rating_input, parse_style_input, validate_date_time, validate_initials,
    validate_original, validate_sequence, CanonicalName, FileNameChunk,
};
use crate::prompt::Prompter;
use crate::rating::Rating;
use crate::style::Style;
use anyhow::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Checker {
    Hidden,
    Initials(String),
    DateTime(String),
    Sequence(u8),
    Style(Style),
    Rating(Rating),
    Original(String),
}

impl Checker {
    pub fn checks_raw(&self) -> bool {
        matches!(self, Checker::Hidden)
    }

    pub fn check_raw(&self, raw: &str) -> bool {
        match self {
            Checker::Hidden => !raw.starts_with('.'),
            _ => true,
        }
    }

    pub fn check(&self, name: &CanonicalName) -> bool {
        match self {
            Checker::Hidden => self.check_raw(&name.to_string()),
            Checker::Initials(initials) => name.initials() == initials,
            Checker::DateTime(date_time) => name.date_time() == date_time,
            Checker::Sequence(sequence) => name.sequence() == *sequence,
            Checker::Style(style) => name.style() == *style,
            Checker::Rating(rating) => name.rating() == *rating,
            Checker::Original(original) => name.original() == original,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Checker::Hidden => "隠しファイル".to_string(),
            Checker::Initials(v) => format!("イニシャルが [{v}] と一致しない"),
            Checker::DateTime(v) => format!("日時が [{v}] と一致しない"),
            Checker::Sequence(v) => format!("連番が [{v:02}] と一致しない"),
            Checker::Style(v) => format!("スタイルが [{}] と一致しない", v.name()),
            Checker::Rating(v) => format!("評価が [{}] と一致しない", v.name()),
            Checker::Original(v) => format!("元ファイル名が [{v}] と一致しない"),
        }
    }

    pub fn build(chunk: FileNameChunk, value: &str) -> Result<Checker> {
        let checker = match chunk {
            FileNameChunk::Initials => Checker::Initials(validate_initials(value)?),
            FileNameChunk::DateTime => Checker::DateTime(validate_date_time(value)?),
            FileNameChunk::Sequence => Checker::Sequence(validate_sequence(value)?),
            FileNameChunk::Style => Checker::Style(parse_style_input(value)?),
            FileNameChunk::Rating => Checker::Rating(parse_rating_input(value)?),
            FileNameChunk::Original => Checker::Original(validate_original(value)?),
        };
        Ok(checker)
    }

    pub fn prompt_build(
        chunk: FileNameChunk,
        prompter: &mut dyn Prompter,
        defaults: &ChunkDefaults,
    ) -> Result<Checker> {
        let value = prompt_chunk_value(chunk, prompter, chunk_default(chunk, defaults))?;
        Checker::build(chunk, &value)
    }
}

pub fn prompt_chunk_value(
    chunk: FileNameChunk,
    prompter: &mut dyn Prompter,
    default: &str,
) -> Result<String> {
    let text = format!("{} を入力してください", chunk.name());
    match chunk {
        FileNameChunk::Style => {
            let choices: Vec<(u8, &str)> = Style::ALL.iter().map(|s| (s.id(), s.name())).collect();
            prompter.prompt_choice(&text, &choices, default)
        }
        FileNameChunk::Rating => {
            let choices: Vec<(u8, &str)> =
                Rating::ALL.iter().map(|r| (r.id(), r.name())).collect();
            prompter.prompt_choice(&text, &choices, default)
        }
        _ => {
            let validate = move |value: &str| -> std::result::Result<(), String> {
                Checker::build(chunk, value)
                    .map(|_| ())
                    .map_err(|err| err.to_string())
            };
            prompter.prompt_valid(&text, default, &validate)
        }
    }
}

pub fn chunk_default(chunk: FileNameChunk, defaults: &ChunkDefaults) -> &str {
    match chunk {
        FileNameChunk::Initials => &defaults.initials,
        FileNameChunk::DateTime => &defaults.date_time,
        FileNameChunk::Sequence => &defaults.sequence,
        FileNameChunk::Style => &defaults.style,
        FileNameChunk::Rating => &defaults.rating,
        FileNameChunk::Original => &defaults.original,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::scripted::ScriptedPrompter;

    fn name() -> CanonicalName {
        CanonicalName::decode("JD-20240101-120000-02-S31-R4-DSCF0002.JPG").expect("valid")
    }

    #[test]
    fn hidden_checker_works_on_raw_names() {
        assert!(Checker::Hidden.checks_raw());
        assert!(!Checker::Hidden.check_raw(".DS_Store"));
        assert!(Checker::Hidden.check_raw("DSCF0001.JPG"));
        assert!(!Checker::Initials("JD".to_string()).checks_raw());
    }

    #[test]
    fn chunk_checkers_compare_decoded_fields() {
        let name = name();
        assert!(Checker::Initials("JD".to_string()).check(&name));
        assert!(Checker::DateTime("20240101-120000".to_string()).check(&name));
        assert!(Checker::Sequence(2).check(&name));
        assert!(Checker::Style(Style::Portrait).check(&name));
        assert!(Checker::Rating(Rating::VeryGood).check(&name));
        assert!(Checker::Original("DSCF0002.JPG".to_string()).check(&name));
        assert!(!Checker::Rating(Rating::Best).check(&name));
    }

    #[test]
    fn build_validates_and_normalizes() {
        assert_eq!(
            Checker::build(FileNameChunk::Initials, "jd").expect("valid"),
            Checker::Initials("JD".to_string())
        );
        assert_eq!(
            Checker::build(FileNameChunk::Style, "S11").expect("valid"),
            Checker::Style(Style::Landscape)
        );
        assert!(Checker::build(FileNameChunk::DateTime, "2024-01-01").is_err());
        assert!(Checker::build(FileNameChunk::Sequence, "1").is_err());
    }

    #[test]
    fn prompt_build_retries_until_valid_and_uses_default() {
        let defaults = ChunkDefaults::default();
        let mut prompter = ScriptedPrompter::new(&["x", "ab"]);
        let checker = Checker::prompt_build(FileNameChunk::Initials, &mut prompter, &defaults)
            .expect("must build");
        assert_eq!(checker, Checker::Initials("AB".to_string()));
        assert_eq!(prompter.asked.len(), 2);

        let mut prompter = ScriptedPrompter::new(&[""]);
        let checker = Checker::prompt_build(FileNameChunk::Rating, &mut prompter, &defaults)
            .expect("must build");
        assert_eq!(checker, Checker::Rating(Rating::None));

        let mut prompter = ScriptedPrompter::new(&["13"]);
        let checker = Checker::prompt_build(FileNameChunk::Style, &mut prompter, &defaults)
            .expect("must build");
        assert_eq!(checker, Checker::Style(Style::Flora));
    }
}
