use thiserror::Error;

/// `{}` is a slot filled by the next argument; `{{` and `}}` are literal
/// braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Literal(String),
    Slot,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("中括弧の対応が不正です: {0}")]
    UnbalancedBraces(String),
    #[error("プレースホルダ数 {slots} と引数数 {arguments} が一致しません")]
    ArgumentCount { slots: usize, arguments: usize },
}

pub fn parse_template(input: &str) -> Result<Vec<TemplatePart>, TemplateError> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' => match chars.next() {
                Some('{') => literal.push('{'),
                Some('}') => {
                    if !literal.is_empty() {
                        parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(TemplatePart::Slot);
                }
                _ => return Err(TemplateError::UnbalancedBraces(input.to_string())),
            },
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    literal.push('}');
                } else {
                    return Err(TemplateError::UnbalancedBraces(input.to_string()));
                }
            }
            _ => literal.push(ch),
        }
    }

    if !literal.is_empty() {
        parts.push(TemplatePart::Literal(literal));
    }

    Ok(parts)
}

pub fn escape_literal(input: &str) -> String {
    input.replace('{', "{{").replace('}', "}}")
}

pub fn slot_count(parts: &[TemplatePart]) -> usize {
    parts
        .iter()
        .filter(|part| matches!(part, TemplatePart::Slot))
        .count()
}

pub fn render_template(parts: &[TemplatePart], arguments: &[&str]) -> String {
    let mut output = String::new();
    let mut arguments = arguments.iter();
    for part in parts {
        match part {
            TemplatePart::Literal(s) => output.push_str(s),
            TemplatePart::Slot => output.push_str(arguments.next().copied().unwrap_or_default()),
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_template_ok() {
        let parsed = parse_template("Lens: {} / {}mm").expect("must parse");
        assert_eq!(
            parsed,
            vec![
                TemplatePart::Literal("Lens: ".to_string()),
                TemplatePart::Slot,
                TemplatePart::Literal(" / ".to_string()),
                TemplatePart::Slot,
                TemplatePart::Literal("mm".to_string()),
            ]
        );
        assert_eq!(slot_count(&parsed), 2);
    }

    #[test]
    fn empty_template_has_no_parts() {
        assert!(parse_template("").expect("must parse").is_empty());
    }

    #[test]
    fn parse_template_invalid_brace() {
        let err = parse_template("{date").expect_err("must fail");
        assert!(matches!(err, TemplateError::UnbalancedBraces(_)));
        assert!(parse_template("a } b").is_err());
    }

    #[test]
    fn escaped_braces_stay_literal() {
        let parsed = parse_template(&format!("{}{{}}", escape_literal("{x}"))).expect("must parse");
        assert_eq!(render_template(&parsed, &["1"]), "{x}1");
    }

    #[test]
    fn render_fills_missing_arguments_with_empty() {
        let parsed = parse_template("{}-{}").expect("must parse");
        assert_eq!(render_template(&parsed, &["a", "b"]), "a-b");
        assert_eq!(render_template(&parsed, &["a"]), "a-");
    }
}
