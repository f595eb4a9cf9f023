//! Line scanner for the infographic DSL using logos
//!
//! The DSL is line-oriented: indentation carries structure, the first word of a
//! line is its key and the remainder is free text. Lines are scanned into
//! [`Statement`]s here; nesting is resolved by the parser.

use logos::Logos;

use crate::error::{Span, SyntaxError};

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t]+")]
pub enum Token {
    #[token("infographic")]
    Infographic,
    #[token("data")]
    Data,
    #[token("theme")]
    Theme,

    // Data fields
    #[token("title")]
    Title,
    #[token("desc")]
    Desc,
    #[token("items")]
    Items,

    // Item fields
    #[token("label")]
    Label,
    #[token("value")]
    Value,
    #[token("icon")]
    Icon,
    #[token("illus")]
    Illus,
    #[token("children")]
    Children,

    // Theme fields
    #[token("type")]
    Type,
    #[token("palette")]
    Palette,
    #[token("stylize")]
    Stylize,

    // List item marker
    #[token("-")]
    Dash,

    // Any other run of non-space characters; keywords and `-` win on equal length
    #[regex(r"[^ \t\r\n]+", |lex| lex.slice().to_string(), priority = 1)]
    Word(String),
}

impl Token {
    /// Keys whose value is free text, kept verbatim including any `#`
    pub fn is_free_text(&self) -> bool {
        matches!(
            self,
            Token::Title | Token::Desc | Token::Label | Token::Icon | Token::Illus
        )
    }

    /// Source text of the token, for messages
    pub fn text(&self) -> &str {
        match self {
            Token::Infographic => "infographic",
            Token::Data => "data",
            Token::Theme => "theme",
            Token::Title => "title",
            Token::Desc => "desc",
            Token::Items => "items",
            Token::Label => "label",
            Token::Value => "value",
            Token::Icon => "icon",
            Token::Illus => "illus",
            Token::Children => "children",
            Token::Type => "type",
            Token::Palette => "palette",
            Token::Stylize => "stylize",
            Token::Dash => "-",
            Token::Word(w) => w,
        }
    }
}

/// One significant line: `[- ]key rest`
#[derive(Debug, Clone, PartialEq)]
pub struct Statement<'a> {
    /// Leading spaces
    pub indent: usize,
    /// Line starts with a `- ` list marker
    pub dashed: bool,
    pub key: Token,
    pub key_span: Span,
    /// Column of the key; fields of a list item align here
    pub key_column: usize,
    /// Free text after the key, trimmed
    pub rest: &'a str,
    pub rest_span: Span,
}

impl Statement<'_> {
    /// Span of the whole statement
    pub fn span(&self) -> Span {
        self.key_span.start..self.rest_span.end.max(self.key_span.end)
    }
}

/// Scan source into statements, skipping blank and comment lines
pub fn scan(source: &str) -> (Vec<Statement<'_>>, Vec<SyntaxError>) {
    let mut statements = Vec::new();
    let mut errors = Vec::new();
    let mut offset = 0;

    for raw in source.split('\n') {
        let line_start = offset;
        offset += raw.len() + 1;

        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let body = line.trim_start_matches([' ', '\t']);
        if body.is_empty() || body.starts_with('#') {
            continue;
        }

        let lead = &line[..line.len() - body.len()];
        if lead.contains('\t') {
            errors.push(SyntaxError::new(
                line_start..line_start + lead.len(),
                "tabs are not allowed for indentation; use two spaces",
            ));
            continue;
        }

        let content = body.trim_end();
        let content_start = line_start + lead.len();
        match statement(content, content_start, lead.len()) {
            Ok(stmt) => statements.push(stmt),
            Err(err) => errors.push(err),
        }
    }

    (statements, errors)
}

/// Drop a trailing ` # comment`. A `#` glued to text (e.g. a hex color) is kept.
fn strip_comment(content: &str) -> &str {
    let bytes = content.as_bytes();
    for (i, _) in content.match_indices('#') {
        let after_space = i > 0 && matches!(bytes[i - 1], b' ' | b'\t');
        let before_space = bytes.get(i + 1).map_or(true, |b| matches!(b, b' ' | b'\t'));
        if after_space && before_space {
            return content[..i].trim_end();
        }
    }
    content.trim_end()
}

fn statement(content: &str, start: usize, indent: usize) -> Result<Statement<'_>, SyntaxError> {
    let mut lexer = Token::lexer(content).spanned();
    let unexpected = |span: Span| {
        SyntaxError::new(
            start + span.start..start + span.end,
            format!("unexpected character in '{}'", &content[span]),
        )
    };

    let (first, first_span) = match lexer.next() {
        Some((Ok(tok), span)) => (tok, span),
        Some((Err(()), span)) => return Err(unexpected(span)),
        None => return Err(SyntaxError::new(start..start, "empty statement")),
    };

    let (dashed, key, key_span) = if first == Token::Dash {
        match lexer.next() {
            Some((Ok(tok), span)) => (true, tok, span),
            Some((Err(()), span)) => return Err(unexpected(span)),
            None => {
                return Err(SyntaxError::new(
                    start + first_span.start..start + first_span.end,
                    "list item is empty",
                ))
            }
        }
    } else {
        (false, first, first_span)
    };

    let tail = &content[key_span.end..];
    let tail = if key.is_free_text() {
        tail
    } else {
        strip_comment(tail)
    };
    let rest = tail.trim();
    let rest_start = key_span.end + (tail.len() - tail.trim_start().len());

    Ok(Statement {
        indent,
        dashed,
        key,
        key_span: start + key_span.start..start + key_span.end,
        key_column: indent + key_span.start,
        rest,
        rest_span: start + rest_start..start + rest_start + rest.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(source: &str) -> Vec<Token> {
        scan(source).0.into_iter().map(|s| s.key).collect()
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            keys("infographic x\ndata\n  title T\n  items"),
            vec![Token::Infographic, Token::Data, Token::Title, Token::Items]
        );
    }

    #[test]
    fn test_keyword_prefix_is_a_word() {
        assert_eq!(keys("labels x"), vec![Token::Word("labels".to_string())]);
    }

    #[test]
    fn test_list_item() {
        let (stmts, errors) = scan("    - label 需求分析");
        assert!(errors.is_empty());
        let stmt = &stmts[0];
        assert!(stmt.dashed);
        assert_eq!(stmt.key, Token::Label);
        assert_eq!(stmt.indent, 4);
        assert_eq!(stmt.key_column, 6);
        assert_eq!(stmt.rest, "需求分析");
    }

    #[test]
    fn test_rest_keeps_inner_spaces() {
        let (stmts, _) = scan("  title SWOT 战略分析  ");
        assert_eq!(stmts[0].rest, "SWOT 战略分析");
        let source = "  title SWOT 战略分析  ";
        assert_eq!(&source[stmts[0].rest_span.clone()], "SWOT 战略分析");
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            keys("# heading\ntheme dark   # inline\n  palette #3b82f6 #10b981"),
            vec![Token::Theme, Token::Palette]
        );
        let (stmts, _) = scan("theme dark   # inline");
        assert_eq!(stmts[0].rest, "dark");
        let (stmts, _) = scan("palette #3b82f6 #10b981");
        assert_eq!(stmts[0].rest, "#3b82f6 #10b981");
    }

    #[test]
    fn test_dash_and_words() {
        let tokens: Vec<_> = Token::lexer("- -x - label").filter_map(Result::ok).collect();
        assert_eq!(
            tokens,
            vec![Token::Dash, Token::Word("-x".to_string()), Token::Dash, Token::Label]
        );
    }

    #[test]
    fn test_free_text_keeps_hash() {
        let (stmts, _) = scan("  title Top # 1\n    - label C #\n  desc # of users");
        let rests: Vec<_> = stmts.iter().map(|s| s.rest).collect();
        assert_eq!(rests, vec!["Top # 1", "C #", "# of users"]);
    }

    #[test]
    fn test_structural_keys_drop_trailing_comment() {
        let (stmts, _) = scan("  items # three steps\n      value 3 # units\n  type dark #");
        let rests: Vec<_> = stmts.iter().map(|s| s.rest).collect();
        assert_eq!(rests, vec!["", "3", "dark"]);
    }

    #[test]
    fn test_tab_indentation_rejected() {
        let (stmts, errors) = scan("data\n\ttitle x");
        assert_eq!(stmts.len(), 1);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("tabs"));
    }

    #[test]
    fn test_empty_dash() {
        let (_, errors) = scan("  -");
        assert_eq!(errors[0].message, "list item is empty");
    }

    #[test]
    fn test_crlf_lines() {
        let (stmts, errors) = scan("infographic a\r\ndata\r\n");
        assert!(errors.is_empty());
        assert_eq!(stmts[0].rest, "a");
        assert_eq!(stmts.len(), 2);
    }
}
