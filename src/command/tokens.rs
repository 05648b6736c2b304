//! Quote-aware splitting of command-line text.

/// A single word of a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// True if any part of the word was written inside quotes
    pub quoted: bool,
}

impl Token {
    /// Flags start with `-`. Quoted words never count as flags.
    pub fn is_flag(&self) -> bool {
        !self.quoted && self.text.starts_with('-') && self.text.len() > 1
    }
}

/// Split `input` on whitespace, grouping single- or double-quoted runs into one word.
///
/// A quote only opens at the start of a word or right after `=`, and only when a
/// matching quote closes it at the end of a word. Any other quote character is
/// literal, so `don't` stays one word. Quotes that group are removed.
pub fn split_words(input: &str) -> Vec<Token> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            if in_word {
                tokens.push(Token {
                    text: std::mem::take(&mut current),
                    quoted,
                });
                in_word = false;
                quoted = false;
            }
            i += 1;
            continue;
        }

        let may_open = (c == '"' || c == '\'') && (!in_word || current.ends_with('='));
        if may_open {
            if let Some(close) = closing_quote(&chars, i) {
                current.extend(&chars[i + 1..close]);
                in_word = true;
                quoted = true;
                i = close + 1;
                continue;
            }
        }

        current.push(c);
        in_word = true;
        i += 1;
    }

    if in_word {
        tokens.push(Token {
            text: current,
            quoted,
        });
    }

    tokens
}

/// Index of the quote closing the one at `open`: the same character, followed by
/// whitespace or the end of input.
fn closing_quote(chars: &[char], open: usize) -> Option<usize> {
    let quote = chars[open];
    (open + 1..chars.len()).find(|&j| {
        chars[j] == quote && chars.get(j + 1).map_or(true, |next| next.is_whitespace())
    })
}

/// True if any token is exactly one of `names`.
pub fn has_flag(tokens: &[Token], names: &[&str]) -> bool {
    tokens
        .iter()
        .any(|t| t.is_flag() && names.contains(&t.text.as_str()))
}

/// True if a short flag letter appears alone (`-a`) or inside a cluster (`-am`).
pub fn has_short_flag(tokens: &[Token], letter: char) -> bool {
    tokens.iter().any(|t| {
        t.is_flag()
            && !t.text.starts_with("--")
            && t.text[1..].chars().all(|c| c.is_ascii_alphabetic())
            && t.text[1..].contains(letter)
    })
}

/// Value of an option given as `--name=value` or `--name value`.
pub fn option_value(tokens: &[Token], names: &[&str]) -> Option<String> {
    for (i, token) in tokens.iter().enumerate() {
        if !token.is_flag() {
            continue;
        }
        for name in names {
            if token.text == *name {
                return tokens.get(i + 1).map(|next| next.text.clone());
            }
            if let Some(value) = token
                .text
                .strip_prefix(name)
                .and_then(|rest| rest.strip_prefix('='))
            {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Non-flag words, skipping the value that follows any option in `valued`.
///
/// Everything after a bare `--` is positional.
pub fn positionals<'a>(tokens: &'a [Token], valued: &[&str]) -> Vec<&'a Token> {
    let mut out = Vec::new();
    let mut skip_next = false;
    let mut rest_positional = false;

    for token in tokens {
        if skip_next {
            skip_next = false;
            continue;
        }
        if rest_positional {
            out.push(token);
            continue;
        }
        if !token.quoted && token.text == "--" {
            rest_positional = true;
            continue;
        }
        if token.is_flag() {
            if valued.contains(&token.text.as_str()) {
                skip_next = true;
            }
            continue;
        }
        out.push(token);
    }

    out
}
