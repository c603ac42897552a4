//! URL templates with a single integer placeholder
//!
//! A template contains exactly one integer verb, which is replaced by the task
//! id. The verb is `%d` with optional flags and a field width, as in `printf`:
//!
//! | Verb | id = 42 | id = -42 |
//! |------|---------|----------|
//! | `%d` | `42` | `-42` |
//! | `%05d` | `00042` | `-0042` |
//! | `%5d` | `   42` | `  -42` |
//! | `%-5d` | `42   ` | `-42  ` |
//! | `%+d` | `+42` | `-42` |
//!
//! `%%` stands for a literal percent sign, so percent-encoded URLs have to
//! double their escapes (`%%20`). Any other `%` sequence is rejected.

use crate::ConfigError;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// Widest field accepted in a placeholder
const MAX_WIDTH: usize = 64;

/// Flags and width of the `%d` placeholder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct IdFormat {
    /// `-`: pad with trailing spaces; wins over `0`
    left: bool,
    /// `+`: always print a sign
    plus: bool,
    /// `0`: pad with zeros after the sign
    zero: bool,
    width: usize,
}

impl IdFormat {
    /// Reads flags, width and the closing `d` that follow a `%`
    fn parse(chars: &mut Peekable<Chars<'_>>, template: &str) -> Result<Self, ConfigError> {
        let mut format = Self::default();
        let mut verb = String::from("%");

        while let Some(&c) = chars.peek() {
            match c {
                '-' => format.left = true,
                '+' => format.plus = true,
                '0' => format.zero = true,
                _ => break,
            }
            verb.push(c);
            chars.next();
        }

        let mut width = String::new();
        while let Some(&c) = chars.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            width.push(c);
            chars.next();
        }
        verb.push_str(&width);

        if !width.is_empty() {
            format.width = match width.parse::<usize>() {
                Ok(w) if w <= MAX_WIDTH => w,
                _ => {
                    return Err(ConfigError::InvalidTemplate(format!(
                        "'{}' has a field width over {} in {}d",
                        template, MAX_WIDTH, verb
                    )))
                }
            };
        }

        match chars.next() {
            Some('d') => Ok(format),
            Some(other) => {
                verb.push(other);
                Err(ConfigError::InvalidTemplate(format!(
                    "'{}' contains unsupported verb {} (use %% for a literal percent)",
                    template, verb
                )))
            }
            None => Err(ConfigError::InvalidTemplate(format!(
                "'{}' ends with an incomplete verb {}",
                template, verb
            ))),
        }
    }

    fn write_id(&self, out: &mut String, id: i64) {
        let digits = id.unsigned_abs().to_string();
        let sign = if id < 0 {
            "-"
        } else if self.plus {
            "+"
        } else {
            ""
        };
        let pad = self.width.saturating_sub(sign.len() + digits.len());

        if self.left {
            out.push_str(sign);
            out.push_str(&digits);
            out.extend(std::iter::repeat(' ').take(pad));
        } else if self.zero {
            out.push_str(sign);
            out.extend(std::iter::repeat('0').take(pad));
            out.push_str(&digits);
        } else {
            out.extend(std::iter::repeat(' ').take(pad));
            out.push_str(sign);
            out.push_str(&digits);
        }
    }
}

impl fmt::Display for IdFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("%")?;
        if self.left {
            f.write_str("-")?;
        }
        if self.plus {
            f.write_str("+")?;
        }
        if self.zero {
            f.write_str("0")?;
        }
        if self.width > 0 {
            write!(f, "{}", self.width)?;
        }
        f.write_str("d")
    }
}

/// A parsed URL template, split around its placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    prefix: String,
    format: IdFormat,
    suffix: String,
}

impl UrlTemplate {
    /// Parses a template string
    ///
    /// # Returns
    ///
    /// * `Ok(UrlTemplate)` - The template has exactly one `%d` verb
    /// * `Err(ConfigError::InvalidTemplate)` - No placeholder, more than one,
    ///   or an unsupported `%` verb
    ///
    /// # Example
    ///
    /// ```
    /// use iterscraper::task::UrlTemplate;
    ///
    /// let template = UrlTemplate::parse("https://example.com/v/%d?sort=%%up").unwrap();
    /// assert_eq!(template.render(42), "https://example.com/v/42?sort=%up");
    ///
    /// let padded = UrlTemplate::parse("https://example.com/page-%05d.html").unwrap();
    /// assert_eq!(padded.render(42), "https://example.com/page-00042.html");
    /// ```
    pub fn parse(template: &str) -> Result<Self, ConfigError> {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut format = None;

        let mut chars = template.chars().peekable();
        while let Some(c) = chars.next() {
            let literal = if c == '%' {
                if chars.peek() == Some(&'%') {
                    chars.next();
                    '%'
                } else if chars.peek().is_none() {
                    return Err(ConfigError::InvalidTemplate(format!(
                        "'{}' ends with a dangling %",
                        template
                    )));
                } else {
                    let parsed = IdFormat::parse(&mut chars, template)?;
                    if format.is_some() {
                        return Err(ConfigError::InvalidTemplate(format!(
                            "'{}' contains more than one %d placeholder",
                            template
                        )));
                    }
                    format = Some(parsed);
                    continue;
                }
            } else {
                c
            };

            if format.is_none() {
                prefix.push(literal);
            } else {
                suffix.push(literal);
            }
        }

        let format = format.ok_or_else(|| {
            ConfigError::InvalidTemplate(format!(
                "'{}' has no %d placeholder for the id",
                template
            ))
        })?;

        Ok(Self {
            prefix,
            format,
            suffix,
        })
    }

    /// Substitutes `id` into the template
    pub fn render(&self, id: i64) -> String {
        let mut url = String::with_capacity(self.prefix.len() + self.suffix.len() + 20);
        url.push_str(&self.prefix);
        self.format.write_id(&mut url, id);
        url.push_str(&self.suffix);
        url
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.prefix.replace('%', "%%"),
            self.format,
            self.suffix.replace('%', "%%")
        )
    }
}
