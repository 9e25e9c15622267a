//! `?` to `$n` placeholder rewriting.

use std::fmt::Write;

/// Rewrites `?` holders into PostgreSQL's numbered `$1, $2, ...` form.
///
/// Holders inside single-quoted literals, quoted identifiers and comments are
/// left alone, so a `?` in a column default or a `/* ... */` annotation does
/// not shift the numbering.
///
/// ```rust
/// use quarry_sql_postgres::rebind;
///
/// assert_eq!(rebind("a = ? AND b IN (?,?)"), "a = $1 AND b IN ($2,$3)");
/// assert_eq!(rebind("c = '?' AND d = ?"), "c = '?' AND d = $1");
/// ```
#[must_use]
pub fn rebind(query: &str) -> String {
    let mut out = String::with_capacity(query.len() + 8);
    let mut chars = query.chars().peekable();
    let mut n = 0;

    while let Some(c) = chars.next() {
        out.push(c);
        match c {
            '?' => {
                out.pop();
                n += 1;
                let _ = write!(out, "${n}");
            }
            '\'' | '"' => {
                for inner in chars.by_ref() {
                    out.push(inner);
                    if inner == c {
                        break;
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                for inner in chars.by_ref() {
                    out.push(inner);
                    if inner == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                let mut prev = '\0';
                for inner in chars.by_ref() {
                    out.push(inner);
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
            }
            _ => {}
        }
    }
    out
}
