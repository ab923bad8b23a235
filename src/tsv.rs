//! Tab-separated records in the spreadsheet dialect: fields may be wrapped
//! in double quotes, a doubled quote inside quotes is a literal quote, and
//! tabs or line breaks inside quotes belong to the field.

use std::fs;
use std::io::Write;
use std::mem;
use std::path::Path;

use crate::error::MigrateError;

const DELIMITER: char = '\t';
const QUOTE: char = '"';

pub type Record = Vec<String>;

pub fn read_records(path: &Path) -> Result<Vec<Record>, MigrateError> {
    let input = fs::read_to_string(path)?;
    Ok(parse_records(&input))
}

/// Splits `input` into records. A blank line yields an empty record so that
/// record numbers keep matching line numbers for unquoted input.
pub fn parse_records(input: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut line_has_content = false;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    chars.next();
                    field.push(QUOTE);
                } else {
                    in_quotes = false;
                }
            } else if c == '\r' {
                // Quoted line breaks read back as `\n` whatever the file used
                if chars.peek() != Some(&'\n') {
                    field.push('\n');
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            QUOTE if at_field_start => {
                in_quotes = true;
                at_field_start = false;
                line_has_content = true;
            }
            DELIMITER => {
                record.push(mem::take(&mut field));
                at_field_start = true;
                line_has_content = true;
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                if line_has_content {
                    record.push(mem::take(&mut field));
                }
                records.push(mem::take(&mut record));
                at_field_start = true;
                line_has_content = false;
            }
            _ => {
                field.push(c);
                at_field_start = false;
                line_has_content = true;
            }
        }
    }

    if line_has_content {
        record.push(field);
        records.push(record);
    }

    records
}

/// Writes each record on its own `\n`-terminated line.
pub fn write_records<W: Write>(out: &mut W, records: &[Record]) -> Result<(), MigrateError> {
    for record in records {
        let line: Vec<String> = record.iter().map(|f| format_field(f)).collect();
        writeln!(out, "{}", line.join("\t"))?;
    }
    out.flush()?;
    Ok(())
}

/// Quotes a field only when it could not be read back bare.
pub fn format_field(field: &str) -> String {
    if field.contains([DELIMITER, QUOTE, '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rec(fields: &[&str]) -> Record {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_parse_plain_records() {
        let input = "guildid\tkey\tvalue\nG1\tprefix\t!\r\nG1\tmodlogactive\ttrue";
        assert_eq!(
            parse_records(input),
            vec![
                rec(&["guildid", "key", "value"]),
                rec(&["G1", "prefix", "!"]),
                rec(&["G1", "modlogactive", "true"]),
            ]
        );
    }

    #[test]
    fn test_parse_quoted_fields() {
        let input = "G1\twelcomemessage\t\"Hi \"\"$user\"\"\tand\nwelcome\"\nG2\tprefix\t\n";
        assert_eq!(
            parse_records(input),
            vec![
                rec(&["G1", "welcomemessage", "Hi \"$user\"\tand\nwelcome"]),
                rec(&["G2", "prefix", ""]),
            ]
        );
    }

    #[test]
    fn test_parse_quoted_crlf_becomes_lf() {
        let input = "G1\tmessage\t\"a\r\nb\"\r\nG2\tmessage\t\"c\rd\"\r\n";
        assert_eq!(
            parse_records(input),
            vec![rec(&["G1", "message", "a\nb"]), rec(&["G2", "message", "c\nd"])]
        );
    }

    #[test]
    fn test_parse_blank_line_is_empty_record() {
        assert_eq!(
            parse_records("a\tb\n\nc\n"),
            vec![rec(&["a", "b"]), Vec::new(), rec(&["c"])]
        );
    }

    #[test]
    fn test_format_field() {
        assert_eq!(format_field("plain $user"), "plain $user");
        assert_eq!(format_field(""), "");
        assert_eq!(format_field("a\tb"), "\"a\tb\"");
        assert_eq!(format_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(format_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_write_records_uses_lf_terminator() {
        let mut out = Vec::new();
        write_records(&mut out, &[rec(&["G1", "true"]), rec(&["G2", "x\ty"])]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "G1\ttrue\nG2\t\"x\ty\"\n");
    }
}
