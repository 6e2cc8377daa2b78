//! Row codec: one record to and from one delimited line.

use crate::schema::Header;
use crate::{Record, Value};

/// Encode a record against a header.
///
/// Fields missing from the record encode as empty cells; fields not in the
/// header are dropped. A row that would be blank is written as a quoted
/// cell so it cannot be mistaken for a section separator.
pub fn encode_row(record: &Record, header: &Header) -> String {
    let line = header
        .names()
        .map(|name| record.get(name).map(Value::encode_cell).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",");

    if line.trim().is_empty() {
        format!("\"{}\"", line)
    } else {
        line
    }
}

/// Decode a line against a header.
///
/// Missing trailing cells decode as empty strings (or as `Null` for a
/// non-string typed column). Extra cells are ignored.
pub fn decode_row(line: &str, header: &Header) -> Record {
    let mut cells = split_cells(line).into_iter();

    header
        .columns
        .iter()
        .map(|column| {
            let text = cells.next().unwrap_or_default();
            let value = match column.hint {
                Some(hint) => Value::decode_cell_as(&text, hint),
                None => Value::decode_cell(&text),
            };
            (column.name.clone(), value)
        })
        .collect()
}

/// Split a line into unquoted cells.
///
/// A comma inside quotes is not a separator and a doubled quote inside
/// quotes is a literal quote. An unterminated quote runs to end of line.
pub fn split_cells(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else {
            match c {
                ',' => cells.push(std::mem::take(&mut current)),
                '"' => in_quotes = true,
                _ => current.push(c),
            }
        }
    }
    cells.push(current);

    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, FieldType};
    use serde_json::json;

    fn header(names: &[&str]) -> Header {
        Header::from_names(names.iter().copied())
    }

    #[test]
    fn encode_in_header_order() {
        let record = Record::new()
            .with("name", "Gadget, Deluxe")
            .with("id", 2)
            .with("price", 19.5);
        let line = encode_row(&record, &header(&["id", "name", "price"]));
        assert_eq!(line, "2,\"Gadget, Deluxe\",19.5");
    }

    #[test]
    fn encode_missing_field_as_empty_cell() {
        let record = Record::new().with("id", 1);
        assert_eq!(encode_row(&record, &header(&["id", "name", "note"])), "1,,");
    }

    #[test]
    fn blank_row_is_quoted() {
        let names = header(&["note"]);
        let line = encode_row(&Record::new().with("note", ""), &names);
        assert_eq!(line, "\"\"");
        assert_eq!(decode_row(&line, &names).get("note"), Some(&Value::from("")));

        let line = encode_row(&Record::new().with("note", "  "), &names);
        assert_eq!(decode_row(&line, &names).get("note"), Some(&Value::from("  ")));
    }

    #[test]
    fn split_respects_quotes() {
        assert_eq!(split_cells("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_cells("\"a,b\",c"), vec!["a,b", "c"]);
        assert_eq!(
            split_cells("\"say \"\"hi\"\"\",x"),
            vec!["say \"hi\"", "x"]
        );
        assert_eq!(split_cells(""), vec![""]);
        assert_eq!(split_cells("a,"), vec!["a", ""]);
        assert_eq!(split_cells("\"\""), vec![""]);
    }

    #[test]
    fn split_unterminated_quote_runs_to_end() {
        assert_eq!(split_cells("1,\"open, still open"), vec!["1", "open, still open"]);
    }

    #[test]
    fn decode_coerces_cells() {
        let record = decode_row(
            "100,9.99,true,\"{\"\"k\"\":1}\",plain",
            &header(&["id", "total", "paid", "meta", "note"]),
        );
        assert_eq!(record.get("id"), Some(&Value::from(100)));
        assert_eq!(record.get("total"), Some(&Value::from(9.99)));
        assert_eq!(record.get("paid"), Some(&Value::Boolean(true)));
        assert_eq!(record.get("meta"), Some(&Value::Structured(json!({"k": 1}))));
        assert_eq!(record.get("note"), Some(&Value::from("plain")));
    }

    #[test]
    fn decode_short_line_pads_with_empty_strings() {
        let record = decode_row("1", &header(&["id", "name", "price"]));
        assert_eq!(record.len(), 3);
        assert_eq!(record.get("name"), Some(&Value::from("")));
        assert_eq!(record.get("price"), Some(&Value::from("")));
    }

    #[test]
    fn decode_ignores_extra_cells() {
        let record = decode_row("1,a,extra,more", &header(&["id", "name"]));
        assert_eq!(record.len(), 2);
        assert_eq!(record.names().collect::<Vec<_>>(), vec!["id", "name"]);
    }

    #[test]
    fn decode_quoted_true_is_still_boolean() {
        let record = decode_row("\"true\"", &header(&["flag"]));
        assert_eq!(record.get("flag"), Some(&Value::Boolean(true)));
    }

    #[test]
    fn decode_with_typed_header() {
        let typed = Header::new(vec![
            Column::typed("sku", FieldType::String),
            Column::typed("active", FieldType::String),
            Column::typed("stock", FieldType::Number),
        ]);
        let record = decode_row("0042,true", &typed);
        assert_eq!(record.get("sku"), Some(&Value::from("0042")));
        assert_eq!(record.get("active"), Some(&Value::from("true")));
        assert_eq!(record.get("stock"), Some(&Value::Null));
    }
}
