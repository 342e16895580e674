use super::models::{Message, TodoRow, TodoStatus, TodoTable};
use csv::StringRecord;
use tracing::warn;

const DEFAULT_COLOR: &str = "#000000";
const DEFAULT_FONT_SIZE: &str = "16px";

fn records(text: &str) -> Vec<StringRecord> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes())
        .records()
        .filter_map(|record| match record {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping unreadable bulletin row: {}", e);
                None
            }
        })
        .collect()
}

fn cell_or<'a>(record: &'a StringRecord, index: usize, default: &'a str) -> &'a str {
    record
        .get(index)
        .filter(|cell| !cell.is_empty())
        .unwrap_or(default)
}

/// Messages from the first `max_messages` rows, the first row included
pub fn parse_messages(text: &str, max_messages: usize) -> Vec<Message> {
    records(text)
        .iter()
        .take(max_messages)
        .map(|record| Message {
            text: cell_or(record, 0, "").to_string(),
            color: cell_or(record, 1, DEFAULT_COLOR).to_string(),
            font_size: cell_or(record, 2, DEFAULT_FONT_SIZE).to_string(),
        })
        .filter(|message| !message.text.is_empty())
        .collect()
}

/// Status table from the todo sheet, `None` when it has fewer than two rows
///
/// Row 0 is the heading, row 1 the column headers. `max_rows` counts the
/// heading row, so at most `max_rows - 1` data rows are read.
pub fn parse_todo(text: &str, max_rows: usize) -> Option<TodoTable> {
    let records = records(text);
    if records.len() < 2 {
        return None;
    }

    let heading = records[0]
        .iter()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();
    let headers = records[1].iter().map(str::to_string).collect();

    let end = (max_rows + 1).min(records.len()).max(2);
    let rows = records[2..end]
        .iter()
        .map(|record| TodoRow {
            label: record.get(0).unwrap_or_default().to_string(),
            cells: record
                .iter()
                .skip(1)
                .map(|cell| TodoStatus::from_cell(cell).into())
                .collect(),
        })
        .collect();

    Some(TodoTable {
        heading,
        headers,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_defaults_and_limit() {
        let csv = "Welcome home,#ff0000,24px\nBoiler check on Sunday\n,#00ff00\nLast one\n";
        let messages = parse_messages(csv, 10);
        assert_eq!(messages.len(), 3);
        assert_eq!(
            messages[0],
            Message {
                text: "Welcome home".to_string(),
                color: "#ff0000".to_string(),
                font_size: "24px".to_string(),
            }
        );
        assert_eq!(messages[1].color, "#000000");
        assert_eq!(messages[1].font_size, "16px");

        // the empty row still counts against the limit
        let messages = parse_messages(csv, 3);
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_todo_table() {
        let csv = "Building,fees,2024\nApartment,Jan,Feb,Mar\n1,1,0,-1\n2,1,x\n";
        let table = parse_todo(csv, 16).unwrap();

        assert_eq!(table.heading, "Building fees 2024");
        assert_eq!(table.headers, vec!["Apartment", "Jan", "Feb", "Mar"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].label, "1");

        let statuses: Vec<_> = table.rows[0].cells.iter().map(|cell| cell.status).collect();
        assert_eq!(
            statuses,
            vec![TodoStatus::Paid, TodoStatus::Unpaid, TodoStatus::Pending]
        );
        assert_eq!(table.rows[1].cells[1].icon, "?");
    }

    #[test]
    fn test_todo_row_limit_counts_heading() {
        let mut csv = String::from("Heading\nApartment,Jan\n");
        for i in 0..20 {
            csv.push_str(&format!("{},1\n", i));
        }
        let table = parse_todo(&csv, 4).unwrap();
        assert_eq!(table.rows.len(), 3);
    }

    #[test]
    fn test_todo_needs_two_rows() {
        assert!(parse_todo("Only a heading\n", 16).is_none());
        assert!(parse_todo("", 16).is_none());
        assert!(parse_todo("Heading\nApartment,Jan\n", 16).unwrap().rows.is_empty());
    }
}
