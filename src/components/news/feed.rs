use super::models::NewsItem;
use crate::error::{feed_error, BoardResult};
use crate::utils::time::format_pub_date;
use chrono_tz::Tz;
use quick_xml::events::Event;
use quick_xml::Reader;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
    PubDate,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"title" => Some(Self::Title),
            b"link" => Some(Self::Link),
            b"description" => Some(Self::Description),
            b"pubDate" => Some(Self::PubDate),
            _ => None,
        }
    }
}

#[derive(Default)]
struct ItemText {
    title: String,
    link: String,
    description: String,
    pub_date: String,
}

impl ItemText {
    fn push(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Description => &mut self.description,
            Field::PubDate => &mut self.pub_date,
        };
        target.push_str(text);
    }

    fn into_item(self, tz: Tz) -> NewsItem {
        fn or_default(value: String, default: &str) -> String {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                default.to_string()
            } else {
                trimmed.to_string()
            }
        }

        NewsItem {
            title: or_default(self.title, "No title"),
            link: or_default(self.link, "#"),
            description: or_default(self.description, "-"),
            pub_date: format_pub_date(&self.pub_date, tz).unwrap_or_default(),
        }
    }
}

/// Parse the `<item>` entries of an RSS document, keeping at most `max_items`
///
/// Only the first occurrence of each field inside an item is used.
pub fn parse_feed(xml: &str, max_items: usize, tz: Tz) -> BoardResult<Vec<NewsItem>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<ItemText> = None;
    let mut field: Option<Field> = None;
    let mut seen: Vec<Field> = Vec::new();

    loop {
        if items.len() >= max_items {
            break;
        }

        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                if name.as_ref() == b"item" {
                    current = Some(ItemText::default());
                    seen.clear();
                } else if current.is_some() && field.is_none() {
                    field = Field::from_tag(name.as_ref()).filter(|f| !seen.contains(f));
                }
            }
            Ok(Event::End(e)) => {
                let name = e.local_name();
                if name.as_ref() == b"item" {
                    if let Some(item) = current.take() {
                        items.push(item.into_item(tz));
                    }
                    field = None;
                } else if let Some(active) = field {
                    if Field::from_tag(name.as_ref()) == Some(active) {
                        seen.push(active);
                        field = None;
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let (Some(item), Some(active)) = (current.as_mut(), field) {
                    let text = e
                        .unescape()
                        .map_err(|e| feed_error(&format!("Bad text in feed: {}", e)))?;
                    item.push(active, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let (Some(item), Some(active)) = (current.as_mut(), field) {
                    item.push(active, &String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(feed_error(&format!(
                    "Malformed feed at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(items)
}
