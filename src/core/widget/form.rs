use std::fmt::Write as _;

use super::settings::{fields, FieldNaming, WidgetSettings, MAX_ITEM_COUNT, MIN_ITEM_COUNT};
use crate::core::html::escape;

const TOGGLES: [(&str, &str); 4] = [
    (fields::SHOW_BANNER, "Image"),
    (fields::SHOW_TITLE, "Title"),
    (fields::SHOW_AUTHOR, "Author"),
    (fields::SHOW_PUBDATE, "Publish Date"),
];

/// Renders the admin form for one widget instance.
pub fn render_form(settings: &WidgetSettings, naming: &FieldNaming) -> String {
    let mut buf = String::new();
    render_title_field(&mut buf, settings, naming);
    render_count_field(&mut buf, settings, naming);
    render_toggles(&mut buf, settings, naming);
    buf
}

fn render_title_field(buf: &mut String, settings: &WidgetSettings, naming: &FieldNaming) {
    let id = escape_owned(&naming.field_id(fields::TITLE));
    let name = escape_owned(&naming.field_name(fields::TITLE));
    let _ = write!(
        buf,
        concat!(
            "<p>\n",
            "<label for=\"{id}\">Title:</label>\n",
            "<input class=\"widefat\" id=\"{id}\" name=\"{name}\" type=\"text\" value=\"{value}\">\n",
            "</p>\n",
        ),
        id = id,
        name = name,
        value = escape(&settings.title),
    );
}

fn render_count_field(buf: &mut String, settings: &WidgetSettings, naming: &FieldNaming) {
    let id = escape_owned(&naming.field_id(fields::ITEM_COUNT));
    let name = escape_owned(&naming.field_name(fields::ITEM_COUNT));
    let _ = writeln!(buf, "<p>\n<label for=\"{id}\">Show how many:</label>");
    let _ = writeln!(buf, "<select name=\"{name}\" id=\"{id}\" class=\"widefat\">");
    for count in MIN_ITEM_COUNT..=MAX_ITEM_COUNT {
        let selected = if settings.item_count == count {
            " selected=\"selected\""
        } else {
            ""
        };
        let _ = writeln!(
            buf,
            "<option value=\"{count}\" id=\"heropress-count-{count}\"{selected}>{count}</option>"
        );
    }
    buf.push_str("</select>\n</p>\n");
}

fn render_toggles(buf: &mut String, settings: &WidgetSettings, naming: &FieldNaming) {
    buf.push_str("<h4>Show:</h4>\n<ul>\n");
    for (field, label) in TOGGLES {
        let id = escape_owned(&naming.field_id(field));
        let name = escape_owned(&naming.field_name(field));
        let checked = if toggle_value(settings, field) {
            " checked=\"checked\""
        } else {
            ""
        };
        let _ = writeln!(
            buf,
            "<li>\n<input id=\"{id}\" name=\"{name}\" type=\"checkbox\" value=\"1\"{checked}>\n<label for=\"{id}\"> {label}</label>\n</li>"
        );
    }
    buf.push_str("</ul>\n");
}

fn toggle_value(settings: &WidgetSettings, field: &str) -> bool {
    match field {
        fields::SHOW_BANNER => settings.show_banner,
        fields::SHOW_TITLE => settings.show_title,
        fields::SHOW_AUTHOR => settings.show_author,
        fields::SHOW_PUBDATE => settings.show_pubdate,
        _ => false,
    }
}

fn escape_owned(value: &str) -> String {
    escape(value).into_owned()
}
