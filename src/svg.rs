use crate::app::AppState;
use crate::form;

const START_Y: i32 = 40;
const LINE_HEIGHT: i32 = 24;
const RESULT_LINE_HEIGHT: i32 = 64;
const LEFT_PADDING: f32 = 30.0;
const RIGHT_PADDING: f32 = 30.0;
const CHAR_WIDTH: f32 = 9.6;
const MIN_COL_CHARS: usize = 36;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Theme {
    Dark,
    Light,
}

pub struct ThemeColors {
    pub bg: &'static str,
    pub text: &'static str,
    pub key: &'static str,
    pub value: &'static str,
    pub cc: &'static str,
    pub error: &'static str,
}

impl Theme {
    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Dark => ThemeColors {
                bg: "#161b22",
                text: "#c9d1d9",
                key: "#ffa657",
                value: "#a5d6ff",
                cc: "#616e7f",
                error: "#f85149",
            },
            Theme::Light => ThemeColors {
                bg: "#ffffff",
                text: "#24292f",
                key: "#d73a49",
                value: "#854dff",
                cc: "#6a737d",
                error: "#ff5757",
            },
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Splits a row into key, dot leader and value so values line up on the right.
pub fn build_field_row(key: &str, value: &str, align_width: usize) -> (String, String, String) {
    let key_part = format!("{key}: ");
    let base_len = key_part.len() + value.len();
    let available = align_width.saturating_sub(base_len);

    let dots = match available {
        0 => "".to_string(),
        1 => " ".to_string(),
        2 => ". ".to_string(),
        n => ".".repeat(n),
    };

    (key_part, dots, value.to_string())
}

enum Line {
    Field { k: String, d: String, v: String },
    Error(String),
    Rule,
    Result { number: String, unit: &'static str },
}

/// Render the form state as an SVG card: inputs with inline errors, then the result.
pub fn generate_svg(app: &AppState, theme: Theme) -> String {
    let colors = theme.colors();
    let rules = form::rules(app.max_year());

    let shown: Vec<(&str, &str)> = rules
        .iter()
        .map(|r| {
            let value = app.input().get(r.field);
            (r.label, if value.is_empty() { r.placeholder } else { value })
        })
        .collect();

    let align_width = shown
        .iter()
        .map(|(k, v)| k.len() + 2 + v.len())
        .max()
        .unwrap_or(0)
        .max(MIN_COL_CHARS);

    let mut lines = Vec::new();
    for (rule, (label, value)) in rules.iter().zip(&shown) {
        let (k, d, v) = build_field_row(label, value, align_width);
        lines.push(Line::Field { k, d, v });
        if let Some(e) = app.errors().get(&rule.field) {
            lines.push(Line::Error(e.message.clone()));
        }
    }
    lines.push(Line::Rule);

    let [years, months, days] = app.display_values();
    for (number, unit) in [(years, "years"), (months, "months"), (days, "days")] {
        lines.push(Line::Result { number, unit });
    }

    // Render
    let mut y = START_Y;
    let mut body = String::new();
    for line in &lines {
        match line {
            Line::Field { k, d, v } => {
                body.push_str(&format!(
                    r#"<text x="{LEFT_PADDING}" y="{y}" font-size="16px"><tspan class="key">{}</tspan><tspan class="cc">{}</tspan><tspan class="value">{}</tspan></text>
"#,
                    escape_xml(k),
                    escape_xml(d),
                    escape_xml(v)
                ));
                y += LINE_HEIGHT;
            }
            Line::Error(message) => {
                body.push_str(&format!(
                    r#"<text x="{LEFT_PADDING}" y="{y}" font-size="12px" font-style="italic" class="error">{}</text>
"#,
                    escape_xml(message)
                ));
                y += LINE_HEIGHT;
            }
            Line::Rule => {
                let x2 = LEFT_PADDING + align_width as f32 * CHAR_WIDTH;
                body.push_str(&format!(
                    r#"<line x1="{LEFT_PADDING}" y1="{y}" x2="{x2}" y2="{y}" class="rule"/>
"#
                ));
                y += RESULT_LINE_HEIGHT;
            }
            Line::Result { number, unit } => {
                body.push_str(&format!(
                    r#"<text x="{LEFT_PADDING}" y="{y}" font-size="56px" font-weight="800" font-style="italic"><tspan class="value">{}</tspan> {unit}</text>
"#,
                    escape_xml(number)
                ));
                y += RESULT_LINE_HEIGHT;
            }
        }
    }

    let w = LEFT_PADDING + align_width as f32 * CHAR_WIDTH + RIGHT_PADDING;
    let h = y as f32;

    format!(
        r#"<?xml version='1.0' encoding='UTF-8'?>
<svg xmlns="http://www.w3.org/2000/svg"
     width="{w}px" height="{h}px"
     font-family="ConsolasFallback,Consolas,monospace">

<style>
.key   {{ fill: {key}; }}
.value {{ fill: {value}; }}
.cc    {{ fill: {cc}; }}
.error {{ fill: {error}; }}
.rule  {{ stroke: {cc}; stroke-width: 2; }}
</style>

<rect width="{w}px" height="{h}px" fill="{bg}" rx="15"/>

<g fill="{text}">
{body}</g>

</svg>
"#,
        key = colors.key,
        value = colors.value,
        cc = colors.cc,
        error = colors.error,
        bg = colors.bg,
        text = colors.text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::RawInput;
    use chrono::NaiveDate;

    #[test]
    fn test_field_row_alignment() {
        let (k, d, v) = build_field_row("Day", "14", 12);
        assert_eq!(k, "Day: ");
        assert_eq!(d, ".....");
        assert_eq!(v, "14");
        assert_eq!(k.len() + d.len() + v.len(), 12);

        let (_, d, _) = build_field_row("Year", "2000", 11);
        assert_eq!(d, " ");
    }

    #[test]
    fn test_empty_card_has_placeholders() {
        let app = AppState::new(form::DEFAULT_MAX_YEAR);
        let svg = generate_svg(&app, Theme::Dark);
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("YYYY"));
        assert_eq!(svg.matches(r#"<tspan class="value">--</tspan>"#).count(), 3);
        assert!(svg.contains("#161b22"));
    }

    #[test]
    fn test_card_with_result_and_errors() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let mut app = AppState::new(form::DEFAULT_MAX_YEAR);
        app.submit(RawInput::new("1", "1", "2000"), today);
        let svg = generate_svg(&app, Theme::Light);
        assert!(svg.contains(r#"<tspan class="value">24</tspan> years"#));
        assert!(!svg.contains(r#"class="error""#));

        app.submit(RawInput::new("<b>", "1", "2000"), today);
        let svg = generate_svg(&app, Theme::Light);
        assert!(svg.contains("&lt;b&gt;"));
        assert!(svg.contains("Please enter a number"));
    }
}
