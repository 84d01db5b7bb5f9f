//! SVG graph rendering
//!
//! This module serializes a contribution grid into a self-contained SVG
//! document: summary header, card chrome, month and weekday labels, one
//! rect per day with a tooltip, and a Less/More legend. Output depends only
//! on the inputs, so identical options always produce identical bytes.

use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::calendar::start_of_utc_day;
use crate::grid::{
    build_contribution_grid, build_month_labels, week_count, CELL_GAP, CELL_PITCH, CELL_SIZE,
};
use crate::theme::{GraphTheme, Palette};
use crate::types::{IntensityLevel, LevelValue, MinuteValue};

/// Title used when none is supplied
pub const DEFAULT_TITLE: &str = "Fitness contributions";

const CELL_RADIUS: u32 = 2;
const LABEL_GUTTER_WIDTH: u32 = 28;
const HEADER_HEIGHT: u32 = 32;
const CARD_HEADER_HEIGHT: u32 = 18;
const CARD_PADDING_X: u32 = 12;
const CARD_PADDING_TOP: u32 = 12;
const CARD_PADDING_BOTTOM: u32 = 12;
const FOOTER_HEIGHT: u32 = 18;
const FOOTER_TOP_GAP: u32 = 24;
const OUTER_MARGIN_X: u32 = 10;
const OUTER_MARGIN_Y: u32 = 10;
const LEGEND_CELL_GAP: u32 = 5;
const LABEL_FONT: &str = "-apple-system,BlinkMacSystemFont,Segoe UI,Helvetica,Arial,sans-serif";
const TITLE_ID: &str = "git-big-title";
const DESCRIPTION: &str = "Daily workout intensity rendered like a GitHub contribution graph.";

const WEEKDAY_LABELS: [(&str, u32); 3] = [("Mon", 1), ("Wed", 3), ("Fri", 5)];

/// Everything the renderer needs for one image.
///
/// `levels_by_date` and `minutes_by_date` accept any value type that can be
/// clamped or sanitized, so partially invalid maps render without error.
#[derive(Debug, Clone)]
pub struct RenderOptions<'a, V = IntensityLevel, M = u64> {
    pub levels_by_date: &'a BTreeMap<String, V>,
    /// Per-day minutes for tooltips and the summary line
    pub minutes_by_date: Option<&'a BTreeMap<String, M>>,
    /// When set, the summary counts workouts instead of minutes
    pub session_count: Option<u64>,
    /// Reference date; defaults to today (UTC)
    pub end_date: Option<NaiveDate>,
    pub theme: GraphTheme,
    /// Overrides the theme's palette
    pub palette: Option<Palette>,
    pub title: Option<String>,
}

impl<'a, V: LevelValue> RenderOptions<'a, V, u64> {
    pub fn new(levels_by_date: &'a BTreeMap<String, V>) -> Self {
        Self {
            levels_by_date,
            minutes_by_date: None,
            session_count: None,
            end_date: None,
            theme: GraphTheme::default(),
            palette: None,
            title: None,
        }
    }
}

impl<'a, V: LevelValue, M: MinuteValue> RenderOptions<'a, V, M> {
    pub fn minutes<M2: MinuteValue>(
        self,
        minutes_by_date: &'a BTreeMap<String, M2>,
    ) -> RenderOptions<'a, V, M2> {
        RenderOptions {
            levels_by_date: self.levels_by_date,
            minutes_by_date: Some(minutes_by_date),
            session_count: self.session_count,
            end_date: self.end_date,
            theme: self.theme,
            palette: self.palette,
            title: self.title,
        }
    }

    pub fn session_count(mut self, count: u64) -> Self {
        self.session_count = Some(count);
        self
    }

    pub fn end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn theme(mut self, theme: GraphTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Render a contribution graph as an SVG document ending in a newline.
pub fn render_contribution_graph<V: LevelValue, M: MinuteValue>(
    options: &RenderOptions<'_, V, M>,
) -> String {
    let end_date = options
        .end_date
        .unwrap_or_else(|| start_of_utc_day(Utc::now()));
    let style = options.theme.style();
    let palette = options
        .palette
        .clone()
        .unwrap_or_else(|| Palette::from(style.palette));
    let title = options.title.as_deref().unwrap_or(DEFAULT_TITLE);
    let summary_text = yearly_summary_text(options.minutes_by_date, options.session_count);

    let cells = build_contribution_grid(options.levels_by_date, end_date);
    let month_labels = build_month_labels(&cells);

    let weeks = week_count(&cells).max(1);
    let grid_width = weeks * CELL_PITCH - CELL_GAP;
    let grid_height = 7 * CELL_PITCH - CELL_GAP;

    let card_x = OUTER_MARGIN_X;
    let card_y = OUTER_MARGIN_Y + HEADER_HEIGHT;
    let grid_offset_x = card_x + CARD_PADDING_X + LABEL_GUTTER_WIDTH + CELL_GAP;
    let month_text_y = card_y + CARD_PADDING_TOP + 12;
    let grid_offset_y = card_y + CARD_PADDING_TOP + CARD_HEADER_HEIGHT;
    let footer_baseline_y = grid_offset_y + grid_height + FOOTER_TOP_GAP;
    let card_width = CARD_PADDING_X + LABEL_GUTTER_WIDTH + CELL_GAP + grid_width + CARD_PADDING_X;
    let card_height = CARD_PADDING_TOP
        + CARD_HEADER_HEIGHT
        + grid_height
        + FOOTER_TOP_GAP
        + FOOTER_HEIGHT
        + CARD_PADDING_BOTTOM;

    let width = OUTER_MARGIN_X * 2 + card_width;
    let height = card_y + card_height + OUTER_MARGIN_Y;

    let mut out = String::with_capacity(cells.len() * 220 + 4096);

    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" role="img" aria-labelledby="{TITLE_ID}"><title id="{TITLE_ID}">{}</title><desc>{DESCRIPTION}</desc>"#,
        escape_xml(title)
    );

    // Header: summary on the left, settings caption on the right
    let _ = write!(
        out,
        r#"<text class="summary" x="{OUTER_MARGIN_X}" y="{}" fill="{}" font-size="18" font-family="{LABEL_FONT}">{}</text>"#,
        OUTER_MARGIN_Y + 20,
        style.summary_color,
        escape_xml(&summary_text)
    );
    let settings_x = card_x + card_width - 24;
    let settings_y = OUTER_MARGIN_Y + 21;
    let _ = write!(
        out,
        r#"<text class="settings" x="{settings_x}" y="{settings_y}" text-anchor="end" fill="{muted}" font-size="10" font-family="{LABEL_FONT}">Contribution settings</text><path class="settings-caret" d="M0 0h7l-3.5 4z" fill="{muted}" transform="translate({},{})"/>"#,
        settings_x + 8,
        settings_y - 7,
        muted = style.muted_color,
    );

    let _ = write!(
        out,
        r#"<rect class="card" x="{card_x}.5" y="{card_y}.5" width="{}" height="{}" rx="6" ry="6" fill="none" stroke="{}"/>"#,
        card_width - 1,
        card_height - 1,
        style.card_border
    );

    for label in &month_labels {
        let _ = write!(
            out,
            r#"<text class="month" x="{}" y="{month_text_y}" fill="{}" font-size="12" font-family="{LABEL_FONT}">{}</text>"#,
            grid_offset_x + label.x,
            style.axis_color,
            escape_xml(&label.text)
        );
    }

    for (text, day) in WEEKDAY_LABELS {
        let _ = write!(
            out,
            r#"<text class="wday" x="{}" y="{}" fill="{}" font-size="12" font-family="{LABEL_FONT}">{text}</text>"#,
            card_x + CARD_PADDING_X,
            grid_offset_y + day * CELL_PITCH + 8,
            style.axis_color
        );
    }

    out.push_str("<g>");
    for cell in &cells {
        let minutes = options
            .minutes_by_date
            .and_then(|m| m.get(&cell.date))
            .map(|m| m.sanitized_minutes())
            .unwrap_or(0);
        let _ = write!(
            out,
            r#"<rect class="day" width="{CELL_SIZE}" height="{CELL_SIZE}" x="{}" y="{}" rx="{CELL_RADIUS}" ry="{CELL_RADIUS}" data-date="{}" data-level="{}" fill="{}"><title>{}</title></rect>"#,
            grid_offset_x + cell.x,
            grid_offset_y + cell.y,
            escape_xml(&cell.date),
            cell.level,
            escape_xml(palette.color(cell.level)),
            escape_xml(&tooltip_label(&cell.date, minutes))
        );
    }
    out.push_str("</g>");

    // Footer: help caption on the left, legend on the right
    let legend_width = 5 * CELL_SIZE + 4 * LEGEND_CELL_GAP;
    let more_text_x = card_x + card_width - CARD_PADDING_X;
    let legend_start_x = more_text_x - 30 - legend_width;
    let less_text_x = legend_start_x - 8;
    let legend_y = footer_baseline_y - 8;
    let muted = style.muted_color;

    let _ = write!(
        out,
        r#"<text class="help-link" x="{grid_offset_x}" y="{footer_baseline_y}" fill="{muted}" font-size="11" font-family="{LABEL_FONT}">Learn how we count contributions</text><text class="legend-less" x="{less_text_x}" y="{footer_baseline_y}" text-anchor="end" fill="{muted}" font-size="11" font-family="{LABEL_FONT}">Less</text>"#
    );
    for level in 0..5_u8 {
        let x = legend_start_x + u32::from(level) * (CELL_SIZE + LEGEND_CELL_GAP);
        let _ = write!(
            out,
            r#"<rect class="legend-swatch" x="{x}" y="{legend_y}" width="{CELL_SIZE}" height="{CELL_SIZE}" rx="{CELL_RADIUS}" ry="{CELL_RADIUS}" fill="{}"/>"#,
            escape_xml(palette.color(IntensityLevel::new(level)))
        );
    }
    let _ = write!(
        out,
        r#"<text class="legend-more" x="{more_text_x}" y="{footer_baseline_y}" text-anchor="end" fill="{muted}" font-size="11" font-family="{LABEL_FONT}">More</text>"#
    );

    out.push_str("</svg>\n");
    out
}

fn tooltip_label(date: &str, minutes: u64) -> String {
    match minutes {
        0 => format!("No activity on {date}"),
        1 => format!("1 minute of activity on {date}"),
        n => format!("{n} minutes of activity on {date}"),
    }
}

fn yearly_summary_text<M: MinuteValue>(
    minutes_by_date: Option<&BTreeMap<String, M>>,
    session_count: Option<u64>,
) -> String {
    if let Some(sessions) = session_count {
        let noun = if sessions == 1 { "workout" } else { "workouts" };
        return format!("{} {noun} in the last year", format_thousands(sessions));
    }

    let total_minutes: u64 = minutes_by_date
        .map(|m| {
            m.values()
                .map(|v| v.sanitized_minutes())
                .fold(0_u64, u64::saturating_add)
        })
        .unwrap_or(0);
    let noun = if total_minutes == 1 { "minute" } else { "minutes" };
    format!(
        "{} active {noun} in the last year",
        format_thousands(total_minutes)
    )
}

/// Group digits in threes with commas, `en-US` style.
fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Escape text for use in SVG content and attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut start = 0usize;
    for (i, b) in text.bytes().enumerate() {
        let esc = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&apos;",
            _ => continue,
        };
        out.push_str(&text[start..i]);
        out.push_str(esc);
        start = i + 1;
    }
    out.push_str(&text[start..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{format_date, list_date_range, parse_iso_date};
    use crate::grid::{grid_end_date, grid_start_date};
    use crate::theme::{LIGHT_RED_PALETTE, RED_PALETTE};
    use pretty_assertions::assert_eq;

    fn end_date() -> NaiveDate {
        parse_iso_date("2026-02-19").unwrap()
    }

    fn levels(entries: &[(&str, u8)]) -> BTreeMap<String, IntensityLevel> {
        entries
            .iter()
            .map(|(date, level)| (date.to_string(), IntensityLevel::new(*level)))
            .collect()
    }

    /// Pull an attribute value off the first `<rect>` carrying `data-date="{date}"`.
    fn cell_attr(svg: &str, date: &str, attr: &str) -> Option<String> {
        let marker = format!(r#"data-date="{date}""#);
        let at = svg.find(&marker)?;
        let rect_start = svg[..at].rfind("<rect")?;
        let rect_end = at + svg[at..].find('>')?;
        let rect = &svg[rect_start..rect_end];
        let needle = format!(r#" {attr}=""#);
        let value_start = rect.find(&needle)? + needle.len();
        let value_len = rect[value_start..].find('"')?;
        Some(rect[value_start..value_start + value_len].to_string())
    }

    #[test]
    fn test_renders_valid_svg_with_level_based_fills() {
        let levels = levels(&[("2026-02-18", 4), ("2026-02-17", 2)]);
        let options = RenderOptions::new(&levels)
            .end_date(end_date())
            .palette(Palette::from(RED_PALETTE));
        let svg = render_contribution_graph(&options);

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>\n"));
        assert!(svg.contains("<title"));
        assert!(svg.contains("Fitness contributions"));
        assert!(svg.contains(r#"data-date="2026-02-18""#));
        assert_eq!(cell_attr(&svg, "2026-02-18", "fill").as_deref(), Some("#d64545"));
        assert_eq!(cell_attr(&svg, "2026-02-17", "fill").as_deref(), Some("#6b1a1a"));
        assert_eq!(cell_attr(&svg, "2026-02-17", "data-level").as_deref(), Some("2"));
    }

    #[test]
    fn test_declares_size_and_matching_view_box() {
        let levels = levels(&[]);
        let svg = render_contribution_graph(&RenderOptions::new(&levels).end_date(end_date()));

        // 53 weeks: grid 686 wide, card 741, canvas 761; card 172 tall, canvas 224
        assert!(svg.starts_with(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="761" height="224" viewBox="0 0 761 224""#
        ));
    }

    #[test]
    fn test_empty_levels_render_every_day_at_level_zero() {
        let levels = levels(&[]);
        let svg = render_contribution_graph(&RenderOptions::new(&levels).end_date(end_date()));

        let days = list_date_range(grid_start_date(end_date()), grid_end_date(end_date()));
        assert_eq!(svg.matches(r#"class="day""#).count(), days.len());
        for day in days {
            let date = format_date(day);
            assert_eq!(cell_attr(&svg, &date, "data-level").as_deref(), Some("0"), "{date}");
        }
        assert_eq!(svg.matches(r#"class="legend-swatch""#).count(), 5);
        assert!(!svg.contains(r#"data-level="1""#));
    }

    #[test]
    fn test_renders_weekday_labels_in_left_gutter() {
        let levels = levels(&[]);
        let svg = render_contribution_graph(&RenderOptions::new(&levels).end_date(end_date()));

        assert_eq!(svg.matches(r#"<text class="wday" x="22""#).count(), 3);
        for day in ["Mon", "Wed", "Fri"] {
            assert!(svg.contains(&format!(">{day}</text>")));
        }
    }

    #[test]
    fn test_renders_card_chrome_and_footer_legend() {
        let levels = levels(&[]);
        let svg = render_contribution_graph(&RenderOptions::new(&levels).end_date(end_date()));

        assert!(svg.contains(r#"class="card""#));
        assert!(svg.contains("Contribution settings"));
        assert!(svg.contains(r#"class="help-link""#));
        assert!(svg.contains(r#"class="legend-less""#));
        assert!(svg.contains(r#"class="legend-more""#));
        assert!(svg.contains(">Less</text>"));
        assert!(svg.contains(">More</text>"));
    }

    #[test]
    fn test_renders_light_theme_styles() {
        let levels = levels(&[("2026-02-18", 4)]);
        let options = RenderOptions::new(&levels)
            .end_date(end_date())
            .theme(GraphTheme::Light)
            .palette(Palette::from(LIGHT_RED_PALETTE));
        let svg = render_contribution_graph(&options);

        assert!(svg.contains(r##"fill="#57606a""##));
        assert_eq!(cell_attr(&svg, "2026-02-18", "fill").as_deref(), Some("#cf222e"));
    }

    #[test]
    fn test_theme_palette_used_without_override() {
        let levels = levels(&[("2026-02-18", 4)]);
        let dark = render_contribution_graph(&RenderOptions::new(&levels).end_date(end_date()));
        let light = render_contribution_graph(
            &RenderOptions::new(&levels)
                .end_date(end_date())
                .theme(GraphTheme::Light),
        );

        assert_eq!(cell_attr(&dark, "2026-02-18", "fill").as_deref(), Some("#d64545"));
        assert_eq!(cell_attr(&light, "2026-02-18", "fill").as_deref(), Some("#cf222e"));
        assert_eq!(cell_attr(&light, "2026-02-17", "fill").as_deref(), Some("#ebedf0"));
    }

    #[test]
    fn test_no_full_canvas_background() {
        let levels = levels(&[]);
        for theme in GraphTheme::ALL {
            let svg = render_contribution_graph(
                &RenderOptions::new(&levels).end_date(end_date()).theme(theme),
            );
            assert!(!svg.contains(r#"<rect width="100%" height="100%""#));
            assert!(!svg.contains("href="));
        }
    }

    #[test]
    fn test_summary_counts_active_minutes() {
        let levels = levels(&[]);
        let mut minutes: BTreeMap<String, f64> = BTreeMap::new();
        minutes.insert("2026-02-18".into(), 120.0);
        minutes.insert("2026-02-17".into(), 30.9);
        minutes.insert("2026-02-16".into(), -40.0);
        minutes.insert("2026-02-15".into(), f64::NAN);

        let svg = render_contribution_graph(
            &RenderOptions::new(&levels)
                .minutes(&minutes)
                .end_date(end_date()),
        );

        assert!(svg.contains(r#"class="summary""#));
        assert!(svg.contains("150 active minutes in the last year"));
    }

    #[test]
    fn test_summary_prefers_workout_count() {
        let levels = levels(&[]);
        let minutes: BTreeMap<String, u64> = [("2026-02-18".to_string(), 1250)].into();

        let svg = render_contribution_graph(
            &RenderOptions::new(&levels)
                .minutes(&minutes)
                .session_count(34)
                .end_date(end_date()),
        );
        assert!(svg.contains("34 workouts in the last year"));
        assert!(!svg.contains("active minutes in the last year"));

        let svg = render_contribution_graph(
            &RenderOptions::new(&levels)
                .minutes(&minutes)
                .session_count(1)
                .end_date(end_date()),
        );
        assert!(svg.contains("1 workout in the last year"));
    }

    #[test]
    fn test_summary_singular_minute_and_grouping() {
        assert_eq!(
            yearly_summary_text(Some(&BTreeMap::from([("a".to_string(), 1_u64)])), None),
            "1 active minute in the last year"
        );
        assert_eq!(
            yearly_summary_text::<u64>(None, None),
            "0 active minutes in the last year"
        );
        assert_eq!(
            yearly_summary_text::<u64>(None, Some(12_345)),
            "12,345 workouts in the last year"
        );
    }

    #[test]
    fn test_summary_total_saturates() {
        let minutes = BTreeMap::from([
            ("2026-02-18".to_string(), u64::MAX),
            ("2026-02-17".to_string(), 1_u64),
        ]);
        assert_eq!(
            yearly_summary_text(Some(&minutes), None),
            "18,446,744,073,709,551,615 active minutes in the last year"
        );

        let levels = levels(&[("2026-02-18", 4)]);
        let svg = render_contribution_graph(
            &RenderOptions::new(&levels)
                .minutes(&minutes)
                .end_date(end_date()),
        );
        assert!(svg.contains("<title>18446744073709551615 minutes of activity on 2026-02-18</title>"));
    }

    #[test]
    fn test_tooltips() {
        let levels = levels(&[]);
        let minutes: BTreeMap<String, u64> = [
            ("2026-02-18".to_string(), 45),
            ("2026-02-17".to_string(), 1),
        ]
        .into();
        let svg = render_contribution_graph(
            &RenderOptions::new(&levels)
                .minutes(&minutes)
                .end_date(end_date()),
        );

        assert!(svg.contains("<title>45 minutes of activity on 2026-02-18</title>"));
        assert!(svg.contains("<title>1 minute of activity on 2026-02-17</title>"));
        assert!(svg.contains("<title>No activity on 2026-02-16</title>"));
    }

    #[test]
    fn test_title_is_escaped() {
        let levels = levels(&[]);
        let svg = render_contribution_graph(
            &RenderOptions::new(&levels)
                .end_date(end_date())
                .title(r#"Runs & "Rides" <2026>"#),
        );
        assert!(svg.contains("Runs &amp; &quot;Rides&quot; &lt;2026&gt;"));
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let levels = levels(&[("2026-02-18", 3), ("2025-07-04", 1)]);
        let minutes: BTreeMap<String, u64> = [("2026-02-18".to_string(), 61)].into();
        let options = RenderOptions::new(&levels)
            .minutes(&minutes)
            .session_count(9)
            .end_date(end_date())
            .theme(GraphTheme::Light);

        assert_eq!(
            render_contribution_graph(&options),
            render_contribution_graph(&options)
        );
    }

    #[test]
    fn test_malformed_levels_are_clamped() {
        let mut raw: BTreeMap<String, f64> = BTreeMap::new();
        raw.insert("2026-02-18".into(), 99.0);
        raw.insert("2026-02-17".into(), f64::NAN);
        raw.insert("2026-02-16".into(), -1.0);

        let svg = render_contribution_graph(&RenderOptions::new(&raw).end_date(end_date()));
        assert_eq!(cell_attr(&svg, "2026-02-18", "data-level").as_deref(), Some("4"));
        assert_eq!(cell_attr(&svg, "2026-02-17", "data-level").as_deref(), Some("0"));
        assert_eq!(cell_attr(&svg, "2026-02-16", "data-level").as_deref(), Some("0"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a&b<c>d\"e'f"), "a&amp;b&lt;c&gt;d&quot;e&apos;f");
        assert_eq!(escape_xml("plain"), "plain");
        assert_eq!(escape_xml(""), "");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }
}
