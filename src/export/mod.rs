//! Single-page PDF export of one entry.
//!
//! A stateless, one-shot render: bold title, gray date-and-mood line, a
//! divider rule, then the body with greedy word-wrap. Content that runs past
//! the page's printable height is silently truncated; there is never a
//! second page. The body is set in Courier, whose fixed 0.6 em advance makes
//! line measurement exact without font metrics tables.

use crate::constants::{
    PDF_BODY_SIZE_PT, PDF_DATE_FORMAT, PDF_LINE_HEIGHT_PT, PDF_MARGIN_PT, PDF_META_SIZE_PT,
    PDF_PAGE_HEIGHT_PT, PDF_PAGE_WIDTH_PT, PDF_TITLE_SIZE_PT,
};
use crate::db::entries::DiaryEntry;
use crate::errors::{AppResult, ExportError};
use chrono::{Local, TimeZone, Utc};
use printpdf::{BuiltinFont, Color, Line, Mm, PdfDocument, Point, Rgb};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn pt_to_mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

/// Rendered width of a line of body text, in points.
///
/// Courier advances every glyph by 600/1000 of the font size.
pub(crate) fn line_width_pt(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.6
}

/// Greedy word-wrap: accumulate words into a line while the rendered width
/// stays under the column width; on overflow, flush and start a new line.
///
/// A single word wider than the column gets a line of its own and is left to
/// overflow horizontally, matching the best-effort contract of the export.
pub(crate) fn wrap_words(content: &str, column_width: f32, font_size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in content.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if line_width_pt(&candidate, font_size) < column_width {
            current = candidate;
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn format_entry_date(date_millis: i64) -> String {
    match Local.timestamp_millis_opt(date_millis).earliest() {
        Some(dt) => dt.format(PDF_DATE_FORMAT).to_string(),
        None => String::new(),
    }
}

/// Renders `entry` onto a single A4 page and writes it into `output_dir`.
///
/// The file is named from the entry id and the export timestamp. Returns the
/// written path for the caller to open or share.
///
/// # Errors
///
/// Returns an error if PDF generation or the file write fails; this is the
/// one storage-failure path callers surface as a recoverable notice.
pub fn export_entry_pdf(entry: &DiaryEntry, output_dir: &Path) -> AppResult<PathBuf> {
    let file_name = format!("Diary_{}_{}.pdf", entry.id, Utc::now().timestamp_millis());
    let path = output_dir.join(file_name);
    debug!("Exporting entry {} to {:?}", entry.id, path);

    let (doc, page, layer) = PdfDocument::new(
        &entry.title,
        pt_to_mm(PDF_PAGE_WIDTH_PT),
        pt_to_mm(PDF_PAGE_HEIGHT_PT),
        "entry",
    );
    let title_font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(ExportError::Pdf)?;
    let meta_font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(ExportError::Pdf)?;
    let body_font = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(ExportError::Pdf)?;
    let layer = doc.get_page(page).get_layer(layer);

    // Top-down cursor in points; the page origin is bottom-left.
    let y_of = |cursor: f32| pt_to_mm(PDF_PAGE_HEIGHT_PT - cursor);
    let mut cursor = PDF_MARGIN_PT;

    // Title
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    layer.use_text(
        &entry.title,
        PDF_TITLE_SIZE_PT,
        pt_to_mm(PDF_MARGIN_PT),
        y_of(cursor),
        &title_font,
    );
    cursor += 40.0;

    // Date & mood
    let meta_line = format!(
        "{}  |  Mood: {}",
        format_entry_date(entry.date),
        entry.mood.label()
    );
    layer.set_fill_color(Color::Rgb(Rgb::new(0.5, 0.5, 0.5, None)));
    layer.use_text(
        &meta_line,
        PDF_META_SIZE_PT,
        pt_to_mm(PDF_MARGIN_PT),
        y_of(cursor),
        &meta_font,
    );
    cursor += 40.0;

    // Divider
    layer.set_outline_color(Color::Rgb(Rgb::new(0.8, 0.8, 0.8, None)));
    layer.set_outline_thickness(1.0);
    layer.add_line(Line {
        points: vec![
            (Point::new(pt_to_mm(PDF_MARGIN_PT), y_of(cursor)), false),
            (
                Point::new(pt_to_mm(PDF_PAGE_WIDTH_PT - PDF_MARGIN_PT), y_of(cursor)),
                false,
            ),
        ],
        is_closed: false,
    });
    cursor += 30.0;

    // Content, truncated once the cursor passes the printable height
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    let column_width = PDF_PAGE_WIDTH_PT - 2.0 * PDF_MARGIN_PT;
    let lines = wrap_words(&entry.content, column_width, PDF_BODY_SIZE_PT);
    let total = lines.len();
    let mut drawn = 0usize;

    for line in lines {
        if cursor > PDF_PAGE_HEIGHT_PT - PDF_MARGIN_PT {
            debug!(
                "Truncating export of entry {}: {} of {} lines drawn",
                entry.id, drawn, total
            );
            break;
        }
        layer.use_text(
            &line,
            PDF_BODY_SIZE_PT,
            pt_to_mm(PDF_MARGIN_PT),
            y_of(cursor),
            &body_font,
        );
        cursor += PDF_LINE_HEIGHT_PT;
        drawn += 1;
    }

    let file = File::create(&path).map_err(|e| ExportError::Io {
        path: path.clone(),
        source: e,
    })?;
    doc.save(&mut BufWriter::new(file))
        .map_err(ExportError::Pdf)?;

    info!("Exported entry {} to {:?}", entry.id, path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moods::Mood;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_wrap_preserves_words_in_order() {
        let content = "one two three four five six seven";
        let lines = wrap_words(content, 100.0, 16.0);
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, content);
    }

    #[test]
    fn test_wrap_lines_fit_column() {
        let content = "a few short words that should wrap across several lines here";
        let column = 120.0;
        let lines = wrap_words(content, column, 16.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line_width_pt(line, 16.0) < column, "line too wide: {}", line);
        }
    }

    #[test]
    fn test_wrap_empty_content() {
        assert!(wrap_words("", 100.0, 16.0).is_empty());
        assert!(wrap_words("   \n  ", 100.0, 16.0).is_empty());
    }

    #[test]
    fn test_wrap_overlong_word_gets_own_line() {
        let lines = wrap_words("short reallyreallyreallylongword end", 100.0, 16.0);
        assert!(lines.contains(&"reallyreallyreallylongword".to_string()));
    }

    #[test]
    fn test_export_writes_pdf_file() {
        let dir = TempDir::new().unwrap();
        let mut entry = DiaryEntry::new("A day", "Short and sweet.", 0, Mood::Happy);
        entry.id = 3;

        let path = export_entry_pdf(&entry, dir.path()).unwrap();
        assert!(path.exists());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("Diary_3_"));

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_export_truncates_overflowing_content_without_error() {
        let dir = TempDir::new().unwrap();
        let long_content = "word ".repeat(5_000);
        let entry = DiaryEntry::new("Long one", long_content, 0, Mood::Neutral);

        let path = export_entry_pdf(&entry, dir.path()).unwrap();
        assert!(path.exists());
        assert!(!fs::read(&path).unwrap().is_empty());
    }

    #[test]
    fn test_export_to_missing_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let entry = DiaryEntry::new("A day", "body", 0, Mood::Happy);

        let result = export_entry_pdf(&entry, &missing);
        assert!(result.is_err());
    }
}
