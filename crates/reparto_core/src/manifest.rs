//! Route sheet ("Hoja de Ruta") generation from a delivery record snapshot.
//!
//! Generation is a pure function of the snapshot and the generation
//! timestamp: rows keep the registration order, numbering runs 1..N across
//! the whole document, and pages hold a fixed number of rows with the
//! header repeated. Callers wanting reproducible bytes inject the timestamp
//! through [`generate_at`].

use chrono::{DateTime, Utc};

use crate::store::DeliveryRecord;

/// Title printed at the top of every page.
pub const DEFAULT_TITLE: &str = "Hoja de Ruta";

/// Rows per printed page. A configuration constant, not derived from paper
/// metrics at runtime.
pub const DEFAULT_ROWS_PER_PAGE: usize = 20;

/// Layout settings for the route sheet.
#[derive(Debug, Clone)]
pub struct ManifestConfig {
    pub title: String,
    pub rows_per_page: usize,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

impl ManifestConfig {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_rows_per_page(mut self, rows_per_page: usize) -> Self {
        self.rows_per_page = rows_per_page;
        self
    }
}

/// One printed line: a delivery in registration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestRow {
    /// 1-indexed position across the whole document, not per page.
    pub index: usize,
    pub courier: String,
    pub address: String,
    pub delivery_date: chrono::NaiveDate,
}

/// One page: repeated header plus a bounded run of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestPage {
    /// 1-indexed page number.
    pub number: usize,
    pub rows: Vec<ManifestRow>,
}

/// The generated document. Derived output only — never persisted,
/// regenerated on each export.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDocument {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub pages: Vec<ManifestPage>,
}

impl ManifestDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn row_count(&self) -> usize {
        self.pages.iter().map(|page| page.rows.len()).sum()
    }
}

/// Generate the route sheet, stamped with the current time.
pub fn generate(records: &[DeliveryRecord], config: &ManifestConfig) -> ManifestDocument {
    generate_at(records, Utc::now(), config)
}

/// Generate the route sheet with an injected generation timestamp.
pub fn generate_at(
    records: &[DeliveryRecord],
    generated_at: DateTime<Utc>,
    config: &ManifestConfig,
) -> ManifestDocument {
    let rows_per_page = config.rows_per_page.max(1);

    let rows: Vec<ManifestRow> = records
        .iter()
        .enumerate()
        .map(|(idx, record)| ManifestRow {
            index: idx + 1,
            courier: record.courier_name.clone(),
            address: record.address.clone(),
            delivery_date: record.delivery_date,
        })
        .collect();

    let pages: Vec<ManifestPage> = if rows.is_empty() {
        // An empty snapshot still prints as one header-only sheet.
        vec![ManifestPage {
            number: 1,
            rows: Vec::new(),
        }]
    } else {
        rows.chunks(rows_per_page)
            .enumerate()
            .map(|(idx, chunk)| ManifestPage {
                number: idx + 1,
                rows: chunk.to_vec(),
            })
            .collect()
    };

    ManifestDocument {
        title: config.title.clone(),
        generated_at,
        pages,
    }
}

const INDEX_LABEL: &str = "#";
const COURIER_LABEL: &str = "Repartidor";
const ADDRESS_LABEL: &str = "Dirección";
const DATE_LABEL: &str = "Fecha";

/// Render the document as printable plain text, pages separated by form
/// feeds. Byte-identical output for identical document input.
pub fn render_text(document: &ManifestDocument) -> String {
    // Column widths span the whole document so every page lines up.
    let all_rows = document.pages.iter().flat_map(|page| page.rows.iter());
    let mut index_width = INDEX_LABEL.chars().count();
    let mut courier_width = COURIER_LABEL.chars().count();
    let mut address_width = ADDRESS_LABEL.chars().count();
    for row in all_rows {
        index_width = index_width.max(row.index.to_string().chars().count());
        courier_width = courier_width.max(row.courier.chars().count());
        address_width = address_width.max(row.address.chars().count());
    }

    let total_pages = document.pages.len();
    let generated_line = format!(
        "Generado: {} UTC",
        document.generated_at.format("%Y-%m-%d %H:%M")
    );

    let mut pages_text = Vec::with_capacity(total_pages);
    for page in &document.pages {
        let mut text = String::new();
        text.push_str(&document.title);
        text.push('\n');
        text.push_str(&generated_line);
        text.push('\n');
        text.push_str(&format!("Página {} de {}\n\n", page.number, total_pages));
        text.push_str(&format!(
            "{} | {} | {} | {}\n",
            pad(INDEX_LABEL, index_width),
            pad(COURIER_LABEL, courier_width),
            pad(ADDRESS_LABEL, address_width),
            DATE_LABEL
        ));
        for row in &page.rows {
            text.push_str(&format!(
                "{} | {} | {} | {}\n",
                pad(&row.index.to_string(), index_width),
                pad(&row.courier, courier_width),
                pad(&row.address, address_width),
                row.delivery_date.format("%Y-%m-%d")
            ));
        }
        pages_text.push(text);
    }

    pages_text.join("\u{0c}\n")
}

/// Space-pad to a display width counted in characters, so accented street
/// names keep the columns aligned.
fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let mut padded = String::with_capacity(text.len() + width.saturating_sub(len));
    padded.push_str(text);
    for _ in len..width {
        padded.push(' ');
    }
    padded
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use crate::geo::GeoPoint;

    use super::*;

    fn record(courier: &str, address: &str, day: u32) -> DeliveryRecord {
        DeliveryRecord {
            id: format!("rep-{day:06}"),
            courier_name: courier.to_string(),
            address: address.to_string(),
            position: GeoPoint::new(-26.8241, -65.2226).unwrap(),
            delivery_date: NaiveDate::from_ymd_opt(2024, 11, day).unwrap(),
            order_id: None,
        }
    }

    fn fixed_timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 4, 8, 30, 0).unwrap()
    }

    #[test]
    fn rows_keep_registration_order_and_continuous_numbering() {
        let records = vec![
            record("Juan", "Calle 25 de Mayo 455", 5),
            record("Marta", "Av. Aconquija 1400", 6),
            record("Juan", "Crisóstomo Álvarez 800", 7),
        ];

        let document = generate_at(&records, fixed_timestamp(), &ManifestConfig::default());
        assert_eq!(document.page_count(), 1);

        let rows = &document.pages[0].rows;
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].courier, "Juan");
        assert_eq!(rows[2].index, 3);
        assert_eq!(rows[2].address, "Crisóstomo Álvarez 800");
    }

    #[test]
    fn one_row_past_capacity_starts_a_second_page() {
        let capacity = 3;
        let records: Vec<_> = (1..=capacity as u32 + 1)
            .map(|day| record("Juan", "Calle 25 de Mayo 455", day))
            .collect();

        let config = ManifestConfig::default().with_rows_per_page(capacity);
        let document = generate_at(&records, fixed_timestamp(), &config);

        assert_eq!(document.page_count(), 2);
        assert_eq!(document.pages[0].rows.len(), capacity);
        assert_eq!(document.pages[1].rows.len(), 1);
        // Numbering continues across the page break instead of resetting.
        assert_eq!(document.pages[0].rows.last().unwrap().index, capacity);
        assert_eq!(document.pages[1].rows[0].index, capacity + 1);
    }

    #[test]
    fn empty_snapshot_renders_a_single_header_only_page() {
        let document = generate_at(&[], fixed_timestamp(), &ManifestConfig::default());
        assert_eq!(document.page_count(), 1);
        assert_eq!(document.row_count(), 0);

        let text = render_text(&document);
        assert!(text.starts_with("Hoja de Ruta\n"));
        assert!(text.contains("Página 1 de 1"));
    }

    #[test]
    fn rendering_is_deterministic_for_identical_input() {
        let records = vec![
            record("Juan", "Calle 25 de Mayo 455", 5),
            record("Marta", "Av. Aconquija 1400", 6),
        ];
        let config = ManifestConfig::default();

        let first = render_text(&generate_at(&records, fixed_timestamp(), &config));
        let second = render_text(&generate_at(&records, fixed_timestamp(), &config));
        assert_eq!(first, second);
    }

    #[test]
    fn rendered_pages_repeat_the_header() {
        let records: Vec<_> = (1..=4)
            .map(|day| record("Juan", "Calle 25 de Mayo 455", day))
            .collect();
        let config = ManifestConfig::default().with_rows_per_page(2);

        let text = render_text(&generate_at(&records, fixed_timestamp(), &config));
        assert_eq!(text.matches("Hoja de Ruta").count(), 2);
        assert_eq!(text.matches("Generado: 2024-11-04 08:30 UTC").count(), 2);
        assert!(text.contains("Página 1 de 2"));
        assert!(text.contains("Página 2 de 2"));
        assert_eq!(text.matches('\u{0c}').count(), 1);
    }

    #[test]
    fn rendered_columns_align_across_rows() {
        let records = vec![
            record("Juan", "Calle 25 de Mayo 455", 5),
            record("María de los Ángeles", "Av. Aconquija 1400", 6),
        ];

        let text = render_text(&generate_at(&records, fixed_timestamp(), &ManifestConfig::default()));
        let lines: Vec<&str> = text
            .lines()
            .filter(|line| line.contains(" | "))
            .collect();

        let separator_positions: Vec<Vec<usize>> = lines
            .iter()
            .map(|line| {
                line.chars()
                    .enumerate()
                    .filter(|(_, c)| *c == '|')
                    .map(|(idx, _)| idx)
                    .collect()
            })
            .collect();
        assert!(separator_positions.windows(2).all(|w| w[0] == w[1]));
    }
}
