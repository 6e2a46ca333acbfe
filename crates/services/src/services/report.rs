//! PDF export of every stored order.
//!
//! Each order becomes one two-line block. Blocks are laid out top to bottom
//! on A4 pages; a block never straddles a page break. The document is written
//! to a fixed path, so each export replaces the previous one.

use std::path::{Path, PathBuf};

use db::models::order::Order;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

pub const REPORT_TITLE: &str = "Relatório de Pedidos";
const EMPTY_REPORT_NOTE: &str = "Nenhum pedido cadastrado.";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("pdf error: {0}")]
    Pdf(String),
    #[error("could not write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("report rendering task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// The text printed for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportBlock {
    pub order_id: i64,
    pub lines: [String; 2],
}

impl ReportBlock {
    /// The block's lines as printed, wrapped to the page width.
    pub fn printed_lines(&self, layout: &PageLayout) -> Vec<String> {
        self.lines.iter().flat_map(|line| layout.wrap(line)).collect()
    }
}

impl From<&Order> for ReportBlock {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            lines: [
                format!(
                    "ID: {} | Cliente: {} | Tema: {} | Moldura: {}",
                    order.id, order.client, order.theme, order.frame_option
                ),
                format!(
                    "Tamanho: {} | Data do Pedido: {} | Data de Entrega: {} | Pagamento: {}",
                    order.size, order.order_date, order.delivery_date, order.payment_method
                ),
            ],
        }
    }
}

/// Points to millimetres.
const PT_TO_MM: f32 = 25.4 / 72.0;

/// Helvetica advance widths for ' '..='~', in thousandths of an em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..='/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..='?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..='O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..='_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..='o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..='~'
];

/// Width of `c` in thousandths of an em. Accented capitals count as 722,
/// any other non-ASCII character as 556.
fn glyph_width(c: char) -> u16 {
    match c {
        ' '..='~' => HELVETICA_WIDTHS[c as usize - ' ' as usize],
        '\u{C0}'..='\u{DE}' => 722,
        _ => 556,
    }
}

/// Page geometry, in millimetres and points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
    /// Space taken by the title on the first page.
    pub title_height_mm: f32,
    pub line_height_mm: f32,
    pub block_gap_mm: f32,
    pub title_font_pt: f32,
    pub body_font_pt: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_mm: 15.0,
            title_height_mm: 14.0,
            line_height_mm: 6.0,
            block_gap_mm: 4.0,
            title_font_pt: 16.0,
            body_font_pt: 9.0,
        }
    }
}

impl PageLayout {
    fn usable_height(&self, first_page: bool) -> f32 {
        let usable = self.height_mm - 2.0 * self.margin_mm;
        if first_page {
            usable - self.title_height_mm
        } else {
            usable
        }
    }

    fn block_height(&self, block: &ReportBlock) -> f32 {
        block.printed_lines(self).len() as f32 * self.line_height_mm + self.block_gap_mm
    }

    /// Width available to body text, between the margins.
    pub fn text_width_mm(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }

    /// Printed width of `text` in the body font.
    pub fn measure_mm(&self, text: &str) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(glyph_width(c))).sum();
        units as f32 / 1000.0 * self.body_font_pt * PT_TO_MM
    }

    /// Break `line` at spaces so every piece fits [`Self::text_width_mm`].
    /// Words wider than a whole line are split between characters.
    pub fn wrap(&self, line: &str) -> Vec<String> {
        let limit = self.text_width_mm();
        if self.measure_mm(line) <= limit {
            return vec![line.to_string()];
        }

        let mut lines = Vec::new();
        let mut current = String::new();
        for word in line.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if self.measure_mm(&candidate) <= limit {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            for c in word.chars() {
                current.push(c);
                if self.measure_mm(&current) > limit && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::replace(&mut current, c.to_string()));
                }
            }
        }
        if !current.is_empty() || lines.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Split blocks into pages by height. Always yields at least one
    /// (possibly empty) page so the title is printed. A block taller than a
    /// page still gets a page of its own.
    pub fn paginate(&self, blocks: Vec<ReportBlock>) -> Vec<Vec<ReportBlock>> {
        let mut pages: Vec<Vec<ReportBlock>> = vec![Vec::new()];
        let mut remaining = self.usable_height(true);

        for block in blocks {
            let height = self.block_height(&block);
            let started = pages.last().is_some_and(|page| !page.is_empty());
            if started && height > remaining {
                pages.push(Vec::new());
                remaining = self.usable_height(false);
            }
            remaining -= height;
            if let Some(page) = pages.last_mut() {
                page.push(block);
            }
        }
        pages
    }
}

/// Render the orders into PDF bytes.
pub fn render_pdf(orders: &[Order], layout: &PageLayout) -> Result<Vec<u8>, ReportError> {
    let pages = layout.paginate(orders.iter().map(ReportBlock::from).collect());

    let (doc, first_page, first_layer) = PdfDocument::new(
        REPORT_TITLE,
        Mm(layout.width_mm),
        Mm(layout.height_mm),
        "Pedidos",
    );
    let body_font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;
    let title_font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;

    for (index, blocks) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(layout.width_mm), Mm(layout.height_mm), "Pedidos");
            doc.get_page(page).get_layer(layer)
        };

        let mut y = layout.height_mm - layout.margin_mm;
        if index == 0 {
            write_line(&layer, REPORT_TITLE, layout.title_font_pt, layout.margin_mm, y, &title_font);
            y -= layout.title_height_mm;
            if blocks.is_empty() {
                write_line(&layer, EMPTY_REPORT_NOTE, layout.body_font_pt, layout.margin_mm, y, &body_font);
            }
        }
        for block in blocks {
            for line in block.printed_lines(layout) {
                write_line(&layer, &line, layout.body_font_pt, layout.margin_mm, y, &body_font);
                y -= layout.line_height_mm;
            }
            y -= layout.block_gap_mm;
        }
    }

    doc.save_to_bytes().map_err(|e| ReportError::Pdf(e.to_string()))
}

fn write_line(
    layer: &PdfLayerReference,
    text: &str,
    font_pt: f32,
    x_mm: f32,
    y_mm: f32,
    font: &IndirectFontRef,
) {
    layer.use_text(text, font_pt, Mm(x_mm), Mm(y_mm), font);
}

/// Outcome of one export.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub path: PathBuf,
    pub order_count: usize,
    pub page_count: usize,
    pub size_bytes: usize,
}

/// A generated report: the file that was written and its bytes for download.
#[derive(Debug, Clone)]
pub struct Report {
    pub summary: ReportSummary,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct ReportService {
    pool: SqlitePool,
    output_path: PathBuf,
    layout: PageLayout,
}

impl ReportService {
    pub fn new(pool: SqlitePool, output_path: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            output_path: output_path.into(),
            layout: PageLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: PageLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// File name offered to the browser.
    pub fn file_name(&self) -> String {
        self.output_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "relatorio_pedidos.pdf".to_string())
    }

    /// Export every order, overwriting the output file.
    pub async fn generate(&self) -> Result<Report, ReportError> {
        let orders = Order::find_all(&self.pool).await?;
        let order_count = orders.len();
        let page_count = self
            .layout
            .paginate(orders.iter().map(ReportBlock::from).collect())
            .len();

        let layout = self.layout;
        let bytes = tokio::task::spawn_blocking(move || render_pdf(&orders, &layout)).await??;

        tokio::fs::write(&self.output_path, &bytes)
            .await
            .map_err(|source| ReportError::Write {
                path: self.output_path.clone(),
                source,
            })?;

        info!(
            path = %self.output_path.display(),
            orders = order_count,
            pages = page_count,
            "Report generated"
        );

        Ok(Report {
            summary: ReportSummary {
                path: self.output_path.clone(),
                order_count,
                page_count,
                size_bytes: bytes.len(),
            },
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use db::{DBService, models::order::CreateOrder};
    use printpdf::lopdf::{self, Object, content::Content};

    use super::*;

    fn order(id: i64, client: &str) -> Order {
        Order {
            id,
            client: client.to_string(),
            theme: "Natureza Morta".to_string(),
            frame_option: "Com Moldura".to_string(),
            size: "80cm x 100cm".to_string(),
            custom_size: String::new(),
            order_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            lead_time_days: 45,
            delivery_date: NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(),
            payment_terms: String::new(),
            payment_method: "Transferência".to_string(),
        }
    }

    #[test]
    fn block_shows_stored_fields_verbatim() {
        let block = ReportBlock::from(&order(7, "João"));
        assert_eq!(block.order_id, 7);
        assert_eq!(
            block.lines[0],
            "ID: 7 | Cliente: João | Tema: Natureza Morta | Moldura: Com Moldura"
        );
        assert_eq!(
            block.lines[1],
            "Tamanho: 80cm x 100cm | Data do Pedido: 2024-07-01 | Data de Entrega: 2024-08-15 | Pagamento: Transferência"
        );
    }

    /// Operand bytes of every `Tj` in the document, page by page.
    fn shown_text(bytes: &[u8]) -> Vec<Vec<Vec<u8>>> {
        let doc = lopdf::Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|&page_id| {
                let content = doc.get_page_content(page_id).unwrap();
                Content::decode(&content)
                    .unwrap()
                    .operations
                    .into_iter()
                    .filter(|op| op.operator == "Tj")
                    .filter_map(|op| match op.operands.first() {
                        Some(Object::String(text, _)) => Some(text.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .collect()
    }

    /// WinAnsi bytes of Latin-1 text.
    fn win_ansi(text: &str) -> Vec<u8> {
        text.chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap())
            .collect()
    }

    #[test]
    fn paginate_keeps_every_block_once() {
        let layout = PageLayout::default();
        let blocks: Vec<_> = (1..=40).map(|id| ReportBlock::from(&order(id, "Ana"))).collect();

        let pages = layout.paginate(blocks.clone());
        let flattened: Vec<_> = pages.iter().flatten().cloned().collect();

        assert_eq!(flattened, blocks);
        // 297 - 30 - 14 = 253mm on the first page, 267mm after, 16mm blocks.
        let sizes: Vec<_> = pages.iter().map(Vec::len).collect();
        assert_eq!(sizes, [15, 16, 9]);
    }

    #[test]
    fn pages_never_overflow_with_wrapped_blocks() {
        let layout = PageLayout::default();
        let long_name = "Maria Aparecida ".repeat(12);
        let blocks: Vec<_> = (1..=30)
            .map(|id| {
                let client = if id % 3 == 0 { long_name.trim() } else { "Ana" };
                ReportBlock::from(&order(id, client))
            })
            .collect();

        let pages = layout.paginate(blocks.clone());

        assert_eq!(pages.iter().flatten().cloned().collect::<Vec<_>>(), blocks);
        for (index, page) in pages.iter().enumerate() {
            let used: f32 = page.iter().map(|block| layout.block_height(block)).sum();
            assert!(used <= layout.usable_height(index == 0), "page {index} overflows");
        }
    }

    #[test]
    fn empty_report_has_one_page() {
        let pages = PageLayout::default().paginate(Vec::new());
        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_empty());
    }

    #[test]
    fn short_lines_are_printed_verbatim() {
        let layout = PageLayout::default();
        let block = ReportBlock::from(&order(7, "João"));
        assert_eq!(block.printed_lines(&layout), block.lines.to_vec());
    }

    #[test]
    fn long_lines_wrap_inside_the_margins() {
        let layout = PageLayout::default();
        let fits = |line: &String| layout.measure_mm(line) <= layout.text_width_mm();
        let long_name = "Maria Aparecida ".repeat(12);
        let block = ReportBlock::from(&order(1, long_name.trim()));

        let printed = block.printed_lines(&layout);

        assert!(printed.len() > 2);
        assert!(printed.iter().all(fits));
        assert_eq!(printed.join(" "), block.lines.join(" "));

        // 'X' is 667/1000 em: at 9pt, 84 fit in 180mm and 85 do not.
        let unbroken = "X".repeat(200);
        let pieces = layout.wrap(&unbroken);
        assert_eq!(pieces.iter().map(String::len).collect::<Vec<_>>(), [84, 84, 32]);
        assert!(pieces.iter().all(fits));
        assert_eq!(pieces.concat(), unbroken);
    }

    #[test]
    fn pdf_shows_one_block_per_order_across_pages() {
        let layout = PageLayout::default();
        for (count, page_count) in [(0, 1), (1, 1), (15, 1), (16, 2), (40, 3)] {
            let orders: Vec<_> = (1..=count).map(|id| order(id, "João")).collect();

            let pages = shown_text(&render_pdf(&orders, &layout).unwrap());
            assert_eq!(pages.len(), page_count, "{count} orders");

            let mut shown: Vec<Vec<u8>> = pages.into_iter().flatten().collect();
            assert_eq!(shown.remove(0), win_ansi(REPORT_TITLE));
            if count == 0 {
                assert_eq!(shown, vec![win_ansi(EMPTY_REPORT_NOTE)]);
                continue;
            }

            let expected: Vec<Vec<u8>> = orders
                .iter()
                .flat_map(|o| ReportBlock::from(o).lines.map(|line| win_ansi(&line)))
                .collect();
            assert_eq!(shown, expected, "{count} orders");
        }
    }

    #[test]
    fn pdf_keeps_accented_values_as_stored() {
        let mut stored = order(3, "João");
        stored.payment_method = "Cartão".to_string();

        let pages = shown_text(&render_pdf(&[stored], &PageLayout::default()).unwrap());
        let lines = &pages[0];

        assert_eq!(lines[0], b"Relat\xf3rio de Pedidos");
        assert_eq!(
            lines[1],
            b"ID: 3 | Cliente: Jo\xe3o | Tema: Natureza Morta | Moldura: Com Moldura"
        );
        assert!(lines[2].ends_with(b"Pagamento: Cart\xe3o"));
    }

    #[test]
    fn pdf_wraps_long_client_names() {
        let layout = PageLayout::default();
        let long_name = "Maria Aparecida ".repeat(12);
        let stored = order(1, long_name.trim());

        let pages = shown_text(&render_pdf(&[stored.clone()], &layout).unwrap());

        let expected: Vec<_> = ReportBlock::from(&stored)
            .printed_lines(&layout)
            .iter()
            .map(|line| win_ansi(line))
            .collect();
        assert!(expected.len() > 2);
        assert_eq!(pages[0][1..], expected[..]);
    }

    #[tokio::test]
    async fn generate_writes_and_overwrites_the_fixed_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = DBService::new(dir.path().join("encomendas.db")).await.unwrap();
        let output = dir.path().join("relatorio_pedidos.pdf");
        let reports = ReportService::new(db.pool.clone(), &output);

        let empty = reports.generate().await.unwrap();
        assert_eq!(empty.summary.order_count, 0);
        assert_eq!(empty.summary.page_count, 1);

        for client in ["Ana", "Bruno", "Carla"] {
            let data = CreateOrder {
                client: client.to_string(),
                theme: "Paisagem".to_string(),
                frame_option: "Sem Moldura".to_string(),
                size: "50cm x 70cm".to_string(),
                custom_size: String::new(),
                order_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                lead_time_days: 15,
                delivery_date: NaiveDate::from_ymd_opt(2024, 7, 16).unwrap(),
                payment_terms: String::new(),
                payment_method: "Dinheiro".to_string(),
            };
            Order::create(&db.pool, &data).await.unwrap();
        }

        let report = reports.generate().await.unwrap();
        assert_eq!(report.summary.order_count, 3);
        assert_eq!(report.summary.path, output);
        assert_eq!(report.summary.size_bytes, report.bytes.len());

        let on_disk = std::fs::read(&output).unwrap();
        assert_eq!(on_disk, report.bytes);
        assert_eq!(reports.file_name(), "relatorio_pedidos.pdf");
    }
}
