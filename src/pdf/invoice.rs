//! Single-page A4 tax invoice.
//!
//! Layout coordinates are given from the top-left corner of the page and
//! converted to PDF user space (origin bottom-left) when drawn.

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};

use crate::billing::Ledger;
use crate::company::{Company, HIQODE};
use crate::format;
use crate::model::EnrollmentDetail;

const PAGE_W: f32 = 595.0;
const PAGE_H: f32 = 842.0;
const MARGIN: f32 = 50.0;
const CONTENT_W: f32 = PAGE_W - 2.0 * MARGIN;

const FONT: Name<'static> = Name(b"F1");
const FONT_BOLD: Name<'static> = Name(b"F2");
const WATERMARK_STATE: Name<'static> = Name(b"GS1");

const WATERMARK_SIZE: f32 = 80.0;
const WATERMARK_OPACITY: f32 = 0.14;
const WATERMARK_ANGLE_DEG: f32 = 30.0;

/// Renders the invoice of `enrollment` as PDF bytes.
pub fn render_invoice(enrollment: &EnrollmentDetail) -> Vec<u8> {
    InvoicePdf::new(&HIQODE).render(enrollment, &enrollment.ledger())
}

struct InvoicePdf<'a> {
    company: &'a Company,
    pdf: Pdf,
    next_id: i32,
}

impl<'a> InvoicePdf<'a> {
    fn new(company: &'a Company) -> Self {
        Self {
            company,
            pdf: Pdf::new(),
            next_id: 1,
        }
    }

    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    fn render(mut self, enrollment: &EnrollmentDetail, ledger: &Ledger) -> Vec<u8> {
        let catalog_id = self.fresh_ref();
        let pages_id = self.fresh_ref();
        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();
        let font_id = self.fresh_ref();
        let bold_id = self.fresh_ref();
        let gs_id = self.fresh_ref();

        self.pdf.catalog(catalog_id).pages(pages_id);
        self.pdf.pages(pages_id).kids([page_id]).count(1);

        {
            let mut page = self.pdf.page(page_id);
            page.parent(pages_id)
                .media_box(Rect::new(0.0, 0.0, PAGE_W, PAGE_H))
                .contents(content_id);

            let mut resources = page.resources();
            resources
                .fonts()
                .pair(FONT, font_id)
                .pair(FONT_BOLD, bold_id);
            resources.ext_g_states().pair(WATERMARK_STATE, gs_id);
        }

        self.pdf
            .type1_font(font_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        self.pdf
            .type1_font(bold_id)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        self.pdf
            .ext_graphics(gs_id)
            .non_stroking_alpha(WATERMARK_OPACITY);

        let mut content = Content::new();
        self.draw_watermark(&mut content);
        self.draw_header(&mut content, enrollment);
        self.draw_billed_to(&mut content, enrollment);
        self.draw_item_table(&mut content, enrollment, ledger);
        self.draw_summary(&mut content, ledger);
        self.draw_footer(&mut content);

        self.pdf.stream(content_id, &content.finish());
        self.pdf.finish()
    }

    fn draw_watermark(&self, content: &mut Content) {
        let text = self.company.name;
        let (sin, cos) = WATERMARK_ANGLE_DEG.to_radians().sin_cos();

        content.save_state();
        content.set_parameters(WATERMARK_STATE);
        content.set_fill_gray(0.867);
        // Origin at page centre, rotated counter-clockwise.
        content.transform([cos, sin, -sin, cos, PAGE_W / 2.0, PAGE_H / 2.0]);

        let width = text_width(text, WATERMARK_SIZE);
        content.begin_text();
        content.set_font(FONT, WATERMARK_SIZE);
        content.set_text_matrix([1.0, 0.0, 0.0, 1.0, -width / 2.0, -WATERMARK_SIZE / 3.0]);
        content.show(Str(&encode(text)));
        content.end_text();
        content.restore_state();
    }

    fn draw_header(&self, content: &mut Content, enrollment: &EnrollmentDetail) {
        draw_text(content, FONT_BOLD, 18.0, MARGIN, 40.0, self.company.name);
        draw_text(
            content,
            FONT,
            10.0,
            MARGIN,
            65.0,
            &format!("GSTIN: {}", self.company.gstin),
        );
        for (i, line) in self.company.address.iter().enumerate() {
            draw_text(content, FONT, 10.0, MARGIN, 80.0 + 15.0 * i as f32, line);
        }

        let right = PAGE_W - MARGIN;
        draw_text_right(content, FONT_BOLD, 14.0, right, 40.0, "Tax Invoice");
        draw_text_right(
            content,
            FONT,
            10.0,
            right,
            60.0,
            &format!("Invoice #: {}", enrollment.invoice_number),
        );
        draw_text_right(
            content,
            FONT,
            10.0,
            right,
            75.0,
            &format!("Date: {}", format::date_dmy(&enrollment.invoice_date)),
        );
    }

    fn draw_billed_to(&self, content: &mut Content, enrollment: &EnrollmentDetail) {
        draw_text(content, FONT_BOLD, 11.0, MARGIN, 140.0, "Billed To:");
        draw_text(content, FONT, 10.0, MARGIN, 155.0, &enrollment.student_name);
        draw_text(
            content,
            FONT,
            10.0,
            MARGIN,
            170.0,
            enrollment.student_email.as_deref().unwrap_or(""),
        );
        draw_text(
            content,
            FONT,
            10.0,
            MARGIN,
            185.0,
            enrollment.student_phone.as_deref().unwrap_or(""),
        );

        if let Some(pan) = enrollment.pan.as_deref().filter(|p| !p.trim().is_empty()) {
            draw_text(content, FONT, 10.0, MARGIN, 200.0, &format!("PAN: {pan}"));
        }
    }

    fn draw_item_table(&self, content: &mut Content, enrollment: &EnrollmentDetail, ledger: &Ledger) {
        draw_rule(content, 220.0);
        draw_text(content, FONT_BOLD, 11.0, MARGIN, 230.0, "Course");
        draw_text(content, FONT_BOLD, 11.0, 280.0, 230.0, "Base (INR)");
        draw_text(
            content,
            FONT_BOLD,
            11.0,
            360.0,
            230.0,
            &format!("GST {}% (INR)", enrollment.gst_rate),
        );
        draw_text(content, FONT_BOLD, 11.0, 460.0, 230.0, "Total (INR)");
        draw_rule(content, 250.0);

        draw_text(content, FONT, 10.0, MARGIN, 260.0, &enrollment.course_name);
        draw_text(content, FONT, 10.0, 280.0, 260.0, &format::amount(ledger.base));
        draw_text(content, FONT, 10.0, 380.0, 260.0, &format::amount(ledger.tax));
        draw_text(content, FONT, 10.0, 470.0, 260.0, &format::amount(ledger.total));
        draw_rule(content, 290.0);
    }

    fn draw_summary(&self, content: &mut Content, ledger: &Ledger) {
        draw_text(content, FONT, 10.0, 330.0, 310.0, "Amount Paid (INR):");
        draw_text(content, FONT, 10.0, 470.0, 310.0, &format::amount(ledger.paid));
        draw_text(content, FONT_BOLD, 10.0, 330.0, 330.0, "Balance (INR):");
        draw_text(content, FONT_BOLD, 10.0, 470.0, 330.0, &format::amount(ledger.balance));
    }

    fn draw_footer(&self, content: &mut Content) {
        const SIZE: f32 = 9.0;
        const LEADING: f32 = 12.0;
        let columns = (CONTENT_W / (SIZE * 0.5)) as usize;

        content.save_state();
        content.set_fill_gray(0.333);

        let mut y = 370.0;
        for paragraph in self.company.footer {
            for line in textwrap::wrap(paragraph, columns) {
                draw_text(content, FONT, SIZE, MARGIN, y, &line);
                y += LEADING;
            }
            y += LEADING;
        }

        content.restore_state();
    }
}

/// Text whose top edge sits `top` points below the top of the page.
fn draw_text(content: &mut Content, font: Name, size: f32, x: f32, top: f32, text: &str) {
    if text.is_empty() {
        return;
    }
    let baseline = PAGE_H - top - size * 0.8;

    content.begin_text();
    content.set_font(font, size);
    content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, baseline]);
    content.show(Str(&encode(text)));
    content.end_text();
}

fn draw_text_right(content: &mut Content, font: Name, size: f32, right: f32, top: f32, text: &str) {
    let x = right - text_width(text, size);
    draw_text(content, font, size, x, top, text);
}

fn draw_rule(content: &mut Content, top: f32) {
    let y = PAGE_H - top;
    content.save_state();
    content.set_line_width(0.8);
    content.move_to(MARGIN, y);
    content.line_to(PAGE_W - MARGIN, y);
    content.stroke();
    content.restore_state();
}

/// Approximate Helvetica advance width, good enough for alignment.
fn text_width(text: &str, size: f32) -> f32 {
    let em: f32 = text
        .chars()
        .map(|c| match c {
            ' ' | '.' | ',' | ':' | ';' | '!' | '\'' | '|' | 'i' | 'j' | 'l' | 'I' => 0.278,
            'f' | 't' | 'r' | '/' | '-' | '(' | ')' => 0.333,
            'm' | 'w' | 'M' | 'W' | '%' => 0.85,
            '0'..='9' | '#' | '$' => 0.556,
            c if c.is_ascii_uppercase() => 0.667,
            _ => 0.5,
        })
        .sum();
    em * size
}

/// WinAnsi bytes for the standard fonts; characters outside Latin-1 become `?`.
fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
