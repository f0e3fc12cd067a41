//! Text extraction from uploaded PDF files.

use tracing::warn;

use crate::errors::ServiceError;

/// Extract the text of every page, trimmed
///
/// Parsing runs on the blocking pool. `pdf-extract` panics on some
/// structurally valid files (a page using an undeclared font, for one), so a
/// panicked parse is reported like any other unreadable file.
pub async fn extract_text_from_pdf(bytes: Vec<u8>) -> Result<String, ServiceError> {
    match tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await {
        Ok(Ok(text)) => Ok(text.trim().to_string()),
        Ok(Err(e)) => {
            warn!("PDF extraction failed: {}", e);
            Err(ServiceError::Validation(format!("Could not read PDF: {}", e)))
        }
        Err(e) => {
            warn!("PDF extraction aborted: {}", e);
            Err(ServiceError::Validation("Could not read PDF".to_string()))
        }
    }
}

/// Whether a file name has a `.pdf` extension, in any case
pub fn is_pdf_filename(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".pdf")
}

/// Hand-built single page PDFs with a valid cross-reference table
#[cfg(test)]
pub(crate) mod fixtures {
    const HELVETICA: &str =
        "<< /Font << /F1 << /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >> >> >>";

    pub fn single_page_pdf(content: &str, resources: &str) -> Vec<u8> {
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources {} /Contents 4 0 R >>",
                resources
            ),
            format!("<< /Length {} >>\nstream\n{}\nendstream", content.len(), content),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_at = pdf.len();
        let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            tail.push_str(&format!("{:010} 00000 n \n", offset));
        }
        tail.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        ));
        pdf.extend_from_slice(tail.as_bytes());
        pdf
    }

    /// One line of Helvetica text
    pub fn text_pdf(text: &str) -> Vec<u8> {
        single_page_pdf(&format!("BT /F1 12 Tf 72 712 Td ({}) Tj ET", text), HELVETICA)
    }

    /// Draws with `/F1` while declaring no fonts at all
    pub fn missing_font_pdf() -> Vec<u8> {
        single_page_pdf("BT /F1 12 Tf 72 712 Td (HbA1c) Tj ET", "<< >>")
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{missing_font_pdf, text_pdf};
    use super::*;

    #[test]
    fn pdf_extension_is_case_insensitive() {
        assert!(is_pdf_filename("report.pdf"));
        assert!(is_pdf_filename("REPORT.PDF"));
        assert!(!is_pdf_filename("report.pdf.txt"));
        assert!(!is_pdf_filename("notes.docx"));
    }

    #[tokio::test]
    async fn garbage_bytes_are_rejected() {
        assert!(matches!(
            extract_text_from_pdf(b"definitely not a pdf".to_vec()).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn undeclared_font_is_rejected_not_fatal() {
        let err = extract_text_from_pdf(missing_font_pdf()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref msg) if msg.starts_with("Could not read PDF")));
    }

    #[tokio::test]
    async fn page_text_is_extracted() {
        let text = extract_text_from_pdf(text_pdf("HbA1c 8.1")).await.unwrap();
        assert!(text.contains("HbA1c"), "{:?}", text);
    }
}
