//! Minimal inline HTML for the upload form and the result page

/// Render the form, optionally with a predicted label and the stored image
pub fn index(label: Option<&str>, image_url: Option<&str>) -> String {
    let mut result = String::new();
    if let Some(label) = label {
        result.push_str(&format!("<h2>Prediction: {}</h2>\n", escape(label)));
    }
    if let Some(url) = image_url {
        result.push_str(&format!(
            "<img src=\"{}\" alt=\"uploaded image\" width=\"224\">\n",
            escape(url)
        ));
    }

    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><title>Image Classifier</title></head>\n\
         <body>\n\
         <h1>Image Classifier</h1>\n\
         <form method=\"post\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"file\">\n\
         <input type=\"submit\" value=\"Classify\">\n\
         </form>\n\
         {result}\
         </body>\n\
         </html>\n"
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_form_has_no_result() {
        let page = index(None, None);
        assert!(page.contains("name=\"file\""));
        assert!(!page.contains("Prediction:"));
        assert!(!page.contains("<img"));
    }

    #[test]
    fn test_result_page_shows_label_and_image() {
        let page = index(Some("bald_eagle"), Some("/uploads/abc.jpg"));
        assert!(page.contains("Prediction: bald_eagle"));
        assert!(page.contains("src=\"/uploads/abc.jpg\""));
    }

    #[test]
    fn test_labels_are_escaped() {
        let page = index(Some("<script>"), None);
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
    }
}
