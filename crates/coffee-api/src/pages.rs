//! # Pages
//!
//! Server-rendered HTML for the storefront and the thank-you page.

use coffee_core::{DonationConfig, DonationForm, DonationRecord, PRESETS};
use std::fmt::Write;

const STYLE: &str = r#"
    body { font-family: system-ui; margin: 0; min-height: 100vh; display: flex; justify-content: center; align-items: flex-start; background: linear-gradient(135deg, #1a1a2e 0%, #16213e 100%); }
    main { background: white; margin: 40px 16px; padding: 40px; border-radius: 16px; width: 100%; max-width: 480px; }
    h1 { margin-top: 0; }
    form { display: flex; flex-direction: column; gap: 12px; }
    .error { color: #b00020; }
    .presets { display: flex; gap: 8px; align-items: center; }
    .presets button { width: 48px; height: 48px; border-radius: 50%; border: 1px solid #ccc; background: white; cursor: pointer; }
    .presets input { width: 80px; padding: 8px; }
    input[type=text], textarea { padding: 8px; font: inherit; }
    .donate { order: 99; padding: 12px; border: 0; border-radius: 8px; background: #ff813f; color: white; font-size: 18px; cursor: pointer; }
    .donation { border-top: 1px solid #eee; padding: 8px 0; }
"#;

/// Everything the storefront page shows
pub struct HomePage<'a> {
    pub config: &'a DonationConfig,
    pub form: &'a DonationForm,
    pub donations: &'a [DonationRecord],
}

impl HomePage<'_> {
    pub fn render(&self) -> String {
        let form = self.form;
        let mut html = String::with_capacity(4096);

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str("<title>Buy Me A Coffee</title>\n<style>");
        html.push_str(STYLE);
        html.push_str("</style>\n</head>\n<body>\n<main>\n");

        html.push_str("<form method=\"post\" action=\"/\">\n");
        html.push_str("<h1>BUY ME A COFFEE ☕️</h1>\n");
        if let Some(error) = form.error() {
            let _ = writeln!(html, "<div class=\"error\" role=\"alert\">{}</div>", escape_html(error));
        }

        // First in source order so pressing Enter donates; CSS moves it to the bottom.
        let _ = writeln!(
            html,
            "<button class=\"donate\" type=\"submit\" name=\"action\" value=\"donate\">Donate = {}</button>",
            escape_html(&form.support_amount_display(self.config))
        );

        html.push_str("<div class=\"presets\">\n");
        for preset in PRESETS {
            let _ = writeln!(
                html,
                "<button type=\"submit\" name=\"preset\" value=\"{0}\">{0}</button>",
                preset
            );
        }
        let _ = writeln!(
            html,
            "<input type=\"number\" name=\"quantity\" aria-label=\"quantity\" value=\"{}\" min=\"1\" max=\"{}\">",
            quantity_value(form.quantity()),
            self.config.max_quantity()
        );
        html.push_str("</div>\n");

        let _ = writeln!(
            html,
            "<label for=\"name\">Name</label>\n<input type=\"text\" id=\"name\" name=\"name\" value=\"{}\">",
            escape_html(form.name())
        );
        let _ = writeln!(
            html,
            "<label for=\"message\">Message</label>\n<textarea id=\"message\" name=\"message\">{}</textarea>",
            escape_html(form.message())
        );
        html.push_str("</form>\n");

        html.push_str("<h2>Previous Donations</h2>\n");
        for record in self.donations {
            let _ = writeln!(
                html,
                "<div class=\"donation\">{} donated ${}<br>Message: {}</div>",
                escape_html(&record.fields.name),
                escape_html(&record.amount_display()),
                escape_html(&record.fields.message)
            );
        }

        html.push_str("</main>\n</body>\n</html>\n");
        html
    }
}

/// Thank-you page the provider returns the donor to
pub fn render_thank_you() -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Thank You</title><style>{}</style></head>
<body>
    <main style="text-align: center;">
        <div style="font-size: 60px;">☕️</div>
        <h1>Thank you!</h1>
        <p style="color: #666;">Your donation was received.</p>
        <p><a href="/">Back to the coffee shop</a></p>
    </main>
</body>
</html>
"#,
        STYLE
    )
}

/// Value attribute for the quantity input; unparsable input stays empty
fn quantity_value(quantity: f64) -> String {
    if quantity.is_finite() {
        quantity.to_string()
    } else {
        String::new()
    }
}

/// Escape text for HTML element content and quoted attribute values
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
