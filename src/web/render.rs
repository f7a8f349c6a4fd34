//! HTML rendering for the prediction form and its result

use crate::types::prediction::PredictionResult;
use crate::types::student::{Sex, StudentInput};
use crate::web::server::PredictForm;

const STYLE: &str = "\
body{font-family:sans-serif;max-width:640px;margin:2rem auto;padding:0 1rem;color:#222}\
label{display:block;margin-top:.8rem}input,select{width:100%;padding:.4rem;margin-top:.2rem}\
button{margin-top:1rem;padding:.5rem 1rem}\
.notice{padding:.8rem;border-radius:4px;margin-top:1rem}\
.success{background:#e6f4ea;color:#1e4620}.error{background:#fdecea;color:#611a15}\
footer{margin-top:2rem;font-size:.8rem;color:#666;border-top:1px solid #ddd;padding-top:.5rem}";

/// Escape text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"id\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>🎓 {title}</h1>\n{body}\n\
         <footer>Model dilatih menggunakan dataset student_data.csv dan memprediksi kelulusan \
         berdasarkan jumlah ketidakhadiran dan jenis kelamin.</footer>\n</body>\n</html>\n",
        title = escape_html(title),
        body = body,
    )
}

/// The input form, pre-filled with `values`, with an optional message.
pub fn form_page(title: &str, values: &PredictForm, message: Option<&str>, max_absences: u32) -> String {
    let notice = message
        .map(|m| format!("<div class=\"notice error\">{}</div>\n", escape_html(m)))
        .unwrap_or_default();

    let options: String = [Sex::Male, Sex::Female]
        .iter()
        .map(|sex| {
            let selected = if values.sex == sex.form_value() { " selected" } else { "" };
            format!(
                "<option value=\"{}\"{}>{}</option>",
                sex.form_value(),
                selected,
                sex.display_label()
            )
        })
        .collect();

    let body = format!(
        "{notice}<form method=\"post\" action=\"/predict\">\n\
         <label>Nama<input name=\"name\" placeholder=\"Masukkan nama lengkap\" value=\"{name}\"></label>\n\
         <label>Kelas<input name=\"class\" placeholder=\"Contoh: XI IPA 1\" value=\"{class}\"></label>\n\
         <label>Jumlah ketidakhadiran<input name=\"absences\" type=\"number\" min=\"0\" max=\"{max}\" step=\"1\" value=\"{absences}\"></label>\n\
         <label>Jenis Kelamin<select name=\"sex\">{options}</select></label>\n\
         <button type=\"submit\">🔍 Prediksi</button>\n</form>",
        notice = notice,
        name = escape_html(&values.name),
        class = escape_html(&values.class),
        max = max_absences,
        absences = escape_html(&values.absences),
        options = options,
    );

    page(title, &body)
}

/// The labeled result block with a success or error notice.
pub fn result_page(title: &str, input: &StudentInput, result: &PredictionResult) -> String {
    let name = escape_html(&input.name);
    let (style, notice) = if result.outcome.is_pass() {
        (
            "success",
            format!("Selamat {}, kamu diprediksi akan <strong>Lulus</strong> 🎉", name),
        )
    } else {
        (
            "error",
            format!("Maaf {}, kamu diprediksi <strong>Tidak Lulus</strong> 😔", name),
        )
    };

    let body = format!(
        "<h2>📊 Hasil Prediksi</h2>\n<ul>\n\
         <li><strong>Nama:</strong> {name}</li>\n\
         <li><strong>Kelas:</strong> {class}</li>\n\
         <li><strong>Prediksi:</strong> {label}</li>\n\
         <li><strong>Probabilitas Lulus:</strong> {probability:.2}%</li>\n</ul>\n\
         <div class=\"notice {style}\">{notice}</div>\n\
         <p><a href=\"/\">Prediksi lagi</a></p>",
        name = name,
        class = escape_html(&input.class_name),
        label = result.outcome.display_label(),
        probability = result.probability_percent,
        style = style,
        notice = notice,
    );

    page(title, &body)
}

/// Generic failure page; details stay in the logs.
pub fn error_page(title: &str, message: &str) -> String {
    let body = format!(
        "<div class=\"notice error\">{}</div>\n<p><a href=\"/\">Kembali</a></p>",
        escape_html(message)
    );
    page(title, &body)
}
