//! Server-rendered HTML pages.
//!
//! Every interpolated value goes through [`escape`].

use crate::domain::{HealthRecord, Language, Symptom, User, Vital};

/// Minimal HTML escaping for text and attribute values.
#[must_use]
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "body{font-family:sans-serif;max-width:860px;margin:2rem auto;padding:0 1rem;color:#222}\
nav a{margin-right:1rem}.error{color:#b00020}.notice{color:#1b5e20}\
table{border-collapse:collapse;width:100%}td,th{border:1px solid #ccc;padding:.4rem;text-align:left}\
.risk{display:inline-block;border:1px solid #999;padding:.6rem 1rem;margin-right:1rem}\
label{display:block;margin:.3rem 0}";

fn layout(title: &str, username: Option<&str>, body: &str) -> String {
    let nav = match username {
        Some(name) => format!(
            "<nav><a href=\"/dashboard\">Dashboard</a><a href=\"/history\">History</a>\
             <a href=\"/settings\">Settings</a><a href=\"/logout\">Logout</a>\
             <span>Signed in as {}</span></nav>",
            escape(name)
        ),
        None => "<nav><a href=\"/login\">Login</a><a href=\"/register\">Register</a></nav>".to_string(),
    };
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{} | Healix AI</title>\
         <style>{STYLE}</style></head><body>{nav}<h1>{}</h1>{body}</body></html>",
        escape(title),
        escape(title)
    )
}

fn flash(class: &str, message: Option<&str>) -> String {
    message
        .map(|m| format!("<p class=\"{class}\">{}</p>", escape(m)))
        .unwrap_or_default()
}

#[must_use]
pub fn login_page(error: Option<&str>) -> String {
    let body = format!(
        "{}<form method=\"post\" action=\"/login\">\
         <label>Username <input name=\"username\" required></label>\
         <label>Password <input name=\"password\" type=\"password\" required></label>\
         <label>Phone (optional, updates alerts) <input name=\"phone\"></label>\
         <button type=\"submit\">Login</button></form>",
        flash("error", error)
    );
    layout("Login", None, &body)
}

#[must_use]
pub fn register_page(error: Option<&str>) -> String {
    let body = format!(
        "{}<form method=\"post\" action=\"/register\">\
         <label>Username <input name=\"username\" required></label>\
         <label>Password <input name=\"password\" type=\"password\" required></label>\
         <label>Phone <input name=\"phone\"></label>\
         <button type=\"submit\">Register</button></form>",
        flash("error", error)
    );
    layout("Register", None, &body)
}

const DASHBOARD_SCRIPT: &str = r#"
const form = document.getElementById('predict');
let last = null;
form.addEventListener('submit', async (e) => {
  e.preventDefault();
  const data = new FormData(form);
  const body = { questionnaire: {} };
  for (const [k, v] of data.entries()) {
    if (k.startsWith('q_')) { body.questionnaire[k.slice(2)] = 1; }
    else if (v !== '') { body[k] = v; }
  }
  const res = await fetch('/predict', { method: 'POST', headers: { 'Content-Type': 'application/json' }, body: JSON.stringify(body) });
  last = await res.json();
  const out = document.getElementById('result');
  out.textContent = '';
  for (const key of ['diabetes', 'heart', 'kidney']) {
    const span = document.createElement('span');
    span.className = 'risk';
    span.textContent = key + ': ' + last[key] + '%';
    out.appendChild(span);
  }
  for (const key of ['recommendation', 'future_risks', 'precautions', 'causes', 'reduction_steps', 'diet_plan']) {
    const p = document.createElement('p');
    p.textContent = key.replace('_', ' ') + ': ' + last[key];
    out.appendChild(p);
  }
  document.getElementById('pdf').hidden = false;
});
document.getElementById('pdf').addEventListener('click', async () => {
  const res = await fetch('/download_report', { method: 'POST', headers: { 'Content-Type': 'application/json' }, body: JSON.stringify(last) });
  const url = URL.createObjectURL(await res.blob());
  const a = document.createElement('a');
  a.href = url; a.download = 'healix_report.pdf'; a.click();
});
"#;

#[must_use]
pub fn dashboard_page(username: &str) -> String {
    let vitals: String = Vital::ALL
        .iter()
        .map(|v| {
            format!(
                "<label>{key} <input name=\"{key}\" placeholder=\"{default}\"></label>",
                key = v.key(),
                default = v.default_value()
            )
        })
        .collect();
    let symptoms: String = Symptom::ALL
        .iter()
        .map(|s| {
            format!(
                "<label><input type=\"checkbox\" name=\"q_{name}\"> {name}</label>",
                name = s.name()
            )
        })
        .collect();
    let languages: String = [Language::EnUs, Language::HiIn, Language::TeIn]
        .iter()
        .map(|l| format!("<option value=\"{}\">{}</option>", l.code(), l.display_name()))
        .collect();

    let body = format!(
        "<p>Welcome, {}.</p><form id=\"predict\">\
         <fieldset><legend>Vitals (optional)</legend>{vitals}</fieldset>\
         <fieldset><legend>Symptoms</legend>{symptoms}</fieldset>\
         <label>Describe how you feel <textarea name=\"message\"></textarea></label>\
         <label>Language <select name=\"language\">{languages}</select></label>\
         <button type=\"submit\">Analyse</button></form>\
         <div id=\"result\"></div><button id=\"pdf\" hidden>Download PDF</button>\
         <script>{DASHBOARD_SCRIPT}</script>",
        escape(username)
    );
    layout("Dashboard", Some(username), &body)
}

fn record_row(record: &HealthRecord) -> String {
    format!(
        "<tr><td><a href=\"/report/{id}\">{id}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        record.created_at.format("%Y-%m-%d %H:%M"),
        escape(&record.symptoms),
        record.risks.diabetes,
        record.risks.heart,
        record.risks.kidney,
        id = record.id,
    )
}

#[must_use]
pub fn history_page(username: &str, records: &[HealthRecord]) -> String {
    let body = if records.is_empty() {
        "<p>No assessments yet.</p>".to_string()
    } else {
        let rows: String = records.iter().map(record_row).collect();
        format!(
            "<table><tr><th>#</th><th>Date</th><th>Input</th><th>Diabetes</th><th>Heart</th><th>Kidney</th></tr>{rows}</table>"
        )
    };
    layout("History", Some(username), &body)
}

#[must_use]
pub fn settings_page(user: &User, message: Option<&str>) -> String {
    let body = format!(
        "{}<form method=\"post\" action=\"/settings\">\
         <label>Phone <input name=\"phone\" value=\"{}\"></label>\
         <label>New password <input name=\"password\" type=\"password\"></label>\
         <button type=\"submit\">Save</button></form>",
        flash("notice", message),
        escape(user.phone.as_deref().unwrap_or_default())
    );
    layout("Settings", Some(&user.username), &body)
}

#[must_use]
pub fn report_page(record: &HealthRecord) -> String {
    let body = format!(
        "<p>User: {}</p><p>Date: {}</p><p>Input: {}</p>\
         <div><span class=\"risk\">Diabetes: {}</span><span class=\"risk\">Heart: {}</span>\
         <span class=\"risk\">Kidney: {}</span></div>\
         <p><em>This is an AI-generated estimate. Please consult a doctor for medical advice.</em></p>",
        escape(&record.username),
        record.created_at.format("%Y-%m-%d %H:%M UTC"),
        escape(&record.symptoms),
        record.risks.diabetes,
        record.risks.heart,
        record.risks.kidney,
    );
    layout(&format!("Health Report #{}", record.id), None, &body)
}

#[must_use]
pub fn error_page(title: &str, message: &str) -> String {
    layout(title, None, &format!("<p class=\"error\">{}</p>", escape(message)))
}
