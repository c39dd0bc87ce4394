//! Inline-styled HTML email templates and the formatting helpers they use.

use chrono::DateTime;

/// Placeholder shown for values the notification never supplied.
const PLACEHOLDER: &str = "\u{2014}";

/// Format a naira amount with thousands grouping and two decimals.
pub fn format_amount(value: Option<f64>) -> String {
    let Some(value) = value else {
        return PLACEHOLDER.to_string();
    };

    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!(
        "{}\u{20a6}{}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        frac
    )
}

/// Human-readable timestamp, e.g. `01 Mar, 2025 | 10:30:00 AM`.
/// Falls back to the raw input when it is not RFC 3339.
pub fn format_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.format("%d %b, %Y | %I:%M:%S %p").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Render an optional field, substituting the placeholder when absent.
pub fn display_or_placeholder(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

fn brand_block(logo_url: &str, bank_name: &str) -> String {
    format!(
        r#"<img src="{logo_url}" alt="{bank_name} logo" width="28" height="28" style="display:block;border:0;border-radius:6px;" />"#
    )
}

/// Verification email: HTML plus a plain-text alternative.
pub fn verification_email(verification_url: &str, ttl_hours: i64) -> (String, String) {
    let html = format!(
        r#"<h1>Welcome to Finsync!</h1>
<p>Click the link below to verify your email. It expires in {ttl_hours} hour(s).</p>
<a href="{verification_url}"><strong>Verify My Email</strong></a>"#
    );
    let text = format!(
        "Welcome to Finsync!\n\nVisit the link below to verify your email. It expires in {ttl_hours} hour(s).\n\n{verification_url}\n"
    );
    (html, text)
}

/// Everything the debit-alert template embeds, already formatted.
#[derive(Debug, Clone)]
pub struct DebitAlertFields {
    pub first_name: String,
    pub amount: String,
    pub balance: String,
    pub account_number: String,
    pub date_time: String,
    pub narration: String,
    pub reference: String,
    pub bank_name: String,
    pub logo_url: String,
}

pub fn render_debit_alert(fields: &DebitAlertFields) -> String {
    let brand = brand_block(&fields.logo_url, &fields.bank_name);
    let DebitAlertFields {
        first_name,
        amount,
        balance,
        account_number,
        date_time,
        narration,
        reference,
        bank_name,
        ..
    } = fields;

    let detail_rows = [
        ("Account Balance", balance.as_str()),
        ("Account Number", account_number.as_str()),
        ("Date & Time", date_time.as_str()),
        ("Narration", narration.as_str()),
        ("Reference", reference.as_str()),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (label, value))| {
        let border = if i < 4 {
            "border-bottom:1px solid #e5e7eb;"
        } else {
            ""
        };
        format!(
            r#"<tr><td style="padding:14px 16px;{border}">
<div style="font-size:11px;color:#8a94a6;text-transform:uppercase;letter-spacing:0.06em;">{label}</div>
<div style="font-size:14px;font-weight:600;color:#111111;word-break:break-word;">{value}</div>
</td></tr>"#
        )
    })
    .collect::<String>();

    format!(
        r#"<div style="margin:0;padding:24px;background:#f5f5f5;font-family:Segoe UI, Roboto, Helvetica, Arial, sans-serif;color:#111111;">
<table role="presentation" width="100%" cellspacing="0" cellpadding="0" border="0" style="max-width:620px;margin:0 auto;background:#ffffff;border-radius:12px;box-shadow:0 1px 3px rgba(0,0,0,0.06);overflow:hidden;">
<tr><td style="padding:24px 28px;background:linear-gradient(135deg,#111111,#333333);color:#ffffff;">
<table role="presentation" width="100%" cellspacing="0" cellpadding="0" border="0"><tr>
<td style="font-size:18px;font-weight:600;">
<table role="presentation" cellspacing="0" cellpadding="0" border="0"><tr>
<td style="vertical-align:middle;">{brand}</td>
<td style="vertical-align:middle;padding-left:10px;text-transform:lowercase;">{bank_name}</td>
</tr></table>
</td>
<td style="text-align:right;font-size:18px;font-weight:700;">Debit Alert!</td>
</tr></table>
</td></tr>
<tr><td style="padding:28px;">
<p style="margin:0 0 12px 0;font-size:14px;color:#4a5568;">Hi {first_name},</p>
<p style="margin:0 0 18px 0;font-size:14px;color:#4a5568;">We wish to inform you that a transaction occurred on your account with us.</p>
<div style="margin:18px 0 22px 0;text-align:center;">
<div style="font-size:12px;color:#666666;text-transform:uppercase;letter-spacing:0.06em;margin-bottom:6px;">Debit Amount</div>
<div style="font-size:28px;font-weight:800;color:#111111;">{amount}</div>
</div>
<table role="presentation" width="100%" cellspacing="0" cellpadding="0" border="0" style="border:1px solid #e5e7eb;border-radius:10px;">
{detail_rows}
</table>
<p style="margin:18px 0 0 0;font-size:12px;color:#6b7280;">If you experience any problems kindly contact us at <a href="mailto:support@finsyncdigitalservice.com" style="color:#111111;text-decoration:none;">support@finsyncdigitalservice.com</a>.</p>
</td></tr>
<tr><td style="padding:18px 28px;background:#f8fafc;color:#64748b;font-size:11px;text-align:center;">
<div style="margin-bottom:6px;">Follow us on</div>
<div>
<a href="https://twitter.com" style="color:#111111;text-decoration:none;margin:0 6px;">Twitter</a>
<a href="https://facebook.com" style="color:#111111;text-decoration:none;margin:0 6px;">Facebook</a>
<a href="https://instagram.com" style="color:#111111;text-decoration:none;margin:0 6px;">Instagram</a>
</div>
</td></tr>
</table>
</div>"#
    )
}

/// Generic informative email in the same design language.
pub fn render_informative(
    subject: &str,
    body_html: &str,
    recipient_name: &str,
    logo_url: &str,
) -> String {
    let brand = brand_block(logo_url, "Finsync");
    format!(
        r#"<div style="margin:0;padding:24px;background:#f5f5f5;font-family:Segoe UI, Roboto, Helvetica, Arial, sans-serif;color:#111111;">
<table role="presentation" width="100%" cellspacing="0" cellpadding="0" border="0" style="max-width:620px;margin:0 auto;background:#ffffff;border-radius:12px;box-shadow:0 1px 3px rgba(0,0,0,0.06);overflow:hidden;">
<tr><td style="padding:16px 20px;background:linear-gradient(135deg,#111111,#333333);color:#ffffff;">
<table role="presentation" width="100%" cellspacing="0" cellpadding="0" border="0">
<tr><td style="vertical-align:middle;font-weight:400;font-size:16px;">{brand}<span style="margin-left:10px;">Finsync</span></td></tr>
<tr><td style="padding-top:6px;font-weight:700;font-size:18px;">{subject}</td></tr>
</table>
</td></tr>
<tr><td style="padding:24px;">
<p style="margin:0 0 12px 0;font-size:14px;color:#4a5568;">Hi {recipient_name},</p>
<div style="margin:0 0 18px 0;font-size:14px;color:#4a5568;">{body_html}</div>
<p style="margin:18px 0 0 0;font-size:12px;color:#6b7280;">If you have any questions contact <a href="mailto:support@finsyncdigitalservice.com" style="color:#111111;text-decoration:none;">support@finsyncdigitalservice.com</a>.</p>
</td></tr>
<tr><td style="padding:12px 20px;background:#f8fafc;color:#64748b;font-size:11px;text-align:center;">
<div>&copy; Finsync Digital Service</div>
</td></tr>
</table>
</div>"#
    )
}
