use crate::reminder::reminder_models::ReminderCandidate;

use super::mailer::OutgoingEmail;

pub fn reminder_subject(title: &str, days_until_due: i64) -> String {
    match days_until_due {
        0 => format!("Due Today: {}", title),
        1 => format!("Due Tomorrow: {}", title),
        n => format!("Reminder: {} due in {} days", title, n),
    }
}

pub fn render_reminder(
    candidate: &ReminderCandidate,
    days_until_due: i64,
    dashboard_url: &str,
) -> OutgoingEmail {
    let due = candidate
        .due_date
        .format("%A, %-d %B %Y at %H:%M UTC")
        .to_string();
    let module = candidate.module_name.as_deref().unwrap_or("No module");
    let greeting = candidate
        .user_name
        .as_deref()
        .map(|name| format!("Hi {},", name))
        .unwrap_or_else(|| "Hi,".to_string());
    let dashboard = format!("{}/dashboard", dashboard_url.trim_end_matches('/'));

    let mut details = vec![
        format!("Module: {}", module),
        format!("Due date: {}", due),
    ];
    if let Some(description) = candidate.description.as_deref() {
        details.push(format!("Description: {}", description));
    }
    if let Some(hours) = candidate.estimated_hours {
        details.push(format!("Estimated effort: {} hours", hours));
    }
    if let Some(weight) = candidate.weighting_percent {
        details.push(format!("Weighting: {}%", weight));
    }

    let text_body = format!(
        "{}\n\nUpcoming deadline: {}\n\n{}\n\nDon't forget to complete this assignment on time!\nView your dashboard: {}\n\nYou're receiving this email because you have email reminders enabled.\n",
        greeting,
        candidate.title,
        details.join("\n"),
        dashboard,
    );

    let detail_rows: String = details
        .iter()
        .map(|line| match line.split_once(": ") {
            Some((label, value)) => format!(
                "<p><strong>{}:</strong> {}</p>",
                escape_html(label),
                escape_html(value)
            ),
            None => format!("<p>{}</p>", escape_html(line)),
        })
        .collect();

    let html_body = format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <h1 style="background-color: #0d6efd; color: white; padding: 20px; text-align: center;">Deadline Reminder</h1>
    <p>{greeting}</p>
    <h2>Upcoming Deadline Alert</h2>
    <div style="background-color: white; padding: 15px; border-left: 4px solid #0d6efd;">
      <h3>{title}</h3>
      {details}
    </div>
    <p>Don't forget to complete this assignment on time!</p>
    <a href="{dashboard}">View Dashboard</a>
    <p style="color: #6c757d; font-size: 12px;">You're receiving this email because you have email reminders enabled. To change your notification preferences, visit your account settings.</p>
  </div>
</body>
</html>"#,
        greeting = escape_html(&greeting),
        title = escape_html(&candidate.title),
        details = detail_rows,
        dashboard = escape_html(&dashboard),
    );

    OutgoingEmail {
        to: candidate.email.clone(),
        subject: reminder_subject(&candidate.title, days_until_due),
        text_body,
        html_body,
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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
