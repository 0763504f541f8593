use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::model::{ContactSubmission, SubmissionStats, SubmissionStatus};
use crate::notify::Notification;

pub const REPORT_TITLE: &str = "ALFA NERO Weekly Report";

/// Characters of each message quoted in the report
const EXCERPT_CHARS: usize = 200;

/// Build the owner notification for a reporting window
pub fn weekly_report_notification(
    stats: &SubmissionStats,
    submissions: &[ContactSubmission],
    days: u32,
    now: DateTime<Utc>,
) -> Notification {
    let title = format!("{} - {}", REPORT_TITLE, now.format("%Y-%m-%d"));

    let mut content = String::new();
    let _ = writeln!(content, "Report period: last {} days", days);
    let _ = writeln!(content);
    let _ = writeln!(content, "## Contact Form Submissions");
    let _ = writeln!(content, "Total: {}", stats.total);
    for status in SubmissionStatus::ALL {
        let count = stats.by_status.get(status.as_str()).copied().unwrap_or(0);
        let _ = writeln!(content, "- {}: {}", status, count);
    }
    let _ = writeln!(content);

    if submissions.is_empty() {
        let _ = writeln!(content, "No new inquiries in the last {} days.", days);
    } else {
        let _ = writeln!(content, "### Recent Inquiries");
        for s in submissions {
            let _ = writeln!(
                content,
                "- {} <{}> ({}, {})",
                s.name,
                s.email,
                s.status,
                s.created_at.format("%Y-%m-%d %H:%M UTC")
            );
            if let Some(phone) = &s.phone {
                let _ = writeln!(content, "  Phone: {}", phone);
            }
            let _ = writeln!(content, "  {}", excerpt(&s.message));
        }
    }

    Notification { title, content }
}

fn excerpt(message: &str) -> String {
    let single_line = message.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= EXCERPT_CHARS {
        return single_line;
    }
    let cut: String = single_line.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", cut.trim_end())
}
