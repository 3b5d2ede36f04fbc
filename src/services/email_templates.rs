use std::fmt::{self, Display};

use crate::dto::application_dto::ApplicationForm;
use crate::models::application::{ApplicationRecord, ApplicationStatus};

const DIVIDER: &str = r#"<hr style="border: none; border-top: 1px solid #eee; margin: 20px 0;">"#;

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

fn opt(value: &Option<String>) -> String {
    escape_html(value.as_deref().unwrap_or(""))
}

fn applicant_items(form: &ApplicationForm, resume_name: Option<&str>) -> String {
    let mut items = format!(
        r#"<li><strong>Name:</strong> {}</li>
            <li><strong>Email:</strong> {}</li>
            <li><strong>Phone:</strong> {}</li>
            <li><strong>Location:</strong> {}</li>"#,
        escape_html(&form.applicant_name),
        escape_html(&form.applicant_email),
        escape_html(&form.applicant_phone),
        opt(&form.applicant_location),
    );
    if let Some(name) = resume_name {
        items.push_str(&format!(
            "\n            <li><strong>Resume:</strong> Attached ({})</li>",
            escape_html(name)
        ));
    }
    items
}

fn cover_letter_block(cover_letter: &str) -> String {
    format!(
        r#"<p style="background: #f5f5f5; padding: 15px; border-radius: 5px; white-space: pre-wrap;">{}</p>"#,
        escape_html(cover_letter)
    )
}

/// Confirmation sent to the candidate.
pub struct ApplicantConfirmation<'a> {
    pub form: &'a ApplicationForm,
    pub resume_name: Option<&'a str>,
}

impl ApplicantConfirmation<'_> {
    pub fn subject(&self) -> String {
        format!(
            "Application Confirmation - {} at {}",
            self.form.job_title,
            self.form.company_name.as_deref().unwrap_or("")
        )
    }
}

impl Display for ApplicantConfirmation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let job_title = escape_html(&self.form.job_title);
        let company = opt(&self.form.company_name);
        write!(
            f,
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
          <h2 style="color: #667eea;">Application Received!</h2>
          <p>Dear {name},</p>
          <p>Thank you for applying for the position of <strong>{job_title}</strong> at <strong>{company}</strong>.</p>
          <p>We have received your application and will review it shortly. You will hear from us soon.</p>
          {DIVIDER}
          <h3>Application Details:</h3>
          <ul style="line-height: 1.8;">
            <li><strong>Position:</strong> {job_title}</li>
            <li><strong>Company:</strong> {company}</li>
            {items}
          </ul>
          {DIVIDER}
          <h3>Your Cover Letter:</h3>
          {cover}
          {DIVIDER}
          <p style="color: #666; font-size: 14px;">Best regards,<br>JobFinder Team</p>
        </div>"#,
            name = escape_html(&self.form.applicant_name),
            items = applicant_items(self.form, self.resume_name),
            cover = cover_letter_block(&self.form.cover_letter),
        )
    }
}

/// Alert sent to the employer mailbox.
pub struct EmployerAlert<'a> {
    pub form: &'a ApplicationForm,
    pub resume_name: Option<&'a str>,
}

impl EmployerAlert<'_> {
    pub fn subject(&self) -> String {
        format!("New Job Application - {}", self.form.job_title)
    }
}

impl Display for EmployerAlert<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
          <h2 style="color: #667eea;">New Job Application Received</h2>
          <p>You have received a new application for the position: <strong>{job_title}</strong></p>
          {DIVIDER}
          <h3>Applicant Information:</h3>
          <ul style="line-height: 1.8;">
            {items}
          </ul>
          {DIVIDER}
          <h3>Cover Letter:</h3>
          {cover}
          {DIVIDER}
          <p style="color: #666; font-size: 14px;">This is an automated email from JobFinder.</p>
        </div>"#,
            job_title = escape_html(&self.form.job_title),
            items = applicant_items(self.form, self.resume_name),
            cover = cover_letter_block(&self.form.cover_letter),
        )
    }
}

/// Review outcome sent to the candidate after an admin status change.
pub struct StatusUpdate<'a> {
    pub record: &'a ApplicationRecord,
}

impl StatusUpdate<'_> {
    pub fn subject(&self) -> String {
        let title = &self.record.job_title;
        match self.record.status {
            ApplicationStatus::Accepted => format!("Your application for {} was accepted", title),
            ApplicationStatus::Rejected => format!("Update on your application for {}", title),
            ApplicationStatus::Pending => format!("Your application for {} is under review", title),
        }
    }
}

impl Display for StatusUpdate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let job_title = escape_html(&self.record.job_title);
        let company = opt(&self.record.company_name);
        let body = match self.record.status {
            ApplicationStatus::Accepted => format!(
                "Congratulations! Your application for <strong>{}</strong> at <strong>{}</strong> has been accepted. The team will contact you about next steps.",
                job_title, company
            ),
            ApplicationStatus::Rejected => format!(
                "Thank you for your interest in <strong>{}</strong> at <strong>{}</strong>. After careful review we will not be moving forward with your application.",
                job_title, company
            ),
            ApplicationStatus::Pending => format!(
                "Your application for <strong>{}</strong> at <strong>{}</strong> is being reviewed. We will be in touch soon.",
                job_title, company
            ),
        };
        write!(
            f,
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
          <p>Dear {name},</p>
          <p>{body}</p>
          {DIVIDER}
          <p style="color: #666; font-size: 14px;">Best regards,<br>JobFinder Team</p>
        </div>"#,
            name = escape_html(&self.record.applicant_name),
        )
    }
}
