use anyhow::anyhow;
use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, instrument, warn};

use scholarly_config::EmailConfig;
use scholarly_core::AppError;

/// Outbound mail triggered by enrollment and review activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    EnrollmentWelcome {
        student_email: String,
        student_name: String,
        course_title: String,
        instructor_name: String,
    },
    NewEnrollment {
        instructor_email: String,
        instructor_name: String,
        student_name: String,
        course_title: String,
    },
    Unenrollment {
        instructor_email: String,
        instructor_name: String,
        student_name: String,
        course_title: String,
    },
    NewReview {
        instructor_email: String,
        instructor_name: String,
        student_name: String,
        course_title: String,
        review: String,
    },
}

impl Notification {
    pub fn recipient(&self) -> &str {
        match self {
            Notification::EnrollmentWelcome { student_email, .. } => student_email,
            Notification::NewEnrollment {
                instructor_email, ..
            }
            | Notification::Unenrollment {
                instructor_email, ..
            }
            | Notification::NewReview {
                instructor_email, ..
            } => instructor_email,
        }
    }

    pub fn subject(&self) -> String {
        match self {
            Notification::EnrollmentWelcome { course_title, .. } => {
                format!("Welcome to {}!", course_title)
            }
            Notification::NewEnrollment { .. } => "New Student Enrollment".to_string(),
            Notification::Unenrollment { .. } => "Student Unenrolled".to_string(),
            Notification::NewReview { .. } => "New Review on Your Course".to_string(),
        }
    }

    pub fn text_body(&self) -> String {
        match self {
            Notification::EnrollmentWelcome {
                student_name,
                course_title,
                instructor_name,
                ..
            } => format!(
                "Welcome, {student_name}!\n\n\
                 We're excited to have you in the {course_title} course.\n\
                 Your instructor, {instructor_name}, looks forward to guiding you.\n\n\
                 Enjoy your learning journey!"
            ),
            Notification::NewEnrollment {
                instructor_name,
                student_name,
                course_title,
                ..
            } => format!(
                "Dear {instructor_name},\n\n\
                 Student {student_name} has enrolled in your course {course_title}.\n\n\
                 Keep inspiring learners!"
            ),
            Notification::Unenrollment {
                instructor_name,
                student_name,
                course_title,
                ..
            } => format!(
                "Dear {instructor_name},\n\n\
                 Student {student_name} has unenrolled from your course {course_title}."
            ),
            Notification::NewReview {
                instructor_name,
                student_name,
                course_title,
                review,
                ..
            } => format!(
                "Dear {instructor_name},\n\n\
                 Student {student_name} has posted a new review for your course {course_title}.\n\n\
                 Review:\n{review}\n\n\
                 Feel free to respond to the student if needed."
            ),
        }
    }

    pub fn html_body(&self) -> String {
        let content = match self {
            Notification::EnrollmentWelcome {
                student_name,
                course_title,
                instructor_name,
                ..
            } => format!(
                "<h2>Welcome, {}!</h2>\
                 <p>We're excited to have you in the <strong>{}</strong> course.</p>\
                 <p>Your instructor, <strong>{}</strong>, looks forward to guiding you.</p>\
                 <p>Enjoy your learning journey!</p>",
                escape_html(student_name),
                escape_html(course_title),
                escape_html(instructor_name)
            ),
            Notification::NewEnrollment {
                instructor_name,
                student_name,
                course_title,
                ..
            } => format!(
                "<h2>New Enrollment</h2>\
                 <p>Dear {},</p>\
                 <p>Student <strong>{}</strong> has enrolled in your course <strong>{}</strong>.</p>\
                 <p>Keep inspiring learners!</p>",
                escape_html(instructor_name),
                escape_html(student_name),
                escape_html(course_title)
            ),
            Notification::Unenrollment {
                instructor_name,
                student_name,
                course_title,
                ..
            } => format!(
                "<h2>Unenrollment</h2>\
                 <p>Dear {},</p>\
                 <p>Student <strong>{}</strong> has unenrolled from your course <strong>{}</strong>.</p>",
                escape_html(instructor_name),
                escape_html(student_name),
                escape_html(course_title)
            ),
            Notification::NewReview {
                instructor_name,
                student_name,
                course_title,
                review,
                ..
            } => format!(
                "<h2>New Review</h2>\
                 <p>Dear {},</p>\
                 <p>Student <strong>{}</strong> has posted a new review for your course <strong>{}</strong>.</p>\
                 <blockquote>{}</blockquote>\
                 <p>Feel free to respond to the student if needed.</p>",
                escape_html(instructor_name),
                escape_html(student_name),
                escape_html(course_title),
                escape_html(review)
            ),
        };

        layout(&self.subject(), &content)
    }
}

#[derive(Clone, Debug)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Queues `notification` on a background task. Delivery failures are
    /// logged and never reach the caller.
    pub fn notify(&self, notification: Notification) {
        if !self.config.enabled {
            debug!(
                recipient = notification.recipient(),
                subject = %notification.subject(),
                "SMTP disabled, skipping notification"
            );
            return;
        }

        let service = self.clone();
        tokio::spawn(async move {
            if let Err(err) = service.send(&notification).await {
                warn!(
                    recipient = notification.recipient(),
                    error = %err.error,
                    "Failed to deliver notification"
                );
            }
        });
    }

    #[instrument(skip(self, notification), fields(recipient = notification.recipient()))]
    pub async fn send(&self, notification: &Notification) -> Result<(), AppError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal(anyhow!("Invalid from email: {}", e)))?,
            )
            .to(notification
                .recipient()
                .parse()
                .map_err(|e| AppError::internal(anyhow!("Invalid to email: {}", e)))?)
            .subject(notification.subject())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(notification.text_body()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(notification.html_body()),
                    ),
            )
            .map_err(|e| AppError::internal(anyhow!("Failed to build email: {}", e)))?;

        let mailer = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|e| AppError::internal(anyhow!("Failed to create SMTP relay: {}", e)))?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::internal(anyhow!("Task join error: {}", e)))?
            .map_err(|e| AppError::internal(anyhow!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="100%" cellpadding="0" cellspacing="0" style="background-color: #f4f4f4; padding: 20px;">
        <tr>
            <td align="center">
                <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px; overflow: hidden;">
                    <tr>
                        <td style="background-color: #0F766E; padding: 24px; text-align: center;">
                            <h1 style="margin: 0; color: #ffffff; font-size: 26px;">Scholarly</h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 32px; color: #333333; font-size: 15px; line-height: 1.6;">
                            {content}
                        </td>
                    </tr>
                    <tr>
                        <td style="background-color: #f9f9f9; padding: 16px; text-align: center; color: #999999; font-size: 12px;">
                            This is an automated email from Scholarly. Please do not reply.
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"#,
        title = escape_html(title),
        content = content
    )
}
