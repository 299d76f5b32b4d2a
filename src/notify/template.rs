//! HTML bodies for digest and instant emails.
//!
//! Rendering writes into a `String` through [`fmt::Write`]; every
//! user-supplied value goes through [`escape_html`].

use std::fmt::{self, Write as _};

use crate::domain::{DeveloperDigest, MessageEntry, ThankYouEntry};
use crate::error::AppError;

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M UTC";

/// Escapes the five HTML-significant characters.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn render_error(e: fmt::Error) -> AppError {
    AppError::TemplateRender(e.to_string())
}

fn open_document(out: &mut String, title: &str) -> fmt::Result {
    write!(
        out,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body>",
        escape_html(title)
    )
}

fn close_document(out: &mut String) -> fmt::Result {
    out.write_str("<p>L'équipe Merkit Bocou</p></body></html>")
}

fn write_message(out: &mut String, message: &MessageEntry) -> fmt::Result {
    write!(
        out,
        "<li><strong>{}</strong> ({}) : {}</li>",
        escape_html(&message.user_id),
        message.timestamp.format(TIMESTAMP_FORMAT),
        escape_html(&message.content)
    )
}

fn write_thank_you(out: &mut String, click: &ThankYouEntry) -> fmt::Result {
    write!(
        out,
        "<li><strong>{}</strong> ({}) : {} merci</li>",
        escape_html(&click.user_id),
        click.timestamp.format(TIMESTAMP_FORMAT),
        click.count
    )
}

fn write_summary(out: &mut String, digest: &DeveloperDigest) -> fmt::Result {
    open_document(out, "Résumé MerkitBocou")?;
    write!(out, "<h1>Bonjour {} !</h1>", escape_html(&digest.username))?;
    out.write_str("<p>Voici ce qui s'est passé sur vos projets depuis le dernier résumé.</p>")?;
    for project in &digest.projects {
        write!(out, "<h2>{}</h2>", escape_html(&project.name))?;
        write!(
            out,
            "<p>{} nouveau(x) message(s), {} merci.</p>",
            project.recent_messages.len(),
            project.total_clicks()
        )?;
        if !project.recent_messages.is_empty() {
            out.write_str("<h3>Messages</h3><ul>")?;
            for message in &project.recent_messages {
                write_message(out, message)?;
            }
            out.write_str("</ul>")?;
        }
        if !project.recent_clicks.is_empty() {
            out.write_str("<h3>Remerciements</h3><ul>")?;
            for click in &project.recent_clicks {
                write_thank_you(out, click)?;
            }
            out.write_str("</ul>")?;
        }
    }
    close_document(out)
}

/// Renders the periodic digest email.
///
/// # Errors
///
/// Returns [`AppError::TemplateRender`] if formatting fails.
pub fn render_summary(digest: &DeveloperDigest) -> Result<String, AppError> {
    let mut out = String::new();
    write_summary(&mut out, digest).map_err(render_error)?;
    Ok(out)
}

fn write_instant(
    out: &mut String,
    title: &str,
    username: &str,
    intro: &str,
    project_name: &str,
    item: impl FnOnce(&mut String) -> fmt::Result,
) -> fmt::Result {
    open_document(out, title)?;
    write!(out, "<h1>Bonjour {} !</h1>", escape_html(username))?;
    write!(
        out,
        "<p>{intro} <strong>{}</strong> :</p><ul>",
        escape_html(project_name)
    )?;
    item(out)?;
    out.write_str("</ul>")?;
    close_document(out)
}

/// Renders the instant email for a new message.
///
/// # Errors
///
/// Returns [`AppError::TemplateRender`] if formatting fails.
pub fn render_instant_message(
    username: &str,
    project_name: &str,
    message: &MessageEntry,
) -> Result<String, AppError> {
    let mut out = String::new();
    write_instant(
        &mut out,
        "Nouveau message",
        username,
        "Nouveau message pour",
        project_name,
        |out| write_message(out, message),
    )
    .map_err(render_error)?;
    Ok(out)
}

/// Renders the instant email for a thank-you click batch.
///
/// # Errors
///
/// Returns [`AppError::TemplateRender`] if formatting fails.
pub fn render_instant_thank_you(
    username: &str,
    project_name: &str,
    click: &ThankYouEntry,
) -> Result<String, AppError> {
    let mut out = String::new();
    write_instant(
        &mut out,
        "Merci reçu",
        username,
        "Quelqu'un a dit merci pour",
        project_name,
        |out| write_thank_you(out, click),
    )
    .map_err(render_error)?;
    Ok(out)
}

/// Subject of the instant message email.
#[must_use]
pub fn instant_message_subject(project_name: &str) -> String {
    format!("Nouveau message pour {project_name} avec Merkit Bocou")
}

/// Subject of the instant thank-you email.
#[must_use]
pub fn instant_thank_you_subject(project_name: &str) -> String {
    format!("Merci reçu pour {project_name} avec Merkit Bocou")
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::{DeveloperId, ProjectDigest, ProjectId};

    fn digest() -> DeveloperDigest {
        let now = Utc::now();
        DeveloperDigest {
            developer_id: DeveloperId::new(1),
            username: "ada".to_string(),
            email: "ada@example.org".to_string(),
            projects: vec![ProjectDigest {
                id: ProjectId::new(7),
                name: "engine".to_string(),
                recent_messages: vec![MessageEntry {
                    user_id: "visitor".to_string(),
                    content: "<script>alert(1)</script> merci !".to_string(),
                    timestamp: now,
                }],
                recent_clicks: vec![
                    ThankYouEntry {
                        user_id: "v1".to_string(),
                        count: 3,
                        timestamp: now,
                    },
                    ThankYouEntry {
                        user_id: "v2".to_string(),
                        count: 4,
                        timestamp: now,
                    },
                ],
            }],
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn summary_lists_projects_and_totals() {
        let Ok(html) = render_summary(&digest()) else {
            panic!("render failed");
        };
        assert!(html.contains("<h1>Bonjour ada !</h1>"));
        assert!(html.contains("<h2>engine</h2>"));
        assert!(html.contains("1 nouveau(x) message(s), 7 merci."));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn instant_bodies_name_the_project() {
        let d = digest();
        let Some(project) = d.projects.first() else {
            panic!("fixture has a project");
        };
        let (Some(message), Some(click)) =
            (project.recent_messages.first(), project.recent_clicks.first())
        else {
            panic!("fixture has items");
        };
        let Ok(html) = render_instant_message("ada", "engine", message) else {
            panic!("render failed");
        };
        assert!(html.contains("Nouveau message pour <strong>engine</strong>"));
        let Ok(html) = render_instant_thank_you("ada", "engine", click) else {
            panic!("render failed");
        };
        assert!(html.contains("3 merci"));
        assert_eq!(
            instant_thank_you_subject("engine"),
            "Merci reçu pour engine avec Merkit Bocou"
        );
    }
}
