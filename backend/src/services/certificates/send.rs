//! # Distribution Engine
//!
//! `POST /api/certificates/send` delivers generated certificates by email.
//! Dispatch is strictly sequential, one recipient at a time, so the outbound
//! transport's rate limits are respected. A failure for one recipient is
//! recorded and never stops the rest.
//! The endpoint always answers 200 with the aggregate accounting; total
//! failure is visible in the counts, not as an HTTP error. A manual single
//! send is just a batch of one.

use crate::config::Config;
use crate::mailer::{CertificateAttachment, Mailer, SmtpMailer};
use crate::{db, store};
use actix_web::{web, HttpResponse, Responder};
use common::requests::{SendBatchRequest, SendBatchResponse, SendError};
use log::warn;
use regex::Regex;
use std::path::Path;

/// Body placeholder substituted with the recipient's name before sending.
const NAME_TOKEN: &str = r"\{\{\s*name\s*\}\}";

pub(crate) async fn process(
    cfg: web::Data<Config>,
    mailer: web::Data<Option<SmtpMailer>>,
    payload: web::Json<SendBatchRequest>,
) -> impl Responder {
    let Some(mailer) = mailer.get_ref() else {
        return HttpResponse::ServiceUnavailable()
            .body("Mail transport is not configured (set SMTP_HOST)");
    };

    let report = match send_batch(mailer, &payload, &cfg.output_dir).await {
        Ok(report) => report,
        Err(e) => return HttpResponse::InternalServerError().body(format!("Error: {}", e)),
    };

    // Advance roster status for delivered recipients. A failure here is an
    // accounting hiccup, not a delivery failure, so it only logs.
    if !report.delivered.is_empty() {
        match db::open(&cfg) {
            Ok(conn) => {
                for email in &report.delivered {
                    if let Err(e) = store::roster::mark_emailed(&conn, email) {
                        warn!("Could not record delivery for {}: {}", email, e);
                    }
                }
            }
            Err(e) => warn!("Could not record delivery statuses: {}", e),
        }
    }

    let failed = report.errors.len();
    let success = report.delivered.len();
    HttpResponse::Ok().json(SendBatchResponse {
        message: format!("Sent {} of {} certificates", success, report.total),
        total: report.total,
        success,
        failed,
        errors: report.errors,
    })
}

/// Outcome of one distribution batch.
pub(crate) struct SendReport {
    pub total: usize,
    /// Emails delivered successfully, in dispatch order.
    pub delivered: Vec<String>,
    pub errors: Vec<SendError>,
}

/// Sequentially dispatch one personalized message per recipient.
///
/// The subject is sent as-is; the body has every `{{name}}` token replaced
/// with the recipient's name. The certificate attachment is resolved from
/// the recipient's artifact URL against `artifact_dir`; a missing file is a
/// per-recipient error like any transport rejection.
pub(crate) async fn send_batch<M: Mailer>(
    mailer: &M,
    req: &SendBatchRequest,
    artifact_dir: &Path,
) -> Result<SendReport, String> {
    let token = Regex::new(NAME_TOKEN).map_err(|e| e.to_string())?;
    let mut report = SendReport {
        total: req.recipients.len(),
        delivered: Vec::new(),
        errors: Vec::new(),
    };

    for recipient in &req.recipients {
        let body = token
            .replace_all(&req.body, regex::NoExpand(recipient.name.as_str()))
            .into_owned();

        let result = match load_attachment(artifact_dir, &recipient.certificate_url) {
            Ok(attachment) => {
                mailer
                    .send(&recipient.email, &req.subject, &body, attachment)
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => report.delivered.push(recipient.email.clone()),
            Err(e) => {
                warn!("Sending certificate to {} failed: {}", recipient.email, e);
                report.errors.push(SendError {
                    email: recipient.email.clone(),
                    error: e,
                });
            }
        }
    }
    Ok(report)
}

fn load_attachment(artifact_dir: &Path, url: &str) -> Result<CertificateAttachment, String> {
    let filename = url
        .rsplit('/')
        .next()
        .filter(|f| !f.is_empty())
        .ok_or_else(|| format!("Certificate URL '{}' has no file name", url))?;
    let bytes = std::fs::read(artifact_dir.join(filename))
        .map_err(|e| format!("Certificate attachment missing: {}", e))?;
    Ok(CertificateAttachment {
        filename: filename.to_string(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::requests::SendRecipient;
    use std::sync::Mutex;

    /// Test double: records outgoing mail, fails for one address.
    struct StubMailer {
        fail_for: Option<String>,
        sent: Mutex<Vec<(String, String, String)>>,
    }

    impl StubMailer {
        fn new(fail_for: Option<&str>) -> Self {
            Self {
                fail_for: fail_for.map(|s| s.to_string()),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl Mailer for StubMailer {
        async fn send(
            &self,
            to: &str,
            subject: &str,
            body: &str,
            _attachment: CertificateAttachment,
        ) -> Result<(), String> {
            if self.fail_for.as_deref() == Some(to) {
                return Err("mailbox unavailable".to_string());
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn request(emails: &[&str]) -> SendBatchRequest {
        SendBatchRequest {
            recipients: emails
                .iter()
                .map(|e| SendRecipient {
                    email: e.to_string(),
                    name: e.split('@').next().unwrap().to_string(),
                    certificate_url: format!("/certificates/{}.png", e.split('@').next().unwrap()),
                })
                .collect(),
            subject: "Your certificate".to_string(),
            body: "Congratulations {{name}}, your certificate is attached.".to_string(),
        }
    }

    fn artifact_dir(emails: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for e in emails {
            let name = e.split('@').next().unwrap();
            std::fs::write(dir.path().join(format!("{}.png", name)), b"png").unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn partial_failure_is_accounted_not_raised() {
        let dir = artifact_dir(&["a@x.com", "b@x.com", "c@x.com"]);
        let mailer = StubMailer::new(Some("b@x.com"));

        let report = send_batch(&mailer, &request(&["a@x.com", "b@x.com", "c@x.com"]), dir.path())
            .await
            .unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.delivered.len() + report.errors.len(), report.total);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].email, "b@x.com");
        // Dispatch continued after the failure.
        assert_eq!(report.delivered, vec!["a@x.com", "c@x.com"]);
    }

    #[tokio::test]
    async fn body_is_personalized_but_subject_is_not() {
        let dir = artifact_dir(&["a@x.com"]);
        let mailer = StubMailer::new(None);

        send_batch(&mailer, &request(&["a@x.com"]), dir.path())
            .await
            .unwrap();

        let sent = mailer.sent.lock().unwrap();
        let (_, subject, body) = &sent[0];
        assert_eq!(subject, "Your certificate");
        assert_eq!(body, "Congratulations a, your certificate is attached.");
    }

    #[tokio::test]
    async fn name_token_tolerates_inner_whitespace() {
        let dir = artifact_dir(&["a@x.com"]);
        let mailer = StubMailer::new(None);
        let mut req = request(&["a@x.com"]);
        req.body = "Dear {{ name }}!".to_string();

        send_batch(&mailer, &req, dir.path()).await.unwrap();
        assert_eq!(mailer.sent.lock().unwrap()[0].2, "Dear a!");
    }

    #[tokio::test]
    async fn missing_attachment_is_a_per_recipient_error() {
        // Only a's artifact exists.
        let dir = artifact_dir(&["a@x.com"]);
        let mailer = StubMailer::new(None);

        let report = send_batch(&mailer, &request(&["a@x.com", "ghost@x.com"]), dir.path())
            .await
            .unwrap();

        assert_eq!(report.delivered, vec!["a@x.com"]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].email, "ghost@x.com");
        assert!(report.errors[0].error.contains("attachment missing"));
    }

    #[tokio::test]
    async fn a_single_send_is_a_batch_of_one() {
        let dir = artifact_dir(&["solo@x.com"]);
        let mailer = StubMailer::new(None);

        let report = send_batch(&mailer, &request(&["solo@x.com"]), dir.path())
            .await
            .unwrap();
        assert_eq!(report.total, 1);
        assert_eq!(report.delivered.len(), 1);
        assert!(report.errors.is_empty());
    }
}
