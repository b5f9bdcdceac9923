//! Optional email notification after a report is rendered.
//!
//! Built only when SMTP credentials are present in the environment; without
//! them the server runs exactly the same, minus the email. Send failures are
//! the caller's to log — by the time notification runs, the submission has
//! already succeeded.

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build email: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.pass.clone()))
            .build();

        Ok(Mailer {
            transport,
            from: config.user.parse()?,
        })
    }

    /// Send an HTML email, optionally attaching the rendered document.
    pub async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: String,
        attachment: Option<(String, Vec<u8>)>,
    ) -> Result<(), NotifyError> {
        let builder = Message::builder()
            .from(self.from.clone())
            .to(recipient.parse()?)
            .subject(subject);

        let html_part = SinglePart::html(html_body);
        let message = match attachment {
            Some((filename, bytes)) => {
                let pdf_part = Attachment::new(filename)
                    .body(bytes, ContentType::parse("application/pdf").expect("static mime"));
                builder.multipart(MultiPart::mixed().singlepart(html_part).singlepart(pdf_part))?
            }
            None => builder.multipart(MultiPart::mixed().singlepart(html_part))?,
        };

        self.transport.send(message).await?;
        Ok(())
    }
}

/// HTML body with the document download link and the online-view link.
pub fn report_email_html(app_name: &str, numero: &str, pdf_url: &str, view_url: &str) -> String {
    format!(
        concat!(
            "<h2>{app}: nuevo informe {numero}</h2>",
            "<p>Se ha generado un nuevo informe de servicio.</p>",
            "<p><a href=\"{pdf}\">Descargar PDF</a></p>",
            "<p><a href=\"{view}\">Ver en línea</a></p>",
        ),
        app = app_name,
        numero = numero,
        pdf = pdf_url,
        view = view_url,
    )
}
