use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::Mailbox};
use tracing::info;

pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

const CONFIRMATION_TEMPLATE: &str = r#"
<head>
<style type="text/css">
button {
    background-color: #0d6efd;
    border-color: #0d6efd;
    color: #fff;

    padding: 10px;

    font-size: 1.25em;
    font-family: sans-serif;
    text-decoration: none;

    cursor: pointer;
    border: 1px solid transparent;
    border-radius: .25rem;
}
h1 {
    color: #000;
    font-family: sans-serif;
    margin-bottom: .5rem;
}
</style>
</head>

<body>
<h1>Click the button to finish signing up</h1>
<a href="{confirm_url}">
    <button type="button">Confirm registration</button>
</a>
</body>
"#;

/// SMTP sender for registration-confirmation mail. TLS on the configured
/// submissions port, credential-authenticated.
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .context("failed to set up the SMTP transport")?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let from = config
            .from
            .parse()
            .with_context(|| format!("invalid SMTP from address '{}'", config.from))?;

        Ok(Self { transport, from })
    }

    pub async fn send_confirmation_email(&self, to: &str, confirm_url: &str) -> Result<()> {
        let html = CONFIRMATION_TEMPLATE.replace("{confirm_url}", confirm_url);
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse().with_context(|| format!("invalid recipient address '{to}'"))?)
            .subject("Tasker email confirmation")
            .header(ContentType::TEXT_HTML)
            .body(html)
            .context("failed to build the confirmation email")?;

        self.transport
            .send(message)
            .await
            .context("failed to send the confirmation email")?;

        info!("confirmation email sent to {}", to);
        Ok(())
    }
}
