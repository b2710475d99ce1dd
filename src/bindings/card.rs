use std::{sync::Arc, time::Duration};

use derive_more::Display;
use url::Url;

use crate::{
    bindings::{
        clipboard::Clipboard,
        config::Config,
        qr::{QrDialog, QrEncoder, QrError, QrImage, QrOptions, download_file_name},
    },
    domain::{models::ShortenedUrl, repository::ShortenedURLRepository},
    gate::{self, ConfirmationGate, Trigger},
    usecase::mutation::MutationGateway,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CopyLabel {
    #[display("Copy")]
    Copy,
    #[display("Copied!")]
    Copied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DeleteLabel {
    #[display("Delete")]
    Delete,
    #[display("Confirm?")]
    Confirm,
}

/// Shared collaborators and settings used to build one [`UrlCard`] per
/// listed record.
pub struct Bindings {
    origin: String,
    host: String,
    qr_options: QrOptions,
    gates: gate::config::Config,
    clipboard: Arc<dyn Clipboard>,
    encoder: Arc<dyn QrEncoder>,
}

impl Bindings {
    pub fn new(
        config: &Config,
        gates: gate::config::Config,
        clipboard: Arc<dyn Clipboard>,
        encoder: Arc<dyn QrEncoder>,
    ) -> Result<Self, url::ParseError> {
        let origin = Url::parse(config.display_origin.trim())?;
        let host = match (origin.host_str(), origin.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(url::ParseError::EmptyHost),
        };

        Ok(Bindings {
            origin: origin.origin().ascii_serialization(),
            host,
            qr_options: QrOptions {
                scale: config.qr_scale,
                ..QrOptions::default()
            },
            gates,
            clipboard,
            encoder,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn delete_window(&self) -> Duration {
        self.gates.delete_confirm()
    }

    pub fn public_url(&self, short_url: &str) -> String {
        format!("{}{short_url}", self.origin)
    }

    pub fn card(&self, record: ShortenedUrl) -> UrlCard {
        let public_url = self.public_url(&record.short_url);
        UrlCard {
            download_name: download_file_name(&self.host, &record.short_url),
            qr: QrDialog::new(
                public_url.clone(),
                self.qr_options,
                Arc::clone(&self.encoder),
            ),
            copy_gate: ConfirmationGate::new(self.gates.copy_feedback()),
            delete_gate: ConfirmationGate::new(self.gates.delete_confirm()),
            clipboard: Arc::clone(&self.clipboard),
            public_url,
            record,
        }
    }

    /// Rebuilds the card list for a freshly fetched list, keeping the cards
    /// (and their pending confirmations) of records that are still present.
    pub fn reconcile(&self, mut previous: Vec<UrlCard>, records: &[ShortenedUrl]) -> Vec<UrlCard> {
        records
            .iter()
            .map(|record| {
                match previous
                    .iter()
                    .position(|card| card.record.short_url == record.short_url)
                {
                    Some(index) => {
                        let mut card = previous.swap_remove(index);
                        card.record = record.clone();
                        card
                    }
                    None => self.card(record.clone()),
                }
            })
            .collect()
    }
}

/// Per-record interactions: copy with transient feedback, QR dialog, and
/// delete behind a two-phase confirmation.
pub struct UrlCard {
    record: ShortenedUrl,
    public_url: String,
    download_name: String,
    clipboard: Arc<dyn Clipboard>,
    copy_gate: ConfirmationGate,
    delete_gate: ConfirmationGate,
    qr: QrDialog,
}

impl UrlCard {
    pub fn record(&self) -> &ShortenedUrl {
        &self.record
    }

    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    /// Copies the public URL and shows "Copied!" for the feedback window.
    /// Copying again inside the window copies again and restarts it.
    pub fn copy(&mut self) {
        if let Err(e) = self.clipboard.write_text(&self.public_url) {
            tracing::warn!(error = %e, short_url = self.record.short_url.as_str(), "Copy failed");
        }
        if self.copy_gate.trigger(false) == Trigger::Committed {
            self.copy_gate.trigger(false);
        }
    }

    pub fn copy_label(&self) -> CopyLabel {
        if self.copy_gate.is_armed() {
            CopyLabel::Copied
        } else {
            CopyLabel::Copy
        }
    }

    /// First call arms the confirmation; a second call inside the window,
    /// or any call with `bypass`, deletes the record.
    pub async fn delete<R: ShortenedURLRepository>(
        &mut self,
        bypass: bool,
        gateway: &MutationGateway<R>,
    ) -> Trigger {
        let trigger = self.delete_gate.trigger(bypass);
        if trigger == Trigger::Committed {
            gateway.delete(&self.record.short_url).await;
        }
        trigger
    }

    pub fn delete_label(&self) -> DeleteLabel {
        if self.delete_gate.is_armed() {
            DeleteLabel::Confirm
        } else {
            DeleteLabel::Delete
        }
    }

    pub async fn show_qr(&mut self) -> Result<&QrImage, QrError> {
        self.qr.open().await
    }

    pub fn close_qr(&mut self) {
        self.qr.close();
    }

    pub fn qr_is_open(&self) -> bool {
        self.qr.is_open()
    }

    pub fn download_name(&self) -> &str {
        &self.download_name
    }
}
