use std::{io::Cursor, sync::Arc};

use base64::{Engine, engine::general_purpose::STANDARD};
use derive_more::{Display, Error, From};
use image::{ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};

#[derive(Debug, Display, Error, From)]
pub enum QrError {
    #[display("QR encoding failed: {_0}")]
    Encode(qrcode::types::QrError),
    #[display("PNG encoding failed: {_0}")]
    Png(image::ImageError),
    #[display("QR encoder task failed: {_0}")]
    Task(tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCorrection {
    Low,
    Medium,
    Quartile,
    High,
}

impl From<ErrorCorrection> for EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::Low => EcLevel::L,
            ErrorCorrection::Medium => EcLevel::M,
            ErrorCorrection::Quartile => EcLevel::Q,
            ErrorCorrection::High => EcLevel::H,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrOptions {
    pub error_correction: ErrorCorrection,
    /// Pixels per module.
    pub scale: u32,
}

impl Default for QrOptions {
    fn default() -> Self {
        QrOptions {
            error_correction: ErrorCorrection::High,
            scale: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrImage {
    png: Vec<u8>,
}

impl QrImage {
    pub fn from_png(png: Vec<u8>) -> Self {
        QrImage { png }
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }
}

pub trait QrEncoder: Send + Sync {
    fn encode(&self, payload: &str, options: &QrOptions) -> Result<QrImage, QrError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PngQrEncoder;

impl QrEncoder for PngQrEncoder {
    fn encode(&self, payload: &str, options: &QrOptions) -> Result<QrImage, QrError> {
        let code = QrCode::with_error_correction_level(
            payload.as_bytes(),
            options.error_correction.into(),
        )?;
        let image = code
            .render::<Luma<u8>>()
            .module_dimensions(options.scale, options.scale)
            .build();

        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(QrImage { png })
    }
}

/// Modal showing the QR code of one short link. The image is encoded on the
/// first open, off the async executor, and reused afterwards.
pub struct QrDialog {
    payload: String,
    options: QrOptions,
    encoder: Arc<dyn QrEncoder>,
    image: Option<QrImage>,
    open: bool,
}

impl QrDialog {
    pub fn new(payload: String, options: QrOptions, encoder: Arc<dyn QrEncoder>) -> Self {
        QrDialog {
            payload,
            options,
            encoder,
            image: None,
            open: false,
        }
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub async fn open(&mut self) -> Result<&QrImage, QrError> {
        self.open = true;
        let image = match self.image.take() {
            Some(image) => image,
            None => {
                let encoder = Arc::clone(&self.encoder);
                let payload = self.payload.clone();
                let options = self.options;
                tokio::task::spawn_blocking(move || encoder.encode(&payload, &options)).await??
            }
        };
        Ok(self.image.insert(image))
    }

    pub fn close(&mut self) {
        self.open = false;
    }
}

/// `furs.id` + `/tg` -> `furs.id_tg.png`
pub fn download_file_name(host: &str, short_url: &str) -> String {
    format!("{host}{}.png", short_url.replacen('/', "_", 1))
}
