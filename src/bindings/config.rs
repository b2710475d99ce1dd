use envconfig::Envconfig;

#[derive(Envconfig, Debug, Clone)]
pub struct Config {
    #[envconfig(from = "DISPLAY_ORIGIN", default = "https://furs.id")]
    pub display_origin: String,
    #[envconfig(from = "QR_SCALE", default = "16")]
    pub qr_scale: u32,
}
