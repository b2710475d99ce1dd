use std::time::Duration;

use envconfig::Envconfig;

#[derive(Envconfig, Debug, Clone)]
pub struct Config {
    #[envconfig(from = "COPY_FEEDBACK_MS", default = "1000")]
    pub copy_feedback_ms: u64,
    #[envconfig(from = "DELETE_CONFIRM_MS", default = "2000")]
    pub delete_confirm_ms: u64,
}

impl Config {
    pub fn copy_feedback(&self) -> Duration {
        Duration::from_millis(self.copy_feedback_ms)
    }

    pub fn delete_confirm(&self) -> Duration {
        Duration::from_millis(self.delete_confirm_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            copy_feedback_ms: 1000,
            delete_confirm_ms: 2000,
        }
    }
}
