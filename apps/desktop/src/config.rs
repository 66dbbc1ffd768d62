use std::{collections::HashMap, fs};

#[derive(Debug)]
pub struct Settings {
    pub endpoint: String,
    pub model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/api/extract".into(),
            model: "gemini-2.0-flash".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("extractor.toml") {
        apply_file_config(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("EXTRACTOR_ENDPOINT") {
        settings.endpoint = v;
    }
    if let Ok(v) = std::env::var("APP__ENDPOINT") {
        settings.endpoint = v;
    }

    if let Ok(v) = std::env::var("EXTRACTOR_MODEL") {
        settings.model = v;
    }
    if let Ok(v) = std::env::var("APP__MODEL") {
        settings.model = v;
    }

    settings
}

fn apply_file_config(settings: &mut Settings, raw: &str) {
    if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
        if let Some(v) = file_cfg.get("endpoint") {
            settings.endpoint = v.clone();
        }
        if let Some(v) = file_cfg.get("model") {
            settings.model = v.clone();
        }
    }
}
