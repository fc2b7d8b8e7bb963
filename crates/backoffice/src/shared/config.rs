use once_cell::sync::Lazy;

/// Production fallback when no environment override is set
const PRODUCTION_BASE_URL: &str = "https://nirvana-five-nu.vercel.app";

const ENV_VARS: [&str; 2] = ["BACKOFFICE_API_BASE_URL", "API_BASE_URL"];

/// Базовый URL внешнего commerce API.
/// Резолвится один раз на процесс, как и в клиентской части.
pub static API_BASE_URL: Lazy<String> = Lazy::new(resolve_base_url);

/// Resolve the API base URL
///
/// Search order:
/// 1. `BACKOFFICE_API_BASE_URL` environment variable
/// 2. `API_BASE_URL` environment variable
/// 3. Falls back to the production URL
pub fn resolve_base_url() -> String {
    for var in ENV_VARS {
        if let Ok(value) = std::env::var(var) {
            let value = value.trim();
            if !value.is_empty() {
                tracing::info!("API base URL taken from {}", var);
                return value.trim_end_matches('/').to_string();
            }
        }
    }
    PRODUCTION_BASE_URL.to_string()
}

/// Склеивает базовый URL и путь запроса.
/// Абсолютные http(s)-адреса проходят без изменений.
pub fn join_url(base: &str, path: &str) -> String {
    let path = path.trim();
    let lowered = path.to_ascii_lowercase();
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        return path.to_string();
    }

    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}
