use std::env;

/// 実行環境を表す
pub enum Environment {
    Development,
    Production,
}

/// 環境変数 ENV から実行環境を判定する。未設定の場合、
/// debug ビルドでは開発環境、release ビルドでは本番環境とみなす。
pub fn which() -> Environment {
    #[cfg(debug_assertions)]
    let default_env = "development";
    #[cfg(not(debug_assertions))]
    let default_env = "production";

    match env::var("ENV") {
        Err(_) => default_env.into(),
        Ok(v) => v.into(),
    }
}

impl From<String> for Environment {
    fn from(value: String) -> Self {
        value.as_str().into()
    }
}

impl From<&str> for Environment {
    fn from(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}
