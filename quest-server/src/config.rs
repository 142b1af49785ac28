use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub base_answer_score: i32,
    pub session_code_max_attempts: u32,
    pub vocab_win_accuracy: f64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret".to_string()),
            base_answer_score: env::var("BASE_ANSWER_SCORE")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("Invalid BASE_ANSWER_SCORE"),
            session_code_max_attempts: env::var("SESSION_CODE_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "16".to_string())
                .parse()
                .expect("Invalid SESSION_CODE_MAX_ATTEMPTS"),
            vocab_win_accuracy: env::var("VOCAB_WIN_ACCURACY")
                .unwrap_or_else(|_| "80".to_string())
                .parse()
                .expect("Invalid VOCAB_WIN_ACCURACY"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
