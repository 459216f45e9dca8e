use crate::service::lifecycle_service::TransitionPolicy;

pub const DEFAULT_MASTER_ADMIN_EMAIL: &str = "dustin@flashfixturnover.com";
pub const DEFAULT_CONTRACTOR_INVITE_CODE: &str = "FF-PRO-2025";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub allowed_origins: Vec<String>,
    // Demo access
    pub master_admin_email: String,
    pub admin_secret: String,
    pub contractor_email_marker: String,
    pub contractor_invite_code: String,
    pub lifecycle_policy: TransitionPolicy,
}

impl Config {
    pub fn init() -> Config {
        let defaults = Config::demo();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|port| port.parse::<u16>().ok())
            .unwrap_or(defaults.port);
        let jwt_secret = std::env::var("JWT_SECRET_KEY").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET_KEY not set, using the development secret");
            defaults.jwt_secret.clone()
        });
        let jwt_maxage = std::env::var("JWT_MAXAGE")
            .ok()
            .and_then(|maxage| maxage.parse::<i64>().ok())
            .unwrap_or(defaults.jwt_maxage);
        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or(defaults.allowed_origins);

        let master_admin_email = std::env::var("MASTER_ADMIN_EMAIL")
            .unwrap_or(defaults.master_admin_email);
        let admin_secret = std::env::var("ADMIN_SECRET").unwrap_or(defaults.admin_secret);
        let contractor_email_marker = std::env::var("CONTRACTOR_EMAIL_MARKER")
            .unwrap_or(defaults.contractor_email_marker);
        let contractor_invite_code = std::env::var("CONTRACTOR_INVITE_CODE")
            .unwrap_or(defaults.contractor_invite_code);

        let lifecycle_policy = match std::env::var("LIFECYCLE_POLICY") {
            Ok(value) => value.parse::<TransitionPolicy>().unwrap_or_else(|e| {
                tracing::warn!("{}, falling back to {:?}", e, defaults.lifecycle_policy);
                defaults.lifecycle_policy
            }),
            Err(_) => defaults.lifecycle_policy,
        };

        Config {
            port,
            jwt_secret,
            jwt_maxage,
            allowed_origins,
            master_admin_email,
            admin_secret,
            contractor_email_marker,
            contractor_invite_code,
            lifecycle_policy,
        }
    }

    /// Built-in values, also used as the fallback for every unset variable.
    pub fn demo() -> Config {
        Config {
            port: 8000,
            jwt_secret: "flashfix-dev-secret".to_string(),
            jwt_maxage: 60,
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:8000".to_string(),
            ],
            master_admin_email: DEFAULT_MASTER_ADMIN_EMAIL.to_string(),
            admin_secret: "admin123".to_string(),
            contractor_email_marker: "@contractor.com".to_string(),
            contractor_invite_code: DEFAULT_CONTRACTOR_INVITE_CODE.to_string(),
            lifecycle_policy: TransitionPolicy::Hardened,
        }
    }
}
