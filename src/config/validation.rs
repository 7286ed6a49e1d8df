//! Configuration validation functions.

use super::Config;

/// Minimum accepted length for a configured JWT signing secret.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Validate the loaded configuration.
///
/// In production mode a strong, explicitly configured JWT secret is required;
/// elsewhere a missing secret only produces a warning because one is generated
/// at startup.
pub fn validate_config(config: &Config) -> anyhow::Result<()> {
    config.hub.validate()?;

    if config.security.token_ttl_secs == 0 {
        anyhow::bail!("security.token_ttl_secs must be greater than zero");
    }

    if config.rewards.streak_window_secs < config.rewards.cooldown_secs {
        anyhow::bail!(
            "rewards.streak_window_secs ({}) must not be shorter than rewards.cooldown_secs ({})",
            config.rewards.streak_window_secs,
            config.rewards.cooldown_secs
        );
    }

    let secret_len = config
        .security
        .jwt_secret
        .as_deref()
        .map(str::trim)
        .map_or(0, str::len);

    if is_production_mode() {
        if secret_len == 0 {
            anyhow::bail!(
                "\nCRITICAL: No JWT secret configured in production!\n\
                 ===================================================================\n\
                 Configure a signing secret:\n\
                 export MRPG__SECURITY__JWT_SECRET=\"$(openssl rand -hex 32)\"\n\
                 ===================================================================\n"
            );
        }
        if secret_len < MIN_JWT_SECRET_LEN {
            anyhow::bail!(
                "security.jwt_secret is too short ({secret_len} chars, need at least {MIN_JWT_SECRET_LEN})"
            );
        }
    } else if secret_len > 0 && secret_len < MIN_JWT_SECRET_LEN {
        eprintln!(
            "\nWARNING: JWT secret is very short ({secret_len} chars).\n\
             Recommended: At least {MIN_JWT_SECRET_LEN} characters.\n\
             Generate a strong secret: openssl rand -hex 32\n"
        );
    }

    Ok(())
}

/// `MRPG_ENV=production` (or `prod`) enables the strict checks.
pub fn is_production_mode() -> bool {
    std::env::var("MRPG_ENV")
        .map(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "production" | "prod"
            )
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_outside_production() {
        if is_production_mode() {
            return;
        }
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn zero_mailbox_is_rejected() {
        let mut config = Config::default();
        config.hub.mailbox_capacity = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("mailbox_capacity"));
    }

    #[test]
    fn tiny_frame_limit_is_rejected() {
        let mut config = Config::default();
        config.hub.max_message_size = 10;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn streak_window_shorter_than_cooldown_is_rejected() {
        let mut config = Config::default();
        config.rewards.streak_window_secs = 60;
        config.rewards.cooldown_secs = 120;
        assert!(validate_config(&config).is_err());
    }
}
