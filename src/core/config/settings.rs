use super::parsing::{
    env_optional, env_or_default, is_supported_image_extension, normalize_prefix, parse_bool,
    parse_cors_origins, parse_environment, parse_media_provider, parse_string_list, parse_u16,
    parse_u64,
};
use super::types::{
    ApiSettings, CloudinarySettings, ConfigError, CorsSettings, DatabaseSettings, MediaProvider,
    MediaSettings, RuntimeSettings, S3Settings, ServerHost, ServerPort, ServerSettings, Settings,
    StorageSettings, TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("ITEMS_HOST", "0.0.0.0");
        let port = env_or_default("ITEMS_PORT", "8000");

        let environment =
            parse_environment(env_optional("ITEMS_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("ITEMS_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Item Store API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let prefix = normalize_prefix(env_or_default("API_PREFIX", ""));

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "items");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "items_db");
        let database_url = env_optional("DATABASE_URL");

        let max_upload_size_mb =
            parse_u64("MAX_UPLOAD_SIZE_MB", env_or_default("MAX_UPLOAD_SIZE_MB", "10"))?;
        let allowed_image_extensions = parse_string_list(
            env_optional("ALLOWED_IMAGE_EXTENSIONS"),
            &["jpg", "jpeg", "png", "webp", "gif"],
        );

        let media_provider = parse_media_provider(env_optional("MEDIA_PROVIDER"))?;
        let media_folder = env_or_default("MEDIA_FOLDER", "items");

        let cloudinary_cloud_name = env_or_default("CLOUDINARY_CLOUD_NAME", "");
        let cloudinary_api_key = env_or_default("CLOUDINARY_API_KEY", "");
        let cloudinary_api_secret = env_or_default("CLOUDINARY_API_SECRET", "");
        let cloudinary_api_base =
            env_or_default("CLOUDINARY_API_BASE", "https://api.cloudinary.com");

        let s3_endpoint = env_or_default("S3_ENDPOINT", "https://s3.amazonaws.com");
        let s3_access_key = env_or_default("S3_ACCESS_KEY", "");
        let s3_secret_key = env_or_default("S3_SECRET_KEY", "");
        let s3_bucket = env_or_default("S3_BUCKET", "item-images");
        let s3_region = env_or_default("S3_REGION", "us-east-1");
        let s3_public_base_url = env_optional("S3_PUBLIC_BASE_URL");

        let log_level = env_or_default("ITEMS_LOG_LEVEL", "info");
        let json = env_optional("ITEMS_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, prefix },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
            },
            storage: StorageSettings { max_upload_size_mb, allowed_image_extensions },
            media: MediaSettings { provider: media_provider, folder: media_folder },
            cloudinary: CloudinarySettings {
                cloud_name: cloudinary_cloud_name,
                api_key: cloudinary_api_key,
                api_secret: cloudinary_api_secret,
                api_base: cloudinary_api_base.trim_end_matches('/').to_string(),
            },
            s3: S3Settings {
                endpoint: s3_endpoint,
                access_key: s3_access_key,
                secret_key: s3_secret_key,
                bucket: s3_bucket,
                region: s3_region,
                public_base_url: s3_public_base_url,
            },
            telemetry: TelemetrySettings { log_level, json },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn storage(&self) -> &StorageSettings {
        &self.storage
    }

    pub(crate) fn media(&self) -> &MediaSettings {
        &self.media
    }

    pub(crate) fn cloudinary(&self) -> &CloudinarySettings {
        &self.cloudinary
    }

    pub(crate) fn s3(&self) -> &S3Settings {
        &self.s3
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    /// Explicit `MEDIA_PROVIDER` wins; otherwise the first host with credentials.
    pub(crate) fn media_provider(&self) -> MediaProvider {
        if let Some(provider) = self.media.provider {
            return provider;
        }
        if self.cloudinary.is_configured() {
            MediaProvider::Cloudinary
        } else if self.s3.is_configured() {
            MediaProvider::S3
        } else {
            MediaProvider::Disabled
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.allowed_image_extensions.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ALLOWED_IMAGE_EXTENSIONS",
                value: String::from("<empty>"),
            });
        }

        for extension in &self.storage.allowed_image_extensions {
            if !is_supported_image_extension(extension) {
                return Err(ConfigError::InvalidValue {
                    field: "ALLOWED_IMAGE_EXTENSIONS",
                    value: extension.clone(),
                });
            }
        }

        if self.storage.max_upload_size_mb == 0 {
            return Err(ConfigError::InvalidValue {
                field: "MAX_UPLOAD_SIZE_MB",
                value: "0".to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        match self.media.provider {
            Some(MediaProvider::Cloudinary) if !self.cloudinary.is_configured() => {
                return Err(ConfigError::MissingSecret(
                    "CLOUDINARY_CLOUD_NAME/CLOUDINARY_API_KEY/CLOUDINARY_API_SECRET",
                ));
            }
            Some(MediaProvider::S3) if !self.s3.is_configured() => {
                return Err(ConfigError::MissingSecret("S3_ACCESS_KEY/S3_SECRET_KEY"));
            }
            _ => {}
        }

        Ok(())
    }
}
